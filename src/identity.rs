//! Middleware that identifies the user from a header set by an upstream
//! identity provider.
//!
//! The app does not manage credentials itself. A reverse proxy such as
//! oauth2-proxy authenticates the user and forwards their email address in
//! the identity header. The first time an email address is seen, a user is
//! registered for it.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Request, State},
    http::{HeaderMap, HeaderName},
    middleware::Next,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, user::check_and_add_user};

/// The header read for the signed in user's email when no other header is configured.
pub const DEFAULT_IDENTITY_HEADER: &str = "x-forwarded-email";

/// The state needed for the identity middleware.
#[derive(Debug, Clone)]
pub struct IdentityState {
    /// The header holding the email address of the signed in user.
    pub identity_header: HeaderName,
    /// The database connection for looking up and registering users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for IdentityState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            identity_header: state.identity_header.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

fn get_email<'a>(headers: &'a HeaderMap, identity_header: &HeaderName) -> Option<&'a str> {
    headers
        .get(identity_header)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|email| !email.is_empty())
}

#[inline]
async fn identity_guard_internal(
    state: IdentityState,
    mut request: Request,
    next: Next,
    reject: impl Fn(Error) -> Response,
) -> Response {
    let Some(email) = get_email(request.headers(), &state.identity_header).map(str::to_owned)
    else {
        tracing::warn!(
            "request to {} is missing the identity header {}",
            request.uri().path(),
            state.identity_header
        );
        return reject(Error::MissingIdentity);
    };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return reject(Error::DatabaseLockError);
            }
        };

        check_and_add_user(&email, &connection)
    };

    match user {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(error) => {
            tracing::error!("could not identify user {email}: {error}");
            reject(error)
        }
    }
}

/// Middleware that places the signed in [User](crate::User) into the request
/// extensions, registering the user on their first visit.
///
/// Requests without the identity header get an error page.
///
/// **Note**: Route handlers can use the function argument `Extension(user): Extension<User>` to receive the user.
pub async fn identity_guard(
    State(state): State<IdentityState>,
    request: Request,
    next: Next,
) -> Response {
    identity_guard_internal(state, request, next, IntoResponse::into_response).await
}

/// Same as [identity_guard], but rejected requests get an alert fragment for HTMX to display.
pub async fn identity_guard_hx(
    State(state): State<IdentityState>,
    request: Request,
    next: Next,
) -> Response {
    identity_guard_internal(state, request, next, Error::into_alert_response).await
}
