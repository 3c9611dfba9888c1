//! A web app for tracking personal budgets.
//!
//! Users are identified by the email address an upstream identity provider
//! passes along with each request. Each user owns budgets with a target
//! amount and an emoji, records transactions against those budgets, and
//! can review their spending on a dashboard or as a filtered history.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod budget;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod html;
mod identity;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod routing;
mod timezone;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use budget::{Budget, BudgetName, BudgetWithTransactions, Emoji, NewBudget, add_budget};
pub use db::initialize as initialize_db;
pub use identity::DEFAULT_IDENTITY_HEADER;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use transaction::{NewTransaction, Period, Transaction, add_transaction_to_budget};
pub use user::{User, UserId, check_and_add_user};

use crate::{
    alert::Alert, html::error_view, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request did not carry the email address of an authenticated user.
    ///
    /// The identity provider in front of the app is expected to set the
    /// identity header on every request.
    #[error("the request did not include the identity of a signed in user")]
    MissingIdentity,

    /// No user is registered with the given email address.
    #[error("user not found")]
    UserNotFound,

    /// The budget ID does not refer to a budget the user can access.
    #[error("budget not found")]
    BudgetNotFound,

    /// The transaction ID does not refer to a transaction the user can access.
    #[error("transaction not found")]
    TransactionNotFound,

    /// The period tag used to filter transactions is not one of the supported
    /// look back windows.
    #[error("invalid period \"{0}\", expected one of last7, last30, last90 or last365")]
    InvalidPeriod(String),

    /// Adding the transaction would push the budget's total spending over
    /// its target amount.
    #[error(
        "a transaction of {requested} would exceed the budget: {current_total} of {budget_amount} has already been spent"
    )]
    BudgetExceeded {
        /// The target amount of the budget.
        budget_amount: f64,
        /// The sum of the budget's transactions before the new transaction.
        current_total: f64,
        /// The amount of the rejected transaction.
        requested: f64,
    },

    /// Amounts for budgets and transactions must be finite numbers greater
    /// than zero.
    #[error("{0} is not a valid amount, amounts must be greater than zero")]
    NonPositiveAmount(f64),

    /// An empty string was used to create a budget name.
    #[error("budget name cannot be empty")]
    EmptyBudgetName,

    /// The budget icon was not a single emoji.
    #[error("\"{0}\" is not a single emoji")]
    InvalidEmoji(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingIdentity => StatusCode::UNAUTHORIZED,
            Error::UserNotFound
            | Error::BudgetNotFound
            | Error::TransactionNotFound
            | Error::NotFound => StatusCode::NOT_FOUND,
            Error::InvalidPeriod(_)
            | Error::BudgetExceeded { .. }
            | Error::NonPositiveAmount(_)
            | Error::EmptyBudgetName
            | Error::InvalidEmoji(_) => StatusCode::BAD_REQUEST,
            Error::InvalidTimezoneError(_) | Error::DatabaseLockError | Error::SqlError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound
            | Error::BudgetNotFound
            | Error::TransactionNotFound
            | Error::UserNotFound => get_404_not_found_response(),
            Error::MissingIdentity => (
                StatusCode::UNAUTHORIZED,
                error_view(
                    "Not Signed In",
                    "401",
                    "You need to sign in to see your budgets.",
                    "Sign in through your identity provider and try again.",
                ),
            )
                .into_response(),
            Error::InvalidPeriod(period) => (
                StatusCode::BAD_REQUEST,
                error_view(
                    "Invalid Period",
                    "400",
                    &format!("\"{period}\" is not a valid period."),
                    "Choose one of the last 7, 30, 90 or 365 days.",
                ),
            )
                .into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Render the error as an alert fragment for HTMX requests.
    fn into_alert_response(self) -> Response {
        let status_code = self.status_code();

        let alert = match self {
            Error::UserNotFound => Alert::Error {
                message: "User not found".to_owned(),
                details: "Sign out and sign in again to recreate your account.".to_owned(),
            },
            Error::BudgetNotFound => Alert::Error {
                message: "Budget not found".to_owned(),
                details: "Try refreshing the page to see if the budget has already been deleted."
                    .to_owned(),
            },
            Error::TransactionNotFound => Alert::Error {
                message: "Could not delete transaction".to_owned(),
                details: "The transaction could not be found. \
                    Try refreshing the page to see if the transaction has already been deleted."
                    .to_owned(),
            },
            Error::BudgetExceeded {
                budget_amount,
                current_total,
                requested,
            } => Alert::Error {
                message: "Budget exceeded".to_owned(),
                details: format!(
                    "Adding {} would exceed the budget of {}. {} is left to spend.",
                    html::format_currency(requested),
                    html::format_currency(budget_amount),
                    html::format_currency((budget_amount - current_total).max(0.0)),
                ),
            },
            Error::NonPositiveAmount(amount) => Alert::Error {
                message: "Invalid amount".to_owned(),
                details: format!("{amount} is not valid, the amount must be a positive number."),
            },
            Error::EmptyBudgetName => Alert::ErrorSimple {
                message: "The budget name cannot be empty".to_owned(),
            },
            Error::InvalidEmoji(emoji) => Alert::Error {
                message: "Invalid emoji".to_owned(),
                details: format!("\"{emoji}\" is not a single emoji. Pick one emoji for the icon."),
            },
            Error::InvalidPeriod(period) => Alert::Error {
                message: "Invalid period".to_owned(),
                details: format!(
                    "\"{period}\" is not a valid period. Choose one of the last 7, 30, 90 or 365 days."
                ),
            },
            Error::MissingIdentity => Alert::ErrorSimple {
                message: "You are not signed in".to_owned(),
            },
            Error::InvalidTimezoneError(timezone) => Alert::Error {
                message: "Invalid Timezone Settings".to_owned(),
                details: format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            },
            _ => Alert::Error {
                message: "Something went wrong".to_owned(),
                details: "An unexpected error occurred, check the server logs for more details."
                    .to_owned(),
            },
        };

        (status_code, alert.into_html()).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{
        Error,
        test_utils::{assert_valid_html, parse_html_fragment},
    };

    #[test]
    fn no_rows_maps_to_not_found() {
        let error: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(error, Error::NotFound);
    }

    #[test]
    fn user_not_found_is_not_found_page() {
        let response = Error::UserNotFound.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn missing_identity_is_unauthorized() {
        let response = Error::MissingIdentity.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn budget_exceeded_alert_shows_remaining_amount() {
        let response = Error::BudgetExceeded {
            budget_amount: 500_000.0,
            current_total: 450_000.0,
            requested: 100_000.0,
        }
        .into_alert_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let text = html.root_element().text().collect::<String>();
        assert!(
            text.contains("50 000 GNF"),
            "want alert to mention the remaining 50 000 GNF, got {text:?}"
        );
    }
}
