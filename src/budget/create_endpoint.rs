//! Defines the endpoint for creating a new budget.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, User,
    budget::{BudgetName, Emoji, NewBudget, add_budget},
    endpoints,
};

/// The state needed to create a budget.
#[derive(Debug, Clone)]
pub struct CreateBudgetState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating a budget.
#[derive(Debug, Deserialize)]
pub struct BudgetForm {
    /// The name of the budget.
    pub name: String,
    /// The target amount in GNF.
    pub amount: f64,
    /// The emoji shown next to the budget.
    pub emoji: String,
}

impl BudgetForm {
    fn into_new_budget(self) -> Result<NewBudget, Error> {
        let name = BudgetName::new(&self.name)?;
        let emoji = Emoji::new(&self.emoji)?;

        Ok(NewBudget::new(name, self.amount, emoji))
    }
}

/// A route handler for creating a new budget, redirects to the budgets view on success.
pub async fn create_budget_endpoint(
    State(state): State<CreateBudgetState>,
    Extension(user): Extension<User>,
    Form(form): Form<BudgetForm>,
) -> Response {
    let new_budget = match form.into_new_budget() {
        Ok(new_budget) => new_budget,
        Err(error) => {
            tracing::warn!("rejected budget form from user {}: {error}", user.id);
            return error.into_alert_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match add_budget(&user.email, new_budget, &connection) {
        Ok(budget) => {
            tracing::info!("user {} created budget {}", user.id, budget.id);

            (
                HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("could not create budget: {error}");

            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use rusqlite::Connection;

    use crate::{
        budget::{
            BudgetName, Emoji, create_budget_endpoint,
            create_endpoint::{BudgetForm, CreateBudgetState},
            get_budgets_by_user,
        },
        db::initialize,
        endpoints,
        test_utils::{assert_hx_redirect, assert_valid_html, parse_html_fragment},
        user::{User, check_and_add_user},
    };

    const EMAIL: &str = "foo@bar.baz";

    fn get_test_state() -> (CreateBudgetState, User) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = check_and_add_user(EMAIL, &connection).unwrap();

        (
            CreateBudgetState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user,
        )
    }

    fn form(name: &str, amount: f64, emoji: &str) -> BudgetForm {
        BudgetForm {
            name: name.to_owned(),
            amount,
            emoji: emoji.to_owned(),
        }
    }

    #[tokio::test]
    async fn can_create_budget() {
        let (state, user) = get_test_state();

        let response = create_budget_endpoint(
            State(state.clone()),
            Extension(user),
            Form(form(" Alimentation ", 500_000.0, "🍎")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::BUDGETS_VIEW);
        let connection = state.db_connection.lock().unwrap();
        let budgets = get_budgets_by_user(EMAIL, &connection).unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(
            budgets[0].budget.name,
            BudgetName::new_unchecked("Alimentation")
        );
        assert_eq!(budgets[0].budget.amount, 500_000.0);
        assert_eq!(budgets[0].budget.emoji, Emoji::new_unchecked("🍎"));
    }

    #[tokio::test]
    async fn rejects_non_positive_amount() {
        let (state, user) = get_test_state();

        let response = create_budget_endpoint(
            State(state.clone()),
            Extension(user),
            Form(form("Transport", 0.0, "🚗")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let connection = state.db_connection.lock().unwrap();
        assert!(get_budgets_by_user(EMAIL, &connection).unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_empty_name() {
        let (state, user) = get_test_state();

        let response =
            create_budget_endpoint(State(state), Extension(user), Form(form("  ", 1.0, "🚗")))
                .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_text_as_emoji() {
        let (state, user) = get_test_state();

        let response = create_budget_endpoint(
            State(state),
            Extension(user),
            Form(form("Transport", 1.0, "car")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_fragment(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Invalid emoji"), "got alert text {text:?}");
    }
}
