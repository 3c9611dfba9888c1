//! Defines the endpoint for recording a transaction against a budget.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
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
    budget::get_owned_budget,
    database_id::BudgetId,
    endpoints::{self, format_endpoint},
    transaction::{NewTransaction, add_transaction_to_budget},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// The amount spent in GNF.
    pub amount: f64,
    /// Text detailing the transaction.
    pub description: String,
}

/// A route handler for recording a transaction against one of the user's
/// budgets, redirects to the page for managing the budget on success.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user): Extension<User>,
    Path(budget_id): Path<BudgetId>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let transaction = NewTransaction::new(form.amount, &form.description);
    let result = get_owned_budget(budget_id, user.id, &connection)
        .and_then(|budget| add_transaction_to_budget(budget.id, transaction, &connection));

    match result {
        Ok(transaction) => {
            tracing::info!(
                "user {} added transaction {} to budget {budget_id}",
                user.id,
                transaction.id
            );

            (
                HxRedirect(format_endpoint(endpoints::MANAGE_BUDGET_VIEW, budget_id)),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("could not add transaction to budget {budget_id}: {error}");

            error.into_alert_response()
        }
    }
}
