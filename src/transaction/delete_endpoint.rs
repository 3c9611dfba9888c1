use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, User,
    alert::Alert,
    budget::{get_budget_with_transactions, get_owned_budget},
    database_id::TransactionId,
    html::format_currency,
    transaction::{delete_transaction, get_transaction},
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting one of the user's transactions, responds with an alert.
///
/// The status code has to be 200 OK on success or HTMX will not remove the table row.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(user): Extension<User>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let result = get_transaction(transaction_id, &connection)
        .and_then(|transaction| {
            get_owned_budget(transaction.budget_id, user.id, &connection)
                // Don't reveal that the transaction exists in another user's budget.
                .map_err(|error| match error {
                    Error::BudgetNotFound => Error::TransactionNotFound,
                    error => error,
                })
        })
        .and_then(|budget| {
            delete_transaction(transaction_id, &connection)?;
            get_budget_with_transactions(budget.id, &connection)
        });

    match result {
        Ok(budget) => {
            tracing::info!("user {} deleted transaction {transaction_id}", user.id);

            Alert::Success {
                message: "Transaction deleted".to_owned(),
                details: format!(
                    "{} is left to spend in {}.",
                    format_currency(budget.remaining()),
                    budget.budget.name
                ),
            }
            .into_response()
        }
        Err(error) => {
            tracing::error!("could not delete transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}
