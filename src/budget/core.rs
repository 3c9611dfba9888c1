//! Database queries for budgets.

use std::collections::HashMap;

use rusqlite::{Connection, OptionalExtension, Row, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error,
    budget::domain::{Budget, BudgetName, BudgetWithTransactions, Emoji, NewBudget, validate_amount},
    database_id::BudgetId,
    transaction::{Transaction, map_transaction_row},
    user::{UserId, get_user_by_email},
};

pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            amount REAL NOT NULL,
            emoji TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    // Dashboard queries fetch a user's budgets newest first.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_budget_user_created_at ON budget(user_id, created_at)",
        (),
    )?;

    Ok(())
}

pub fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let name: String = row.get(2)?;
    let emoji: String = row.get(4)?;

    Ok(Budget {
        id: row.get(0)?,
        user_id: UserId::new(row.get(1)?),
        name: BudgetName::new_unchecked(&name),
        amount: row.get(3)?,
        emoji: Emoji::new_unchecked(&emoji),
        created_at: row.get(5)?,
    })
}

/// Create a budget for the user registered with `email`.
///
/// # Errors
/// This function will return a:
/// - [Error::UserNotFound] if no user is registered with `email`,
/// - [Error::NonPositiveAmount] if the budget's amount is not greater than zero,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn add_budget(email: &str, budget: NewBudget, connection: &Connection) -> Result<Budget, Error> {
    let user = get_user_by_email(email, connection)
        .inspect_err(|error| tracing::error!("could not add budget for {email}: {error}"))?;
    let amount = validate_amount(budget.amount)?;
    let created_at = budget.created_at.to_offset(time::UtcOffset::UTC);

    connection
        .prepare(
            "INSERT INTO budget (user_id, name, amount, emoji, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, user_id, name, amount, emoji, created_at",
        )?
        .query_row(
            (
                user.id.as_i64(),
                budget.name.as_ref(),
                amount,
                budget.emoji.as_ref(),
                created_at,
            ),
            map_budget_row,
        )
        .map_err(Error::from)
}

/// Get a budget by its ID, without its transactions.
///
/// # Errors
/// Returns [Error::BudgetNotFound] if there is no budget with `budget_id`, or
/// [Error::SqlError] if there is some other SQL error.
pub fn get_budget(budget_id: BudgetId, connection: &Connection) -> Result<Budget, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, amount, emoji, created_at FROM budget WHERE id = :id",
        )?
        .query_row(&[(":id", &budget_id)], map_budget_row)
        .optional()?
        .ok_or(Error::BudgetNotFound)
}

/// Get a budget by its ID, checking that it belongs to `user_id`.
///
/// Budgets owned by other users are reported as missing so that their IDs
/// are not leaked.
///
/// # Errors
/// Returns [Error::BudgetNotFound] if there is no budget with `budget_id` or
/// it belongs to another user, or [Error::SqlError] if there is some other SQL error.
pub fn get_owned_budget(
    budget_id: BudgetId,
    user_id: UserId,
    connection: &Connection,
) -> Result<Budget, Error> {
    let budget = get_budget(budget_id, connection)?;

    if budget.user_id != user_id {
        tracing::warn!("user {user_id} tried to access budget {budget_id} owned by another user");
        return Err(Error::BudgetNotFound);
    }

    Ok(budget)
}

/// Get all budgets of the user registered with `email`, each with their
/// transactions.
///
/// Budgets are ordered newest first, as are the transactions of each budget.
///
/// # Errors
/// Returns [Error::UserNotFound] if no user is registered with `email`, or
/// [Error::SqlError] if there is some other SQL error.
pub fn get_budgets_by_user(
    email: &str,
    connection: &Connection,
) -> Result<Vec<BudgetWithTransactions>, Error> {
    let user = get_user_by_email(email, connection)?;

    let budgets = connection
        .prepare(
            "SELECT id, user_id, name, amount, emoji, created_at
             FROM budget
             WHERE user_id = :user_id
             ORDER BY created_at DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user.id.as_i64())], map_budget_row)?
        .collect::<Result<Vec<Budget>, rusqlite::Error>>()?;

    let mut transactions_by_budget: HashMap<BudgetId, Vec<Transaction>> = HashMap::new();
    let mut statement = connection.prepare(
        "SELECT t.id, t.budget_id, t.amount, t.description, t.emoji, t.created_at
         FROM \"transaction\" t
         INNER JOIN budget b ON t.budget_id = b.id
         WHERE b.user_id = :user_id
         ORDER BY t.created_at DESC, t.id DESC",
    )?;
    let transactions = statement.query_map(&[(":user_id", &user.id.as_i64())], map_transaction_row)?;

    for transaction in transactions {
        let transaction = transaction?;
        transactions_by_budget
            .entry(transaction.budget_id)
            .or_default()
            .push(transaction);
    }

    Ok(budgets
        .into_iter()
        .map(|budget| BudgetWithTransactions {
            transactions: transactions_by_budget.remove(&budget.id).unwrap_or_default(),
            budget,
        })
        .collect())
}

/// Get a budget and its transactions, newest first.
///
/// # Errors
/// Returns [Error::BudgetNotFound] if there is no budget with `budget_id`, or
/// [Error::SqlError] if there is some other SQL error.
pub fn get_budget_with_transactions(
    budget_id: BudgetId,
    connection: &Connection,
) -> Result<BudgetWithTransactions, Error> {
    let budget = get_budget(budget_id, connection)?;

    let transactions = connection
        .prepare(
            "SELECT id, budget_id, amount, description, emoji, created_at
             FROM \"transaction\"
             WHERE budget_id = :budget_id
             ORDER BY created_at DESC, id DESC",
        )?
        .query_map(&[(":budget_id", &budget_id)], map_transaction_row)?
        .collect::<Result<Vec<Transaction>, rusqlite::Error>>()?;

    Ok(BudgetWithTransactions {
        budget,
        transactions,
    })
}

/// Delete a budget along with all of its transactions.
///
/// Both deletes happen in a single database transaction, so either the
/// budget and all its transactions are gone or nothing changed.
///
/// # Errors
/// Returns [Error::BudgetNotFound] if there is no budget with `budget_id`, or
/// [Error::SqlError] if there is some other SQL error.
pub fn delete_budget(budget_id: BudgetId, connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let transactions_deleted = transaction.execute(
        "DELETE FROM \"transaction\" WHERE budget_id = :budget_id",
        &[(":budget_id", &budget_id)],
    )?;
    let budgets_deleted =
        transaction.execute("DELETE FROM budget WHERE id = :id", &[(":id", &budget_id)])?;

    if budgets_deleted == 0 {
        // Dropping the transaction rolls it back.
        return Err(Error::BudgetNotFound);
    }

    transaction.commit()?;
    tracing::debug!("deleted budget {budget_id} and {transactions_deleted} transactions");

    Ok(())
}
