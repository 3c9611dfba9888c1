//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, OptionalExtension, Row, Transaction as SqlTransaction, TransactionBehavior};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};

use crate::{
    Error,
    budget::{Emoji, get_budget, validate_amount},
    database_id::{BudgetId, TransactionId},
    transaction::Period,
    user::get_user_by_email,
};

// ============================================================================
// MODELS
// ============================================================================

/// A single spend recorded against a budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The budget the money was spent from.
    pub budget_id: BudgetId,
    /// The amount of money spent in GNF.
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The budget's emoji at the time the transaction was created.
    ///
    /// This is a snapshot and is not updated if the budget's emoji changes.
    pub emoji: Emoji,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
}

/// The data for recording a new transaction.
///
/// To use a creation time other than now, use [NewTransaction::created_at].
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The amount of money spent in GNF.
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    pub created_at: OffsetDateTime,
}

impl NewTransaction {
    /// Create the data for a transaction recorded now.
    pub fn new(amount: f64, description: &str) -> Self {
        Self {
            amount,
            description: description.trim().to_owned(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Set when the transaction happened.
    pub fn created_at(mut self, created_at: OffsetDateTime) -> Self {
        self.created_at = created_at;
        self
    }
}

/// A transaction along with the name of the budget it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionWithBudget {
    /// The transaction.
    pub transaction: Transaction,
    /// The name of the transaction's budget.
    pub budget_name: String,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            budget_id INTEGER NOT NULL,
            amount REAL NOT NULL,
            description TEXT NOT NULL,
            emoji TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(budget_id) REFERENCES budget(id) ON UPDATE CASCADE
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_budget_created_at
         ON \"transaction\"(budget_id, created_at)",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Transaction].
///
/// The row must contain the columns `id, budget_id, amount, description,
/// emoji, created_at` in that order.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let emoji: String = row.get(4)?;

    Ok(Transaction {
        id: row.get(0)?,
        budget_id: row.get(1)?,
        amount: row.get(2)?,
        description: row.get(3)?,
        emoji: Emoji::new_unchecked(&emoji),
        created_at: row.get(5)?,
    })
}

/// Record a transaction against a budget.
///
/// The transaction is rejected if the budget's transactions plus the new
/// amount would add up to more than the budget's target amount. The check
/// and the insert run in one database transaction so that concurrent
/// requests cannot both pass the check against the same total.
///
/// The new transaction takes a copy of the budget's current emoji.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] if the amount is not greater than zero,
/// - [Error::BudgetNotFound] if there is no budget with `budget_id`,
/// - [Error::BudgetExceeded] if the transaction would take the budget over its target amount,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn add_transaction_to_budget(
    budget_id: BudgetId,
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let amount = validate_amount(new_transaction.amount)?;
    let sql_transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let budget = get_budget(budget_id, &sql_transaction)?;
    let current_total: f64 = sql_transaction.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM \"transaction\" WHERE budget_id = ?1",
        (budget_id,),
        |row| row.get(0),
    )?;

    if current_total + amount > budget.amount {
        tracing::warn!(
            "rejected transaction of {amount} for budget {budget_id}: {current_total} of {} already spent",
            budget.amount
        );

        return Err(Error::BudgetExceeded {
            budget_amount: budget.amount,
            current_total,
            requested: amount,
        });
    }

    let transaction = sql_transaction
        .prepare(
            "INSERT INTO \"transaction\" (budget_id, amount, description, emoji, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, budget_id, amount, description, emoji, created_at",
        )?
        .query_row(
            (
                budget.id,
                amount,
                &new_transaction.description,
                budget.emoji.as_ref(),
                new_transaction.created_at.to_offset(UtcOffset::UTC),
            ),
            map_transaction_row,
        )?;

    sql_transaction.commit()?;

    Ok(transaction)
}

/// Get a transaction by its ID.
///
/// # Errors
/// Returns [Error::TransactionNotFound] if there is no transaction with
/// `transaction_id`, or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, budget_id, amount, description, emoji, created_at
             FROM \"transaction\" WHERE id = :id",
        )?
        .query_row(&[(":id", &transaction_id)], map_transaction_row)
        .optional()?
        .ok_or(Error::TransactionNotFound)
}

/// Delete a transaction, returning the deleted transaction.
///
/// # Errors
/// Returns [Error::TransactionNotFound] if there is no transaction with
/// `transaction_id`, or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "DELETE FROM \"transaction\" WHERE id = :id
             RETURNING id, budget_id, amount, description, emoji, created_at",
        )?
        .query_row(&[(":id", &transaction_id)], map_transaction_row)
        .optional()?
        .ok_or(Error::TransactionNotFound)
}

/// Get the transactions across all budgets of the user registered with
/// `email` that were created within `period` of `now`.
///
/// Transactions are ordered newest first.
///
/// # Errors
/// Returns [Error::UserNotFound] if no user is registered with `email`, or
/// [Error::SqlError] if there is some other SQL error.
pub fn get_transactions_by_email_and_period(
    email: &str,
    period: Period,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Vec<TransactionWithBudget>, Error> {
    let user = get_user_by_email(email, connection)?;
    let cutoff = period.cutoff(now).to_offset(UtcOffset::UTC);

    connection
        .prepare(
            "SELECT t.id, t.budget_id, t.amount, t.description, t.emoji, t.created_at, b.name
             FROM \"transaction\" t
             INNER JOIN budget b ON t.budget_id = b.id
             WHERE b.user_id = ?1 AND t.created_at >= ?2
             ORDER BY t.created_at DESC, t.id DESC",
        )?
        .query_map((user.id.as_i64(), cutoff), |row| {
            Ok(TransactionWithBudget {
                transaction: map_transaction_row(row)?,
                budget_name: row.get(6)?,
            })
        })?
        .map(|transaction| transaction.map_err(Error::from))
        .collect()
}

#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row("SELECT COUNT(*) FROM \"transaction\"", [], |row| row.get(0))
        .map_err(Error::from)
}



#[cfg(test)]
mod period_query_tests {
    use rusqlite::Connection;
    use time::{Duration, macros::datetime};

    use crate::{
        Error,
        budget::{Budget, BudgetName, Emoji, NewBudget, add_budget},
        db::initialize,
        transaction::Period,
        user::check_and_add_user,
    };

    use super::{NewTransaction, add_transaction_to_budget, get_transactions_by_email_and_period};

    const EMAIL: &str = "foo@bar.baz";

    fn add_test_budget(name: &str, emoji: &str, connection: &Connection) -> Budget {
        add_budget(
            EMAIL,
            NewBudget::new(
                BudgetName::new_unchecked(name),
                1_000_000.0,
                Emoji::new_unchecked(emoji),
            ),
            connection,
        )
        .unwrap()
    }

    #[test]
    fn returns_transactions_within_period_newest_first() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        check_and_add_user(EMAIL, &connection).unwrap();
        let food = add_test_budget("Alimentation", "🍎", &connection);
        let transport = add_test_budget("Transport", "🚗", &connection);
        let now = datetime!(2025-06-15 12:00 UTC);
        for (budget_id, days_ago, description) in [
            (food.id, 1, "Pizzeria"),
            (transport.id, 3, "Taxi"),
            (food.id, 7, "Boulangerie"),
            (transport.id, 8, "Essence"),
            (food.id, 40, "Marché"),
        ] {
            add_transaction_to_budget(
                budget_id,
                NewTransaction::new(1_000.0, description).created_at(now - Duration::days(days_ago)),
                &connection,
            )
            .unwrap();
        }

        let transactions =
            get_transactions_by_email_and_period(EMAIL, Period::Last7Days, now, &connection)
                .unwrap();

        let got: Vec<(&str, &str)> = transactions
            .iter()
            .map(|t| (t.transaction.description.as_str(), t.budget_name.as_str()))
            .collect();
        assert_eq!(
            got,
            [
                ("Pizzeria", "Alimentation"),
                ("Taxi", "Transport"),
                ("Boulangerie", "Alimentation"),
            ]
        );
        assert!(
            transactions
                .iter()
                .all(|t| t.transaction.created_at >= now - Duration::days(7))
        );

        let last30 =
            get_transactions_by_email_and_period(EMAIL, Period::Last30Days, now, &connection)
                .unwrap();
        assert_eq!(last30.len(), 4);

        let last90 =
            get_transactions_by_email_and_period(EMAIL, Period::Last90Days, now, &connection)
                .unwrap();
        assert_eq!(last90.len(), 5);
    }

    #[test]
    fn excludes_other_users_transactions() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        check_and_add_user(EMAIL, &connection).unwrap();
        check_and_add_user("other@bar.baz", &connection).unwrap();
        let other_budget = add_budget(
            "other@bar.baz",
            NewBudget::new(
                BudgetName::new_unchecked("Maison"),
                600_000.0,
                Emoji::new_unchecked("🏠"),
            ),
            &connection,
        )
        .unwrap();
        let now = datetime!(2025-06-15 12:00 UTC);
        add_transaction_to_budget(
            other_budget.id,
            NewTransaction::new(250_000.0, "Meubles").created_at(now - Duration::days(1)),
            &connection,
        )
        .unwrap();

        let transactions =
            get_transactions_by_email_and_period(EMAIL, Period::Last365Days, now, &connection)
                .unwrap();

        assert!(transactions.is_empty());
    }

    #[test]
    fn unknown_user_is_not_found() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        assert_eq!(
            get_transactions_by_email_and_period(
                "nobody@bar.baz",
                Period::Last7Days,
                datetime!(2025-06-15 12:00 UTC),
                &connection
            ),
            Err(Error::UserNotFound)
        );
    }
}
