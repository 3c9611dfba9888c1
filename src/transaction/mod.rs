//! Transaction management for the budgeting application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `NewTransaction` for recording spending
//! - The look back periods used to filter the transaction history
//! - Database functions for storing, querying and deleting transactions
//! - The transactions page and the endpoints for creating and deleting transactions

mod core;
mod create_endpoint;
mod delete_endpoint;
mod period;
mod transactions_page;

pub use core::{
    NewTransaction, Transaction, TransactionWithBudget, add_transaction_to_budget,
    create_transaction_table, delete_transaction, get_transaction,
    get_transactions_by_email_and_period, map_transaction_row,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use period::Period;
pub use transactions_page::get_transactions_page;

#[cfg(test)]
pub use core::count_transactions;
