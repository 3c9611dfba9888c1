//! Budgets: named spending targets owned by a user.
//!
//! This module contains:
//! - The `Budget` model and its validated fields
//! - Database functions for storing, querying and deleting budgets
//! - The budgets page, the page for managing a budget and their endpoints

mod budgets_page;
mod core;
mod create_endpoint;
mod delete_endpoint;
mod domain;
mod manage_page;

pub use budgets_page::get_budgets_page;
pub use core::{
    add_budget, create_budget_table, delete_budget, get_budget, get_budget_with_transactions,
    get_budgets_by_user, get_owned_budget,
};
pub use create_endpoint::create_budget_endpoint;
pub use delete_endpoint::delete_budget_endpoint;
pub use domain::{
    Budget, BudgetName, BudgetWithTransactions, Emoji, NewBudget, validate_amount,
};
pub use manage_page::get_manage_budget_page;
