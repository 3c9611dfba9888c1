//! Reducers that summarise a user's budgets for the dashboard.
//!
//! All functions work on the budgets fetched by
//! [get_budgets_by_user](crate::budget::get_budgets_by_user), so the
//! dashboard only needs a single query.

use std::collections::HashMap;

use crate::{
    budget::BudgetWithTransactions, database_id::BudgetId, transaction::Transaction,
};

/// How many of the latest transactions the dashboard lists.
pub(super) const RECENT_TRANSACTIONS_LIMIT: usize = 10;
/// How many of the latest budgets the dashboard lists.
pub(super) const RECENT_BUDGETS_LIMIT: usize = 3;
/// Shown in place of the budget name when a transaction's budget is unknown.
pub(super) const MISSING_BUDGET_NAME: &str = "N/A";

/// The amounts to plot for a single budget.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct BudgetChartData {
    pub name: String,
    pub target: f64,
    pub spent: f64,
}

/// A transaction along with the name of the budget it was spent from.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct RecentTransaction<'a> {
    pub transaction: &'a Transaction,
    pub budget_name: String,
}

/// The sum of all transactions across all budgets.
pub(super) fn total_transaction_amount(budgets: &[BudgetWithTransactions]) -> f64 {
    budgets.iter().map(BudgetWithTransactions::total_spent).sum()
}

/// The number of transactions across all budgets.
pub(super) fn transaction_count(budgets: &[BudgetWithTransactions]) -> usize {
    budgets.iter().map(|budget| budget.transactions.len()).sum()
}

/// The number of budgets whose spending has reached their target amount over
/// the number of budgets, formatted as "X/Y".
pub(super) fn reached_budgets_ratio(budgets: &[BudgetWithTransactions]) -> String {
    let reached = budgets.iter().filter(|budget| budget.is_reached()).count();

    format!("{reached}/{}", budgets.len())
}

/// The target and the amount spent for each budget, in the same order as `budgets`.
pub(super) fn budget_chart_data(budgets: &[BudgetWithTransactions]) -> Vec<BudgetChartData> {
    budgets
        .iter()
        .map(|budget| BudgetChartData {
            name: budget.budget.name.to_string(),
            target: budget.budget.amount,
            spent: budget.total_spent(),
        })
        .collect()
}

/// The `limit` most recent transactions across all budgets, newest first.
pub(super) fn last_transactions(
    budgets: &[BudgetWithTransactions],
    limit: usize,
) -> Vec<RecentTransaction<'_>> {
    let budget_names: HashMap<BudgetId, &str> = budgets
        .iter()
        .map(|budget| (budget.budget.id, budget.budget.name.as_ref()))
        .collect();

    let mut transactions: Vec<&Transaction> = budgets
        .iter()
        .flat_map(|budget| budget.transactions.iter())
        .collect();
    transactions.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });

    transactions
        .into_iter()
        .take(limit)
        .map(|transaction| RecentTransaction {
            transaction,
            budget_name: budget_names
                .get(&transaction.budget_id)
                .copied()
                .unwrap_or(MISSING_BUDGET_NAME)
                .to_owned(),
        })
        .collect()
}

/// The `limit` most recently created budgets, newest first.
pub(super) fn last_budgets(
    budgets: &[BudgetWithTransactions],
    limit: usize,
) -> Vec<&BudgetWithTransactions> {
    let mut budgets: Vec<&BudgetWithTransactions> = budgets.iter().collect();
    budgets.sort_by(|a, b| {
        b.budget
            .created_at
            .cmp(&a.budget.created_at)
            .then_with(|| b.budget.id.cmp(&a.budget.id))
    });
    budgets.truncate(limit);

    budgets
}
