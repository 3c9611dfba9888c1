//! Summary cards shown at the top of the dashboard.

use maud::{Markup, html};

use crate::html::{CARD_STYLE, format_currency};

/// The headline figures for the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct DashboardSummary {
    pub total_spent: f64,
    pub transaction_count: usize,
    pub reached_budgets: String,
}

fn summary_card(label: &str, value: &str, id: &str) -> Markup {
    html! {
        div class=(CARD_STYLE) data-summary-card=(id) {
            p class="text-sm font-medium text-gray-500 dark:text-gray-400" { (label) }
            p class="mt-2 text-2xl font-bold tabular-nums text-gray-900 dark:text-white" { (value) }
        }
    }
}

/// Renders the total spent, the number of transactions and the reached budgets ratio.
pub(super) fn summary_cards_view(summary: &DashboardSummary) -> Markup {
    html! {
        section class="w-full grid grid-cols-1 md:grid-cols-3 gap-4 mb-8" {
            (summary_card("Total spent", &format_currency(summary.total_spent), "total-spent"))
            (summary_card("Transactions", &summary.transaction_count.to_string(), "transaction-count"))
            (summary_card("Budgets reached", &summary.reached_budgets, "reached-budgets"))
        }
    }
}
