//! Table views for dashboard data display.

use maud::{Markup, html};
use time::UtcOffset;

use crate::{
    dashboard::aggregation::RecentTransaction,
    endpoints,
    html::{
        LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_currency,
        time_element,
    },
};

/// Renders a table of the latest transactions across all budgets.
pub(super) fn recent_transactions_table(
    transactions: &[RecentTransaction],
    local_offset: UtcOffset,
) -> Markup {
    html! {
        section class="w-full mb-8" {
            div class="flex justify-between items-baseline mb-4" {
                h3 class="text-xl font-semibold" { "Latest transactions" }
                a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "View all" }
            }

            div class="overflow-x-auto rounded-lg shadow" {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                    thead class=(TABLE_HEADER_STYLE) {
                        tr {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Budget" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class="px-6 py-3 text-right" { "Amount" }
                        }
                    }
                    tbody {
                        @for recent in transactions {
                            tr class=(TABLE_ROW_STYLE) data-recent-transaction="true" {
                                td class=(TABLE_CELL_STYLE) {
                                    (time_element(recent.transaction.created_at, local_offset))
                                }
                                td class=(TABLE_CELL_STYLE) {
                                    (recent.transaction.emoji) " " (recent.budget_name)
                                }
                                td class=(TABLE_CELL_STYLE) { (recent.transaction.description) }
                                td class="px-6 py-4 text-right tabular-nums" {
                                    (format_currency(recent.transaction.amount))
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
