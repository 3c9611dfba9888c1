//! The page showing the user's transaction history across all budgets,
//! filtered to a look back period.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{OffsetDateTime, UtcOffset};

use crate::{
    AppState, Error, User,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
        time_element,
    },
    navigation::NavBar,
    timezone::local_offset_or_error,
    transaction::{Period, TransactionWithBudget, get_transactions_by_email_and_period},
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Africa/Conakry".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query parameters for the transactions page.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionsQuery {
    /// The period tag, e.g. "last30". Defaults to the last 30 days.
    pub period: Option<String>,
}

/// Renders the user's transactions within the requested period, newest first.
///
/// # Errors
/// Responds with a 400 error page if the period is not one of the supported tags.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    Extension(user): Extension<User>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Response, Error> {
    let period = match query.period.as_deref() {
        Some(tag) => tag
            .parse::<Period>()
            .inspect_err(|error| tracing::warn!("rejected transactions query: {error}"))?,
        None => Period::default(),
    };
    let local_offset = local_offset_or_error(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions_by_email_and_period(
        &user.email,
        period,
        OffsetDateTime::now_utc(),
        &connection,
    )
    .inspect_err(|error| tracing::error!("could not get transactions for {}: {error}", user.id))?;

    Ok(transactions_view(&transactions, period, local_offset).into_response())
}

fn transactions_view(
    transactions: &[TransactionWithBudget],
    period: Period,
    local_offset: UtcOffset,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let total: f64 = transactions
        .iter()
        .map(|transaction| transaction.transaction.amount)
        .sum();

    let table_row = |row: &TransactionWithBudget| {
        let transaction = &row.transaction;
        let budget_url = format_endpoint(endpoints::MANAGE_BUDGET_VIEW, transaction.budget_id);

        html!(
            tr class=(TABLE_ROW_STYLE) data-transaction-row="true"
            {
                td class=(TABLE_CELL_STYLE) { (time_element(transaction.created_at, local_offset)) }
                td class=(TABLE_CELL_STYLE)
                {
                    (transaction.emoji) " "
                    a href=(budget_url) class=(LINK_STYLE) { (row.budget_name) }
                }
                td class=(TABLE_CELL_STYLE) { (transaction.description) }
                td class="px-6 py-4 text-right tabular-nums" { (format_currency(transaction.amount)) }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-5xl space-y-4"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    div
                    {
                        h1 class="text-xl font-bold" { "Transactions" }
                        p class="text-sm text-gray-500 dark:text-gray-400" data-summary="true"
                        {
                            (transactions.len())
                            @if transactions.len() == 1 { " transaction" } @else { " transactions" }
                            " totalling " (format_currency(total))
                        }
                    }

                    (period_form_view(period))
                }

                section class="w-full overflow-x-auto dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Budget" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class="px-6 py-3 text-right" { "Amount" }
                            }
                        }

                        tbody
                        {
                            @for transaction in transactions {
                                (table_row(transaction))
                            }

                            @if transactions.is_empty() {
                                tr
                                {
                                    td
                                        colspan="4"
                                        class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                    {
                                        "No transactions in the " (period.label().to_lowercase()) "."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Transactions", &[], &content)
}

fn period_form_view(selected: Period) -> Markup {
    html!(
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            class="flex items-end gap-2"
        {
            div
            {
                label for="period" class=(FORM_LABEL_STYLE) { "Period" }

                select
                    id="period"
                    name="period"
                    onchange="this.form.submit()"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for period in Period::ALL {
                        option value=(period.tag()) selected[period == selected] { (period.label()) }
                    }
                }
            }

            div
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Filter" }
            }
        }
    )
}
