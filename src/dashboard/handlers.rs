//! Dashboard HTTP handlers and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::UtcOffset;

use crate::{
    AppState, Error, User,
    budget::{BudgetWithTransactions, get_budgets_by_user},
    dashboard::{
        aggregation::{
            RECENT_BUDGETS_LIMIT, RECENT_TRANSACTIONS_LIMIT, budget_chart_data, last_budgets,
            last_transactions, reached_budgets_ratio, total_transaction_amount, transaction_count,
        },
        cards::{DashboardSummary, summary_cards_view},
        charts::{DashboardChart, budgets_chart, charts_script, charts_view},
        tables::recent_transactions_table,
    },
    endpoints,
    html::{HeadElement, LINK_STYLE, base, budget_card, link},
    navigation::NavBar,
    timezone::local_offset_or_error,
};

const ECHARTS_URL: &str = "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js";

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading budgets and transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Africa/Conakry".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display a page with an overview of the user's budgets and spending.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user): Extension<User>,
) -> Result<Response, Error> {
    let local_offset = local_offset_or_error(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budgets = get_budgets_by_user(&user.email, &connection)
        .inspect_err(|error| tracing::error!("could not get budgets for {}: {error}", user.id))?;

    if budgets.is_empty() {
        return Ok(dashboard_no_data_view().into_response());
    }

    Ok(dashboard_view(&budgets, local_offset).into_response())
}

fn dashboard_no_data_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let budgets_link = link(endpoints::BUDGETS_VIEW, "budgets page");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Your spending will show up here once you create a budget.
                You can create one on the " (budgets_link) "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

fn dashboard_view(budgets: &[BudgetWithTransactions], local_offset: UtcOffset) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let summary = DashboardSummary {
        total_spent: total_transaction_amount(budgets),
        transaction_count: transaction_count(budgets),
        reached_budgets: reached_budgets_ratio(budgets),
    };
    let charts = [DashboardChart {
        id: "budgets-chart",
        options: budgets_chart(&budget_chart_data(budgets)).to_string(),
    }];
    let recent_transactions = last_transactions(budgets, RECENT_TRANSACTIONS_LIMIT);
    let recent_budgets = last_budgets(budgets, RECENT_BUDGETS_LIMIT);

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (summary_cards_view(&summary))

            (charts_view(&charts))

            @if !recent_transactions.is_empty() {
                (recent_transactions_table(&recent_transactions, local_offset))
            }

            section class="w-full mb-8"
            {
                div class="flex justify-between items-baseline mb-4"
                {
                    h3 class="text-xl font-semibold" { "Latest budgets" }
                    a href=(endpoints::BUDGETS_VIEW) class=(LINK_STYLE) { "View all" }
                }

                ul class="grid gap-4 md:grid-cols-3"
                {
                    @for budget in recent_budgets {
                        li { (budget_card(budget, true)) }
                    }
                }
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_URL.to_owned()),
        charts_script(&charts),
    ];

    base("Dashboard", &scripts, &content)
}
