//! The page for managing a single budget: recording and deleting its
//! transactions, or deleting the budget itself.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::UtcOffset;

use crate::{
    AppState, Error, User,
    budget::{BudgetWithTransactions, get_budget_with_transactions, get_owned_budget},
    database_id::BudgetId,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, budget_card, format_currency, time_element,
    },
    navigation::NavBar,
    timezone::local_offset_or_error,
    transaction::Transaction,
};

/// The state needed for the manage budget page.
#[derive(Debug, Clone)]
pub struct ManageBudgetState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Africa/Conakry".
    pub local_timezone: String,
}

impl FromRef<AppState> for ManageBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Renders the page for managing one of the signed in user's budgets.
///
/// Budgets owned by other users are reported as not found.
pub async fn get_manage_budget_page(
    State(state): State<ManageBudgetState>,
    Extension(user): Extension<User>,
    Path(budget_id): Path<BudgetId>,
) -> Result<Response, Error> {
    let local_offset = local_offset_or_error(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_owned_budget(budget_id, user.id, &connection)?;
    let budget = get_budget_with_transactions(budget_id, &connection)
        .inspect_err(|error| tracing::error!("could not get budget {budget_id}: {error}"))?;

    Ok(manage_budget_view(&budget, local_offset).into_response())
}

fn manage_budget_view(budget: &BudgetWithTransactions, local_offset: UtcOffset) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();
    let title = format!("{} {}", budget.budget.emoji, budget.budget.name);
    let delete_budget_url = format_endpoint(endpoints::BUDGET, budget.budget.id);
    let confirm_message = format!(
        "Are you sure you want to delete the budget '{}' and all of its transactions? \
        This cannot be undone.",
        budget.budget.name
    );

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-3xl space-y-6"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    div
                    {
                        a href=(endpoints::BUDGETS_VIEW) class=(LINK_STYLE) { "Back to budgets" }
                        h1 class="text-xl font-bold" { (title) }
                    }

                    button
                        type="button"
                        hx-delete=(delete_budget_url)
                        hx-confirm=(confirm_message)
                        hx-target-error="#alert-container"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete budget"
                    }
                }

                (budget_card(budget, false))

                (new_transaction_form_view(budget))

                (transactions_table_view(&budget.transactions, local_offset))
            }
        }
    );

    base(&budget.budget.name.to_string(), &[], &content)
}

fn new_transaction_form_view(budget: &BudgetWithTransactions) -> Markup {
    let create_transaction_url = format_endpoint(endpoints::BUDGET_TRANSACTIONS, budget.budget.id);
    let remaining = budget.remaining().max(0.0);

    html!(
        form
            hx-post=(create_transaction_url)
            hx-target-error="#alert-container"
            class={ (CARD_STYLE) " w-full grid gap-4 md:grid-cols-3 md:items-end" }
        {
            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount (GNF)" }

                input
                    id="amount"
                    type="number"
                    name="amount"
                    min="1"
                    step="1"
                    placeholder=(format!("Up to {}", format_currency(remaining)))
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="md:col-span-2"
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    id="description"
                    type="text"
                    name="description"
                    placeholder="Pizzeria"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="md:col-span-3"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Transaction" }
            }
        }
    )
}

fn transactions_table_view(transactions: &[Transaction], local_offset: UtcOffset) -> Markup {
    let table_row = |transaction: &Transaction| {
        let delete_url = format_endpoint(endpoints::TRANSACTION, transaction.id);

        html!(
            tr class=(TABLE_ROW_STYLE) data-transaction-row="true"
            {
                td class=(TABLE_CELL_STYLE) { (time_element(transaction.created_at, local_offset)) }
                td class=(TABLE_CELL_STYLE) { (transaction.emoji) " " (transaction.description) }
                td class="px-6 py-4 text-right tabular-nums" { (format_currency(transaction.amount)) }
                td class=(TABLE_CELL_STYLE)
                {
                    button
                        type="button"
                        hx-delete=(delete_url)
                        hx-confirm="Are you sure you want to delete this transaction?"
                        hx-target="#alert-container"
                        hx-target-error="#alert-container"
                        hx-on:htmx:after-request="if (event.detail.successful) this.closest('tr').remove()"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete"
                    }
                }
            }
        )
    };

    html!(
        section class="w-full overflow-x-auto dark:bg-gray-800"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class="px-6 py-3 text-right" { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
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
                                "No transactions recorded for this budget yet."
                            }
                        }
                    }
                }
            }
        }
    )
}

#[cfg(test)]
mod manage_budget_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
    };
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        Error,
        budget::{
            BudgetName, Emoji, NewBudget, add_budget, get_manage_budget_page,
            manage_page::ManageBudgetState,
        },
        db::initialize,
        endpoints::{self, format_endpoint},
        test_utils::{
            assert_form_input, assert_hx_endpoint, assert_status_ok, assert_valid_html,
            must_get_form, parse_html_document,
        },
        transaction::{NewTransaction, add_transaction_to_budget},
        user::{User, check_and_add_user},
    };

    const EMAIL: &str = "foo@bar.baz";

    fn get_test_state() -> (ManageBudgetState, User) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = check_and_add_user(EMAIL, &connection).unwrap();

        (
            ManageBudgetState {
                db_connection: Arc::new(Mutex::new(connection)),
                local_timezone: "Africa/Conakry".to_owned(),
            },
            user,
        )
    }

    fn add_test_budget(state: &ManageBudgetState) -> i64 {
        let connection = state.db_connection.lock().unwrap();
        let budget = add_budget(
            EMAIL,
            NewBudget::new(
                BudgetName::new_unchecked("Alimentation"),
                500_000.0,
                Emoji::new_unchecked("🍎"),
            ),
            &connection,
        )
        .unwrap();
        add_transaction_to_budget(budget.id, NewTransaction::new(50_000.0, "Pizzeria"), &connection)
            .unwrap();
        add_transaction_to_budget(
            budget.id,
            NewTransaction::new(30_000.0, "Boulangerie"),
            &connection,
        )
        .unwrap();

        budget.id
    }

    #[tokio::test]
    async fn renders_budget_with_transactions() {
        let (state, user) = get_test_state();
        let budget_id = add_test_budget(&state);

        let response = get_manage_budget_page(State(state), Extension(user), Path(budget_id))
            .await
            .unwrap();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::BUDGET_TRANSACTIONS, budget_id),
            "hx-post",
        );
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "description", "text");

        let row_selector = Selector::parse("tr[data-transaction-row='true']").unwrap();
        let rows: Vec<_> = html.select(&row_selector).collect();
        assert_eq!(rows.len(), 2);
        let first_row = rows[0].text().collect::<String>();
        assert!(first_row.contains("Boulangerie"), "newest first, got {first_row:?}");
        assert!(first_row.contains("30 000 GNF"), "got {first_row:?}");

        let card_selector = Selector::parse("[data-budget-card='true']").unwrap();
        let card_text = html
            .select(&card_selector)
            .next()
            .expect("No budget card found")
            .text()
            .collect::<String>();
        assert!(card_text.contains("80 000 GNF spent"), "got {card_text:?}");
        assert!(card_text.contains("420 000 GNF remaining"), "got {card_text:?}");
    }

    #[tokio::test]
    async fn has_delete_budget_button() {
        let (state, user) = get_test_state();
        let budget_id = add_test_budget(&state);

        let response = get_manage_budget_page(State(state), Extension(user), Path(budget_id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let selector = Selector::parse("button[hx-delete]").unwrap();
        let want_url = format_endpoint(endpoints::BUDGET, budget_id);
        assert!(
            html.select(&selector)
                .any(|button| button.value().attr("hx-delete") == Some(want_url.as_str())),
            "want a button that deletes {want_url}"
        );
    }

    #[tokio::test]
    async fn transaction_delete_errors_go_to_alert_container() {
        let (state, user) = get_test_state();
        let budget_id = add_test_budget(&state);

        let response = get_manage_budget_page(State(state), Extension(user), Path(budget_id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let selector =
            Selector::parse("tr[data-transaction-row='true'] button[hx-delete]").unwrap();
        let buttons: Vec<_> = html.select(&selector).collect();
        assert_eq!(buttons.len(), 2);
        for button in buttons {
            assert_eq!(
                button.value().attr("hx-target-error"),
                Some("#alert-container")
            );
        }
    }

    #[tokio::test]
    async fn budget_of_another_user_is_not_found() {
        let (state, _) = get_test_state();
        let budget_id = add_test_budget(&state);
        let intruder = {
            let connection = state.db_connection.lock().unwrap();
            check_and_add_user("intruder@bar.baz", &connection).unwrap()
        };

        let result =
            get_manage_budget_page(State(state), Extension(intruder), Path(budget_id)).await;

        assert_eq!(result.err(), Some(Error::BudgetNotFound));
    }
}
