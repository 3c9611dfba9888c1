//! The page listing a user's budgets along with the form for creating a budget.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, User,
    budget::{BudgetWithTransactions, get_budgets_by_user},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, base, budget_card,
    },
    navigation::NavBar,
};

/// The state needed for the budgets page.
#[derive(Debug, Clone)]
pub struct BudgetsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the signed in user's budgets, newest first.
pub async fn get_budgets_page(
    State(state): State<BudgetsPageState>,
    Extension(user): Extension<User>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budgets = get_budgets_by_user(&user.email, &connection)
        .inspect_err(|error| tracing::error!("could not get budgets for {}: {error}", user.id))?;

    Ok(budgets_view(&budgets).into_response())
}

fn budgets_view(budgets: &[BudgetWithTransactions]) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-5xl space-y-6"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Budgets" }
                }

                (new_budget_form_view())

                @if budgets.is_empty() {
                    p
                        class="rounded border border-dashed border-gray-300 bg-white px-4 py-6
                            text-center text-sm text-gray-500 dark:border-gray-700
                            dark:bg-gray-800 dark:text-gray-400"
                        data-empty-budgets="true"
                    {
                        "You have no budgets yet. Create one with the form above."
                    }
                } @else {
                    ul class="grid gap-4 md:grid-cols-2 lg:grid-cols-3"
                    {
                        @for budget in budgets {
                            li { (budget_card(budget, true)) }
                        }
                    }
                }
            }
        }
    );

    base("Budgets", &[], &content)
}

fn new_budget_form_view() -> Markup {
    html!(
        form
            hx-post=(endpoints::BUDGETS_API)
            hx-target-error="#alert-container"
            class={ (CARD_STYLE) " w-full grid gap-4 md:grid-cols-4 md:items-end" }
        {
            div class="md:col-span-2"
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Alimentation"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount (GNF)" }

                input
                    id="amount"
                    type="number"
                    name="amount"
                    min="1"
                    step="1"
                    placeholder="500000"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="emoji" class=(FORM_LABEL_STYLE) { "Emoji" }

                input
                    id="emoji"
                    type="text"
                    name="emoji"
                    placeholder="🍎"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="md:col-span-4"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Budget" }
            }
        }
    )
}

#[cfg(test)]
mod budgets_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State};
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        budget::{
            BudgetName, Emoji, NewBudget, add_budget, budgets_page::BudgetsPageState,
            get_budgets_page,
        },
        db::initialize,
        endpoints::{self, format_endpoint},
        test_utils::{
            assert_content_type, assert_form_input, assert_form_submit_button,
            assert_hx_endpoint, assert_status_ok, assert_valid_html, must_get_form,
            parse_html_document,
        },
        user::{User, check_and_add_user},
    };

    const EMAIL: &str = "foo@bar.baz";

    fn get_test_state() -> (BudgetsPageState, User) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = check_and_add_user(EMAIL, &connection).unwrap();

        (
            BudgetsPageState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user,
        )
    }

    #[tokio::test]
    async fn renders_create_form() {
        let (state, user) = get_test_state();

        let response = get_budgets_page(State(state), Extension(user))
            .await
            .unwrap();

        assert_status_ok(&response);
        assert_content_type(&response, "text/html; charset=utf-8");
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::BUDGETS_API, "hx-post");
        assert_form_input(&form, "name", "text");
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "emoji", "text");
        assert_form_submit_button(&form);
    }

    #[tokio::test]
    async fn shows_empty_state_without_budgets() {
        let (state, user) = get_test_state();

        let response = get_budgets_page(State(state), Extension(user))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let selector = Selector::parse("[data-empty-budgets='true']").unwrap();
        assert!(html.select(&selector).next().is_some());
    }

    #[tokio::test]
    async fn lists_budget_cards_linking_to_manage_page() {
        let (state, user) = get_test_state();
        let budget = {
            let connection = state.db_connection.lock().unwrap();
            add_budget(
                EMAIL,
                NewBudget::new(
                    BudgetName::new_unchecked("Transport"),
                    300_000.0,
                    Emoji::new_unchecked("🚗"),
                ),
                &connection,
            )
            .unwrap()
        };

        let response = get_budgets_page(State(state), Extension(user))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let card_selector = Selector::parse("[data-budget-card='true']").unwrap();
        let cards: Vec<_> = html.select(&card_selector).collect();
        assert_eq!(cards.len(), 1);
        let card_text = cards[0].text().collect::<String>();
        assert!(card_text.contains("Transport"), "got card text {card_text:?}");
        assert!(card_text.contains("300 000 GNF"), "got card text {card_text:?}");

        let link_selector = Selector::parse("a[href]").unwrap();
        let manage_url = format_endpoint(endpoints::MANAGE_BUDGET_VIEW, budget.id);
        assert!(
            html.select(&link_selector)
                .any(|link| link.value().attr("href") == Some(manage_url.as_str())),
            "want a link to {manage_url}"
        );
    }
}
