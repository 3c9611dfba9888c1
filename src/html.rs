//! Shared HTML building blocks, styles and formatting helpers.

use std::sync::OnceLock;

use maud::{DOCTYPE, Markup, PreEscaped, html};
use numfmt::{Formatter, Precision};
use time::{OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    budget::BudgetWithTransactions,
    endpoints::{self, format_endpoint},
};

// Link styles
pub const LINK_STYLE: &str = "text-blue-600 hover:text-blue-500 \
    dark:text-blue-500 dark:hover:text-blue-400 underline";

// Button styles
pub const BUTTON_PRIMARY_STYLE: &str = "w-full px-4 py-2 bg-blue-500
    dark:bg-blue-600 disabled:bg-blue-700 hover:enabled:bg-blue-600 \
    hover:enabled:dark:bg-blue-700 text-white rounded";

pub const BUTTON_DELETE_STYLE: &str = "text-red-600 hover:text-red-500 \
    dark:text-red-500 dark:hover:text-red-400 underline bg-transparent \
    border-none cursor-pointer";

// Form styles
pub const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-gray-900 dark:text-white";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-gray-900 dark:text-white disabled:text-gray-500 bg-gray-50 \
    dark:bg-gray-700 border border-gray-300 dark:border-gray-600 \
    dark:placeholder-gray-400 focus:ring-blue-600 focus:border-blue-600 \
    focus:dark:border-blue-500 focus:dark:ring-blue-500";

// Table styles
pub const TABLE_HEADER_STYLE: &str = "text-xs text-gray-700 uppercase \
    bg-gray-50 dark:bg-gray-700 dark:text-gray-400";

pub const TABLE_ROW_STYLE: &str = "bg-white border-b dark:bg-gray-800 dark:border-gray-700";

pub const TABLE_CELL_STYLE: &str = "px-6 py-4";

// Page container
pub const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center px-6 py-8 mx-auto lg:py-5 text-gray-900 dark:text-white";

// Card container
pub const CARD_STYLE: &str = "rounded-lg border border-gray-200 bg-white p-4 shadow-sm \
    dark:border-gray-700 dark:bg-gray-800";

pub enum HeadElement {
    /// The file path or URL to a JavaScript script.
    ScriptLink(String),
    /// JavaScript source code.
    ScriptSource(PreEscaped<String>),
}

pub fn base(title: &str, head_elements: &[HeadElement], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Budget Tracker" }
                link rel="icon" type="image/png" href="/static/favicon-32x32.png" sizes="32x32";
                link href="/static/main.css" rel="stylesheet";

                script src="https://unpkg.com/htmx.org@2.0.8/dist/htmx.min.js" {}
                script src="https://unpkg.com/htmx-ext-response-targets@2.0.4/response-targets.js" {}

                @for element in head_elements
                {
                    @match element
                    {
                        HeadElement::ScriptSource(text) => script { (text) }
                        HeadElement::ScriptLink(path) => script src=(path) {}
                    }
                }
            }

            body
                hx-ext="response-targets"
                class="container max-w-full min-h-screen bg-gray-50 dark:bg-gray-900"
            {
                (content)

                // Alert container for error responses swapped in by HTMX
                div
                    id="alert-container"
                    class="w-full max-w-md px-4"
                    style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
                {}
            }
        }
    }
}

pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    // Template adapted from https://flowbite.com/blocks/marketing/404/
    let content = html!(
        section class="bg-white dark:bg-gray-900"
        {
            div class="py-8 px-4 mx-auto max-w-screen-xl lg:py-16 lg:px-6"
            {
                div class="mx-auto max-w-screen-sm text-center"
                {
                    h1
                        class="mb-4 text-7xl tracking-tight font-extrabold
                            lg:text-9xl text-blue-600 dark:text-blue-500"
                    {
                        (header)
                    }

                    p
                        class="mb-4 text-3xl md:text-4xl tracking-tight
                            font-bold text-gray-900 dark:text-white"
                    {
                        (description)
                    }

                    p
                        class="mb-4 text-1xl md:text-2xl tracking-tight
                            text-gray-900 dark:text-white"
                    {
                        (fix)
                    }

                    a
                        href="/"
                        class="inline-flex text-white bg-blue-600
                            hover:bg-blue-800 focus:ring-4 focus:outline-hidden
                            focus:ring-blue-300 font-medium rounded text-sm px-5
                            py-2.5 text-center dark:focus:ring-blue-900 my-4"
                    {
                        "Back to Homepage"
                    }
                }
            }
        }
    );

    base(title, &[], &content)
}

/// A link with blue text for use in a <p> tag.
pub fn link(url: &str, text: &str) -> Markup {
    html! (
        a href=(url) class=(LINK_STYLE) { (text) }
    )
}

/// Format `amount` as Guinean francs, e.g. "1 250 000 GNF".
///
/// The franc has no minor unit in everyday use, so amounts are rounded to
/// whole francs.
pub fn format_currency(amount: f64) -> String {
    static FORMATTER: OnceLock<Formatter> = OnceLock::new();

    let formatter = FORMATTER.get_or_init(|| {
        Formatter::new()
            .separator(' ')
            .expect("a space is a valid thousands separator")
            .precision(Precision::Decimals(0))
    });

    let amount = amount.round();

    if amount < 0.0 {
        format!("-{} GNF", formatter.fmt_string(amount.abs()))
    } else if amount > 0.0 {
        format!("{} GNF", formatter.fmt_string(amount))
    } else {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        "0 GNF".to_owned()
    }
}

const DATETIME_FORMAT: &[BorrowedFormatItem] =
    format_description!("[day]/[month]/[year] [hour]:[minute]");

const DATETIME_ATTRIBUTE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

/// Format a timestamp in the user's local time, e.g. "15/01/2023 14:05".
pub fn format_datetime(datetime: OffsetDateTime, local_offset: UtcOffset) -> String {
    let local = datetime.to_offset(local_offset);

    local
        .format(DATETIME_FORMAT)
        .unwrap_or_else(|_| local.to_string())
}

/// A `<time>` element showing `datetime` in local time.
pub fn time_element(datetime: OffsetDateTime, local_offset: UtcOffset) -> Markup {
    let utc = datetime.to_offset(UtcOffset::UTC);
    let attribute = utc
        .format(DATETIME_ATTRIBUTE_FORMAT)
        .unwrap_or_else(|_| utc.to_string());

    html!(
        time datetime=(attribute) { (format_datetime(datetime, local_offset)) }
    )
}

/// A card summarising a budget's spending with a progress bar.
///
/// If `link_to_budget` is set, the card links to the page for managing the budget.
pub fn budget_card(budget: &BudgetWithTransactions, link_to_budget: bool) -> Markup {
    let spent = budget.total_spent();
    let remaining = budget.remaining();
    let progress = budget.progress_percent();
    let transaction_count = budget.transactions.len();
    let bar_colour = if budget.is_reached() {
        "bg-red-600"
    } else {
        "bg-blue-600"
    };

    let card = html!(
        article class=(CARD_STYLE) data-budget-card="true"
        {
            div class="flex items-center justify-between gap-4"
            {
                div class="flex items-center gap-3"
                {
                    span class="text-3xl" aria-hidden="true" { (budget.budget.emoji) }

                    div
                    {
                        h3 class="font-bold text-lg" { (budget.budget.name) }
                        p class="text-sm text-gray-500 dark:text-gray-400"
                        {
                            (transaction_count)
                            @if transaction_count == 1 { " transaction" } @else { " transactions" }
                        }
                    }
                }

                p class="text-lg font-bold tabular-nums text-blue-600 dark:text-blue-400"
                {
                    (format_currency(budget.budget.amount))
                }
            }

            div class="flex justify-between mt-4 text-sm text-gray-500 dark:text-gray-400"
            {
                span { (format_currency(spent)) " spent" }
                span { (format_currency(remaining)) " remaining" }
            }

            div
                class="w-full mt-2 h-2.5 rounded-full bg-gray-200 dark:bg-gray-700"
                role="progressbar"
                aria-valuemin="0"
                aria-valuemax="100"
                aria-valuenow=(format!("{progress:.0}"))
            {
                div class={ "h-2.5 rounded-full " (bar_colour) } style=(format!("width: {progress:.1}%")) {}
            }
        }
    );

    if link_to_budget {
        let url = format_endpoint(endpoints::MANAGE_BUDGET_VIEW, budget.budget.id);

        html!( a href=(url) class="block hover:opacity-90" { (card) } )
    } else {
        card
    }
}


#[cfg(test)]
mod format_datetime_tests {
    use time::{UtcOffset, macros::datetime};

    use super::format_datetime;

    #[test]
    fn converts_to_local_time() {
        let offset = UtcOffset::from_hms(2, 0, 0).unwrap();

        assert_eq!(
            format_datetime(datetime!(2023-01-15 23:05 UTC), offset),
            "16/01/2023 01:05"
        );
    }
}
