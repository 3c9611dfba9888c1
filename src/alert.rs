//! Alert messages for telling the user whether an action succeeded.
//!
//! Alerts are rendered as HTML fragments that HTMX swaps into the alert
//! container at the bottom of every page.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

/// A success or error message with optional details.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message with details.
    Success { message: String, details: String },
    /// An error message with details on how to fix it.
    Error { message: String, details: String },
    /// An error message without details.
    ErrorSimple { message: String },
}

impl Alert {
    /// Render the alert as HTML.
    pub fn into_html(self) -> Markup {
        let (is_success, message, details) = match self {
            Alert::Success { message, details } => (true, message, Some(details)),
            Alert::Error { message, details } => (false, message, Some(details)),
            Alert::ErrorSimple { message } => (false, message, None),
        };

        let style = if is_success {
            "p-4 mb-4 text-sm text-green-800 rounded-lg bg-green-50 \
            dark:bg-gray-800 dark:text-green-400 border border-green-300 \
            dark:border-green-800"
        } else {
            "p-4 mb-4 text-sm text-red-800 rounded-lg bg-red-50 \
            dark:bg-gray-800 dark:text-red-400 border border-red-300 \
            dark:border-red-800"
        };
        let role = if is_success { "status" } else { "alert" };

        html!(
            div
                class=(style)
                role=(role)
                data-alert="true"
            {
                div class="flex items-start justify-between gap-4"
                {
                    div
                    {
                        p class="font-semibold" { (message) }

                        @if let Some(details) = details.filter(|details| !details.is_empty()) {
                            span class="block mt-1" { (details) }
                        }
                    }

                    button
                        type="button"
                        aria-label="Dismiss"
                        onclick="this.closest('[data-alert]').remove()"
                        class="font-bold"
                    { "✕" }
                }
            }
        )
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        let status_code = match self {
            Alert::Success { .. } => StatusCode::OK,
            Alert::Error { .. } | Alert::ErrorSimple { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status_code, self.into_html()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use scraper::Selector;

    use crate::test_utils::{assert_valid_html, parse_html_fragment};

    use super::Alert;

    #[tokio::test]
    async fn success_alert_renders_message() {
        let response = Alert::Success {
            message: "Budget deleted".to_owned(),
            details: "Its transactions were deleted too.".to_owned(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let message = html
            .select(&Selector::parse("p").unwrap())
            .next()
            .expect("alert should contain a message")
            .text()
            .collect::<String>();
        assert_eq!(message, "Budget deleted");
        let details = html
            .select(&Selector::parse("span").unwrap())
            .next()
            .expect("alert should contain details")
            .text()
            .collect::<String>();
        assert_eq!(details, "Its transactions were deleted too.");
    }

    #[tokio::test]
    async fn error_alert_without_details_has_no_details_span() {
        let response = Alert::ErrorSimple {
            message: "Oops".to_owned(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let html = parse_html_fragment(response).await;
        assert_eq!(html.select(&Selector::parse("span").unwrap()).count(), 0);
    }
}
