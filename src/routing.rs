//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{delete, get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    budget::{
        create_budget_endpoint, delete_budget_endpoint, get_budgets_page, get_manage_budget_page,
    },
    dashboard::get_dashboard_page,
    endpoints,
    identity::{identity_guard, identity_guard_hx},
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transactions_page,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::BUDGETS_VIEW, get(get_budgets_page))
        .route(endpoints::MANAGE_BUDGET_VIEW, get(get_manage_budget_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route_layer(middleware::from_fn_with_state(state.clone(), identity_guard));

    // HTMX requests swap the response into the page, so rejections need to be alert fragments.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::BUDGETS_API, post(create_budget_endpoint))
            .route(endpoints::BUDGET, delete(delete_budget_endpoint))
            .route(
                endpoints::BUDGET_TRANSACTIONS,
                post(create_transaction_endpoint),
            )
            .route(endpoints::TRANSACTION, delete(delete_transaction_endpoint))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                identity_guard_hx,
            )),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderName, StatusCode};
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, DEFAULT_IDENTITY_HEADER, endpoints};

    use super::build_router;

    fn get_test_server() -> TestServer {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            "Africa/Conakry",
            HeaderName::from_static(DEFAULT_IDENTITY_HEADER),
        )
        .unwrap();

        TestServer::new(build_router(state))
    }

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let server = get_test_server();

        let response = server.get(endpoints::ROOT).await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn pages_require_identity() {
        let server = get_test_server();

        for page in [
            endpoints::DASHBOARD_VIEW,
            endpoints::BUDGETS_VIEW,
            endpoints::TRANSACTIONS_VIEW,
        ] {
            server
                .get(page)
                .await
                .assert_status(StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn api_requires_identity() {
        let server = get_test_server();

        server
            .delete("/api/transactions/1")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn serves_pages_to_identified_users() {
        let server = get_test_server();

        for page in [
            endpoints::DASHBOARD_VIEW,
            endpoints::BUDGETS_VIEW,
            endpoints::TRANSACTIONS_VIEW,
        ] {
            server
                .get(page)
                .add_header(DEFAULT_IDENTITY_HEADER, "foo@bar.baz")
                .await
                .assert_status_ok();
        }
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        server
            .get("/does/not/exist")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
