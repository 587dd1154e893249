//! Application router configuration.

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::{
    AppState,
    backend::TransactionBackend,
    connection_test::{get_connection_test_page, post_connection_test},
    dashboard::get_dashboard_page,
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router<B: TransactionBackend>(state: AppState<B>) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(
            endpoints::CONNECTION_TEST_VIEW,
            get(get_connection_test_page::<B>),
        )
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        )
        .route(
            endpoints::TRANSACTIONS_API,
            post(create_transaction_endpoint::<B>),
        )
        .route(
            endpoints::TRANSACTION,
            axum::routing::put(edit_transaction_endpoint::<B>)
                .delete(delete_transaction_endpoint::<B>),
        )
        .route(
            endpoints::CONNECTION_TEST_API,
            post(post_connection_test::<B>),
        )
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
