//! Defines the endpoint for creating a new transaction.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;

use crate::{
    backend::TransactionBackend,
    transaction::{
        TransactionForm,
        manager::with_locked_manager,
        state::{RedirectQuery, TransactionEndpointState},
    },
};

/// A route handler for creating a new transaction, redirects to the dashboard on success.
///
/// The transaction is only added to the dashboard once the backend has saved it.
pub async fn create_transaction_endpoint<B: TransactionBackend>(
    State(state): State<TransactionEndpointState<B>>,
    Query(query): Query<RedirectQuery>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let transaction = match with_locked_manager(&state.manager, |manager| {
        manager.prepare_add(&form)
    }) {
        Ok(transaction) => transaction,
        Err(error) => {
            tracing::warn!("Rejected new transaction: {error}");
            return error.into_alert_response();
        }
    };

    if let Err(error) = state.backend.persist_transaction(&transaction).await {
        tracing::error!("Could not save transaction {}: {error}", transaction.id);
        return error.into_alert_response();
    }

    if let Err(error) = with_locked_manager(&state.manager, |manager| {
        manager.commit_add(transaction);
        Ok(())
    }) {
        return error.into_alert_response();
    }

    (HxRedirect(query.target()), StatusCode::SEE_OTHER).into_response()
}
