//! Defines the endpoint for deleting a transaction.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{
    backend::TransactionBackend,
    transaction::{
        TransactionId,
        manager::with_locked_manager,
        state::{RedirectQuery, TransactionEndpointState},
    },
};

/// A route handler for deleting a transaction, redirects to the dashboard on success.
///
/// This is the action behind the confirmation dialog's delete button.
/// Deleting a transaction that does not exist is not an error.
pub async fn delete_transaction_endpoint<B: TransactionBackend>(
    State(state): State<TransactionEndpointState<B>>,
    Path(transaction_id): Path<TransactionId>,
    Query(query): Query<RedirectQuery>,
) -> Response {
    if let Err(error) = state.backend.delete_transaction(transaction_id).await {
        tracing::error!("Could not delete transaction {transaction_id}: {error}");
        return error.into_alert_response();
    }

    if let Err(error) = with_locked_manager(&state.manager, |manager| {
        manager.delete(transaction_id);
        Ok(())
    }) {
        return error.into_alert_response();
    }

    (HxRedirect(query.target()), StatusCode::SEE_OTHER).into_response()
}
