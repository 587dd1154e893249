//! Defines the endpoint for replacing an existing transaction.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;

use crate::{
    backend::TransactionBackend,
    transaction::{
        TransactionForm, TransactionId,
        manager::with_locked_manager,
        state::{RedirectQuery, TransactionEndpointState},
    },
};

/// A route handler for editing a transaction, redirects to the dashboard on success.
///
/// A transaction that does not exist is reported with a 404 alert. The
/// dashboard's copy is only changed once the backend has saved the new version.
pub async fn edit_transaction_endpoint<B: TransactionBackend>(
    State(state): State<TransactionEndpointState<B>>,
    Path(transaction_id): Path<TransactionId>,
    Query(query): Query<RedirectQuery>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let transaction = match with_locked_manager(&state.manager, |manager| {
        manager.prepare_edit(transaction_id, &form)
    }) {
        Ok(transaction) => transaction,
        Err(error) => {
            tracing::warn!("Could not update transaction {transaction_id}: {error}");
            return error.into_alert_response();
        }
    };

    if let Err(error) = state.backend.persist_transaction(&transaction).await {
        tracing::error!("Could not save transaction {transaction_id}: {error}");
        return error.into_alert_response();
    }

    if let Err(error) = with_locked_manager(&state.manager, |manager| {
        manager.commit_edit(transaction).map(|_| ())
    }) {
        tracing::error!(
            "Transaction {transaction_id} was saved to the backend but removed locally: {error}"
        );
        return error.into_alert_response();
    }

    (HxRedirect(query.target()), StatusCode::SEE_OTHER).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, Query, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use time::macros::datetime;

    use crate::{
        backend::InMemoryBackend,
        test_utils::{assert_alert_message, assert_hx_redirect, parse_html_fragment},
        transaction::{
            SequentialIdGenerator, Transaction, TransactionForm, TransactionManager,
            TransactionType, edit_transaction_endpoint,
            state::{RedirectQuery, TransactionEndpointState},
        },
    };

    fn rent() -> Transaction {
        Transaction {
            id: SequentialIdGenerator::nth(1),
            type_: TransactionType::Expense,
            description: "Rent".to_owned(),
            amount: 300.0,
            date: datetime!(2024-01-02 0:00 UTC),
            category: None,
        }
    }

    fn salary() -> Transaction {
        Transaction {
            id: SequentialIdGenerator::nth(2),
            type_: TransactionType::Income,
            description: "Salary".to_owned(),
            amount: 1000.0,
            date: datetime!(2024-01-01 0:00 UTC),
            category: None,
        }
    }

    fn get_test_state() -> TransactionEndpointState<InMemoryBackend> {
        let transactions = vec![rent(), salary()];

        TransactionEndpointState {
            backend: InMemoryBackend::with_transactions(transactions.clone()),
            manager: Arc::new(Mutex::new(TransactionManager::from_snapshot(
                transactions,
                SequentialIdGenerator::new(),
            ))),
        }
    }

    fn edit_form() -> TransactionForm {
        TransactionForm {
            type_: Some("expense".to_owned()),
            description: Some("Rent (March)".to_owned()),
            amount: Some("350".to_owned()),
            date: Some("2024-03-01".to_owned()),
            category: Some("Housing".to_owned()),
        }
    }

    #[tokio::test]
    async fn can_edit_transaction() {
        let state = get_test_state();

        let response = edit_transaction_endpoint(
            State(state.clone()),
            Path(rent().id),
            Query(RedirectQuery::default()),
            Form(edit_form()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, "/dashboard");

        let want = Transaction {
            id: rent().id,
            type_: TransactionType::Expense,
            description: "Rent (March)".to_owned(),
            amount: 350.0,
            date: datetime!(2024-03-01 0:00 UTC),
            category: Some("Housing".to_owned()),
        };
        let manager = state.manager.lock().unwrap();
        assert_eq!(manager.all(), &[want.clone(), salary()]);
        assert_eq!(manager.aggregates().profit, 650.0);
        assert_eq!(state.backend.transactions(), vec![want, salary()]);
    }

    #[tokio::test]
    async fn editing_missing_transaction_is_not_found() {
        let state = get_test_state();

        let response = edit_transaction_endpoint(
            State(state.clone()),
            Path(SequentialIdGenerator::nth(99)),
            Query(RedirectQuery::default()),
            Form(edit_form()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let html = parse_html_fragment(response).await;
        assert_alert_message(&html, "Could not update transaction");
        assert_eq!(state.backend.transactions(), vec![rent(), salary()]);
    }

    #[tokio::test]
    async fn invalid_edit_keeps_original() {
        let state = get_test_state();
        let form = TransactionForm {
            description: Some(String::new()),
            ..edit_form()
        };

        let response = edit_transaction_endpoint(
            State(state.clone()),
            Path(rent().id),
            Query(RedirectQuery::default()),
            Form(form),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.manager.lock().unwrap().get(rent().id), Some(&rent()));
    }

    #[tokio::test]
    async fn backend_failure_keeps_original() {
        let state = get_test_state();
        state.backend.set_failing(true);

        let response = edit_transaction_endpoint(
            State(state.clone()),
            Path(rent().id),
            Query(RedirectQuery::default()),
            Form(edit_form()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(state.manager.lock().unwrap().all(), &[rent(), salary()]);
    }
}
