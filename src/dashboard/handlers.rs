//! Dashboard HTTP handlers.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    backend::TransactionBackend,
    dashboard::{
        interaction::{DashboardQuery, InteractionState, Tab},
        view::{DashboardView, Dialog, dashboard_view},
    },
    timezone::to_local_date,
    transaction::{TransactionManager, TransactionType, manager::with_locked_manager},
};

/// The state needed for displaying the dashboard page.
#[derive(Clone)]
pub struct DashboardState {
    /// The server's copy of the transactions.
    pub manager: Arc<Mutex<TransactionManager>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl<B: TransactionBackend> FromRef<AppState<B>> for DashboardState {
    fn from_ref(state: &AppState<B>) -> Self {
        Self {
            manager: state.manager.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display the totals, the transaction list and the dialog selected by `query`.
///
/// # Errors
/// Returns:
/// - [Error::InvalidInteraction] if the query asks for both the edit and delete dialogs,
/// - [Error::NotFound] if the transaction to edit does not exist,
/// - [Error::InvalidTimezoneError] if the server's timezone is invalid.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, Error> {
    let today = to_local_date(OffsetDateTime::now_utc(), &state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;

    let tab = query.tab;
    let interaction = InteractionState::try_from(query)?;
    let cancel_url = DashboardQuery::new(tab, interaction.cancel()).to_url();

    let markup = with_locked_manager(&state.manager, |manager| {
        let dialog = match interaction {
            InteractionState::Idle => Dialog::None,
            InteractionState::Editing { id } => {
                let transaction = manager.get(id).ok_or_else(|| {
                    tracing::warn!("Tried to edit transaction {id}, which does not exist");
                    Error::NotFound
                })?;

                Dialog::Edit {
                    transaction,
                    on_save_url: DashboardQuery::new(tab, interaction.finish_edit()?).to_url(),
                }
            }
            InteractionState::PendingDelete { .. } => {
                let (id, next_state) = interaction.confirm_delete()?;

                match manager.get(id) {
                    Some(transaction) => Dialog::ConfirmDelete {
                        transaction,
                        on_delete_url: DashboardQuery::new(tab, next_state).to_url(),
                    },
                    None => {
                        tracing::warn!(
                            "Tried to delete transaction {id}, which does not exist, \
                            showing the dashboard without the dialog"
                        );
                        Dialog::None
                    }
                }
            }
        };

        let transactions = match tab {
            Tab::All => manager.all().iter().collect(),
            Tab::Income => manager.by_type(TransactionType::Income).collect(),
            Tab::Expense => manager.by_type(TransactionType::Expense).collect(),
        };

        Ok(dashboard_view(DashboardView {
            aggregates: manager.aggregates(),
            tab,
            transactions,
            dialog,
            cancel_url,
            local_timezone: &state.local_timezone,
            today,
        }))
    })?;

    Ok(markup.into_response())
}
