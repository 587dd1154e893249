//! Which dialog the dashboard is showing, and how the user moves between them.
//!
//! The dashboard is rendered on the server, so the dialog state travels in the
//! page URL as a [DashboardQuery], e.g. `/dashboard?tab=income&edit=<id>`.
//! The query is converted into an [InteractionState] on every request, and
//! every link on the page is built from the state it leads to.

use serde::{Deserialize, Serialize};

use crate::{Error, endpoints, transaction::TransactionId};

/// The dialog the dashboard is showing.
///
/// Editing and deleting are mutually exclusive: starting either one is only
/// possible from [InteractionState::Idle].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InteractionState {
    /// No dialog is open.
    #[default]
    Idle,
    /// The edit dialog is open for the transaction `id`.
    Editing { id: TransactionId },
    /// The user asked to delete the transaction `id` and has not confirmed yet.
    PendingDelete { id: TransactionId },
}

impl InteractionState {
    /// Open the edit dialog for `id`.
    ///
    /// # Errors
    /// Returns [Error::InvalidInteraction] unless the current state is idle.
    pub fn begin_edit(self, id: TransactionId) -> Result<Self, Error> {
        match self {
            InteractionState::Idle => Ok(InteractionState::Editing { id }),
            other => Err(Error::InvalidInteraction(format!(
                "cannot edit transaction {id} while {}",
                other.describe()
            ))),
        }
    }

    /// Ask the user to confirm deleting `id`.
    ///
    /// # Errors
    /// Returns [Error::InvalidInteraction] unless the current state is idle.
    pub fn request_delete(self, id: TransactionId) -> Result<Self, Error> {
        match self {
            InteractionState::Idle => Ok(InteractionState::PendingDelete { id }),
            other => Err(Error::InvalidInteraction(format!(
                "cannot delete transaction {id} while {}",
                other.describe()
            ))),
        }
    }

    /// Close the edit dialog after the changes were saved.
    ///
    /// # Errors
    /// Returns [Error::InvalidInteraction] if no transaction is being edited.
    pub fn finish_edit(self) -> Result<Self, Error> {
        match self {
            InteractionState::Editing { .. } => Ok(InteractionState::Idle),
            other => Err(Error::InvalidInteraction(format!(
                "cannot finish editing while {}",
                other.describe()
            ))),
        }
    }

    /// Confirm the pending deletion, returning the ID to delete and the next state.
    ///
    /// # Errors
    /// Returns [Error::InvalidInteraction] if no deletion is pending.
    pub fn confirm_delete(self) -> Result<(TransactionId, Self), Error> {
        match self {
            InteractionState::PendingDelete { id } => Ok((id, InteractionState::Idle)),
            other => Err(Error::InvalidInteraction(format!(
                "cannot confirm a deletion while {}",
                other.describe()
            ))),
        }
    }

    /// Close any open dialog without changing anything.
    pub fn cancel(self) -> Self {
        InteractionState::Idle
    }

    fn describe(&self) -> String {
        match self {
            InteractionState::Idle => "no dialog is open".to_owned(),
            InteractionState::Editing { id } => format!("editing transaction {id}"),
            InteractionState::PendingDelete { id } => {
                format!("waiting to confirm the deletion of transaction {id}")
            }
        }
    }
}

/// The list of transactions shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    /// Every transaction.
    #[default]
    All,
    /// Only income.
    Income,
    /// Only expenses.
    Expense,
}

impl Tab {
    /// Every tab in display order.
    pub const ALL: [Tab; 3] = [Tab::All, Tab::Income, Tab::Expense];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::All => "All",
            Tab::Income => "Income",
            Tab::Expense => "Expenses",
        }
    }
}

/// The dashboard's query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DashboardQuery {
    /// The selected list.
    #[serde(default)]
    pub tab: Tab,
    /// The transaction being edited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit: Option<TransactionId>,
    /// The transaction waiting for delete confirmation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<TransactionId>,
}

impl DashboardQuery {
    /// The query for showing `tab` with the dialog for `state`.
    pub fn new(tab: Tab, state: InteractionState) -> Self {
        let (edit, delete) = match state {
            InteractionState::Idle => (None, None),
            InteractionState::Editing { id } => (Some(id), None),
            InteractionState::PendingDelete { id } => (None, Some(id)),
        };

        Self { tab, edit, delete }
    }

    /// The dashboard URL for this query, e.g. "/dashboard?tab=all".
    pub fn to_url(&self) -> String {
        match serde_urlencoded::to_string(self) {
            Ok(query) if !query.is_empty() => format!("{}?{query}", endpoints::DASHBOARD_VIEW),
            Ok(_) => endpoints::DASHBOARD_VIEW.to_owned(),
            Err(error) => {
                tracing::error!("Could not encode dashboard query {self:?}: {error}");
                endpoints::DASHBOARD_VIEW.to_owned()
            }
        }
    }
}

impl TryFrom<DashboardQuery> for InteractionState {
    type Error = Error;

    fn try_from(query: DashboardQuery) -> Result<Self, Self::Error> {
        match (query.edit, query.delete) {
            (None, None) => Ok(InteractionState::Idle),
            (Some(id), None) => InteractionState::Idle.begin_edit(id),
            (None, Some(id)) => InteractionState::Idle.request_delete(id),
            (Some(edit_id), Some(delete_id)) => InteractionState::Editing { id: edit_id }
                .request_delete(delete_id),
        }
    }
}

#[cfg(test)]
mod interaction_state_tests {
    use crate::{Error, transaction::SequentialIdGenerator};

    use super::InteractionState;

    #[test]
    fn edit_from_idle() {
        let id = SequentialIdGenerator::nth(1);

        let state = InteractionState::Idle.begin_edit(id).unwrap();

        assert_eq!(state, InteractionState::Editing { id });
        assert_eq!(state.finish_edit(), Ok(InteractionState::Idle));
    }

    #[test]
    fn delete_needs_confirmation() {
        let id = SequentialIdGenerator::nth(1);

        let state = InteractionState::Idle.request_delete(id).unwrap();

        assert_eq!(state, InteractionState::PendingDelete { id });
        assert_eq!(state.confirm_delete(), Ok((id, InteractionState::Idle)));
    }

    #[test]
    fn cannot_start_delete_while_editing() {
        let editing = InteractionState::Editing {
            id: SequentialIdGenerator::nth(1),
        };

        let result = editing.request_delete(SequentialIdGenerator::nth(2));

        assert!(matches!(result, Err(Error::InvalidInteraction(_))));
    }

    #[test]
    fn cannot_start_edit_while_delete_pending() {
        let pending = InteractionState::PendingDelete {
            id: SequentialIdGenerator::nth(1),
        };

        let result = pending.begin_edit(SequentialIdGenerator::nth(2));

        assert!(matches!(result, Err(Error::InvalidInteraction(_))));
    }

    #[test]
    fn cannot_confirm_without_request() {
        assert!(matches!(
            InteractionState::Idle.confirm_delete(),
            Err(Error::InvalidInteraction(_))
        ));
        assert!(matches!(
            InteractionState::Idle.finish_edit(),
            Err(Error::InvalidInteraction(_))
        ));
    }

    #[test]
    fn cancel_always_returns_to_idle() {
        let id = SequentialIdGenerator::nth(1);

        for state in [
            InteractionState::Idle,
            InteractionState::Editing { id },
            InteractionState::PendingDelete { id },
        ] {
            assert_eq!(state.cancel(), InteractionState::Idle);
        }
    }

    #[test]
    fn serializes_with_state_tag() {
        let state = InteractionState::PendingDelete {
            id: SequentialIdGenerator::nth(1),
        };

        let json = serde_json::to_value(state).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "state": "pending_delete",
                "id": "00000000-0000-0000-0000-000000000001",
            })
        );
        assert_eq!(
            serde_json::from_value::<InteractionState>(json).unwrap(),
            state
        );
    }
}
