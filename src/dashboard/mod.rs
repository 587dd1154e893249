//! Dashboard module
//!
//! Provides the overview page: the income, expense and profit totals, the form
//! for adding transactions, the tabbed transaction list, and the edit and
//! delete dialogs.

mod cards;
mod handlers;
mod interaction;
mod view;

pub use handlers::{DashboardState, get_dashboard_page};
pub use interaction::{DashboardQuery, InteractionState, Tab};
