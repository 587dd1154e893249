//! The state shared by the endpoints that change transactions.

use std::sync::{Arc, Mutex};

use axum::{extract::FromRef, http::Uri};
use serde::Deserialize;

use crate::{
    AppState, backend::TransactionBackend, endpoints, transaction::TransactionManager,
};

/// The state needed to create, edit or delete a transaction.
#[derive(Clone)]
pub struct TransactionEndpointState<B: TransactionBackend> {
    /// Where changes are persisted before they are applied locally.
    pub backend: B,
    /// The server's copy of the transactions.
    pub manager: Arc<Mutex<TransactionManager>>,
}

impl<B: TransactionBackend> FromRef<AppState<B>> for TransactionEndpointState<B> {
    fn from_ref(state: &AppState<B>) -> Self {
        Self {
            backend: state.backend.clone(),
            manager: state.manager.clone(),
        }
    }
}

/// Query parameters accepted by the transaction endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct RedirectQuery {
    /// The page to send the client to after a successful change, e.g.
    /// "/dashboard?tab=income". Defaults to the dashboard.
    pub redirect_url: Option<String>,
}

impl RedirectQuery {
    /// The local path to redirect to.
    ///
    /// Anything that is not a path on this server falls back to the dashboard.
    pub fn target(self) -> String {
        match self.redirect_url {
            Some(url) => normalize_redirect_url(&url).unwrap_or_else(|| {
                tracing::warn!("Ignoring redirect to external URL {url:?}");
                endpoints::DASHBOARD_VIEW.to_owned()
            }),
            None => endpoints::DASHBOARD_VIEW.to_owned(),
        }
    }
}

/// The path and query of `raw_url` if it only points at this server.
fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    // Browsers treat '\' like '/', so "/\example.com" leaves the site.
    if raw_url.contains('\\') {
        return None;
    }

    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }
    let path_and_query = uri.path_and_query()?.as_str();

    (path_and_query.starts_with('/') && !path_and_query.starts_with("//"))
        .then(|| path_and_query.to_owned())
}
