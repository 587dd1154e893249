//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    alert::Alert, internal_server_error::InternalServerError, not_found::NotFoundError,
    transaction::ValidationError,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user submitted a transaction with a missing or invalid field.
    ///
    /// Nothing is changed when this error occurs, the user should fix the
    /// form and try again.
    #[error("invalid transaction: {0}")]
    Validation(#[from] ValidationError),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that does not exist")]
    UpdateMissingTransaction,

    /// The dashboard was asked to move between dialogs in a way that is not
    /// allowed, e.g. start deleting a transaction while editing another.
    #[error("invalid interaction: {0}")]
    InvalidInteraction(String),

    /// The hosted backend rejected a request or could not be reached.
    ///
    /// The string holds the backend's explanation and should only be logged
    /// or shown as alert details.
    #[error("the backend request failed: {0}")]
    Backend(String),

    /// A required environment variable was not set or was empty.
    #[error("the environment variable \"{0}\" must be set")]
    MissingConfig(&'static str),

    /// An environment variable was set to an unusable value.
    ///
    /// Callers should pass in the variable's name and the reason it is invalid.
    #[error("the environment variable \"{0}\" is invalid: {1}")]
    InvalidConfig(&'static str, String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the lock on the transaction manager.
    #[error("could not acquire the transaction manager lock")]
    ManagerLockError,

    /// The HTTP server stopped with an I/O error.
    #[error("the HTTP server failed: {0}")]
    Server(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound | Error::UpdateMissingTransaction => NotFoundError.into_response(),
            Error::InvalidInteraction(reason) => {
                tracing::warn!("Rejected dashboard interaction: {reason}");
                InternalServerError {
                    description: "Invalid dashboard state",
                    fix: "Only one dialog can be open at a time. Go back to the dashboard and try again.",
                }
                .into_response_with_status(StatusCode::BAD_REQUEST)
            }
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::ManagerLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::Validation(error) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid transaction".to_owned(),
                    details: capitalize(&error.to_string()),
                },
            ),
            Error::UpdateMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update transaction".to_owned(),
                    details: "The transaction could not be found. \
                    Try refreshing the page to see if it has been deleted."
                        .to_owned(),
                },
            ),
            Error::InvalidInteraction(reason) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid action".to_owned(),
                    details: capitalize(&reason),
                },
            ),
            Error::Backend(reason) => (
                StatusCode::BAD_GATEWAY,
                Alert::Error {
                    message: "Could not save your changes".to_owned(),
                    details: format!(
                        "The backend rejected the request, nothing was changed: {reason}"
                    ),
                },
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details:
                        "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
