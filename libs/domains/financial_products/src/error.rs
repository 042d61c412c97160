use thiserror::Error;

use crate::form::FormErrors;
use crate::models::MutationKind;

/// Message shown to the user when the catalog cannot be loaded.
///
/// The underlying transport error is logged, never displayed.
pub const LOAD_ERROR_MESSAGE: &str =
    "Error al cargar los productos financieros. Por favor, intente nuevamente.";

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Transport error{}: {message}", status_suffix(.status))]
    Transport {
        status: Option<u16>,
        message: String,
    },

    #[error("Invalid input: {0}")]
    Validation(FormErrors),

    #[error("A {0} request is already in flight")]
    MutationInFlight(MutationKind),
}

pub type ProductResult<T> = Result<T, ProductError>;

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

impl ProductError {
    pub fn transport(message: impl Into<String>) -> Self {
        ProductError::Transport {
            status: None,
            message: message.into(),
        }
    }

    /// Errors the front end swallows instead of surfacing to the user.
    pub fn is_silent(&self) -> bool {
        matches!(self, ProductError::MutationInFlight(_))
    }

    /// HTTP status of a failed request, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProductError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<FormErrors> for ProductError {
    fn from(errors: FormErrors) -> Self {
        ProductError::Validation(errors)
    }
}

impl From<reqwest::Error> for ProductError {
    fn from(err: reqwest::Error) -> Self {
        ProductError::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ProductError {
    fn from(err: serde_json::Error) -> Self {
        ProductError::transport(format!("Malformed response body: {}", err))
    }
}
