// Typed errors with thiserror. Surface meaningful messages to JS.
// Load failures keep the underlying cause on the value but not in the message.

use thiserror::Error;

/// Result type used across the core.
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

/// Core error kinds.
///
/// `Clone` so a memoized load can hand the same failure to every waiter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Failed to get movies")]
    CatalogUnavailable { cause: String },

    #[error("Failed to get filters.")]
    FiltersUnavailable { cause: String },

    #[error("Failed to get heroes.")]
    HeroesUnavailable { cause: String },

    #[error("'currentPage' is out of bounds.")]
    OutOfBounds { current_page: i64, total_pages: i64 },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CoreError {
    /// Underlying cause of a load failure, if this is one.
    pub fn cause(&self) -> Option<&str> {
        match self {
            CoreError::CatalogUnavailable { cause }
            | CoreError::FiltersUnavailable { cause }
            | CoreError::HeroesUnavailable { cause } => Some(cause),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

/// Failure reported by a data source before it is mapped into a [`CoreError`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct FetchError(pub String);

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError(err.to_string())
    }
}
