//! Error taxonomy for the data fetch layer
//!
//! Everything that talks to the hosted database returns [`FetchError`]. The
//! command layer wraps these in `anyhow` with context; views degrade them to
//! "not found" or "failed to load" states instead of crashing.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// No record matched the identifier.
    #[error("prompt '{id}' not found")]
    NotFound { id: String },

    /// The service answered with a non-success status.
    #[error("request failed with status {status}: {body}")]
    Http { status: u16, body: String },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not have the expected shape.
    #[error("failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Endpoint or key missing/invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl FetchError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = FetchError::not_found("42");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "prompt '42' not found");
    }

    #[test]
    fn test_http_error_is_not_not_found() {
        let err = FetchError::Http {
            status: 500,
            body: "boom".to_string(),
        };
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("500"));
    }
}
