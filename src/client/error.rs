//! Errors surfaced by the Mayan EDMS REST client.

use thiserror::Error;

/// Errors returned by [`MayanClient`](super::MayanClient) operations.
///
/// Nothing is retried or recovered inside the client; every variant reaches
/// the caller unchanged.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP call itself failed (connection refused, TLS, DNS, ...).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    ///
    /// `message` is the response body exactly as received.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        message: String,
    },

    /// A request body could not be encoded or a response body decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The token exchange failed or returned no token.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The configured base URL or a pagination link could not be used.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Build an API error from a status code and raw body.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Whether the server reported that the object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_keeps_raw_body() {
        let err = ClientError::api(400, r#"{"label":["This field is required."]}"#);
        assert_eq!(
            err.to_string(),
            r#"API error (400): {"label":["This field is required."]}"#
        );
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, r#"{"label":["This field is required."]}"#);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_is_not_found() {
        assert!(ClientError::api(404, "Not found.").is_not_found());
        assert!(!ClientError::api(403, "Forbidden").is_not_found());
        assert!(!ClientError::Authentication("no token".into()).is_not_found());
    }
}
