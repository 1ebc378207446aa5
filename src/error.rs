//! Error types for the Mayan EDMS provider.

use serde_json::Value;
use thiserror::Error;

use crate::client::ClientError;

/// Errors raised while serving a provider operation.
///
/// Every variant is reported to the host as an error diagnostic; nothing is
/// turned into a gRPC status.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested object was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Input did not satisfy the schema or a handler precondition.
    #[error("Validation error: {0}")]
    Validation(String),

    /// No handler is registered for the resource or data source type.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// State or config JSON could not be decoded or encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The Mayan API call failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// An identifier was not in the expected form.
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    /// An imported object is of a different kind than the resource.
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// A resource operation arrived before a successful `configure`.
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// Operation not supported for this resource type.
    #[error("Unimplemented: {0}")]
    Unimplemented(String),

    /// The server assigned an identifier before `source` failed. `state`
    /// records the new object so the host can track it.
    #[error("{source}")]
    PartiallyCreated {
        state: Box<Value>,
        source: Box<ProviderError>,
    },
}

impl ProviderError {
    /// Get the error message as a string.
    pub fn message(&self) -> String {
        match self {
            Self::NotFound(msg)
            | Self::Validation(msg)
            | Self::UnknownResource(msg)
            | Self::InvalidId(msg)
            | Self::TypeMismatch(msg)
            | Self::NotConfigured(msg)
            | Self::Unimplemented(msg) => msg.clone(),
            Self::Serialization(err) => err.to_string(),
            Self::Client(err) => err.to_string(),
            Self::PartiallyCreated { source, .. } => source.message(),
        }
    }

    /// State of an object that exists on the server even though the
    /// operation failed.
    pub fn partial_state(&self) -> Option<&Value> {
        match self {
            Self::PartiallyCreated { state, .. } => Some(state.as_ref()),
            _ => None,
        }
    }

    /// Whether the remote object is gone, either by a handler's own check
    /// or because the server answered 404.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Client(err) => err.is_not_found(),
            Self::PartiallyCreated { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}
