//! Error types for ECS API calls.

use thiserror::Error;

/// Errors raised by an [`EcsClient`](super::EcsClient).
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ClientError {
    /// The API rejected the call with a vendor error code.
    #[error("{code}: {message} (request id {request_id})")]
    Api {
        /// Vendor error code, for example `IdempotentProcessing`.
        code: String,
        /// Message returned alongside the code.
        message: String,
        /// Request identifier assigned by the API.
        request_id: String,
    },
    /// The call never produced an API response.
    #[error("transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },
    /// A request could not be encoded into query parameters.
    #[error("failed to encode {action} request: {message}")]
    Encode {
        /// API action being encoded.
        action: String,
        /// Serializer error message.
        message: String,
    },
    /// A response body could not be decoded.
    #[error("failed to decode {action} response: {message}")]
    Decode {
        /// API action whose response failed to decode.
        action: String,
        /// Parser error message.
        message: String,
    },
}

impl ClientError {
    /// Builds an [`ClientError::Api`] error with an empty request id.
    #[must_use]
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            code: code.into(),
            message: message.into(),
            request_id: String::new(),
        }
    }

    /// Returns the vendor error code when the API produced one.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code.as_str()),
            Self::Transport { .. } | Self::Encode { .. } | Self::Decode { .. } => None,
        }
    }
}
