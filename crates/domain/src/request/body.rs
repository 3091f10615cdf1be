//! Probe request body

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Body of a probe request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RequestBody {
    /// No body
    #[default]
    None,
    /// JSON document, serialized when the request is built
    Json(serde_json::Value),
}

impl RequestBody {
    /// Creates a JSON body from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBody` if the value cannot be represented as JSON.
    pub fn json<T: Serialize>(value: &T) -> DomainResult<Self> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| DomainError::InvalidBody(e.to_string()))
    }

    /// Returns whether the body is absent.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns the content type to advertise for this body.
    #[must_use]
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Json(_) => Some(mime::APPLICATION_JSON.as_ref()),
        }
    }

    /// Serializes the body to the bytes sent on the wire.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBody` if serialization fails.
    pub fn to_bytes(&self) -> DomainResult<Vec<u8>> {
        match self {
            Self::None => Ok(Vec::new()),
            Self::Json(value) => {
                serde_json::to_vec(value).map_err(|e| DomainError::InvalidBody(e.to_string()))
            }
        }
    }
}
