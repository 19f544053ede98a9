use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ActionError;

/// Maximum length for action ids.
const MAX_ID_LENGTH: usize = 255;

/// Opaque, globally unique identifier of one registered action.
///
/// Ids are produced by the authoring toolchain (typically a content hash or a
/// `module/function` path) and must stay stable for as long as callers expect
/// existing references to resolve. An id is never reused for a different
/// implementation.
///
/// Only ASCII alphanumerics and `-`, `_`, `.`, `/` are accepted, and `..`
/// sequences are rejected, so an id is always safe to embed in tokens, logs,
/// and lookup keys.
///
/// # Examples
///
/// ```
/// use tether_action::ActionId;
///
/// assert!(ActionId::new("app/items/delete").is_ok());
/// assert!(ActionId::new("c3ab8ff13720e8ad9047dd39466b3c89").is_ok());
///
/// assert!(ActionId::new("").is_err());
/// assert!(ActionId::new("has spaces").is_err());
/// assert!(ActionId::new("../escape").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActionId(String);

impl ActionId {
    /// Create a validated action id.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::InvalidId`] when the id is empty, longer than
    /// 255 bytes, contains characters outside the allowed set, or contains a
    /// `..` sequence.
    pub fn new(id: impl Into<String>) -> Result<Self, ActionError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ActionError::InvalidId {
                id,
                reason: "must not be empty".into(),
            });
        }
        if id.len() > MAX_ID_LENGTH {
            return Err(ActionError::InvalidId {
                id,
                reason: format!("exceeds maximum length of {MAX_ID_LENGTH} bytes"),
            });
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'))
        {
            return Err(ActionError::InvalidId {
                id,
                reason: "only ASCII alphanumerics, `-`, `_`, `.` and `/` are allowed".into(),
            });
        }
        if id.contains("..") {
            return Err(ActionError::InvalidId {
                id,
                reason: "`..` sequences are not allowed".into(),
            });
        }
        Ok(Self(id))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the id, returning the underlying string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ActionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ActionId {
    type Error = ActionError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<ActionId> for String {
    fn from(id: ActionId) -> Self {
        id.0
    }
}
