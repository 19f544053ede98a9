use tether_seal::SealError;

use crate::action::BoxError;
use crate::id::ActionId;

/// Error type for all action operations.
///
/// Every variant except [`Execution`](Self::Execution) is detectable before
/// the action implementation runs: an implementation is never invoked with
/// unauthenticated or malformed arguments. No variant is retried by this
/// crate — retry policy, if any, belongs to the transport.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ActionError {
    /// The identifier failed validation before any lookup.
    #[error("invalid action id `{id}`: {reason}")]
    InvalidId {
        /// The rejected identifier.
        id: String,
        /// Why validation failed.
        reason: String,
    },

    /// Registration conflict: the id is taken by a different implementation.
    ///
    /// Fatal at startup. Re-registering the *same* implementation is a
    /// no-op, so repeated module initialization never hits this.
    #[error("action `{id}` is already registered with a different implementation")]
    Duplicate {
        /// The contested identifier.
        id: ActionId,
    },

    /// No implementation is registered under this id.
    ///
    /// Raised both at bind time and at invocation time; a placeholder is
    /// never created.
    #[error("unknown action `{id}`")]
    Unknown {
        /// The unresolved identifier.
        id: ActionId,
    },

    /// Sealing or unsealing the bound arguments failed.
    ///
    /// Integrity and malformed-payload failures from the codec propagate
    /// through unchanged.
    #[error(transparent)]
    Seal(#[from] SealError),

    /// The action implementation itself failed.
    ///
    /// The original error is attached as the source, never swallowed.
    #[error("action `{id}` failed")]
    Execution {
        /// The action that was running.
        id: ActionId,
        /// The implementation's error.
        #[source]
        source: BoxError,
    },
}

impl ActionError {
    /// Wrap an implementation failure.
    pub fn execution(id: ActionId, source: impl Into<BoxError>) -> Self {
        Self::Execution {
            id,
            source: source.into(),
        }
    }

    /// Returns `true` if the id could not be resolved.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown { .. })
    }

    /// Returns `true` if the sealed payload failed authentication.
    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::Seal(SealError::Integrity))
    }

    /// Returns `true` if the payload structure or plaintext could not be
    /// decoded.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Seal(SealError::Malformed(_)))
    }

    /// Returns `true` if the action implementation failed after a successful
    /// unseal and resolve.
    pub fn is_execution(&self) -> bool {
        matches!(self, Self::Execution { .. })
    }
}
