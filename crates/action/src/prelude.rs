//! Convenience re-exports for action authors.
//!
//! ```rust,ignore
//! use tether_action::prelude::*;
//! ```

pub use crate::action::{ActionHandler, BoxError, FnHandler};
pub use crate::capture::{ArgumentSnapshot, HoistedBind, Var};
pub use crate::error::ActionError;
pub use crate::id::ActionId;
pub use crate::reference::{BindableAction, BoundAction, SealedAction};
pub use crate::registry::{ActionDescriptor, ActionRegistry};
pub use crate::snapshot;

pub use tether_seal::{SealKey, SealedPayload};
