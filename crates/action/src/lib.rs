//! # Tether Action System
//!
//! Remote action references with snapshot-at-capture argument binding.
//!
//! UI-construction code on the trusted side refers to server-side functions
//! ("actions") by opaque id. This crate turns such a reference, plus the
//! local values it closes over, into a value that can travel with a UI
//! description across a trust boundary and later be invoked by id with the
//! captured values restored exactly as they stood at the capture point.
//!
//! Three pieces cooperate:
//!
//! - [`ActionRegistry`] — process-wide id → implementation table, populated
//!   during startup, read concurrently by the invocation path
//! - [`BindableAction`] / [`BoundAction`] / [`SealedAction`] — the reference
//!   as it moves from "registered" through "arguments bound" to "sealed for
//!   transit" (sealing lives in `tether-seal`)
//! - [`capture`] — the capture-point rule: every bind site snapshots the
//!   variables it reads at its own position in control-flow order
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use tether_action::prelude::*;
//! use tether_seal::SealKey;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), ActionError> {
//! let registry = ActionRegistry::new();
//! let id = ActionId::new("app/delete-item")?;
//! registry.register(
//!     id.clone(),
//!     Arc::new(FnHandler::new(|args: Vec<serde_json::Value>| async move {
//!         Ok::<_, BoxError>(serde_json::Value::Array(args))
//!     })),
//! )?;
//!
//! // UI construction: bind the captured item id, seal for transit.
//! let key = SealKey::generate();
//! let item_id = 7;
//! let sealed = registry
//!     .bindable(&id)?
//!     .bind(snapshot![item_id])
//!     .seal(&key)?;
//!
//! // Other side of the boundary: invoke by token.
//! let restored = SealedAction::decode(&sealed.encode())?;
//! let result = registry.invoke(&restored, vec![], &key).await?;
//! assert_eq!(result, serde_json::json!([7]));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Handler trait implemented by server-side actions, plus a closure adapter.
pub mod action;
/// Capture-point evaluation: scope variables, snapshots, hoisted binds.
pub mod capture;
/// Error types for registration, binding, sealing, and invocation.
pub mod error;
/// Validated opaque action identifiers.
pub mod id;
/// Convenience re-exports for action authors.
pub mod prelude;
/// Bound and sealed reference types and the invocation path.
pub mod reference;
/// Process-wide id → implementation registry.
pub mod registry;

pub use action::{ActionHandler, BoxError, FnHandler};
pub use capture::{ArgumentSnapshot, HoistedBind, Var};
pub use error::ActionError;
pub use id::ActionId;
pub use reference::{BindableAction, BoundAction, SealedAction};
pub use registry::{ActionDescriptor, ActionRegistry};
