//! Capture-point evaluation.
//!
//! A bound reference must carry the values its captured variables held at
//! the point where the bind expression sits in *executed control-flow
//! order* — not at function entry, and not wherever the reference is later
//! rendered or invoked. Instead of letting closures hold live references to
//! mutable outer storage, capture is an explicit copy into an immutable
//! [`ArgumentSnapshot`] at a well-defined point:
//!
//! - [`Var`] is a shared mutable scope variable. Everything that runs before
//!   a snapshot — including nested closures invoked synchronously — is
//!   visible to it; nothing that runs after is.
//! - [`snapshot!`](crate::snapshot) takes the snapshot at its own call site,
//!   so two bind sites for the same action always get two independent
//!   snapshots.
//! - [`HoistedBind`] handles source written in declare-at-top, assign-at-use
//!   order (a bind expression placed after the point its result is used,
//!   even after a `return`). Translating such code hands the bind to
//!   `HoistedBind` as a thunk where the declaration stands and resolves it
//!   where the reference materializes; the snapshot is taken at that moment
//!   and frozen.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::reference::BoundAction;

/// An ordered snapshot of captured argument values.
///
/// Immutable once created: later mutation of the variables it was captured
/// from is never visible through an existing snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArgumentSnapshot(Vec<Value>);

impl ArgumentSnapshot {
    /// Wrap already-serialized values. For types without an infallible
    /// `Value` conversion, serialize via [`serde_json::to_value`] first.
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// A snapshot of no values.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// The captured values, in capture order.
    pub fn values(&self) -> &[Value] {
        &self.0
    }

    /// Copy the values out, preserving order.
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.clone()
    }

    /// Number of captured values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Capture an [`ArgumentSnapshot`] at the call site.
///
/// Each expression is evaluated and converted to a JSON value immediately,
/// making the capture point textual: the snapshot reflects the variables as
/// they stand when this expression executes.
///
/// ```
/// use tether_action::{Var, snapshot};
///
/// let count = Var::new(5);
/// count.update(|c| *c += 1);
/// let snap = snapshot![count.get(), "label"];
/// count.set(99);
/// assert_eq!(snap.values(), &[serde_json::json!(6), serde_json::json!("label")]);
/// ```
#[macro_export]
macro_rules! snapshot {
    () => {
        $crate::capture::ArgumentSnapshot::empty()
    };
    ($($arg:expr),+ $(,)?) => {
        $crate::capture::ArgumentSnapshot::new(vec![
            $(::serde_json::Value::from($arg)),+
        ])
    };
}

/// A mutable scope variable observed by capture points.
///
/// A cheap-to-clone handle over shared storage: clones made for nested
/// closures all see and perform the same mutations, exactly like a captured
/// outer variable. Snapshots copy the value *out*; a [`Var`] itself never
/// ends up inside a reference.
pub struct Var<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> Var<T> {
    /// Create a scope variable with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    /// Replace the value.
    pub fn set(&self, value: T) {
        *self.inner.lock() = value;
    }

    /// Mutate the value in place.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.inner.lock());
    }
}

impl<T: Clone> Var<T> {
    /// Copy the current value out.
    pub fn get(&self) -> T {
        self.inner.lock().clone()
    }
}

impl<T> Clone for Var<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Var<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Var").field(&*self.inner.lock()).finish()
    }
}

/// A bind expression normalized out of hoisted-declaration order.
///
/// Models source where the assignment performing the bind appears textually
/// after the point its result is used — including after a `return`, where
/// the bind is unreachable as ordinary sequential code. The thunk is handed
/// over where the declaration stands and runs exactly once, at
/// [`resolve`](Self::resolve) — the point the enclosing scope materializes
/// the reference. Captured variables are read then, with every mutation that
/// executed up to that moment applied, and the result is frozen.
pub struct HoistedBind {
    thunk: Box<dyn FnOnce() -> BoundAction + Send>,
}

impl HoistedBind {
    /// Declare the bind without evaluating it.
    pub fn new(thunk: impl FnOnce() -> BoundAction + Send + 'static) -> Self {
        Self {
            thunk: Box::new(thunk),
        }
    }

    /// Evaluate the bind at the point the reference materializes.
    pub fn resolve(self) -> BoundAction {
        (self.thunk)()
    }
}

impl fmt::Debug for HoistedBind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HoistedBind").finish_non_exhaustive()
    }
}
