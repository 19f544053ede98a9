use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::action::ActionHandler;
use crate::error::ActionError;
use crate::id::ActionId;
use crate::reference::BindableAction;

/// One registered action: its id paired with its implementation.
///
/// Owned exclusively by the registry; created at startup, never mutated.
pub struct ActionDescriptor {
    id: ActionId,
    handler: Arc<dyn ActionHandler>,
}

impl ActionDescriptor {
    /// The action's id.
    pub fn id(&self) -> &ActionId {
        &self.id
    }

    /// The action's implementation.
    pub fn handler(&self) -> &Arc<dyn ActionHandler> {
        &self.handler
    }
}

impl fmt::Debug for ActionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDescriptor")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Process-wide table mapping action ids to implementations.
///
/// Populated during deterministic startup as action-bearing modules load,
/// read-only afterwards; the invocation path only ever takes the read lock,
/// so concurrent invocations never contend. The registry is an explicit
/// value, not ambient global state — inject a fresh one per test.
///
/// Entries are never removed during normal operation, and an id is never
/// rebound to a different implementation.
#[derive(Default)]
pub struct ActionRegistry {
    actions: RwLock<HashMap<ActionId, Arc<ActionDescriptor>>>,
}

impl ActionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action implementation under `id`.
    ///
    /// Re-registering the same implementation (`Arc` identity) is a no-op
    /// returning the existing descriptor, so a registration call site that
    /// runs on every module initialization stays idempotent.
    ///
    /// # Errors
    ///
    /// [`ActionError::Duplicate`] if the id is already bound to a different
    /// implementation.
    pub fn register(
        &self,
        id: ActionId,
        handler: Arc<dyn ActionHandler>,
    ) -> Result<Arc<ActionDescriptor>, ActionError> {
        let mut actions = self.actions.write();
        if let Some(existing) = actions.get(&id) {
            if Arc::ptr_eq(existing.handler(), &handler) {
                return Ok(Arc::clone(existing));
            }
            return Err(ActionError::Duplicate { id });
        }
        debug!(action_id = %id, "registered action");
        let descriptor = Arc::new(ActionDescriptor {
            id: id.clone(),
            handler,
        });
        actions.insert(id, Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Look up the implementation registered under `id`.
    ///
    /// Safe to call concurrently from many invocation requests.
    ///
    /// # Errors
    ///
    /// [`ActionError::Unknown`] if no descriptor exists.
    pub fn resolve(&self, id: &ActionId) -> Result<Arc<ActionDescriptor>, ActionError> {
        self.actions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| ActionError::Unknown { id: id.clone() })
    }

    /// Issue a bindable reference for `id`.
    ///
    /// Registration must have completed: an unregistered id is
    /// [`ActionError::Unknown`], never a silently created placeholder.
    pub fn bindable(&self, id: &ActionId) -> Result<BindableAction, ActionError> {
        if !self.actions.read().contains_key(id) {
            return Err(ActionError::Unknown { id: id.clone() });
        }
        Ok(BindableAction::new(id.clone()))
    }

    /// Check whether an action with the given id is registered.
    pub fn contains(&self, id: &ActionId) -> bool {
        self.actions.read().contains_key(id)
    }

    /// Number of registered actions.
    pub fn len(&self) -> usize {
        self.actions.read().len()
    }

    /// Returns `true` if no actions are registered.
    pub fn is_empty(&self) -> bool {
        self.actions.read().is_empty()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let actions = self.actions.read();
        f.debug_struct("ActionRegistry")
            .field("count", &actions.len())
            .field("ids", &actions.keys().collect::<Vec<_>>())
            .finish()
    }
}
