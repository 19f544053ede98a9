use serde::{Deserialize, Serialize};
use serde_json::Value;
use tether_seal::{SealKey, SealedPayload, seal, unseal};
use tracing::debug;

use crate::capture::ArgumentSnapshot;
use crate::error::ActionError;
use crate::id::ActionId;
use crate::registry::ActionRegistry;

/// A registry-issued handle that can be combined with a captured-argument
/// snapshot to produce a [`BoundAction`].
///
/// Obtained from [`ActionRegistry::bindable`], which guarantees the id was
/// registered at issue time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindableAction {
    id: ActionId,
}

impl BindableAction {
    pub(crate) fn new(id: ActionId) -> Self {
        Self { id }
    }

    /// The id this handle binds for.
    pub fn id(&self) -> &ActionId {
        &self.id
    }

    /// Attach a captured-argument snapshot.
    ///
    /// Pure composition: nothing about the snapshot's content is validated
    /// here — that is the implementation's job at invocation time. Each call
    /// site gets its own snapshot; binding the same action at two sites
    /// yields two independent [`BoundAction`]s.
    pub fn bind(&self, snapshot: ArgumentSnapshot) -> BoundAction {
        BoundAction {
            id: self.id.clone(),
            snapshot,
        }
    }
}

/// A bound reference before sealing: an action id plus the snapshot captured
/// for one specific bind site.
///
/// Invoking it — directly via [`ActionRegistry::invoke_local`] or after
/// sealing — always restores exactly this snapshot, no matter how the
/// enclosing scope's variables have changed since.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundAction {
    id: ActionId,
    snapshot: ArgumentSnapshot,
}

impl BoundAction {
    /// The action this reference resolves to.
    pub fn id(&self) -> &ActionId {
        &self.id
    }

    /// The captured arguments.
    pub fn snapshot(&self) -> &ArgumentSnapshot {
        &self.snapshot
    }

    /// Seal the snapshot for transit across the trust boundary.
    pub fn seal(&self, key: &SealKey) -> Result<SealedAction, ActionError> {
        let payload = seal(self.id.as_str(), self.snapshot.values(), key)?;
        Ok(SealedAction { payload })
    }
}

/// The cross-boundary form of a bound reference: an action id paired with
/// its sealed argument payload.
///
/// This is the value embedded in a UI description wherever a callable-action
/// placeholder is expected. The id and payload travel together and are
/// validated together on invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedAction {
    payload: SealedPayload,
}

impl SealedAction {
    /// Rebuild a reference from a payload received over the boundary.
    pub fn from_payload(payload: SealedPayload) -> Self {
        Self { payload }
    }

    /// The id this reference claims to resolve to. Trustworthy only after a
    /// successful unseal.
    pub fn action_id(&self) -> &str {
        self.payload.action_id()
    }

    /// The sealed payload.
    pub fn payload(&self) -> &SealedPayload {
        &self.payload
    }

    /// Pack the reference into a single string token.
    pub fn encode(&self) -> String {
        self.payload.encode()
    }

    /// Parse a token produced by [`SealedAction::encode`].
    pub fn decode(token: &str) -> Result<Self, ActionError> {
        Ok(Self {
            payload: SealedPayload::decode(token)?,
        })
    }
}

impl ActionRegistry {
    /// Invoke a sealed reference.
    ///
    /// Unseals the payload, resolves the implementation, and calls it with
    /// the restored snapshot values followed by `caller_args`, in that fixed
    /// order. Integrity, malformed-payload, and unknown-action failures
    /// propagate unchanged and all occur before the implementation runs; an
    /// error from the implementation itself comes back as
    /// [`ActionError::Execution`] with the cause attached.
    ///
    /// Suspends only while the implementation runs; concurrent invocations
    /// of unrelated references do not block each other.
    pub async fn invoke(
        &self,
        sealed: &SealedAction,
        caller_args: Vec<Value>,
        key: &SealKey,
    ) -> Result<Value, ActionError> {
        let restored = unseal(sealed.payload(), key)?;
        let id = ActionId::new(sealed.action_id())?;
        let descriptor = self.resolve(&id)?;
        debug!(action_id = %id, restored = restored.len(), supplied = caller_args.len(), "invoking action");

        let mut args = restored;
        args.extend(caller_args);
        descriptor
            .handler()
            .call(args)
            .await
            .map_err(|source| ActionError::execution(id, source))
    }

    /// Invoke a bound reference that has not crossed the boundary.
    ///
    /// Trusted-side path: same resolve/append/wrap behavior as
    /// [`invoke`](Self::invoke) without the unseal step.
    pub async fn invoke_local(
        &self,
        bound: &BoundAction,
        caller_args: Vec<Value>,
    ) -> Result<Value, ActionError> {
        let descriptor = self.resolve(bound.id())?;
        let mut args = bound.snapshot().to_vec();
        args.extend(caller_args);
        descriptor
            .handler()
            .call(args)
            .await
            .map_err(|source| ActionError::execution(bound.id().clone(), source))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::action::{ActionHandler, BoxError, FnHandler};
    use crate::snapshot;

    fn id(raw: &str) -> ActionId {
        ActionId::new(raw).unwrap()
    }

    /// Handler that returns its argument list, making ordering observable.
    fn echo_handler() -> Arc<dyn ActionHandler> {
        Arc::new(FnHandler::new(|args: Vec<Value>| async move {
            Ok::<Value, BoxError>(Value::Array(args))
        }))
    }

    fn registry_with(raw_id: &str) -> ActionRegistry {
        let reg = ActionRegistry::new();
        reg.register(ActionId::new(raw_id).unwrap(), echo_handler())
            .unwrap();
        reg
    }

    #[test]
    fn bind_is_pure_composition() {
        let reg = registry_with("app/delete-item");
        let bindable = reg.bindable(&id("app/delete-item")).unwrap();

        let bound = bindable.bind(snapshot![7, "owner"]);
        assert_eq!(bound.id(), &id("app/delete-item"));
        assert_eq!(bound.snapshot().values(), &[json!(7), json!("owner")]);

        // The builder handle is reusable; each bind is independent.
        let again = bindable.bind(snapshot![8]);
        assert_eq!(again.snapshot().values(), &[json!(8)]);
        assert_eq!(bound.snapshot().values(), &[json!(7), json!("owner")]);
    }

    #[tokio::test]
    async fn invoke_restores_the_sealed_snapshot() {
        let reg = registry_with("app/delete-item");
        let key = SealKey::generate();

        let sealed = reg
            .bindable(&id("app/delete-item"))
            .unwrap()
            .bind(snapshot![7])
            .seal(&key)
            .unwrap();

        let result = reg.invoke(&sealed, vec![], &key).await.unwrap();
        assert_eq!(result, json!([7]));
    }

    #[rstest]
    #[case::no_args(vec![], vec![], json!([]))]
    #[case::only_bound(vec![json!(1), json!(2)], vec![], json!([1, 2]))]
    #[case::only_caller(vec![], vec![json!("x")], json!(["x"]))]
    #[case::both(vec![json!(1)], vec![json!("x"), json!(true)], json!([1, "x", true]))]
    #[case::interleaving_preserved(
        vec![json!("a"), json!("b")],
        vec![json!("c"), json!("d")],
        json!(["a", "b", "c", "d"])
    )]
    #[tokio::test]
    async fn caller_args_append_after_restored_args(
        #[case] bound_args: Vec<Value>,
        #[case] caller_args: Vec<Value>,
        #[case] expected: Value,
    ) {
        let reg = registry_with("app/echo");
        let key = SealKey::generate();

        let sealed = reg
            .bindable(&id("app/echo"))
            .unwrap()
            .bind(ArgumentSnapshot::new(bound_args))
            .seal(&key)
            .unwrap();

        let result = reg.invoke(&sealed, caller_args, &key).await.unwrap();
        assert_eq!(result, expected);
    }

    #[tokio::test]
    async fn invoke_round_trips_through_the_token_form() {
        let reg = registry_with("app/delete-item");
        let key = SealKey::generate();

        let token = reg
            .bindable(&id("app/delete-item"))
            .unwrap()
            .bind(snapshot![41, "reason"])
            .seal(&key)
            .unwrap()
            .encode();

        let sealed = SealedAction::decode(&token).unwrap();
        let result = reg.invoke(&sealed, vec![json!(false)], &key).await.unwrap();
        assert_eq!(result, json!([41, "reason", false]));
    }

    #[tokio::test]
    async fn tampered_reference_is_rejected_before_the_handler_runs() {
        let called = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let observer = Arc::clone(&called);
        let reg = ActionRegistry::new();
        reg.register(
            id("app/delete-item"),
            Arc::new(FnHandler::new(move |_args: Vec<Value>| {
                let called = Arc::clone(&observer);
                async move {
                    called.store(true, std::sync::atomic::Ordering::SeqCst);
                    Ok::<Value, BoxError>(json!(null))
                }
            })),
        )
        .unwrap();
        let key = SealKey::generate();

        let token = reg
            .bindable(&id("app/delete-item"))
            .unwrap()
            .bind(snapshot![7])
            .seal(&key)
            .unwrap()
            .encode();
        let tampered = SealedAction::decode(&token.replacen("delete-item", "drop-items", 1)).unwrap();

        let err = reg.invoke(&tampered, vec![], &key).await.unwrap_err();
        assert!(err.is_integrity());
        assert!(!called.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn wrong_key_is_rejected() {
        let reg = registry_with("app/delete-item");
        let sealed = reg
            .bindable(&id("app/delete-item"))
            .unwrap()
            .bind(snapshot![7])
            .seal(&SealKey::generate())
            .unwrap();

        let err = reg.invoke(&sealed, vec![], &SealKey::generate()).await.unwrap_err();
        assert!(err.is_integrity());
    }

    #[tokio::test]
    async fn unknown_action_at_invoke() {
        let sealer = registry_with("app/delete-item");
        let key = SealKey::generate();
        let sealed = sealer
            .bindable(&id("app/delete-item"))
            .unwrap()
            .bind(snapshot![7])
            .seal(&key)
            .unwrap();

        // A process that never registered the action.
        let empty = ActionRegistry::new();
        let err = empty.invoke(&sealed, vec![], &key).await.unwrap_err();
        assert!(err.is_unknown());
    }

    #[tokio::test]
    async fn handler_failure_wraps_as_execution_error() {
        let reg = ActionRegistry::new();
        reg.register(
            id("app/delete-item"),
            Arc::new(FnHandler::new(|_args: Vec<Value>| async move {
                Err::<Value, BoxError>("row is referenced by open orders".into())
            })),
        )
        .unwrap();
        let key = SealKey::generate();

        let sealed = reg
            .bindable(&id("app/delete-item"))
            .unwrap()
            .bind(snapshot![7])
            .seal(&key)
            .unwrap();

        let err = reg.invoke(&sealed, vec![], &key).await.unwrap_err();
        assert!(err.is_execution());
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "row is referenced by open orders");
    }

    #[tokio::test]
    async fn invoke_local_skips_sealing_but_keeps_ordering() {
        let reg = registry_with("app/echo");
        let bound = reg
            .bindable(&id("app/echo"))
            .unwrap()
            .bind(snapshot![1, 2]);

        let result = reg.invoke_local(&bound, vec![json!(3)]).await.unwrap();
        assert_eq!(result, json!([1, 2, 3]));
    }

    #[tokio::test]
    async fn invoke_local_unknown_action() {
        let issuing = registry_with("app/echo");
        let bound = issuing.bindable(&id("app/echo")).unwrap().bind(snapshot![1]);

        let empty = ActionRegistry::new();
        assert!(empty.invoke_local(&bound, vec![]).await.unwrap_err().is_unknown());
    }

    #[tokio::test]
    async fn slow_invocation_does_not_block_unrelated_references() {
        let reg = ActionRegistry::new();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        let release_rx = Arc::new(tokio::sync::Mutex::new(Some(release_rx)));

        reg.register(
            id("app/slow"),
            Arc::new(FnHandler::new(move |_args: Vec<Value>| {
                let release_rx = Arc::clone(&release_rx);
                async move {
                    let rx = release_rx.lock().await.take();
                    if let Some(rx) = rx {
                        let _ = rx.await;
                    }
                    Ok::<Value, BoxError>(json!("slow"))
                }
            })),
        )
        .unwrap();
        reg.register(id("app/fast"), echo_handler()).unwrap();
        let key = SealKey::generate();

        let slow = reg
            .bindable(&id("app/slow"))
            .unwrap()
            .bind(snapshot![])
            .seal(&key)
            .unwrap();
        let fast = reg
            .bindable(&id("app/fast"))
            .unwrap()
            .bind(snapshot![1])
            .seal(&key)
            .unwrap();

        let slow_fut = reg.invoke(&slow, vec![], &key);
        tokio::pin!(slow_fut);

        // The fast action completes while the slow one is still suspended.
        let fast_result = tokio::select! {
            result = reg.invoke(&fast, vec![], &key) => result.unwrap(),
            _ = &mut slow_fut => panic!("slow action finished first"),
        };
        assert_eq!(fast_result, json!([1]));

        release_tx.send(()).unwrap();
        assert_eq!(slow_fut.await.unwrap(), json!("slow"));
    }
}
