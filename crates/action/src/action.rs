use std::future::Future;

use async_trait::async_trait;
use serde_json::Value;

/// Boxed error type returned by action implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Server-side implementation of an action.
///
/// Receives the restored bound arguments followed by any caller-supplied
/// arguments, in that fixed order, as one JSON value sequence. By the time
/// `call` runs the arguments have already passed authentication and decoding;
/// validating their *content* is the implementation's job.
///
/// # Object Safety
///
/// Object-safe: the registry stores implementations as
/// `Arc<dyn ActionHandler>`.
#[async_trait]
pub trait ActionHandler: Send + Sync + 'static {
    /// Run the action.
    async fn call(&self, args: Vec<Value>) -> Result<Value, BoxError>;
}

/// Adapter wrapping an async closure as an [`ActionHandler`].
///
/// Registration call sites are typically generated; this keeps them to one
/// expression instead of a trait impl per action.
///
/// # Example
///
/// ```
/// use tether_action::{ActionHandler, BoxError, FnHandler};
/// use serde_json::{Value, json};
///
/// let handler = FnHandler::new(|args: Vec<Value>| async move {
///     Ok::<_, BoxError>(json!({ "received": args.len() }))
/// });
/// ```
pub struct FnHandler<F> {
    f: F,
}

impl<F> FnHandler<F> {
    /// Wrap a closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> ActionHandler for FnHandler<F>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, BoxError>> + Send + 'static,
{
    async fn call(&self, args: Vec<Value>) -> Result<Value, BoxError> {
        (self.f)(args).await
    }
}
