//! The contract every method implementation fulfils.

use std::future::Future;

use async_trait::async_trait;
use serde_json::Value;

/// A pluggable method implementation.
///
/// `params` is exactly what the request carried (already checked against the
/// registered schema, if any). Any error returned is reported to the caller
/// as an internal error carrying only its message.
#[async_trait]
pub trait MethodHandler: Send + Sync {
    async fn invoke(&self, params: Option<Value>) -> anyhow::Result<Value>;
}

/// Adapter turning an async closure into a [`MethodHandler`].
pub struct FnHandler<F> {
    f: F,
}

/// Wrap an async closure as a handler.
///
/// ```ignore
/// let echo = handler_fn(|params| async move { Ok(params.unwrap_or_default()) });
/// ```
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Option<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut> MethodHandler for FnHandler<F>
where
    F: Fn(Option<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    async fn invoke(&self, params: Option<Value>) -> anyhow::Result<Value> {
        (self.f)(params).await
    }
}
