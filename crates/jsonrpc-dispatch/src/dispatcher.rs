//! Request lifecycle: resolve, validate, invoke, and map the outcome to a
//! response.
//!
//! ```text
//! Received → Resolved | MethodNotFound
//!          → Validated | InvalidParams
//!          → Completed | InternalError
//! ```
//!
//! Whatever the handler does, the caller gets exactly one response back.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;

use crate::error::{DispatchError, DispatchResult};
use crate::registry::HandlerRegistry;
use crate::types::{JsonRpcRequest, JsonRpcResponse};

/// Terminal state of one dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Completed => "completed",
            Outcome::InvalidRequest => "invalid_request",
            Outcome::MethodNotFound => "method_not_found",
            Outcome::InvalidParams => "invalid_params",
            Outcome::InternalError => "internal_error",
        }
    }
}

impl From<&DispatchError> for Outcome {
    fn from(err: &DispatchError) -> Self {
        match err {
            DispatchError::InvalidRequest(_) => Outcome::InvalidRequest,
            DispatchError::MethodNotFound(_) => Outcome::MethodNotFound,
            DispatchError::InvalidParams(_) => Outcome::InvalidParams,
            DispatchError::Internal(_) => Outcome::InternalError,
        }
    }
}

/// A response together with the state that produced it.
#[derive(Debug, Clone)]
pub struct Dispatched {
    pub outcome: Outcome,
    pub response: JsonRpcResponse,
}

/// Routes requests to registered handlers.
///
/// Cheap to clone; clones share the same frozen registry, so any number of
/// requests can be in flight at once.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
}

impl Dispatcher {
    pub fn new(registry: HandlerRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Handle one request and return its response.
    pub async fn handle(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        self.dispatch(request).await.response
    }

    /// Like [`handle`](Self::handle), but also reports the terminal state.
    pub async fn dispatch(&self, request: JsonRpcRequest) -> Dispatched {
        let JsonRpcRequest {
            method, params, id, ..
        } = request;

        match self.run(&method, params).await {
            Ok(result) => {
                tracing::debug!(method = %method, id = %id, outcome = "completed", "Dispatched");
                Dispatched {
                    outcome: Outcome::Completed,
                    response: JsonRpcResponse::success(id, result),
                }
            }
            Err(err) => {
                let outcome = Outcome::from(&err);
                match &err {
                    DispatchError::Internal(message) => {
                        tracing::warn!(method = %method, id = %id, "Handler failed: {message}");
                    }
                    _ => {
                        tracing::debug!(method = %method, id = %id, outcome = outcome.as_str(), "Dispatched: {err}");
                    }
                }
                Dispatched {
                    outcome,
                    response: err.to_response(id),
                }
            }
        }
    }

    async fn run(&self, method: &str, params: Option<Value>) -> DispatchResult<Value> {
        let registration = self
            .registry
            .lookup(method)
            .ok_or_else(|| DispatchError::MethodNotFound(method.to_string()))?;

        if let Some(schema) = registration.schema() {
            schema
                .validate(params.as_ref())
                .map_err(DispatchError::InvalidParams)?;
        }

        let invocation = AssertUnwindSafe(registration.handler().invoke(params))
            .catch_unwind()
            .await;

        match invocation {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => Err(DispatchError::Internal(e.to_string())),
            Err(panic) => Err(DispatchError::Internal(panic_message(panic.as_ref()))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Handler panicked".to_string()
    }
}
