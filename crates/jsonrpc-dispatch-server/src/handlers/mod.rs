//! Built-in method implementations.

use std::sync::Arc;

use jsonrpc_dispatch::{MethodHandler, ParamsSchema};

pub mod get_time;
pub mod hello;
pub mod registry;

pub use registry::{BoundMethod, MethodTable};

/// A built-in implementation, with the method name it is exposed under by
/// default.
#[derive(Clone)]
pub struct HandlerDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub schema: Option<ParamsSchema>,
    pub handler: Arc<dyn MethodHandler>,
}

/// Every built-in implementation.
pub fn builtin() -> Vec<HandlerDefinition> {
    vec![hello::definition(), get_time::definition()]
}

/// Look up a built-in implementation by name.
pub fn find(name: &str) -> Option<HandlerDefinition> {
    builtin().into_iter().find(|def| def.name == name)
}
