//! Method: hello. Greets someone by name.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use jsonrpc_dispatch::{MethodHandler, ParamsSchema};

use super::HandlerDefinition;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct HelloParams {
    /// Who to greet
    #[schemars(length(min = 1))]
    pub name: String,
}

pub struct Hello;

#[async_trait]
impl MethodHandler for Hello {
    async fn invoke(&self, params: Option<Value>) -> anyhow::Result<Value> {
        let params: HelloParams = serde_json::from_value(params.unwrap_or(Value::Null))?;
        Ok(json!(format!("Hello, {}!", params.name)))
    }
}

pub fn definition() -> HandlerDefinition {
    HandlerDefinition {
        name: "hello",
        description: "Return a greeting for the given name",
        schema: Some(ParamsSchema::of::<HelloParams>()),
        handler: Arc::new(Hello),
    }
}
