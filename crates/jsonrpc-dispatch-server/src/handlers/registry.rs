//! The method table: which name each built-in is exposed under.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};

use jsonrpc_dispatch::{Dispatcher, HandlerRegistry, Validator};

use crate::config::manifest::MethodManifest;
use crate::error::{ServerError, ServerResult};

use super::HandlerDefinition;

/// A built-in bound to the method name clients call.
#[derive(Clone)]
pub struct BoundMethod {
    pub method: String,
    pub definition: HandlerDefinition,
}

impl BoundMethod {
    /// Name, implementation, description and parameter schema as JSON.
    pub fn describe(&self) -> Value {
        json!({
            "method": self.method,
            "handler": self.definition.name,
            "description": self.definition.description,
            "params": self.definition.schema.as_ref().map(|s| s.as_json().clone()),
        })
    }
}

/// Fully resolved set of methods, ready to become a registry.
#[derive(Clone)]
pub struct MethodTable {
    methods: Vec<BoundMethod>,
}

impl MethodTable {
    /// Every built-in under its own name.
    pub fn builtin() -> Self {
        let methods = super::builtin()
            .into_iter()
            .map(|definition| BoundMethod {
                method: definition.name.to_string(),
                definition,
            })
            .collect();
        Self { methods }
    }

    /// Resolve a manifest. Any entry that cannot be bound fails the whole
    /// table; nothing is skipped.
    pub fn from_manifest(manifest: &MethodManifest) -> ServerResult<Self> {
        if manifest.methods.is_empty() {
            return Err(ServerError::EmptyManifest);
        }

        let mut seen = HashSet::new();
        let mut methods = Vec::with_capacity(manifest.methods.len());
        for entry in &manifest.methods {
            let method = entry.method_name().to_string();
            let definition =
                super::find(&entry.handler).ok_or_else(|| ServerError::UnknownHandler {
                    method: method.clone(),
                    handler: entry.handler.clone(),
                })?;
            if !seen.insert(method.clone()) {
                return Err(ServerError::DuplicateMethod(method));
            }
            methods.push(BoundMethod { method, definition });
        }

        Ok(Self { methods })
    }

    /// Built-ins, or the manifest at `path` when one is given.
    pub fn load(path: Option<&Path>) -> ServerResult<Self> {
        match path {
            Some(path) => {
                let manifest = MethodManifest::load(path)?;
                let table = Self::from_manifest(&manifest)?;
                tracing::info!(
                    "Loaded {} method(s) from manifest {}",
                    table.len(),
                    path.display()
                );
                Ok(table)
            }
            None => Ok(Self::builtin()),
        }
    }

    pub fn methods(&self) -> &[BoundMethod] {
        &self.methods
    }

    pub fn get(&self, method: &str) -> Option<&BoundMethod> {
        self.methods.iter().find(|m| m.method == method)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn to_registry(&self) -> HandlerRegistry {
        let mut registry = HandlerRegistry::new();
        for bound in &self.methods {
            let schema = bound
                .definition
                .schema
                .clone()
                .map(|s| Arc::new(s) as Arc<dyn Validator>);
            registry.register(
                bound.method.clone(),
                bound.definition.handler.clone(),
                schema,
            );
        }
        registry
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.to_registry())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::manifest::MethodEntry;

    fn entry(name: Option<&str>, handler: &str) -> MethodEntry {
        MethodEntry {
            name: name.map(String::from),
            handler: handler.to_string(),
        }
    }

    #[test]
    fn test_builtin_table() {
        let table = MethodTable::builtin();
        let names: Vec<&str> = table.methods().iter().map(|m| m.method.as_str()).collect();
        assert_eq!(names, vec!["hello", "getTime"]);
        assert_eq!(table.to_registry().method_names(), vec!["getTime", "hello"]);
    }

    #[test]
    fn test_manifest_aliases() {
        let manifest = MethodManifest {
            methods: vec![entry(Some("greet"), "hello"), entry(None, "getTime")],
        };
        let table = MethodTable::from_manifest(&manifest).unwrap();
        assert_eq!(table.get("greet").unwrap().definition.name, "hello");
        assert!(table.get("hello").is_none());
        assert!(table.get("getTime").is_some());
    }

    #[test]
    fn test_unknown_handler_is_fatal() {
        let manifest = MethodManifest {
            methods: vec![entry(None, "hello"), entry(Some("weather"), "forecast")],
        };
        match MethodTable::from_manifest(&manifest) {
            Err(ServerError::UnknownHandler { method, handler }) => {
                assert_eq!(method, "weather");
                assert_eq!(handler, "forecast");
            }
            other => panic!("expected UnknownHandler, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_duplicate_method_is_fatal() {
        let manifest = MethodManifest {
            methods: vec![entry(Some("t"), "getTime"), entry(Some("t"), "hello")],
        };
        assert!(matches!(
            MethodTable::from_manifest(&manifest),
            Err(ServerError::DuplicateMethod(m)) if m == "t"
        ));
    }

    #[test]
    fn test_empty_manifest_is_fatal() {
        let manifest = MethodManifest { methods: vec![] };
        assert!(matches!(
            MethodTable::from_manifest(&manifest),
            Err(ServerError::EmptyManifest)
        ));
    }

    #[test]
    fn test_describe_includes_schema() {
        let table = MethodTable::builtin();
        let hello = table.get("hello").unwrap().describe();
        assert_eq!(hello["handler"], "hello");
        assert_eq!(hello["params"]["required"], json!(["name"]));
    }
}
