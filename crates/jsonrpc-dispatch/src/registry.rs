//! Method registration and lookup.

use std::collections::HashMap;
use std::sync::Arc;

use crate::handler::MethodHandler;
use crate::schema::Validator;

/// One registered method: its implementation and optional parameter schema.
#[derive(Clone)]
pub struct Registration {
    handler: Arc<dyn MethodHandler>,
    schema: Option<Arc<dyn Validator>>,
}

impl Registration {
    pub fn new(handler: Arc<dyn MethodHandler>, schema: Option<Arc<dyn Validator>>) -> Self {
        Self { handler, schema }
    }

    pub fn handler(&self) -> &Arc<dyn MethodHandler> {
        &self.handler
    }

    pub fn schema(&self) -> Option<&Arc<dyn Validator>> {
        self.schema.as_ref()
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("has_schema", &self.schema.is_some())
            .finish()
    }
}

/// Method name → registration.
///
/// Populated during startup, then moved into a
/// [`Dispatcher`](crate::Dispatcher) which only ever reads it. Registering a
/// name twice replaces the earlier entry.
#[derive(Debug, Default, Clone)]
pub struct HandlerRegistry {
    methods: HashMap<String, Registration>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `name`, replacing (and returning) any previous registration.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: Arc<dyn MethodHandler>,
        schema: Option<Arc<dyn Validator>>,
    ) -> Option<Registration> {
        let name = name.into();
        let previous = self
            .methods
            .insert(name.clone(), Registration::new(handler, schema));
        if previous.is_some() {
            tracing::warn!("Method '{name}' registered twice; keeping the last registration");
        } else {
            tracing::debug!("Registered method '{name}'");
        }
        previous
    }

    pub fn lookup(&self, name: &str) -> Option<&Registration> {
        self.methods.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Registered names in lexical order.
    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
