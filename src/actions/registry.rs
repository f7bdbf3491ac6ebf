//! Action registry.
//!
//! # Responsibilities
//! - Map action names to constructors
//! - Hand constructors to the pipeline compiler
//!
//! # Design Decisions
//! - The registry is a value passed to the compiler, not global state, so
//!   independent gateways (and test suites) in one process never interfere
//! - Re-registering a name replaces the previous constructor
//! - Shared read-only (Arc) once the gateway is loaded

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tower::BoxError;

use crate::actions::handler::Handler;
use crate::config::GatewayConfig;

/// Builds a handler from a processor's params and the gateway config.
pub type ActionConstructor =
    Arc<dyn Fn(&Value, &GatewayConfig) -> Result<Arc<dyn Handler>, BoxError> + Send + Sync>;

/// Named action constructors.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    actions: HashMap<String, ActionConstructor>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor, returning the one it replaced.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F) -> Option<ActionConstructor>
    where
        F: Fn(&Value, &GatewayConfig) -> Result<Arc<dyn Handler>, BoxError> + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!(action = %name, "Registering action");
        self.actions.insert(name, Arc::new(constructor))
    }

    pub fn lookup(&self, name: &str) -> Option<&ActionConstructor> {
        self.actions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.names())
            .finish()
    }
}
