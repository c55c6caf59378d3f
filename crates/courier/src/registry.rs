//! Subaction-to-handler registry.
//!
//! The [`HandlerRegistry`] is populated once at startup and shared read-only
//! with the dispatcher. Lookup is an exact, case-sensitive match on the
//! subaction name; there is no prefix or wildcard matching.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::handler::CommandHandler;

/// Errors raised while populating the registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The subaction name was empty.
    #[error("subaction name must not be empty")]
    EmptyName,
    /// A handler is already registered under this name.
    #[error("subaction '{name}' is already registered")]
    Duplicate { name: String },
}

/// Registry of command handlers keyed by subaction name.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("HandlerRegistry")
            .field("subactions", &names)
            .finish()
    }
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EmptyName`] for an empty name and
    /// [`RegistryError::Duplicate`] if the name is taken.
    pub fn register<H>(&mut self, name: impl Into<String>, handler: H) -> Result<(), RegistryError>
    where
        H: CommandHandler + 'static,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.handlers.contains_key(&name) {
            return Err(RegistryError::Duplicate { name });
        }
        self.handlers.insert(name, Arc::new(handler));
        Ok(())
    }

    /// Looks up the handler registered under exactly `name`.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&Arc<dyn CommandHandler>> {
        self.handlers.get(name)
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` when no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
