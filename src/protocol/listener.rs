//! Listener registries used for invoke dispatch
//!
//! Each dispatch target owns a [`Listeners`] table mapping listener names to
//! handler closures. The table is built once, alongside the target, and looked
//! up by [`Invoke::apply`](super::invoke::Invoke::apply).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::parameter::ParameterValue;

/// Handler invoked with the target and the invoke's positional arguments.
pub type Handler<T> = Arc<dyn Fn(&T, &[ParameterValue]) -> anyhow::Result<()> + Send + Sync>;

/// Listener-name to handler table for a dispatch target of type `T`.
pub struct Listeners<T> {
    handlers: HashMap<String, Handler<T>>,
}

impl<T> Listeners<T> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler under a listener name, replacing any previous one.
    pub fn register<F>(&mut self, listener: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&T, &[ParameterValue]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.handlers.insert(listener.into(), Arc::new(handler));
        self
    }

    /// Look up the handler for a listener name.
    pub fn get(&self, listener: &str) -> Option<&Handler<T>> {
        self.handlers.get(listener)
    }

    /// Check whether a listener name is registered.
    pub fn contains(&self, listener: &str) -> bool {
        self.handlers.contains_key(listener)
    }

    /// Registered listener names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no listeners are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Listeners<T> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
        }
    }
}

impl<T> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("names", &self.names())
            .finish()
    }
}

/// A target invokes can be dispatched against.
pub trait Dispatch: Sized {
    /// The target's listener table.
    fn listeners(&self) -> &Listeners<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter;

    #[test]
    fn test_register_and_lookup() {
        let mut listeners: Listeners<Counter> = Listeners::new();
        listeners
            .register("increment", |_target, _args| Ok(()))
            .register("reset", |_target, _args| Ok(()));

        assert!(listeners.contains("increment"));
        assert!(!listeners.contains("decrement"));
        assert_eq!(listeners.names(), vec!["increment", "reset"]);
        assert_eq!(listeners.len(), 2);
    }

    #[test]
    fn test_register_replaces_existing_handler() {
        let mut listeners: Listeners<Counter> = Listeners::new();
        listeners.register("go", |_target, _args| anyhow::bail!("old"));
        listeners.register("go", |_target, _args| Ok(()));

        let handler = listeners.get("go").expect("handler");
        assert!(handler(&Counter, &[]).is_ok());
        assert_eq!(listeners.len(), 1);
    }
}
