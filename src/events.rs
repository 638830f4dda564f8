//! Minimal event emitter, the bindable dispatch collaborator.
//!
//! Listeners registered here fire synchronously on [`EventEmitter::emit`].
//! Once a scope has been bound to the emitter, every listener fires inside
//! it, whether registered before or after the binding.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use serde_json::Value;

use crate::context::{Scope, ScopeBindable};
use crate::error::SessionLogError;
use crate::Result;

type Listener = Box<dyn FnMut(&Value) + Send>;

struct Entry {
    listener: Listener,
    once: bool,
}

/// A small event emitter: named events, synchronous dispatch.
#[derive(Default)]
pub struct EventEmitter {
    listeners: Mutex<HashMap<String, Vec<Entry>>>,
    scope: RwLock<Option<Scope>>,
}

impl EventEmitter {
    /// Create an emitter with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener invoked on every `event`.
    pub fn on<F>(&self, event: impl Into<String>, listener: F) -> Result<()>
    where
        F: FnMut(&Value) + Send + 'static,
    {
        self.register(event.into(), Box::new(listener), false)
    }

    /// Register a listener invoked on the next `event` only.
    pub fn once<F>(&self, event: impl Into<String>, listener: F) -> Result<()>
    where
        F: FnMut(&Value) + Send + 'static,
    {
        self.register(event.into(), Box::new(listener), true)
    }

    fn register(&self, event: String, listener: Listener, once: bool) -> Result<()> {
        let mut listeners = self
            .listeners
            .lock()
            .map_err(|_| SessionLogError::LockPoisoned)?;
        listeners
            .entry(event)
            .or_default()
            .push(Entry { listener, once });
        Ok(())
    }

    /// Dispatch `event` with `payload` to every registered listener.
    ///
    /// Returns the number of listeners fired. Listeners may register new
    /// listeners during dispatch; emitting recursively on the same emitter
    /// from inside a listener is not supported.
    pub fn emit(&self, event: &str, payload: &Value) -> Result<usize> {
        let mut entries = {
            let mut listeners = self
                .listeners
                .lock()
                .map_err(|_| SessionLogError::LockPoisoned)?;
            match listeners.get_mut(event) {
                Some(entries) => std::mem::take(entries),
                None => return Ok(0),
            }
        };

        let scope = self
            .scope
            .read()
            .map_err(|_| SessionLogError::LockPoisoned)?
            .clone();

        let fired = entries.len();
        for entry in entries.iter_mut() {
            match &scope {
                Some(scope) => scope.clone().run_sync(|| (entry.listener)(payload)),
                None => (entry.listener)(payload),
            }
        }
        entries.retain(|entry| !entry.once);

        let mut listeners = self
            .listeners
            .lock()
            .map_err(|_| SessionLogError::LockPoisoned)?;
        let slot = listeners.entry(event.to_string()).or_default();
        let registered_during_dispatch = std::mem::take(slot);
        *slot = entries;
        slot.extend(registered_during_dispatch);
        Ok(fired)
    }

    /// Number of listeners currently registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners
            .lock()
            .map(|listeners| listeners.get(event).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

impl ScopeBindable for EventEmitter {
    fn bind_scope(&self, scope: Scope) {
        if let Ok(mut slot) = self.scope.write() {
            *slot = Some(scope);
        }
    }
}
