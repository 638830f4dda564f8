//! Frame tree and task-local scope machinery.
//!
//! Ambient storage is a tree of frames: each scope entry pushes a new frame
//! whose parent is the frame that was ambient at entry. The map of
//! currently ambient frames (one per namespace) rides a tokio task-local,
//! which the runtime re-installs at every poll of a scoped future, so the
//! frame chain follows the logical continuation rather than the physical
//! call stack.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use serde_json::Value;

tokio::task_local! {
    static ACTIVE_SCOPES: ScopeMap;
}

/// One storage frame in the scope tree.
///
/// Reads fall through to the parent chain; writes land in this frame only.
#[derive(Debug, Default)]
pub(crate) struct Frame {
    values: RwLock<HashMap<String, Value>>,
    parent: Option<Arc<Frame>>,
}

impl Frame {
    pub(crate) fn child_of(parent: Option<Arc<Frame>>) -> Arc<Self> {
        Arc::new(Self {
            values: RwLock::new(HashMap::new()),
            parent,
        })
    }

    /// Read `key` from this frame, falling through to enclosing frames.
    pub(crate) fn get(&self, key: &str) -> Option<Value> {
        if let Ok(values) = self.values.read() {
            if let Some(value) = values.get(key) {
                return Some(value.clone());
            }
        }
        self.parent.as_ref().and_then(|parent| parent.get(key))
    }

    /// Write `key` into this frame only.
    ///
    /// Returns `false` without writing when the value lock is poisoned.
    pub(crate) fn set(&self, key: &str, value: Value) -> bool {
        match self.values.write() {
            Ok(mut values) => {
                values.insert(key.to_string(), value);
                true
            }
            Err(_) => false,
        }
    }
}

/// The set of ambient frames, keyed by namespace name.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScopeMap {
    frames: HashMap<String, Arc<Frame>>,
}

/// The frame currently ambient for `namespace`, if any.
pub(crate) fn current_frame(namespace: &str) -> Option<Arc<Frame>> {
    ACTIVE_SCOPES
        .try_with(|map| map.frames.get(namespace).cloned())
        .ok()
        .flatten()
}

/// Snapshot of the full ambient scope map (empty outside any scope).
pub(crate) fn current_map() -> ScopeMap {
    ACTIVE_SCOPES.try_with(ScopeMap::clone).unwrap_or_default()
}

/// Run `fut` with a fresh frame for `namespace` pushed onto the ambient map.
pub(crate) async fn enter<Fut>(namespace: &str, fut: Fut) -> Fut::Output
where
    Fut: Future,
{
    let mut map = current_map();
    let parent = map.frames.get(namespace).cloned();
    map.frames
        .insert(namespace.to_string(), Frame::child_of(parent));
    ACTIVE_SCOPES.scope(map, fut).await
}

/// A captured ambient scope that can be reinstated around later work.
///
/// Produced by [`capture`](crate::context::Namespace::capture); reinstating
/// one is what `bind` and `bind_emitter` do under the hood.
#[derive(Debug, Clone)]
pub struct Scope {
    map: ScopeMap,
}

impl Scope {
    pub(crate) fn new(map: ScopeMap) -> Self {
        Self { map }
    }

    /// Invoke `f` with this scope reinstated as the ambient scope.
    pub fn run_sync<F, T>(self, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        ACTIVE_SCOPES.sync_scope(self.map, f)
    }

    /// Run `fut` with this scope reinstated as the ambient scope.
    pub fn run<Fut>(self, fut: Fut) -> impl Future<Output = Fut::Output>
    where
        Fut: Future,
    {
        ACTIVE_SCOPES.scope(self.map, fut)
    }
}

/// Dispatchers that can reinstate a captured scope around their callbacks.
///
/// Implemented by [`EventEmitter`](crate::events::EventEmitter); the seam
/// any callback registry needs in order to participate in
/// [`rebind_emitter`](crate::context::Namespace::rebind_emitter).
pub trait ScopeBindable {
    /// Install `scope` as the ambient scope for future dispatches.
    fn bind_scope(&self, scope: Scope);
}
