//! Per-namespace ambient stores and the process-wide registry.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, OnceLock};

use futures_util::future::Either;
use serde_json::Value;

use super::frame::{self, Scope, ScopeBindable};

static REGISTRY: OnceLock<Mutex<HashMap<String, Namespace>>> = OnceLock::new();

fn registry() -> &'static Mutex<HashMap<String, Namespace>> {
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

fn registry_lock() -> std::sync::MutexGuard<'static, HashMap<String, Namespace>> {
    match registry().lock() {
        Ok(guard) => guard,
        // the map stays intact across a poisoning insert
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Get or create the shared ambient store for `name`.
///
/// Idempotent: every call with the same name returns a handle to the same
/// underlying store for the lifetime of the process.
pub fn create_namespace(name: &str) -> Namespace {
    registry_lock()
        .entry(name.to_string())
        .or_insert_with(|| Namespace::new(name))
        .clone()
}

/// Look up an existing store without creating one.
pub fn get_namespace(name: &str) -> Option<Namespace> {
    registry_lock().get(name).cloned()
}

/// Handle to an ambient, asynchronously propagated key/value store scoped
/// to a logical call chain.
///
/// Handles are cheap to clone; all handles for one namespace share the
/// same underlying store.
#[derive(Debug, Clone)]
pub struct Namespace {
    inner: Arc<NamespaceInner>,
}

#[derive(Debug)]
struct NamespaceInner {
    name: String,
}

impl Namespace {
    fn new(name: &str) -> Self {
        Self {
            inner: Arc::new(NamespaceInner {
                name: name.to_string(),
            }),
        }
    }

    /// The namespace name this store is keyed by.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Whether a scope is currently ambient for this namespace.
    pub fn is_active(&self) -> bool {
        frame::current_frame(&self.inner.name).is_some()
    }

    /// Execute `fut` inside a fresh scope nested under the current one.
    ///
    /// Values set during `fut` (before or after suspension points) are
    /// visible to nested reads but never to code outside the scope or to
    /// sibling scopes. Returns `fut`'s output unchanged.
    pub async fn run<Fut>(&self, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        frame::enter(&self.inner.name, fut).await
    }

    /// Read `key` from the innermost ambient frame, falling through to
    /// enclosing frames. `None` when no scope is active.
    pub fn get(&self, key: &str) -> Option<Value> {
        frame::current_frame(&self.inner.name).and_then(|frame| frame.get(key))
    }

    /// Write `key` into the innermost ambient frame only.
    ///
    /// Returns `false` (and writes nothing) when no scope is active.
    pub fn set(&self, key: &str, value: Value) -> bool {
        match frame::current_frame(&self.inner.name) {
            Some(frame) => frame.set(key, value),
            None => false,
        }
    }

    /// Capture the ambient scope for later reinstatement.
    pub fn capture(&self) -> Option<Scope> {
        self.is_active().then(|| Scope::new(frame::current_map()))
    }

    /// Wrap `f` so that, whenever it is eventually invoked, it runs with
    /// the scope that is ambient right now.
    ///
    /// Passthrough when no scope is active: `f` then runs with whatever
    /// scope is ambient at invocation time.
    pub fn rebind<F, T>(&self, f: F) -> impl FnOnce() -> T
    where
        F: FnOnce() -> T,
    {
        let captured = self.capture();
        move || match captured {
            Some(scope) => scope.run_sync(f),
            None => f(),
        }
    }

    /// Wrap `fut` so it is polled with the scope that is ambient right now.
    ///
    /// Task-locals do not cross `tokio::spawn`; rebinding first keeps the
    /// scope attached to detached work.
    pub fn rebind_future<Fut>(&self, fut: Fut) -> impl Future<Output = Fut::Output>
    where
        Fut: Future,
    {
        match self.capture() {
            Some(scope) => Either::Left(scope.run(fut)),
            None => Either::Right(fut),
        }
    }

    /// Bind an event dispatcher to the scope that is ambient right now.
    ///
    /// Every listener, registered before or after this call, fires inside
    /// the captured scope for the lifetime of the emitter. No-op when no
    /// scope is active.
    pub fn rebind_emitter<E>(&self, emitter: &E)
    where
        E: ScopeBindable,
    {
        if let Some(scope) = self.capture() {
            emitter.bind_scope(scope);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_is_idempotent() {
        let a = create_namespace("ns_registry_a");
        let b = create_namespace("ns_registry_a");
        assert!(Arc::ptr_eq(&a.inner, &b.inner));
    }

    #[test]
    fn test_get_does_not_create() {
        assert!(get_namespace("ns_registry_missing").is_none());
        create_namespace("ns_registry_b");
        assert!(get_namespace("ns_registry_b").is_some());
    }

    #[test]
    fn test_lookups_degrade_outside_scope() {
        let ns = create_namespace("ns_no_scope");
        assert!(!ns.is_active());
        assert_eq!(ns.get("anything"), None);
        assert!(!ns.set("anything", json!(1)));
        assert!(ns.capture().is_none());
    }

    #[test]
    fn test_nested_scope_shadows_without_replacing() {
        let ns = create_namespace("ns_nested");
        tokio_test::block_on(ns.run(async {
            ns.set("k", json!("outer"));

            ns.run(async {
                assert_eq!(ns.get("k"), Some(json!("outer")));
                ns.set("k", json!("inner"));
                assert_eq!(ns.get("k"), Some(json!("inner")));
            })
            .await;

            assert_eq!(ns.get("k"), Some(json!("outer")));
        }));
    }

    #[test]
    fn test_rebind_passthrough_without_scope() {
        let ns = create_namespace("ns_rebind_none");
        let wrapped = ns.rebind(|| ns.get("k"));
        assert_eq!(wrapped(), None);
    }

    #[test]
    fn test_rebind_restores_exited_scope() {
        let ns = create_namespace("ns_rebind_live");
        let wrapped = tokio_test::block_on(ns.run(async {
            ns.set("k", json!(42));
            ns.rebind(|| ns.get("k"))
        }));

        // the originating scope has exited; the binding still sees it
        assert!(!ns.is_active());
        assert_eq!(wrapped(), Some(json!(42)));
    }

    #[test]
    fn test_rebind_future_restores_exited_scope() {
        let ns = create_namespace("ns_rebind_fut");
        let bound = tokio_test::block_on(ns.run(async {
            ns.set("k", json!("kept"));
            ns.rebind_future(async { ns.get("k") })
        }));

        assert_eq!(tokio_test::block_on(bound), Some(json!("kept")));
    }
}
