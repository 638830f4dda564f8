//! The public session-logger façade.
//!
//! A logger keeps a session id ambient throughout a logical pass through a
//! code block, across asynchronous suspension points, and attaches it (plus
//! any sub-session chain) to every record it dispatches.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::Either;
use serde_json::Value;
use uuid::Uuid;

use crate::context::{self, ScopeBindable};
use crate::format;
use crate::record::{LogMessage, LogRecord};
use crate::sink::{self, LogSink, TracingSink};

/// Store key for the outer session id.
const SESSION_ID_KEY: &str = "logSessionId";
/// Store key for the chain of sub-session ids.
const SUB_SESSION_IDS_KEY: &str = "subSessionIds";
/// Session label attached to records logged outside any session.
const NO_SESSION: &str = "undefined";

/// A logger whose records gain the id of the ambient session.
///
/// The first [`session_with_id`] on a chain becomes the parent session;
/// sessions started while a parent is active become sub-sessions, useful
/// for labelling smaller code paths within the outer one, for instance
/// each item of a fan-out. Callbacks that will fire from a foreign call
/// stack keep the ids when wrapped with [`bind`] or [`bind_future`], or
/// when their emitter is bound with [`bind_emitter`].
///
/// All loggers constructed with one namespace share the same ambient
/// session state.
///
/// [`session_with_id`]: SessionLogger::session_with_id
/// [`bind`]: SessionLogger::bind
/// [`bind_future`]: SessionLogger::bind_future
/// [`bind_emitter`]: SessionLogger::bind_emitter
#[derive(Clone)]
pub struct SessionLogger {
    namespace: String,
    sink: Arc<dyn LogSink>,
}

impl SessionLogger {
    /// Create a logger for `namespace`.
    ///
    /// Uses the process-wide default sink if one is registered, otherwise
    /// a [`TracingSink`] labelled with the namespace.
    pub fn new(namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let sink = sink::global_sink()
            .unwrap_or_else(|| Arc::new(TracingSink::new(namespace.clone())) as Arc<dyn LogSink>);
        Self { namespace, sink }
    }

    /// Create a logger for `namespace` with an explicit sink.
    pub fn with_sink(namespace: impl Into<String>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            namespace: namespace.into(),
            sink,
        }
    }

    /// The namespace this logger stores its session ids under.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The sink records are dispatched to.
    pub fn sink(&self) -> Arc<dyn LogSink> {
        Arc::clone(&self.sink)
    }

    /// Log a message.
    ///
    /// Strings become text records; `serde_json::Value` payloads pass
    /// through structurally. The record carries the ambient session id
    /// (the literal `"undefined"` outside any session) and, when inside a
    /// sub-session, the chain of enclosing sub-session ids. The sink is
    /// invoked synchronously, exactly once.
    pub fn log(&self, message: impl Into<LogMessage>) {
        let namespace = context::get_namespace(&self.namespace);

        let session = namespace
            .as_ref()
            .and_then(|ns| ns.get(SESSION_ID_KEY))
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_else(|| NO_SESSION.to_string());

        let sub_sessions = namespace
            .as_ref()
            .and_then(|ns| ns.get(SUB_SESSION_IDS_KEY))
            .and_then(|value| match value {
                Value::Array(ids) => Some(
                    ids.iter()
                        .filter_map(|id| id.as_str().map(str::to_string))
                        .collect::<Vec<_>>(),
                ),
                _ => None,
            });

        self.sink.log(LogRecord {
            message: message.into(),
            session,
            sub_sessions,
        });
    }

    /// Expand a percent-style template against `args`, then log the
    /// result. See [`format::format`] for the supported directives.
    pub fn log_fmt(&self, template: &str, args: &[Value]) {
        self.log(format::format(template, args));
    }

    /// Run `session_fn` inside a session labelled with a fresh UUID.
    pub async fn session<Fut>(&self, session_fn: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        self.session_with_id(session_fn, Uuid::new_v4().to_string())
            .await
    }

    /// Run `session_fn` inside a session labelled `session_id`.
    ///
    /// The first session on a chain becomes the parent session: every log
    /// made during it carries `session_id`. A session started while a
    /// parent is already active becomes a sub-session: the parent id is
    /// inherited and `session_id` is appended to the sub-session chain for
    /// the duration of `session_fn` only; the id disappears again when
    /// `session_fn` settles.
    ///
    /// Returns `session_fn`'s output unchanged.
    pub async fn session_with_id<Fut>(
        &self,
        session_fn: Fut,
        session_id: impl Into<String>,
    ) -> Fut::Output
    where
        Fut: Future,
    {
        let namespace = context::create_namespace(&self.namespace);
        let session_id = session_id.into();

        let scoped = {
            let namespace = namespace.clone();
            async move {
                if namespace.get(SESSION_ID_KEY).is_none() {
                    // First session on this chain: it becomes the parent.
                    namespace.set(SESSION_ID_KEY, Value::String(session_id));
                } else {
                    // Nested session: extend a copy of the enclosing chain.
                    let mut sub_ids = match namespace.get(SUB_SESSION_IDS_KEY) {
                        Some(Value::Array(ids)) => ids,
                        _ => Vec::new(),
                    };
                    sub_ids.push(Value::String(session_id));
                    namespace.set(SUB_SESSION_IDS_KEY, Value::Array(sub_ids));
                }
                session_fn.await
            }
        };

        namespace.run(scoped).await
    }

    /// Bind a callback to the currently active session.
    ///
    /// The returned function logs with the ids of the session active right
    /// now, no matter which call stack eventually invokes it. Passthrough
    /// when no session is active.
    pub fn bind<F, T>(&self, f: F) -> impl FnOnce() -> T
    where
        F: FnOnce() -> T,
    {
        let captured = context::get_namespace(&self.namespace).and_then(|ns| ns.capture());
        move || match captured {
            Some(scope) => scope.run_sync(f),
            None => f(),
        }
    }

    /// Bind a future to the currently active session.
    ///
    /// Task-local context does not cross `tokio::spawn`; wrap the spawned
    /// future with this first to keep the session ids attached.
    pub fn bind_future<Fut>(&self, fut: Fut) -> impl Future<Output = Fut::Output>
    where
        Fut: Future,
    {
        let captured = context::get_namespace(&self.namespace).and_then(|ns| ns.capture());
        match captured {
            Some(scope) => Either::Left(scope.run(fut)),
            None => Either::Right(fut),
        }
    }

    /// Bind an event emitter to the currently active session.
    ///
    /// All of the emitter's listeners, current and future, will log with
    /// the ids of the session active right now. No-op when no session is
    /// active.
    pub fn bind_emitter<E>(&self, emitter: &E)
    where
        E: ScopeBindable,
    {
        if let Some(namespace) = context::get_namespace(&self.namespace) {
            namespace.rebind_emitter(emitter);
        }
    }
}

impl fmt::Debug for SessionLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionLogger")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CollectingSink {
        records: Mutex<Vec<LogRecord>>,
    }

    impl CollectingSink {
        fn records(&self) -> Vec<LogRecord> {
            self.records.lock().unwrap().clone()
        }
    }

    impl LogSink for CollectingSink {
        fn log(&self, record: LogRecord) {
            self.records.lock().unwrap().push(record);
        }
    }

    fn collecting(namespace: &str) -> (SessionLogger, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::default());
        (SessionLogger::with_sink(namespace, sink.clone()), sink)
    }

    #[test]
    fn test_log_outside_session_is_undefined() {
        let (logger, sink) = collecting("unit_ns_outside");
        logger.log("a log message");

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, LogMessage::Text("a log message".into()));
        assert_eq!(records[0].session, "undefined");
        assert!(records[0].sub_sessions.is_none());
    }

    #[tokio::test]
    async fn test_session_id_attached_to_formatted_message() {
        let (logger, sink) = collecting("unit_ns_session");
        logger
            .session_with_id(
                async { logger.log_fmt("%d : %s", &[json!(1154), json!("a string")]) },
                "a test session",
            )
            .await;

        let records = sink.records();
        assert_eq!(records[0].message, LogMessage::Text("1154 : a string".into()));
        assert_eq!(records[0].session, "a test session");
    }

    #[tokio::test]
    async fn test_loggers_share_namespace_state() {
        let sink = Arc::new(CollectingSink::default());
        let first = SessionLogger::with_sink("unit_ns_shared", sink.clone());
        let second = SessionLogger::with_sink("unit_ns_shared", sink.clone());

        first
            .session_with_id(async { second.log("from the other logger") }, "shared")
            .await;

        assert_eq!(sink.records()[0].session, "shared");
    }

    #[tokio::test]
    async fn test_session_result_passes_through() {
        let (logger, _sink) = collecting("unit_ns_result");

        let ok: Result<u32, &str> = logger
            .session_with_id(async { Ok(7) }, "result session")
            .await;
        assert_eq!(ok, Ok(7));

        let err: Result<u32, &str> = logger
            .session_with_id(async { Err("boom") }, "result session")
            .await;
        assert_eq!(err, Err("boom"));
    }
}
