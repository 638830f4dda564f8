//! Sink contract, the default tracing-backed sink, and the process-wide
//! default sink registration.

use std::sync::{Arc, OnceLock};

use crate::error::SessionLogError;
use crate::record::LogRecord;
use crate::Result;

/// Destination for log records.
///
/// Implementations may format, ship, or buffer records as they see fit,
/// but must not fail for well-formed input. Records are handed over by
/// value and are not retained by the core.
pub trait LogSink: Send + Sync {
    /// Consume one record.
    fn log(&self, record: LogRecord);
}

/// Default sink: emits each record as JSON through `tracing` at debug
/// level, with the logger namespace as a field.
///
/// Enable output the usual way, e.g. `RUST_LOG=session_log=debug`.
#[derive(Debug, Clone)]
pub struct TracingSink {
    namespace: String,
}

impl TracingSink {
    /// Create a sink labelled with `namespace`.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }
}

impl LogSink for TracingSink {
    fn log(&self, record: LogRecord) {
        match serde_json::to_string(&record) {
            Ok(json) => tracing::debug!(namespace = %self.namespace, record = %json),
            Err(_) => tracing::debug!(namespace = %self.namespace, record = ?record),
        }
    }
}

static GLOBAL_SINK: OnceLock<Arc<dyn LogSink>> = OnceLock::new();

/// Register the process-wide default sink.
///
/// Loggers constructed afterwards without an explicit sink use this one.
/// May be called once, at startup; later registrations fail with
/// [`SessionLogError::GlobalSinkAlreadySet`].
pub fn set_global_sink(sink: Arc<dyn LogSink>) -> Result<()> {
    GLOBAL_SINK
        .set(sink)
        .map_err(|_| SessionLogError::GlobalSinkAlreadySet)
}

/// The registered process-wide default sink, if any.
pub fn global_sink() -> Option<Arc<dyn LogSink>> {
    GLOBAL_SINK.get().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::LogMessage;

    struct NullSink;

    impl LogSink for NullSink {
        fn log(&self, _record: LogRecord) {}
    }

    fn record() -> LogRecord {
        LogRecord {
            message: LogMessage::Text("x".into()),
            session: "undefined".into(),
            sub_sessions: None,
        }
    }

    #[test]
    fn test_tracing_sink_accepts_records() {
        let sink = TracingSink::new("sink_test_ns");
        // must not panic, subscriber installed or not
        sink.log(record());
    }

    #[test]
    fn test_global_sink_registration_is_set_once() {
        assert!(global_sink().is_none());
        set_global_sink(Arc::new(NullSink)).unwrap();
        assert!(global_sink().is_some());

        let second = set_global_sink(Arc::new(NullSink));
        assert!(matches!(
            second,
            Err(SessionLogError::GlobalSinkAlreadySet)
        ));
    }
}
