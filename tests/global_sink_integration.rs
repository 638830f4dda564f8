//! Process-wide default sink integration tests.
//!
//! Kept in their own binary: the global sink is set-once per process.

use std::sync::{Arc, Mutex};

use session_log::{set_global_sink, LogRecord, LogSink, SessionLogError, SessionLogger};

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

#[test]
fn test_global_sink_backs_default_loggers_and_is_set_once() {
    let sink = Arc::new(CollectingSink::default());
    set_global_sink(sink.clone()).unwrap();

    let logger = SessionLogger::new("global_sink_ns");
    logger.log("routed through the global sink");

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].session, "undefined");

    let second = set_global_sink(Arc::new(CollectingSink::default()));
    assert!(matches!(second, Err(SessionLogError::GlobalSinkAlreadySet)));
}
