//! # session-log
//!
//! Context-propagating session logger for asynchronous call chains.
//!
//! This crate groups log statements emitted anywhere in an asynchronous
//! call chain under a shared session id, and nests sub-sessions within an
//! outer session, without threading identifiers through function
//! signatures.
//!
//! ## How it works
//!
//! The ambient session id rides tokio task-local storage, which the
//! runtime re-installs at every poll of a session's future, so the id
//! survives awaits, timers, and any suspension point inside the session.
//! Callbacks that fire from a foreign call stack (an external notifier, a
//! spawned task, an event emitter) lose the ambient context unless they
//! are re-attached with [`SessionLogger::bind`],
//! [`SessionLogger::bind_future`], or [`SessionLogger::bind_emitter`].
//!
//! ## Quick start
//!
//! ```
//! use session_log::SessionLogger;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     session_log::logging::try_init().ok();
//!
//!     let logger = SessionLogger::new("my_namespace");
//!
//!     logger
//!         .session_with_id(
//!             async {
//!                 // carries session "my session id"
//!                 logger.log_fmt("%d: %s", &[4.into(), "a log message".into()]);
//!
//!                 logger
//!                     .session_with_id(
//!                         async {
//!                             // additionally carries subSessions ["my sub-session id"]
//!                             logger.log("a sub log message");
//!                         },
//!                         "my sub-session id",
//!                     )
//!                     .await;
//!             },
//!             "my session id",
//!         )
//!         .await;
//! }
//! ```

pub mod context;
pub mod error;
pub mod events;
pub mod format;
pub mod logger;
pub mod logging;
pub mod record;
pub mod sink;

// Re-export commonly used types
pub use context::{create_namespace, get_namespace, Namespace, Scope, ScopeBindable};
pub use error::{Result, SessionLogError};
pub use events::EventEmitter;
pub use logger::SessionLogger;
pub use record::{LogMessage, LogRecord};
pub use sink::{global_sink, set_global_sink, LogSink, TracingSink};
