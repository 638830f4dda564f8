//! Error types.

use thiserror::Error;

/// Main error type for session-log operations.
///
/// Deliberately narrow: a missing ambient session is never an error
/// (lookups degrade to defaults), and sink failures propagate to the
/// caller unrecovered.
#[derive(Error, Debug)]
pub enum SessionLogError {
    /// The process-wide default sink was already registered.
    #[error("global log sink already registered")]
    GlobalSinkAlreadySet,

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,
}

/// Convenience Result type for session-log operations.
pub type Result<T> = std::result::Result<T, SessionLogError>;
