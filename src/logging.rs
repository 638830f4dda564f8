//! Tracing subscriber initialization.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("session_log=debug"))
}

/// Initialize the tracing subscriber.
///
/// Filtering follows `RUST_LOG`; with nothing set, `session_log=debug`
/// keeps the default sink's records visible.
///
/// # Panics
///
/// Panics if a subscriber has already been installed.
pub fn init() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().compact())
        .init();
}

/// Like [`init`], but returns an error instead of panicking when a
/// subscriber is already installed.
pub fn try_init() -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().compact())
        .try_init()
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_try_init_tolerates_repeat_calls() {
        let _ = super::try_init();
        let _ = super::try_init();
    }
}
