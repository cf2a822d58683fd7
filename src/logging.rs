//! Server-side log level gating (C9, spec.md §4.9): `logging/setLevel`
//! and the resulting filter over `notifications/message`.

use parking_lot::RwLock;

use crate::types::protocol::LogLevel;

/// Install a `tracing` subscriber reading its filter from `RUST_LOG`
/// (falling back to `default_filter` if unset), for binaries embedding
/// this runtime that don't already have their own subscriber set up.
///
/// Only available with the `logging` feature; this crate's own code
/// never initializes a global subscriber itself.
#[cfg(feature = "logging")]
pub fn init_tracing(default_filter: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Tracks the minimum [`LogLevel`] a session wants forwarded via
/// `notifications/message`, defaulting to [`LogLevel::Info`] until the
/// session calls `logging/setLevel`.
pub struct LogGate {
    threshold: RwLock<LogLevel>,
}

impl Default for LogGate {
    fn default() -> Self {
        Self::new()
    }
}

impl LogGate {
    /// A gate defaulting to [`LogLevel::Info`].
    pub fn new() -> Self {
        Self {
            threshold: RwLock::new(LogLevel::Info),
        }
    }

    /// Update the minimum level to forward.
    pub fn set_level(&self, level: LogLevel) {
        *self.threshold.write() = level;
    }

    /// The current minimum level.
    pub fn level(&self) -> LogLevel {
        *self.threshold.read()
    }

    /// `true` if a message at `level` should be forwarded to the peer —
    /// `false` suppresses it entirely, including when the threshold is
    /// [`LogLevel::Off`], which forwards nothing.
    pub fn should_forward(&self, level: LogLevel) -> bool {
        let threshold = self.level();
        threshold != LogLevel::Off && level >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_info_threshold() {
        let gate = LogGate::new();
        assert!(!gate.should_forward(LogLevel::Debug));
        assert!(gate.should_forward(LogLevel::Info));
        assert!(gate.should_forward(LogLevel::Error));
    }

    #[test]
    fn set_level_changes_threshold() {
        let gate = LogGate::new();
        gate.set_level(LogLevel::Warning);
        assert!(!gate.should_forward(LogLevel::Notice));
        assert!(gate.should_forward(LogLevel::Warning));
    }

    #[test]
    fn off_suppresses_everything_including_emergency() {
        let gate = LogGate::new();
        gate.set_level(LogLevel::Off);
        assert!(!gate.should_forward(LogLevel::Emergency));
    }
}
