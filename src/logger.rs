//! Injectable Logging Sink
//!
//! The cache never writes to a process-wide logger on its own. Instead it
//! reports through an `Arc<dyn Logger>` supplied in its configuration, which
//! defaults to [`NoopLogger`]. Events are leveled and carry a short message
//! plus `key = value` fields.
//!
//! With the `tracing` feature, [`TracingLogger`] forwards every event to the
//! `tracing` macros under the `arc_cache` target.
//!
//! # Example
//!
//! ```
//! use arc_cache::logger::{Field, Level, Logger};
//! use core::sync::atomic::{AtomicUsize, Ordering};
//!
//! #[derive(Default)]
//! struct CountingLogger(AtomicUsize);
//!
//! impl Logger for CountingLogger {
//!     fn log(&self, _level: Level, _message: &str, _fields: &[Field<'_>]) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//! }
//!
//! let logger = CountingLogger::default();
//! logger.warn("archive write failed", &[("list", &"B1")]);
//! assert_eq!(logger.0.load(Ordering::Relaxed), 1);
//! ```

use core::fmt;

/// Severity of a log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Per-operation detail such as `p` adaptation.
    Debug,
    /// Lifecycle events.
    Info,
    /// Recoverable failures, e.g. a ghost archive error.
    Warn,
    /// Failures the caller should look at.
    Error,
}

impl Level {
    /// Lowercase level name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured `name = value` pair attached to a log event.
pub type Field<'a> = (&'static str, &'a dyn fmt::Display);

/// Sink for cache log events.
///
/// Implementations must be cheap to call; the cache logs while holding its
/// lock in the concurrent variant.
pub trait Logger: Send + Sync {
    /// Records one event.
    fn log(&self, level: Level, message: &str, fields: &[Field<'_>]);

    /// Returns `false` to skip events at `level` entirely.
    fn enabled(&self, _level: Level) -> bool {
        true
    }

    /// Logs at [`Level::Debug`].
    fn debug(&self, message: &str, fields: &[Field<'_>]) {
        if self.enabled(Level::Debug) {
            self.log(Level::Debug, message, fields);
        }
    }

    /// Logs at [`Level::Info`].
    fn info(&self, message: &str, fields: &[Field<'_>]) {
        if self.enabled(Level::Info) {
            self.log(Level::Info, message, fields);
        }
    }

    /// Logs at [`Level::Warn`].
    fn warn(&self, message: &str, fields: &[Field<'_>]) {
        if self.enabled(Level::Warn) {
            self.log(Level::Warn, message, fields);
        }
    }

    /// Logs at [`Level::Error`].
    fn error(&self, message: &str, fields: &[Field<'_>]) {
        if self.enabled(Level::Error) {
            self.log(Level::Error, message, fields);
        }
    }
}

/// Discards every event. This is the default sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    #[inline]
    fn log(&self, _level: Level, _message: &str, _fields: &[Field<'_>]) {}

    #[inline]
    fn enabled(&self, _level: Level) -> bool {
        false
    }
}

/// Renders fields as `name=value` separated by spaces.
pub struct DisplayFields<'a, 'b>(pub &'a [Field<'b>]);

impl fmt::Display for DisplayFields<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for DisplayFields<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Forwards events to the `tracing` crate.
#[cfg(feature = "tracing")]
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

#[cfg(feature = "tracing")]
impl Logger for TracingLogger {
    fn log(&self, level: Level, message: &str, fields: &[Field<'_>]) {
        let fields = DisplayFields(fields);
        match level {
            Level::Debug => tracing::debug!(target: "arc_cache", fields = %fields, "{}", message),
            Level::Info => tracing::info!(target: "arc_cache", fields = %fields, "{}", message),
            Level::Warn => tracing::warn!(target: "arc_cache", fields = %fields, "{}", message),
            Level::Error => tracing::error!(target: "arc_cache", fields = %fields, "{}", message),
        }
    }

    fn enabled(&self, level: Level) -> bool {
        match level {
            Level::Debug => tracing::enabled!(target: "arc_cache", tracing::Level::DEBUG),
            Level::Info => tracing::enabled!(target: "arc_cache", tracing::Level::INFO),
            Level::Warn => tracing::enabled!(target: "arc_cache", tracing::Level::WARN),
            Level::Error => tracing::enabled!(target: "arc_cache", tracing::Level::ERROR),
        }
    }
}
