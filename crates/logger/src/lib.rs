//! Operational log channel for `module-planner`.
//!
//! - `warn!` and `error!` are always active.
//! - `log-info` enables `info!` output.
//! - `log-debug` enables `debug!` output behind a runtime flag.
//! - `verbose` enables `verbose!`, a tagless printer for user-facing progress.
//! - `file-logging` redirects tagged records to an append-only file.
//!
//! Records emitted while a [`capture`] closure runs on the current thread are
//! collected instead of printed, so callers can assert on diagnostics.

use std::cell::RefCell;
use std::fmt::{self, Arguments};
use std::str::FromStr;
#[cfg(feature = "log-debug")]
use std::sync::atomic::AtomicBool;
use std::sync::atomic::{AtomicU8, Ordering};

#[cfg(feature = "file-logging")]
use std::{
    fs::{File, OpenOptions},
    io::Write,
    sync::{LazyLock, Mutex},
};

/// Logging levels, most severe first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Failures that degraded what the user sees.
    Error = 1,
    /// Recoverable oddities.
    Warn = 2,
    /// Lifecycle events (requires `log-info`).
    Info = 3,
    /// Developer detail (requires `log-debug` and the runtime flag).
    Debug = 4,
}

impl Level {
    /// Bracketed tag written in front of each record.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Error => "[ERROR]",
            Self::Warn => "[WARN]",
            Self::Info => "[INFO]",
            Self::Debug => "[DEBUG]",
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Error,
            2 => Self::Warn,
            3 => Self::Info,
            _ => Self::Debug,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        };
        f.write_str(name)
    }
}

/// Error returned when a level name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError(String);

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown log level '{}'", self.0)
    }
}

impl std::error::Error for ParseLevelError {}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" | "err" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

const fn default_level() -> u8 {
    if cfg!(feature = "log-debug") {
        Level::Debug as u8
    } else if cfg!(feature = "log-info") {
        Level::Info as u8
    } else {
        Level::Warn as u8
    }
}

static LOG_LEVEL: AtomicU8 = AtomicU8::new(default_level());
#[cfg(feature = "log-debug")]
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(true);
#[cfg(feature = "verbose")]
static VERBOSE_ENABLED: AtomicBool = AtomicBool::new(false);
#[cfg(feature = "file-logging")]
static LOG_FILE: LazyLock<Mutex<Option<File>>> = LazyLock::new(|| Mutex::new(None));

thread_local! {
    static CAPTURED: RefCell<Option<Vec<(Level, String)>>> = const { RefCell::new(None) };
}

/// Set the global log level.
pub fn set_level(level: Level) {
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Current global log level.
#[must_use]
pub fn level() -> Level {
    Level::from_u8(LOG_LEVEL.load(Ordering::SeqCst))
}

/// Parse a level name (case-insensitive) and apply it. Returns `true` on success.
#[must_use]
pub fn set_level_from_str(level: &str) -> bool {
    level.parse::<Level>().map(set_level).is_ok()
}

#[cfg(feature = "log-debug")]
/// Enable debug logging at runtime.
pub fn enable_debug() {
    DEBUG_ENABLED.store(true, Ordering::SeqCst);
}
#[cfg(not(feature = "log-debug"))]
/// Enable debug logging at runtime (no-op without `log-debug`).
pub const fn enable_debug() {}

#[cfg(feature = "log-debug")]
/// Disable debug logging at runtime.
pub fn disable_debug() {
    DEBUG_ENABLED.store(false, Ordering::SeqCst);
}
#[cfg(not(feature = "log-debug"))]
/// Disable debug logging at runtime (no-op without `log-debug`).
pub const fn disable_debug() {}

#[cfg(feature = "log-debug")]
/// Whether debug logging is enabled.
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::SeqCst)
}
#[cfg(not(feature = "log-debug"))]
/// Whether debug logging is enabled (always false without `log-debug`).
pub const fn is_debug_enabled() -> bool {
    false
}

#[cfg(feature = "verbose")]
/// Enable verbose output at runtime.
pub fn enable_verbose() {
    VERBOSE_ENABLED.store(true, Ordering::SeqCst);
}
#[cfg(not(feature = "verbose"))]
/// Enable verbose output at runtime (no-op without `verbose`).
pub const fn enable_verbose() {}

#[cfg(feature = "verbose")]
/// Whether verbose output is enabled.
pub fn is_verbose_enabled() -> bool {
    VERBOSE_ENABLED.load(Ordering::SeqCst)
}
#[cfg(not(feature = "verbose"))]
/// Whether verbose output is enabled (always false without `verbose`).
pub const fn is_verbose_enabled() -> bool {
    false
}

#[cfg(feature = "file-logging")]
#[must_use]
/// Send tagged records to `path` (append mode). Returns `true` on success.
pub fn init_file_logging(path: &std::path::Path) -> bool {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .is_ok_and(|file| {
            LOG_FILE.lock().is_ok_and(|mut slot| {
                *slot = Some(file);
                true
            })
        })
}

#[cfg(not(feature = "file-logging"))]
#[must_use]
/// File logging is unavailable without `file-logging`; always returns `false`.
pub const fn init_file_logging(_path: &std::path::Path) -> bool {
    false
}

/// Run `f` while collecting every record emitted on this thread.
///
/// Captured records bypass stdout/stderr and the log file. Level gating still
/// applies. Nested calls keep only the innermost capture.
pub fn capture<R>(f: impl FnOnce() -> R) -> (R, Vec<(Level, String)>) {
    let previous = CAPTURED.with(|slot| slot.borrow_mut().replace(Vec::new()));
    let out = f();
    let records = CAPTURED.with(|slot| {
        let mut slot = slot.borrow_mut();
        let records = slot.take().unwrap_or_default();
        *slot = previous;
        records
    });
    (out, records)
}

fn try_capture(level: Level, msg: &str) -> bool {
    CAPTURED.with(|slot| {
        slot.borrow_mut().as_mut().is_some_and(|records| {
            records.push((level, msg.to_string()));
            true
        })
    })
}

#[cfg(feature = "file-logging")]
fn try_write_file(line: &str) -> bool {
    LOG_FILE.lock().is_ok_and(|mut slot| {
        slot.as_mut().is_some_and(|file| {
            let _ = writeln!(file, "{line}");
            let _ = file.flush();
            true
        })
    })
}

#[cfg(not(feature = "file-logging"))]
const fn try_write_file(_line: &str) -> bool {
    false
}

fn should_log(level: Level) -> bool {
    match level {
        Level::Info if !cfg!(feature = "log-info") => return false,
        Level::Debug if !cfg!(feature = "log-debug") || !is_debug_enabled() => return false,
        _ => {}
    }
    level as u8 <= LOG_LEVEL.load(Ordering::SeqCst)
}

/// Dispatcher behind the logging macros.
pub fn log_impl(level: Level, args: Arguments) {
    if !should_log(level) {
        return;
    }
    let msg = args.to_string();
    if try_capture(level, &msg) {
        return;
    }
    let line = format!("{} {msg}", level.tag());
    if try_write_file(&line) {
        return;
    }
    match level {
        Level::Error | Level::Warn => eprintln!("{line}"),
        Level::Info | Level::Debug => println!("{line}"),
    }
}

/// Logs an error-level message (always enabled).
#[macro_export]
macro_rules! error { ($($arg:tt)*) => { $crate::log_impl($crate::Level::Error, format_args!($($arg)*)) }; }
/// Logs a warning-level message (always enabled).
#[macro_export]
macro_rules! warn { ($($arg:tt)*) => { $crate::log_impl($crate::Level::Warn, format_args!($($arg)*)) }; }
/// Logs an info-level message (requires `log-info`).
#[macro_export]
macro_rules! info { ($($arg:tt)*) => { $crate::log_impl($crate::Level::Info, format_args!($($arg)*)) }; }
/// Logs a debug-level message (requires `log-debug` and the runtime flag).
#[macro_export]
macro_rules! debug { ($($arg:tt)*) => { $crate::log_impl($crate::Level::Debug, format_args!($($arg)*)) }; }
/// Prints an untagged message when verbose output is on. Never written to the log file.
#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {
        #[cfg(feature = "verbose")]
        {
            if $crate::is_verbose_enabled() { println!($($arg)*); }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_round_trip() {
        for level in [Level::Error, Level::Warn, Level::Info, Level::Debug] {
            assert_eq!(level.to_string().parse::<Level>(), Ok(level));
        }
        assert_eq!("WARNING".parse::<Level>(), Ok(Level::Warn));
        assert!("loud".parse::<Level>().is_err());
    }

    #[test]
    fn capture_collects_errors_without_printing() {
        let ((), records) = capture(|| {
            error!("request failed: {}", 503);
        });
        assert_eq!(records, vec![(Level::Error, "request failed: 503".to_string())]);
    }

    #[test]
    fn capture_restores_outer_buffer() {
        let (inner, outer) = capture(|| {
            warn!("outer");
            let ((), inner) = capture(|| warn!("inner"));
            inner
        });
        assert_eq!(inner.len(), 1);
        assert_eq!(outer, vec![(Level::Warn, "outer".to_string())]);
    }
}
