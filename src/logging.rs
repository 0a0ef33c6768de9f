//! Structured logging setup.
//!
//! Thin wrapper over `tracing-subscriber` with environment presets.
//! Applications embedding this crate can skip it entirely and install
//! their own subscriber; the library only emits `tracing` events.

use tracing::Level;
use tracing_subscriber::fmt::{self, format::FmtSpan};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Most detailed tracing, including per-request admission waits.
    Trace,
    /// Request lifecycle events (dispatch, retries, completion).
    Debug,
    /// Notable events only.
    Info,
    /// Potential issues (validation warnings, failed requests).
    Warn,
    /// Errors only.
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(name)
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    Pretty,
    /// Single-line output.
    Compact,
    /// JSON, one event per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum level, overridable via `RUST_LOG`.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
    /// Include thread IDs.
    pub show_thread_ids: bool,
    /// Include the emitting module path.
    pub show_target: bool,
    /// Emit span enter/close events.
    pub show_span_events: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            show_thread_ids: false,
            show_target: true,
            show_span_events: false,
        }
    }
}

impl LogConfig {
    /// Preset for local development: debug level, pretty output, span
    /// events on.
    pub fn development() -> Self {
        Self {
            level: LogLevel::Debug,
            format: LogFormat::Pretty,
            show_span_events: true,
            ..Self::default()
        }
    }

    /// Preset for production: info level, JSON output, thread IDs on.
    pub fn production() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Json,
            show_thread_ids: true,
            ..Self::default()
        }
    }

    /// Preset for tests: warnings only, compact output.
    pub fn test() -> Self {
        Self {
            level: LogLevel::Warn,
            format: LogFormat::Compact,
            show_target: false,
            ..Self::default()
        }
    }
}

fn build_layer(config: &LogConfig) -> Box<dyn Layer<Registry> + Send + Sync> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("reqflow={}", config.level)));

    let span_events = if config.show_span_events {
        FmtSpan::ENTER | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };
    let base = fmt::layer()
        .with_thread_ids(config.show_thread_ids)
        .with_target(config.show_target)
        .with_span_events(span_events);

    match config.format {
        LogFormat::Pretty => base.pretty().with_filter(env_filter).boxed(),
        LogFormat::Compact => base.compact().with_filter(env_filter).boxed(),
        LogFormat::Json => base.json().with_filter(env_filter).boxed(),
    }
}

/// Installs the global subscriber.
///
/// # Panics
///
/// Panics if a global subscriber is already set; use
/// [`try_init_logging`] where that can happen.
///
/// # Examples
///
/// ```no_run
/// use reqflow::logging::{init_logging, LogConfig};
///
/// init_logging(&LogConfig::development());
/// ```
pub fn init_logging(config: &LogConfig) {
    tracing_subscriber::registry().with(build_layer(config)).init();
}

/// Installs the global subscriber, ignoring a previously installed one.
/// Suitable for tests where multiple entry points race to initialize.
pub fn try_init_logging(config: &LogConfig) {
    let _ = tracing_subscriber::registry().with(build_layer(config)).try_init();
}
