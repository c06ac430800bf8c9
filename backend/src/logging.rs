//! Logging setup and pipeline log helpers.
//!
//! The library only emits `tracing` events; the binary decides where they
//! go by calling [`init_logging`] once at startup. Output is plain text on
//! stderr so stdout stays free for command output (`get`, `parse`).
//!
//! Filtering follows `RUST_LOG` when set, e.g.:
//!
//! ```bash
//! RUST_LOG=strider=debug strider load --model author --collector json --source authors.json
//! ```

use std::fmt;
use std::str::FromStr;

use tracing::{error, info, warn};
use tracing_subscriber::{fmt as subscriber_fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use tracing_subscriber::util::TryInitError;

/// Level used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Log level of a pipeline message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    /// An `info` event tagged `status = "success"`.
    Success,
    Warning,
    Error,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "success" => Ok(Self::Success),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Install the global subscriber.
///
/// `verbose` lowers the default filter to `debug`; an explicit `RUST_LOG`
/// always wins. Fails if a subscriber is already installed.
pub fn init_logging(verbose: bool) -> Result<(), TryInitError> {
    let default = if verbose { "debug" } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let fmt_layer = subscriber_fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
}

/// Emit `message` at `level`.
pub fn log(level: LogLevel, message: impl AsRef<str>) {
    let message = message.as_ref();
    match level {
        LogLevel::Info => info!("{}", message),
        LogLevel::Success => info!(status = "success", "{}", message),
        LogLevel::Warning => warn!("{}", message),
        LogLevel::Error => error!("{}", message),
    }
}

pub fn log_info(message: impl AsRef<str>) {
    log(LogLevel::Info, message);
}

pub fn log_success(message: impl AsRef<str>) {
    log(LogLevel::Success, message);
}

pub fn log_warning(message: impl AsRef<str>) {
    log(LogLevel::Warning, message);
}

pub fn log_error(message: impl AsRef<str>) {
    log(LogLevel::Error, message);
}
