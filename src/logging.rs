//! Tracing setup for the CLI
//!
//! Logs go to stderr so stdout only ever carries CSV. `RUST_LOG` wins over
//! the `--log-level` flag when it is set.

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Default verbosity when `RUST_LOG` is not set
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Build the filter: `RUST_LOG` if set and valid, otherwise `level` for this crate
pub fn env_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fare_accounts={}", level.as_str())))
}

/// Install the global subscriber; call once from `main`
pub fn init(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
