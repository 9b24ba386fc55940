//! Logging for DevEvent
//!
//! Structured logging through the tracing crate. Production writes one JSON
//! object per line; every other environment gets the human-readable format.

use std::time::{Duration, Instant};

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

use crate::config::ServerConfig;
use crate::error::{Error, Result};

/// Output format of the log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn for_environment(environment: &str) -> Self {
        if environment.eq_ignore_ascii_case("production") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the crate logs at the configured
/// level, request traces at debug, and sqlx only warnings.
pub fn init_tracing(server: &ServerConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&server.log_level)));
    let format = LogFormat::for_environment(&server.environment);

    let json = (format == LogFormat::Json).then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_span_events(FmtSpan::CLOSE)
    });
    let pretty = (format == LogFormat::Pretty).then(|| {
        fmt::layer()
            .pretty()
            .with_file(true)
            .with_line_number(true)
            .with_span_events(FmtSpan::CLOSE)
    });

    Registry::default()
        .with(filter)
        .with(json)
        .with(pretty)
        .try_init()
        .map_err(|e| Error::internal(format!("Failed to initialize tracing: {}", e)))?;

    tracing::info!(
        environment = %server.environment,
        log_level = %server.log_level,
        format = ?format,
        "Logging initialized"
    );

    Ok(())
}

fn default_directives(log_level: &str) -> String {
    format!("devevent={},tower_http=debug,sqlx=warn", log_level)
}

/// Span wrapping a single query against `table`
#[macro_export]
macro_rules! db_span {
    ($operation:expr, $table:expr) => {
        tracing::info_span!(
            "db_query",
            operation = $operation,
            table = $table,
            rows = tracing::field::Empty,
        )
    };
}

/// Log an error together with its debug form and optional display fields
#[macro_export]
macro_rules! log_error {
    ($error:expr, $msg:expr $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::error!(
            error = %$error,
            error_type = ?$error,
            $($key = tracing::field::display(&$value),)*
            $msg
        )
    };
}

/// Measures how long one named step takes
pub struct Timer {
    label: &'static str,
    started: Instant,
}

impl Timer {
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            started: Instant::now(),
        }
    }

    /// Elapsed time, also logged at debug
    pub fn finish(self) -> Duration {
        let elapsed = self.started.elapsed();
        tracing::debug!(step = self.label, elapsed_ms = elapsed.as_millis() as u64, "Step finished");
        elapsed
    }
}
