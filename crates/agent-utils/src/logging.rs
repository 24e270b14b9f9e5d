//! Logging and tracing utilities

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Subscriber options
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Emit JSON lines instead of human readable output
    pub json: bool,
    /// Log span close events, including their busy/idle timings
    pub span_timings: bool,
    /// Filter used when `RUST_LOG` is unset
    pub default_filter: Option<String>,
}

impl LogConfig {
    /// Settings used when a demo runs with tracing enabled
    pub fn traced() -> Self {
        Self {
            json: false,
            span_timings: true,
            default_filter: Some("info,agent_workflow=debug".to_string()),
        }
    }
}

/// Initialize tracing subscriber
///
/// Safe to call more than once; later calls leave the first subscriber in
/// place.
pub fn init_tracing_with(config: &LogConfig) {
    let default_filter = config.default_filter.as_deref().unwrap_or("info");
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let span_events = if config.span_timings {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_span_events(span_events),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_span_events(span_events))
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already initialized");
    }
}
