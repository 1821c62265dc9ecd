//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber from `[observability]`
//! - Let `RUST_LOG` override the configured level
//!
//! # Design Decisions
//! - JSON format for production, pretty format for development

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::ObservabilityConfig;

/// Install the global subscriber. Calling it twice is an error from
/// `try_init`, which is reported and otherwise ignored.
pub fn init(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive(&config.log_level)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let format = if config.json_logs {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    if let Err(e) = tracing_subscriber::registry().with(format).with(filter).try_init() {
        eprintln!("tracing subscriber already installed: {e}");
    }
}

/// A bare level applies to this crate and the HTTP layers; anything else is
/// taken as a full filter directive.
fn directive(level: &str) -> String {
    match level {
        "trace" | "debug" | "info" | "warn" | "error" => {
            format!("resource_router={level},tower_http={level},info")
        }
        other => other.to_string(),
    }
}
