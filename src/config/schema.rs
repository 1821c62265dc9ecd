//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, timeout).
    pub listener: ListenerConfig,

    /// Router behaviour.
    pub routing: RoutingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route table, in match order.
    pub routes: Vec<RouteConfig>,

    /// Resource rewrites applied before dispatch.
    pub aliases: Vec<AliasConfig>,

    /// Headers added to every response whose resource matches a pattern.
    pub response_headers: Vec<ResponseHeadersConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Whole-request timeout.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Answer `OPTIONS` requests no route handled.
    pub options_fallback: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            options_fallback: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// One route serving a static response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// `"METHOD /resource"` or `"*"`.
    pub endpoint: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Header name → value pattern.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    #[serde(default)]
    pub available_media_types: Vec<String>,

    #[serde(default)]
    pub available_languages: Vec<String>,

    #[serde(default)]
    pub available_versions: Vec<String>,

    #[serde(default)]
    pub available_encodings: Vec<String>,

    /// Request body media types accepted for POST, PUT and PATCH.
    #[serde(default)]
    pub accepted_media_types: Vec<String>,

    /// Protocol the request must upgrade to (e.g., "websocket").
    #[serde(default)]
    pub upgrade: Option<String>,

    /// Try only after every ordinary route.
    #[serde(default)]
    pub fallback: bool,

    #[serde(default)]
    pub response: ResponseConfig,
}

/// The response a configured route serves.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResponseConfig {
    pub status: u16,

    /// Literal body.
    pub body: Option<String>,

    /// Body pattern rendered with the route's captures; wins over `body`.
    pub template: Option<String>,

    /// Defaults to the negotiated media type, then text/plain.
    pub content_type: Option<String>,

    pub headers: BTreeMap<String, String>,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            status: 200,
            body: None,
            template: None,
            content_type: None,
            headers: BTreeMap::new(),
        }
    }
}

/// Resource rewrite: requests matching `from` are dispatched as `to`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AliasConfig {
    pub from: String,
    pub to: String,
}

/// Headers for every response whose resource matches `pattern`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResponseHeadersConfig {
    pub pattern: String,
    pub headers: BTreeMap<String, String>,
}
