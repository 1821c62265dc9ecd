//! Response descriptor produced by handlers and by failure synthesis.

use axum::http::StatusCode;
use serde::Serialize;

use crate::http::headers::Headers;

/// Opaque response body. Serialization to the wire belongs to the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Text(String),
    Json(serde_json::Value),
    Bytes(Vec<u8>),
}

impl Body {
    /// Default `content-type` for the body variant.
    pub fn content_type(&self) -> &'static str {
        match self {
            Body::Text(_) => "text/plain; charset=utf-8",
            Body::Json(_) => "application/json",
            Body::Bytes(_) => "application/octet-stream",
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Body::Text(text) => text.into_bytes(),
            Body::Json(value) => value.to_string().into_bytes(),
            Body::Bytes(bytes) => bytes,
        }
    }
}

/// Outbound response as produced by the routing engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDescriptor {
    pub status: StatusCode,
    pub status_text: Option<String>,
    /// Human-readable explanation, used as the text body when `body` is unset.
    pub status_message: Option<String>,
    pub headers: Headers,
    pub body: Option<Body>,
}

impl ResponseDescriptor {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            status_text: None,
            status_message: None,
            headers: Headers::new(),
            body: None,
        }
    }

    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self::new(status).with_body(Body::Text(body.into()))
    }

    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(status).with_body(Body::Json(serde_json::to_value(value)?)))
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.status_message = Some(message.into());
        self
    }

    /// Status line reason: explicit `status_text`, else the canonical one.
    pub fn reason(&self) -> &str {
        self.status_text
            .as_deref()
            .or_else(|| self.status.canonical_reason())
            .unwrap_or("")
    }
}
