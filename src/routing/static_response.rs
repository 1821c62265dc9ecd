//! Handler serving a fixed response declared in configuration.

use axum::http::StatusCode;
use futures_util::future::BoxFuture;

use crate::config::ResponseConfig;
use crate::http::{Body, Headers, RequestDescriptor, ResponseDescriptor};
use crate::pattern::{Pattern, PatternError};
use crate::routing::error::{HandlerError, RouteError};
use crate::routing::route::{Handler, HandlerResult, RouteContext};

/// Fixed response, optionally rendering its body from the route's captures.
#[derive(Debug, Clone)]
pub struct StaticResponse {
    status: StatusCode,
    body: Option<String>,
    /// `:name` and `*` in the template are filled from the route captures.
    template: Option<Pattern>,
    content_type: Option<String>,
    headers: Headers,
}

impl StaticResponse {
    pub fn from_config(config: &ResponseConfig) -> Result<Self, RouteError> {
        let status =
            StatusCode::from_u16(config.status).map_err(|_| RouteError::InvalidStatus(config.status))?;
        Ok(Self {
            status,
            body: config.body.clone(),
            template: config.template.as_deref().map(Pattern::new),
            content_type: config.content_type.clone(),
            headers: config.headers.iter().collect(),
        })
    }

    pub fn render(&self, context: &RouteContext) -> Result<ResponseDescriptor, PatternError> {
        let mut response = ResponseDescriptor::new(self.status);
        response.headers = self.headers.clone();

        let text = match &self.template {
            Some(template) => Some(template.fill(&context.params)?),
            None => self.body.clone(),
        };
        if let Some(text) = text {
            let content_type = self
                .content_type
                .as_deref()
                .or(context.negotiated.media_type.as_deref())
                .unwrap_or("text/plain; charset=utf-8");
            if !response.headers.contains("content-type") {
                response.headers.insert("content-type", content_type);
            }
            response.body = Some(Body::Text(text));
        }

        if let Some(language) = &context.negotiated.language {
            if !response.headers.contains("content-language") {
                response.headers.insert("content-language", language.clone());
            }
        }
        Ok(response)
    }
}

impl Handler for StaticResponse {
    fn call(&self, _request: RequestDescriptor, context: RouteContext) -> BoxFuture<'static, HandlerResult> {
        let rendered = self.render(&context);
        let result: HandlerResult = rendered.map(Some).map_err(|e| Box::new(e) as HandlerError);
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Captures;
    use std::collections::BTreeMap;

    fn config(status: u16) -> ResponseConfig {
        ResponseConfig {
            status,
            body: Some("fixed".into()),
            template: None,
            content_type: None,
            headers: BTreeMap::from([("Cache-Control".to_string(), "no-store".to_string())]),
        }
    }

    #[test]
    fn test_fixed_body() {
        let handler = StaticResponse::from_config(&config(201)).unwrap();
        let response = handler.render(&RouteContext::default()).unwrap();
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.body, Some(Body::Text("fixed".into())));
        assert_eq!(response.headers.get("cache-control"), Some("no-store"));
        assert_eq!(response.headers.get("content-type"), Some("text/plain; charset=utf-8"));
    }

    #[test]
    fn test_template_uses_captures_and_negotiation() {
        let mut cfg = config(200);
        cfg.template = Some("Article :slug".into());
        let handler = StaticResponse::from_config(&cfg).unwrap();

        let mut context = RouteContext {
            params: Captures::new().with_named("slug", "intro"),
            ..RouteContext::default()
        };
        context.negotiated.media_type = Some("text/html".into());
        context.negotiated.language = Some("fr".into());

        let response = handler.render(&context).unwrap();
        assert_eq!(response.body, Some(Body::Text("Article intro".into())));
        assert_eq!(response.headers.get("content-type"), Some("text/html"));
        assert_eq!(response.headers.get("content-language"), Some("fr"));

        assert!(handler.render(&RouteContext::default()).is_err());
    }

    #[test]
    fn test_invalid_status() {
        assert_eq!(
            StaticResponse::from_config(&config(42)).unwrap_err(),
            RouteError::InvalidStatus(42)
        );
    }
}
