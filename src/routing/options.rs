//! Built-in OPTIONS answers.
//!
//! `OPTIONS *` describes the whole route table; `OPTIONS <resource>`
//! summarizes the routes whose resource matches. Neither invokes a handler.

use axum::http::{Method, StatusCode};

use crate::http::{Body, RequestDescriptor, ResponseDescriptor};
use crate::negotiation::Dimension;
use crate::routing::matcher::Matcher;
use crate::routing::route::{MethodFilter, Route, RouteDescription, KNOWN_METHODS};

const DOCUMENT_TYPES: [&str; 2] = ["application/json", "text/plain"];

/// OPTIONS answer for `request`, or `None` when no route covers its resource.
pub fn respond(routes: &[Route], request: &RequestDescriptor) -> Option<ResponseDescriptor> {
    if request.method != Method::OPTIONS {
        return None;
    }
    if request.resource == "*" {
        return Some(describe_server(routes, request));
    }

    let matching: Vec<&Route> = routes
        .iter()
        .filter(|route| route.resource().matches(request))
        .collect();
    if matching.is_empty() {
        return None;
    }
    Some(describe_resource(&matching))
}

fn describe_server(routes: &[Route], request: &RequestDescriptor) -> ResponseDescriptor {
    let descriptions: Vec<RouteDescription> = routes.iter().map(Route::describe).collect();
    let available: Vec<String> = DOCUMENT_TYPES.iter().map(|t| t.to_string()).collect();
    let media_type = Dimension::MediaType
        .negotiate(request.headers.get("accept"), &available)
        .unwrap_or_else(|| available[0].clone());

    let body = if media_type == "text/plain" {
        let lines: Vec<String> = descriptions
            .iter()
            .map(|d| match &d.description {
                Some(text) => format!("{} {} - {}", d.method, d.resource, text),
                None => format!("{} {}", d.method, d.resource),
            })
            .collect();
        Body::Text(lines.join("\n"))
    } else {
        Body::Json(serde_json::json!({ "routes": descriptions }))
    };

    ResponseDescriptor::ok()
        .with_header("content-type", body.content_type())
        .with_header("allow", allowed_methods(routes.iter()).join(", "))
        .with_body(body)
}

fn describe_resource(routes: &[&Route]) -> ResponseDescriptor {
    let mut response = ResponseDescriptor::new(StatusCode::NO_CONTENT)
        .with_header("allow", allowed_methods(routes.iter().copied()).join(", "));

    for (method, header) in [
        (Method::POST, "accept-post"),
        (Method::PATCH, "accept-patch"),
        (Method::PUT, "accept"),
    ] {
        let accepted = union(
            routes
                .iter()
                .filter(|route| route.method().allows(&method))
                .flat_map(|route| route.accepted_media_types()),
        );
        if !accepted.is_empty() {
            response.headers.insert(header, accepted.join(", "));
        }
    }

    let produced = union(routes.iter().flat_map(|route| route.available(Dimension::MediaType)));
    if !produced.is_empty() {
        response
            .headers
            .insert(Dimension::MediaType.available_header(), produced.join(", "));
    }
    response
}

/// Declared methods in registration order, plus OPTIONS. A `*` method stands
/// for every known method.
fn allowed_methods<'a>(routes: impl Iterator<Item = &'a Route>) -> Vec<String> {
    let mut methods: Vec<String> = Vec::new();
    let mut add = |m: &Method| {
        if !methods.iter().any(|existing| existing == m.as_str()) {
            methods.push(m.as_str().to_string());
        }
    };
    for route in routes {
        match route.method() {
            MethodFilter::Only(method) => add(method),
            MethodFilter::Any => KNOWN_METHODS.iter().for_each(&mut add),
        }
    }
    add(&Method::OPTIONS);
    methods
}

fn union<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !out.contains(value) {
            out.push(value.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::route::{HandlerResult, RouteContext, RouteSpec};

    async fn decline(_: RequestDescriptor, _: RouteContext) -> HandlerResult {
        Ok(None)
    }

    fn routes() -> Vec<Route> {
        vec![
            Route::build(
                RouteSpec::new("GET /items", decline).available_media_types(["application/json", "text/html"]),
            )
            .unwrap(),
            Route::build(
                RouteSpec::new("POST /items", decline)
                    .accepted_media_types(["application/json"])
                    .description("Create an item"),
            )
            .unwrap(),
            Route::build(RouteSpec::new("GET /other", decline)).unwrap(),
        ]
    }

    #[test]
    fn test_resource_summary() {
        let request = RequestDescriptor::new(Method::OPTIONS, "/items");
        let response = respond(&routes(), &request).unwrap();
        assert_eq!(response.status, StatusCode::NO_CONTENT);
        assert_eq!(response.headers.get("allow"), Some("GET, POST, OPTIONS"));
        assert_eq!(response.headers.get("accept-post"), Some("application/json"));
        assert_eq!(response.headers.get("accept-patch"), None);
        assert_eq!(
            response.headers.get("available-media-types"),
            Some("application/json, text/html")
        );
        assert!(respond(&routes(), &RequestDescriptor::new(Method::OPTIONS, "/none")).is_none());
    }

    #[test]
    fn test_server_document() {
        let request = RequestDescriptor::new(Method::OPTIONS, "*");
        let response = respond(&routes(), &request).unwrap();
        assert_eq!(response.status, StatusCode::OK);
        let Some(Body::Json(document)) = response.body else {
            panic!("expected a JSON document");
        };
        assert_eq!(document["routes"].as_array().unwrap().len(), 3);
        assert_eq!(document["routes"][1]["acceptedMediaTypes"][0], "application/json");

        let request = RequestDescriptor::new(Method::OPTIONS, "*").header("accept", "text/plain");
        let response = respond(&routes(), &request).unwrap();
        assert_eq!(
            response.body,
            Some(Body::Text(
                "GET /items\nPOST /items - Create an item\nGET /other".into()
            ))
        );
    }
}
