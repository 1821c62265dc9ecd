//! HTTP adapter tests: in-process via `oneshot` and over a real socket.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use resource_router::config::parse_config;
use resource_router::{HttpServer, Shutdown};
use tower::ServiceExt;

mod common;

const CONFIG: &str = r#"
[listener]
bind_address = "127.0.0.1:0"

[[routes]]
endpoint = "GET /articles/:slug"
available_media_types = ["text/html", "application/json"]
available_languages = ["en", "fr"]

[routes.response]
template = "Article :slug"

[[routes]]
endpoint = "POST /articles"
accepted_media_types = ["application/json"]

[routes.response]
status = 201
body = "created"

[[aliases]]
from = "/posts/:slug"
to = "/articles/:slug"

[[response_headers]]
pattern = "/articles/**"
headers = { Cache-Control = "max-age=60" }
"#;

fn server() -> HttpServer {
    let config = parse_config(CONFIG).unwrap();
    HttpServer::from_config(config, Arc::new(Shutdown::new())).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_template_route_with_negotiation() {
    let response = server()
        .app()
        .oneshot(
            Request::get("/articles/intro")
                .header("accept", "application/json")
                .header("accept-language", "fr")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["content-type"], "application/json");
    assert_eq!(headers["content-language"], "fr");
    assert_eq!(headers["vary"], "accept, accept-language");
    assert_eq!(headers["cache-control"], "max-age=60");
    assert_eq!(body_text(response).await, "Article intro");
}

#[tokio::test]
async fn test_alias_rewrites_before_dispatch() {
    let response = server()
        .app()
        .oneshot(Request::get("/posts/hello").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["cache-control"], "max-age=60");
    assert_eq!(body_text(response).await, "Article hello");
}

#[tokio::test]
async fn test_failures_become_responses() {
    let app = server().app();

    let response = app
        .clone()
        .oneshot(
            Request::post("/articles")
                .header("content-type", "text/plain")
                .body(Body::from("hi"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(response.headers()["accept-post"], "application/json");

    let response = app
        .clone()
        .oneshot(Request::delete("/articles/intro").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()["allow"], "GET");

    let response = app
        .oneshot(Request::get("/missing").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()["content-type"], "text/plain; charset=utf-8");
    assert!(body_text(response).await.contains("/missing"));
}

#[tokio::test]
async fn test_options_over_socket_and_graceful_shutdown() {
    let config = parse_config(CONFIG).unwrap();
    let (addr, shutdown, handle) = common::spawn_server(config).await;

    let client = reqwest::Client::new();
    let response = client
        .request(reqwest::Method::OPTIONS, format!("http://{addr}/articles/intro"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);
    assert_eq!(response.headers()["allow"], "GET, OPTIONS");
    assert_eq!(
        response.headers()["available-media-types"],
        "text/html, application/json"
    );

    let response = client
        .post(format!("http://{addr}/articles"))
        .header("content-type", "application/json")
        .body("{}")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    assert_eq!(response.text().await.unwrap(), "created");

    drop(client);
    shutdown.trigger();
    tokio::time::timeout(std::time::Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
}
