//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::{Method, StatusCode};
use resource_router::config::ServerConfig;
use resource_router::routing::HandlerResult;
use resource_router::{Handler, HttpServer, RequestDescriptor, ResponseDescriptor, RouteContext, Shutdown};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Handler answering 200 with a fixed text body.
#[allow(dead_code)]
pub fn respond_with(body: &'static str) -> impl Handler {
    move |_: RequestDescriptor, _: RouteContext| async move {
        HandlerResult::Ok(Some(ResponseDescriptor::text(StatusCode::OK, body)))
    }
}

/// Handler that always declines and counts its calls.
#[allow(dead_code)]
pub fn counting_decline(calls: Arc<AtomicUsize>) -> impl Handler {
    move |_: RequestDescriptor, _: RouteContext| {
        calls.fetch_add(1, Ordering::SeqCst);
        async move { HandlerResult::Ok(None) }
    }
}

#[allow(dead_code)]
pub fn request(method: Method, resource: &str) -> RequestDescriptor {
    RequestDescriptor::new(method, resource)
}

/// Start a server for `config` on an ephemeral port.
#[allow(dead_code)]
pub async fn spawn_server(config: ServerConfig) -> (SocketAddr, Arc<Shutdown>, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Arc::new(Shutdown::new());
    let server = HttpServer::from_config(config, shutdown.clone()).unwrap();

    let handle = tokio::spawn(async move {
        server.run(listener).await.unwrap();
    });
    (addr, shutdown, handle)
}
