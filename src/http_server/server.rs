//! # HTTP Server
//!
//! Binds the resource routes to a socket.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::config::HttpServerConfig;
use super::routes::{resource_routes, ResourceState};
use crate::router::TableRouter;

/// HTTP front end for a [`TableRouter`]
pub struct HttpServer {
    config: HttpServerConfig,
    authority: String,
    router: Router,
}

impl HttpServer {
    /// Serve `router` with paths read under `authority`
    pub fn new(
        config: HttpServerConfig,
        authority: impl Into<String>,
        router: Arc<TableRouter>,
    ) -> Self {
        let authority = authority.into();
        let state = Arc::new(ResourceState::new(router, authority.clone()));
        let router = resource_routes(state).layer(TraceLayer::new_for_http());
        Self {
            config,
            authority,
            router,
        }
    }

    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until the listener fails
    pub async fn start(self) -> io::Result<()> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid socket address {}: {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        info!(
            event = "SERVER_STARTED",
            addr = %addr,
            authority = %self.authority,
            "serving content://{}/ over HTTP",
            self.authority
        );
        axum::serve(listener, self.router).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NoopNotifier;
    use crate::router::TableRegistry;
    use crate::store::RecordingStore;

    fn server(config: HttpServerConfig) -> HttpServer {
        let router = TableRouter::new(
            TableRegistry::new(),
            Arc::new(RecordingStore::new()),
            Arc::new(NoopNotifier),
        );
        HttpServer::new(config, "com.example.app", Arc::new(router))
    }

    #[test]
    fn test_server_with_custom_port() {
        let server = server(HttpServerConfig::with_port(8080));
        assert_eq!(server.socket_addr(), "127.0.0.1:8080");
    }

    #[tokio::test]
    async fn test_invalid_host_fails_to_start() {
        let config = HttpServerConfig {
            host: "not a host".to_string(),
            port: 1,
        };
        let err = server(config).start().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
