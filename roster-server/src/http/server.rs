//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Whole-request deadline
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::sync::Arc;

use axum::http::{HeaderValue, StatusCode};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::routes;
use super::state::AppState;
use crate::config::ServerConfig;
use crate::db::SharedStore;

/// Origins allowed when CORS is not permissive
const LOCAL_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:3030",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:3030",
];

/// Assemble routes and middleware around `state`.
pub fn build_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let cors = if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(LOCAL_ORIGINS.map(HeaderValue::from_static))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .merge(routes::health::router())
        .merge(routes::users::router())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        // outside the timeout so a 408 still carries CORS headers
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until a shutdown signal arrives, then close the store.
///
/// # Example
///
/// ```ignore
/// let config = ServerConfig::memory();
/// let store = open_store(&config).await?;
/// run_server(store, &config).await?;
/// ```
pub async fn run_server(store: SharedStore, config: &ServerConfig) -> Result<(), ServerError> {
    let backend = store.backend();
    let state = Arc::new(AppState::new(store.clone(), config));
    let app = build_router(state, config);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(%backend, aliases = config.aliases_enabled, "Server listening on {}", config.bind_addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    store.close().await;
    served?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
///
/// A handler that fails to install is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryUserStore;
    use axum::body::{to_bytes, Body};
    use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN};
    use axum::http::Request;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app(config: &ServerConfig) -> Router {
        let state = AppState::new(Arc::new(MemoryUserStore::new()), config);
        build_router(Arc::new(state), config)
    }

    #[tokio::test]
    async fn root_says_hello() {
        let response = app(&ServerConfig::memory())
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Hello world");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let response = app(&ServerConfig::memory())
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cors_allows_localhost_only() {
        let config = ServerConfig::memory();

        let response = app(&config)
            .oneshot(
                Request::get("/health")
                    .header(ORIGIN, "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:3000"
        );

        let response = app(&config)
            .oneshot(
                Request::get("/health")
                    .header(ORIGIN, "http://evil.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    /// Store whose list never completes.
    struct HangingStore;

    #[async_trait::async_trait]
    impl crate::db::UserStore for HangingStore {
        fn backend(&self) -> crate::config::Backend {
            crate::config::Backend::Memory
        }

        async fn list(&self) -> Result<Vec<roster_core::User>, crate::db::DbError> {
            std::future::pending().await
        }

        async fn get(&self, _id: &str) -> Result<roster_core::User, crate::db::DbError> {
            std::future::pending().await
        }

        async fn create(
            &self,
            _payload: roster_core::UserPayload,
        ) -> Result<roster_core::User, crate::db::DbError> {
            std::future::pending().await
        }

        async fn update(
            &self,
            _id: &str,
            _payload: roster_core::UserPayload,
        ) -> Result<roster_core::User, crate::db::DbError> {
            std::future::pending().await
        }

        async fn delete(&self, _id: &str) -> Result<(), crate::db::DbError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn request_timeout_is_408_with_cors() {
        let config = ServerConfig {
            request_timeout: Duration::from_millis(50),
            query_timeout: Duration::from_secs(60),
            ..ServerConfig::memory()
        };
        let state = AppState::new(Arc::new(HangingStore), &config);

        let response = build_router(Arc::new(state), &config)
            .oneshot(
                Request::get("/users")
                    .header(ORIGIN, "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:3000"
        );
    }
}
