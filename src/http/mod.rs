//! HTTP surface over a [`RecordStore`].

pub mod error;
mod handlers;

use crate::store::RecordStore;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{info, warn, Level};

pub use error::ApiError;

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The one store every handler talks to.
    pub store: Arc<RecordStore>,
}

/// Build the application router.
///
/// Paths that exist but are hit with an unsupported method answer like
/// unknown paths: `404 {"message": "Route not found"}`.
pub fn build_router(store: Arc<RecordStore>, cors: CorsLayer) -> Router {
    use handlers::{
        create_appointment, create_user, get_service, health, list_appointments, list_services,
        list_users, login, not_found, register,
    };

    Router::new()
        .route("/", get(health).fallback(not_found))
        .route("/services", get(list_services).fallback(not_found))
        .route("/services/:id", get(get_service).fallback(not_found))
        .route(
            "/appointments",
            get(list_appointments)
                .post(create_appointment)
                .fallback(not_found),
        )
        .route("/users", get(list_users).post(create_user).fallback(not_found))
        .route("/auth/register", post(register).fallback(not_found))
        .route("/auth/login", post(login).fallback(not_found))
        .fallback(not_found)
        .with_state(AppState { store })
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

/// CORS for the given origins, with credentials. An empty list or one that
/// contains `"*"` allows any origin.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        return CorsLayer::very_permissive();
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Serve `router` on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, router: Router) -> anyhow::Result<()> {
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
