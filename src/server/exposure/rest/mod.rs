//! REST API exposure
//!
//! The REST exposure consumes a `ServerHost` and produces an Axum `Router`.

use super::super::host::ServerHost;
use crate::server::handlers::AppState;
use crate::server::router::build_session_routes;
use anyhow::Result;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    ///
    /// The router carries health routes, the session workflow routes and any
    /// custom routes, wrapped in a request trace layer. A permissive CORS
    /// layer is added when the config asks for it.
    pub fn build_router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Result<Router> {
        let state = AppState {
            config: host.config.clone(),
            sessions: host.sessions.clone(),
            authenticator: host.authenticator.clone(),
        };

        let mut app = Self::health_routes().merge(build_session_routes(state));

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        if host.config.cors_allow_any {
            app = app.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        Ok(app.layer(TraceLayer::new_for_http()))
    }

    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "nursery-orders"
        }))
    }
}
