//! HTTP router.
//!
//! Routes: `GET /`, `GET /test`, `POST /analyze`.
//! Layers (outermost first): CORS (any origin) → request tracing → handler.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the application router.
pub fn app_router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/", get(endpoints::health::root))
        .route("/test", get(endpoints::health::test_route))
        .route("/analyze", post(endpoints::analyze::analyze))
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
