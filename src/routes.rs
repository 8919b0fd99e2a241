use crate::handlers::{self, AppState};
use crate::upload::MULTIPART_OVERHEAD;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Report API routes, with the request body capped at `max_file_size` plus
/// multipart framing.
pub fn api_routes(max_file_size: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api", get(handlers::list_reports))
        .route("/api/upload-xml", post(handlers::upload_xml))
        .route("/api/:id", get(handlers::get_report_by_id))
        // The explicit limit below replaces axum's 2MB default.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(
            max_file_size.saturating_add(MULTIPART_OVERHEAD),
        ))
}

/// Assemble the full application around `api`, which the caller may have
/// wrapped in extra layers (rate limiting). `/health` stays outside them.
pub fn build_app(state: Arc<AppState>, api: Router<Arc<AppState>>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
