use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::constants::MAX_UPLOAD_BYTES;
use crate::server::handlers::{fans, form_page, health, insights, metrics, submit};
use crate::server::state::AppState;

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(form_page))
        .route("/submit", post(submit))
        .route("/insights", get(insights))
        .route("/fans", get(fans))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .with_state(state)
}
