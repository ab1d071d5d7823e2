pub mod classify;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;

use crate::state::{AppState, Classifier};

async fn health() -> &'static str {
    "ok"
}

/// Build all routes for the served model
pub fn build_routes(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/image", post(classify::classify_image));

    if matches!(state.classifier, Classifier::General(_)) {
        router = router.route("/video", post(classify::classify_video_upload));
    }

    router
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
