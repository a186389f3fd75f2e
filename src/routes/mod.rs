pub mod api;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::post;

use crate::pipeline::MatchService;

/// Upload size cap for resume PDFs.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn router(service: Arc<MatchService>) -> Router {
    let api = Router::new()
        .route("/match", post(api::match_resume))
        .route("/search", post(api::search))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(service);

    Router::new().nest("/api/v1", api)
}
