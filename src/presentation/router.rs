// Route table
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    change_window, get_coordinates, get_feed, get_histogram, health_check, load_more, retry,
    stream_feed, toggle_selection,
};
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/feed", get(get_feed))
        .route("/feed/events", get(stream_feed))
        .route("/feed/window", put(change_window))
        .route("/feed/retry", post(retry))
        .route("/feed/more", post(load_more))
        .route("/selection/toggle", post(toggle_selection))
        .route("/selection/histogram", get(get_histogram))
        .route("/selection/coordinates", get(get_coordinates))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
