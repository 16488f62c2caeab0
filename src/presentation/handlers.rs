// HTTP request handlers
use crate::application::feed_controller::FetchTicket;
use crate::application::feed_service::{FeedService, FeedSnapshot};
use crate::domain::histogram::Histogram;
use crate::domain::launch::RecordKey;
use crate::domain::selection::Coordinate;
use crate::presentation::app_state::AppState;
use crate::presentation::error::AppError;
use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct WindowRequest {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub saved: bool,
    pub snapshot: FeedSnapshot,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn get_feed(State(state): State<Arc<AppState>>) -> Json<FeedSnapshot> {
    Json(state.feed_service.snapshot())
}

/// Stream a snapshot every time the feed changes (latest first)
pub async fn stream_feed(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.feed_service.subscribe();
    let stream = async_stream::stream! {
        loop {
            let encoded = serde_json::to_string(&*rx.borrow_and_update());
            match encoded {
                Ok(data) => {
                    yield Ok(Event::default().event("snapshot").data(data));
                }
                Err(e) => {
                    tracing::warn!("Skipping feed snapshot event: {}", e);
                }
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

/// Switch to a new date window; the first page loads in the background
pub async fn change_window(
    State(state): State<Arc<AppState>>,
    Json(request): Json<WindowRequest>,
) -> Result<(StatusCode, Json<FeedSnapshot>), AppError> {
    let service = &state.feed_service;
    let ticket = service
        .begin_window_change(&request.start_date, &request.end_date)
        .await?;
    spawn_load(service, ticket);
    Ok((StatusCode::ACCEPTED, Json(service.snapshot())))
}

pub async fn retry(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<FeedSnapshot>), AppError> {
    let service = &state.feed_service;
    let ticket = service
        .begin_retry()
        .await
        .ok_or_else(|| AppError::Conflict("Feed is not in an error state".to_string()))?;
    spawn_load(service, ticket);
    Ok((StatusCode::ACCEPTED, Json(service.snapshot())))
}

/// Continuation trigger. Inert while loading or once every launch is loaded.
pub async fn load_more(State(state): State<Arc<AppState>>) -> (StatusCode, Json<FeedSnapshot>) {
    let service = &state.feed_service;
    if let Some(ticket) = service.begin_load_more().await {
        spawn_load(service, ticket);
    }
    (StatusCode::ACCEPTED, Json(service.snapshot()))
}

pub async fn toggle_selection(
    State(state): State<Arc<AppState>>,
    Json(key): Json<RecordKey>,
) -> Result<Json<ToggleResponse>, AppError> {
    let service = &state.feed_service;
    let saved = service
        .toggle(&key)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Launch {} (generation {}) not found", key.id, key.origin)))?;
    Ok(Json(ToggleResponse {
        saved,
        snapshot: service.snapshot(),
    }))
}

pub async fn get_histogram(State(state): State<Arc<AppState>>) -> Json<Histogram> {
    Json(state.feed_service.snapshot().histogram)
}

pub async fn get_coordinates(State(state): State<Arc<AppState>>) -> Json<Vec<Coordinate>> {
    Json(state.feed_service.snapshot().coordinates)
}

fn spawn_load(service: &FeedService, ticket: FetchTicket) {
    let service = service.clone();
    tokio::spawn(async move {
        service.run(ticket).await;
    });
}
