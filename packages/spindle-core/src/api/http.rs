//! HTTP route handlers.
//!
//! All handlers are thin - they delegate to services for business logic.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::response::{api_error, api_ok, api_success};
use crate::api::AppState;
use crate::controller::{ImageOpts, SeekMode, VolumeChange};
use crate::error::SpindleResult;
use crate::protocol_constants::SERVICE_ID;

// ─────────────────────────────────────────────────────────────────────────────
// Request Types
// ─────────────────────────────────────────────────────────────────────────────

/// Zone reference accepted by every zone-scoped request.
#[derive(Debug, Default, Deserialize)]
struct ZoneRef {
    zone_or_output_id: Option<String>,
    zone_name: Option<String>,
}

impl ZoneRef {
    /// A non-blank id takes precedence over the display name.
    fn reference(&self) -> Option<&str> {
        self.zone_or_output_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .or(self.zone_name.as_deref())
    }
}

#[derive(Deserialize)]
struct ControlRequest {
    #[serde(flatten)]
    zone: ZoneRef,
    control: String,
}

#[derive(Deserialize)]
struct BrowseRequest {
    #[serde(flatten)]
    zone: ZoneRef,
    path: Vec<String>,
    action: Option<String>,
}

#[derive(Deserialize)]
struct AlbumRequest {
    #[serde(flatten)]
    zone: ZoneRef,
    artist: String,
    album: String,
}

#[derive(Deserialize)]
struct TrackRequest {
    #[serde(flatten)]
    zone: ZoneRef,
    #[serde(default)]
    artist: String,
    album: Option<String>,
    track_title: String,
}

#[derive(Deserialize)]
struct SeekRequest {
    #[serde(flatten)]
    zone: ZoneRef,
    #[serde(default)]
    how: SeekMode,
    seconds: i64,
}

#[derive(Deserialize)]
struct VolumeRequest {
    #[serde(flatten)]
    zone: ZoneRef,
    #[serde(default)]
    how: VolumeChange,
    value: i32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Creates the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/zones", get(list_zones))
        .route("/now-playing", get(now_playing))
        .route("/control", post(handle_control))
        .route("/seek", post(handle_seek))
        .route("/volume", post(handle_volume))
        .route("/browse", post(handle_browse))
        .route("/play-album", post(handle_play_album))
        .route("/play-track", post(handle_play_track))
        .route("/queue", post(handle_queue))
        .route("/image/{image_key}", get(serve_image))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Liveness probe with controller connection status.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    api_success(json!({
        "status": "ok",
        "service": SERVICE_ID,
        "connected": state.registry.is_connected(),
        "zones": state.registry.len()
    }))
}

async fn list_zones(State(state): State<AppState>) -> impl IntoResponse {
    api_success(json!({ "zones": state.registry.list() }))
}

async fn now_playing(State(state): State<AppState>) -> impl IntoResponse {
    api_success(state.registry.now_playing())
}

async fn handle_control(
    State(state): State<AppState>,
    Json(payload): Json<ControlRequest>,
) -> SpindleResult<impl IntoResponse> {
    let outcome = state
        .playback
        .control(payload.zone.reference(), &payload.control)
        .await?;
    Ok(api_success(outcome))
}

async fn handle_seek(
    State(state): State<AppState>,
    Json(payload): Json<SeekRequest>,
) -> SpindleResult<impl IntoResponse> {
    state
        .playback
        .seek(payload.zone.reference(), payload.how, payload.seconds)
        .await?;
    Ok(api_ok())
}

async fn handle_volume(
    State(state): State<AppState>,
    Json(payload): Json<VolumeRequest>,
) -> SpindleResult<impl IntoResponse> {
    let outcome = state
        .playback
        .change_volume(payload.zone.reference(), payload.how, payload.value)
        .await?;
    Ok(api_success(outcome))
}

async fn handle_browse(
    State(state): State<AppState>,
    Json(payload): Json<BrowseRequest>,
) -> SpindleResult<impl IntoResponse> {
    let outcome = state
        .orchestrator
        .browse(
            payload.zone.reference(),
            &payload.path,
            payload.action.as_deref(),
        )
        .await?;
    Ok(api_success(outcome))
}

async fn handle_play_album(
    State(state): State<AppState>,
    Json(payload): Json<AlbumRequest>,
) -> SpindleResult<impl IntoResponse> {
    let matched = state
        .orchestrator
        .play_album(payload.zone.reference(), &payload.artist, &payload.album)
        .await?;
    Ok(api_success(matched))
}

async fn handle_play_track(
    State(state): State<AppState>,
    Json(payload): Json<TrackRequest>,
) -> SpindleResult<impl IntoResponse> {
    let matched = state
        .orchestrator
        .play_track(
            payload.zone.reference(),
            &payload.artist,
            payload.album.as_deref(),
            &payload.track_title,
        )
        .await?;
    Ok(api_success(matched))
}

async fn handle_queue(
    State(state): State<AppState>,
    Json(payload): Json<AlbumRequest>,
) -> SpindleResult<impl IntoResponse> {
    let matched = state
        .orchestrator
        .queue_album(payload.zone.reference(), &payload.artist, &payload.album)
        .await?;
    Ok(api_success(matched))
}

/// Passes artwork bytes through from the controller.
async fn serve_image(
    State(state): State<AppState>,
    Path(image_key): Path<String>,
    Query(opts): Query<ImageOpts>,
) -> SpindleResult<Response> {
    let image = state.playback.image(&image_key, opts).await?;
    log::debug!(
        "[Image] Serving {} ({} bytes)",
        image_key,
        image.data.len()
    );
    Ok(([(header::CONTENT_TYPE, image.content_type)], image.data).into_response())
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    api_error(
        StatusCode::NOT_FOUND,
        "not_found",
        format!("No route for {}", uri.path()),
    )
}
