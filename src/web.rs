use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::board::ClickOutcome;
use crate::config::ServerConfig;
use crate::session::{Session, SessionView};
use crate::stats::{FileRecorder, MemoryRecorder, WinRecorder};

/// Shared handle on the single session. Every board mutation goes through
/// the one mutex, so clicks and clock ticks never interleave.
#[derive(Clone)]
pub struct AppState {
    session: Arc<Mutex<Session>>,
}

impl AppState {
    pub fn new(session: Session) -> Self {
        AppState {
            session: Arc::new(Mutex::new(session)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Serialize, Deserialize)]
pub struct SquareRequest {
    row: usize,
    col: usize,
}

#[derive(Serialize, Deserialize)]
pub struct PixelRequest {
    x: u32,
    y: u32,
}

#[derive(Serialize)]
pub struct ClickResponse {
    outcome: ClickOutcome,
    accepted: bool,
    state: SessionView,
}

#[derive(Serialize)]
pub struct PauseResponse {
    paused: bool,
    state: SessionView,
}

fn bad_request(rejection: JsonRejection) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({
            "error": rejection.body_text()
        })),
    )
        .into_response()
}

fn click_response(outcome: ClickOutcome, session: &Session) -> Response {
    Json(ClickResponse {
        outcome,
        accepted: outcome != ClickOutcome::Ignored,
        state: session.view(),
    })
    .into_response()
}

async fn get_state(State(app_state): State<AppState>) -> Json<SessionView> {
    Json(app_state.lock().view())
}

#[axum::debug_handler]
async fn click_square(
    State(app_state): State<AppState>,
    payload: Result<Json<SquareRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(req) => req,
        Err(rejection) => return bad_request(rejection),
    };

    let mut session = app_state.lock();
    let outcome = session.click(req.row, req.col);
    click_response(outcome, &session)
}

#[axum::debug_handler]
async fn click_pixel(
    State(app_state): State<AppState>,
    payload: Result<Json<PixelRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(req) => req,
        Err(rejection) => return bad_request(rejection),
    };

    let mut session = app_state.lock();
    let outcome = session.click_pixel(req.x, req.y);
    click_response(outcome, &session)
}

async fn toggle_pause(State(app_state): State<AppState>) -> Json<PauseResponse> {
    let mut session = app_state.lock();
    let paused = session.toggle_pause();
    Json(PauseResponse {
        paused,
        state: session.view(),
    })
}

async fn new_game(State(app_state): State<AppState>) -> Json<SessionView> {
    let mut session = app_state.lock();
    session.new_game();
    Json(session.view())
}

async fn reset_stats(State(app_state): State<AppState>) -> Response {
    let mut session = app_state.lock();
    match session.reset_wins() {
        Ok(()) => Json(session.view()).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": e.to_string()
            })),
        )
            .into_response(),
    }
}

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/state", get(get_state))
        .route("/api/click", post(click_square))
        .route("/api/click-pixel", post(click_pixel))
        .route("/api/pause", post(toggle_pause))
        .route("/api/new-game", post(new_game))
        .route("/api/reset-stats", post(reset_stats))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state)
}

/// Advance the session clocks every `interval` until the process exits.
pub fn spawn_ticker(app_state: AppState, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            app_state.lock().tick();
        }
    })
}

pub fn build_session(config: &ServerConfig) -> Result<Session, Box<dyn std::error::Error>> {
    let recorder: Box<dyn WinRecorder> = match &config.stats_path {
        Some(path) => Box::new(FileRecorder::open(path)?),
        None => Box::new(MemoryRecorder::new()),
    };

    Ok(Session::new(config.game.clone(), recorder).with_square_size(config.square_size))
}

pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let app_state = AppState::new(build_session(&config)?);
    spawn_ticker(app_state.clone(), config.tick_interval());

    let app = router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!(address = %config.bind, "checkers server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
