//! API routes for the gamification engine.
//!
//! Each endpoint maps 1:1 to a `ProgressEngine` operation; handlers only
//! translate between HTTP and the engine's types.

use crate::gamification::{
    Achievement, ChallengeOutcome, DailyChallenge, GamificationError, LeaderboardEntry,
    PoseSession, SessionOutcome, SessionSubmission, UserAchievement, UserStats,
};
use crate::server::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

type AppStateArc = Arc<AppState>;

/// Structured error body returned for every failure.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn error_response(err: GamificationError) -> ApiError {
    let (status, kind) = match &err {
        GamificationError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
        GamificationError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        GamificationError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage"),
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("request failed: {}", err);
    }

    (
        status,
        Json(ErrorBody {
            kind,
            message: err.to_string(),
        }),
    )
}

// ============================================================================
// Gamification Routes
// ============================================================================

pub fn gamification_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/gamification/progress/:user_id", get(get_progress))
        .route("/gamification/session", post(submit_session))
        .route("/gamification/sessions/:user_id", get(get_sessions))
        .route("/gamification/achievements", get(get_achievements))
        .route(
            "/gamification/achievements/:user_id",
            get(get_user_achievements),
        )
        .route("/gamification/leaderboard", get(get_leaderboard))
        .route("/gamification/daily-challenge", get(get_daily_challenge))
        .route(
            "/gamification/daily-challenge/complete",
            post(complete_daily_challenge),
        )
}

async fn get_progress(
    State(state): State<AppStateArc>,
    Path(user_id): Path<String>,
) -> Result<Json<UserStats>, ApiError> {
    state
        .engine
        .get_user_stats(&user_id)
        .map(Json)
        .map_err(error_response)
}

async fn submit_session(
    State(state): State<AppStateArc>,
    Json(submission): Json<SessionSubmission>,
) -> Result<Json<SessionOutcome>, ApiError> {
    state
        .engine
        .submit_session(submission)
        .map(Json)
        .map_err(error_response)
}

#[derive(Debug, Deserialize)]
struct SessionsQuery {
    limit: Option<u32>,
}

async fn get_sessions(
    State(state): State<AppStateArc>,
    Path(user_id): Path<String>,
    Query(query): Query<SessionsQuery>,
) -> Result<Json<Vec<PoseSession>>, ApiError> {
    state
        .engine
        .get_recent_sessions(&user_id, query.limit.unwrap_or(50))
        .map(Json)
        .map_err(error_response)
}

async fn get_achievements(State(state): State<AppStateArc>) -> Json<Vec<Achievement>> {
    Json(state.engine.get_achievements_catalog().to_vec())
}

async fn get_user_achievements(
    State(state): State<AppStateArc>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<UserAchievement>>, ApiError> {
    state
        .engine
        .get_user_achievements(&user_id)
        .map(Json)
        .map_err(error_response)
}

#[derive(Debug, Deserialize)]
struct LeaderboardQuery {
    limit: Option<usize>,
}

async fn get_leaderboard(
    State(state): State<AppStateArc>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    state
        .engine
        .get_leaderboard(query.limit.unwrap_or(10))
        .map(Json)
        .map_err(error_response)
}

#[derive(Debug, Deserialize)]
struct ChallengeQuery {
    /// Defaults to today (UTC) when absent
    date: Option<NaiveDate>,
}

async fn get_daily_challenge(
    State(state): State<AppStateArc>,
    Query(query): Query<ChallengeQuery>,
) -> Result<Json<DailyChallenge>, ApiError> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    state
        .engine
        .get_daily_challenge(date)
        .map(Json)
        .map_err(error_response)
}

#[derive(Debug, Deserialize)]
struct CompleteChallengeRequest {
    user_id: String,
    /// Defaults to today (UTC) when absent
    date: Option<NaiveDate>,
}

async fn complete_daily_challenge(
    State(state): State<AppStateArc>,
    Json(req): Json<CompleteChallengeRequest>,
) -> Result<Json<ChallengeOutcome>, ApiError> {
    let date = req.date.unwrap_or_else(|| Utc::now().date_naive());
    state
        .engine
        .complete_daily_challenge(&req.user_id, date)
        .map(Json)
        .map_err(error_response)
}

// ============================================================================
// Health Routes
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}
