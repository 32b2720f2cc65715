//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<DashboardState>`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::board::MatchBoard;
use crate::card::kickoff::{Clock, SystemClock};
use crate::card::submission::SubmitOutcome;
use crate::card::{CardView, PickerOption};
use crate::notify::{Notification, NotificationLog};
use crate::types::{MatchdayError, Prediction, Slot, Team};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub board: MatchBoard,
    pub notifications: Arc<NotificationLog>,
    pub clock: Arc<dyn Clock>,
}

impl DashboardState {
    pub fn new(board: MatchBoard, notifications: Arc<NotificationLog>) -> Self {
        Self {
            board,
            notifications,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct PickerRequest {
    pub slot: Slot,
    pub open: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamRequest {
    pub slot: Slot,
    pub team_id: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionBody {
    pub prediction: Option<Prediction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    pub applied: bool,
    pub card: CardView,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    #[serde(flatten)]
    pub outcome: SubmitOutcome,
    pub card: CardView,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Domain errors mapped onto HTTP status codes.
#[derive(Debug)]
pub struct ApiError(pub MatchdayError);

impl From<MatchdayError> for ApiError {
    fn from(e: MatchdayError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            MatchdayError::MatchNotFound(_) => StatusCode::NOT_FOUND,
            MatchdayError::NotSelectable(_) => StatusCode::CONFLICT,
            _ => StatusCode::BAD_REQUEST,
        };
        (status, Json(ErrorBody { error: self.0.to_string() })).into_response()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/teams
pub async fn get_teams(State(state): State<AppState>) -> Json<Vec<Team>> {
    Json(state.board.catalog().teams().to_vec())
}

/// GET /api/matches
pub async fn get_matches(State(state): State<AppState>) -> Json<Vec<CardView>> {
    Json(state.board.views(state.clock.as_ref()))
}

/// GET /api/matches/:id
pub async fn get_match(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<CardView>, ApiError> {
    let card = state.board.card(id)?;
    Ok(Json(card.view(state.clock.as_ref())))
}

/// GET /api/matches/:id/picker/:slot
pub async fn get_picker_options(
    State(state): State<AppState>,
    Path((id, slot)): Path<(u32, Slot)>,
) -> Result<Json<Vec<PickerOption>>, ApiError> {
    let card = state.board.card(id)?;
    Ok(Json(card.picker_options(slot)))
}

/// POST /api/matches/:id/picker
pub async fn post_picker(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(req): Json<PickerRequest>,
) -> Result<Json<CardView>, ApiError> {
    let card = state.board.card(id)?;
    if req.open {
        card.open_picker(req.slot);
    } else {
        card.close_picker(req.slot);
    }
    Ok(Json(card.view(state.clock.as_ref())))
}

/// POST /api/matches/:id/team
pub async fn post_team(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(req): Json<TeamRequest>,
) -> Result<Json<CardView>, ApiError> {
    let card = state.board.card(id)?;
    card.select_team_by_id(req.slot, req.team_id)?;
    Ok(Json(card.view(state.clock.as_ref())))
}

/// POST /api/matches/:id/prediction
pub async fn post_prediction(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(req): Json<PredictionBody>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let card = state.board.card(id)?;
    let applied = card.select_prediction(req.prediction);
    Ok(Json(PredictionResponse {
        applied,
        card: card.view(state.clock.as_ref()),
    }))
}

/// POST /api/matches/:id/submit
///
/// Resolves once the submission does; blocked submits return at once.
pub async fn post_submit(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let card = state.board.card(id)?.clone();
    let outcome = card.submit().await;
    Ok(Json(SubmitResponse {
        outcome,
        card: card.view(state.clock.as_ref()),
    }))
}

/// GET /api/notifications
pub async fn get_notifications(State(state): State<AppState>) -> Json<Vec<Notification>> {
    Json(state.notifications.recent())
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
