use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use chess_server_core::{analyze_position, Error, GameRecord, Occupant, PositionInfo, Square};

use crate::error::ApiError;
use crate::AppState;

pub mod ws;

const DEFAULT_LIST_LIMIT: u32 = 50;
const MAX_LIST_LIMIT: u32 = 500;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/game", post(create_game))
        .route("/game/:id", get(get_game))
        .route("/game/:id/status", get(game_status))
        .route("/game/:id/select", post(select_piece))
        .route("/game/:id/move", post(make_move))
        .route("/game/:id/ws", get(ws::subscribe))
        .route("/games", get(list_games))
        .route("/health", get(health))
        .with_state(state)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub success: bool,
    pub game_id: String,
    pub game: GameRecord,
}

#[derive(Serialize)]
pub struct GameResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub game: GameRecord,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub game_id: String,
    pub turn: String,
    pub is_game_over: bool,
    /// Bumped on every stored transition, selections included
    pub revision: u64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectRequest {
    pub piece_id: String,
}

/// Coordinates as sent by clients, checked before use
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub to_position: Position,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
}

/// Unreadable request bodies go through the same error shape as everything else.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError(Error::MalformedInput(rejection.body_text())))
}

fn timestamp(secs: u64) -> String {
    chrono::DateTime::from_timestamp(secs as i64, 0)
        .map(|d| d.to_rfc3339())
        .unwrap_or_default()
}

pub async fn create_game(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let (game_id, game) = state.service.create_game()?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            success: true,
            game_id,
            game: game.to_record(),
        }),
    ))
}

pub async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<GameResponse>, ApiError> {
    let game = state.service.get_game(&id)?;

    Ok(Json(GameResponse {
        success: true,
        message: None,
        game: game.to_record(),
    }))
}

pub async fn game_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PositionInfo>, ApiError> {
    let game = state.service.get_game(&id)?;
    Ok(Json(analyze_position(game.board(), game.turn())))
}

pub async fn select_piece(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<SelectRequest>, JsonRejection>,
) -> Result<Json<GameResponse>, ApiError> {
    let req = body(payload)?;
    let piece: Occupant = req.piece_id.parse()?;
    let game = state.service.select_piece(&id, piece)?;

    Ok(Json(GameResponse {
        success: true,
        message: Some("Piece selected"),
        game: game.to_record(),
    }))
}

pub async fn make_move(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> Result<Json<GameResponse>, ApiError> {
    let req = body(payload)?;
    let to = Square::from_coords(req.to_position.x, req.to_position.y)?;
    let game = state.service.make_move(&id, to)?;

    Ok(Json(GameResponse {
        success: true,
        message: Some("Move made successfully"),
        game: game.to_record(),
    }))
}

pub async fn list_games(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<GameSummary>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT);
    let games = state.service.list_games(limit)?;

    let summaries = games
        .into_iter()
        .map(|g| GameSummary {
            game_id: g.id,
            turn: g.turn,
            is_game_over: g.is_game_over,
            revision: g.version,
            created_at: timestamp(g.created_at),
            updated_at: timestamp(g.updated_at),
        })
        .collect();

    Ok(Json(summaries))
}

pub async fn health() -> &'static str {
    "OK"
}
