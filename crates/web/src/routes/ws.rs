//! Real-time channel: one WebSocket per client and game
//!
//! The server pushes a snapshot on connect and then every event for the game.
//! Clients may also send selections and moves over the same socket; the
//! resulting event reaches every subscriber through the broadcast, while a
//! rejection is only answered to the sender.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use chess_server_core::{Error, GameEvent, GameRecord, Occupant, Square};

use super::Position;
use crate::error::{ApiError, ErrorBody};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    Select { piece_id: String },
    #[serde(rename_all = "camelCase")]
    Move { to_position: Position },
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage<'a> {
    #[serde(rename_all = "camelCase")]
    Snapshot { game_id: &'a str, game: GameRecord },
    Event(&'a GameEvent),
    Error(ErrorBody),
}

pub async fn subscribe(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    // refuse the upgrade for unknown games
    state.service.get_game(&id)?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, id)))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, game_id: String) {
    let mut events = state.service.subscribe();
    info!(game_id = %game_id, "client connected");

    let snapshot = match state.service.get_game(&game_id) {
        Ok(game) => ServerMessage::Snapshot {
            game_id: &game_id,
            game: game.to_record(),
        },
        Err(e) => ServerMessage::Error(ErrorBody::from_error(&e)),
    };
    if send(&mut socket, &snapshot).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) if event.game_id == game_id => {
                    if send(&mut socket, &ServerMessage::Event(&event)).await.is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(game_id = %game_id, skipped, "client lagging, events skipped");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if let Err(e) = handle_command(&state, &game_id, &text) {
                        debug!(game_id = %game_id, error = %e, "command rejected");
                        let reply = ServerMessage::Error(ErrorBody::from_error(&e));
                        if send(&mut socket, &reply).await.is_err() {
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(game_id = %game_id, error = %e, "socket error");
                    break;
                }
            },
        }
    }

    info!(game_id = %game_id, "client disconnected");
}

fn handle_command(state: &AppState, game_id: &str, text: &str) -> Result<(), Error> {
    let command: ClientMessage = serde_json::from_str(text)
        .map_err(|e| Error::MalformedInput(format!("unrecognized message: {}", e)))?;

    match command {
        ClientMessage::Select { piece_id } => {
            let piece: Occupant = piece_id.parse()?;
            state.service.select_piece(game_id, piece)?;
        }
        ClientMessage::Move { to_position } => {
            let to = Square::from_coords(to_position.x, to_position.y)?;
            state.service.make_move(game_id, to)?;
        }
    }
    Ok(())
}

async fn send(socket: &mut WebSocket, message: &ServerMessage<'_>) -> Result<(), axum::Error> {
    match serde_json::to_string(message) {
        Ok(json) => socket.send(Message::Text(json)).await,
        Err(e) => {
            warn!(error = %e, "could not encode message");
            Ok(())
        }
    }
}
