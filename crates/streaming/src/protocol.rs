//! Marker ("player") wire types.
//!
//! Server → client traffic is JSON text frames on the WebSocket, tagged by
//! `type`. Client → server mutations go over plain HTTP with the request
//! bodies defined here; their responses are never used to render.

use serde::{Deserialize, Serialize};

pub type MarkerId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: MarkerId,
    pub x: f64,
    pub z: f64,
    /// Servers may echo a height; the client always resamples the terrain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

impl PlayerRecord {
    pub fn new(id: impl Into<MarkerId>, x: f64, z: f64) -> Self {
        Self {
            id: id.into(),
            x,
            z,
            y: None,
        }
    }
}

/// Message from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full snapshot pushed right after connect.
    InitialState { players: Vec<PlayerRecord> },
    PlayerCreated { player: PlayerRecord },
    PlayerMoved { id: MarkerId, x: f64, z: f64 },
    PlayerRemoved { id: MarkerId },
    AllCleared,
}

impl ServerMessage {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::InitialState { .. } => "initial_state",
            ServerMessage::PlayerCreated { .. } => "player_created",
            ServerMessage::PlayerMoved { .. } => "player_moved",
            ServerMessage::PlayerRemoved { .. } => "player_removed",
            ServerMessage::AllCleared => "all_cleared",
        }
    }
}

/// `POST /api/players`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreateMarkerRequest {
    pub x: f64,
    pub z: f64,
}

/// `POST /api/players/move`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveMarkerRequest {
    pub id: MarkerId,
    pub x: f64,
    pub z: f64,
}
