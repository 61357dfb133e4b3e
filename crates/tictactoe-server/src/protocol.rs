//! WebSocket protocol messages for the tic-tac-toe server.

use serde::{Deserialize, Serialize};
use tictactoe_core::{GameSnapshot, Role};

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Attempt a move at a cell (0-8)
    MakeMove { index: usize },

    /// Start the match over
    ResetGame,

    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// The receiving connection now plays this role
    AssignRole { role: Role },

    /// Current match state
    GameUpdate { state: GameSnapshot },

    /// Pong response
    Pong,
}
