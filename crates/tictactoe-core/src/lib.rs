//! Tic-tac-toe match engine
//!
//! This crate provides the authoritative game logic used by the server:
//! - Roles, cells and the 3x3 board
//! - Move application and win/draw detection
//! - The match state machine with turn enforcement
//!
//! # Architecture
//!
//! Everything here is pure and synchronous. Locking, connections and
//! broadcasting live in the server crate, which owns the single
//! [`MatchState`] instance.
//!
//! # Modules
//!
//! - [`board`]: Board representation, move application and evaluation
//! - [`game`]: Match state, turn enforcement and client snapshots

pub mod board;
pub mod game;

// Re-export commonly used types
pub use board::{
    apply_move, evaluate, winning_line, Board, Cell, IllegalMove, Outcome, Role, BOARD_SIZE,
    WINNING_LINES,
};
pub use game::{GameError, GameSnapshot, MatchState};
