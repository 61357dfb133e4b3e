//! Authoritative match state.
//!
//! `MatchState` is the single record the server mutates. It only changes
//! through [`MatchState::try_accept_move`] and [`MatchState::reset`], and
//! each change replaces board, turn and outcome together.

use crate::board::{self, Board, IllegalMove, Outcome, Role, BOARD_SIZE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when applying a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Game is over")]
    GameOver,

    #[error("Not your turn")]
    NotYourTurn,

    #[error("Illegal move: {0}")]
    IllegalMove(#[from] IllegalMove),
}

/// Board, turn and outcome of the one running match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    board: Board,
    turn: Role,
    outcome: Outcome,
}

impl MatchState {
    /// The initial state: empty board, `First` to move, in progress
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            turn: Role::First,
            outcome: Outcome::InProgress,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Role whose move it is
    pub fn turn(&self) -> Role {
        self.turn
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Check if the match has ended
    pub fn is_finished(&self) -> bool {
        self.outcome.is_terminal()
    }

    /// Read-only copy of the current state
    pub fn current(&self) -> MatchState {
        *self
    }

    /// Cells `role` may play right now
    pub fn valid_moves(&self, role: Role) -> Vec<usize> {
        if self.is_finished() || role != self.turn {
            return Vec::new();
        }
        self.board.empty_cells()
    }

    /// Validate and apply a move by `role` at `index`.
    ///
    /// On rejection nothing is modified. On acceptance the new board, its
    /// outcome and the flipped turn are committed as one assignment.
    pub fn try_accept_move(&mut self, role: Role, index: usize) -> Result<MatchState, GameError> {
        if self.is_finished() {
            return Err(GameError::GameOver);
        }
        if role != self.turn {
            return Err(GameError::NotYourTurn);
        }

        let board = board::apply_move(&self.board, role, index)?;
        let outcome = board::evaluate(&board);

        *self = MatchState {
            board,
            turn: role.opponent(),
            outcome,
        };

        Ok(*self)
    }

    /// Reinitialize to the initial state, from any prior state
    pub fn reset(&mut self) -> MatchState {
        *self = MatchState::new();
        *self
    }

    /// Project the state into the form sent to clients
    pub fn snapshot(&self) -> GameSnapshot {
        let mut board = [None; BOARD_SIZE];
        for (slot, cell) in board.iter_mut().zip(self.board.cells()) {
            *slot = cell.occupant();
        }

        GameSnapshot {
            board,
            turn: self.turn,
            winner: self.outcome.winner(),
            is_draw: self.outcome == Outcome::Draw,
            is_over: self.outcome.is_terminal(),
        }
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

/// Client-facing view of a [`MatchState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Cells in index order; `None` for empty
    pub board: [Option<Role>; BOARD_SIZE],
    pub turn: Role,
    pub winner: Option<Role>,
    pub is_draw: bool,
    pub is_over: bool,
}

impl From<&MatchState> for GameSnapshot {
    fn from(state: &MatchState) -> Self {
        state.snapshot()
    }
}
