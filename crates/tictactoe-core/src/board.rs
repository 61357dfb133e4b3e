//! Board representation and the pure rules of the game.
//!
//! This module contains:
//! - The two playable roles and their marks
//! - Cells and the 3x3 board, addressed row-major by index 0-8
//! - Move application and outcome evaluation
//!
//! Nothing here knows about turns being enforced or who is connected;
//! callers own that bookkeeping.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of cells on the board
pub const BOARD_SIZE: usize = 9;

/// The eight winning triples, checked in this order by [`evaluate`].
pub const WINNING_LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// One of the two playable identities in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Moves first, shown as "X"
    #[serde(rename = "X")]
    First,
    /// Moves second, shown as "O"
    #[serde(rename = "O")]
    Second,
}

impl Role {
    /// Both roles in turn order
    pub const ALL: [Role; 2] = [Role::First, Role::Second];

    /// The other role
    pub fn opponent(self) -> Self {
        match self {
            Role::First => Role::Second,
            Role::Second => Role::First,
        }
    }

    /// Mark shown to users for this role
    pub fn mark(self) -> char {
        match self {
            Role::First => 'X',
            Role::Second => 'O',
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mark())
    }
}

/// A single board cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(Role),
}

impl Cell {
    /// The role occupying this cell, if any
    pub fn occupant(self) -> Option<Role> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(role) => Some(role),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

/// Result of evaluating a board
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// No line completed and at least one empty cell
    #[default]
    InProgress,
    /// A line of three is held by this role
    Won(Role),
    /// Every cell is occupied and no line was completed
    Draw,
}

impl Outcome {
    /// Whether the match has ended
    pub fn is_terminal(self) -> bool {
        self != Outcome::InProgress
    }

    /// The winning role, if any
    pub fn winner(self) -> Option<Role> {
        match self {
            Outcome::Won(role) => Some(role),
            _ => None,
        }
    }
}

/// Reasons a move cannot be placed on a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum IllegalMove {
    #[error("Cell {index} is off the board")]
    OutOfRange { index: usize },

    #[error("Cell {index} is already occupied")]
    Occupied { index: usize },
}

/// The 3x3 grid, row-major: 0-2 top row, 3-5 middle row, 6-8 bottom row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a board from explicit cells
    pub fn from_cells(cells: [Cell; BOARD_SIZE]) -> Self {
        Self { cells }
    }

    /// Get the cell at an index, or `None` if the index is off the board
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// All cells in index order
    pub fn cells(&self) -> &[Cell; BOARD_SIZE] {
        &self.cells
    }

    /// Whether every cell is occupied
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| !c.is_empty())
    }

    /// Indices of the unoccupied cells, ascending
    pub fn empty_cells(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_empty())
            .map(|(i, _)| i)
            .collect()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.cells.chunks(3).enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            for (col, cell) in cells.iter().enumerate() {
                if col > 0 {
                    write!(f, "|")?;
                }
                match cell.occupant() {
                    Some(role) => write!(f, "{}", role)?,
                    None => write!(f, ".")?,
                }
            }
        }
        Ok(())
    }
}

/// Place `turn` at `index`, returning the new board.
///
/// The input board is left untouched. Turn advancement and outcome
/// detection are the caller's job.
pub fn apply_move(board: &Board, turn: Role, index: usize) -> Result<Board, IllegalMove> {
    match board.get(index) {
        None => Err(IllegalMove::OutOfRange { index }),
        Some(Cell::Occupied(_)) => Err(IllegalMove::Occupied { index }),
        Some(Cell::Empty) => {
            let mut next = *board;
            next.cells[index] = Cell::Occupied(turn);
            Ok(next)
        }
    }
}

/// First completed line in [`WINNING_LINES`] order, with its owner.
pub fn winning_line(board: &Board) -> Option<(Role, [usize; 3])> {
    WINNING_LINES.iter().find_map(|&[a, b, c]| {
        let role = board.cells[a].occupant()?;
        (board.cells[b] == board.cells[a] && board.cells[c] == board.cells[a])
            .then_some((role, [a, b, c]))
    })
}

/// Evaluate a board. A completed line always wins over a full board.
pub fn evaluate(board: &Board) -> Outcome {
    if let Some((role, _)) = winning_line(board) {
        Outcome::Won(role)
    } else if board.is_full() {
        Outcome::Draw
    } else {
        Outcome::InProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const X: Cell = Cell::Occupied(Role::First);
    const O: Cell = Cell::Occupied(Role::Second);
    const E: Cell = Cell::Empty;

    #[test]
    fn test_apply_move_sets_only_target_cell() {
        let board = Board::new();
        let next = apply_move(&board, Role::First, 4).unwrap();

        assert_eq!(next.get(4), Some(X));
        assert_eq!(next.empty_cells(), vec![0, 1, 2, 3, 5, 6, 7, 8]);
        // Input is unchanged
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_apply_move_rejects_occupied_cell() {
        let board = apply_move(&Board::new(), Role::First, 0).unwrap();
        assert_eq!(
            apply_move(&board, Role::Second, 0),
            Err(IllegalMove::Occupied { index: 0 })
        );
    }

    #[test]
    fn test_apply_move_rejects_out_of_range() {
        assert_eq!(
            apply_move(&Board::new(), Role::First, 9),
            Err(IllegalMove::OutOfRange { index: 9 })
        );
        assert_eq!(
            apply_move(&Board::new(), Role::First, usize::MAX),
            Err(IllegalMove::OutOfRange { index: usize::MAX })
        );
    }

    #[test]
    fn test_evaluate_empty_board() {
        assert_eq!(evaluate(&Board::new()), Outcome::InProgress);
    }

    #[test]
    fn test_evaluate_every_line() {
        for line in WINNING_LINES {
            for role in Role::ALL {
                let mut cells = [E; BOARD_SIZE];
                for i in line {
                    cells[i] = Cell::Occupied(role);
                }
                let board = Board::from_cells(cells);
                assert_eq!(evaluate(&board), Outcome::Won(role), "line {:?}", line);
                assert_eq!(winning_line(&board), Some((role, line)));
            }
        }
    }

    #[test]
    fn test_mixed_line_does_not_win() {
        let board = Board::from_cells([X, X, O, E, E, E, E, E, E]);
        assert_eq!(evaluate(&board), Outcome::InProgress);
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        // X O X
        // X O O
        // O X O
        let board = Board::from_cells([X, O, X, X, O, O, O, X, O]);
        assert!(board.is_full());
        assert_eq!(evaluate(&board), Outcome::Draw);
    }

    #[test]
    fn test_win_on_full_board_beats_draw() {
        // X X X
        // O O X
        // X O O
        let board = Board::from_cells([X, X, X, O, O, X, X, O, O]);
        assert_eq!(evaluate(&board), Outcome::Won(Role::First));
    }

    #[test]
    fn test_board_display() {
        let board = Board::from_cells([X, E, O, E, X, E, E, E, E]);
        assert_eq!(board.to_string(), "X|.|O\n.|X|.\n.|.|.");
    }

    #[test]
    fn test_role_opponent_and_mark() {
        assert_eq!(Role::First.opponent(), Role::Second);
        assert_eq!(Role::Second.opponent(), Role::First);
        assert_eq!(Role::First.to_string(), "X");
        assert_eq!(Role::Second.mark(), 'O');
    }
}
