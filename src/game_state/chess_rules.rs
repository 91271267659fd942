//! Canonical chess-rule constants.
//!
//! Starting position and the home squares that castling rights are keyed on.

use crate::game_state::chess_types::{Color, Square};

/// Standard chess starting position in Forsyth-Edwards Notation (FEN).
pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub const KING_HOME_COL: u8 = 4;
pub const KING_SIDE_ROOK_COL: u8 = 7;
pub const QUEEN_SIDE_ROOK_COL: u8 = 0;

/// Column the king lands on after castling, and the rook's post-castle column.
pub const KING_SIDE_CASTLE: (u8, u8) = (6, 5);
pub const QUEEN_SIDE_CASTLE: (u8, u8) = (2, 3);

#[inline]
pub const fn king_home(color: Color) -> Square {
    Square::at(color.back_row(), KING_HOME_COL)
}

#[inline]
pub const fn king_side_rook_home(color: Color) -> Square {
    Square::at(color.back_row(), KING_SIDE_ROOK_COL)
}

#[inline]
pub const fn queen_side_rook_home(color: Color) -> Square {
    Square::at(color.back_row(), QUEEN_SIDE_ROOK_COL)
}
