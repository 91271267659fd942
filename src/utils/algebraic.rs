//! Square conversions for algebraic coordinates.
//!
//! Files `a`..`h` map to columns 0..7 and ranks `8`..`1` map to rows 0..7,
//! so `a8` is `(0, 0)` and `h1` is `(7, 7)`.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::Square;

const FILES: &[u8; 8] = b"abcdefgh";
const RANKS: &[u8; 8] = b"87654321";

/// Convert algebraic notation (for example: "e4") to a square.
#[inline]
pub fn algebraic_to_square(square: &str) -> ChessResult<Square> {
    let bytes = square.as_bytes();
    if bytes.len() != 2 {
        return Err(ChessError::InvalidSquare(square.to_owned()));
    }

    let col = FILES
        .iter()
        .position(|&f| f == bytes[0])
        .ok_or_else(|| ChessError::InvalidSquare(format!("bad file in '{square}'")))?;
    let row = RANKS
        .iter()
        .position(|&r| r == bytes[1])
        .ok_or_else(|| ChessError::InvalidSquare(format!("bad rank in '{square}'")))?;

    Square::new(row as u8, col as u8)
}

/// Convert a square to algebraic notation (for example: "e4").
#[inline]
pub fn square_to_algebraic(square: Square) -> String {
    let file_char = char::from(FILES[square.col as usize]);
    let rank_char = char::from(RANKS[square.row as usize]);
    format!("{file_char}{rank_char}")
}
