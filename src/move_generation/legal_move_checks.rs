//! Attack detection.
//!
//! Scans outward from the target square with the same offsets and rays the
//! movement rules use: pawn capture diagonals, knight jumps, king adjacency and
//! sliding rays for rook/bishop/queen patterns.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::{Board, Color, PieceKind, Square};
use crate::moves::bishop_moves::BISHOP_DIRECTIONS;
use crate::moves::king_moves::KING_OFFSETS;
use crate::moves::knight_moves::KNIGHT_OFFSETS;
use crate::moves::pawn_moves::PAWN_CAPTURE_COLS;
use crate::moves::rook_moves::ROOK_DIRECTIONS;

#[inline]
pub fn king_square(board: &Board, color: Color) -> ChessResult<Square> {
    board.find_king(color).ok_or(ChessError::MissingKing(color))
}

#[inline]
pub fn is_king_in_check(board: &Board, color: Color) -> ChessResult<bool> {
    let king_sq = king_square(board, color)?;
    Ok(is_square_attacked(board, king_sq, color.opposite()))
}

pub fn is_square_attacked(board: &Board, square: Square, attacker_color: Color) -> bool {
    // An attacking pawn sits one step "behind" the target from its own
    // point of view.
    let pawn_row_delta = -attacker_color.pawn_direction();
    for col_delta in PAWN_CAPTURE_COLS {
        let from = square.offset(pawn_row_delta, col_delta);
        if holds(board, from, attacker_color, &[PieceKind::Pawn]) {
            return true;
        }
    }

    for (row_delta, col_delta) in KNIGHT_OFFSETS {
        let from = square.offset(row_delta, col_delta);
        if holds(board, from, attacker_color, &[PieceKind::Knight]) {
            return true;
        }
    }

    for (row_delta, col_delta) in KING_OFFSETS {
        let from = square.offset(row_delta, col_delta);
        if holds(board, from, attacker_color, &[PieceKind::King]) {
            return true;
        }
    }

    let rook_like = [PieceKind::Rook, PieceKind::Queen];
    if ROOK_DIRECTIONS
        .iter()
        .any(|&dir| first_piece_on_ray(board, square, dir, attacker_color, &rook_like))
    {
        return true;
    }

    let bishop_like = [PieceKind::Bishop, PieceKind::Queen];
    BISHOP_DIRECTIONS
        .iter()
        .any(|&dir| first_piece_on_ray(board, square, dir, attacker_color, &bishop_like))
}

fn holds(board: &Board, square: Option<Square>, color: Color, kinds: &[PieceKind]) -> bool {
    matches!(
        square.and_then(|sq| board.piece_at(sq)),
        Some(piece) if piece.color == color && kinds.contains(&piece.kind)
    )
}

fn first_piece_on_ray(
    board: &Board,
    from: Square,
    (row_step, col_step): (i8, i8),
    color: Color,
    kinds: &[PieceKind],
) -> bool {
    let mut cursor = from.offset(row_step, col_step);
    while let Some(sq) = cursor {
        if let Some(piece) = board.piece_at(sq) {
            return piece.color == color && kinds.contains(&piece.kind);
        }
        cursor = sq.offset(row_step, col_step);
    }
    false
}
