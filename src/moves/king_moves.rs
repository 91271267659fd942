//! King movement pattern, including castling destinations.

use crate::game_state::chess_rules::{
    king_home, king_side_rook_home, queen_side_rook_home, KING_SIDE_CASTLE, QUEEN_SIDE_CASTLE,
};
use crate::game_state::chess_types::{Board, CastlingRights, Color, Piece, PieceKind, Square};
use crate::move_generation::legal_move_checks::is_square_attacked;

pub const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

pub fn king_destinations(
    board: &Board,
    from: Square,
    color: Color,
    castling_rights: CastlingRights,
    out: &mut Vec<Square>,
) {
    for (row_delta, col_delta) in KING_OFFSETS {
        let Some(to) = from.offset(row_delta, col_delta) else {
            continue;
        };
        match board.piece_at(to) {
            Some(piece) if piece.color == color => {}
            _ => out.push(to),
        }
    }

    castling_destinations(board, from, color, castling_rights, out);
}

/// Castling is offered when the right is held, the rook is still home, every
/// square between king and rook is empty, and neither the king's square, the
/// square it passes through nor the square it lands on is attacked.
fn castling_destinations(
    board: &Board,
    from: Square,
    color: Color,
    castling_rights: CastlingRights,
    out: &mut Vec<Square>,
) {
    let rights = castling_rights.for_color(color);
    if from != king_home(color) || (!rights.king_side && !rights.queen_side) {
        return;
    }

    let enemy = color.opposite();
    if is_square_attacked(board, from, enemy) {
        return;
    }

    let row = from.row;
    let own_rook = Some(Piece::new(PieceKind::Rook, color));

    if rights.king_side && board.piece_at(king_side_rook_home(color)) == own_rook {
        let (king_to, passes) = KING_SIDE_CASTLE;
        let between = [5u8, 6];
        if between.iter().all(|&col| board.is_empty(Square::at(row, col)))
            && !is_square_attacked(board, Square::at(row, passes), enemy)
            && !is_square_attacked(board, Square::at(row, king_to), enemy)
        {
            out.push(Square::at(row, king_to));
        }
    }

    if rights.queen_side && board.piece_at(queen_side_rook_home(color)) == own_rook {
        let (king_to, passes) = QUEEN_SIDE_CASTLE;
        let between = [1u8, 2, 3];
        if between.iter().all(|&col| board.is_empty(Square::at(row, col)))
            && !is_square_attacked(board, Square::at(row, passes), enemy)
            && !is_square_attacked(board, Square::at(row, king_to), enemy)
        {
            out.push(Square::at(row, king_to));
        }
    }
}
