//! Piece-wise dispatch into the movement rules.

use crate::game_state::chess_types::{GameState, PieceKind, Square};
use crate::moves::bishop_moves::bishop_destinations;
use crate::moves::king_moves::king_destinations;
use crate::moves::knight_moves::knight_destinations;
use crate::moves::pawn_moves::pawn_destinations;
use crate::moves::queen_moves::queen_destinations;
use crate::moves::rook_moves::rook_destinations;

/// Pseudo-legal destinations of the piece on `from`, ignoring whether the
/// move would leave its own king attacked. Empty when `from` is empty.
pub fn pseudo_legal_destinations(game_state: &GameState, from: Square) -> Vec<Square> {
    let mut out = Vec::with_capacity(28);
    let Some(piece) = game_state.board.piece_at(from) else {
        return out;
    };

    let board = &game_state.board;
    match piece.kind {
        PieceKind::Pawn => pawn_destinations(
            board,
            from,
            piece.color,
            game_state.en_passant_square,
            &mut out,
        ),
        PieceKind::Knight => knight_destinations(board, from, piece.color, &mut out),
        PieceKind::Bishop => bishop_destinations(board, from, piece.color, &mut out),
        PieceKind::Rook => rook_destinations(board, from, piece.color, &mut out),
        PieceKind::Queen => queen_destinations(board, from, piece.color, &mut out),
        PieceKind::King => king_destinations(
            board,
            from,
            piece.color,
            game_state.castling_rights,
            &mut out,
        ),
    }

    out
}

#[cfg(test)]
mod tests {
    use super::pseudo_legal_destinations;
    use crate::game_state::game_state::GameState;
    use crate::utils::algebraic::algebraic_to_square;

    #[test]
    fn empty_square_has_no_destinations() {
        let game = GameState::new_game();
        let e4 = algebraic_to_square("e4").expect("e4");
        assert!(pseudo_legal_destinations(&game, e4).is_empty());
    }

    #[test]
    fn start_position_knight_has_two_destinations() {
        let game = GameState::new_game();
        let g1 = algebraic_to_square("g1").expect("g1");
        assert_eq!(pseudo_legal_destinations(&game, g1).len(), 2);
    }
}
