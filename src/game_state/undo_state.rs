use crate::game_state::chess_rules::{
    KING_SIDE_CASTLE, KING_SIDE_ROOK_COL, QUEEN_SIDE_CASTLE, QUEEN_SIDE_ROOK_COL,
};
use crate::game_state::chess_types::*;
use crate::moves::move_descriptions::ChessMove;
use crate::moves::pawn_moves::en_passant_victim_square;

/// Single log entry written by move application.
///
/// Holds the moved piece as it stood before the move plus every pre-move
/// field the transition overwrites, so the move can be taken back exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub castling_rights: CastlingRights,
    pub en_passant_square: Option<Square>,
    pub promotion: Option<PieceKind>,
    pub status: GameStatus,
}

impl MoveRecord {
    #[inline]
    pub fn chess_move(&self) -> ChessMove {
        ChessMove {
            from: self.from,
            to: self.to,
            promotion: self.promotion,
        }
    }

    #[inline]
    pub fn was_en_passant(&self) -> bool {
        self.piece.kind == PieceKind::Pawn
            && self.en_passant_square == Some(self.to)
            && self.from.col != self.to.col
    }

    #[inline]
    pub fn was_castle(&self) -> bool {
        self.piece.kind == PieceKind::King && self.from.col.abs_diff(self.to.col) == 2
    }

    /// Reverse the transition this record describes on `game_state`.
    pub(crate) fn restore(&self, game_state: &mut GameState) {
        let board = &mut game_state.board;
        board.set(self.to, None);
        board.set(self.from, Some(self.piece));

        if self.was_en_passant() {
            board.set(en_passant_victim_square(self.from, self.to), self.captured);
        } else {
            board.set(self.to, self.captured);
        }

        if self.was_castle() {
            let row = self.from.row;
            let (rook_home, rook_post) = if self.to.col == KING_SIDE_CASTLE.0 {
                (KING_SIDE_ROOK_COL, KING_SIDE_CASTLE.1)
            } else {
                (QUEEN_SIDE_ROOK_COL, QUEEN_SIDE_CASTLE.1)
            };
            let rook = board.take(Square::at(row, rook_post));
            board.set(Square::at(row, rook_home), rook);
        }

        game_state.castling_rights = self.castling_rights;
        game_state.en_passant_square = self.en_passant_square;
        game_state.side_to_move = self.piece.color;
        game_state.status = self.status;
    }
}
