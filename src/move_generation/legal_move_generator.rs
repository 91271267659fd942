//! Full legal move generation pipeline.
//!
//! Collects pseudo-legal destinations piece by piece, evaluates every
//! candidate on a scratch board and keeps only those that leave the mover's
//! king unattacked.

use crate::errors::ChessResult;
use crate::game_state::chess_types::{Color, GameStatus, PieceKind, Square, PROMOTION_CHOICES};
use crate::game_state::game_state::GameState;
use crate::move_generation::legal_move_apply::{
    apply_move, board_after_move, is_castle, is_en_passant_capture,
};
use crate::move_generation::game_end::detect_game_status;
use crate::move_generation::legal_move_checks::is_king_in_check;
use crate::move_generation::legal_move_shared::pseudo_legal_destinations;
use crate::move_generation::move_generator::{GeneratedMove, MoveAnnotations, MoveGenerator};
use crate::moves::move_descriptions::ChessMove;

pub struct LegalMoveGenerator;

impl MoveGenerator for LegalMoveGenerator {
    fn generate_legal_moves(&self, game_state: &GameState) -> ChessResult<Vec<GeneratedMove>> {
        let moves = generate_legal_move_list(game_state)?;
        let mut out = Vec::with_capacity(moves.len());

        for chess_move in moves {
            let mut next = apply_move(game_state, chess_move)?;
            next.status = detect_game_status(&next)?;
            let annotations = annotate(game_state, chess_move, &next);
            out.push(GeneratedMove {
                chess_move,
                game_after_move: next,
                annotations,
            });
        }

        Ok(out)
    }
}

/// Every legal move for the side to move. Pawn moves onto the far rank are
/// listed once per promotion choice.
pub fn generate_legal_move_list(game_state: &GameState) -> ChessResult<Vec<ChessMove>> {
    let side = game_state.side_to_move;
    let mut out = Vec::with_capacity(64);
    for (from, _) in game_state.board.pieces_of(side) {
        out.extend(legal_moves_from(game_state, from)?);
    }
    Ok(out)
}

/// Legal moves of the piece standing on `from`, judged for that piece's
/// color. Empty when the square is empty.
pub fn legal_moves_from(game_state: &GameState, from: Square) -> ChessResult<Vec<ChessMove>> {
    let Some(piece) = game_state.board.piece_at(from) else {
        return Ok(Vec::new());
    };

    let mut out = Vec::new();
    for to in pseudo_legal_destinations(game_state, from) {
        let candidate = ChessMove::new(from, to);
        if !leaves_king_safe(game_state, candidate, piece.color)? {
            continue;
        }

        if piece.kind == PieceKind::Pawn && to.row == piece.color.promotion_row() {
            out.extend(
                PROMOTION_CHOICES
                    .iter()
                    .map(|&promo| ChessMove::with_promotion(from, to, promo)),
            );
        } else {
            out.push(candidate);
        }
    }

    Ok(out)
}

/// Short-circuiting variant used by the game-end detector.
pub fn has_any_legal_move(game_state: &GameState) -> ChessResult<bool> {
    let side = game_state.side_to_move;
    for (from, _) in game_state.board.pieces_of(side) {
        for to in pseudo_legal_destinations(game_state, from) {
            if leaves_king_safe(game_state, ChessMove::new(from, to), side)? {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

fn leaves_king_safe(
    game_state: &GameState,
    candidate: ChessMove,
    mover: Color,
) -> ChessResult<bool> {
    let scratch = board_after_move(&game_state.board, candidate, game_state.en_passant_square);
    Ok(!is_king_in_check(&scratch, mover)?)
}

fn annotate(prev: &GameState, chess_move: ChessMove, next: &GameState) -> MoveAnnotations {
    let Some(piece) = prev.board.piece_at(chess_move.from) else {
        return MoveAnnotations::default();
    };
    let is_en_passant = is_en_passant_capture(piece, chess_move, prev.en_passant_square);

    MoveAnnotations {
        is_capture: is_en_passant || prev.board.piece_at(chess_move.to).is_some(),
        is_en_passant,
        is_castle: is_castle(piece, chess_move),
        is_promotion: chess_move.promotion.is_some(),
        gives_check: matches!(next.status, GameStatus::Check | GameStatus::Checkmate),
        is_checkmate: next.status == GameStatus::Checkmate,
    }
}
