//! Move application.
//!
//! `apply_move` performs the raw state transition on a copy of the position;
//! `play_move` is the checked entry point that validates the request against
//! the legal move set and classifies the resulting position. Both return a
//! fresh `GameState`, so a failed request never leaves the input mutated.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_rules::{
    king_side_rook_home, queen_side_rook_home, KING_SIDE_CASTLE, KING_SIDE_ROOK_COL,
    QUEEN_SIDE_CASTLE, QUEEN_SIDE_ROOK_COL,
};
use crate::game_state::chess_types::{Board, CastlingRights, Color, Piece, PieceKind, Square};
use crate::game_state::game_state::GameState;
use crate::game_state::undo_state::MoveRecord;
use crate::move_generation::game_end::detect_game_status;
use crate::move_generation::legal_move_generator::generate_legal_move_list;
use crate::moves::move_descriptions::ChessMove;
use crate::moves::pawn_moves::en_passant_victim_square;

/// Validate and apply `chess_move`, returning the successor position with
/// its game status recomputed for the new side to move.
pub fn play_move(game_state: &GameState, chess_move: ChessMove) -> ChessResult<GameState> {
    if game_state.status.is_terminal() {
        return Err(ChessError::GameOver);
    }

    let chess_move = normalize_promotion(game_state, chess_move)?;
    let legal = generate_legal_move_list(game_state)?;
    if !legal.contains(&chess_move) {
        return Err(ChessError::IllegalMove(chess_move.to_string()));
    }

    let mut next = apply_move(game_state, chess_move)?;
    next.status = detect_game_status(&next)?;
    Ok(next)
}

/// Raw transition for a move already known to be pseudo-legal. The game
/// status is carried over unchanged; `play_move` recomputes it.
pub(crate) fn apply_move(game_state: &GameState, chess_move: ChessMove) -> ChessResult<GameState> {
    let ChessMove { from, to, .. } = chess_move;
    let piece = game_state
        .board
        .piece_at(from)
        .ok_or_else(|| ChessError::IllegalMove(format!("no piece on {chess_move}")))?;
    if piece.color != game_state.side_to_move {
        return Err(ChessError::IllegalMove(format!(
            "{chess_move} moves a piece of the side not to move"
        )));
    }

    // Snapshot the pre-move state.
    let is_en_passant = is_en_passant_capture(piece, chess_move, game_state.en_passant_square);
    let captured = if is_en_passant {
        game_state
            .board
            .piece_at(en_passant_victim_square(from, to))
    } else {
        game_state.board.piece_at(to)
    };
    let record = MoveRecord {
        from,
        to,
        piece,
        captured,
        castling_rights: game_state.castling_rights,
        en_passant_square: game_state.en_passant_square,
        promotion: promotion_for(piece, chess_move),
        status: game_state.status,
    };

    let mut next = game_state.clone();
    next.board = board_after_move(&game_state.board, chess_move, game_state.en_passant_square);

    next.en_passant_square = None;
    if piece.kind == PieceKind::Pawn && from.row.abs_diff(to.row) == 2 {
        next.en_passant_square = Some(Square::at((from.row + to.row) / 2, from.col));
    }

    update_castling_rights(&mut next.castling_rights, piece, from, to);

    next.side_to_move = piece.color.opposite();
    next.move_log.push(record);

    Ok(next)
}

/// Board-only part of the transition: en-passant victim removal, castling
/// rook relocation, promotion substitution and the piece relocation itself.
/// The legality filter evaluates candidates on this scratch board.
pub fn board_after_move(
    board: &Board,
    chess_move: ChessMove,
    en_passant_square: Option<Square>,
) -> Board {
    let ChessMove { from, to, .. } = chess_move;
    let mut next = *board;
    let Some(piece) = next.take(from) else {
        return next;
    };

    if is_en_passant_capture(piece, chess_move, en_passant_square) {
        next.set(en_passant_victim_square(from, to), None);
    }

    if is_castle(piece, chess_move) {
        let (rook_from_col, rook_to_col) = if to.col == KING_SIDE_CASTLE.0 {
            (KING_SIDE_ROOK_COL, KING_SIDE_CASTLE.1)
        } else {
            (QUEEN_SIDE_ROOK_COL, QUEEN_SIDE_CASTLE.1)
        };
        let rook = next.take(Square::at(from.row, rook_from_col));
        next.set(Square::at(from.row, rook_to_col), rook);
    }

    let placed = match promotion_for(piece, chess_move) {
        Some(kind) => Piece::new(kind, piece.color),
        None => piece,
    };
    next.set(to, Some(placed));
    next
}

#[inline]
pub fn is_castle(piece: Piece, chess_move: ChessMove) -> bool {
    piece.kind == PieceKind::King && chess_move.from.col.abs_diff(chess_move.to.col) == 2
}

#[inline]
pub fn is_en_passant_capture(
    piece: Piece,
    chess_move: ChessMove,
    en_passant_square: Option<Square>,
) -> bool {
    piece.kind == PieceKind::Pawn
        && en_passant_square == Some(chess_move.to)
        && chess_move.from.col != chess_move.to.col
}

/// The promotion actually performed: only a pawn reaching its far rank
/// promotes, and it becomes a queen unless another piece was requested.
fn promotion_for(piece: Piece, chess_move: ChessMove) -> Option<PieceKind> {
    if piece.kind == PieceKind::Pawn && chess_move.to.row == piece.color.promotion_row() {
        Some(chess_move.promotion.unwrap_or(PieceKind::Queen))
    } else {
        None
    }
}

fn normalize_promotion(game_state: &GameState, chess_move: ChessMove) -> ChessResult<ChessMove> {
    let piece = game_state
        .board
        .piece_at(chess_move.from)
        .ok_or_else(|| ChessError::IllegalMove(format!("no piece on {chess_move}")))?;
    let reaches_far_rank =
        piece.kind == PieceKind::Pawn && chess_move.to.row == piece.color.promotion_row();

    match (reaches_far_rank, chess_move.promotion) {
        (true, None) => Ok(ChessMove::with_promotion(
            chess_move.from,
            chess_move.to,
            PieceKind::Queen,
        )),
        (true, Some(kind)) if kind.is_promotion_choice() => Ok(chess_move),
        (true, Some(kind)) => Err(ChessError::IllegalMove(format!(
            "{chess_move}: cannot promote to {kind:?}"
        ))),
        (false, Some(_)) => Err(ChessError::IllegalMove(format!(
            "{chess_move}: promotion piece given for a non-promoting move"
        ))),
        (false, None) => Ok(chess_move),
    }
}

/// King moves drop both rights; a move leaving a rook home square drops that
/// side's right. A capture landing on a rook home square also drops the
/// right it guarded.
fn update_castling_rights(rights: &mut CastlingRights, piece: Piece, from: Square, to: Square) {
    if piece.kind == PieceKind::King {
        rights.revoke_all(piece.color);
    }

    for color in [Color::Light, Color::Dark] {
        if from == king_side_rook_home(color) || to == king_side_rook_home(color) {
            rights.revoke_king_side(color);
        }
        if from == queen_side_rook_home(color) || to == queen_side_rook_home(color) {
            rights.revoke_queen_side(color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_move, play_move};
    use crate::errors::ChessError;
    use crate::game_state::chess_types::{CastlingRights, Color, GameStatus, Piece, PieceKind};
    use crate::game_state::game_state::GameState;
    use crate::moves::move_descriptions::ChessMove;
    use crate::utils::algebraic::algebraic_to_square;
    use crate::utils::fen_parser::parse_fen;
    use crate::utils::long_algebraic::decode_uci_move;

    fn uci(text: &str) -> ChessMove {
        decode_uci_move(text).expect("test move should decode")
    }

    #[test]
    fn double_step_sets_en_passant_for_one_ply() {
        let game = GameState::new_game();
        let after_e4 = play_move(&game, uci("e2e4")).expect("e2e4 is legal");
        assert_eq!(
            after_e4.en_passant_square,
            Some(algebraic_to_square("e3").expect("e3"))
        );

        let after_reply = play_move(&after_e4, uci("g8f6")).expect("g8f6 is legal");
        assert_eq!(after_reply.en_passant_square, None);
    }

    #[test]
    fn en_passant_removes_the_passed_pawn() {
        let game = parse_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").expect("FEN should parse");
        let next = play_move(&game, uci("e5d6")).expect("en passant is legal");

        assert_eq!(next.board.piece_at(algebraic_to_square("d5").expect("d5")), None);
        assert_eq!(
            next.board.piece_at(algebraic_to_square("d6").expect("d6")),
            Some(Piece::new(PieceKind::Pawn, Color::Light))
        );
        let record = next.move_log.last().expect("move was logged");
        assert_eq!(record.captured, Some(Piece::new(PieceKind::Pawn, Color::Dark)));
    }

    #[test]
    fn castling_relocates_rook_and_revokes_rights() {
        let game = parse_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("FEN should parse");
        let next = play_move(&game, uci("e1c1")).expect("queen-side castle is legal");

        assert_eq!(
            next.board.piece_at(algebraic_to_square("d1").expect("d1")),
            Some(Piece::new(PieceKind::Rook, Color::Light))
        );
        assert_eq!(next.board.piece_at(algebraic_to_square("a1").expect("a1")), None);
        assert!(!next.castling_rights.light.king_side);
        assert!(!next.castling_rights.light.queen_side);
        assert!(next.castling_rights.dark.king_side);
    }

    #[test]
    fn rook_leaving_home_revokes_only_its_side() {
        let game = parse_fen("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1").expect("FEN should parse");
        let next = play_move(&game, uci("h8h5")).expect("rook move is legal");
        assert!(!next.castling_rights.dark.king_side);
        assert!(next.castling_rights.dark.queen_side);
        assert!(next.castling_rights.light.king_side);
    }

    #[test]
    fn rights_never_return_once_revoked() {
        let mut game =
            parse_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("FEN should parse");
        for text in ["h1h2", "a8a7", "h2h1", "a7a8"] {
            let before = game.castling_rights;
            game = play_move(&game, uci(text)).expect("rook shuffle is legal");
            assert!(game.castling_rights.is_subset_of(&before));
        }
        assert!(!game.castling_rights.light.king_side);
        assert!(!game.castling_rights.dark.queen_side);
        assert_ne!(game.castling_rights, CastlingRights::ALL);
    }

    #[test]
    fn promotion_substitutes_piece_and_defaults_to_queen() {
        let game = parse_fen("k7/4P3/8/8/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        let knight = play_move(&game, uci("e7e8n")).expect("under-promotion is legal");
        assert_eq!(
            knight.board.piece_at(algebraic_to_square("e8").expect("e8")),
            Some(Piece::new(PieceKind::Knight, Color::Light))
        );

        let queen = play_move(&game, uci("e7e8")).expect("bare promotion defaults to queen");
        assert_eq!(
            queen.board.piece_at(algebraic_to_square("e8").expect("e8")),
            Some(Piece::new(PieceKind::Queen, Color::Light))
        );
        assert_eq!(queen.status, GameStatus::Check);
    }

    #[test]
    fn rejected_requests_leave_position_untouched() {
        let game = GameState::new_game();
        let snapshot = game.clone();

        assert!(matches!(
            play_move(&game, uci("e2e5")),
            Err(ChessError::IllegalMove(_))
        ));
        assert!(matches!(
            play_move(&game, uci("e2e4q")),
            Err(ChessError::IllegalMove(_))
        ));
        assert!(matches!(
            play_move(&game, uci("e7e5")),
            Err(ChessError::IllegalMove(_))
        ));
        assert_eq!(game, snapshot);
    }

    #[test]
    fn no_moves_after_checkmate() {
        let mated = parse_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 0 1")
            .expect("FEN should parse");
        assert_eq!(mated.status, GameStatus::Checkmate);
        assert_eq!(play_move(&mated, uci("a2a3")), Err(ChessError::GameOver));
    }

    #[test]
    fn raw_apply_rejects_wrong_side() {
        let game = GameState::new_game();
        assert!(apply_move(&game, uci("e7e5")).is_err());
    }
}
