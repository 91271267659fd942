//! Authoritative game position.
//!
//! `GameState` stores the mailbox board, turn and castling/en-passant flags,
//! the cached game status and the log of applied moves. Every successful move
//! produces a fresh state through `play_move`; the mutating helpers below only
//! swap the result in once it has been fully computed.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_apply::play_move;
use crate::move_generation::legal_move_checks::is_king_in_check;
use crate::move_generation::legal_move_generator::{generate_legal_move_list, legal_moves_from};
use crate::moves::move_descriptions::ChessMove;
use crate::utils::fen_generator::generate_fen;
use crate::utils::fen_parser::parse_fen;
use crate::utils::long_algebraic::decode_uci_move;

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub side_to_move: Color,
    pub castling_rights: CastlingRights,
    pub en_passant_square: Option<Square>,
    pub move_log: Vec<MoveRecord>,
    pub status: GameStatus,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            board: Board::default(),
            side_to_move: Color::Light,
            castling_rights: CastlingRights::NONE,
            en_passant_square: None,
            move_log: Vec::new(),
            status: GameStatus::Active,
        }
    }
}

impl GameState {
    /// Empty board, light to move, no rights. Mostly useful for tests that
    /// place pieces by hand.
    #[inline]
    pub fn new_empty() -> Self {
        Self::default()
    }

    /// Standard starting position.
    pub fn new_game() -> Self {
        let mut board = Board::default();
        for color in [Color::Light, Color::Dark] {
            for (col, kind) in BACK_RANK.iter().enumerate() {
                let col = col as u8;
                board.set(
                    Square::at(color.back_row(), col),
                    Some(Piece::new(*kind, color)),
                );
                board.set(
                    Square::at(color.pawn_start_row(), col),
                    Some(Piece::new(PieceKind::Pawn, color)),
                );
            }
        }

        Self {
            board,
            castling_rights: CastlingRights::ALL,
            ..Self::default()
        }
    }

    #[inline]
    pub fn from_fen(fen: &str) -> ChessResult<Self> {
        parse_fen(fen)
    }

    #[inline]
    pub fn get_fen(&self) -> String {
        generate_fen(self)
    }

    #[inline]
    pub fn legal_moves(&self) -> ChessResult<Vec<ChessMove>> {
        generate_legal_move_list(self)
    }

    /// Destinations reachable by the piece on `from`. Empty when the square
    /// is empty or holds a piece of the side not to move.
    pub fn legal_destinations(&self, from: Square) -> ChessResult<Vec<Square>> {
        match self.board.piece_at(from) {
            Some(piece) if piece.color == self.side_to_move => {
                let mut out: Vec<Square> = Vec::new();
                for mv in legal_moves_from(self, from)? {
                    if !out.contains(&mv.to) {
                        out.push(mv.to);
                    }
                }
                Ok(out)
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Validate and apply `chess_move` in place. On error `self` is unchanged.
    pub fn make_move(&mut self, chess_move: ChessMove) -> ChessResult<()> {
        *self = play_move(self, chess_move)?;
        Ok(())
    }

    pub fn make_uci_move(&mut self, text: &str) -> ChessResult<ChessMove> {
        let chess_move = decode_uci_move(text)?;
        self.make_move(chess_move)?;
        // The log holds the normalized form, including a defaulted promotion.
        Ok(self
            .move_log
            .last()
            .map(MoveRecord::chess_move)
            .unwrap_or(chess_move))
    }

    /// Take back the most recent move. Returns the undone move, or `None`
    /// when the log is empty.
    pub fn undo_last_move(&mut self) -> Option<ChessMove> {
        let record = self.move_log.pop()?;
        record.restore(self);
        Some(record.chess_move())
    }

    /// The played moves in order, when the log leads back to the standard
    /// starting position. `None` for games set up from another FEN.
    pub fn moves_from_start(&self) -> Option<Vec<ChessMove>> {
        let mut origin = self.clone();
        while origin.undo_last_move().is_some() {}
        if origin != Self::new_game() {
            return None;
        }
        Some(self.move_log.iter().map(MoveRecord::chess_move).collect())
    }

    #[inline]
    pub fn is_in_check(&self) -> ChessResult<bool> {
        is_king_in_check(&self.board, self.side_to_move)
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.status.is_terminal()
    }

    /// Error for callers that must refuse to continue a finished game.
    #[inline]
    pub fn ensure_in_progress(&self) -> ChessResult<()> {
        if self.is_game_over() {
            Err(ChessError::GameOver)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::GameState;
    use crate::errors::ChessError;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;
    use crate::game_state::chess_types::{Color, GameStatus};
    use crate::utils::algebraic::algebraic_to_square;
    use crate::utils::fen_parser::parse_fen;

    #[test]
    fn new_game_matches_starting_fen() {
        let built = GameState::new_game();
        let parsed = parse_fen(STARTING_POSITION_FEN).expect("starting FEN should parse");
        assert_eq!(built, parsed);
        assert_eq!(built.get_fen(), STARTING_POSITION_FEN);
    }

    #[test]
    fn legal_destinations_ignore_opponent_pieces() {
        let game = GameState::new_game();
        let e2 = algebraic_to_square("e2").expect("e2");
        let e7 = algebraic_to_square("e7").expect("e7");
        let mut targets = game.legal_destinations(e2).expect("generation should succeed");
        targets.sort_by_key(|sq| sq.row);
        assert_eq!(
            targets,
            vec![
                algebraic_to_square("e4").expect("e4"),
                algebraic_to_square("e3").expect("e3")
            ]
        );
        assert!(game
            .legal_destinations(e7)
            .expect("generation should succeed")
            .is_empty());
    }

    #[test]
    fn promotion_destination_listed_once() {
        let game = parse_fen("k7/4P3/8/8/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        let e7 = algebraic_to_square("e7").expect("e7");
        assert_eq!(game.legal_destinations(e7).expect("generation").len(), 1);
    }

    #[test]
    fn failed_make_move_keeps_state() {
        let mut game = GameState::new_game();
        let before = game.clone();
        assert!(matches!(
            game.make_uci_move("e2e5"),
            Err(ChessError::IllegalMove(_))
        ));
        assert!(matches!(
            game.make_uci_move("zz"),
            Err(ChessError::MalformedNotation(_))
        ));
        assert_eq!(game, before);
    }

    #[test]
    fn make_uci_move_reports_defaulted_promotion() {
        let mut game = parse_fen("k7/4P3/8/8/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        let played = game.make_uci_move("e7e8").expect("promotion is legal");
        assert_eq!(played.to_string(), "e7e8q");
    }

    #[test]
    fn undo_restores_every_field() {
        let fens = [
            STARTING_POSITION_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1",
            "r3k2r/1P6/8/8/8/8/8/R3K2R w KQkq - 0 1",
        ];

        for fen in fens {
            let game = parse_fen(fen).expect("FEN should parse");
            for mv in game.legal_moves().expect("generation should succeed") {
                let mut probe = game.clone();
                probe.make_move(mv).expect("generated move is legal");
                let undone = probe.undo_last_move().expect("one move to undo");
                assert_eq!(undone, mv, "undo reported wrong move in {fen}");
                assert_eq!(probe, game, "undo of {mv} diverged in {fen}");
            }
        }
    }

    #[test]
    fn move_history_only_for_games_from_the_start() {
        let mut game = GameState::new_game();
        assert_eq!(game.moves_from_start(), Some(Vec::new()));

        for mv in ["e2e4", "e7e5", "g1f3"] {
            game.make_uci_move(mv).expect("opening move is legal");
        }
        let history: Vec<String> = game
            .moves_from_start()
            .expect("game began at the start")
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(history, ["e2e4", "e7e5", "g1f3"]);

        let mut loaded = parse_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").expect("FEN should parse");
        loaded.make_uci_move("e2e4").expect("push is legal");
        assert_eq!(loaded.moves_from_start(), None);
    }

    #[test]
    fn undo_on_fresh_game_is_none() {
        let mut game = GameState::new_game();
        assert_eq!(game.undo_last_move(), None);
    }

    #[test]
    fn finished_game_refuses_to_continue() {
        let mut game = parse_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 0 1")
            .expect("FEN should parse");
        assert_eq!(game.status, GameStatus::Checkmate);
        assert!(game.is_game_over());
        assert!(game.is_in_check().expect("kings present"));
        assert_eq!(game.ensure_in_progress(), Err(ChessError::GameOver));
        assert_eq!(game.make_uci_move("a2a3"), Err(ChessError::GameOver));
        assert_eq!(game.side_to_move, Color::Light);
    }
}
