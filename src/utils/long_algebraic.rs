//! UCI long-algebraic move strings.
//!
//! A move is origin square, destination square and an optional lowercase
//! promotion letter, e.g. `e2e4` or `e7e8q`. Decoding is purely syntactic;
//! legality is judged later by the move applier.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::PieceKind;
use crate::moves::move_descriptions::ChessMove;
use crate::utils::algebraic::algebraic_to_square;

pub fn decode_uci_move(text: &str) -> ChessResult<ChessMove> {
    let text = text.trim();
    if !text.is_ascii() || (text.len() != 4 && text.len() != 5) {
        return Err(ChessError::MalformedNotation(format!(
            "invalid UCI move: '{text}'"
        )));
    }

    let malformed = |_| ChessError::MalformedNotation(format!("invalid UCI move: '{text}'"));
    let from = algebraic_to_square(&text[0..2]).map_err(malformed)?;
    let to = algebraic_to_square(&text[2..4]).map_err(malformed)?;

    match text[4..].chars().next() {
        None => Ok(ChessMove::new(from, to)),
        Some(ch) => {
            let promotion = char_to_promotion(ch).ok_or_else(|| {
                ChessError::MalformedNotation(format!("invalid promotion letter in '{text}'"))
            })?;
            Ok(ChessMove::with_promotion(from, to, promotion))
        }
    }
}

#[inline]
pub fn encode_uci_move(chess_move: ChessMove) -> String {
    chess_move.to_string()
}

/// Extract the move from a `bestmove <uci> [ponder <uci>]` reply. Anything
/// malformed, including `bestmove (none)`, yields `None`.
pub fn parse_bestmove(line: &str) -> Option<ChessMove> {
    let mut tokens = line.split_whitespace();
    tokens.find(|&token| token == "bestmove")?;
    decode_uci_move(tokens.next()?).ok()
}

fn char_to_promotion(ch: char) -> Option<PieceKind> {
    match ch {
        'n' => Some(PieceKind::Knight),
        'b' => Some(PieceKind::Bishop),
        'r' => Some(PieceKind::Rook),
        'q' => Some(PieceKind::Queen),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_uci_move, encode_uci_move, parse_bestmove};
    use crate::errors::ChessError;
    use crate::game_state::chess_types::{PieceKind, Square};

    #[test]
    fn promotion_move_uses_rank_eight_as_row_zero() {
        let mv = decode_uci_move("e7e8q").expect("move should decode");
        assert_eq!(mv.from, Square::new(1, 4).expect("in range"));
        assert_eq!(mv.to, Square::new(0, 4).expect("in range"));
        assert_eq!(mv.promotion, Some(PieceKind::Queen));
        assert_eq!(encode_uci_move(mv), "e7e8q");
    }

    #[test]
    fn plain_move_has_no_promotion() {
        let mv = decode_uci_move("g1f3").expect("move should decode");
        assert_eq!(mv.from, Square::new(7, 6).expect("in range"));
        assert_eq!(mv.to, Square::new(5, 5).expect("in range"));
        assert_eq!(mv.promotion, None);
    }

    #[test]
    fn malformed_moves_are_rejected() {
        for text in ["", "e2", "e2e9", "i2e4", "e7e8k", "e7e8Q", "e2e4e5", "é2e4"] {
            assert!(
                matches!(decode_uci_move(text), Err(ChessError::MalformedNotation(_))),
                "'{text}' should not decode"
            );
        }
    }

    #[test]
    fn bestmove_lines() {
        assert_eq!(
            parse_bestmove("bestmove e2e4 ponder e7e5").map(encode_uci_move),
            Some("e2e4".to_owned())
        );
        assert_eq!(
            parse_bestmove("bestmove a7a8n").map(|mv| mv.promotion),
            Some(Some(PieceKind::Knight))
        );
        assert_eq!(parse_bestmove("bestmove (none)"), None);
        assert_eq!(parse_bestmove("bestmove"), None);
        assert_eq!(parse_bestmove("info depth 3 score cp 20"), None);
        assert_eq!(parse_bestmove("garbage"), None);
    }
}
