//! Pawn movement pattern.
//!
//! Single and double advances onto empty squares, diagonal captures, and the
//! diagonal step onto the en-passant target.

use crate::game_state::chess_types::{Board, Color, PieceKind, Square};

/// Column deltas of the two capture diagonals.
pub const PAWN_CAPTURE_COLS: [i8; 2] = [-1, 1];

pub fn pawn_destinations(
    board: &Board,
    from: Square,
    color: Color,
    en_passant_square: Option<Square>,
    out: &mut Vec<Square>,
) {
    let direction = color.pawn_direction();

    if let Some(one_step) = from.offset(direction, 0) {
        if board.is_empty(one_step) {
            out.push(one_step);

            if from.row == color.pawn_start_row() {
                if let Some(two_step) = from.offset(2 * direction, 0) {
                    if board.is_empty(two_step) {
                        out.push(two_step);
                    }
                }
            }
        }
    }

    for col_delta in PAWN_CAPTURE_COLS {
        let Some(to) = from.offset(direction, col_delta) else {
            continue;
        };

        match board.piece_at(to) {
            Some(target) if target.color != color => out.push(to),
            None if en_passant_square == Some(to)
                && has_en_passant_victim(board, from, to, color) =>
            {
                out.push(to)
            }
            _ => {}
        }
    }
}

/// The pawn that double-stepped sits beside the capturer, on the
/// destination's column.
#[inline]
pub fn en_passant_victim_square(from: Square, to: Square) -> Square {
    Square::at(from.row, to.col)
}

fn has_en_passant_victim(board: &Board, from: Square, to: Square, color: Color) -> bool {
    matches!(
        board.piece_at(en_passant_victim_square(from, to)),
        Some(victim) if victim.kind == PieceKind::Pawn && victim.color != color
    )
}

#[cfg(test)]
mod tests {
    use super::pawn_destinations;
    use crate::game_state::chess_types::{Color, Square};
    use crate::utils::algebraic::algebraic_to_square;
    use crate::utils::fen_parser::parse_fen;

    fn sq(name: &str) -> Square {
        algebraic_to_square(name).expect("test square should parse")
    }

    #[test]
    fn start_rank_pawn_has_single_and_double_advance() {
        let game = parse_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").expect("FEN should parse");
        let mut out = Vec::new();
        pawn_destinations(&game.board, sq("e2"), Color::Light, None, &mut out);
        assert_eq!(out, vec![sq("e3"), sq("e4")]);
    }

    #[test]
    fn blocked_pawn_cannot_jump() {
        let game = parse_fen("4k3/8/8/8/8/4n3/4P3/4K3 w - - 0 1").expect("FEN should parse");
        let mut out = Vec::new();
        pawn_destinations(&game.board, sq("e2"), Color::Light, None, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn captures_diagonally_and_onto_en_passant_target() {
        let game = parse_fen("4k3/8/8/3pPp2/8/8/8/4K3 w - d6 0 1").expect("FEN should parse");
        let mut out = Vec::new();
        pawn_destinations(
            &game.board,
            sq("e5"),
            Color::Light,
            game.en_passant_square,
            &mut out,
        );
        assert!(out.contains(&sq("e6")));
        assert!(out.contains(&sq("d6")));
        assert!(!out.contains(&sq("f6")));
    }

    #[test]
    fn dark_pawns_advance_toward_row_seven() {
        let game = parse_fen("4k3/3p4/2N5/8/8/8/8/4K3 b - - 0 1").expect("FEN should parse");
        let mut out = Vec::new();
        pawn_destinations(&game.board, sq("d7"), Color::Dark, None, &mut out);
        assert_eq!(out, vec![sq("d6"), sq("d5"), sq("c6")]);
    }
}
