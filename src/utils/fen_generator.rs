use crate::game_state::{chess_types::*, game_state::GameState};
use crate::utils::algebraic::square_to_algebraic;

/// Halfmove clock and fullmove number are not tracked; every FEN carries
/// these fixed placeholders.
const CLOCK_FIELDS: &str = "0 1";

pub fn generate_fen(game_state: &GameState) -> String {
    let board = generate_board_field(&game_state.board);
    let castling = generate_castling_field(game_state.castling_rights);
    let en_passant = game_state
        .en_passant_square
        .map(square_to_algebraic)
        .unwrap_or_else(|| "-".to_owned());

    format!(
        "{} {} {} {} {}",
        board,
        game_state.side_to_move.fen_char(),
        castling,
        en_passant,
        CLOCK_FIELDS
    )
}

fn generate_board_field(board: &Board) -> String {
    let mut out = String::new();

    for row in 0..8u8 {
        let mut empty_count = 0u8;

        for col in 0..8u8 {
            match board.piece_at(Square::at(row, col)) {
                Some(piece) => {
                    if empty_count > 0 {
                        out.push(char::from(b'0' + empty_count));
                        empty_count = 0;
                    }
                    out.push(piece.fen_char());
                }
                None => empty_count += 1,
            }
        }

        if empty_count > 0 {
            out.push(char::from(b'0' + empty_count));
        }

        if row < 7 {
            out.push('/');
        }
    }

    out
}

fn generate_castling_field(rights: CastlingRights) -> String {
    let mut out = String::new();

    if rights.light.king_side {
        out.push('K');
    }
    if rights.light.queen_side {
        out.push('Q');
    }
    if rights.dark.king_side {
        out.push('k');
    }
    if rights.dark.queen_side {
        out.push('q');
    }

    if out.is_empty() {
        out.push('-');
    }

    out
}
