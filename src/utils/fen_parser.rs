//! FEN-to-GameState parser.
//!
//! Builds a complete position from a Forsyth-Edwards Notation string and
//! classifies it, so the returned state carries a correct `status`. The
//! clock fields are optional and, when present, only checked for being
//! numbers.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::{chess_types::*, game_state::GameState};
use crate::move_generation::game_end::detect_game_status;
use crate::move_generation::legal_move_checks::is_king_in_check;
use crate::utils::algebraic::algebraic_to_square;

fn malformed(message: impl Into<String>) -> ChessError {
    ChessError::MalformedNotation(message.into())
}

pub fn parse_fen(fen: &str) -> ChessResult<GameState> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if !(4..=6).contains(&fields.len()) {
        return Err(malformed(format!(
            "FEN needs 4 to 6 fields, found {}: '{fen}'",
            fields.len()
        )));
    }

    let mut game_state = GameState::new_empty();

    game_state.board = parse_board(fields[0])?;
    game_state.side_to_move = parse_side_to_move(fields[1])?;
    game_state.castling_rights = parse_castling_rights(fields[2])?;
    game_state.en_passant_square = parse_en_passant_square(fields[3])?;

    for clock in &fields[4..] {
        clock
            .parse::<u32>()
            .map_err(|_| malformed(format!("invalid clock field: {clock}")))?;
    }

    for color in [Color::Light, Color::Dark] {
        let kings = game_state.board.count(Piece::new(PieceKind::King, color));
        if kings != 1 {
            return Err(malformed(format!(
                "expected exactly one {color:?} king, found {kings}"
            )));
        }
    }

    // The side that just moved cannot have left its king attacked.
    let waiting = game_state.side_to_move.opposite();
    if is_king_in_check(&game_state.board, waiting)? {
        return Err(malformed(format!(
            "{waiting:?} king is in check but it is not {waiting:?} to move"
        )));
    }

    game_state.status = detect_game_status(&game_state)?;
    Ok(game_state)
}

fn parse_board(board_part: &str) -> ChessResult<Board> {
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err(malformed("board layout must contain 8 ranks"));
    }

    let mut board = Board::default();
    for (row, rank_str) in ranks.iter().enumerate() {
        let mut col = 0u8;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                if !(1..=8).contains(&empty_count) {
                    return Err(malformed(format!("invalid empty-square count '{ch}'")));
                }
                col += empty_count as u8;
                if col > 8 {
                    return Err(malformed(format!("rank '{rank_str}' has too many files")));
                }
                continue;
            }

            let piece = Piece::from_fen_char(ch)
                .ok_or_else(|| malformed(format!("invalid piece character '{ch}'")))?;
            if col >= 8 {
                return Err(malformed(format!("rank '{rank_str}' has too many files")));
            }

            board.set(Square::new(row as u8, col)?, Some(piece));
            col += 1;
        }

        if col != 8 {
            return Err(malformed(format!("rank '{rank_str}' does not sum to 8 files")));
        }
    }

    Ok(board)
}

fn parse_side_to_move(side_part: &str) -> ChessResult<Color> {
    match side_part {
        "w" => Ok(Color::Light),
        "b" => Ok(Color::Dark),
        _ => Err(malformed(format!("invalid side-to-move field: {side_part}"))),
    }
}

fn parse_castling_rights(castling_part: &str) -> ChessResult<CastlingRights> {
    let mut rights = CastlingRights::NONE;
    if castling_part == "-" {
        return Ok(rights);
    }

    for ch in castling_part.chars() {
        match ch {
            'K' => rights.light.king_side = true,
            'Q' => rights.light.queen_side = true,
            'k' => rights.dark.king_side = true,
            'q' => rights.dark.queen_side = true,
            _ => return Err(malformed(format!("invalid castling character: {ch}"))),
        }
    }

    Ok(rights)
}

fn parse_en_passant_square(en_passant_part: &str) -> ChessResult<Option<Square>> {
    if en_passant_part == "-" {
        return Ok(None);
    }

    let square = algebraic_to_square(en_passant_part)
        .map_err(|_| malformed(format!("invalid en-passant square: {en_passant_part}")))?;
    // Only the square a double step skipped over can be a target.
    if square.row != 2 && square.row != 5 {
        return Err(malformed(format!(
            "en-passant square {en_passant_part} is not on rank 3 or 6"
        )));
    }
    Ok(Some(square))
}
