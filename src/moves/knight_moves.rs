use crate::game_state::chess_types::{Board, Color, Square};

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

pub fn knight_destinations(board: &Board, from: Square, color: Color, out: &mut Vec<Square>) {
    for (row_delta, col_delta) in KNIGHT_OFFSETS {
        let Some(to) = from.offset(row_delta, col_delta) else {
            continue;
        };
        match board.piece_at(to) {
            Some(piece) if piece.color == color => {}
            _ => out.push(to),
        }
    }
}
