use crate::game_state::chess_types::{Board, Color, Square};
use crate::moves::rook_moves::trace_ray;

pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

pub fn bishop_destinations(board: &Board, from: Square, color: Color, out: &mut Vec<Square>) {
    for direction in BISHOP_DIRECTIONS {
        trace_ray(board, from, color, direction, out);
    }
}
