use crate::game_state::chess_types::{Board, Color, Square};
use crate::moves::bishop_moves::bishop_destinations;
use crate::moves::rook_moves::rook_destinations;

pub fn queen_destinations(board: &Board, from: Square, color: Color, out: &mut Vec<Square>) {
    rook_destinations(board, from, color, out);
    bishop_destinations(board, from, color, out);
}
