use crate::game_state::chess_types::{Board, Color, Square};

pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

pub fn rook_destinations(board: &Board, from: Square, color: Color, out: &mut Vec<Square>) {
    for direction in ROOK_DIRECTIONS {
        trace_ray(board, from, color, direction, out);
    }
}

/// Step along one direction until the board edge, an own piece (excluded)
/// or an enemy piece (included as a capture).
pub fn trace_ray(
    board: &Board,
    from: Square,
    color: Color,
    (row_step, col_step): (i8, i8),
    out: &mut Vec<Square>,
) {
    let mut cursor = from.offset(row_step, col_step);
    while let Some(to) = cursor {
        match board.piece_at(to) {
            None => out.push(to),
            Some(piece) => {
                if piece.color != color {
                    out.push(to);
                }
                break;
            }
        }
        cursor = to.offset(row_step, col_step);
    }
}
