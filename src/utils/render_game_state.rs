//! Terminal-oriented Unicode board renderer.
//!
//! Draws the mailbox board with rank 8 at the top, optionally marking a set
//! of squares (e.g. the legal destinations of a selected piece).

use crate::game_state::{chess_types::*, game_state::GameState};

const FILE_LABELS: &str = "  a b c d e f g h";

/// Render the board to a Unicode string for terminal output.
pub fn render_game_state(game_state: &GameState) -> String {
    render_with_marks(game_state, &[])
}

/// Like `render_game_state`, with `marks` drawn as `*` where the square is
/// empty.
pub fn render_with_marks(game_state: &GameState, marks: &[Square]) -> String {
    let mut out = String::new();

    out.push_str(FILE_LABELS);
    out.push('\n');

    for row in 0..8u8 {
        let rank_label = char::from(b'8' - row);
        out.push(rank_label);
        out.push(' ');

        for col in 0..8u8 {
            let square = Square::at(row, col);
            let ch = match game_state.board.piece_at(square) {
                Some(piece) => piece_to_unicode(piece),
                None if marks.contains(&square) => '*',
                None => '·',
            };
            out.push(ch);

            if col < 7 {
                out.push(' ');
            }
        }

        out.push(' ');
        out.push(rank_label);
        out.push('\n');
    }

    out.push_str(FILE_LABELS);
    out
}

/// One-line summary shown under the board.
pub fn render_status_line(game_state: &GameState) -> String {
    let side = match game_state.side_to_move {
        Color::Light => "White",
        Color::Dark => "Black",
    };
    match game_state.status {
        GameStatus::Active => format!("{side} to move"),
        GameStatus::Check => format!("{side} to move, in check"),
        GameStatus::Checkmate => format!("Checkmate, {side} has lost"),
        GameStatus::Stalemate => "Stalemate, draw".to_owned(),
    }
}

fn piece_to_unicode(piece: Piece) -> char {
    match (piece.color, piece.kind) {
        (Color::Light, PieceKind::Pawn) => '♙',
        (Color::Light, PieceKind::Knight) => '♘',
        (Color::Light, PieceKind::Bishop) => '♗',
        (Color::Light, PieceKind::Rook) => '♖',
        (Color::Light, PieceKind::Queen) => '♕',
        (Color::Light, PieceKind::King) => '♔',
        (Color::Dark, PieceKind::Pawn) => '♟',
        (Color::Dark, PieceKind::Knight) => '♞',
        (Color::Dark, PieceKind::Bishop) => '♝',
        (Color::Dark, PieceKind::Rook) => '♜',
        (Color::Dark, PieceKind::Queen) => '♛',
        (Color::Dark, PieceKind::King) => '♚',
    }
}

#[cfg(test)]
mod tests {
    use super::{render_game_state, render_status_line, render_with_marks};
    use crate::game_state::game_state::GameState;
    use crate::utils::algebraic::algebraic_to_square;

    #[test]
    fn rank_eight_is_drawn_first() {
        let text = render_game_state(&GameState::new_game());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[1], "8 ♜ ♞ ♝ ♛ ♚ ♝ ♞ ♜ 8");
        assert_eq!(lines[8], "1 ♖ ♘ ♗ ♕ ♔ ♗ ♘ ♖ 1");
    }

    #[test]
    fn marks_only_show_on_empty_squares() {
        let game = GameState::new_game();
        let marks = [
            algebraic_to_square("e4").expect("e4"),
            algebraic_to_square("e2").expect("e2"),
        ];
        let text = render_with_marks(&game, &marks);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[5], "4 · · · · * · · · 4");
        assert_eq!(lines[7], "2 ♙ ♙ ♙ ♙ ♙ ♙ ♙ ♙ 2");
        assert_eq!(render_status_line(&game), "White to move");
    }
}
