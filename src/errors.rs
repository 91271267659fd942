//! Error type shared by the rule engine, the notation bridge and the
//! collaborator layer.

use thiserror::Error;

use crate::game_state::chess_types::Color;

pub type ChessResult<T> = Result<T, ChessError>;

/// Represents all error kinds surfaced by the crate.
///
/// Rule-engine errors never leave a `GameState` partially mutated: move
/// application either produces a complete successor or fails untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    /// The requested move is not in the legality-filtered move set.
    #[error("illegal move: {0}")]
    IllegalMove(String),
    /// A row/column or algebraic square lies outside the board.
    #[error("invalid square: {0}")]
    InvalidSquare(String),
    /// A FEN, UCI or collaborator string could not be parsed.
    #[error("malformed notation: {0}")]
    MalformedNotation(String),
    /// The position has no king for the given color. This is a corrupted
    /// position, never a game outcome.
    #[error("no {0:?} king on the board")]
    MissingKing(Color),
    /// A move was requested after checkmate or stalemate.
    #[error("game is over")]
    GameOver,
    /// The move-suggestion collaborator failed, disconnected or replied
    /// with something unusable.
    #[error("collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),
    /// The collaborator stayed silent past the configured bound.
    #[error("collaborator timed out after {0} ms")]
    CollaboratorTimeout(u64),
}
