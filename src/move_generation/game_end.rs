//! Game-end classification for the side to move.

use crate::errors::ChessResult;
use crate::game_state::chess_types::GameStatus;
use crate::game_state::game_state::GameState;
use crate::move_generation::legal_move_checks::is_king_in_check;
use crate::move_generation::legal_move_generator::has_any_legal_move;

/// `Check`/`Active` while the side to move has a legal move, otherwise
/// `Checkmate`/`Stalemate` depending on whether its king is attacked.
/// A missing king surfaces as `MissingKing`.
pub fn detect_game_status(game_state: &GameState) -> ChessResult<GameStatus> {
    let in_check = is_king_in_check(&game_state.board, game_state.side_to_move)?;
    let has_moves = has_any_legal_move(game_state)?;

    Ok(match (has_moves, in_check) {
        (true, true) => GameStatus::Check,
        (true, false) => GameStatus::Active,
        (false, true) => GameStatus::Checkmate,
        (false, false) => GameStatus::Stalemate,
    })
}
