//! Move-selector abstraction used by the game session.
//!
//! Defines the request parameters and output payload shared by every way of
//! picking a move, so the session can swap selectors at runtime behind a
//! single trait interface.

use crate::errors::ChessResult;
use crate::game_state::game_state::GameState;
use crate::moves::move_descriptions::ChessMove;
use crate::uci::uci_protocol::AnalysisInfo;

#[derive(Debug, Clone, Default)]
pub struct GoParams {
    /// Explicit search depth; selectors derive one from skill when absent.
    pub depth: Option<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    /// `None` only when the side to move has no legal move.
    pub best_move: Option<ChessMove>,
    pub info_lines: Vec<String>,
    pub analysis: Option<AnalysisInfo>,
}

pub trait MoveSelector: Send {
    fn name(&self) -> &str;

    fn new_game(&mut self) -> ChessResult<()> {
        Ok(())
    }

    fn set_skill_level(&mut self, _level: u8) -> ChessResult<()> {
        Ok(())
    }

    /// Pick a move for the side to move. Never mutates `game_state`; the
    /// caller applies the returned move.
    fn choose_move(
        &mut self,
        game_state: &GameState,
        params: &GoParams,
    ) -> ChessResult<EngineOutput>;
}
