//! Local move selector used when no collaborator is available.
//!
//! Prefers moves that give check, then captures, then anything legal,
//! choosing uniformly inside the first non-empty bucket. Pawns always promote
//! to a queen.

use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::engines::engine_trait::{EngineOutput, GoParams, MoveSelector};
use crate::errors::ChessResult;
use crate::game_state::chess_types::PieceKind;
use crate::game_state::game_state::GameState;
use crate::move_generation::legal_move_generator::LegalMoveGenerator;
use crate::move_generation::move_generator::{GeneratedMove, MoveGenerator};

pub struct HeuristicFallbackSelector {
    move_generator: LegalMoveGenerator,
    rng: StdRng,
}

impl HeuristicFallbackSelector {
    pub fn new() -> Self {
        Self {
            move_generator: LegalMoveGenerator,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic choices for reproducible games and tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            move_generator: LegalMoveGenerator,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for HeuristicFallbackSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveSelector for HeuristicFallbackSelector {
    fn name(&self) -> &str {
        "heuristic_fallback"
    }

    fn choose_move(
        &mut self,
        game_state: &GameState,
        _params: &GoParams,
    ) -> ChessResult<EngineOutput> {
        let legal_moves = self.move_generator.generate_legal_moves(game_state)?;
        let candidates: Vec<&GeneratedMove> = legal_moves
            .iter()
            .filter(|mv| matches!(mv.chess_move.promotion, None | Some(PieceKind::Queen)))
            .collect();

        let checks: Vec<&GeneratedMove> = candidates
            .iter()
            .copied()
            .filter(|mv| mv.annotations.gives_check)
            .collect();
        let captures: Vec<&GeneratedMove> = candidates
            .iter()
            .copied()
            .filter(|mv| mv.annotations.is_capture)
            .collect();

        let (bucket_name, bucket) = if !checks.is_empty() {
            ("check", checks)
        } else if !captures.is_empty() {
            ("capture", captures)
        } else {
            ("any", candidates)
        };

        let mut out = EngineOutput::default();
        out.info_lines.push(format!(
            "info string heuristic_fallback legal_moves {} bucket {} size {}",
            legal_moves.len(),
            bucket_name,
            bucket.len()
        ));

        out.best_move = bucket.choose(&mut self.rng).map(|mv| mv.chess_move);
        Ok(out)
    }
}
