//! Leaf counting over the legal move tree, used to validate the rules
//! against published node counts.

use std::ops::AddAssign;
use std::thread;

use crate::errors::ChessResult;
use crate::game_state::game_state::GameState;
use crate::move_generation::move_generator::{GeneratedMove, MoveGenerator};
use crate::moves::move_descriptions::ChessMove;

/// Leaf totals, broken down by what the last move did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: usize,
    pub captures: usize,
    pub en_passant: usize,
    pub castles: usize,
    pub promotions: usize,
    pub checks: usize,
    pub checkmates: usize,
}

impl PerftCounts {
    const ROOT: PerftCounts = PerftCounts {
        nodes: 1,
        captures: 0,
        en_passant: 0,
        castles: 0,
        promotions: 0,
        checks: 0,
        checkmates: 0,
    };

    fn leaf(mv: &GeneratedMove) -> Self {
        let notes = mv.annotations;
        PerftCounts {
            nodes: 1,
            captures: usize::from(notes.is_capture),
            en_passant: usize::from(notes.is_en_passant),
            castles: usize::from(notes.is_castle),
            promotions: usize::from(notes.is_promotion),
            checks: usize::from(notes.gives_check),
            checkmates: usize::from(notes.is_checkmate),
        }
    }
}

impl AddAssign for PerftCounts {
    fn add_assign(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.en_passant += rhs.en_passant;
        self.castles += rhs.castles;
        self.promotions += rhs.promotions;
        self.checks += rhs.checks;
        self.checkmates += rhs.checkmates;
    }
}

pub fn perft<G: MoveGenerator + ?Sized>(
    generator: &G,
    game_state: &GameState,
    depth: u8,
) -> ChessResult<PerftCounts> {
    if depth == 0 {
        return Ok(PerftCounts::ROOT);
    }

    let mut total = PerftCounts::default();
    for root in generator.generate_legal_moves(game_state)? {
        total += count_below(generator, &root, depth - 1)?;
    }
    Ok(total)
}

/// Node count under each root move, in generation order. The usual tool for
/// bisecting a miscount against a reference engine.
pub fn perft_divide<G: MoveGenerator + ?Sized>(
    generator: &G,
    game_state: &GameState,
    depth: u8,
) -> ChessResult<Vec<(ChessMove, usize)>> {
    if depth == 0 {
        return Ok(Vec::new());
    }

    generator
        .generate_legal_moves(game_state)?
        .iter()
        .map(|root| -> ChessResult<(ChessMove, usize)> {
            let below = count_below(generator, root, depth - 1)?;
            Ok((root.chess_move, below.nodes))
        })
        .collect()
}

/// Same counts as `perft`, with each root move's subtree on its own scoped
/// thread.
pub fn perft_parallel<G: MoveGenerator + ?Sized>(
    generator: &G,
    game_state: &GameState,
    depth: u8,
) -> ChessResult<PerftCounts> {
    if depth == 0 {
        return Ok(PerftCounts::ROOT);
    }

    let roots = generator.generate_legal_moves(game_state)?;
    thread::scope(|scope| -> ChessResult<PerftCounts> {
        let workers: Vec<_> = roots
            .iter()
            .map(|root| scope.spawn(move || count_below(generator, root, depth - 1)))
            .collect();

        let mut total = PerftCounts::default();
        for worker in workers {
            total += worker
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic))?;
        }
        Ok(total)
    })
}

/// Counts for the subtree `remaining` plies below an already generated move.
fn count_below<G: MoveGenerator + ?Sized>(
    generator: &G,
    mv: &GeneratedMove,
    remaining: u8,
) -> ChessResult<PerftCounts> {
    if remaining == 0 {
        return Ok(PerftCounts::leaf(mv));
    }

    let mut total = PerftCounts::default();
    for child in generator.generate_legal_moves(&mv.game_after_move)? {
        total += count_below(generator, &child, remaining - 1)?;
    }
    Ok(total)
}
