//! In-process stand-in for an external UCI engine.
//!
//! Runs on its own thread and speaks the same line protocol as a real engine:
//! it answers the handshake, tracks the position it is given, streams a few
//! `info depth` lines and finishes with `bestmove`. Move choice is shallow on
//! purpose: a small opening book at high skill, otherwise a legal move with a
//! bias toward the most valuable capture. Misbehaving variants exist so the
//! timeout and fallback paths can be exercised without a real binary.

use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game_state::chess_rules::king_home;
use crate::errors::ChessResult;
use crate::game_state::chess_types::PieceKind;
use crate::game_state::game_state::GameState;
use crate::move_generation::legal_move_generator::LegalMoveGenerator;
use crate::move_generation::move_generator::{GeneratedMove, MoveGenerator};
use crate::moves::move_descriptions::ChessMove;
use crate::uci::collaborator::ChannelCollaborator;
use crate::uci::uci_protocol::{skill_to_depth, UciCommand, MAX_SKILL_LEVEL};
use crate::utils::long_algebraic::decode_uci_move;

const ENGINE_NAME: &str = "Plum Simulated Engine";

/// Skill above which the opening book is consulted.
const BOOK_SKILL_THRESHOLD: u8 = 15;
/// At most this many `info depth` lines precede `bestmove`.
const MAX_REPORTED_DEPTH: u8 = 5;

const BOOK_FIRST_MOVES: [&str; 4] = ["e2e4", "d2d4", "g1f3", "c2c4"];
const BOOK_REPLIES: [(&str, &[&str]); 4] = [
    ("e2e4", &["e7e5", "c7c5", "e7e6", "c7c6"]),
    ("d2d4", &["d7d5", "g8f6", "e7e6", "c7c5"]),
    ("g1f3", &["g8f6", "d7d5", "c7c5", "g7g6"]),
    ("c2c4", &["e7e5", "g8f6", "c7c5", "e7e6"]),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SimulatedBehavior {
    /// Answers every request with a legal move.
    #[default]
    Cooperative,
    /// Completes the handshake but never answers `go`.
    Silent,
    /// Answers `go` with an `Error:` line.
    Failing,
    /// Answers `go` with a well-formed but illegal move.
    IllegalReplies,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedConfig {
    pub behavior: SimulatedBehavior,
    /// Pause before each reported depth.
    pub think_step: Duration,
    pub seed: Option<u64>,
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            behavior: SimulatedBehavior::Cooperative,
            think_step: Duration::from_millis(50),
            seed: None,
        }
    }
}

/// Start the simulator thread and return the channel pair wrapped as a
/// collaborator. The thread ends on `quit` or when the collaborator is
/// dropped.
pub fn spawn_simulated_collaborator(config: SimulatedConfig) -> ChannelCollaborator {
    let (command_tx, command_rx) = channel::<String>();
    let (reply_tx, reply_rx) = channel::<String>();

    thread::spawn(move || {
        let mut engine = SimulatedEngine::new(config, reply_tx);
        engine.run(&command_rx);
    });

    ChannelCollaborator::new(ENGINE_NAME, command_tx, reply_rx)
}

struct SimulatedEngine {
    config: SimulatedConfig,
    replies: Sender<String>,
    position: GameState,
    skill_level: u8,
    search_depth: u8,
    book: HashMap<String, Vec<ChessMove>>,
    rng: StdRng,
    move_generator: LegalMoveGenerator,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SearchEnd {
    Finished,
    Quit,
}

#[derive(Clone, Copy)]
enum SearchLimit {
    Depth(u8),
    /// Report depths only while they fit in the budget.
    MoveTime(Duration),
}

impl SimulatedEngine {
    fn new(config: SimulatedConfig, replies: Sender<String>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            replies,
            position: GameState::new_game(),
            skill_level: MAX_SKILL_LEVEL,
            search_depth: skill_to_depth(MAX_SKILL_LEVEL),
            book: build_opening_book(),
            rng,
            move_generator: LegalMoveGenerator,
        }
    }

    fn reply(&self, line: impl Into<String>) -> bool {
        self.replies.send(line.into()).is_ok()
    }

    fn run(&mut self, commands: &Receiver<String>) {
        for line in commands {
            let Some(command) = UciCommand::parse(&line) else {
                continue;
            };

            let keep_going = match command {
                UciCommand::Uci => {
                    self.reply(format!("id name {ENGINE_NAME}"))
                        && self.reply(format!(
                            "option name Skill Level type spin default {MAX_SKILL_LEVEL} \
                             min 0 max {MAX_SKILL_LEVEL}"
                        ))
                        && self.reply("uciok")
                }
                UciCommand::IsReady => self.reply("readyok"),
                UciCommand::UciNewGame => {
                    self.position = GameState::new_game();
                    true
                }
                UciCommand::PositionFen(fen) => match GameState::from_fen(&fen) {
                    Ok(position) => {
                        self.position = position;
                        true
                    }
                    Err(err) => self.reply(format!("Error: rejected position: {err}")),
                },
                UciCommand::PositionStartMoves(moves) => match replay_from_start(&moves) {
                    Ok(position) => {
                        self.position = position;
                        true
                    }
                    Err(err) => self.reply(format!("Error: rejected move list: {err}")),
                },
                UciCommand::SetSkillLevel(level) => {
                    self.skill_level = level.min(MAX_SKILL_LEVEL);
                    self.search_depth = skill_to_depth(self.skill_level);
                    true
                }
                UciCommand::GoDepth(depth) => {
                    self.search(SearchLimit::Depth(depth), commands) == SearchEnd::Finished
                }
                UciCommand::GoMoveTime(ms) => {
                    let budget = Duration::from_millis(ms);
                    self.search(SearchLimit::MoveTime(budget), commands) == SearchEnd::Finished
                }
                // Idle; nothing to stop.
                UciCommand::Stop => true,
                UciCommand::Quit => false,
            };

            if !keep_going {
                break;
            }
        }
    }

    fn search(&mut self, limit: SearchLimit, commands: &Receiver<String>) -> SearchEnd {
        match self.config.behavior {
            SimulatedBehavior::Silent => return SearchEnd::Finished,
            SimulatedBehavior::Failing => {
                self.reply("Error: simulated search failure");
                return SearchEnd::Finished;
            }
            SimulatedBehavior::IllegalReplies => {
                let bogus = self.illegal_move();
                self.reply(format!("bestmove {bogus}"));
                return SearchEnd::Finished;
            }
            SimulatedBehavior::Cooperative => {}
        }

        let (depth, deadline) = match limit {
            SearchLimit::Depth(depth) => (depth.min(self.search_depth).max(1), None),
            SearchLimit::MoveTime(budget) => (self.search_depth, Some(Instant::now() + budget)),
        };
        for d in 1..=depth.min(MAX_REPORTED_DEPTH) {
            if deadline.is_some_and(|end| Instant::now() + self.config.think_step > end) {
                break;
            }
            match commands.recv_timeout(self.config.think_step) {
                Ok(line) => match UciCommand::parse(&line) {
                    Some(UciCommand::Stop) => break,
                    Some(UciCommand::Quit) => return SearchEnd::Quit,
                    _ => {}
                },
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return SearchEnd::Quit,
            }

            let score: i32 = self.rng.random_range(-25..=25);
            let nodes = u64::from(d) * 1_000_000;
            self.reply(format!(
                "info depth {d} score cp {score} nodes {nodes} nps {} time {}",
                nodes / 10,
                u64::from(d) * 100
            ));
        }

        match self.choose_move() {
            Some(mv) => self.reply(format!("bestmove {mv}")),
            None => self.reply("bestmove (none)"),
        };
        SearchEnd::Finished
    }

    fn choose_move(&mut self) -> Option<ChessMove> {
        let legal = self
            .move_generator
            .generate_legal_moves(&self.position)
            .ok()?;
        let candidates: Vec<&GeneratedMove> = legal
            .iter()
            .filter(|mv| matches!(mv.chess_move.promotion, None | Some(PieceKind::Queen)))
            .collect();

        if self.skill_level > BOOK_SKILL_THRESHOLD {
            if let Some(book_moves) = self.book.get(&position_key(&self.position)) {
                let playable: Vec<ChessMove> = book_moves
                    .iter()
                    .copied()
                    .filter(|mv| candidates.iter().any(|c| c.chess_move == *mv))
                    .collect();
                if let Some(mv) = playable.choose(&mut self.rng) {
                    return Some(*mv);
                }
            }
        }

        let greed = f64::from(self.skill_level) / f64::from(MAX_SKILL_LEVEL);
        let best_capture = candidates
            .iter()
            .filter(|mv| mv.annotations.is_capture)
            .max_by_key(|mv| self.capture_value(mv));
        if let Some(capture) = best_capture {
            if self.rng.random_bool(greed) {
                return Some(capture.chess_move);
            }
        }

        candidates.choose(&mut self.rng).map(|mv| mv.chess_move)
    }

    fn capture_value(&self, mv: &GeneratedMove) -> u32 {
        if mv.annotations.is_en_passant {
            return piece_value(PieceKind::Pawn);
        }
        self.position
            .board
            .piece_at(mv.chess_move.to)
            .map(|piece| piece_value(piece.kind))
            .unwrap_or(0)
    }

    /// The side to move's king "moving" onto its own square.
    fn illegal_move(&self) -> ChessMove {
        let king = self
            .position
            .board
            .find_king(self.position.side_to_move)
            .unwrap_or_else(|| king_home(self.position.side_to_move));
        ChessMove::new(king, king)
    }
}

fn replay_from_start(moves: &[ChessMove]) -> ChessResult<GameState> {
    let mut position = GameState::new_game();
    for &mv in moves {
        position.make_move(mv)?;
    }
    Ok(position)
}

fn piece_value(kind: PieceKind) -> u32 {
    match kind {
        PieceKind::Pawn => 1,
        PieceKind::Knight | PieceKind::Bishop => 3,
        PieceKind::Rook => 5,
        PieceKind::Queen => 9,
        PieceKind::King => 0,
    }
}

/// Piece placement plus side to move; enough to key early-game positions.
fn position_key(game_state: &GameState) -> String {
    game_state
        .get_fen()
        .split_whitespace()
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
}

fn build_opening_book() -> HashMap<String, Vec<ChessMove>> {
    let mut book = HashMap::new();
    let start = GameState::new_game();

    let first_moves: Vec<ChessMove> = BOOK_FIRST_MOVES
        .iter()
        .filter_map(|text| decode_uci_move(text).ok())
        .collect();
    book.insert(position_key(&start), first_moves);

    for (first, replies) in BOOK_REPLIES {
        let mut after = start.clone();
        if after.make_uci_move(first).is_err() {
            continue;
        }
        let replies: Vec<ChessMove> = replies
            .iter()
            .filter_map(|text| decode_uci_move(text).ok())
            .collect();
        book.insert(position_key(&after), replies);
    }

    book
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::{
        build_opening_book, position_key, spawn_simulated_collaborator, SimulatedBehavior,
        SimulatedConfig, BOOK_FIRST_MOVES,
    };
    use crate::game_state::game_state::GameState;
    use crate::uci::collaborator::Collaborator;
    use crate::uci::uci_protocol::{UciCommand, UciResponse};
    use crate::utils::long_algebraic::decode_uci_move;

    fn quick(behavior: SimulatedBehavior) -> SimulatedConfig {
        SimulatedConfig {
            behavior,
            think_step: Duration::from_millis(1),
            seed: Some(7),
        }
    }

    fn wait_for_bestmove(collaborator: &mut dyn Collaborator) -> (usize, UciResponse) {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut infos = 0usize;
        while Instant::now() < deadline {
            let line = collaborator
                .recv_line(Duration::from_millis(100))
                .expect("simulator stays connected");
            let Some(line) = line else {
                continue;
            };
            match UciResponse::parse(&line) {
                UciResponse::Info(_) => infos += 1,
                other @ (UciResponse::BestMove(_) | UciResponse::Error(_)) => return (infos, other),
                _ => {}
            }
        }
        panic!("simulator did not answer in time");
    }

    #[test]
    fn book_covers_start_and_first_replies() {
        let book = build_opening_book();
        assert_eq!(book.len(), 5);
        let start = GameState::new_game();
        assert_eq!(
            book.get(&position_key(&start)).map(Vec::len),
            Some(BOOK_FIRST_MOVES.len())
        );
    }

    #[test]
    fn handshake_then_legal_bestmove() {
        let mut sim = spawn_simulated_collaborator(quick(SimulatedBehavior::Cooperative));
        sim.send(&UciCommand::Uci).expect("send");
        sim.send(&UciCommand::IsReady).expect("send");

        let mut seen = Vec::new();
        while seen.last().map(String::as_str) != Some("readyok") {
            let line = sim
                .recv_line(Duration::from_secs(5))
                .expect("connected")
                .expect("handshake reply");
            seen.push(line);
        }
        assert!(seen.iter().any(|l| l == "uciok"));

        let position = "4k3/8/8/8/8/8/8/R3K3 w - - 0 1";
        sim.send(&UciCommand::SetSkillLevel(5)).expect("send");
        sim.send(&UciCommand::PositionFen(position.to_owned()))
            .expect("send");
        sim.send(&UciCommand::GoDepth(3)).expect("send");

        let (infos, reply) = wait_for_bestmove(&mut sim);
        assert_eq!(infos, 3);
        let UciResponse::BestMove(Some(mv)) = reply else {
            panic!("expected a move, got {reply:?}");
        };
        let game = GameState::from_fen(position).expect("FEN should parse");
        assert!(game.legal_moves().expect("generation").contains(&mv));
    }

    #[test]
    fn high_skill_opens_from_the_book() {
        let mut sim = spawn_simulated_collaborator(quick(SimulatedBehavior::Cooperative));
        sim.send(&UciCommand::UciNewGame).expect("send");
        sim.send(&UciCommand::PositionFen(GameState::new_game().get_fen()))
            .expect("send");
        sim.send(&UciCommand::GoDepth(1)).expect("send");

        let (_, reply) = wait_for_bestmove(&mut sim);
        let book: Vec<_> = BOOK_FIRST_MOVES
            .iter()
            .map(|text| decode_uci_move(text).expect("book move decodes"))
            .collect();
        let UciResponse::BestMove(Some(mv)) = reply else {
            panic!("expected a move, got {reply:?}");
        };
        assert!(book.contains(&mv));
    }

    #[test]
    fn follows_move_history_and_time_budget() {
        let mut sim = spawn_simulated_collaborator(SimulatedConfig {
            think_step: Duration::from_millis(20),
            ..quick(SimulatedBehavior::Cooperative)
        });
        let history: Vec<_> = ["e2e4", "e7e5", "g1f3"]
            .iter()
            .map(|text| decode_uci_move(text).expect("decodes"))
            .collect();
        sim.send(&UciCommand::PositionStartMoves(history.clone()))
            .expect("send");
        sim.send(&UciCommand::GoMoveTime(50)).expect("send");

        let (infos, reply) = wait_for_bestmove(&mut sim);
        assert!(infos <= 2, "{infos} depths reported inside a 50 ms budget");
        let UciResponse::BestMove(Some(mv)) = reply else {
            panic!("expected a move, got {reply:?}");
        };
        let mut game = GameState::new_game();
        for played in history {
            game.make_move(played).expect("history is legal");
        }
        assert!(game.legal_moves().expect("generation").contains(&mv));

        sim.send(&UciCommand::PositionStartMoves(vec![
            decode_uci_move("e2e5").expect("decodes"),
        ]))
        .expect("send");
        assert!(matches!(wait_for_bestmove(&mut sim).1, UciResponse::Error(_)));
    }

    #[test]
    fn misbehaving_variants() {
        let mut failing = spawn_simulated_collaborator(quick(SimulatedBehavior::Failing));
        failing.send(&UciCommand::GoDepth(1)).expect("send");
        assert!(matches!(wait_for_bestmove(&mut failing).1, UciResponse::Error(_)));

        let mut illegal = spawn_simulated_collaborator(quick(SimulatedBehavior::IllegalReplies));
        illegal.send(&UciCommand::GoDepth(1)).expect("send");
        let (_, reply) = wait_for_bestmove(&mut illegal);
        let UciResponse::BestMove(Some(mv)) = reply else {
            panic!("expected a decodable move, got {reply:?}");
        };
        assert_eq!(mv.from, mv.to);

        let mut silent = spawn_simulated_collaborator(quick(SimulatedBehavior::Silent));
        silent.send(&UciCommand::GoDepth(1)).expect("send");
        assert_eq!(
            silent
                .recv_line(Duration::from_millis(50))
                .expect("connected"),
            None
        );
    }

    #[test]
    fn checkmated_position_reports_no_move() {
        let mut sim = spawn_simulated_collaborator(quick(SimulatedBehavior::Cooperative));
        sim.send(&UciCommand::PositionFen(
            "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 0 1".to_owned(),
        ))
        .expect("send");
        sim.send(&UciCommand::GoDepth(2)).expect("send");
        assert_eq!(wait_for_bestmove(&mut sim).1, UciResponse::BestMove(None));
    }
}
