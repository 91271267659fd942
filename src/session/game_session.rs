//! Orchestrating layer for an interactive game.
//!
//! Owns the authoritative `GameState`, the active selection strategy and both
//! selectors. Computer moves go to the collaborator while the strategy is
//! engine-backed; a timeout, an unusable reply or an illegal suggestion
//! switches the session to the heuristic fallback for good and the fallback
//! plays the move instead. Everything notable lands in a timestamped log.

use std::fmt;
use std::io::{self, Write};
use std::thread;

use chrono::{DateTime, Local};

use crate::engines::engine_backed::EngineBackedSelector;
use crate::engines::engine_heuristic::HeuristicFallbackSelector;
use crate::engines::engine_trait::{EngineOutput, GoParams, MoveSelector};
use crate::engines::selection_strategy::SelectionStrategy;
use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::{Color, GameStatus};
use crate::game_state::game_state::GameState;
use crate::moves::move_descriptions::ChessMove;
use crate::uci::collaborator::{Collaborator, CollaboratorConfig};
use crate::uci::uci_protocol::{AnalysisInfo, MAX_SKILL_LEVEL};
use crate::utils::algebraic::{algebraic_to_square, square_to_algebraic};
use crate::utils::render_game_state::{render_game_state, render_status_line, render_with_marks};

const HELP_TEXT: &str = "\
commands:
  <move>         play a move in UCI form, e.g. e2e4 or e7e8q
  moves <sq>     list legal destinations of the piece on <sq>
  go             let the computer move for the side to move
  undo           take back the last move
  new            start a new game
  load <fen>     set up a position from FEN
  fen            print the current position as FEN
  level <0-20>   set collaborator skill level
  board          redraw the board
  log            print the full session log
  quit           leave";

#[derive(Debug, Clone)]
pub struct SessionLogEntry {
    pub timestamp: DateTime<Local>,
    pub message: String,
}

impl fmt::Display for SessionLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S%.3f"), self.message)
    }
}

/// A computer move that has been applied to the session position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiMove {
    pub chess_move: ChessMove,
    pub strategy: SelectionStrategy,
    pub analysis: Option<AnalysisInfo>,
}

pub struct GameSession {
    game_state: GameState,
    strategy: SelectionStrategy,
    engine_backed: Option<EngineBackedSelector>,
    fallback: HeuristicFallbackSelector,
    config: CollaboratorConfig,
    computer_color: Option<Color>,
    last_analysis: Option<AnalysisInfo>,
    log: Vec<SessionLogEntry>,
    log_cursor: usize,
}

impl GameSession {
    /// Session that consults a collaborator until it misbehaves.
    ///
    /// `spawn` is called for a fresh instance on every attempt. A failed
    /// start or handshake is retried `config.connect_retries` times,
    /// `config.retry_delay` apart, before the session settles on the
    /// fallback.
    pub fn with_collaborator<F>(
        mut spawn: F,
        config: CollaboratorConfig,
        fallback: HeuristicFallbackSelector,
    ) -> Self
    where
        F: FnMut() -> ChessResult<Box<dyn Collaborator>>,
    {
        let mut session = Self::heuristic_only(config, fallback);
        let attempts = u32::from(config.connect_retries) + 1;

        for attempt in 1..=attempts {
            if attempt > 1 {
                thread::sleep(config.retry_delay);
            }

            let connected = spawn().and_then(|collaborator| {
                let name = collaborator.name().to_owned();
                EngineBackedSelector::connect(collaborator, config).map(|selector| (name, selector))
            });
            match connected {
                Ok((name, selector)) => {
                    session.engine_backed = Some(selector);
                    session.strategy = SelectionStrategy::EngineBacked;
                    session.log_event(format!(
                        "connected to {name} at skill level {}",
                        config.skill_level
                    ));
                    return session;
                }
                Err(err) => session.log_event(format!(
                    "collaborator start attempt {attempt}/{attempts} failed: {err}"
                )),
            }
        }

        session.switch_to_fallback(&format!("no collaborator after {attempts} attempts"));
        session
    }

    pub fn heuristic_only(config: CollaboratorConfig, fallback: HeuristicFallbackSelector) -> Self {
        Self {
            game_state: GameState::new_game(),
            strategy: SelectionStrategy::HeuristicFallback,
            engine_backed: None,
            fallback,
            config,
            computer_color: None,
            last_analysis: None,
            log: Vec::new(),
            log_cursor: 0,
        }
    }

    #[inline]
    pub fn game_state(&self) -> &GameState {
        &self.game_state
    }

    #[inline]
    pub fn strategy(&self) -> SelectionStrategy {
        self.strategy
    }

    #[inline]
    pub fn config(&self) -> &CollaboratorConfig {
        &self.config
    }

    #[inline]
    pub fn last_analysis(&self) -> Option<AnalysisInfo> {
        self.last_analysis
    }

    #[inline]
    pub fn log(&self) -> &[SessionLogEntry] {
        &self.log
    }

    /// Entries added since the previous call.
    pub fn take_new_log_entries(&mut self) -> &[SessionLogEntry] {
        let start = self.log_cursor;
        self.log_cursor = self.log.len();
        &self.log[start..]
    }

    /// Color the computer answers for automatically after a human move.
    pub fn set_computer_color(&mut self, color: Option<Color>) {
        self.computer_color = color;
    }

    pub fn new_game(&mut self) {
        self.game_state = GameState::new_game();
        self.last_analysis = None;
        self.log_event("new game");

        let result = match self.engine_backed.as_mut() {
            Some(selector) => selector.new_game(),
            None => Ok(()),
        };
        if let Err(err) = result {
            self.switch_to_fallback(&err.to_string());
        }
    }

    pub fn load_fen(&mut self, fen: &str) -> ChessResult<()> {
        self.game_state = GameState::from_fen(fen)?;
        self.last_analysis = None;
        self.log_event(format!("loaded position {}", self.game_state.get_fen()));
        Ok(())
    }

    pub fn play_human_move(&mut self, text: &str) -> ChessResult<ChessMove> {
        self.game_state.ensure_in_progress()?;
        let played = self.game_state.make_uci_move(text)?;
        self.log_event(format!("player {played}"));
        self.log_outcome();
        Ok(played)
    }

    pub fn undo(&mut self) -> Option<ChessMove> {
        let undone = self.game_state.undo_last_move()?;
        self.log_event(format!("took back {undone}"));
        Some(undone)
    }

    pub fn set_skill_level(&mut self, level: u8) {
        self.config.skill_level = level.min(MAX_SKILL_LEVEL);
        self.log_event(format!("skill level {}", self.config.skill_level));

        let level = self.config.skill_level;
        let result = match self.engine_backed.as_mut() {
            Some(selector) => selector.set_skill_level(level),
            None => Ok(()),
        };
        if let Err(err) = result {
            self.switch_to_fallback(&err.to_string());
        }
    }

    /// Choose and apply a computer move for the side to move.
    ///
    /// Collaborator failures never surface here: they switch the strategy
    /// and the fallback answers. Only rule-engine errors (game over, corrupt
    /// position) are returned.
    pub fn request_ai_move(&mut self) -> ChessResult<AiMove> {
        self.game_state.ensure_in_progress()?;
        let params = GoParams::default();

        if self.strategy == SelectionStrategy::EngineBacked {
            let result = match self.engine_backed.as_mut() {
                Some(selector) => selector.choose_move(&self.game_state, &params),
                None => Err(ChessError::CollaboratorUnavailable(
                    "no collaborator connected".to_owned(),
                )),
            };

            match result {
                Ok(output) => {
                    self.record_output(&output);
                    if let Some(chess_move) = output.best_move {
                        return self.commit_ai_move(
                            chess_move,
                            SelectionStrategy::EngineBacked,
                            output.analysis,
                        );
                    }
                    self.switch_to_fallback("collaborator returned no move");
                }
                Err(
                    err @ (ChessError::CollaboratorTimeout(_)
                    | ChessError::CollaboratorUnavailable(_)
                    | ChessError::IllegalMove(_)),
                ) => self.switch_to_fallback(&err.to_string()),
                Err(err) => return Err(err),
            }
        }

        let output = self.fallback.choose_move(&self.game_state, &params)?;
        self.record_output(&output);
        let chess_move = output.best_move.ok_or(ChessError::GameOver)?;
        self.commit_ai_move(chess_move, SelectionStrategy::HeuristicFallback, None)
    }

    /// Process one line of terminal input. Returns `true` when the session
    /// should end.
    pub fn handle_command(&mut self, line: &str, out: &mut impl Write) -> io::Result<bool> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(false);
        }

        let mut parts = trimmed.split_whitespace();
        let cmd = parts.next().unwrap_or_default();
        let mut redraw = false;

        match cmd {
            "quit" | "exit" => return Ok(true),
            "help" => writeln!(out, "{HELP_TEXT}")?,
            "board" => redraw = true,
            "fen" => writeln!(out, "{}", self.game_state.get_fen())?,
            "log" => {
                for entry in &self.log {
                    writeln!(out, "{entry}")?;
                }
                self.log_cursor = self.log.len();
            }
            "new" => {
                self.new_game();
                self.reply_if_computer_to_move(out)?;
                redraw = true;
            }
            "load" => {
                let fen = parts.collect::<Vec<_>>().join(" ");
                match self.load_fen(&fen) {
                    Ok(()) => redraw = true,
                    Err(err) => writeln!(out, "error: {err}")?,
                }
            }
            "undo" => {
                match self.undo() {
                    Some(_) => redraw = true,
                    None => writeln!(out, "nothing to undo")?,
                }
            }
            "level" => {
                match parts.next().and_then(|tok| tok.parse::<u8>().ok()) {
                    Some(level) => self.set_skill_level(level),
                    None => {
                        writeln!(out, "error: level needs a number from 0 to {MAX_SKILL_LEVEL}")?
                    }
                }
            }
            "moves" => self.write_destinations(parts.next().unwrap_or_default(), out)?,
            "go" => {
                match self.request_ai_move() {
                    Ok(_) => redraw = true,
                    Err(err) => writeln!(out, "error: {err}")?,
                }
            }
            _ => match self.play_human_move(trimmed) {
                Ok(_) => {
                    self.reply_if_computer_to_move(out)?;
                    redraw = true;
                }
                Err(err) => writeln!(out, "error: {err}")?,
            },
        }

        for entry in self.take_new_log_entries() {
            writeln!(out, "{entry}")?;
        }
        if redraw {
            writeln!(out, "{}", render_game_state(&self.game_state))?;
            writeln!(out, "{}", render_status_line(&self.game_state))?;
        }

        Ok(false)
    }

    fn reply_if_computer_to_move(&mut self, out: &mut impl Write) -> io::Result<()> {
        if self.computer_color != Some(self.game_state.side_to_move)
            || self.game_state.is_game_over()
        {
            return Ok(());
        }
        if let Err(err) = self.request_ai_move() {
            writeln!(out, "error: {err}")?;
        }
        Ok(())
    }

    fn write_destinations(&self, square_text: &str, out: &mut impl Write) -> io::Result<()> {
        let destinations = algebraic_to_square(square_text)
            .and_then(|square| self.game_state.legal_destinations(square));
        match destinations {
            Ok(targets) => {
                let names: Vec<String> = targets.iter().copied().map(square_to_algebraic).collect();
                writeln!(out, "{}", render_with_marks(&self.game_state, &targets))?;
                if names.is_empty() {
                    writeln!(out, "no legal moves from {square_text}")
                } else {
                    writeln!(out, "{square_text}: {}", names.join(" "))
                }
            }
            Err(err) => writeln!(out, "error: {err}"),
        }
    }

    fn commit_ai_move(
        &mut self,
        chess_move: ChessMove,
        strategy: SelectionStrategy,
        analysis: Option<AnalysisInfo>,
    ) -> ChessResult<AiMove> {
        self.game_state.make_move(chess_move)?;
        let played = self
            .game_state
            .move_log
            .last()
            .map(|record| record.chess_move())
            .unwrap_or(chess_move);

        if analysis.is_some() {
            self.last_analysis = analysis;
        }
        self.log_event(format!("computer ({strategy}) {played}"));
        self.log_outcome();

        Ok(AiMove {
            chess_move: played,
            strategy,
            analysis,
        })
    }

    fn record_output(&mut self, output: &EngineOutput) {
        for line in &output.info_lines {
            self.log_event(line.clone());
        }
    }

    fn switch_to_fallback(&mut self, reason: &str) {
        // Dropping the selector also shuts the collaborator down.
        self.engine_backed = None;
        self.strategy = SelectionStrategy::HeuristicFallback;
        self.log_event(format!("switching to heuristic fallback: {reason}"));
    }

    fn log_outcome(&mut self) {
        match self.game_state.status {
            GameStatus::Active => {}
            GameStatus::Check => self.log_event("check"),
            GameStatus::Checkmate => self.log_event("checkmate"),
            GameStatus::Stalemate => self.log_event("stalemate"),
        }
    }

    fn log_event(&mut self, message: impl Into<String>) {
        self.log.push(SessionLogEntry {
            timestamp: Local::now(),
            message: message.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::channel;
    use std::thread;
    use std::time::Duration;

    use super::GameSession;
    use crate::engines::engine_heuristic::HeuristicFallbackSelector;
    use crate::engines::selection_strategy::SelectionStrategy;
    use crate::errors::ChessError;
    use crate::game_state::chess_types::{Color, GameStatus};
    use crate::uci::collaborator::{ChannelCollaborator, Collaborator, CollaboratorConfig};
    use crate::uci::simulated_collaborator::{
        spawn_simulated_collaborator, SimulatedBehavior, SimulatedConfig,
    };

    fn config() -> CollaboratorConfig {
        CollaboratorConfig {
            move_timeout: Duration::from_millis(200),
            handshake_timeout: Duration::from_secs(2),
            skill_level: 20,
            ..CollaboratorConfig::default()
        }
    }

    fn simulated(behavior: SimulatedBehavior) -> Box<dyn Collaborator> {
        Box::new(spawn_simulated_collaborator(SimulatedConfig {
            behavior,
            think_step: Duration::from_millis(1),
            seed: Some(5),
        }))
    }

    /// Accepts commands and never answers.
    fn mute() -> Box<dyn Collaborator> {
        let (command_tx, command_rx) = channel::<String>();
        let (reply_tx, reply_rx) = channel::<String>();
        thread::spawn(move || {
            let _reply_tx = reply_tx;
            for _ in command_rx {}
        });
        Box::new(ChannelCollaborator::new("mute", command_tx, reply_rx))
    }

    fn quick_retry_config() -> CollaboratorConfig {
        CollaboratorConfig {
            handshake_timeout: Duration::from_millis(50),
            retry_delay: Duration::from_millis(5),
            ..config()
        }
    }

    fn session_with(behavior: SimulatedBehavior) -> GameSession {
        GameSession::with_collaborator(
            || Ok(simulated(behavior)),
            config(),
            HeuristicFallbackSelector::with_seed(5),
        )
    }

    fn log_mentions(session: &GameSession, needle: &str) -> bool {
        session.log().iter().any(|entry| entry.message.contains(needle))
    }

    #[test]
    fn failed_handshake_is_retried_with_a_fresh_instance() {
        let mut spawned = 0u32;
        let session = GameSession::with_collaborator(
            || {
                spawned += 1;
                Ok(if spawned == 1 {
                    mute()
                } else {
                    simulated(SimulatedBehavior::Cooperative)
                })
            },
            quick_retry_config(),
            HeuristicFallbackSelector::with_seed(5),
        );

        assert_eq!(spawned, 2);
        assert_eq!(session.strategy(), SelectionStrategy::EngineBacked);
        assert!(log_mentions(&session, "attempt 1/3 failed: collaborator timed out after 50 ms"));
        assert!(log_mentions(&session, "connected to"));
    }

    #[test]
    fn fallback_after_every_attempt_fails() {
        let mut spawned = 0u32;
        let session = GameSession::with_collaborator(
            || {
                spawned += 1;
                if spawned == 2 {
                    Err(ChessError::CollaboratorUnavailable("binary missing".to_owned()))
                } else {
                    Ok(mute())
                }
            },
            quick_retry_config(),
            HeuristicFallbackSelector::with_seed(5),
        );

        assert_eq!(spawned, 3);
        assert_eq!(session.strategy(), SelectionStrategy::HeuristicFallback);
        assert!(log_mentions(&session, "attempt 2/3 failed: collaborator unavailable"));
        assert!(log_mentions(&session, "no collaborator after 3 attempts"));
    }

    #[test]
    fn cooperative_collaborator_keeps_engine_strategy() {
        let mut session = session_with(SimulatedBehavior::Cooperative);
        assert_eq!(session.strategy(), SelectionStrategy::EngineBacked);

        session.play_human_move("e2e4").expect("e2e4 is legal");
        let reply = session.request_ai_move().expect("collaborator answers");

        assert_eq!(reply.strategy, SelectionStrategy::EngineBacked);
        assert!(reply.analysis.is_some());
        assert_eq!(session.last_analysis(), reply.analysis);
        assert_eq!(session.game_state().side_to_move, Color::Light);
        assert_eq!(session.game_state().move_log.len(), 2);
    }

    #[test]
    fn timeout_switches_to_fallback_for_the_rest_of_the_session() {
        let mut session = session_with(SimulatedBehavior::Silent);
        assert_eq!(session.strategy(), SelectionStrategy::EngineBacked);

        let reply = session.request_ai_move().expect("fallback answers");
        assert_eq!(reply.strategy, SelectionStrategy::HeuristicFallback);
        assert_eq!(session.strategy(), SelectionStrategy::HeuristicFallback);
        assert!(log_mentions(&session, "timed out after 200 ms"));
        assert_eq!(session.game_state().move_log.len(), 1);

        session.play_human_move("e7e5").expect("e7e5 is legal after one white move");
        let next = session.request_ai_move().expect("fallback answers again");
        assert_eq!(next.strategy, SelectionStrategy::HeuristicFallback);
    }

    #[test]
    fn error_reply_and_illegal_suggestion_fall_back() {
        for behavior in [SimulatedBehavior::Failing, SimulatedBehavior::IllegalReplies] {
            let mut session = session_with(behavior);
            let before = session.game_state().clone();
            let reply = session.request_ai_move().expect("fallback answers");

            assert_eq!(reply.strategy, SelectionStrategy::HeuristicFallback);
            assert!(log_mentions(&session, "switching to heuristic fallback"));
            assert!(before
                .legal_moves()
                .expect("generation")
                .contains(&reply.chess_move));
            assert_eq!(session.game_state().move_log.len(), 1);
        }
    }

    #[test]
    fn finished_game_refuses_computer_move() {
        let mut session =
            GameSession::heuristic_only(config(), HeuristicFallbackSelector::with_seed(1));
        for mv in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            session.play_human_move(mv).expect("fool's mate move is legal");
        }
        assert_eq!(session.game_state().status, GameStatus::Checkmate);
        assert_eq!(session.request_ai_move(), Err(ChessError::GameOver));
        assert_eq!(session.play_human_move("a2a3"), Err(ChessError::GameOver));
        assert!(log_mentions(&session, "checkmate"));
    }

    #[test]
    fn terminal_commands_drive_the_game() {
        let mut session =
            GameSession::heuristic_only(config(), HeuristicFallbackSelector::with_seed(9));
        session.set_computer_color(Some(Color::Dark));
        let mut out = Vec::<u8>::new();

        assert!(!session.handle_command("e2e4", &mut out).expect("io"));
        assert_eq!(session.game_state().move_log.len(), 2);
        assert_eq!(session.game_state().side_to_move, Color::Light);

        assert!(!session.handle_command("e2e5", &mut out).expect("io"));
        assert!(!session.handle_command("moves g1", &mut out).expect("io"));
        assert!(!session.handle_command("undo", &mut out).expect("io"));
        assert_eq!(session.game_state().move_log.len(), 1);
        assert!(session.handle_command("quit", &mut out).expect("io"));

        let text = String::from_utf8(out).expect("utf8 output");
        assert!(text.contains("error: illegal move"));
        assert!(text.contains("g1:"));
        assert!(text.contains("computer (heuristic fallback)"));
        assert!(text.contains("White to move"));
    }

    #[test]
    fn load_and_level_commands() {
        let mut session =
            GameSession::heuristic_only(config(), HeuristicFallbackSelector::with_seed(2));
        let mut out = Vec::<u8>::new();

        session
            .handle_command("load 4k3/8/8/8/8/8/8/4K2R w K - 0 1", &mut out)
            .expect("io");
        session.handle_command("fen", &mut out).expect("io");
        session.handle_command("level 99", &mut out).expect("io");
        session.handle_command("load nonsense", &mut out).expect("io");

        assert_eq!(session.config().skill_level, 20);
        let text = String::from_utf8(out).expect("utf8 output");
        assert!(text.contains("4k3/8/8/8/8/8/8/4K2R w K - 0 1"));
        assert!(text.contains("error: malformed notation"));
    }

    #[test]
    fn log_entries_are_timestamped_and_consumed_once() {
        let mut session =
            GameSession::heuristic_only(config(), HeuristicFallbackSelector::with_seed(3));
        session.new_game();
        let fresh = session.take_new_log_entries();
        assert_eq!(fresh.len(), 1);
        let rendered = fresh[0].to_string();
        assert!(rendered.starts_with('['));
        assert!(rendered.ends_with("] new game"));
        assert!(session.take_new_log_entries().is_empty());
    }
}
