//! Move selector that defers to an external collaborator.
//!
//! Each request drains stale output, sends the position as FEN followed by
//! `go depth N`, then reads replies until `bestmove` or the move timeout.
//! Every failure is reported as an error and never touches the position;
//! the session decides whether to fall back.

use std::time::{Duration, Instant};

use crate::engines::engine_trait::{EngineOutput, GoParams, MoveSelector};
use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::PieceKind;
use crate::game_state::game_state::GameState;
use crate::move_generation::legal_move_generator::generate_legal_move_list;
use crate::moves::move_descriptions::ChessMove;
use crate::uci::collaborator::{Collaborator, CollaboratorConfig, PositionFormat};
use crate::uci::uci_protocol::{skill_to_depth, UciCommand, UciResponse, MAX_SKILL_LEVEL};

pub struct EngineBackedSelector {
    collaborator: Box<dyn Collaborator>,
    config: CollaboratorConfig,
}

impl EngineBackedSelector {
    /// Run the `uci`/`isready` handshake and push the configured skill
    /// level. Fails with `CollaboratorTimeout` when the collaborator does not
    /// answer within the handshake timeout.
    pub fn connect(
        collaborator: Box<dyn Collaborator>,
        config: CollaboratorConfig,
    ) -> ChessResult<Self> {
        let mut selector = Self {
            collaborator,
            config,
        };

        selector.collaborator.send(&UciCommand::Uci)?;
        selector.wait_for_handshake(UciResponse::UciOk)?;
        selector
            .collaborator
            .send(&UciCommand::SetSkillLevel(selector.config.skill_level))?;
        selector.sync()?;

        Ok(selector)
    }

    fn sync(&mut self) -> ChessResult<()> {
        self.collaborator.send(&UciCommand::IsReady)?;
        self.wait_for_handshake(UciResponse::ReadyOk)
    }

    fn wait_for_handshake(&mut self, expected: UciResponse) -> ChessResult<()> {
        let timeout = self.config.handshake_timeout;
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(ChessError::CollaboratorTimeout(duration_ms(timeout)));
            }

            let Some(line) = self.collaborator.recv_line(remaining)? else {
                continue;
            };
            match UciResponse::parse(&line) {
                response if response == expected => return Ok(()),
                UciResponse::Error(message) => {
                    return Err(ChessError::CollaboratorUnavailable(message));
                }
                _ => {}
            }
        }
    }

    fn position_command(&self, game_state: &GameState) -> UciCommand {
        let history = match self.config.position_format {
            PositionFormat::Fen => None,
            PositionFormat::MoveHistory => game_state.moves_from_start(),
        };
        match history {
            Some(moves) => UciCommand::PositionStartMoves(moves),
            None => UciCommand::PositionFen(game_state.get_fen()),
        }
    }

    fn go_command(&self, params: &GoParams) -> UciCommand {
        match (params.depth, self.config.move_time) {
            (Some(depth), _) => UciCommand::GoDepth(depth),
            (None, Some(move_time)) => UciCommand::GoMoveTime(duration_ms(move_time)),
            (None, None) => UciCommand::GoDepth(skill_to_depth(self.config.skill_level)),
        }
    }

    fn on_timeout(&mut self) -> ChessError {
        // The collaborator may still answer later; that reply is drained
        // before the next request.
        let _ = self.collaborator.send(&UciCommand::Stop);
        ChessError::CollaboratorTimeout(self.config.move_timeout_ms())
    }
}

impl MoveSelector for EngineBackedSelector {
    fn name(&self) -> &str {
        "engine_backed"
    }

    fn new_game(&mut self) -> ChessResult<()> {
        self.collaborator.drain();
        self.collaborator.send(&UciCommand::UciNewGame)?;
        self.sync()
    }

    fn set_skill_level(&mut self, level: u8) -> ChessResult<()> {
        self.config.skill_level = level.min(MAX_SKILL_LEVEL);
        self.collaborator
            .send(&UciCommand::SetSkillLevel(self.config.skill_level))
    }

    fn choose_move(
        &mut self,
        game_state: &GameState,
        params: &GoParams,
    ) -> ChessResult<EngineOutput> {
        let legal = generate_legal_move_list(game_state)?;
        let mut out = EngineOutput::default();

        let stale = self.collaborator.drain();
        if !stale.is_empty() {
            out.info_lines.push(format!(
                "info string engine_backed discarded {} stale lines",
                stale.len()
            ));
        }

        let position = self.position_command(game_state);
        let go = self.go_command(params);
        self.collaborator.send(&position)?;
        self.collaborator.send(&go)?;
        out.info_lines.push(format!(
            "info string engine_backed sent '{go}' to {}",
            self.collaborator.name()
        ));

        let deadline = Instant::now() + self.config.move_timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(self.on_timeout());
            }

            let Some(line) = self.collaborator.recv_line(remaining)? else {
                continue;
            };

            match UciResponse::parse(&line) {
                UciResponse::Info(info) => {
                    if info.depth.is_some() || info.score_cp.is_some() {
                        let mut latest = out.analysis.unwrap_or_default();
                        latest.depth = info.depth.or(latest.depth);
                        latest.score_cp = info.score_cp.or(latest.score_cp);
                        out.analysis = Some(latest);
                    }
                    out.info_lines.push(line);
                }
                UciResponse::BestMove(Some(suggested)) => {
                    let accepted = match_legal_move(&legal, suggested).ok_or_else(|| {
                        ChessError::IllegalMove(format!(
                            "collaborator suggested {suggested}, not legal in {}",
                            game_state.get_fen()
                        ))
                    })?;
                    out.best_move = Some(accepted);
                    return Ok(out);
                }
                UciResponse::BestMove(None) if legal.is_empty() => return Ok(out),
                UciResponse::BestMove(None) => {
                    return Err(ChessError::CollaboratorUnavailable(format!(
                        "unusable reply '{line}'"
                    )));
                }
                UciResponse::Error(message) => {
                    return Err(ChessError::CollaboratorUnavailable(message));
                }
                UciResponse::UciOk | UciResponse::ReadyOk | UciResponse::Other(_) => {}
            }
        }
    }
}

/// The legal move a suggestion refers to. A bare pawn move onto the far
/// rank means a queen promotion.
fn match_legal_move(legal: &[ChessMove], suggested: ChessMove) -> Option<ChessMove> {
    let wanted = suggested.promotion.unwrap_or(PieceKind::Queen);
    legal.iter().copied().find(|mv| {
        mv.same_squares(&suggested)
            && match mv.promotion {
                None => suggested.promotion.is_none(),
                Some(kind) => kind == wanted,
            }
    })
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
