//! Textual collaborator protocol.
//!
//! Commands sent to a move-suggestion service and the replies read back from
//! it, in the UCI line format. Parsing never fails: unknown or malformed
//! reply lines become `UciResponse::Other` and a broken `bestmove` carries no
//! move.

use std::fmt;

use crate::moves::move_descriptions::ChessMove;
use crate::utils::long_algebraic::{decode_uci_move, parse_bestmove};

pub const MAX_SKILL_LEVEL: u8 = 20;
pub const MAX_SEARCH_DEPTH: u8 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciCommand {
    Uci,
    IsReady,
    UciNewGame,
    PositionFen(String),
    /// `position startpos [moves ...]`.
    PositionStartMoves(Vec<ChessMove>),
    GoDepth(u8),
    /// `go movetime <ms>`.
    GoMoveTime(u64),
    Stop,
    SetSkillLevel(u8),
    Quit,
}

impl fmt::Display for UciCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UciCommand::Uci => write!(f, "uci"),
            UciCommand::IsReady => write!(f, "isready"),
            UciCommand::UciNewGame => write!(f, "ucinewgame"),
            UciCommand::PositionFen(fen) => write!(f, "position fen {fen}"),
            UciCommand::PositionStartMoves(moves) if moves.is_empty() => {
                write!(f, "position startpos")
            }
            UciCommand::PositionStartMoves(moves) => {
                write!(f, "position startpos moves")?;
                for mv in moves {
                    write!(f, " {mv}")?;
                }
                Ok(())
            }
            UciCommand::GoDepth(depth) => write!(f, "go depth {depth}"),
            UciCommand::GoMoveTime(ms) => write!(f, "go movetime {ms}"),
            UciCommand::Stop => write!(f, "stop"),
            UciCommand::SetSkillLevel(level) => {
                write!(f, "setoption name Skill Level value {level}")
            }
            UciCommand::Quit => write!(f, "quit"),
        }
    }
}

impl UciCommand {
    /// Read a command line as a collaborator would. Returns `None` for
    /// anything this protocol subset cannot represent faithfully, including
    /// `position fen ... moves ...`.
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        let mut parts = trimmed.split_whitespace();
        let cmd = parts.next()?;

        match cmd {
            "uci" => Some(UciCommand::Uci),
            "isready" => Some(UciCommand::IsReady),
            "ucinewgame" => Some(UciCommand::UciNewGame),
            "stop" => Some(UciCommand::Stop),
            "quit" => Some(UciCommand::Quit),
            "position" => match parts.next()? {
                "startpos" => {
                    let moves = match parts.next() {
                        None => Vec::new(),
                        Some("moves") => parts
                            .map(|tok| decode_uci_move(tok).ok())
                            .collect::<Option<Vec<_>>>()?,
                        Some(_) => return None,
                    };
                    Some(UciCommand::PositionStartMoves(moves))
                }
                "fen" => {
                    let fen: Vec<&str> = parts.collect();
                    if fen.is_empty() || fen.contains(&"moves") {
                        None
                    } else {
                        Some(UciCommand::PositionFen(fen.join(" ")))
                    }
                }
                _ => None,
            },
            "go" => {
                let tokens: Vec<&str> = parts.collect();
                let value_after = |key: &str| {
                    tokens
                        .iter()
                        .position(|&tok| tok == key)
                        .and_then(|idx| tokens.get(idx + 1))
                        .copied()
                };
                // Depth wins when both limits are given.
                if let Some(depth) = value_after("depth") {
                    return depth.parse::<u8>().ok().map(UciCommand::GoDepth);
                }
                if let Some(ms) = value_after("movetime") {
                    return ms.parse::<u64>().ok().map(UciCommand::GoMoveTime);
                }
                Some(UciCommand::GoDepth(MAX_SEARCH_DEPTH))
            }
            "setoption" => {
                let rest = trimmed.strip_prefix("setoption")?.trim();
                let (name, value) = rest.strip_prefix("name")?.split_once(" value ")?;
                if !name.trim().eq_ignore_ascii_case("Skill Level") {
                    return None;
                }
                let level = value.trim().parse::<u8>().ok()?;
                Some(UciCommand::SetSkillLevel(level.min(MAX_SKILL_LEVEL)))
            }
            _ => None,
        }
    }
}

/// Latest search progress reported by the collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisInfo {
    pub depth: Option<u32>,
    pub score_cp: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciResponse {
    UciOk,
    ReadyOk,
    Info(AnalysisInfo),
    BestMove(Option<ChessMove>),
    Error(String),
    Other(String),
}

impl UciResponse {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let first = trimmed.split_whitespace().next().unwrap_or_default();

        if trimmed.starts_with("Error") {
            return UciResponse::Error(trimmed.to_owned());
        }

        match first {
            "uciok" => UciResponse::UciOk,
            "readyok" => UciResponse::ReadyOk,
            "bestmove" => UciResponse::BestMove(parse_bestmove(trimmed)),
            "info" => UciResponse::Info(parse_info(trimmed)),
            _ => UciResponse::Other(trimmed.to_owned()),
        }
    }
}

/// Pull `depth <D>` and `score cp <S>` out of an info line, ignoring every
/// other field.
pub fn parse_info(line: &str) -> AnalysisInfo {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let mut info = AnalysisInfo::default();
    let mut i = 0usize;

    while i < tokens.len() {
        match tokens[i] {
            "depth" => {
                i += 1;
                info.depth = tokens.get(i).and_then(|x| x.parse::<u32>().ok());
            }
            "score" if tokens.get(i + 1) == Some(&"cp") => {
                i += 2;
                info.score_cp = tokens.get(i).and_then(|x| x.parse::<i32>().ok());
            }
            // Free text; nothing after it is structured.
            "string" => break,
            _ => {}
        }
        i += 1;
    }

    info
}

/// Search depth requested for a skill level: `clamp(floor(level * 1.5), 1, 20)`.
#[inline]
pub fn skill_to_depth(level: u8) -> u8 {
    let scaled = u16::from(level) * 3 / 2;
    scaled.clamp(1, u16::from(MAX_SEARCH_DEPTH)) as u8
}
