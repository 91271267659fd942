//! Transport to the move-suggestion collaborator.
//!
//! A collaborator is anything that accepts protocol command lines and
//! produces reply lines. The in-process simulator and the external-process
//! bridge both end up as a pair of mpsc channels wrapped in
//! `ChannelCollaborator`.

use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

use crate::errors::{ChessError, ChessResult};
use crate::uci::uci_protocol::{UciCommand, MAX_SKILL_LEVEL};

/// How the current position is described to the collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PositionFormat {
    /// `position fen <FEN>`.
    #[default]
    Fen,
    /// `position startpos moves ...` when the game began at the standard
    /// start, FEN otherwise.
    MoveHistory,
}

/// Timeouts, retries and strength used when talking to a collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollaboratorConfig {
    /// Upper bound on waiting for `bestmove` after `go`.
    pub move_timeout: Duration,
    /// Upper bound on waiting for `uciok` / `readyok`.
    pub handshake_timeout: Duration,
    /// Fresh instances tried after the first failed handshake.
    pub connect_retries: u8,
    pub retry_delay: Duration,
    pub skill_level: u8,
    /// Search by time (`go movetime`) instead of a depth derived from skill.
    pub move_time: Option<Duration>,
    pub position_format: PositionFormat,
}

impl Default for CollaboratorConfig {
    fn default() -> Self {
        Self {
            move_timeout: Duration::from_secs(10),
            handshake_timeout: Duration::from_secs(5),
            connect_retries: 2,
            retry_delay: Duration::from_secs(1),
            skill_level: MAX_SKILL_LEVEL,
            move_time: None,
            position_format: PositionFormat::Fen,
        }
    }
}

impl CollaboratorConfig {
    pub fn with_skill_level(mut self, level: u8) -> Self {
        self.skill_level = level.min(MAX_SKILL_LEVEL);
        self
    }

    pub fn move_timeout_ms(&self) -> u64 {
        u64::try_from(self.move_timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

pub trait Collaborator: Send {
    fn name(&self) -> &str;

    fn send(&mut self, command: &UciCommand) -> ChessResult<()>;

    /// Next reply line, waiting at most `timeout`. `Ok(None)` means nothing
    /// arrived in time; a vanished collaborator is `CollaboratorUnavailable`.
    fn recv_line(&mut self, timeout: Duration) -> ChessResult<Option<String>>;

    /// Discard every reply already queued. Returns the discarded lines.
    fn drain(&mut self) -> Vec<String>;
}

pub struct ChannelCollaborator {
    name: String,
    commands: Sender<String>,
    replies: Receiver<String>,
}

impl ChannelCollaborator {
    pub fn new(
        name: impl Into<String>,
        commands: Sender<String>,
        replies: Receiver<String>,
    ) -> Self {
        Self {
            name: name.into(),
            commands,
            replies,
        }
    }

    fn disconnected(&self) -> ChessError {
        ChessError::CollaboratorUnavailable(format!("{} disconnected", self.name))
    }
}

impl Collaborator for ChannelCollaborator {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&mut self, command: &UciCommand) -> ChessResult<()> {
        self.commands
            .send(command.to_string())
            .map_err(|_| self.disconnected())
    }

    fn recv_line(&mut self, timeout: Duration) -> ChessResult<Option<String>> {
        match self.replies.recv_timeout(timeout) {
            Ok(line) => Ok(Some(line)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(self.disconnected()),
        }
    }

    fn drain(&mut self) -> Vec<String> {
        let mut stale = Vec::new();
        loop {
            match self.replies.try_recv() {
                Ok(line) => stale.push(line),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return stale,
            }
        }
    }
}

impl Drop for ChannelCollaborator {
    fn drop(&mut self) {
        // Worker threads exit on `quit` or once the command channel closes.
        let _ = self.commands.send(UciCommand::Quit.to_string());
    }
}
