//! External UCI engine driven over its standard streams.
//!
//! A writer thread forwards command lines to the child's stdin and a reader
//! thread forwards each stdout line into the reply channel, so the engine
//! looks like any other `ChannelCollaborator` to the selector.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::channel;
use std::thread;
use std::time::Duration;

use crate::errors::{ChessError, ChessResult};
use crate::uci::collaborator::{ChannelCollaborator, Collaborator};
use crate::uci::uci_protocol::UciCommand;

pub struct ProcessCollaborator {
    channel: ChannelCollaborator,
    child: Child,
}

impl ProcessCollaborator {
    pub fn spawn(program: &str, args: &[String]) -> ChessResult<Self> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| {
                ChessError::CollaboratorUnavailable(format!("{program}: spawn failed: {err}"))
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            ChessError::CollaboratorUnavailable(format!("{program}: stdin not captured"))
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            ChessError::CollaboratorUnavailable(format!("{program}: stdout not captured"))
        })?;

        let (command_tx, command_rx) = channel::<String>();
        let (reply_tx, reply_rx) = channel::<String>();

        thread::spawn(move || {
            for line in command_rx {
                if writeln!(stdin, "{line}").and_then(|_| stdin.flush()).is_err() {
                    break;
                }
            }
        });

        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else {
                    break;
                };
                if reply_tx.send(line).is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            channel: ChannelCollaborator::new(program, command_tx, reply_rx),
            child,
        })
    }
}

impl Collaborator for ProcessCollaborator {
    fn name(&self) -> &str {
        self.channel.name()
    }

    fn send(&mut self, command: &UciCommand) -> ChessResult<()> {
        self.channel.send(command)
    }

    fn recv_line(&mut self, timeout: Duration) -> ChessResult<Option<String>> {
        self.channel.recv_line(timeout)
    }

    fn drain(&mut self) -> Vec<String> {
        self.channel.drain()
    }
}

impl Drop for ProcessCollaborator {
    fn drop(&mut self) {
        let _ = self.channel.send(&UciCommand::Quit);
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
