//! Terminal front end: a human plays against the computer.
//!
//! Run with:
//! `cargo run --release`                         simulated collaborator
//! `cargo run --release -- --engine stockfish`   external UCI program
//! `cargo run --release -- --heuristic --black`  local selector, computer plays white
//!
//! Other flags: `--level <0-20>`, `--seed <n>`, `--timeout-ms <ms>`,
//! `--movetime <ms>` (search by time), `--history` (send move lists),
//! `--retries <n>` (extra connection attempts).

use std::io::{self, BufRead, Write};
use std::time::Duration;

use plum_arbiter::engines::engine_heuristic::HeuristicFallbackSelector;
use plum_arbiter::game_state::chess_types::Color;
use plum_arbiter::session::game_session::GameSession;
use plum_arbiter::uci::collaborator::{Collaborator, CollaboratorConfig, PositionFormat};
use plum_arbiter::uci::process_collaborator::ProcessCollaborator;
use plum_arbiter::uci::simulated_collaborator::{spawn_simulated_collaborator, SimulatedConfig};

enum Backend {
    Simulated,
    Process(String),
    Heuristic,
}

struct Options {
    backend: Backend,
    config: CollaboratorConfig,
    seed: Option<u64>,
    human_plays_black: bool,
}

fn parse_options() -> Result<Options, String> {
    let mut options = Options {
        backend: Backend::Simulated,
        config: CollaboratorConfig::default(),
        seed: None,
        human_plays_black: false,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--engine" => {
                let path = args.next().ok_or("--engine needs a program path")?;
                options.backend = Backend::Process(path);
            }
            "--simulated" => options.backend = Backend::Simulated,
            "--heuristic" => options.backend = Backend::Heuristic,
            "--black" => options.human_plays_black = true,
            "--level" => {
                let level = next_number(&mut args, "--level")?;
                options.config = options.config.with_skill_level(level);
            }
            "--seed" => options.seed = Some(next_number(&mut args, "--seed")?),
            "--timeout-ms" => {
                let ms: u64 = next_number(&mut args, "--timeout-ms")?;
                options.config.move_timeout = Duration::from_millis(ms);
            }
            "--movetime" => {
                let ms: u64 = next_number(&mut args, "--movetime")?;
                options.config.move_time = Some(Duration::from_millis(ms));
            }
            "--history" => options.config.position_format = PositionFormat::MoveHistory,
            "--retries" => options.config.connect_retries = next_number(&mut args, "--retries")?,
            other => return Err(format!("unknown argument '{other}'")),
        }
    }

    Ok(options)
}

fn next_number<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    flag: &str,
) -> Result<T, String> {
    args.next()
        .and_then(|value| value.parse().ok())
        .ok_or_else(|| format!("{flag} needs a number"))
}

fn build_session(options: &Options) -> GameSession {
    let fallback = match options.seed {
        Some(seed) => HeuristicFallbackSelector::with_seed(seed),
        None => HeuristicFallbackSelector::new(),
    };

    match &options.backend {
        Backend::Heuristic => GameSession::heuristic_only(options.config, fallback),
        Backend::Simulated => {
            let simulated = SimulatedConfig {
                seed: options.seed,
                ..SimulatedConfig::default()
            };
            GameSession::with_collaborator(
                || Ok(Box::new(spawn_simulated_collaborator(simulated)) as Box<dyn Collaborator>),
                options.config,
                fallback,
            )
        }
        Backend::Process(path) => GameSession::with_collaborator(
            || {
                ProcessCollaborator::spawn(path, &[])
                    .map(|collaborator| Box::new(collaborator) as Box<dyn Collaborator>)
            },
            options.config,
            fallback,
        ),
    }
}

fn main() -> Result<(), String> {
    let options = parse_options()?;
    let mut session = build_session(&options);
    let computer = if options.human_plays_black {
        Color::Light
    } else {
        Color::Dark
    };
    session.set_computer_color(Some(computer));

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let io_err = |err: io::Error| err.to_string();

    // "new" prints the board and lets the computer open when it has white.
    session.handle_command("new", &mut out).map_err(io_err)?;
    writeln!(out, "type 'help' for commands").map_err(io_err)?;
    out.flush().map_err(io_err)?;

    for line in io::stdin().lock().lines() {
        let line = line.map_err(io_err)?;
        if session.handle_command(&line, &mut out).map_err(io_err)? {
            break;
        }
        out.flush().map_err(io_err)?;
    }

    Ok(())
}
