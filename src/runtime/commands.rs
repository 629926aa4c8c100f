use std::num::IntErrorKind;
use std::path::PathBuf;

use crate::error::{CommandError, PlaybackError};
use crate::player::Direction;

use super::context::AppContext;
use super::output::{self, ConsoleObserver};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Search(String),
    /// Zero-based; the user types one-based indices.
    Select(usize),
    List,
    Shuffle,
    Play,
    Pause,
    Next,
    Previous,
    Current,
    Volume(i64),
    Batch(PathBuf),
    Quit,
}

/// Whether the command loop should keep reading input.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

impl Command {
    /// Parse one input line. The verb is case-insensitive; arguments keep
    /// their case.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (verb, arg) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let verb = verb.to_ascii_lowercase();

        let required = |name: &'static str| {
            if arg.is_empty() {
                Err(CommandError::MissingArgument(name))
            } else {
                Ok(arg)
            }
        };

        let cmd = match verb.as_str() {
            "help" => Self::Help,
            "search" => Self::Search(required("search")?.to_string()),
            "select" => {
                let raw = required("select")?;
                let n: usize = raw
                    .parse()
                    .map_err(|_| CommandError::InvalidNumber(raw.to_string()))?;
                let index = n
                    .checked_sub(1)
                    .ok_or_else(|| CommandError::InvalidNumber(raw.to_string()))?;
                Self::Select(index)
            }
            "list" => Self::List,
            "shuffle" => Self::Shuffle,
            "play" => Self::Play,
            "pause" => Self::Pause,
            "next" => Self::Next,
            "previous" => Self::Previous,
            "current" => Self::Current,
            "volume" => {
                let raw = required("volume")?;
                Self::Volume(parse_level(raw)?)
            }
            "batch" => Self::Batch(PathBuf::from(required("batch")?)),
            "quit" | "exit" => Self::Quit,
            _ => return Err(CommandError::Unknown(line.to_string())),
        };
        Ok(cmd)
    }
}

/// Parse a volume level. Integers too large for `i64` saturate so the engine
/// reports them as out of range.
fn parse_level(raw: &str) -> Result<i64, CommandError> {
    raw.parse::<i64>().or_else(|e| match e.kind() {
        IntErrorKind::PosOverflow => Ok(i64::MAX),
        IntErrorKind::NegOverflow => Ok(i64::MIN),
        _ => Err(CommandError::InvalidNumber(raw.to_string())),
    })
}

/// Run one command against the shared context, printing its result.
pub fn execute(ctx: &AppContext, cmd: Command) -> Flow {
    tracing::debug!(?cmd, "command");
    match cmd {
        Command::Help => output::help(),
        Command::Search(query) => {
            if ctx.pipeline.acquire_one(&query, &ConsoleObserver).is_ok() {
                ctx.engine().refresh();
            }
        }
        Command::Select(index) => report(ctx.engine().select_index(index)),
        Command::List => list(ctx),
        Command::Shuffle => {
            if ctx.engine().toggle_shuffle() {
                output::info("Shuffle turned on.");
            } else {
                output::info("Shuffle turned off.");
            }
        }
        Command::Play => report(ctx.engine().play()),
        Command::Pause => report(ctx.engine().pause()),
        Command::Next => report(ctx.engine().advance(Direction::Next)),
        Command::Previous => report(ctx.engine().advance(Direction::Previous)),
        Command::Current => match ctx.engine().current_track() {
            Some((index, title)) => output::titled(format!("Now Playing {} :", index + 1), title),
            None => output::info("No song is currently playing."),
        },
        Command::Volume(level) => match ctx.engine().set_volume(level) {
            Ok(()) => output::info(format!("Volume set to {level}")),
            Err(e) => output::error(e),
        },
        Command::Batch(path) => match ctx.pipeline.acquire_batch_file(&path, &ConsoleObserver) {
            Ok(report) => {
                ctx.engine().refresh();
                output::info(format!(
                    "Batch finished: {} downloaded, {} failed, {} duplicates skipped, {} blank entries skipped",
                    report.succeeded(),
                    report.failed(),
                    report.duplicates,
                    report.blank
                ));
            }
            Err(e) => output::error(e),
        },
        Command::Quit => return Flow::Quit,
    }
    Flow::Continue
}

fn report(result: Result<(), PlaybackError>) {
    if let Err(e) = result {
        output::error(e);
    }
}

fn list(ctx: &AppContext) {
    let tracks = ctx.engine().list_tracks(&ctx.metadata);
    output::info("Available songs:");
    for (i, (title, duration)) in tracks.iter().enumerate() {
        match duration {
            Some(d) => output::titled(format!("{} :", i + 1), &format!("{title} - {d}")),
            None => output::error(format!("could not read duration for {title}")),
        }
    }
}
