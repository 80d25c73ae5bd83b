//! Line-oriented user commands.
//!
//! ```text
//! size <entry> <stop> <target> <risk>   size a position
//! depth <10|20|50|100>                  change book depth
//! help                                  list commands
//! quit                                  stop the daemon
//! ```
//!
//! Sizing fields are kept as text: whether they form a usable set of
//! inputs is the calculator's call, not a parse error.

use std::str::FromStr;

use thiserror::Error;

use crate::config::DEPTH_OPTIONS;

/// Usage text printed by `help`.
pub const HELP: &str = "\
commands:
  size <entry> <stop> <target> <risk>   size a position
  depth <10|20|50|100>                  change book depth
  help                                  show this help
  quit                                  stop the daemon";

/// A parsed user command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Size a position from the four form fields
    Size {
        entry: String,
        stop: String,
        target: String,
        risk: String,
    },
    /// Switch the book to this many levels per side
    Depth(usize),
    /// Show usage
    Help,
    /// Stop the daemon
    Quit,
}

/// Why a line is not a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Blank line
    #[error("empty command")]
    Empty,

    /// First word is not a known verb
    #[error("unknown command: {0} (try `help`)")]
    Unknown(String),

    /// Known verb, wrong arguments
    #[error("usage: {0}")]
    Usage(&'static str),

    /// Depth outside the dashboard's options
    #[error("unsupported depth {0}, expected one of {1:?}")]
    UnsupportedDepth(String, [usize; 4]),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or(CommandError::Empty)?;
        let args: Vec<&str> = words.collect();

        match verb.to_lowercase().as_str() {
            "size" => match args.as_slice() {
                [entry, stop, target, risk] => Ok(Command::Size {
                    entry: entry.to_string(),
                    stop: stop.to_string(),
                    target: target.to_string(),
                    risk: risk.to_string(),
                }),
                _ => Err(CommandError::Usage("size <entry> <stop> <target> <risk>")),
            },
            "depth" => match args.as_slice() {
                [depth] => depth
                    .parse::<usize>()
                    .ok()
                    .filter(|d| DEPTH_OPTIONS.contains(d))
                    .map(Command::Depth)
                    .ok_or_else(|| {
                        CommandError::UnsupportedDepth(depth.to_string(), DEPTH_OPTIONS)
                    }),
                _ => Err(CommandError::Usage("depth <10|20|50|100>")),
            },
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}
