use crate::command::COMMAND_PREFIX;
use crate::command::Command;

/// What the composer is currently doing, derived from the raw text alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Empty or whitespace-only input.
    Idle,
    /// Input starts with the `//` sentinel.
    Command,
    /// Any other non-empty input.
    Search,
}

/// Classify raw input into a mode. Evaluated on every text change.
pub fn classify_input(raw: &str) -> InputMode {
    let trimmed = raw.trim();
    if trimmed.starts_with(COMMAND_PREFIX) {
        InputMode::Command
    } else if trimmed.is_empty() {
        InputMode::Idle
    } else {
        InputMode::Search
    }
}

/// A sentinel-prefixed line split into its key token and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// The registered command, when the key token is known.
    pub command: Option<Command>,
    /// The first whitespace-delimited token, lower-cased, sentinel included.
    pub key_token: String,
    /// Remaining whitespace-delimited tokens.
    pub args: Vec<String>,
}

/// Parse a command line. Returns `None` when the trimmed input does not start
/// with the sentinel.
pub fn parse_command_line(raw: &str) -> Option<CommandLine> {
    let trimmed = raw.trim();
    if !trimmed.starts_with(COMMAND_PREFIX) {
        return None;
    }
    let mut parts = trimmed.split_whitespace();
    let key_token = parts.next().unwrap_or(COMMAND_PREFIX).to_lowercase();
    let args: Vec<String> = parts.map(str::to_string).collect();
    Some(CommandLine {
        command: Command::from_key(&key_token),
        key_token,
        args,
    })
}
