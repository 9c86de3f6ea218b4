use crate::command::Command;
use crate::parse::parse_command_line;

/// Result of handing a parsed command to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// The command ran to completion.
    pub handled: bool,
    /// The input field should be cleared. False when the user should be able
    /// to correct the line in place (e.g. a missing argument).
    pub should_clear_input: bool,
}

impl DispatchOutcome {
    pub fn handled() -> Self {
        Self {
            handled: true,
            should_clear_input: true,
        }
    }

    /// The command was recognized but could not run; keep the input so the
    /// user can fix it.
    pub fn rejected() -> Self {
        Self {
            handled: false,
            should_clear_input: false,
        }
    }
}

/// Performs command side effects (background, icons, style, ...). The input
/// layer never sees errors from implementations; failures are absorbed into
/// a `rejected` outcome with a user notice.
pub trait CommandDispatcher {
    fn execute(&mut self, command: Command, args: &[String]) -> DispatchOutcome;
}

/// Handles a plain search submission: records history and navigates to the
/// configured search engine.
pub trait SearchHandler {
    fn search(&mut self, query: &str);
}

/// How a submitted line was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A registered command was dispatched.
    Command {
        command: Command,
        outcome: DispatchOutcome,
    },
    /// The line went to the free-text search handler.
    Search,
    /// Sentinel-prefixed, but the key token is not registered. The input is
    /// kept so the user can correct it.
    UnknownCommand(String),
    /// Nothing to do (blank input).
    Empty,
}

impl Resolution {
    pub fn should_clear_input(&self) -> bool {
        match self {
            Resolution::Command { outcome, .. } => outcome.should_clear_input,
            Resolution::Search => true,
            Resolution::UnknownCommand(_) | Resolution::Empty => false,
        }
    }
}

/// Resolve a submitted line. This is the single submission path shared by
/// Enter on plain text, accepting an inline completion, activating a popup
/// row and clicking one.
pub fn resolve_submission<H>(raw: &str, handler: &mut H) -> Resolution
where
    H: CommandDispatcher + SearchHandler,
{
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Resolution::Empty;
    }
    match parse_command_line(trimmed) {
        Some(line) => match line.command {
            Some(command) => {
                let outcome = handler.execute(command, &line.args);
                Resolution::Command { command, outcome }
            }
            None => Resolution::UnknownCommand(line.key_token),
        },
        None => {
            handler.search(trimmed);
            Resolution::Search
        }
    }
}
