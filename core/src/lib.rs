//! Core domain types for the newtab start page: the command table, command
//! line parsing, submit resolution, search URL templates and version
//! comparison. Everything here is UI-free so the TUI layer can be tested
//! without a terminal.

pub mod command;
pub mod dispatch;
pub mod parse;
pub mod search_url;
pub mod version;

pub use command::COMMAND_PREFIX;
pub use command::Command;
pub use dispatch::CommandDispatcher;
pub use dispatch::DispatchOutcome;
pub use dispatch::Resolution;
pub use dispatch::SearchHandler;
pub use dispatch::resolve_submission;
pub use parse::CommandLine;
pub use parse::InputMode;
pub use parse::classify_input;
pub use parse::parse_command_line;
