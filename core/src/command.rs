use std::str::FromStr;

use strum::IntoEnumIterator;
use strum_macros::AsRefStr;
use strum_macros::EnumIter;
use strum_macros::EnumString;
use strum_macros::IntoStaticStr;

/// Sentinel that distinguishes a command from a free-text search.
pub const COMMAND_PREFIX: &str = "//";

/// Commands that can be invoked by starting the input with `//`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum Command {
    // DO NOT ALPHA-SORT! Enum order is presentation order in the popup, so
    // more frequently used commands should be listed first.
    Bg,
    AddIcon,
    Save,
    Clear,
    Style,
    TextColor,
    SetSearch,
}

impl Command {
    /// Command identifier without the leading `//`.
    pub fn command(self) -> &'static str {
        self.into()
    }

    /// Full key as typed by the user, e.g. `//bg`.
    pub fn key(self) -> String {
        format!("{COMMAND_PREFIX}{}", self.command())
    }

    /// Short label shown next to the key in the popup.
    pub fn label(self) -> &'static str {
        match self {
            Command::Bg => "Set background (URL or file)",
            Command::AddIcon => "Add a site icon",
            Command::Save => "Force save",
            Command::Clear => "Clear the page",
            Command::Style => "Switch visual style",
            Command::TextColor => "Set input text color",
            Command::SetSearch => "Set default search engine",
        }
    }

    /// Usage text with an optional `<placeholder>` for the argument.
    pub fn usage(self) -> &'static str {
        match self {
            Command::Bg => "//bg <URL> — set a background image, or .mp4 URL for video",
            Command::AddIcon => {
                "//addicon <site URL> — add an icon link (e.g. //addicon google.com)"
            }
            Command::Save => "//save — persist the current page state",
            Command::Clear => "//clear — reset the background and icons",
            Command::Style => "//style <1|2> — switch the visual style",
            Command::TextColor => {
                "//textcolor <hex or name> — e.g. //textcolor #000000 or //textcolor red"
            }
            Command::SetSearch => {
                "//setsearch <keyword or url template> — e.g. //setsearch google or //setsearch https://duckduckgo.com/?q=%s"
            }
        }
    }

    /// The `<placeholder>` from [`Command::usage`], if the command takes an
    /// argument.
    pub fn placeholder(self) -> Option<&'static str> {
        let usage = self.usage();
        let start = usage.find('<')?;
        let end = usage[start..].find('>')?;
        Some(&usage[start + 1..start + end])
    }

    pub fn takes_args(self) -> bool {
        self.placeholder().is_some()
    }

    /// Look up a command from a full `//key` token. Matching is
    /// case-insensitive.
    pub fn from_key(token: &str) -> Option<Command> {
        let token = token.to_lowercase();
        let name = token.strip_prefix(COMMAND_PREFIX)?;
        Command::from_str(name).ok()
    }

    /// Whether this command should appear for the given post-sentinel filter.
    /// The filter is matched as a case-insensitive substring of
    /// "key label", mirroring how the popup narrows the list.
    pub fn matches_filter(self, filter: &str) -> bool {
        let haystack = format!("{} {}", self.command(), self.label()).to_lowercase();
        haystack.contains(&filter.to_lowercase())
    }

    /// All commands in presentation order.
    pub fn all() -> Vec<Command> {
        Command::iter().collect()
    }
}
