use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::WidgetRef;

use newtab_core::Command;

use super::popup_consts::MAX_POPUP_ROWS;
use super::scroll_state::ScrollState;
use super::selection_popup_common::GenericDisplayRow;
use super::selection_popup_common::measure_rows_height;
use super::selection_popup_common::render_rows;

/// Popup listing commands that match the text after the `//` sentinel.
///
/// The filter is everything after the sentinel on the trimmed line and is
/// matched as a case-insensitive substring of "key label", so `//cl` shows
/// `//clear` and `//background` narrows by label. Matches keep registry
/// order.
pub(crate) struct CommandPopup {
    matches: Vec<Command>,
    state: ScrollState,
}

impl CommandPopup {
    pub(crate) fn new(filter: &str) -> Self {
        let matches = Command::all()
            .into_iter()
            .filter(|command| command.matches_filter(filter))
            .collect();
        Self {
            matches,
            state: ScrollState::new(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.matches.len()
    }

    pub(crate) fn matches(&self) -> &[Command] {
        &self.matches
    }

    pub(crate) fn move_up(&mut self) {
        self.state.move_up_wrap(self.matches.len());
        self.state
            .ensure_visible(self.matches.len(), MAX_POPUP_ROWS.min(self.matches.len()));
    }

    pub(crate) fn move_down(&mut self) {
        self.state.move_down_wrap(self.matches.len());
        self.state
            .ensure_visible(self.matches.len(), MAX_POPUP_ROWS.min(self.matches.len()));
    }

    pub(crate) fn selected_idx(&self) -> Option<usize> {
        self.state.selected_idx
    }

    pub(crate) fn scroll_top(&self) -> usize {
        self.state.scroll_top
    }

    /// Ensure something is selected (defaulting to the first match) and
    /// return it.
    pub(crate) fn select_or_default(&mut self, idx: Option<usize>) -> Option<Command> {
        self.state.select_or_default(idx, self.matches.len());
        self.selected_command()
    }

    pub(crate) fn selected_command(&self) -> Option<Command> {
        self.state
            .selected_idx
            .and_then(|idx| self.matches.get(idx).copied())
    }

    pub(crate) fn desired_height(&self) -> u16 {
        measure_rows_height(&self.rows(), MAX_POPUP_ROWS)
    }

    fn rows(&self) -> Vec<GenericDisplayRow> {
        self.matches
            .iter()
            .map(|command| GenericDisplayRow {
                name: command.key(),
                description: Some(command.label().to_string()),
            })
            .collect()
    }
}

impl WidgetRef for CommandPopup {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        render_rows(
            area,
            buf,
            &self.rows(),
            &self.state,
            MAX_POPUP_ROWS,
            "no matching commands",
        );
    }
}
