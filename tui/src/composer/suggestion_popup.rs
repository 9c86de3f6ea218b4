use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::WidgetRef;

use super::popup_consts::MAX_POPUP_ROWS;
use super::scroll_state::ScrollState;
use super::selection_popup_common::GenericDisplayRow;
use super::selection_popup_common::measure_rows_height;
use super::selection_popup_common::render_rows;

/// Popup listing remote search candidates, in provider order.
pub(crate) struct SuggestionPopup {
    candidates: Vec<String>,
    state: ScrollState,
}

impl SuggestionPopup {
    pub(crate) fn new(candidates: Vec<String>) -> Self {
        Self {
            candidates,
            state: ScrollState::new(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.candidates.len()
    }

    pub(crate) fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub(crate) fn move_up(&mut self) {
        self.state.move_up_wrap(self.candidates.len());
        self.state.ensure_visible(
            self.candidates.len(),
            MAX_POPUP_ROWS.min(self.candidates.len()),
        );
    }

    pub(crate) fn move_down(&mut self) {
        self.state.move_down_wrap(self.candidates.len());
        self.state.ensure_visible(
            self.candidates.len(),
            MAX_POPUP_ROWS.min(self.candidates.len()),
        );
    }

    pub(crate) fn scroll_top(&self) -> usize {
        self.state.scroll_top
    }

    pub(crate) fn selected_idx(&self) -> Option<usize> {
        self.state.selected_idx
    }

    /// Ensure something is selected (defaulting to the first candidate) and
    /// return it.
    pub(crate) fn select_or_default(&mut self, idx: Option<usize>) -> Option<String> {
        self.state.select_or_default(idx, self.candidates.len());
        self.selected_candidate()
    }

    pub(crate) fn selected_candidate(&self) -> Option<String> {
        self.state
            .selected_idx
            .and_then(|idx| self.candidates.get(idx).cloned())
    }

    pub(crate) fn clear_selection(&mut self) {
        self.state.selected_idx = None;
        self.state.scroll_top = 0;
    }

    pub(crate) fn desired_height(&self) -> u16 {
        measure_rows_height(&self.rows(), MAX_POPUP_ROWS)
    }

    fn rows(&self) -> Vec<GenericDisplayRow> {
        self.candidates
            .iter()
            .map(|candidate| GenericDisplayRow {
                name: candidate.clone(),
                description: None,
            })
            .collect()
    }
}

impl WidgetRef for SuggestionPopup {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        render_rows(
            area,
            buf,
            &self.rows(),
            &self.state,
            MAX_POPUP_ROWS,
            "no suggestions",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn popup() -> SuggestionPopup {
        SuggestionPopup::new(vec![
            "hello world".to_string(),
            "hello world cup".to_string(),
            "hello there".to_string(),
        ])
    }

    #[test]
    fn provider_order_is_preserved() {
        let popup = popup();
        assert_eq!(popup.candidates()[0], "hello world");
        assert_eq!(popup.len(), 3);
    }

    #[test]
    fn selection_defaults_to_first_candidate() {
        let mut popup = popup();
        assert_eq!(
            popup.select_or_default(None),
            Some("hello world".to_string())
        );
    }

    #[test]
    fn selection_wraps() {
        let mut popup = popup();
        popup.move_down();
        popup.move_down();
        popup.move_down();
        assert_eq!(popup.selected_idx(), Some(2));
        popup.move_down();
        assert_eq!(popup.selected_idx(), Some(0));
    }
}
