/// Selection and scroll window shared by the popups.
///
/// `selected_idx == None` means "nothing selected yet"; the first Up or Down
/// press lands on index 0, after which both directions wrap.
#[derive(Debug, Default)]
pub(crate) struct ScrollState {
    pub(crate) selected_idx: Option<usize>,
    pub(crate) scroll_top: usize,
}

impl ScrollState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn move_up_wrap(&mut self, len: usize) {
        if len == 0 {
            self.selected_idx = None;
            return;
        }
        self.selected_idx = match self.selected_idx {
            None => Some(0),
            Some(0) => Some(len - 1),
            Some(idx) => Some(idx - 1),
        };
    }

    pub(crate) fn move_down_wrap(&mut self, len: usize) {
        if len == 0 {
            self.selected_idx = None;
            return;
        }
        self.selected_idx = match self.selected_idx {
            None => Some(0),
            Some(idx) => Some((idx + 1) % len),
        };
    }

    /// Force a selection, defaulting to the first row. Used by Enter/Tab when
    /// the user never moved the cursor.
    pub(crate) fn select_or_default(&mut self, idx: Option<usize>, len: usize) {
        if len == 0 {
            self.selected_idx = None;
            return;
        }
        self.selected_idx = Some(idx.unwrap_or(0).min(len - 1));
    }

    /// Keep the selected row inside the visible window.
    pub(crate) fn ensure_visible(&mut self, len: usize, visible_rows: usize) {
        if len == 0 || visible_rows == 0 {
            self.scroll_top = 0;
            return;
        }
        let Some(selected) = self.selected_idx else {
            self.scroll_top = 0;
            return;
        };
        if selected < self.scroll_top {
            self.scroll_top = selected;
        } else if selected >= self.scroll_top + visible_rows {
            self.scroll_top = selected + 1 - visible_rows;
        }
        let max_top = len.saturating_sub(visible_rows);
        self.scroll_top = self.scroll_top.min(max_top);
    }
}
