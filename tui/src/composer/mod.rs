//! The search composer: a single input line that disambiguates between the
//! `//` command grammar, free-text search with remote autocomplete, and
//! ghost-text inline completion.
//!
//! All key handling goes through [`SearchComposer::handle_key_event`], which
//! picks a handler by priority: an active inline completion first, then a
//! visible popup, then plain input. Submissions are returned as
//! [`InputResult::Submitted`]; the app resolves them through
//! `newtab_core::resolve_submission` and reports the outcome back via
//! [`SearchComposer::on_resolution`], which decides whether the field is
//! cleared (an unknown command keeps the text so the user can correct it).

use std::time::Instant;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Widget;
use ratatui::widgets::WidgetRef;

use newtab_core::COMMAND_PREFIX;
use newtab_core::InputMode;
use newtab_core::Resolution;
use newtab_core::classify_input;
use newtab_core::parse_command_line;

use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;

mod command_popup;
mod popup_consts;
mod scroll_state;
mod selection_popup_common;
mod submit_guard;
mod suggestion_popup;

use command_popup::CommandPopup;
use submit_guard::SubmitGuard;
use suggestion_popup::SuggestionPopup;

/// Result of handling one key event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InputResult {
    None,
    /// A line was submitted. The composer has not cleared itself yet; the
    /// app resolves the line and reports back through `on_resolution`.
    Submitted(String),
}

enum ActivePopup {
    None,
    Command(CommandPopup),
    Suggest(SuggestionPopup),
}

pub(crate) struct SearchComposer {
    text: String,
    /// Byte offset of the cursor into `text`, always on a char boundary.
    cursor: usize,
    active_popup: ActivePopup,
    /// Full inline completion (raw text + candidate suffix). Search mode
    /// only; committing or accepting it is a real input action.
    ghost: Option<String>,
    /// Display-only argument hint for an exactly-typed command, e.g.
    /// `//bg URL`. Never committed into the text.
    usage_preview: Option<String>,
    /// Trimmed lower-cased free-text query the session was last told about.
    /// Incoming results for any other query are stale and dropped.
    current_query: String,
    submit_guard: SubmitGuard,
    focused: bool,
    app_event_tx: AppEventSender,
}

impl SearchComposer {
    pub(crate) fn new(app_event_tx: AppEventSender) -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            active_popup: ActivePopup::None,
            ghost: None,
            usage_preview: None,
            current_query: String::new(),
            submit_guard: SubmitGuard::new(),
            focused: true,
            app_event_tx,
        }
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn mode(&self) -> InputMode {
        classify_input(&self.text)
    }

    /// Handle a key event coming from the main UI.
    pub(crate) fn handle_key_event(&mut self, key_event: KeyEvent) -> (InputResult, bool) {
        self.handle_key_event_with_time(key_event, Instant::now())
    }

    pub(crate) fn handle_key_event_with_time(
        &mut self,
        key_event: KeyEvent,
        now: Instant,
    ) -> (InputResult, bool) {
        if key_event.kind == KeyEventKind::Release {
            return (InputResult::None, false);
        }

        // Ghost-text bindings take precedence over the popup; every other
        // key falls through to the popup or plain handling below.
        if self.ghost.is_some()
            && matches!(
                key_event.code,
                KeyCode::Enter | KeyCode::Tab | KeyCode::Right | KeyCode::Esc
            )
        {
            return self.handle_key_event_with_ghost(key_event, now);
        }

        enum PopupKind {
            None,
            Command,
            Suggest,
        }
        let popup_kind = match &self.active_popup {
            ActivePopup::Command(popup) if !popup.is_empty() => PopupKind::Command,
            ActivePopup::Suggest(popup) if !popup.is_empty() => PopupKind::Suggest,
            _ => PopupKind::None,
        };
        match popup_kind {
            PopupKind::Command => self.handle_key_event_with_command_popup(key_event, now),
            PopupKind::Suggest => self.handle_key_event_with_suggestion_popup(key_event, now),
            PopupKind::None => self.handle_key_event_without_popup(key_event, now),
        }
    }

    fn handle_key_event_with_ghost(
        &mut self,
        key_event: KeyEvent,
        now: Instant,
    ) -> (InputResult, bool) {
        let Some(ghost) = self.ghost.clone() else {
            return (InputResult::None, false);
        };
        match key_event.code {
            KeyCode::Enter => {
                if !self.submit_guard.try_begin(now) {
                    return (InputResult::None, true);
                }
                self.ghost = None;
                self.active_popup = ActivePopup::None;
                (InputResult::Submitted(ghost), true)
            }
            KeyCode::Tab | KeyCode::Right => {
                // Commit the completion into the field without submitting.
                self.text = ghost;
                self.cursor = self.text.len();
                self.ghost = None;
                self.active_popup = ActivePopup::None;
                self.current_query = self.text.trim().to_lowercase();
                (InputResult::None, true)
            }
            KeyCode::Esc => {
                // Only the ghost goes away; text and popup stay.
                self.ghost = None;
                (InputResult::None, true)
            }
            _ => (InputResult::None, false),
        }
    }

    fn handle_key_event_with_command_popup(
        &mut self,
        key_event: KeyEvent,
        now: Instant,
    ) -> (InputResult, bool) {
        match key_event.code {
            KeyCode::Up => {
                if let ActivePopup::Command(popup) = &mut self.active_popup {
                    popup.move_up();
                }
                (InputResult::None, true)
            }
            KeyCode::Down => {
                if let ActivePopup::Command(popup) = &mut self.active_popup {
                    popup.move_down();
                }
                (InputResult::None, true)
            }
            KeyCode::Esc => {
                self.active_popup = ActivePopup::None;
                (InputResult::None, true)
            }
            KeyCode::Tab => {
                let selected = if let ActivePopup::Command(popup) = &mut self.active_popup {
                    popup.select_or_default(popup.selected_idx())
                } else {
                    None
                };
                if let Some(command) = selected {
                    // Apply the key plus a trailing space to invite the
                    // argument; the text pipeline hides the popup.
                    self.set_text(format!("{} ", command.key()));
                }
                (InputResult::None, true)
            }
            KeyCode::Enter => self.activate_selected_command(None, now),
            _ => self.handle_input_basic(key_event),
        }
    }

    fn handle_key_event_with_suggestion_popup(
        &mut self,
        key_event: KeyEvent,
        now: Instant,
    ) -> (InputResult, bool) {
        match key_event.code {
            KeyCode::Up => {
                if let ActivePopup::Suggest(popup) = &mut self.active_popup {
                    popup.move_up();
                }
                (InputResult::None, true)
            }
            KeyCode::Down => {
                if let ActivePopup::Suggest(popup) = &mut self.active_popup {
                    popup.move_down();
                }
                (InputResult::None, true)
            }
            KeyCode::Esc => {
                self.active_popup = ActivePopup::None;
                (InputResult::None, true)
            }
            KeyCode::Tab => {
                let selected = if let ActivePopup::Suggest(popup) = &mut self.active_popup {
                    popup.select_or_default(popup.selected_idx())
                } else {
                    None
                };
                if let Some(candidate) = selected {
                    self.text = candidate;
                    self.cursor = self.text.len();
                    self.ghost = None;
                    self.active_popup = ActivePopup::None;
                    self.current_query = self.text.trim().to_lowercase();
                }
                (InputResult::None, true)
            }
            KeyCode::Enter => self.activate_selected_suggestion(None, now),
            _ => self.handle_input_basic(key_event),
        }
    }

    fn handle_key_event_without_popup(
        &mut self,
        key_event: KeyEvent,
        now: Instant,
    ) -> (InputResult, bool) {
        match key_event.code {
            KeyCode::Enter => {
                if self.text.trim().is_empty() {
                    return (InputResult::None, false);
                }
                if !self.submit_guard.try_begin(now) {
                    return (InputResult::None, true);
                }
                (InputResult::Submitted(self.text.clone()), true)
            }
            _ => self.handle_input_basic(key_event),
        }
    }

    fn handle_input_basic(&mut self, key_event: KeyEvent) -> (InputResult, bool) {
        if key_event
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return (InputResult::None, false);
        }
        match key_event.code {
            KeyCode::Char(ch) => {
                self.text.insert(self.cursor, ch);
                self.cursor += ch.len_utf8();
                self.on_text_changed();
                (InputResult::None, true)
            }
            KeyCode::Backspace => {
                if let Some(prev) = self.prev_char_boundary() {
                    self.text.replace_range(prev..self.cursor, "");
                    self.cursor = prev;
                    self.on_text_changed();
                }
                (InputResult::None, true)
            }
            KeyCode::Delete => {
                if let Some(next) = self.next_char_boundary() {
                    self.text.replace_range(self.cursor..next, "");
                    self.on_text_changed();
                }
                (InputResult::None, true)
            }
            KeyCode::Left => {
                if let Some(prev) = self.prev_char_boundary() {
                    self.cursor = prev;
                }
                (InputResult::None, true)
            }
            KeyCode::Right => {
                if let Some(next) = self.next_char_boundary() {
                    self.cursor = next;
                }
                (InputResult::None, true)
            }
            KeyCode::Home => {
                self.cursor = 0;
                (InputResult::None, true)
            }
            KeyCode::End => {
                self.cursor = self.text.len();
                (InputResult::None, true)
            }
            _ => (InputResult::None, false),
        }
    }

    fn prev_char_boundary(&self) -> Option<usize> {
        let ch = self.text[..self.cursor].chars().next_back()?;
        Some(self.cursor - ch.len_utf8())
    }

    fn next_char_boundary(&self) -> Option<usize> {
        let ch = self.text[self.cursor..].chars().next()?;
        Some(self.cursor + ch.len_utf8())
    }

    fn activate_selected_command(
        &mut self,
        idx: Option<usize>,
        now: Instant,
    ) -> (InputResult, bool) {
        let selected = if let ActivePopup::Command(popup) = &mut self.active_popup {
            let current = popup.selected_idx();
            popup.select_or_default(idx.or(current))
        } else {
            None
        };
        let Some(command) = selected else {
            return (InputResult::None, true);
        };
        if command.takes_args() {
            // Insert `//key ` and re-run the text pipeline instead of
            // submitting; the user still owes an argument.
            self.set_text(format!("{} ", command.key()));
            (InputResult::None, true)
        } else if self.submit_guard.try_begin(now) {
            self.active_popup = ActivePopup::None;
            self.ghost = None;
            (InputResult::Submitted(command.key()), true)
        } else {
            (InputResult::None, true)
        }
    }

    fn activate_selected_suggestion(
        &mut self,
        idx: Option<usize>,
        now: Instant,
    ) -> (InputResult, bool) {
        let selected = if let ActivePopup::Suggest(popup) = &mut self.active_popup {
            let current = popup.selected_idx();
            popup.select_or_default(idx.or(current))
        } else {
            None
        };
        let Some(candidate) = selected else {
            return (InputResult::None, true);
        };
        if self.submit_guard.try_begin(now) {
            self.active_popup = ActivePopup::None;
            self.ghost = None;
            (InputResult::Submitted(candidate), true)
        } else {
            (InputResult::None, true)
        }
    }

    /// Mouse click on a rendered popup row. Resolves exactly like Enter on
    /// that row.
    pub(crate) fn activate_row(&mut self, idx: usize) -> (InputResult, bool) {
        self.activate_row_with_time(idx, Instant::now())
    }

    fn activate_row_with_time(&mut self, idx: usize, now: Instant) -> (InputResult, bool) {
        match &self.active_popup {
            ActivePopup::Command(_) => self.activate_selected_command(Some(idx), now),
            ActivePopup::Suggest(_) => self.activate_selected_suggestion(Some(idx), now),
            ActivePopup::None => (InputResult::None, false),
        }
    }

    /// Replace the text and run the change pipeline, as if typed.
    fn set_text(&mut self, text: String) {
        self.text = text;
        self.cursor = self.text.len();
        self.on_text_changed();
    }

    /// Recompute popup/ghost state from the current text. Suggestions and
    /// selection are rebuilt wholesale, never patched.
    fn on_text_changed(&mut self) {
        self.ghost = None;
        self.usage_preview = None;
        match classify_input(&self.text) {
            InputMode::Idle => {
                self.active_popup = ActivePopup::None;
                self.set_current_query(String::new());
            }
            InputMode::Command => {
                self.set_current_query(String::new());
                self.update_command_popup();
            }
            InputMode::Search => {
                if let ActivePopup::Command(_) = self.active_popup {
                    self.active_popup = ActivePopup::None;
                }
                if let ActivePopup::Suggest(popup) = &mut self.active_popup {
                    popup.clear_selection();
                }
                let query = self.text.trim().to_lowercase();
                self.set_current_query(query);
            }
        }
    }

    /// Track the query the suggestion session should be working on. An empty
    /// query tells the session to invalidate pending fetches.
    fn set_current_query(&mut self, query: String) {
        if query == self.current_query {
            return;
        }
        self.current_query.clear();
        self.current_query.push_str(&query);
        self.app_event_tx.send(AppEvent::ScheduleSuggestFetch(query));
    }

    fn update_command_popup(&mut self) {
        let trimmed = self.text.trim();
        if let Some(line) = parse_command_line(trimmed)
            && let Some(command) = line.command
            && self.text.ends_with(' ')
        {
            // The key is fully typed and an argument is being entered:
            // suppress the popup and preview the usage placeholder.
            self.active_popup = ActivePopup::None;
            if let Some(placeholder) = command.placeholder() {
                self.usage_preview = Some(format!("{}{placeholder}", self.text));
            }
            return;
        }
        let filter = trimmed[COMMAND_PREFIX.len()..].to_lowercase();
        let popup = CommandPopup::new(&filter);
        self.active_popup = if popup.is_empty() {
            ActivePopup::None
        } else {
            ActivePopup::Command(popup)
        };
    }

    /// Apply candidates that arrived for `query`. Returns true when the
    /// composer state changed. Results for anything but the current query
    /// are stale and ignored, regardless of arrival order.
    pub(crate) fn on_suggest_result(&mut self, query: &str, candidates: Vec<String>) -> bool {
        if self.mode() != InputMode::Search || query != self.current_query {
            return false;
        }
        if candidates.is_empty() {
            self.active_popup = ActivePopup::None;
            self.ghost = None;
            return true;
        }
        self.ghost = inline_completion(&self.text, &self.current_query, &candidates[0]);
        self.active_popup = ActivePopup::Suggest(SuggestionPopup::new(candidates));
        true
    }

    /// Apply the outcome of resolving a submitted line.
    pub(crate) fn on_resolution(&mut self, resolution: &Resolution) {
        if resolution.should_clear_input() {
            self.text.clear();
            self.cursor = 0;
            self.active_popup = ActivePopup::None;
            self.ghost = None;
            self.usage_preview = None;
            self.set_current_query(String::new());
        }
    }

    pub(crate) fn on_focus_gained(&mut self) {
        self.focused = true;
    }

    pub(crate) fn on_focus_lost(&mut self) {
        self.focused = false;
    }

    /// Called a grace period after focus was lost. Dismisses the popup if
    /// focus never came back; the text is preserved.
    pub(crate) fn on_blur_check(&mut self) -> bool {
        if self.focused {
            return false;
        }
        match &mut self.active_popup {
            ActivePopup::None => false,
            _ => {
                self.active_popup = ActivePopup::None;
                true
            }
        }
    }

    /// Index of the popup row at `offset` rows below the input line, if a
    /// row is rendered there.
    pub(crate) fn popup_row_at(&self, offset: usize) -> Option<usize> {
        let len = match &self.active_popup {
            ActivePopup::Command(popup) => popup.len(),
            ActivePopup::Suggest(popup) => popup.len(),
            ActivePopup::None => return None,
        };
        let idx = self.popup_scroll_top() + offset;
        (idx < len).then_some(idx)
    }

    fn popup_scroll_top(&self) -> usize {
        match &self.active_popup {
            ActivePopup::Command(popup) => popup.scroll_top(),
            ActivePopup::Suggest(popup) => popup.scroll_top(),
            ActivePopup::None => 0,
        }
    }

    /// One line of input plus however many rows the popup wants.
    pub(crate) fn desired_height(&self) -> u16 {
        let popup = match &self.active_popup {
            ActivePopup::Command(popup) => popup.desired_height(),
            ActivePopup::Suggest(popup) => popup.desired_height(),
            ActivePopup::None => 0,
        };
        1 + popup
    }

    /// Terminal column of the cursor within the composer's first line,
    /// saturating for input longer than a terminal row can address.
    pub(crate) fn cursor_col(&self) -> u16 {
        let prefix = self.text[..self.cursor].chars().count();
        u16::try_from(PROMPT.chars().count() + prefix).unwrap_or(u16::MAX)
    }
}

const PROMPT: &str = "› ";

/// Build the inline completion for the top candidate: the candidate must
/// case-insensitively start with the query and be strictly longer. The
/// completion keeps the raw text as typed and appends the candidate's
/// suffix.
fn inline_completion(raw: &str, query: &str, top: &str) -> Option<String> {
    let mut top_chars = top.chars();
    for query_ch in query.chars() {
        let top_ch = top_chars.next()?;
        if !top_ch.to_lowercase().eq(query_ch.to_lowercase()) {
            return None;
        }
    }
    let suffix: String = top_chars.collect();
    if suffix.is_empty() {
        None
    } else {
        Some(format!("{raw}{suffix}"))
    }
}

impl WidgetRef for SearchComposer {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let input_area = Rect { height: 1, ..area };
        let mut spans: Vec<Span> = vec![PROMPT.cyan()];
        if self.text.is_empty() {
            spans.push("Search or type // for commands".dim().italic());
        } else {
            spans.push(Span::raw(self.text.clone()));
            let overlay = self.ghost.as_deref().or(self.usage_preview.as_deref());
            if let Some(overlay) = overlay
                && let Some(suffix) = overlay.strip_prefix(self.text.as_str())
            {
                spans.push(suffix.to_string().dim());
            }
        }
        Line::from(spans).render(input_area, buf);

        if area.height > 1 {
            let popup_area = Rect {
                y: area.y + 1,
                height: area.height - 1,
                ..area
            };
            match &self.active_popup {
                ActivePopup::Command(popup) => popup.render_ref(popup_area, buf),
                ActivePopup::Suggest(popup) => popup.render_ref(popup_area, buf),
                ActivePopup::None => {}
            }
        }
    }
}
