//! Top-level event loop: multiplexes terminal input and internal
//! [`AppEvent`]s, routes keys into the composer and submissions into the
//! page controller.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::Event;
use crossterm::event::EventStream;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseButton;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;
use futures::StreamExt;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use tokio::sync::mpsc::UnboundedReceiver;

use newtab_core::Resolution;
use newtab_core::resolve_submission;
use newtab_suggest::SuggestReporter;
use newtab_suggest::SuggestSession;

use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;
use crate::composer::InputResult;
use crate::composer::SearchComposer;
use crate::dispatcher::PageController;
use crate::tui::Tui;

/// Grace period between losing terminal focus and dismissing the popup.
const BLUR_GRACE: Duration = Duration::from_millis(150);

/// Forwards session results onto the app event bus; the composer applies
/// them on the UI task.
struct SuggestForwarder {
    app_event_tx: AppEventSender,
}

impl SuggestReporter for SuggestForwarder {
    fn on_results(&self, query: &str, candidates: Vec<String>) {
        self.app_event_tx.send(AppEvent::SuggestResult {
            query: query.to_string(),
            candidates,
        });
    }
}

pub(crate) struct App {
    composer: SearchComposer,
    controller: PageController,
    session: SuggestSession,
    app_event_tx: AppEventSender,
    /// Transient status line (dispatch results, unknown commands, the
    /// update notice).
    notice: Option<String>,
    /// Where the composer was rendered last, for mouse hit testing.
    composer_area: Rect,
    running: bool,
}

impl App {
    pub(crate) fn new(
        composer: SearchComposer,
        controller: PageController,
        suggest_client: newtab_suggest::SuggestClient,
        app_event_tx: AppEventSender,
    ) -> Self {
        let session = SuggestSession::new(
            suggest_client,
            Arc::new(SuggestForwarder {
                app_event_tx: app_event_tx.clone(),
            }),
        );
        Self {
            composer,
            controller,
            session,
            app_event_tx,
            notice: None,
            composer_area: Rect::ZERO,
            running: true,
        }
    }

    pub(crate) async fn run(
        mut self,
        terminal: &mut Tui,
        app_event_rx: &mut UnboundedReceiver<AppEvent>,
    ) -> anyhow::Result<()> {
        let mut terminal_events = EventStream::new();
        self.draw(terminal)?;
        while self.running {
            let needs_redraw = tokio::select! {
                Some(event) = app_event_rx.recv() => self.handle_app_event(event),
                maybe_event = terminal_events.next() => match maybe_event {
                    Some(Ok(event)) => self.handle_terminal_event(event),
                    Some(Err(err)) => {
                        tracing::error!("terminal event stream failed: {err}");
                        false
                    }
                    None => break,
                },
            };
            if needs_redraw && self.running {
                self.draw(terminal)?;
            }
        }
        self.controller.flush_saves().await;
        Ok(())
    }

    fn handle_terminal_event(&mut self, event: Event) -> bool {
        match event {
            Event::Key(key_event) => self.handle_key_event(key_event),
            Event::Mouse(mouse_event) => self.handle_mouse_event(mouse_event),
            Event::FocusLost => {
                self.composer.on_focus_lost();
                let tx = self.app_event_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(BLUR_GRACE).await;
                    tx.send(AppEvent::BlurCheck);
                });
                false
            }
            Event::FocusGained => {
                self.composer.on_focus_gained();
                false
            }
            Event::Resize(_, _) => true,
            Event::Paste(_) => false,
        }
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) -> bool {
        if key_event.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key_event.code, KeyCode::Char('c') | KeyCode::Char('q'))
        {
            self.app_event_tx.send(AppEvent::Exit);
            return false;
        }
        let (result, mut needs_redraw) = self.composer.handle_key_event(key_event);
        if let InputResult::Submitted(text) = result {
            self.handle_submission(&text);
            needs_redraw = true;
        }
        needs_redraw
    }

    fn handle_mouse_event(&mut self, mouse_event: MouseEvent) -> bool {
        match mouse_event.kind {
            MouseEventKind::ScrollUp => {
                self.composer
                    .handle_key_event(KeyEvent::new(KeyCode::Up, KeyModifiers::NONE))
                    .1
            }
            MouseEventKind::ScrollDown => {
                self.composer
                    .handle_key_event(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE))
                    .1
            }
            MouseEventKind::Down(MouseButton::Left) => {
                let Some(offset) = self.popup_row_under(mouse_event.column, mouse_event.row)
                else {
                    return false;
                };
                let Some(idx) = self.composer.popup_row_at(offset) else {
                    return false;
                };
                let (result, needs_redraw) = self.composer.activate_row(idx);
                if let InputResult::Submitted(text) = result {
                    self.handle_submission(&text);
                    return true;
                }
                needs_redraw
            }
            _ => false,
        }
    }

    /// Popup row offset (0 = first rendered row) under a terminal cell, if
    /// the cell is inside the popup area below the input line.
    fn popup_row_under(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.composer_area;
        let inside_columns = column >= area.x && column < area.x + area.width;
        let below_input = row > area.y && row < area.y + area.height;
        (inside_columns && below_input).then(|| usize::from(row - area.y - 1))
    }

    /// The single submission path: Enter on text, an accepted completion, a
    /// popup activation or a click all end up here.
    fn handle_submission(&mut self, text: &str) {
        let resolution = resolve_submission(text, &mut self.controller);
        if let Resolution::UnknownCommand(token) = &resolution {
            self.app_event_tx
                .send(AppEvent::Notice(format!("Unknown command: {token}")));
        }
        self.composer.on_resolution(&resolution);
    }

    fn handle_app_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::ScheduleSuggestFetch(query) => {
                self.session.on_user_query(&query);
                false
            }
            AppEvent::SuggestResult { query, candidates } => {
                self.composer.on_suggest_result(&query, candidates)
            }
            AppEvent::Notice(message) => {
                self.notice = Some(message);
                true
            }
            AppEvent::BlurCheck => self.composer.on_blur_check(),
            AppEvent::OpenUrl(url) => {
                tracing::info!("navigating to {url}");
                self.notice = Some(format!("Opening {url}"));
                true
            }
            AppEvent::Exit => {
                self.running = false;
                false
            }
        }
    }

    fn draw(&mut self, terminal: &mut Tui) -> anyhow::Result<()> {
        terminal.draw(|frame| {
            let area = frame.area();
            if area.height == 0 {
                return;
            }
            let composer_height = self.composer.desired_height().min(area.height);
            let composer_area = Rect {
                height: composer_height,
                ..area
            };
            self.composer_area = composer_area;
            frame.render_widget(&self.composer, composer_area);

            if let Some(notice) = &self.notice
                && area.height > composer_height
            {
                let notice_area = Rect {
                    y: area.y + composer_height,
                    height: 1,
                    ..area
                };
                frame.render_widget(Line::from(notice.clone().dim()), notice_area);
            }

            frame.set_cursor_position((
                area.x + self.composer.cursor_col().min(area.width.saturating_sub(1)),
                composer_area.y,
            ));
        })?;
        Ok(())
    }
}
