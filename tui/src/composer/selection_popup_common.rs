use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Widget;

use super::scroll_state::ScrollState;

/// Render-ready representation of one row in a selection popup.
pub(crate) struct GenericDisplayRow {
    pub name: String,
    /// Optional grey text after the name.
    pub description: Option<String>,
}

/// Number of terminal rows the popup wants for `rows`.
pub(crate) fn measure_rows_height(rows: &[GenericDisplayRow], max_rows: usize) -> u16 {
    rows.len().clamp(1, max_rows) as u16
}

/// Paint popup rows into `area`, highlighting the selected one and keeping it
/// inside the scroll window computed by the caller's `ScrollState`.
pub(crate) fn render_rows(
    area: Rect,
    buf: &mut Buffer,
    rows: &[GenericDisplayRow],
    state: &ScrollState,
    max_rows: usize,
    empty_message: &str,
) {
    if area.height == 0 {
        return;
    }
    if rows.is_empty() {
        Line::from(empty_message.dim().italic()).render(row_rect(area, 0), buf);
        return;
    }

    let visible = (area.height as usize).min(max_rows).min(rows.len());
    let top = state.scroll_top.min(rows.len().saturating_sub(visible));
    for (offset, (idx, row)) in rows.iter().enumerate().skip(top).take(visible).enumerate() {
        let selected = state.selected_idx == Some(idx);
        let mut spans: Vec<Span> = Vec::new();
        if selected {
            spans.push(Span::styled(format!("› {}", row.name), Style::new().bold()));
        } else {
            spans.push(Span::raw(format!("  {}", row.name)));
        }
        if let Some(description) = &row.description {
            spans.push(Span::raw("  "));
            spans.push(description.clone().dim());
        }
        Line::from(spans).render(row_rect(area, offset as u16), buf);
    }
}

fn row_rect(area: Rect, offset: u16) -> Rect {
    Rect {
        x: area.x,
        y: area.y + offset,
        width: area.width,
        height: 1,
    }
}
