use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use searchica_core::SearchSession;

/// Lines each result occupies: subject, sender, date.
pub const ROW_HEIGHT: u16 = 3;

/// Scroll and cursor state of the result list.
///
/// Rows are addressed by position in the result list, the same index the
/// plot uses for its points.
#[derive(Debug, Default, Clone)]
pub struct ResultList {
    offset: usize,    // First visible row
    cursor: Option<usize>,
    viewport_rows: usize,
}

impl ResultList {
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Forget scroll and cursor, for a new result set.
    pub fn reset(&mut self) {
        self.offset = 0;
        self.cursor = None;
    }

    /// Record how many rows fit in `area`.
    pub fn set_viewport(&mut self, area: Rect) {
        self.viewport_rows = usize::from(area.height.saturating_sub(2) / ROW_HEIGHT).max(1);
    }

    pub fn viewport_rows(&self) -> usize {
        self.viewport_rows.max(1)
    }

    #[cfg(test)]
    pub fn is_visible(&self, index: usize) -> bool {
        index >= self.offset && index < self.offset + self.viewport_rows()
    }

    /// Scroll so `index` is the first visible row, as far as the list
    /// allows.
    pub fn scroll_to(&mut self, index: usize, len: usize) {
        self.offset = index.min(self.max_offset(len));
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
    }

    pub fn scroll_by(&mut self, delta: isize, len: usize) {
        let offset = self.offset.saturating_add_signed(delta);
        self.offset = offset.min(self.max_offset(len));
    }

    /// Move the keyboard cursor and keep it on screen. Returns the new
    /// cursor row, or `None` for an empty list.
    pub fn move_cursor(&mut self, delta: isize, len: usize) -> Option<usize> {
        if len == 0 {
            self.cursor = None;
            return None;
        }
        let next = match self.cursor {
            Some(current) => current.saturating_add_signed(delta).min(len - 1),
            None => self.offset.min(len - 1),
        };
        self.cursor = Some(next);

        // Scroll down if the cursor went below the visible area
        if next >= self.offset + self.viewport_rows() {
            self.offset = next + 1 - self.viewport_rows();
        }
        // Scroll up if it went above
        if next < self.offset {
            self.offset = next;
        }
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: Option<usize>) {
        self.cursor = cursor;
    }

    /// The row under terminal position `pos`, if any.
    pub fn row_at(&self, area: Rect, pos: Position, len: usize) -> Option<usize> {
        let inner = inner(area);
        if !inner.contains(pos) {
            return None;
        }
        let row = self.offset + usize::from((pos.y - inner.y) / ROW_HEIGHT);
        (row < len).then_some(row)
    }

    fn max_offset(&self, len: usize) -> usize {
        len.saturating_sub(self.viewport_rows())
    }
}

fn inner(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(area)
}

/// Render the result list.
pub fn render(frame: &mut Frame, area: Rect, session: &SearchSession, list: &ResultList, focused: bool) {
    let results = session.results();
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let viewport = list.viewport_rows();
    let title = if results.len() > viewport {
        format!(
            "Results [{}-{} of {}]",
            list.offset() + 1,
            (list.offset() + viewport).min(results.len()),
            results.len()
        )
    } else {
        format!("Results ({})", results.len())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title)
        .title_bottom(Line::from(" g: top ").right_aligned());

    if results.is_empty() {
        let empty = Paragraph::new("")
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let width = usize::from(area.width.saturating_sub(2));
    let items: Vec<ListItem> = results
        .iter()
        .enumerate()
        .skip(list.offset())
        .take(viewport)
        .map(|(i, doc)| {
            let selected = session.selected_index() == Some(i);
            let hovered = session.hovered() == Some(i);

            let style = if selected {
                Style::default().bg(Color::DarkGray).fg(Color::White)
            } else if hovered {
                Style::default().bg(Color::Rgb(40, 40, 60))
            } else {
                Style::default()
            };
            let gutter = if hovered { "\u{258c}" } else { " " };

            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(gutter, Style::default().fg(Color::Cyan)),
                    Span::styled(
                        truncate(doc.display_subject(), width.saturating_sub(1)),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(vec![
                    Span::raw(gutter),
                    Span::styled(
                        truncate(&format!("From: {}", doc.sender.trim()), width.saturating_sub(1)),
                        Style::default().fg(Color::Gray),
                    ),
                ]),
                Line::from(vec![
                    Span::raw(gutter),
                    Span::styled(doc.short_date(), Style::default().fg(Color::DarkGray)),
                ]),
            ])
            .style(style)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('\u{2026}');
    out
}
