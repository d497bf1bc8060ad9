use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use searchica_core::DocumentResult;

/// Scroll state of the document detail view.
#[derive(Debug, Default, Clone)]
pub struct DetailView {
    scroll: u16,
}

impl DetailView {
    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn reset(&mut self) {
        self.scroll = 0;
    }

    /// Scroll by `delta` lines, staying within `0..=max`.
    pub fn scroll_by(&mut self, delta: i16, max: u16) {
        self.scroll = self.scroll.saturating_add_signed(delta).min(max);
    }
}

/// The lines of the detail view for `doc`: headers, a blank line, then
/// the body with its line breaks kept.
pub fn detail_lines(doc: &DocumentResult) -> Vec<Line<'_>> {
    let label = Style::default().fg(Color::Cyan);
    let header = |name: &'static str, value: String| {
        Line::from(vec![Span::styled(name, label), Span::raw(value)])
    };

    let mut lines = vec![
        Line::from(Span::styled(
            doc.display_subject(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        header("From: ", doc.sender.trim().to_string()),
        header("To: ", doc.recipient.trim().to_string()),
    ];
    if let Some(cc) = doc.cc() {
        lines.push(header("CC: ", cc.trim().to_string()));
    }
    lines.push(header("Date: ", doc.long_date()));
    lines.push(Line::default());
    lines.extend(doc.body.lines().map(Line::raw));
    lines
}

fn block() -> Block<'static> {
    Block::default().borders(Borders::ALL)
}

fn paragraph(doc: &DocumentResult) -> Paragraph<'_> {
    Paragraph::new(detail_lines(doc)).wrap(Wrap { trim: false })
}

/// How far `doc` can scroll in a panel of `area` before its last line
/// reaches the bottom.
pub fn max_scroll(doc: &DocumentResult, area: Rect) -> u16 {
    let inner = block().inner(area);
    if inner.width == 0 {
        return 0;
    }
    let lines = paragraph(doc).line_count(inner.width);
    u16::try_from(lines)
        .unwrap_or(u16::MAX)
        .saturating_sub(inner.height)
}

/// Render the detail view of `doc`.
pub fn render(frame: &mut Frame, area: Rect, doc: &DocumentResult, view: &DetailView, focused: bool) {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = block()
        .border_style(border_style)
        .title(format!("Email #{} (score {:.3})", doc.id, doc.score))
        .title_bottom(Line::from(" Esc: back to map ").right_aligned());

    let scroll = view.scroll().min(max_scroll(doc, area));
    let paragraph = paragraph(doc).block(block).scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}
