use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

const WIDTH: u16 = 64;
const HEIGHT: u16 = 19;

/// The welcome dialog shown when the client starts.
#[derive(Debug, Clone)]
pub struct Onboarding {
    visible: bool,
}

impl Onboarding {
    pub fn new(show: bool) -> Self {
        Self { visible: show }
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn dismiss(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Handle a key while the dialog is open. Returns `true` if the key was
    /// consumed, which is every key while the dialog is visible.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if !self.visible {
            return false;
        }
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            self.dismiss();
        }
        true
    }
}

fn popup_area(area: Rect) -> Rect {
    let width = WIDTH.min(area.width);
    let height = HEIGHT.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn body() -> Vec<Line<'static>> {
    let key = Style::default().fg(Color::Cyan);
    vec![
        Line::from("Type a question or a topic and press Enter. Searchica finds"),
        Line::from("emails by meaning, not just by keywords."),
        Line::default(),
        Line::from("Every result is a point on the map. Similar emails sit close"),
        Line::from("together."),
        Line::from(vec![
            Span::styled("  red", Style::default().fg(Color::Red)),
            Span::raw(" points are more relevant, "),
            Span::styled("blue", Style::default().fg(Color::Blue)),
            Span::raw(" points less."),
        ]),
        Line::default(),
        Line::from(vec![
            Span::styled("  Tab", key),
            Span::raw("        switch between search, results and map"),
        ]),
        Line::from(vec![
            Span::styled("  \u{2191}/\u{2193}", key),
            Span::raw("        hover a result to find it on the map"),
        ]),
        Line::from(vec![
            Span::styled("  Enter", key),
            Span::raw("      open or close the selected email"),
        ]),
        Line::from(vec![
            Span::styled("  \u{2190}/\u{2192}", key),
            Span::raw("        walk the map; Enter jumps to the result"),
        ]),
        Line::from(vec![
            Span::styled("  +/-", key),
            Span::raw("        zoom in on a point to see related emails"),
        ]),
        Line::from(vec![
            Span::styled("  mouse", key),
            Span::raw("      hover and click work on rows and points"),
        ]),
        Line::from(vec![
            Span::styled("  ?", key),
            Span::raw("          show this again    "),
            Span::styled("q", key),
            Span::raw(" quit"),
        ]),
    ]
}

/// Render the dialog over whatever is on screen.
pub fn render(frame: &mut Frame, area: Rect) {
    let popup = popup_area(area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Welcome to Searchica ")
        .title_bottom(
            Line::from(Span::styled(
                " [ Got it! ] (Enter) ",
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .centered(),
        );
    let paragraph = Paragraph::new(body())
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, popup);
}
