use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Width of the `[ Search ]` button at the right of the bar.
pub const BUTTON_WIDTH: u16 = 12;

/// Text input for the query.
///
/// Holds the text and a cursor counted in characters. The text is
/// submitted exactly as typed.
#[derive(Debug, Default, Clone)]
pub struct SearchBar {
    value: String,
    cursor: usize,
}

impl SearchBar {
    /// Create the bar, optionally prefilled with `initial`.
    pub fn new(initial: Option<String>) -> Self {
        let value = initial.unwrap_or_default();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The query to send.
    pub fn submit(&self) -> String {
        self.value.clone()
    }

    /// Apply an editing key. Returns `false` for keys the bar does not use.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('u') if ctrl => {
                self.value.clear();
                self.cursor = 0;
            }
            KeyCode::Char('a') if ctrl => self.cursor = 0,
            KeyCode::Char('e') if ctrl => self.cursor = self.len(),
            KeyCode::Char(c) if !ctrl => {
                let at = self.byte_index(self.cursor);
                self.value.insert(at, c);
                self.cursor += 1;
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.len() {
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                }
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.len(),
            _ => return false,
        }
        true
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map_or(self.value.len(), |(i, _)| i)
    }
}

/// Split the bar's area into the input and the button.
pub fn split(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(BUTTON_WIDTH)])
        .split(area);
    (chunks[0], chunks[1])
}

/// Render the search bar.
pub fn render(frame: &mut Frame, area: Rect, bar: &SearchBar, focused: bool, searching: bool) {
    let (input_area, button_area) = split(area);

    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let text = if bar.value().is_empty() && !focused {
        Span::styled("Search...", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(bar.value())
    };
    let input = Paragraph::new(Line::from(text)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title("Searchica"),
    );
    frame.render_widget(input, input_area);

    let label = if searching { " ...  " } else { "Search" };
    let button = Paragraph::new(label)
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(button, button_area);

    if focused {
        let before: usize = bar
            .value()
            .chars()
            .take(bar.cursor())
            .map(|c| if c.is_ascii() { 1 } else { 2 })
            .sum();
        let max_x = input_area.right().saturating_sub(2);
        let x = (input_area.x + 1 + before as u16).min(max_x);
        frame.set_cursor_position(Position::new(x, input_area.y + 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(bar: &mut SearchBar, s: &str) {
        for c in s.chars() {
            bar.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_prefilled_query() {
        let bar = SearchBar::new(Some("budget".to_string()));
        assert_eq!(bar.value(), "budget");
        assert_eq!(bar.cursor(), 6);
        assert_eq!(bar.submit(), "budget");
    }

    #[test]
    fn test_empty_by_default_and_submits_empty() {
        let bar = SearchBar::new(None);
        assert_eq!(bar.submit(), "");
    }

    #[test]
    fn test_typing_and_editing() {
        let mut bar = SearchBar::default();
        type_str(&mut bar, "raptor");
        bar.handle_key(key(KeyCode::Home));
        type_str(&mut bar, "the ");
        assert_eq!(bar.value(), "the raptor");

        bar.handle_key(key(KeyCode::End));
        bar.handle_key(key(KeyCode::Backspace));
        bar.handle_key(key(KeyCode::Left));
        bar.handle_key(key(KeyCode::Delete));
        assert_eq!(bar.value(), "the rapt");
    }

    #[test]
    fn test_submit_keeps_whitespace() {
        let mut bar = SearchBar::default();
        type_str(&mut bar, "  spaced  ");
        assert_eq!(bar.submit(), "  spaced  ");
    }

    #[test]
    fn test_multibyte_editing() {
        let mut bar = SearchBar::default();
        type_str(&mut bar, "café");
        bar.handle_key(key(KeyCode::Backspace));
        assert_eq!(bar.value(), "caf");
        bar.handle_key(key(KeyCode::Left));
        type_str(&mut bar, "ñ");
        assert_eq!(bar.value(), "cañf");
    }

    #[test]
    fn test_ctrl_u_clears() {
        let mut bar = SearchBar::new(Some("anything".to_string()));
        bar.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(bar.value(), "");
        assert_eq!(bar.cursor(), 0);
    }

    #[test]
    fn test_unused_keys_are_not_consumed() {
        let mut bar = SearchBar::default();
        assert!(!bar.handle_key(key(KeyCode::Tab)));
        assert!(!bar.handle_key(key(KeyCode::Enter)));
    }
}
