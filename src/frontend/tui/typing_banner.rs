//! Prompt line showing the typewriter text and the blinking cursor.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

pub struct TypingBanner<'a> {
    text: &'a str,
    cursor_glyph: &'a str,
    cursor_visible: bool,
}

impl<'a> TypingBanner<'a> {
    pub fn new(text: &'a str, cursor_glyph: &'a str, cursor_visible: bool) -> Self {
        Self {
            text,
            cursor_glyph,
            cursor_visible,
        }
    }
}

impl Widget for TypingBanner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let text_style = Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD);

        // A hidden cursor still occupies its cell so the text never shifts
        let cursor = if self.cursor_visible {
            Span::styled(self.cursor_glyph, Style::default().fg(Color::Green))
        } else {
            Span::raw(" ".repeat(self.cursor_glyph.chars().count()))
        };

        let line = Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::DarkGray)),
            Span::styled(self.text, text_style),
            cursor,
        ]);

        Paragraph::new(line).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area().width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    fn render(text: &str, visible: bool) -> Buffer {
        let area = Rect::new(0, 0, 12, 1);
        let mut buf = Buffer::empty(area);
        TypingBanner::new(text, "▌", visible).render(area, &mut buf);
        buf
    }

    #[test]
    fn test_renders_text_with_cursor() {
        let buf = render("Hi", true);
        assert_eq!(row(&buf, 0), "> Hi▌       ");
    }

    #[test]
    fn test_hidden_cursor_keeps_layout() {
        let buf = render("Hi", false);
        assert_eq!(row(&buf, 0), "> Hi        ");
    }

    #[test]
    fn test_empty_text_shows_only_cursor() {
        let buf = render("", true);
        assert_eq!(row(&buf, 0), "> ▌         ");
    }

    #[test]
    fn test_zero_area_is_noop() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 5, 1));
        TypingBanner::new("Hi", "▌", true).render(Rect::new(0, 0, 0, 0), &mut buf);
        assert_eq!(row(&buf, 0), "     ");
    }
}
