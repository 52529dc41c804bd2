//! Row of clickable language buttons, one per catalog language.
//!
//! Button areas are computed by [`LanguageBar::layout`] so the same geometry
//! drives both drawing and mouse hit-testing.

use crate::core::catalog::LanguageCode;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
};

/// Gap between buttons
const BUTTON_GAP: u16 = 1;

/// Where a language button was drawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageButton {
    pub code: LanguageCode,
    pub area: Rect,
}

pub struct LanguageBar<'a> {
    codes: Vec<&'a LanguageCode>,
    active: &'a LanguageCode,
}

impl<'a> LanguageBar<'a> {
    pub fn new(codes: impl IntoIterator<Item = &'a LanguageCode>, active: &'a LanguageCode) -> Self {
        Self {
            codes: codes.into_iter().collect(),
            active,
        }
    }

    fn label(code: &LanguageCode) -> String {
        format!("[ {} ]", code.as_str().to_uppercase())
    }

    /// Button rects within `area`; buttons that don't fit are dropped
    pub fn layout(&self, area: Rect) -> Vec<LanguageButton> {
        let mut buttons = Vec::new();
        if area.height == 0 {
            return buttons;
        }

        let right = area.x.saturating_add(area.width);
        let mut x = area.x;
        for code in &self.codes {
            let width = Self::label(code).chars().count() as u16;
            if x.saturating_add(width) > right {
                break;
            }
            buttons.push(LanguageButton {
                code: (*code).clone(),
                area: Rect::new(x, area.y, width, 1),
            });
            x = x.saturating_add(width + BUTTON_GAP);
        }
        buttons
    }

    /// Draw the buttons and return their areas for hit-testing
    pub fn render(&self, area: Rect, buf: &mut Buffer) -> Vec<LanguageButton> {
        let buttons = self.layout(area);

        for button in &buttons {
            let style = if &button.code == self.active {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            buf.set_string(button.area.x, button.area.y, Self::label(&button.code), style);
        }

        buttons
    }
}

/// Language whose button contains the cell (x, y)
pub fn hit_test(buttons: &[LanguageButton], x: u16, y: u16) -> Option<&LanguageCode> {
    buttons
        .iter()
        .find(|b| {
            x >= b.area.x
                && x < b.area.x + b.area.width
                && y >= b.area.y
                && y < b.area.y + b.area.height
        })
        .map(|b| &b.code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes() -> Vec<LanguageCode> {
        vec!["en".into(), "ge".into()]
    }

    #[test]
    fn test_layout_places_buttons_left_to_right() {
        let codes = codes();
        let active = LanguageCode::from("en");
        let bar = LanguageBar::new(&codes, &active);

        let buttons = bar.layout(Rect::new(2, 5, 40, 1));
        assert_eq!(buttons.len(), 2);
        assert_eq!(buttons[0].area, Rect::new(2, 5, 6, 1));
        assert_eq!(buttons[1].area, Rect::new(9, 5, 6, 1));
    }

    #[test]
    fn test_layout_drops_buttons_that_dont_fit() {
        let codes = codes();
        let active = LanguageCode::from("en");
        let bar = LanguageBar::new(&codes, &active);

        assert_eq!(bar.layout(Rect::new(0, 0, 10, 1)).len(), 1);
        assert!(bar.layout(Rect::new(0, 0, 10, 0)).is_empty());
    }

    #[test]
    fn test_render_highlights_active() {
        let codes = codes();
        let active = LanguageCode::from("ge");
        let bar = LanguageBar::new(&codes, &active);
        let area = Rect::new(0, 0, 20, 1);
        let mut buf = Buffer::empty(area);

        let buttons = bar.render(area, &mut buf);
        let text: String = (0..13).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        assert_eq!(text, "[ EN ] [ GE ]");
        assert_eq!(buf[(9, 0)].bg, Color::Cyan);
        assert_ne!(buf[(2, 0)].bg, Color::Cyan);
        assert_eq!(buttons.len(), 2);
    }

    #[test]
    fn test_hit_test() {
        let codes = codes();
        let active = LanguageCode::from("en");
        let buttons = LanguageBar::new(&codes, &active).layout(Rect::new(0, 3, 40, 1));

        assert_eq!(hit_test(&buttons, 0, 3).map(|c| c.as_str()), Some("en"));
        assert_eq!(hit_test(&buttons, 12, 3).map(|c| c.as_str()), Some("ge"));
        // The gap between buttons and other rows miss
        assert_eq!(hit_test(&buttons, 6, 3), None);
        assert_eq!(hit_test(&buttons, 0, 4), None);
    }
}
