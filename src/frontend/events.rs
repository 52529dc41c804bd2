//! Input events the core understands.
//!
//! The TUI narrows crossterm's event stream down to these: key presses, left
//! clicks on a cell, resizes, and an explicit quit request.

use crossterm::event::{KeyCode, KeyModifiers};

#[derive(Debug, Clone, PartialEq)]
pub enum FrontendEvent {
    /// Key press (repeats and releases are filtered out)
    Key {
        code: KeyCode,
        modifiers: KeyModifiers,
    },
    /// Left button pressed at a terminal cell
    Click { column: u16, row: u16 },
    Resize { width: u16, height: u16 },
    /// Interrupt from the terminal (Ctrl+C in raw mode)
    Quit,
}

impl FrontendEvent {
    pub fn key(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self::Key { code, modifiers }
    }

    pub fn click(column: u16, row: u16) -> Self {
        Self::Click { column, row }
    }

    pub fn resize(width: u16, height: u16) -> Self {
        Self::Resize { width, height }
    }

    /// Whether this event should stop the application
    pub fn is_quit(&self) -> bool {
        match self {
            Self::Quit => true,
            Self::Key { code, .. } => matches!(code, KeyCode::Char('q') | KeyCode::Esc),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_detection() {
        assert!(FrontendEvent::Quit.is_quit());
        assert!(FrontendEvent::key(KeyCode::Char('q'), KeyModifiers::NONE).is_quit());
        assert!(FrontendEvent::key(KeyCode::Esc, KeyModifiers::NONE).is_quit());

        assert!(!FrontendEvent::key(KeyCode::Char('g'), KeyModifiers::NONE).is_quit());
        assert!(!FrontendEvent::click(0, 0).is_quit());
        assert!(!FrontendEvent::resize(80, 24).is_quit());
    }
}
