//! Typewriter state machine for the banner text.
//!
//! The animator is pure: `tick()` advances the cursor one step and reports the
//! text to show plus how long to wait before the next tick. Scheduling lives in
//! [`crate::core::driver`].

use crate::core::catalog::{Catalog, LanguageCode};
use std::sync::Arc;
use std::time::Duration;

/// Delay per typed character
pub const TYPING_DELAY: Duration = Duration::from_millis(100);
/// Delay per deleted character
pub const DELETING_DELAY: Duration = Duration::from_millis(50);
/// Hold time once a line is fully typed
pub const PAUSE_DELAY: Duration = Duration::from_millis(2000);

/// Fixed delays between ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationTiming {
    pub typing: Duration,
    pub deleting: Duration,
    pub pause: Duration,
}

impl Default for AnimationTiming {
    fn default() -> Self {
        Self {
            typing: TYPING_DELAY,
            deleting: DELETING_DELAY,
            pause: PAUSE_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Typing,
    PausedAfterLine,
    Deleting,
}

/// Position of the animation within the active line set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub language: LanguageCode,
    pub line_index: usize,
    /// Counted in chars, never bytes
    pub char_index: usize,
    pub phase: Phase,
}

impl Cursor {
    pub fn new(language: LanguageCode) -> Self {
        Self {
            language,
            line_index: 0,
            char_index: 0,
            phase: Phase::Typing,
        }
    }
}

/// Outcome of one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    pub text: String,
    pub phase: Phase,
    pub delay: Duration,
}

pub struct TypingAnimator {
    catalog: Arc<Catalog>,
    timing: AnimationTiming,
    cursor: Cursor,
    text: String,
}

impl TypingAnimator {
    pub fn new(catalog: Arc<Catalog>, timing: AnimationTiming, language: LanguageCode) -> Self {
        Self {
            catalog,
            timing,
            cursor: Cursor::new(language),
            text: String::new(),
        }
    }

    #[cfg(test)]
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn language(&self) -> &LanguageCode {
        &self.cursor.language
    }

    /// Currently displayed text
    #[cfg(test)]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Reset to the first line of the active language and clear the text
    pub fn start(&mut self) {
        self.cursor = Cursor::new(self.cursor.language.clone());
        self.text.clear();
    }

    /// Switch to `code` and restart. Returns false (and changes nothing) if
    /// `code` is already active.
    pub fn switch_language(&mut self, code: LanguageCode) -> bool {
        if code == self.cursor.language {
            return false;
        }
        tracing::debug!("Typing animation switching {} -> {}", self.cursor.language, code);
        self.cursor = Cursor::new(code);
        self.text.clear();
        true
    }

    /// Advance one step
    pub fn tick(&mut self) -> Tick {
        let lines = self.catalog.lines_for(&self.cursor.language);
        let line = lines
            .get(self.cursor.line_index)
            .map(String::as_str)
            .unwrap_or("");
        let len = line.chars().count();

        let delay = match self.cursor.phase {
            Phase::Typing => {
                if self.cursor.char_index < len {
                    self.cursor.char_index += 1;
                }
                if self.cursor.char_index == len {
                    self.cursor.phase = Phase::PausedAfterLine;
                    self.timing.pause
                } else {
                    self.timing.typing
                }
            }
            // The tick that ends the pause already deletes the first char
            Phase::PausedAfterLine | Phase::Deleting => {
                self.cursor.char_index = self.cursor.char_index.saturating_sub(1);
                if self.cursor.char_index == 0 {
                    self.cursor.line_index = (self.cursor.line_index + 1) % lines.len().max(1);
                    self.cursor.phase = Phase::Typing;
                    self.timing.typing
                } else {
                    self.cursor.phase = Phase::Deleting;
                    self.timing.deleting
                }
            }
        };

        self.text.clear();
        self.text.push_str(char_prefix(line, self.cursor.char_index));

        Tick {
            text: self.text.clone(),
            phase: self.cursor.phase,
            delay,
        }
    }
}

/// First `count` chars of `line`
fn char_prefix(line: &str, count: usize) -> &str {
    match line.char_indices().nth(count) {
        Some((byte_idx, _)) => &line[..byte_idx],
        None => line,
    }
}
