use crate::config::Config;
use crate::core::animator::TypingAnimator;
use crate::core::catalog::{Catalog, LanguageCode};
use crate::core::driver::{AnimationDriver, AnimatorHandle, CursorBlink};
use crate::frontend::tui::language_bar::{self, LanguageButton};
use crate::frontend::FrontendEvent;
use crate::storage::{PreferenceStore, StorageEvent, LANGUAGE_KEY};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use std::sync::Arc;
use tokio::sync::watch;

/// Core application state (frontend-agnostic)
///
/// Owns the running typing animation and cursor blink, the preference store,
/// and the glue that turns clicks, keys and storage changes into language
/// switches. Must be created inside a tokio runtime.
pub struct AppCore {
    /// Application configuration
    pub config: Config,

    /// Lines per language
    pub catalog: Arc<Catalog>,

    /// Where the selected language is persisted
    pub store: PreferenceStore,

    /// Application running flag
    pub running: bool,

    /// Set when anything visible changed since the last frame
    pub needs_render: bool,

    /// Button areas from the last frame, for mouse hit-testing
    pub language_buttons: Vec<LanguageButton>,

    language: LanguageCode,
    animator: Option<AnimatorHandle>,
    display: Option<watch::Receiver<String>>,
    text: String,
    _blink: CursorBlink,
    blink: watch::Receiver<bool>,
    cursor_visible: bool,
}

impl AppCore {
    /// Start the animation in the stored language
    ///
    /// `language_override` behaves like a button click made before startup: it
    /// is written to the store and becomes the initial language.
    pub fn new(
        config: Config,
        store: PreferenceStore,
        language_override: Option<&str>,
    ) -> Result<Self> {
        let catalog = Arc::new(config.catalog.to_catalog()?);

        if let Some(code) = language_override {
            store.set_language(code)?;
        }
        let language = LanguageCode::new(store.language());
        tracing::info!("Starting with language '{}'", language);

        let animator = TypingAnimator::new(
            catalog.clone(),
            config.animation.timing(),
            language.clone(),
        );
        let (target, _) = watch::channel(String::new());
        let animator = AnimationDriver::spawn(animator, Some(target));
        let display = animator.as_ref().map(AnimatorHandle::display);

        let blink_task = CursorBlink::spawn(config.animation.blink_interval());
        let blink = blink_task.subscribe();

        Ok(Self {
            config,
            catalog,
            store,
            running: true,
            needs_render: true,
            language_buttons: Vec::new(),
            language,
            animator,
            display,
            text: String::new(),
            _blink: blink_task,
            blink,
            cursor_visible: true,
        })
    }

    pub fn language(&self) -> &LanguageCode {
        &self.language
    }

    /// Latest displayed banner text (as of the last `refresh`)
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    /// Pull the latest text and blink state from the driver tasks
    pub fn refresh(&mut self) {
        if let Some(display) = self.display.as_mut() {
            if display.has_changed().unwrap_or(false) {
                self.text = display.borrow_and_update().clone();
                self.needs_render = true;
            }
        }
        if self.blink.has_changed().unwrap_or(false) {
            self.cursor_visible = *self.blink.borrow_and_update();
            self.needs_render = true;
        }
    }

    /// Language button activated: persist, then switch
    pub fn select_language(&mut self, code: &str) {
        if let Err(e) = self.store.set_language(code) {
            tracing::warn!("Failed to save language '{}': {}", code, e);
        }
        self.apply_language(LanguageCode::new(code));
    }

    /// Switch the animation unless `code` is already active
    fn apply_language(&mut self, code: LanguageCode) {
        if code == self.language {
            return;
        }
        tracing::info!("Switching language {} -> {}", self.language, code);
        if !self.catalog.contains(&code) {
            tracing::warn!("Unknown language '{}', showing fallback lines", code);
        }
        if let Some(animator) = &self.animator {
            animator.switch_language(code.clone());
        }
        self.language = code;
        self.needs_render = true;
    }

    /// External storage change
    ///
    /// Events can trail the file by a poll, so one whose value has since been
    /// overwritten (by us or anyone else) is dropped.
    pub fn handle_storage_event(&mut self, event: StorageEvent) {
        if event.key != LANGUAGE_KEY {
            return;
        }
        let Some(value) = event.new_value else {
            tracing::debug!("Stored language was removed; keeping '{}'", self.language);
            return;
        };
        if self.store.get(LANGUAGE_KEY).as_deref() != Some(value.as_str()) {
            tracing::debug!("Ignoring stale language change to '{}'", value);
            return;
        }
        self.apply_language(LanguageCode::new(value));
    }

    /// Next language in catalog order, wrapping; first if the current one is unknown
    fn next_language(&self) -> Option<LanguageCode> {
        let codes: Vec<&LanguageCode> = self.catalog.codes().collect();
        let next = match codes.iter().position(|c| **c == self.language) {
            Some(idx) => codes.get((idx + 1) % codes.len()),
            None => codes.first(),
        };
        next.map(|c| (*c).clone())
    }

    /// Language whose code starts with `ch`
    fn language_for_key(&self, ch: char) -> Option<LanguageCode> {
        let ch = ch.to_ascii_lowercase();
        self.catalog
            .codes()
            .find(|code| code.as_str().starts_with(ch))
            .cloned()
    }

    pub fn handle_event(&mut self, event: FrontendEvent) {
        if event.is_quit() {
            self.running = false;
            return;
        }
        match event {
            FrontendEvent::Resize { .. } => self.needs_render = true,
            FrontendEvent::Key { code, modifiers } => self.handle_key(code, modifiers),
            FrontendEvent::Click { column, row } => {
                let clicked =
                    language_bar::hit_test(&self.language_buttons, column, row).cloned();
                if let Some(code) = clicked {
                    self.select_language(code.as_str());
                }
            }
            FrontendEvent::Quit => {}
        }
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        if modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return;
        }
        match code {
            KeyCode::Tab => {
                if let Some(next) = self.next_language() {
                    self.select_language(next.as_str());
                }
            }
            KeyCode::Char(ch) => {
                if let Some(lang) = self.language_for_key(ch) {
                    self.select_language(lang.as_str());
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn core_in(dir: &TempDir, language_override: Option<&str>) -> AppCore {
        let store = PreferenceStore::new(dir.path().join("storage.toml"));
        AppCore::new(Config::default(), store, language_override).unwrap()
    }

    fn key(ch: char) -> FrontendEvent {
        FrontendEvent::key(KeyCode::Char(ch), KeyModifiers::NONE)
    }

    /// Let the driver run `ms` of animation time, then pull its state
    async fn advance(core: &mut AppCore, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        core.refresh();
    }

    #[tokio::test(start_paused = true)]
    async fn test_starts_in_stored_language() {
        let dir = TempDir::new().unwrap();
        PreferenceStore::new(dir.path().join("storage.toml"))
            .set_language("ge")
            .unwrap();

        let mut core = core_in(&dir, None);
        assert_eq!(core.language().as_str(), "ge");

        advance(&mut core, 1).await;
        assert_eq!(core.text(), "გ");
    }

    #[tokio::test(start_paused = true)]
    async fn test_defaults_to_english() {
        let dir = TempDir::new().unwrap();
        let mut core = core_in(&dir, None);
        assert_eq!(core.language().as_str(), "en");

        advance(&mut core, 150).await;
        assert_eq!(core.text(), "He");
    }

    #[tokio::test(start_paused = true)]
    async fn test_override_is_persisted() {
        let dir = TempDir::new().unwrap();
        let core = core_in(&dir, Some("ge"));
        assert_eq!(core.language().as_str(), "ge");
        assert_eq!(core.store.language(), "ge");
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_switches_and_persists() {
        let dir = TempDir::new().unwrap();
        let mut core = core_in(&dir, None);
        advance(&mut core, 350).await;
        assert_eq!(core.text(), "Hell");

        core.handle_event(key('g'));
        assert_eq!(core.language().as_str(), "ge");
        assert_eq!(core.store.language(), "ge");

        advance(&mut core, 1).await;
        assert_eq!(core.text(), "გ");
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_language_key_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut core = core_in(&dir, None);
        advance(&mut core, 250).await;
        let before = core.text().to_string();

        core.handle_event(key('e'));
        advance(&mut core, 1).await;
        assert_eq!(core.text(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tab_cycles_languages() {
        let dir = TempDir::new().unwrap();
        let mut core = core_in(&dir, None);

        core.handle_event(FrontendEvent::key(KeyCode::Tab, KeyModifiers::NONE));
        assert_eq!(core.language().as_str(), "ge");
        core.handle_event(FrontendEvent::key(KeyCode::Tab, KeyModifiers::NONE));
        assert_eq!(core.language().as_str(), "en");
    }

    #[tokio::test(start_paused = true)]
    async fn test_storage_event_switches_language() {
        let dir = TempDir::new().unwrap();
        let mut core = core_in(&dir, None);

        core.handle_storage_event(StorageEvent {
            key: "theme".into(),
            new_value: Some("dark".into()),
        });
        assert_eq!(core.language().as_str(), "en");

        core.handle_storage_event(StorageEvent {
            key: LANGUAGE_KEY.into(),
            new_value: None,
        });
        assert_eq!(core.language().as_str(), "en");

        PreferenceStore::new(core.store.path())
            .set_language("ge")
            .unwrap();
        core.handle_storage_event(StorageEvent {
            key: LANGUAGE_KEY.into(),
            new_value: Some("ge".into()),
        });
        assert_eq!(core.language().as_str(), "ge");
        advance(&mut core, 1).await;
        assert_eq!(core.text(), "გ");
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_on_language_button() {
        let dir = TempDir::new().unwrap();
        let mut core = core_in(&dir, None);

        let area = ratatui::layout::Rect::new(0, 0, 60, 12);
        let mut buf = ratatui::buffer::Buffer::empty(area);
        crate::frontend::tui::app::draw(&mut core, area, &mut buf);
        assert_eq!(core.language_buttons.len(), 2);

        let ge = core.language_buttons[1].area;
        core.handle_event(FrontendEvent::click(ge.x + 1, ge.y));
        assert_eq!(core.language().as_str(), "ge");
        assert_eq!(core.store.language(), "ge");
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_keys() {
        let dir = TempDir::new().unwrap();
        for event in [
            key('q'),
            FrontendEvent::key(KeyCode::Esc, KeyModifiers::NONE),
            FrontendEvent::Quit,
        ] {
            let mut core = core_in(&dir, None);
            core.handle_event(event);
            assert!(!core.running);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_modified_letters_do_not_switch() {
        let dir = TempDir::new().unwrap();
        let mut core = core_in(&dir, None);
        core.handle_event(FrontendEvent::key(KeyCode::Char('g'), KeyModifiers::CONTROL));
        assert_eq!(core.language().as_str(), "en");
        assert!(core.running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_storage_event_is_ignored() {
        let dir = TempDir::new().unwrap();
        let mut core = core_in(&dir, None);

        // The watcher saw our `g` write, but `e` was pressed before it was drained
        core.handle_event(key('g'));
        let late_echo = StorageEvent {
            key: LANGUAGE_KEY.into(),
            new_value: Some("ge".into()),
        };
        core.handle_event(key('e'));
        core.handle_storage_event(late_echo);

        assert_eq!(core.language().as_str(), "en");
        assert_eq!(core.store.language(), "en");
        advance(&mut core, 1).await;
        assert_eq!(core.text(), "H");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cursor_blinks_independently() {
        let dir = TempDir::new().unwrap();
        let mut core = core_in(&dir, None);
        assert!(core.cursor_visible());

        advance(&mut core, 531).await;
        assert!(!core.cursor_visible());
        advance(&mut core, 530).await;
        assert!(core.cursor_visible());
    }
}
