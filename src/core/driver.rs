//! Async tasks that put the typing animator and cursor blink on a clock.
//!
//! Each driver owns its state and publishes it through a `watch` channel; the
//! frontend only ever reads. Only one typing tick is pending at a time, and a
//! language switch drops it before the next one is scheduled.

use crate::core::animator::{Phase, TypingAnimator};
use crate::core::catalog::LanguageCode;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

/// Default blink period for the cursor glyph
pub const BLINK_INTERVAL: Duration = Duration::from_millis(530);

#[derive(Debug, Clone)]
pub enum AnimatorCommand {
    SwitchLanguage(LanguageCode),
}

/// Handle to a running typing animation
///
/// Dropping the handle aborts the task.
pub struct AnimatorHandle {
    commands: mpsc::UnboundedSender<AnimatorCommand>,
    display: watch::Receiver<String>,
    task: JoinHandle<()>,
}

impl AnimatorHandle {
    pub fn switch_language(&self, code: LanguageCode) {
        if self
            .commands
            .send(AnimatorCommand::SwitchLanguage(code))
            .is_err()
        {
            tracing::warn!("Typing animation task has stopped; language switch ignored");
        }
    }

    /// Receiver for the displayed text
    pub fn display(&self) -> watch::Receiver<String> {
        self.display.clone()
    }
}

impl Drop for AnimatorHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub struct AnimationDriver;

impl AnimationDriver {
    /// Spawn the tick loop rendering into `target`
    ///
    /// Without a target there is nothing to draw into, so the animation stays
    /// inert and no task is spawned.
    pub fn spawn(
        animator: TypingAnimator,
        target: Option<watch::Sender<String>>,
    ) -> Option<AnimatorHandle> {
        let Some(display) = target else {
            tracing::debug!("No render target for typing animation; not starting");
            return None;
        };

        let (commands, command_rx) = mpsc::unbounded_channel();
        let receiver = display.subscribe();
        let task = tokio::spawn(Self::run(animator, display, command_rx));

        Some(AnimatorHandle {
            commands,
            display: receiver,
            task,
        })
    }

    async fn run(
        mut animator: TypingAnimator,
        display: watch::Sender<String>,
        mut commands: mpsc::UnboundedReceiver<AnimatorCommand>,
    ) {
        tracing::info!("Typing animation started ({})", animator.language());
        animator.start();
        display.send_replace(String::new());

        loop {
            let tick = animator.tick();
            if tick.phase == Phase::PausedAfterLine {
                tracing::trace!("Line complete: {:?}", tick.text);
            }
            display.send_replace(tick.text);

            let sleep = sleep_until(Instant::now() + tick.delay);
            tokio::pin!(sleep);

            loop {
                tokio::select! {
                    _ = &mut sleep => break,
                    cmd = commands.recv() => match cmd {
                        Some(AnimatorCommand::SwitchLanguage(code)) => {
                            if animator.switch_language(code) {
                                // Pending tick is dropped here; restart right away
                                display.send_replace(String::new());
                                break;
                            }
                        }
                        None => {
                            tracing::debug!("Typing animation handle dropped; stopping");
                            return;
                        }
                    },
                }
            }
        }
    }
}

/// Independent periodic toggle for the cursor glyph
pub struct CursorBlink {
    visible: watch::Receiver<bool>,
    task: JoinHandle<()>,
}

impl CursorBlink {
    pub fn spawn(period: Duration) -> Self {
        let (tx, visible) = watch::channel(true);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // First tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                tx.send_modify(|v| *v = !*v);
            }
        });

        Self { visible, task }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.visible.clone()
    }
}

impl Drop for CursorBlink {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::animator::AnimationTiming;
    use crate::core::catalog::Catalog;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn hi_catalog() -> Arc<Catalog> {
        let mut map = BTreeMap::new();
        map.insert(LanguageCode::from("en"), vec!["Hi".to_string()]);
        map.insert(LanguageCode::from("ge"), vec!["გა".to_string()]);
        Arc::new(Catalog::new(map, "en".into()).unwrap())
    }

    fn spawn_hi() -> (AnimatorHandle, watch::Receiver<String>) {
        let animator = TypingAnimator::new(hi_catalog(), AnimationTiming::default(), "en".into());
        let (tx, _) = watch::channel(String::new());
        let handle = AnimationDriver::spawn(animator, Some(tx)).unwrap();
        let rx = handle.display();
        (handle, rx)
    }

    async fn next(rx: &mut watch::Receiver<String>, start: Instant) -> (String, u64) {
        rx.changed().await.unwrap();
        let text = rx.borrow_and_update().clone();
        (text, start.elapsed().as_millis() as u64)
    }

    #[test]
    fn test_no_target_stays_inert() {
        let animator =
            TypingAnimator::new(hi_catalog(), AnimationTiming::default(), "en".into());
        assert!(AnimationDriver::spawn(animator, None).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hi_sequence_on_the_clock() {
        let start = Instant::now();
        let (_handle, mut rx) = spawn_hi();

        let mut seen = Vec::new();
        for _ in 0..7 {
            seen.push(next(&mut rx, start).await);
        }

        let expected: Vec<(String, u64)> = vec![
            ("H", 0),
            ("Hi", 100),
            ("H", 2100),
            ("", 2150),
            ("H", 2250),
            ("Hi", 2350),
            ("H", 4350),
        ]
        .into_iter()
        .map(|(s, t)| (s.to_string(), t))
        .collect();
        assert_eq!(seen, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_cancels_pending_tick() {
        let start = Instant::now();
        let (handle, mut rx) = spawn_hi();

        assert_eq!(next(&mut rx, start).await, ("H".to_string(), 0));
        assert_eq!(next(&mut rx, start).await, ("Hi".to_string(), 100));

        // Mid-pause: the pending 2000ms tick must not fire for the old line
        tokio::time::sleep(Duration::from_millis(500)).await;
        handle.switch_language("ge".into());

        let (text, at) = next(&mut rx, start).await;
        assert_eq!((text.as_str(), at), ("გ", 600));

        let rest: Vec<String> = {
            let mut out = Vec::new();
            for _ in 0..4 {
                out.push(next(&mut rx, start).await.0);
            }
            out
        };
        assert_eq!(rest, vec!["გა", "გ", "", "გ"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_noop_switch_keeps_schedule() {
        let start = Instant::now();
        let (handle, mut rx) = spawn_hi();

        assert_eq!(next(&mut rx, start).await, ("H".to_string(), 0));
        tokio::time::sleep(Duration::from_millis(40)).await;
        handle.switch_language("en".into());

        assert_eq!(next(&mut rx, start).await, ("Hi".to_string(), 100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_task() {
        let (handle, mut rx) = spawn_hi();
        rx.changed().await.unwrap();
        drop(handle);

        // Sender side goes away once the task is aborted
        let mut closed = false;
        for _ in 0..10 {
            if rx.changed().await.is_err() {
                closed = true;
                break;
            }
        }
        assert!(closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cursor_blink_toggles() {
        let start = Instant::now();
        let blink = CursorBlink::spawn(BLINK_INTERVAL);
        let mut rx = blink.subscribe();
        assert!(*rx.borrow());

        rx.changed().await.unwrap();
        assert!(!*rx.borrow_and_update());
        assert_eq!(start.elapsed(), Duration::from_millis(530));

        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update());
        assert_eq!(start.elapsed(), Duration::from_millis(1060));
    }
}
