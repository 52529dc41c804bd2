//! Frontend abstraction layer
//!
//! Defines the `Frontend` trait the terminal UI implements. The core never
//! touches the terminal directly; it hands itself to `render` once per frame.

pub mod events;
pub mod tui;

use crate::core::AppCore;
use anyhow::Result;
pub use events::FrontendEvent;
pub use tui::TuiFrontend;

/// Frontend trait - the surface the main loop drives
///
/// Keeps terminal handling out of [`AppCore`]: the loop polls events, feeds
/// them to the core, and asks the frontend to draw when the core is dirty.
pub trait Frontend {
    /// Poll for user input events
    ///
    /// Waits at most the configured poll timeout, then returns everything that
    /// arrived, already narrowed to [`FrontendEvent`]. Events the core has no
    /// use for (key releases, mouse motion, focus changes) are dropped here.
    ///
    /// # Returns
    /// - `Ok(Vec<FrontendEvent>)` - Pending events (empty if none arrived)
    /// - `Err(...)` - If reading from the terminal failed
    fn poll_events(&mut self) -> Result<Vec<FrontendEvent>>;

    /// Render the current application state
    ///
    /// Called by the main loop only while `app.needs_render` is set; a
    /// successful render clears the flag.
    ///
    /// # Arguments
    /// - `app` - Mutable because the language bar records its button areas on
    ///   the core while drawing, for the next click's hit test
    ///
    /// # Returns
    /// - `Ok(())` - Frame drawn
    /// - `Err(...)` - If writing to the terminal failed
    fn render(&mut self, app: &mut AppCore) -> Result<()>;

    /// Restore the terminal before exit
    ///
    /// Leaves raw mode and the alternate screen and shows the cursor again.
    /// Must be safe to call more than once.
    ///
    /// # Returns
    /// - `Ok(())` - Terminal restored
    /// - `Err(...)` - If a terminal command failed
    fn cleanup(&mut self) -> Result<()>;

    /// Current drawable size
    ///
    /// # Returns
    /// - `(width, height)` in terminal cells
    fn size(&self) -> (u16, u16);
}
