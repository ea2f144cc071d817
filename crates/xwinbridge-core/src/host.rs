//! Collaborators the core talks to.
//!
//! The window-message system, the clipboard store and the timer queue live
//! outside this crate. They are reached through the traits below, bundled
//! as [`Host`].

use std::time::Duration;

use crate::event::{HardwareMessage, Hwnd, RedrawArea, RedrawFlags, WindowMessage, WindowPos};
use crate::geometry::Geometry;

/// The window-message queue.
pub trait MessageQueue {
    /// Append to the hardware input queue.
    fn post_hardware_message(&mut self, message: HardwareMessage);

    /// Deliver synchronously to a window.
    fn send_message(&mut self, hwnd: Hwnd, message: WindowMessage);

    /// Milliseconds since the session started.
    fn tick_count(&self) -> u32;

    /// An input-replay hook owns keyboard and pointer delivery.
    fn journal_playback_active(&self) -> bool {
        false
    }
}

/// Window bookkeeping the message system owns.
pub trait WindowHost {
    fn active_window(&self) -> Option<Hwnd>;
    fn set_active_window(&mut self, hwnd: Option<Hwnd>);
    fn focus(&self) -> Option<Hwnd>;
    fn set_focus(&mut self, hwnd: Option<Hwnd>);

    /// Whether `child` is a descendant of `parent`.
    fn is_child(&self, parent: Hwnd, child: Hwnd) -> bool;

    /// Top-level ancestor of `hwnd`, the window that owns a native handle.
    fn top_level(&self, hwnd: Hwnd) -> Hwnd {
        hwnd
    }

    /// Client rectangle for a window moving to `new_window`.
    fn calc_client_rect(
        &mut self,
        hwnd: Hwnd,
        new_window: Geometry,
        old_window: Geometry,
        old_client: Geometry,
        pos: &WindowPos,
    ) -> Geometry;

    /// Schedule a repaint. `target` is `None` for the desktop.
    fn redraw(&mut self, target: Option<Hwnd>, area: RedrawArea, flags: RedrawFlags);

    fn enter_debugger(&mut self) {}
}

/// The internal clipboard, text only.
pub trait ClipboardStore {
    /// Best-effort exclusive open. `false` when held elsewhere.
    fn open(&mut self, owner: Option<Hwnd>) -> bool;
    fn close(&mut self);
    fn has_text(&self) -> bool;
    fn text(&self) -> Option<String>;

    /// Data arriving from another client's selection, `None` for "no data".
    fn ingest_selection(&mut self, text: Option<String>);

    /// Another client now owns the selection `owner` held.
    fn release_selection(&mut self, owner: Hwnd);
}

/// The timer subsystem.
pub trait TimerQueue {
    /// Time until the nearest timer fires, `None` if none is armed.
    fn next_expiration(&self) -> Option<Duration>;

    /// Run every due timer.
    fn expire_timers(&mut self);
}

/// Everything the core needs from its surroundings.
pub trait Host: MessageQueue + WindowHost + ClipboardStore + TimerQueue {}

impl<T: MessageQueue + WindowHost + ClipboardStore + TimerQueue> Host for T {}
