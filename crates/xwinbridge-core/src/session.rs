//! Per-desktop session state.

use crate::event::Hwnd;
use crate::keyboard::Keyboard;
use crate::pointer::Buttons;
use crate::registry::Registry;

/// Mutable state shared by every event handler.
///
/// One instance per simulated desktop. Only the dispatcher writes it.
#[derive(Debug)]
pub struct Session {
    pub registry: Registry,
    pub keyboard: Keyboard,
    pub buttons: Buttons,
    /// Window holding the pointer grab.
    pub capture: Option<Hwnd>,
    /// Root position of the desktop window.
    pub desktop_offset: (i32, i32),
    pub desktop: Option<Hwnd>,
    /// The desktop is the server's root window.
    pub desktop_on_root: bool,
    /// Key, button and motion events are delivered.
    pub input_enabled: bool,
    /// Server time matching host tick zero. Set by the first timed event
    /// unless given up front.
    pub start_ticks: Option<u32>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            registry: Registry::new(),
            keyboard: Keyboard::new(),
            buttons: Buttons::new(),
            capture: None,
            desktop_offset: (0, 0),
            desktop: None,
            desktop_on_root: false,
            input_enabled: true,
            start_ticks: None,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root coordinates to desktop coordinates.
    pub fn to_desktop(&self, root_x: i32, root_y: i32) -> (i32, i32) {
        (
            root_x - self.desktop_offset.0,
            root_y - self.desktop_offset.1,
        )
    }

    /// Server timestamp to host tick time. `now_ticks` anchors the two
    /// clocks on the first call.
    pub fn session_time(&mut self, server_time: u32, now_ticks: u32) -> u32 {
        let start = *self
            .start_ticks
            .get_or_insert_with(|| server_time.wrapping_sub(now_ticks));
        server_time.wrapping_sub(start)
    }
}
