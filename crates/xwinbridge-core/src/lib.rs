//! xwinbridge core: display events in, window messages out
//!
//! This crate turns native display-server events into the ordered stream of
//! window messages an emulated message system consumes. It tracks the key
//! and button state the messages depend on, reconciles externally imposed
//! geometry, answers selection requests from the clipboard, and decides how
//! the desktop background is painted.
//!
//! Display adapters implement [`DisplayConnection`]; the message system,
//! clipboard and timers are reached through [`Host`]. Neither side has to be
//! a real display to drive [`Core`].
//!
//! # Quick Start
//! ```ignore
//! use xwinbridge_core::{Core, Geometry, Hwnd, NativeWindow, WindowRecord};
//! use xwinbridge_core::config::Config;
//!
//! let mut core = Core::new(connection, host, Config::default());
//! core.register_window(WindowRecord::new(
//!     Hwnd(1),
//!     NativeWindow(0x40_0001),
//!     Geometry::new(0, 0, 640, 480),
//! ));
//! loop {
//!     core.wait_event(true);
//! }
//! ```

pub mod bitmap;
pub mod config;
pub mod connection;
pub mod desktop;
mod dispatch;
pub mod error;
pub mod event;
pub mod geometry;
pub mod host;
pub mod invariants;
pub mod keyboard;
pub mod pointer;
pub mod registry;
mod selection;
pub mod session;

// Re-export primary API types at crate root
pub use connection::DisplayConnection;
pub use error::{BridgeError, Result};
pub use event::{
    Atom, HardwareMessage, Hwnd, MessageKind, NativeEvent, NativeWindow, WindowMessage,
};
pub use geometry::{Geometry, Region};
pub use host::Host;
pub use registry::WindowRecord;

use std::time::Duration;

use tracing::{debug, info, trace, warn};

use config::Config;
use desktop::{Desktop, PaintSurface, PatternSource, WallpaperSource};
use pointer::{KeyStateFlags, MouseEventFlags};
use session::Session;

/// The translation engine.
///
/// Owns the display connection, the host collaborators and all session
/// state. Every operation runs to completion on the caller's thread; the
/// only blocking point is [`wait_event`](Core::wait_event).
pub struct Core<C, H> {
    pub(crate) connection: C,
    pub(crate) host: H,
    pub(crate) session: Session,
    pub(crate) desktop: Desktop,
    config: Config,
}

impl<C: DisplayConnection, H: Host> Core<C, H> {
    /// Create a new core. The desktop pattern and wallpaper are read from
    /// `config`.
    pub fn new(connection: C, host: H, config: Config) -> Self {
        let desktop = Desktop::new(&config, config.general.windows_dir.clone());
        Self {
            connection,
            host,
            session: Session::new(),
            desktop,
            config,
        }
    }

    /// Server timestamp that maps to message time zero.
    pub fn with_start_ticks(mut self, start_ticks: u32) -> Self {
        self.session.start_ticks = Some(start_ticks);
        self
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.connection
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn desktop(&self) -> &Desktop {
        &self.desktop
    }

    // ── Window identity ──────────────────────────────────────────────

    /// Associate a native window with an internal one.
    pub fn register_window(&mut self, record: WindowRecord) {
        self.session.registry.register(record);
    }

    /// Register the desktop window. `on_root` tells whether it is the
    /// server's root window.
    pub fn register_desktop(&mut self, record: WindowRecord, on_root: bool) {
        self.session.desktop = Some(record.hwnd);
        self.session.desktop_on_root = on_root;
        self.session.registry.register(record);
    }

    pub fn deregister_window(&mut self, native: NativeWindow) -> Option<WindowRecord> {
        let record = self.session.registry.deregister(native)?;
        if self.session.capture == Some(record.hwnd) {
            debug!("capture holder {} destroyed", record.hwnd);
            self.session.capture = None;
        }
        if self.session.desktop == Some(record.hwnd) {
            self.session.desktop = None;
        }
        Some(record)
    }

    // ── Event loop ───────────────────────────────────────────────────

    /// Wait for native events and process all of them.
    ///
    /// Without queued events this blocks until the connection is readable,
    /// for at most the time to the next timer when `sleep` is set and not
    /// at all otherwise. Returns `false` after a timeout or connection
    /// error, once due timers have run, and when a wake-up carried no
    /// event; `true` once every ready event has been processed.
    pub fn wait_event(&mut self, sleep: bool) -> bool {
        if !self.connection.has_pending() {
            let timeout = if sleep {
                self.host.next_expiration()
            } else {
                Some(Duration::ZERO)
            };

            match self.connection.wait_readable(timeout) {
                Ok(true) => {},
                Ok(false) => {
                    self.host.expire_timers();
                    return false;
                },
                Err(e) => {
                    warn!("Waiting for events failed: {}", e);
                    self.host.expire_timers();
                    return false;
                },
            }
        }

        let processed = self.drain_events();
        trace!("processed {} events", processed);
        processed > 0
    }

    /// Round-trip to the server and process everything it produced.
    pub fn synchronize(&mut self) {
        if let Err(e) = self.connection.sync() {
            warn!("Synchronize failed: {}", e);
        }
        self.drain_events();
    }

    fn drain_events(&mut self) -> usize {
        let mut processed = 0;
        while let Some(event) = self.connection.next_event() {
            self.process_event(event);
            processed += 1;
        }
        processed
    }

    /// Route one native event to its handler.
    pub fn process_event(&mut self, event: NativeEvent) {
        self.dispatch(event);

        #[cfg(debug_assertions)]
        if let Err(e) = invariants::validate(&self.session) {
            warn!("Invariant violation after {}: {}", event.name(), e);
        }
    }

    // ── Pointer ──────────────────────────────────────────────────────

    /// Post a motion message for the current pointer position.
    pub fn dummy_motion(&mut self) {
        match self.connection.query_pointer() {
            Ok(pointer) => {
                let (x, y) = self.session.to_desktop(pointer.root_x, pointer.root_y);
                let time = self.host.tick_count();
                self.post(
                    MessageKind::MouseMove,
                    KeyStateFlags::from(pointer.state).bits(),
                    0,
                    (x, y),
                    time,
                );
            },
            Err(e) => debug!("query_pointer failed: {}", e),
        }
    }

    /// Inject pointer activity.
    ///
    /// A move warps the pointer by `(dx, dy)` and nothing else happens.
    /// Otherwise one button message is posted per flag at the current
    /// pointer position.
    pub fn mouse_event(&mut self, flags: MouseEventFlags, dx: i32, dy: i32) {
        if flags.contains(MouseEventFlags::MOVE) {
            if let Err(e) = self.connection.warp_pointer(dx, dy) {
                debug!("warp_pointer failed: {}", e);
            }
            return;
        }

        let pointer = match self.connection.query_pointer() {
            Ok(pointer) => pointer,
            Err(e) => {
                debug!("query_pointer failed: {}", e);
                return;
            },
        };
        let position = self.session.to_desktop(pointer.root_x, pointer.root_y);
        let state = KeyStateFlags::from(pointer.state).bits();
        for kind in flags.button_messages() {
            let time = self.host.tick_count();
            self.post(kind, state, 0, position, time);
        }
    }

    /// Give `hwnd` exclusive pointer delivery, or release capture for
    /// `None`. Returns the previous holder; `None` as well when the grab is
    /// refused.
    pub fn set_capture(&mut self, hwnd: Option<Hwnd>) -> Option<Hwnd> {
        let previous = self.session.capture;
        let Some(hwnd) = hwnd else {
            self.release_capture();
            return previous;
        };

        let Some(native) = self.session.registry.native_of(hwnd) else {
            debug!("set_capture: {} has no native window", hwnd);
            return None;
        };
        match self.connection.grab_pointer(native) {
            Ok(true) => {
                debug!("set_capture: {}", hwnd);
                self.session.capture = Some(hwnd);
                previous
            },
            Ok(false) => {
                debug!("set_capture: grab refused for {}", hwnd);
                None
            },
            Err(e) => {
                warn!("set_capture: {}", e);
                None
            },
        }
    }

    pub fn release_capture(&mut self) {
        if self.session.capture.is_none() {
            return;
        }
        if let Err(e) = self.connection.ungrab_pointer() {
            warn!("release_capture: {}", e);
        }
        self.session.capture = None;
        debug!("release_capture");
    }

    pub fn capture(&self) -> Option<Hwnd> {
        self.session.capture
    }

    /// Turn delivery of key, button and motion events on or off. Returns
    /// the previous setting.
    pub fn enable_hardware_input(&mut self, enable: bool) -> bool {
        let previous = self.session.input_enabled;
        self.session.input_enabled = enable;
        info!("hardware input {}", if enable { "enabled" } else { "disabled" });
        previous
    }

    // ── State reads ──────────────────────────────────────────────────

    /// Character produced by the last key press that produced one.
    pub fn last_event_char(&self) -> Option<char> {
        self.session.keyboard.last_char()
    }

    pub fn key_state(&self, vk: u8) -> u8 {
        self.session.keyboard.key_state(vk)
    }

    pub fn async_key_state(&mut self, vk: u8) -> u16 {
        self.session.keyboard.take_async_state(vk)
    }

    /// Whether button `index` (0 left, 1 middle, 2 right) went down since
    /// the last read.
    pub fn async_button_state(&mut self, index: usize) -> bool {
        self.session.buttons.take_async(index)
    }

    // ── Desktop ──────────────────────────────────────────────────────

    pub fn set_wallpaper(&mut self, source: WallpaperSource) {
        self.desktop.set_wallpaper(source, &self.config);
    }

    pub fn wallpaper(&self) -> Option<&bitmap::Wallpaper> {
        self.desktop.wallpaper()
    }

    pub fn set_pattern(&mut self, source: PatternSource) {
        self.desktop.set_pattern(source, &self.config);
    }

    /// Handle an erase request for the desktop client area.
    pub fn erase_background(&self, client: Geometry, surface: &mut dyn PaintSurface) -> bool {
        self.desktop
            .erase_background(self.session.desktop_on_root, client, surface)
    }

    pub fn paint_desktop(&self, client: Geometry, surface: &mut dyn PaintSurface) -> bool {
        self.desktop.paint(client, surface)
    }

    // ── Helpers ──────────────────────────────────────────────────────

    pub(crate) fn post(
        &mut self,
        kind: MessageKind,
        wparam: u32,
        lparam: u32,
        (x, y): (i32, i32),
        time: u32,
    ) {
        let message = HardwareMessage {
            kind,
            wparam,
            lparam,
            x,
            y,
            time,
        };
        trace!("post {:?}", message);
        self.host.post_hardware_message(message);
    }
}
