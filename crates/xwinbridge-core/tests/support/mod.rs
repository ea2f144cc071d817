//! In-memory display connection and host used by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use xwinbridge_core::bitmap::{Brush, Wallpaper};
use xwinbridge_core::config::Config;
use xwinbridge_core::connection::{
    DisplayConnection, PendingEvents, PointerState, ProtocolAtoms, SelectionReply,
};
use xwinbridge_core::desktop::PaintSurface;
use xwinbridge_core::event::{
    Atom, ButtonEvent, KeyEvent, ModMask, MotionEvent, RedrawArea, RedrawFlags, WindowMessage,
    WindowPos,
};
use xwinbridge_core::host::{ClipboardStore, MessageQueue, TimerQueue, WindowHost};
use xwinbridge_core::keyboard::KeyLookup;
use xwinbridge_core::{
    BridgeError, Core, Geometry, HardwareMessage, Hwnd, NativeEvent, NativeWindow, Result,
    WindowRecord,
};

pub const WM_PROTOCOLS: Atom = Atom(300);
pub const WM_DELETE_WINDOW: Atom = Atom(301);

/// Display connection fed from a script of event batches.
#[derive(Debug, Default)]
pub struct ScriptedConnection {
    pub pending: PendingEvents,
    /// Each batch becomes readable on one wait.
    pub batches: VecDeque<Vec<NativeEvent>>,
    /// Delivered by the next sync.
    pub sync_events: Vec<NativeEvent>,
    pub fail_wait: bool,
    pub waits: Vec<Option<Duration>>,
    pub syncs: usize,
    pub keymap: HashMap<u8, KeyLookup>,
    pub pointer: PointerState,
    pub refuse_grab: bool,
    pub grabs: Vec<NativeWindow>,
    pub ungrabs: usize,
    pub warps: Vec<(i32, i32)>,
    pub focus_requests: Vec<NativeWindow>,
    pub properties: HashMap<(NativeWindow, Atom), String>,
    pub notifies: Vec<SelectionReply>,
}

impl ScriptedConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&mut self, event: NativeEvent) {
        self.pending.push(event);
    }

    pub fn map_key(&mut self, keycode: u8, keysym: u32, text: Option<char>) {
        self.keymap.insert(keycode, KeyLookup { keysym, text });
    }
}

impl DisplayConnection for ScriptedConnection {
    fn has_pending(&mut self) -> bool {
        !self.pending.is_empty()
    }

    fn next_event(&mut self) -> Option<NativeEvent> {
        self.pending.pop()
    }

    fn wait_readable(&mut self, timeout: Option<Duration>) -> Result<bool> {
        self.waits.push(timeout);
        if self.fail_wait {
            return Err(BridgeError::connection("connection lost"));
        }
        match self.batches.pop_front() {
            Some(batch) => {
                self.pending.extend(batch);
                Ok(true)
            },
            None => Ok(false),
        }
    }

    fn sync(&mut self) -> Result<()> {
        self.syncs += 1;
        self.pending.extend(self.sync_events.drain(..));
        Ok(())
    }

    fn take_queued_motion(&mut self, window: NativeWindow) -> Option<NativeEvent> {
        self.pending.take_motion(window)
    }

    fn lookup_key(&mut self, keycode: u8, _state: ModMask) -> KeyLookup {
        self.keymap.get(&keycode).copied().unwrap_or_default()
    }

    fn query_pointer(&mut self) -> Result<PointerState> {
        Ok(self.pointer)
    }

    fn grab_pointer(&mut self, window: NativeWindow) -> Result<bool> {
        if self.refuse_grab {
            return Ok(false);
        }
        self.grabs.push(window);
        Ok(true)
    }

    fn ungrab_pointer(&mut self) -> Result<()> {
        self.ungrabs += 1;
        Ok(())
    }

    fn warp_pointer(&mut self, dx: i32, dy: i32) -> Result<()> {
        self.warps.push((dx, dy));
        Ok(())
    }

    fn set_input_focus(&mut self, window: NativeWindow) -> Result<()> {
        self.focus_requests.push(window);
        Ok(())
    }

    fn change_property_text(
        &mut self,
        window: NativeWindow,
        property: Atom,
        text: &str,
    ) -> Result<()> {
        self.properties.insert((window, property), text.to_string());
        Ok(())
    }

    fn read_property_text(
        &mut self,
        window: NativeWindow,
        property: Atom,
    ) -> Result<Option<String>> {
        Ok(self.properties.get(&(window, property)).cloned())
    }

    fn send_selection_notify(&mut self, reply: SelectionReply) -> Result<()> {
        self.notifies.push(reply);
        Ok(())
    }

    fn protocol_atoms(&self) -> ProtocolAtoms {
        ProtocolAtoms {
            wm_protocols: WM_PROTOCOLS,
            wm_delete_window: WM_DELETE_WINDOW,
        }
    }
}

/// Host that records everything the core asks of it.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub hardware: Vec<HardwareMessage>,
    pub sent: Vec<(Hwnd, WindowMessage)>,
    pub redraws: Vec<(Option<Hwnd>, RedrawArea, RedrawFlags)>,
    pub ticks: u32,
    pub journal: bool,
    pub active: Option<Hwnd>,
    pub focus: Option<Hwnd>,
    pub active_changes: usize,
    pub focus_changes: usize,
    /// (parent, child) pairs.
    pub children: Vec<(Hwnd, Hwnd)>,
    /// Border added around the client area by `calc_client_rect`.
    pub frame: i32,
    pub debugger_entries: usize,
    pub clipboard: Option<String>,
    pub clipboard_busy: bool,
    pub opens: usize,
    pub closes: usize,
    pub ingested: Vec<Option<String>>,
    pub released: Vec<Hwnd>,
    pub next_timer: Option<Duration>,
    pub expirations: usize,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_hardware(&mut self) -> Vec<HardwareMessage> {
        std::mem::take(&mut self.hardware)
    }
}

impl MessageQueue for RecordingHost {
    fn post_hardware_message(&mut self, message: HardwareMessage) {
        self.hardware.push(message);
    }

    fn send_message(&mut self, hwnd: Hwnd, message: WindowMessage) {
        self.sent.push((hwnd, message));
    }

    fn tick_count(&self) -> u32 {
        self.ticks
    }

    fn journal_playback_active(&self) -> bool {
        self.journal
    }
}

impl WindowHost for RecordingHost {
    fn active_window(&self) -> Option<Hwnd> {
        self.active
    }

    fn set_active_window(&mut self, hwnd: Option<Hwnd>) {
        self.active = hwnd;
        self.active_changes += 1;
    }

    fn focus(&self) -> Option<Hwnd> {
        self.focus
    }

    fn set_focus(&mut self, hwnd: Option<Hwnd>) {
        self.focus = hwnd;
        self.focus_changes += 1;
    }

    fn is_child(&self, parent: Hwnd, child: Hwnd) -> bool {
        self.children.contains(&(parent, child))
    }

    fn top_level(&self, hwnd: Hwnd) -> Hwnd {
        self.children
            .iter()
            .find(|(_, child)| *child == hwnd)
            .map_or(hwnd, |(parent, _)| *parent)
    }

    fn calc_client_rect(
        &mut self,
        _hwnd: Hwnd,
        new_window: Geometry,
        _old_window: Geometry,
        _old_client: Geometry,
        _pos: &WindowPos,
    ) -> Geometry {
        let inset = self.frame;
        Geometry::from_edges(
            new_window.x + inset,
            new_window.y + inset,
            new_window.right() - inset,
            new_window.bottom() - inset,
        )
    }

    fn redraw(&mut self, target: Option<Hwnd>, area: RedrawArea, flags: RedrawFlags) {
        self.redraws.push((target, area, flags));
    }

    fn enter_debugger(&mut self) {
        self.debugger_entries += 1;
    }
}

impl ClipboardStore for RecordingHost {
    fn open(&mut self, _owner: Option<Hwnd>) -> bool {
        self.opens += 1;
        !self.clipboard_busy
    }

    fn close(&mut self) {
        self.closes += 1;
    }

    fn has_text(&self) -> bool {
        self.clipboard.is_some()
    }

    fn text(&self) -> Option<String> {
        self.clipboard.clone()
    }

    fn ingest_selection(&mut self, text: Option<String>) {
        self.ingested.push(text);
    }

    fn release_selection(&mut self, owner: Hwnd) {
        self.released.push(owner);
    }
}

impl TimerQueue for RecordingHost {
    fn next_expiration(&self) -> Option<Duration> {
        self.next_timer
    }

    fn expire_timers(&mut self) {
        self.expirations += 1;
    }
}

/// Paint surface that records calls.
#[derive(Debug, Default)]
pub struct Canvas {
    pub fills: Vec<(Geometry, Brush)>,
    pub blits: Vec<(i32, i32, u32, u32)>,
}

impl PaintSurface for Canvas {
    fn fill_rect(&mut self, rect: Geometry, brush: &Brush) {
        self.fills.push((rect, *brush));
    }

    fn blit(&mut self, wallpaper: &Wallpaper, x: i32, y: i32) {
        self.blits.push((x, y, wallpaper.width, wallpaper.height));
    }
}

pub type TestCore = Core<ScriptedConnection, RecordingHost>;

pub const DESKTOP: Hwnd = Hwnd(1);
pub const DESKTOP_NATIVE: NativeWindow = NativeWindow(0x100);
pub const MAIN: Hwnd = Hwnd(2);
pub const MAIN_NATIVE: NativeWindow = NativeWindow(0x200);

/// Core with a desktop at (100, 50) and one unmanaged top-level window.
pub fn test_core() -> TestCore {
    test_core_with(Config::default())
}

pub fn test_core_with(config: Config) -> TestCore {
    let mut core = Core::new(ScriptedConnection::new(), RecordingHost::new(), config);
    core.register_desktop(
        WindowRecord::new(DESKTOP, DESKTOP_NATIVE, Geometry::new(0, 0, 800, 600)),
        false,
    );
    core.register_window(WindowRecord::new(
        MAIN,
        MAIN_NATIVE,
        Geometry::new(10, 10, 200, 100),
    ));
    core.process_event(NativeEvent::Configure(xwinbridge_core::event::ConfigureEvent {
        window: DESKTOP_NATIVE,
        geometry: Geometry::new(100, 50, 800, 600),
    }));
    core
}

pub fn key(window: NativeWindow, keycode: u8, state: ModMask) -> KeyEvent {
    KeyEvent {
        window,
        keycode,
        state,
        root_x: 150,
        root_y: 80,
        time: 1000,
    }
}

pub fn button(window: NativeWindow, button: u8) -> ButtonEvent {
    ButtonEvent {
        window,
        button,
        state: ModMask::empty(),
        root_x: 110,
        root_y: 60,
        time: 2000,
    }
}

pub fn motion(window: NativeWindow, root_x: i32, root_y: i32) -> NativeEvent {
    NativeEvent::Motion(MotionEvent {
        window,
        state: ModMask::empty(),
        root_x,
        root_y,
        time: 3000,
    })
}
