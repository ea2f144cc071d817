//! Host that prints the message stream
//!
//! Stands in for the message system, clipboard and timer queue of a real
//! emulator so the bridge can be watched against a live display.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use xwinbridge_core::event::{RedrawArea, RedrawFlags, WindowMessage, WindowPos, SC_CLOSE};
use xwinbridge_core::host::{ClipboardStore, MessageQueue, TimerQueue, WindowHost};
use xwinbridge_core::{Geometry, HardwareMessage, Hwnd};

/// One line of `--json` output
#[derive(Debug, Serialize)]
#[serde(tag = "queue", rename_all = "snake_case")]
enum Record<'a> {
    Hardware {
        code: u32,
        #[serde(flatten)]
        message: &'a HardwareMessage,
    },
    Window {
        hwnd: Hwnd,
        code: u32,
        message: &'a WindowMessage,
    },
}

pub struct TraceHost {
    json: bool,
    started: Instant,
    active: Option<Hwnd>,
    focus: Option<Hwnd>,
    clipboard: Option<String>,
    clipboard_open: bool,
    /// Period of the heartbeat timer, if any
    tick: Option<Duration>,
    next_tick: Option<Instant>,
    close_requested: bool,
}

impl TraceHost {
    pub fn new(json: bool, tick: Option<Duration>) -> Self {
        let started = Instant::now();
        Self {
            json,
            started,
            active: None,
            focus: None,
            clipboard: None,
            clipboard_open: false,
            tick,
            next_tick: tick.map(|period| started + period),
            close_requested: false,
        }
    }

    /// A window received a close command.
    pub const fn close_requested(&self) -> bool {
        self.close_requested
    }

    fn emit(&self, record: &Record<'_>) {
        if self.json {
            match serde_json::to_string(record) {
                Ok(line) => println!("{line}"),
                Err(e) => debug!("Failed to encode message: {}", e),
            }
            return;
        }
        match record {
            Record::Hardware { code, message } => println!(
                "{:04x} {:?} wp={:#x} lp={:#010x} at ({}, {}) t={}",
                code, message.kind, message.wparam, message.lparam, message.x, message.y,
                message.time
            ),
            Record::Window { hwnd, code, message } => {
                println!("{code:04x} -> {hwnd} {message:?}");
            },
        }
    }
}

impl MessageQueue for TraceHost {
    fn post_hardware_message(&mut self, message: HardwareMessage) {
        self.emit(&Record::Hardware {
            code: message.kind.code(),
            message: &message,
        });
    }

    fn send_message(&mut self, hwnd: Hwnd, message: WindowMessage) {
        if message == (WindowMessage::SysCommand { command: SC_CLOSE }) {
            info!("Close requested for {}", hwnd);
            self.close_requested = true;
        }
        self.emit(&Record::Window {
            hwnd,
            code: message.code(),
            message: &message,
        });
    }

    fn tick_count(&self) -> u32 {
        self.started.elapsed().as_millis() as u32
    }
}

impl WindowHost for TraceHost {
    fn active_window(&self) -> Option<Hwnd> {
        self.active
    }

    fn set_active_window(&mut self, hwnd: Option<Hwnd>) {
        self.active = hwnd;
    }

    fn focus(&self) -> Option<Hwnd> {
        self.focus
    }

    fn set_focus(&mut self, hwnd: Option<Hwnd>) {
        debug!("Focus now {:?}", hwnd);
        self.focus = hwnd;
    }

    fn is_child(&self, _parent: Hwnd, _child: Hwnd) -> bool {
        false
    }

    // undecorated: the client area is the whole window
    fn calc_client_rect(
        &mut self,
        _hwnd: Hwnd,
        new_window: Geometry,
        _old_window: Geometry,
        _old_client: Geometry,
        _pos: &WindowPos,
    ) -> Geometry {
        new_window
    }

    fn redraw(&mut self, target: Option<Hwnd>, area: RedrawArea, flags: RedrawFlags) {
        match area {
            RedrawArea::Rect(rect) => debug!("Redraw {:?} {:?} {:?}", target, rect, flags),
            RedrawArea::Region(region) => debug!(
                "Redraw {:?} {} rects, area {} {:?}",
                target,
                region.rects().len(),
                region.area(),
                flags
            ),
        }
    }

    fn enter_debugger(&mut self) {
        info!("Debugger chord pressed");
    }
}

impl ClipboardStore for TraceHost {
    fn open(&mut self, _owner: Option<Hwnd>) -> bool {
        if self.clipboard_open {
            return false;
        }
        self.clipboard_open = true;
        true
    }

    fn close(&mut self) {
        self.clipboard_open = false;
    }

    fn has_text(&self) -> bool {
        self.clipboard.is_some()
    }

    fn text(&self) -> Option<String> {
        self.clipboard.clone()
    }

    fn ingest_selection(&mut self, text: Option<String>) {
        debug!("Selection data: {:?}", text);
        if text.is_some() {
            self.clipboard = text;
        }
    }

    fn release_selection(&mut self, owner: Hwnd) {
        debug!("Selection owner {} lost ownership", owner);
    }
}

impl TimerQueue for TraceHost {
    fn next_expiration(&self) -> Option<Duration> {
        self.next_tick
            .map(|due| due.saturating_duration_since(Instant::now()))
    }

    fn expire_timers(&mut self) {
        let (Some(period), Some(due)) = (self.tick, self.next_tick) else {
            return;
        };
        let now = Instant::now();
        if now >= due {
            debug!("Timer tick at {} ms", self.tick_count());
            self.next_tick = Some(now + period);
        }
    }
}
