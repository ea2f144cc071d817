//! Per-event-type handlers.

use tracing::{debug, trace};

use crate::connection::DisplayConnection;
use crate::event::{
    ButtonEvent, ClientMessageEvent, ConfigureEvent, ExposeEvent, FocusDetail, Hwnd, KeyEvent,
    MessageKind, ModMask, MotionEvent, NativeEvent, NativeWindow, RedrawArea, RedrawFlags,
    SwpFlags, WindowMessage, WindowPos, SC_CLOSE,
};
use crate::geometry::Region;
use crate::host::Host;
use crate::keyboard::XK_RETURN;
use crate::pointer::KeyStateFlags;
use crate::Core;

impl<C: DisplayConnection, H: Host> Core<C, H> {
    pub(crate) fn dispatch(&mut self, event: NativeEvent) {
        let Some(record) = self.session.registry.lookup(event.window()) else {
            trace!("{} for unregistered window {}", event.name(), event.window());
            return;
        };
        let hwnd = record.hwnd;
        trace!("Got event {} for hwnd {}", event.name(), hwnd);

        match event {
            NativeEvent::KeyPress(e) => {
                if self.input_delivered() {
                    self.on_key(e, true);
                }
            },
            NativeEvent::KeyRelease(e) => {
                if self.input_delivered() {
                    self.on_key(e, false);
                }
            },
            NativeEvent::ButtonPress(e) => {
                if self.input_delivered() {
                    self.on_button(e, true);
                }
            },
            NativeEvent::ButtonRelease(e) => {
                if self.input_delivered() {
                    self.on_button(e, false);
                }
            },
            NativeEvent::Motion(e) => {
                if self.input_delivered() {
                    let latest = match self.connection.take_queued_motion(e.window) {
                        Some(NativeEvent::Motion(last)) => last,
                        _ => e,
                    };
                    self.on_motion(latest);
                }
            },
            NativeEvent::FocusIn { detail, .. } => self.on_focus_in(hwnd, detail),
            NativeEvent::FocusOut { detail, .. } => self.on_focus_out(hwnd, detail),
            NativeEvent::Expose(e) => self.on_expose(e, RedrawFlags::FRAME),
            NativeEvent::GraphicsExpose(e) => self.on_expose(e, RedrawFlags::empty()),
            NativeEvent::NoExpose { .. } => {},
            NativeEvent::Configure(e) => self.on_configure(hwnd, e),
            NativeEvent::SelectionRequest(e) => self.on_selection_request(hwnd, e),
            NativeEvent::SelectionNotify(e) => self.on_selection_notify(e),
            NativeEvent::SelectionClear(e) => self.on_selection_clear(hwnd, e),
            NativeEvent::ClientMessage(e) => self.on_client_message(hwnd, e),
            NativeEvent::Map { .. } => self.on_map(hwnd),
            NativeEvent::Destroy { window } => self.on_destroy(window),
            NativeEvent::Structure { .. } => {},
            NativeEvent::Other { name, .. } => {
                debug!("Unprocessed event {} for hwnd {}", name, hwnd);
            },
        }
    }

    /// Key, button and motion events reach the queue.
    fn input_delivered(&self) -> bool {
        self.session.input_enabled && !self.host.journal_playback_active()
    }

    fn on_key(&mut self, event: KeyEvent, pressed: bool) {
        let lookup = self.connection.lookup_key(event.keycode, event.state);

        if pressed
            && lookup.keysym == XK_RETURN
            && event.state.contains(ModMask::CONTROL | ModMask::MOD1)
        {
            debug!("Ctrl+Alt+Return, entering debugger");
            self.host.enter_debugger();
        }

        let keyboard = &mut self.session.keyboard;
        let stroke = if pressed {
            keyboard.press(event.keycode, event.state, lookup)
        } else {
            keyboard.release(event.keycode, event.state, lookup)
        };

        let position = self.session.to_desktop(event.root_x, event.root_y);
        let time = self
            .session
            .session_time(event.time, self.host.tick_count());
        self.post(
            stroke.kind,
            u32::from(stroke.vk),
            stroke.transition.to_lparam(),
            position,
            time,
        );
    }

    fn on_button(&mut self, event: ButtonEvent, pressed: bool) {
        let buttons = &mut self.session.buttons;
        let kind = if pressed {
            buttons.press(event.button)
        } else {
            buttons.release(event.button)
        };
        let Some(kind) = kind else {
            trace!("ignoring button {}", event.button);
            return;
        };

        let position = self.session.to_desktop(event.root_x, event.root_y);
        let time = self
            .session
            .session_time(event.time, self.host.tick_count());
        self.post(
            kind,
            KeyStateFlags::from(event.state).bits(),
            0,
            position,
            time,
        );
    }

    fn on_motion(&mut self, event: MotionEvent) {
        let position = self.session.to_desktop(event.root_x, event.root_y);
        let time = self
            .session
            .session_time(event.time, self.host.tick_count());
        self.post(
            MessageKind::MouseMove,
            KeyStateFlags::from(event.state).bits(),
            0,
            position,
            time,
        );
    }

    fn on_focus_in(&mut self, hwnd: Hwnd, detail: FocusDetail) {
        if detail == FocusDetail::Pointer {
            return;
        }
        if self.host.active_window() != Some(hwnd) {
            self.host.set_active_window(Some(hwnd));
        }
        let focus = self.host.focus();
        let has_focus = focus == Some(hwnd) || focus.is_some_and(|f| self.host.is_child(hwnd, f));
        if !has_focus {
            self.host.set_focus(Some(hwnd));
        }
    }

    fn on_focus_out(&mut self, hwnd: Hwnd, detail: FocusDetail) {
        if detail == FocusDetail::Pointer {
            return;
        }
        if self.host.active_window() == Some(hwnd) {
            self.host.set_active_window(None);
        }
        let focus = self.host.focus();
        if focus == Some(hwnd) || focus.is_some_and(|f| self.host.is_child(hwnd, f)) {
            self.host.set_focus(None);
        }
    }

    fn on_expose(&mut self, event: ExposeEvent, extra: RedrawFlags) {
        let Some(record) = self.session.registry.lookup(event.window) else {
            return;
        };
        let hwnd = record.hwnd;
        let (dx, dy) = record.client_offset();
        let area = event.area.offset(-dx, -dy);

        let mut flags =
            RedrawFlags::INVALIDATE | RedrawFlags::ALLCHILDREN | RedrawFlags::ERASE | extra;
        if event.count == 0 {
            flags |= RedrawFlags::ERASENOW;
        }
        self.host.redraw(Some(hwnd), RedrawArea::Rect(area), flags);
    }

    fn on_configure(&mut self, hwnd: Hwnd, event: ConfigureEvent) {
        let new_window = event.geometry;

        if self.session.desktop == Some(hwnd) {
            self.session.desktop_offset = (new_window.x, new_window.y);
            debug!("desktop offset {:?}", self.session.desktop_offset);
            return;
        }

        let Some(record) = self.session.registry.lookup(event.window) else {
            return;
        };
        if !record.managed {
            return;
        }
        let old_window = record.window_rect;
        let old_client = record.client_rect;

        let mut flags = SwpFlags::NOACTIVATE | SwpFlags::NOZORDER;
        if new_window.x == old_window.x && new_window.y == old_window.y {
            flags |= SwpFlags::NOMOVE;
        }
        if new_window.width == old_window.width && new_window.height == old_window.height {
            flags |= SwpFlags::NOSIZE;
        }
        let pos = WindowPos {
            hwnd,
            x: new_window.x,
            y: new_window.y,
            cx: new_window.width,
            cy: new_window.height,
            flags,
        };

        self.host
            .send_message(hwnd, WindowMessage::WindowPosChanging(pos));
        let new_client = self
            .host
            .calc_client_rect(hwnd, new_window, old_window, old_client, &pos);

        let vacated = Region::from_rect(old_window).difference(&new_window);
        if let Some(record) = self.session.registry.lookup_mut(event.window) {
            record.window_rect = new_window;
            record.client_rect = new_client;
        }
        self.host
            .send_message(hwnd, WindowMessage::WindowPosChanged(pos));

        self.host.redraw(
            None,
            RedrawArea::Region(vacated),
            RedrawFlags::INVALIDATE
                | RedrawFlags::ALLCHILDREN
                | RedrawFlags::ERASE
                | RedrawFlags::ERASENOW,
        );
    }

    fn on_client_message(&mut self, hwnd: Hwnd, event: ClientMessageEvent) {
        let atoms = self.connection.protocol_atoms();
        if event.format != 32
            || event.message_type != atoms.wm_protocols
            || event.data[0] != atoms.wm_delete_window.0
        {
            debug!("unrecognized ClientMessage for hwnd {}", hwnd);
            return;
        }
        self.host
            .send_message(hwnd, WindowMessage::SysCommand { command: SC_CLOSE });
    }

    fn on_map(&mut self, hwnd: Hwnd) {
        let Some(focus) = self.host.focus() else {
            return;
        };
        if !self.host.is_child(hwnd, focus) {
            return;
        }
        let top = self.host.top_level(focus);
        let Some(native) = self.session.registry.native_of(top) else {
            return;
        };
        if let Err(e) = self.connection.set_input_focus(native) {
            debug!("set_input_focus failed: {}", e);
        }
    }

    fn on_destroy(&mut self, window: NativeWindow) {
        self.deregister_window(window);
    }
}
