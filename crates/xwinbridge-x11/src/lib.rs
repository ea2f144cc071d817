//! xwinbridge X11 adapter: the [`DisplayConnection`] over an x11rb socket.
//!
//! This crate:
//! - Owns every x11rb, calloop and xkbcommon type.
//! - Converts server events into [`NativeEvent`]s and buffers them.
//! - Blocks on the connection descriptor through a calloop source.
//! - Issues the grab, focus, property and selection requests the core asks for.
//!
//! **No x11rb types leak into `xwinbridge-core`.**

mod convert;
mod keymap;

use std::os::unix::io::{AsRawFd, RawFd};
use std::time::Duration;

use calloop::generic::Generic;
use calloop::{EventLoop, Interest, Mode, PostAction};
use tracing::{debug, info, trace, warn};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{
    AtomEnum, ConnectionExt as _, CreateWindowAux, EventMask, GrabMode, GrabStatus, InputFocus,
    PropMode, SelectionNotifyEvent, Window, WindowClass, SELECTION_NOTIFY_EVENT,
};
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

use xwinbridge_core::config::Config;
use xwinbridge_core::connection::{PendingEvents, PointerState, ProtocolAtoms, SelectionReply};
use xwinbridge_core::event::ModMask;
use xwinbridge_core::keyboard::KeyLookup;
use xwinbridge_core::{
    Atom, BridgeError, DisplayConnection, Geometry, NativeEvent, NativeWindow, Result,
};

pub use convert::convert_event;
pub use keymap::XkbKeymap;

x11rb::atom_manager! {
    pub Atoms: AtomsCookie {
        WM_PROTOCOLS,
        WM_DELETE_WINDOW,
    }
}

/// Raw descriptor of the server socket, registered with calloop.
struct ConnectionFd(RawFd);

impl AsRawFd for ConnectionFd {
    fn as_raw_fd(&self) -> RawFd {
        self.0
    }
}

/// Events selected on every window this adapter creates.
fn window_event_mask() -> EventMask {
    EventMask::KEY_PRESS
        | EventMask::KEY_RELEASE
        | EventMask::BUTTON_PRESS
        | EventMask::BUTTON_RELEASE
        | EventMask::POINTER_MOTION
        | EventMask::EXPOSURE
        | EventMask::STRUCTURE_NOTIFY
        | EventMask::FOCUS_CHANGE
}

/// A live connection to an X server.
pub struct X11Connection {
    conn: RustConnection,
    root: Window,
    screen: Geometry,
    atoms: Atoms,
    keymap: XkbKeymap,
    pending: PendingEvents,
    /// Dispatch flag: set when the socket became readable.
    event_loop: EventLoop<'static, bool>,
}

impl X11Connection {
    /// Connect to the display named in the configuration, or `$DISPLAY`.
    pub fn connect(config: &Config) -> Result<Self> {
        let (conn, screen_num) = RustConnection::connect(config.general.display.as_deref())
            .map_err(BridgeError::connection)?;
        let (root, screen) = conn
            .setup()
            .roots
            .get(screen_num)
            .map(|screen| {
                let size = Geometry::new(
                    0,
                    0,
                    u32::from(screen.width_in_pixels),
                    u32::from(screen.height_in_pixels),
                );
                (screen.root, size)
            })
            .ok_or_else(|| BridgeError::connection(format!("no screen {screen_num}")))?;
        let atoms = Atoms::new(&conn)
            .map_err(BridgeError::connection)?
            .reply()
            .map_err(BridgeError::connection)?;
        let keymap = XkbKeymap::new(&config.input)?;

        let event_loop: EventLoop<'static, bool> =
            EventLoop::try_new().map_err(BridgeError::connection)?;
        let fd = ConnectionFd(conn.stream().as_raw_fd());
        event_loop
            .handle()
            .insert_source(
                Generic::new(fd, Interest::READ, Mode::Level),
                |_, _, readable: &mut bool| {
                    *readable = true;
                    Ok(PostAction::Continue)
                },
            )
            .map_err(|e| BridgeError::connection(e.error))?;

        info!("Connected to X server, screen {} root 0x{:x}", screen_num, root);
        Ok(Self {
            conn,
            root,
            screen,
            atoms,
            keymap,
            pending: PendingEvents::new(),
            event_loop,
        })
    }

    pub const fn root(&self) -> NativeWindow {
        NativeWindow(self.root)
    }

    /// Root window rectangle of the connected screen.
    pub const fn screen(&self) -> Geometry {
        self.screen
    }

    /// Create and map a top-level window taking part in the close protocol.
    /// Unmanaged windows bypass the window manager.
    pub fn create_window(&self, geometry: Geometry, managed: bool) -> Result<NativeWindow> {
        let window = self.conn.generate_id().map_err(BridgeError::connection)?;
        let aux = CreateWindowAux::new()
            .event_mask(window_event_mask())
            .override_redirect(u32::from(!managed));
        self.conn
            .create_window(
                x11rb::COPY_DEPTH_FROM_PARENT,
                window,
                self.root,
                geometry.x as i16,
                geometry.y as i16,
                geometry.width.max(1) as u16,
                geometry.height.max(1) as u16,
                0,
                WindowClass::INPUT_OUTPUT,
                0,
                &aux,
            )
            .map_err(BridgeError::protocol)?;
        self.conn
            .change_property32(
                PropMode::REPLACE,
                window,
                self.atoms.WM_PROTOCOLS,
                AtomEnum::ATOM,
                &[self.atoms.WM_DELETE_WINDOW],
            )
            .map_err(BridgeError::protocol)?;
        self.conn.map_window(window).map_err(BridgeError::protocol)?;
        self.conn.flush().map_err(BridgeError::connection)?;

        debug!("Created window 0x{:x} at {:?}", window, geometry);
        Ok(NativeWindow(window))
    }

    /// Move events the library has already read into the pending queue.
    fn fill_pending(&mut self) -> Result<()> {
        while let Some(event) = self
            .conn
            .poll_for_event()
            .map_err(BridgeError::connection)?
        {
            match convert_event(&event) {
                Some(native) => self.pending.push(native),
                None => match event {
                    x11rb::protocol::Event::Error(e) => {
                        warn!("X error {:?} for request {}", e.error_kind, e.major_opcode);
                    },
                    other => trace!("Dropped event {:?}", other),
                },
            }
        }
        Ok(())
    }

    fn fill_pending_logged(&mut self) {
        if let Err(e) = self.fill_pending() {
            warn!("Failed to read events: {}", e);
        }
    }
}

impl DisplayConnection for X11Connection {
    fn has_pending(&mut self) -> bool {
        if self.pending.is_empty() {
            self.fill_pending_logged();
        }
        !self.pending.is_empty()
    }

    fn next_event(&mut self) -> Option<NativeEvent> {
        if self.pending.is_empty() {
            self.fill_pending_logged();
        }
        self.pending.pop()
    }

    fn wait_readable(&mut self, timeout: Option<Duration>) -> Result<bool> {
        self.conn.flush().map_err(BridgeError::connection)?;
        let mut readable = false;
        self.event_loop
            .dispatch(timeout, &mut readable)
            .map_err(BridgeError::connection)?;
        if readable {
            self.fill_pending()?;
        }
        // readable but holding only errors or dropped event types
        Ok(!self.pending.is_empty())
    }

    fn sync(&mut self) -> Result<()> {
        self.conn
            .get_input_focus()
            .map_err(BridgeError::connection)?
            .reply()
            .map_err(BridgeError::connection)?;
        self.fill_pending()
    }

    fn take_queued_motion(&mut self, window: NativeWindow) -> Option<NativeEvent> {
        self.fill_pending_logged();
        self.pending.take_motion(window)
    }

    fn lookup_key(&mut self, keycode: u8, state: ModMask) -> KeyLookup {
        self.keymap.lookup(keycode, state)
    }

    fn query_pointer(&mut self) -> Result<PointerState> {
        let reply = self
            .conn
            .query_pointer(self.root)
            .map_err(BridgeError::connection)?
            .reply()
            .map_err(BridgeError::connection)?;
        Ok(PointerState {
            root_x: i32::from(reply.root_x),
            root_y: i32::from(reply.root_y),
            state: ModMask::from_bits_truncate(u16::from(reply.mask)),
        })
    }

    fn grab_pointer(&mut self, window: NativeWindow) -> Result<bool> {
        let reply = self
            .conn
            .grab_pointer(
                false,
                window.0,
                EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE | EventMask::POINTER_MOTION,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                x11rb::NONE,
                x11rb::NONE,
                x11rb::CURRENT_TIME,
            )
            .map_err(BridgeError::connection)?
            .reply()
            .map_err(BridgeError::connection)?;
        if reply.status != GrabStatus::SUCCESS {
            debug!("Pointer grab for {} refused: {:?}", window, reply.status);
        }
        Ok(reply.status == GrabStatus::SUCCESS)
    }

    fn ungrab_pointer(&mut self) -> Result<()> {
        self.conn
            .ungrab_pointer(x11rb::CURRENT_TIME)
            .map_err(BridgeError::connection)?;
        self.conn.flush().map_err(BridgeError::connection)
    }

    fn warp_pointer(&mut self, dx: i32, dy: i32) -> Result<()> {
        self.conn
            .warp_pointer(x11rb::NONE, x11rb::NONE, 0, 0, 0, 0, dx as i16, dy as i16)
            .map_err(BridgeError::connection)?;
        self.conn.flush().map_err(BridgeError::connection)
    }

    fn set_input_focus(&mut self, window: NativeWindow) -> Result<()> {
        self.conn
            .set_input_focus(InputFocus::PARENT, window.0, x11rb::CURRENT_TIME)
            .map_err(BridgeError::connection)?;
        Ok(())
    }

    fn change_property_text(
        &mut self,
        window: NativeWindow,
        property: Atom,
        text: &str,
    ) -> Result<()> {
        self.conn
            .change_property8(
                PropMode::REPLACE,
                window.0,
                property.0,
                AtomEnum::STRING,
                text.as_bytes(),
            )
            .map_err(BridgeError::protocol)?;
        Ok(())
    }

    fn read_property_text(
        &mut self,
        window: NativeWindow,
        property: Atom,
    ) -> Result<Option<String>> {
        let reply = self
            .conn
            .get_property(
                true,
                window.0,
                property.0,
                AtomEnum::STRING,
                0,
                u32::MAX / 4,
            )
            .map_err(BridgeError::connection)?
            .reply()
            .map_err(BridgeError::protocol)?;
        if reply.type_ == x11rb::NONE || reply.format != 8 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&reply.value).into_owned()))
    }

    fn send_selection_notify(&mut self, reply: SelectionReply) -> Result<()> {
        let event = SelectionNotifyEvent {
            response_type: SELECTION_NOTIFY_EVENT,
            sequence: 0,
            time: reply.time,
            requestor: reply.requestor.0,
            selection: reply.selection.0,
            target: reply.target.0,
            property: reply.property.0,
        };
        self.conn
            .send_event(false, reply.requestor.0, EventMask::NO_EVENT, event)
            .map_err(BridgeError::connection)?;
        self.conn.flush().map_err(BridgeError::connection)
    }

    fn protocol_atoms(&self) -> ProtocolAtoms {
        ProtocolAtoms {
            wm_protocols: Atom(self.atoms.WM_PROTOCOLS),
            wm_delete_window: Atom(self.atoms.WM_DELETE_WINDOW),
        }
    }
}
