//! Native events in, window messages out.
//!
//! [`NativeEvent`] is what the display adapter hands to the core.
//! [`HardwareMessage`] and [`WindowMessage`] are what the core emits to the
//! window-message system.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::geometry::Geometry;

/// Handle of an internal window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hwnd(pub u32);

impl std::fmt::Display for Hwnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04x}", self.0)
    }
}

/// Handle of a window on the display server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NativeWindow(pub u32);

impl std::fmt::Display for NativeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// A display-server atom. The predefined ones keep their wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Atom(pub u32);

impl Atom {
    pub const NONE: Self = Self(0);
    pub const PRIMARY: Self = Self(1);
    pub const STRING: Self = Self(31);

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

bitflags! {
    /// Native modifier and button mask carried by input events.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ModMask: u16 {
        const SHIFT   = 1 << 0;
        const LOCK    = 1 << 1;
        const CONTROL = 1 << 2;
        const MOD1    = 1 << 3;
        const MOD2    = 1 << 4;
        const MOD3    = 1 << 5;
        const MOD4    = 1 << 6;
        const MOD5    = 1 << 7;
        const BUTTON1 = 1 << 8;
        const BUTTON2 = 1 << 9;
        const BUTTON3 = 1 << 10;
        const BUTTON4 = 1 << 11;
        const BUTTON5 = 1 << 12;
    }
}

/// Key press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub window: NativeWindow,
    /// Hardware key code as delivered by the server (scan code + 8).
    pub keycode: u8,
    pub state: ModMask,
    pub root_x: i32,
    pub root_y: i32,
    pub time: u32,
}

/// Button press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    pub window: NativeWindow,
    /// Native button number, 1-based.
    pub button: u8,
    pub state: ModMask,
    pub root_x: i32,
    pub root_y: i32,
    pub time: u32,
}

/// Pointer motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionEvent {
    pub window: NativeWindow,
    pub state: ModMask,
    pub root_x: i32,
    pub root_y: i32,
    pub time: u32,
}

/// Why focus moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusDetail {
    Ancestor,
    Virtual,
    Inferior,
    Nonlinear,
    NonlinearVirtual,
    Pointer,
    PointerRoot,
    None,
}

/// An area of a window needs repainting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExposeEvent {
    pub window: NativeWindow,
    /// Rectangle relative to the native window origin.
    pub area: Geometry,
    /// Number of expose events still following this one.
    pub count: u16,
}

/// The server moved or resized a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigureEvent {
    pub window: NativeWindow,
    pub geometry: Geometry,
}

/// Another client asks for the contents of a selection we own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRequestEvent {
    pub owner: NativeWindow,
    pub requestor: NativeWindow,
    pub selection: Atom,
    pub target: Atom,
    pub property: Atom,
    pub time: u32,
}

/// Answer to a conversion request this process made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionNotifyEvent {
    pub requestor: NativeWindow,
    pub selection: Atom,
    pub target: Atom,
    pub property: Atom,
    pub time: u32,
}

/// Another client took ownership of a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionClearEvent {
    pub owner: NativeWindow,
    pub selection: Atom,
    pub time: u32,
}

/// Client-to-client message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientMessageEvent {
    pub window: NativeWindow,
    pub format: u8,
    pub message_type: Atom,
    pub data: [u32; 5],
}

/// Events the display adapter hands to the core.
///
/// Every variant names the native window it was delivered to; the
/// dispatcher drops any event whose window is not registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeEvent {
    KeyPress(KeyEvent),
    KeyRelease(KeyEvent),
    ButtonPress(ButtonEvent),
    ButtonRelease(ButtonEvent),
    Motion(MotionEvent),
    FocusIn {
        window: NativeWindow,
        detail: FocusDetail,
    },
    FocusOut {
        window: NativeWindow,
        detail: FocusDetail,
    },
    Expose(ExposeEvent),
    /// Area revealed by a copy from a partially obscured source.
    GraphicsExpose(ExposeEvent),
    NoExpose {
        window: NativeWindow,
    },
    Configure(ConfigureEvent),
    SelectionRequest(SelectionRequestEvent),
    SelectionNotify(SelectionNotifyEvent),
    SelectionClear(SelectionClearEvent),
    ClientMessage(ClientMessageEvent),
    Map {
        window: NativeWindow,
    },
    Destroy {
        window: NativeWindow,
    },
    /// Structure notifications that carry nothing we act on
    /// (unmap, create, reparent, gravity, circulate).
    Structure {
        window: NativeWindow,
        name: &'static str,
    },
    /// Any other event type, kept for logging.
    Other {
        window: NativeWindow,
        name: &'static str,
    },
}

impl NativeEvent {
    /// The native window the event was delivered to.
    pub const fn window(&self) -> NativeWindow {
        match self {
            Self::KeyPress(e) | Self::KeyRelease(e) => e.window,
            Self::ButtonPress(e) | Self::ButtonRelease(e) => e.window,
            Self::Motion(e) => e.window,
            Self::Expose(e) | Self::GraphicsExpose(e) => e.window,
            Self::Configure(e) => e.window,
            Self::SelectionRequest(e) => e.owner,
            Self::SelectionNotify(e) => e.requestor,
            Self::SelectionClear(e) => e.owner,
            Self::ClientMessage(e) => e.window,
            Self::FocusIn { window, .. }
            | Self::FocusOut { window, .. }
            | Self::NoExpose { window }
            | Self::Map { window }
            | Self::Destroy { window }
            | Self::Structure { window, .. }
            | Self::Other { window, .. } => *window,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::KeyPress(_) => "KeyPress",
            Self::KeyRelease(_) => "KeyRelease",
            Self::ButtonPress(_) => "ButtonPress",
            Self::ButtonRelease(_) => "ButtonRelease",
            Self::Motion(_) => "MotionNotify",
            Self::FocusIn { .. } => "FocusIn",
            Self::FocusOut { .. } => "FocusOut",
            Self::Expose(_) => "Expose",
            Self::GraphicsExpose(_) => "GraphicsExpose",
            Self::NoExpose { .. } => "NoExpose",
            Self::Configure(_) => "ConfigureNotify",
            Self::SelectionRequest(_) => "SelectionRequest",
            Self::SelectionNotify(_) => "SelectionNotify",
            Self::SelectionClear(_) => "SelectionClear",
            Self::ClientMessage(_) => "ClientMessage",
            Self::Map { .. } => "MapNotify",
            Self::Destroy { .. } => "DestroyNotify",
            Self::Structure { name, .. } | Self::Other { name, .. } => name,
        }
    }

    pub const fn is_motion(&self) -> bool {
        matches!(self, Self::Motion(_))
    }
}

/// Input message kinds posted to the hardware queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    KeyDown,
    KeyUp,
    SysKeyDown,
    SysKeyUp,
    MouseMove,
    LButtonDown,
    LButtonUp,
    MButtonDown,
    MButtonUp,
    RButtonDown,
    RButtonUp,
}

impl MessageKind {
    /// Legacy numeric message identifier.
    pub const fn code(self) -> u32 {
        match self {
            Self::KeyDown => 0x0100,
            Self::KeyUp => 0x0101,
            Self::SysKeyDown => 0x0104,
            Self::SysKeyUp => 0x0105,
            Self::MouseMove => 0x0200,
            Self::LButtonDown => 0x0201,
            Self::LButtonUp => 0x0202,
            Self::RButtonDown => 0x0204,
            Self::RButtonUp => 0x0205,
            Self::MButtonDown => 0x0207,
            Self::MButtonUp => 0x0208,
        }
    }
}

/// A message for the hardware input queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareMessage {
    pub kind: MessageKind,
    /// Virtual-key code for keyboard messages, key-state flags for pointer
    /// messages.
    pub wparam: u32,
    /// Packed transition descriptor for keyboard messages, zero otherwise.
    pub lparam: u32,
    /// Desktop-relative pointer position.
    pub x: i32,
    pub y: i32,
    /// Milliseconds since the session started.
    pub time: u32,
}

bitflags! {
    /// Position-change flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct SwpFlags: u32 {
        const NOSIZE     = 0x0001;
        const NOMOVE     = 0x0002;
        const NOZORDER   = 0x0004;
        const NOACTIVATE = 0x0010;
    }
}

/// Position descriptor sent around a geometry change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPos {
    pub hwnd: Hwnd,
    pub x: i32,
    pub y: i32,
    pub cx: u32,
    pub cy: u32,
    pub flags: SwpFlags,
}

/// System command that closes a window.
pub const SC_CLOSE: u32 = 0xF060;

/// Messages sent synchronously to a specific window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowMessage {
    WindowPosChanging(WindowPos),
    WindowPosChanged(WindowPos),
    SysCommand { command: u32 },
}

impl WindowMessage {
    pub const fn code(&self) -> u32 {
        match self {
            Self::WindowPosChanging(_) => 0x0046,
            Self::WindowPosChanged(_) => 0x0047,
            Self::SysCommand { .. } => 0x0112,
        }
    }
}

bitflags! {
    /// Repaint request flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RedrawFlags: u32 {
        const INVALIDATE   = 0x0001;
        const ERASE        = 0x0004;
        const FRAME        = 0x0400;
        const ERASENOW     = 0x0200;
        const ALLCHILDREN  = 0x0080;
    }
}

/// Area covered by a repaint request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedrawArea {
    /// Rectangle relative to the target's client area.
    Rect(Geometry),
    /// Region in desktop coordinates.
    Region(crate::geometry::Region),
}
