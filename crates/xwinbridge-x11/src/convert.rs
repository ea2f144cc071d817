//! x11rb events to [`NativeEvent`].

use x11rb::protocol::xproto::{KeyButMask, NotifyDetail};
use x11rb::protocol::Event;

use xwinbridge_core::event::{
    ButtonEvent, ClientMessageEvent, ConfigureEvent, ExposeEvent, FocusDetail, KeyEvent, ModMask,
    MotionEvent, SelectionClearEvent, SelectionNotifyEvent, SelectionRequestEvent,
};
use xwinbridge_core::{Atom, Geometry, NativeEvent, NativeWindow};

fn mask(state: KeyButMask) -> ModMask {
    ModMask::from_bits_truncate(u16::from(state))
}

fn focus_detail(detail: NotifyDetail) -> FocusDetail {
    match detail {
        NotifyDetail::ANCESTOR => FocusDetail::Ancestor,
        NotifyDetail::VIRTUAL => FocusDetail::Virtual,
        NotifyDetail::INFERIOR => FocusDetail::Inferior,
        NotifyDetail::NONLINEAR => FocusDetail::Nonlinear,
        NotifyDetail::NONLINEAR_VIRTUAL => FocusDetail::NonlinearVirtual,
        NotifyDetail::POINTER => FocusDetail::Pointer,
        NotifyDetail::POINTER_ROOT => FocusDetail::PointerRoot,
        _ => FocusDetail::None,
    }
}

const fn other(window: u32, name: &'static str) -> NativeEvent {
    NativeEvent::Other {
        window: NativeWindow(window),
        name,
    }
}

const fn structure(window: u32, name: &'static str) -> NativeEvent {
    NativeEvent::Structure {
        window: NativeWindow(window),
        name,
    }
}

/// Convert a server event. Returns `None` for protocol errors and for
/// event types that never concern a window.
pub fn convert_event(event: &Event) -> Option<NativeEvent> {
    let converted = match event {
        Event::KeyPress(e) => NativeEvent::KeyPress(KeyEvent {
            window: NativeWindow(e.event),
            keycode: e.detail,
            state: mask(e.state),
            root_x: i32::from(e.root_x),
            root_y: i32::from(e.root_y),
            time: e.time,
        }),
        Event::KeyRelease(e) => NativeEvent::KeyRelease(KeyEvent {
            window: NativeWindow(e.event),
            keycode: e.detail,
            state: mask(e.state),
            root_x: i32::from(e.root_x),
            root_y: i32::from(e.root_y),
            time: e.time,
        }),
        Event::ButtonPress(e) => NativeEvent::ButtonPress(ButtonEvent {
            window: NativeWindow(e.event),
            button: e.detail,
            state: mask(e.state),
            root_x: i32::from(e.root_x),
            root_y: i32::from(e.root_y),
            time: e.time,
        }),
        Event::ButtonRelease(e) => NativeEvent::ButtonRelease(ButtonEvent {
            window: NativeWindow(e.event),
            button: e.detail,
            state: mask(e.state),
            root_x: i32::from(e.root_x),
            root_y: i32::from(e.root_y),
            time: e.time,
        }),
        Event::MotionNotify(e) => NativeEvent::Motion(MotionEvent {
            window: NativeWindow(e.event),
            state: mask(e.state),
            root_x: i32::from(e.root_x),
            root_y: i32::from(e.root_y),
            time: e.time,
        }),
        Event::FocusIn(e) => NativeEvent::FocusIn {
            window: NativeWindow(e.event),
            detail: focus_detail(e.detail),
        },
        Event::FocusOut(e) => NativeEvent::FocusOut {
            window: NativeWindow(e.event),
            detail: focus_detail(e.detail),
        },
        Event::Expose(e) => NativeEvent::Expose(ExposeEvent {
            window: NativeWindow(e.window),
            area: Geometry::new(
                i32::from(e.x),
                i32::from(e.y),
                u32::from(e.width),
                u32::from(e.height),
            ),
            count: e.count,
        }),
        Event::GraphicsExposure(e) => NativeEvent::GraphicsExpose(ExposeEvent {
            window: NativeWindow(e.drawable),
            area: Geometry::new(
                i32::from(e.x),
                i32::from(e.y),
                u32::from(e.width),
                u32::from(e.height),
            ),
            count: e.count,
        }),
        Event::NoExposure(e) => NativeEvent::NoExpose {
            window: NativeWindow(e.drawable),
        },
        Event::ConfigureNotify(e) => NativeEvent::Configure(ConfigureEvent {
            window: NativeWindow(e.window),
            geometry: Geometry::new(
                i32::from(e.x),
                i32::from(e.y),
                u32::from(e.width),
                u32::from(e.height),
            ),
        }),
        Event::SelectionRequest(e) => NativeEvent::SelectionRequest(SelectionRequestEvent {
            owner: NativeWindow(e.owner),
            requestor: NativeWindow(e.requestor),
            selection: Atom(e.selection),
            target: Atom(e.target),
            property: Atom(e.property),
            time: e.time,
        }),
        Event::SelectionNotify(e) => NativeEvent::SelectionNotify(SelectionNotifyEvent {
            requestor: NativeWindow(e.requestor),
            selection: Atom(e.selection),
            target: Atom(e.target),
            property: Atom(e.property),
            time: e.time,
        }),
        Event::SelectionClear(e) => NativeEvent::SelectionClear(SelectionClearEvent {
            owner: NativeWindow(e.owner),
            selection: Atom(e.selection),
            time: e.time,
        }),
        Event::ClientMessage(e) => NativeEvent::ClientMessage(ClientMessageEvent {
            window: NativeWindow(e.window),
            format: e.format,
            message_type: Atom(e.type_),
            data: e.data.as_data32(),
        }),
        Event::MapNotify(e) => NativeEvent::Map {
            window: NativeWindow(e.window),
        },
        Event::DestroyNotify(e) => NativeEvent::Destroy {
            window: NativeWindow(e.window),
        },
        Event::UnmapNotify(e) => structure(e.window, "UnmapNotify"),
        Event::CreateNotify(e) => structure(e.window, "CreateNotify"),
        Event::ReparentNotify(e) => structure(e.window, "ReparentNotify"),
        Event::GravityNotify(e) => structure(e.window, "GravityNotify"),
        Event::CirculateNotify(e) => structure(e.window, "CirculateNotify"),
        Event::EnterNotify(e) => other(e.event, "EnterNotify"),
        Event::LeaveNotify(e) => other(e.event, "LeaveNotify"),
        Event::PropertyNotify(e) => other(e.window, "PropertyNotify"),
        Event::VisibilityNotify(e) => other(e.window, "VisibilityNotify"),
        Event::ColormapNotify(e) => other(e.window, "ColormapNotify"),
        _ => return None,
    };
    Some(converted)
}
