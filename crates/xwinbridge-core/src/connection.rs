//! The native event source.
//!
//! [`DisplayConnection`] is the seam between the core and a display
//! protocol. Adapters buffer events in a [`PendingEvents`] queue, which also
//! implements the motion-coalescing lookup the dispatcher relies on.

use std::collections::VecDeque;
use std::time::Duration;

use crate::error::Result;
use crate::event::{Atom, ModMask, NativeEvent, NativeWindow};
use crate::keyboard::KeyLookup;

/// Pointer position as reported by a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerState {
    pub root_x: i32,
    pub root_y: i32,
    pub state: ModMask,
}

/// Atoms of the window-manager close protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolAtoms {
    pub wm_protocols: Atom,
    pub wm_delete_window: Atom,
}

/// Reply to a selection conversion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionReply {
    pub requestor: NativeWindow,
    pub selection: Atom,
    pub target: Atom,
    /// Property holding the data, or [`Atom::NONE`] on refusal.
    pub property: Atom,
    pub time: u32,
}

/// A connection to the display server.
pub trait DisplayConnection {
    /// Whether an event is already queued locally.
    fn has_pending(&mut self) -> bool;

    /// Next queued event, without blocking.
    fn next_event(&mut self) -> Option<NativeEvent>;

    /// Block until the connection is readable or `timeout` elapses
    /// (`None` waits forever). `Ok(false)` means no event was queued.
    fn wait_readable(&mut self, timeout: Option<Duration>) -> Result<bool>;

    /// Flush requests and wait until the server has processed them.
    fn sync(&mut self) -> Result<()>;

    /// Remove every queued motion event for `window` and return the last.
    fn take_queued_motion(&mut self, window: NativeWindow) -> Option<NativeEvent>;

    /// Resolve a key code under a modifier mask.
    fn lookup_key(&mut self, keycode: u8, state: ModMask) -> KeyLookup;

    fn query_pointer(&mut self) -> Result<PointerState>;

    /// Grab the pointer for `window`. `Ok(false)` when the server refuses.
    fn grab_pointer(&mut self, window: NativeWindow) -> Result<bool>;

    fn ungrab_pointer(&mut self) -> Result<()>;

    /// Move the pointer relative to its current position.
    fn warp_pointer(&mut self, dx: i32, dy: i32) -> Result<()>;

    fn set_input_focus(&mut self, window: NativeWindow) -> Result<()>;

    /// Store `text` as a STRING property on `window`.
    fn change_property_text(
        &mut self,
        window: NativeWindow,
        property: Atom,
        text: &str,
    ) -> Result<()>;

    /// Read a STRING property, `None` when missing.
    fn read_property_text(
        &mut self,
        window: NativeWindow,
        property: Atom,
    ) -> Result<Option<String>>;

    fn send_selection_notify(&mut self, reply: SelectionReply) -> Result<()>;

    fn protocol_atoms(&self) -> ProtocolAtoms;
}

/// FIFO of events read from the server but not yet dispatched.
#[derive(Debug, Default)]
pub struct PendingEvents {
    queue: VecDeque<NativeEvent>,
}

impl PendingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: NativeEvent) {
        self.queue.push_back(event);
    }

    pub fn pop(&mut self) -> Option<NativeEvent> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Remove every queued motion event for `window`, returning the last.
    pub fn take_motion(&mut self, window: NativeWindow) -> Option<NativeEvent> {
        let mut last = None;
        self.queue.retain(|event| {
            if event.is_motion() && event.window() == window {
                last = Some(*event);
                false
            } else {
                true
            }
        });
        last
    }
}

impl Extend<NativeEvent> for PendingEvents {
    fn extend<I: IntoIterator<Item = NativeEvent>>(&mut self, iter: I) {
        self.queue.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::MotionEvent;
    use pretty_assertions::assert_eq;

    fn motion(window: u32, x: i32) -> NativeEvent {
        NativeEvent::Motion(MotionEvent {
            window: NativeWindow(window),
            state: ModMask::empty(),
            root_x: x,
            root_y: 0,
            time: 0,
        })
    }

    #[test]
    fn test_take_motion_keeps_other_windows() {
        let mut pending = PendingEvents::new();
        pending.extend([
            motion(1, 10),
            motion(2, 20),
            NativeEvent::Map {
                window: NativeWindow(1),
            },
            motion(1, 30),
        ]);
        assert_eq!(pending.take_motion(NativeWindow(1)), Some(motion(1, 30)));
        assert_eq!(pending.len(), 2);
        assert_eq!(pending.pop(), Some(motion(2, 20)));
        assert_eq!(pending.take_motion(NativeWindow(1)), None);
    }
}
