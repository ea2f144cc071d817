//! Pointer button state and key-state flags.

use bitflags::bitflags;

use crate::event::{MessageKind, ModMask};

/// Buttons the message system knows about.
pub const NB_BUTTONS: usize = 3;

bitflags! {
    /// Key-state flags carried in pointer messages.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct KeyStateFlags: u32 {
        const LBUTTON = 0x0001;
        const RBUTTON = 0x0002;
        const SHIFT   = 0x0004;
        const CONTROL = 0x0008;
        const MBUTTON = 0x0010;
    }
}

impl From<ModMask> for KeyStateFlags {
    fn from(state: ModMask) -> Self {
        let mut flags = Self::empty();
        if state.contains(ModMask::BUTTON1) {
            flags |= Self::LBUTTON;
        }
        if state.contains(ModMask::BUTTON2) {
            flags |= Self::MBUTTON;
        }
        if state.contains(ModMask::BUTTON3) {
            flags |= Self::RBUTTON;
        }
        if state.contains(ModMask::SHIFT) {
            flags |= Self::SHIFT;
        }
        if state.contains(ModMask::CONTROL) {
            flags |= Self::CONTROL;
        }
        flags
    }
}

bitflags! {
    /// Flags accepted by mouse event injection.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MouseEventFlags: u32 {
        const MOVE      = 0x0001;
        const LEFTDOWN  = 0x0002;
        const LEFTUP    = 0x0004;
        const RIGHTDOWN = 0x0008;
        const RIGHTUP   = 0x0010;
    }
}

impl MouseEventFlags {
    /// Button messages for the set flags, in emission order.
    pub fn button_messages(self) -> impl Iterator<Item = MessageKind> {
        [
            (Self::LEFTDOWN, MessageKind::LButtonDown),
            (Self::LEFTUP, MessageKind::LButtonUp),
            (Self::RIGHTDOWN, MessageKind::RButtonDown),
            (Self::RIGHTUP, MessageKind::RButtonUp),
        ]
        .into_iter()
        .filter(move |(flag, _)| self.contains(*flag))
        .map(|(_, kind)| kind)
    }
}

const DOWN_MESSAGES: [MessageKind; NB_BUTTONS] = [
    MessageKind::LButtonDown,
    MessageKind::MButtonDown,
    MessageKind::RButtonDown,
];

const UP_MESSAGES: [MessageKind; NB_BUTTONS] = [
    MessageKind::LButtonUp,
    MessageKind::MButtonUp,
    MessageKind::RButtonUp,
];

/// Pressed flags per button, indexed left, middle, right.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buttons {
    /// In step with delivered messages.
    pressed: [bool; NB_BUTTONS],
    /// Set on hardware press, cleared only when read.
    async_pressed: [bool; NB_BUTTONS],
}

impl Buttons {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press of native button `button` (1-based). Returns the
    /// message to emit, or `None` for buttons beyond the third.
    pub fn press(&mut self, button: u8) -> Option<MessageKind> {
        let index = button_index(button)?;
        self.pressed[index] = true;
        self.async_pressed[index] = true;
        Some(DOWN_MESSAGES[index])
    }

    pub fn release(&mut self, button: u8) -> Option<MessageKind> {
        let index = button_index(button)?;
        self.pressed[index] = false;
        Some(UP_MESSAGES[index])
    }

    pub fn is_pressed(&self, index: usize) -> bool {
        self.pressed.get(index).copied().unwrap_or(false)
    }

    /// Whether button `index` went down since the last read. Clears it.
    pub fn take_async(&mut self, index: usize) -> bool {
        self.async_pressed
            .get_mut(index)
            .map(std::mem::take)
            .unwrap_or(false)
    }
}

fn button_index(button: u8) -> Option<usize> {
    let index = usize::from(button).checked_sub(1)?;
    (index < NB_BUTTONS).then_some(index)
}
