//! Keyboard translation.
//!
//! Maps key symbols to virtual-key codes, keeps the key state tables and
//! builds the packed transition descriptor carried in keyboard messages.

use tracing::{trace, warn};

use crate::event::{MessageKind, ModMask};

/// Virtual-key codes.
pub mod vk {
    pub const CANCEL: u8 = 0x03;
    pub const BACK: u8 = 0x08;
    pub const TAB: u8 = 0x09;
    pub const CLEAR: u8 = 0x0C;
    pub const RETURN: u8 = 0x0D;
    pub const SHIFT: u8 = 0x10;
    pub const CONTROL: u8 = 0x11;
    pub const MENU: u8 = 0x12;
    pub const PAUSE: u8 = 0x13;
    pub const CAPITAL: u8 = 0x14;
    pub const ESCAPE: u8 = 0x1B;
    pub const SPACE: u8 = 0x20;
    pub const PRIOR: u8 = 0x21;
    pub const NEXT: u8 = 0x22;
    pub const END: u8 = 0x23;
    pub const HOME: u8 = 0x24;
    pub const LEFT: u8 = 0x25;
    pub const UP: u8 = 0x26;
    pub const RIGHT: u8 = 0x27;
    pub const DOWN: u8 = 0x28;
    pub const SELECT: u8 = 0x29;
    pub const PRINT: u8 = 0x2A;
    pub const EXECUTE: u8 = 0x2B;
    pub const SNAPSHOT: u8 = 0x2C;
    pub const INSERT: u8 = 0x2D;
    pub const DELETE: u8 = 0x2E;
    pub const HELP: u8 = 0x2F;
    pub const NUMPAD0: u8 = 0x60;
    pub const MULTIPLY: u8 = 0x6A;
    pub const ADD: u8 = 0x6B;
    pub const SEPARATOR: u8 = 0x6C;
    pub const SUBTRACT: u8 = 0x6D;
    pub const DECIMAL: u8 = 0x6E;
    pub const DIVIDE: u8 = 0x6F;
    pub const F1: u8 = 0x70;
    pub const NUMLOCK: u8 = 0x90;
    pub const SCROLL: u8 = 0x91;
}

/// Key symbol of the Return key, used for the debugger chord.
pub const XK_RETURN: u32 = 0xFF0D;

/// Key-state table bit: key is held.
pub const KEY_DOWN: u8 = 0x80;
/// Key-state table bit: flips on every fresh press.
pub const KEY_TOGGLED: u8 = 0x01;

// 0xFF08..=0xFF1B
const SPECIAL_KEYS: [u8; 20] = [
    vk::BACK,
    vk::TAB,
    0,
    vk::CLEAR,
    0,
    vk::RETURN,
    0,
    0,
    0,
    0,
    0,
    vk::PAUSE,
    vk::SCROLL,
    0,
    0,
    0,
    0,
    0,
    0,
    vk::ESCAPE,
];

// 0xFF50..=0xFF57
const CURSOR_KEYS: [u8; 8] = [
    vk::HOME,
    vk::LEFT,
    vk::UP,
    vk::RIGHT,
    vk::DOWN,
    vk::PRIOR,
    vk::NEXT,
    vk::END,
];

// 0xFF60..=0xFF6B
const MISC_KEYS: [u8; 12] = [
    vk::SELECT,
    vk::SNAPSHOT,
    vk::EXECUTE,
    vk::INSERT,
    0,
    0,
    0,
    0,
    vk::CANCEL,
    vk::HELP,
    vk::CANCEL,
    vk::MENU,
];

// 0xFF7E..=0xFFB9
const KEYPAD_KEYS: [u8; 60] = {
    let mut table = [0u8; 60];
    table[0] = vk::MENU;
    table[1] = vk::NUMLOCK;
    table[0x8D - 0x7E] = vk::RETURN;
    table[0xAA - 0x7E] = vk::MULTIPLY;
    table[0xAB - 0x7E] = vk::ADD;
    table[0xAC - 0x7E] = vk::SEPARATOR;
    table[0xAD - 0x7E] = vk::SUBTRACT;
    table[0xAE - 0x7E] = vk::DECIMAL;
    table[0xAF - 0x7E] = vk::DIVIDE;
    let mut i = 0;
    while i < 10 {
        table[0xB0 - 0x7E + i] = vk::NUMPAD0 + i as u8;
        i += 1;
    }
    table
};

// 0xFFE1..=0xFFEA
const MODIFIER_KEYS: [u8; 10] = [
    vk::SHIFT,
    vk::SHIFT,
    vk::CONTROL,
    vk::CONTROL,
    vk::CAPITAL,
    0,
    0,
    0,
    vk::MENU,
    vk::MENU,
];

/// Result of classifying a key symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VirtualKey {
    pub code: u8,
    /// Numeric-pad and function keys.
    pub extended: bool,
}

impl VirtualKey {
    const fn plain(code: u8) -> Self {
        Self {
            code,
            extended: false,
        }
    }

    const fn extended(code: u8) -> Self {
        Self {
            code,
            extended: true,
        }
    }
}

/// Classify a key symbol into a virtual-key code.
///
/// Only the low 16 bits of the symbol take part. Unmapped punctuation is
/// reported and yields code 0.
pub fn translate_keysym(keysym: u32) -> VirtualKey {
    let class = (keysym >> 8) & 0xFF;
    let key = (keysym & 0xFF) as u8;

    match class {
        0xFF => match key {
            0x08..=0x1B => VirtualKey::plain(SPECIAL_KEYS[usize::from(key - 0x08)]),
            0x50..=0x57 => VirtualKey::plain(CURSOR_KEYS[usize::from(key - 0x50)]),
            0x60..=0x6B => VirtualKey::plain(MISC_KEYS[usize::from(key - 0x60)]),
            0x7E..=0xB9 => VirtualKey::extended(KEYPAD_KEYS[usize::from(key - 0x7E)]),
            0xBE..=0xCD => VirtualKey::extended(vk::F1 + (key - 0xBE)),
            0xE1..=0xEA => VirtualKey::plain(MODIFIER_KEYS[usize::from(key - 0xE1)]),
            0xFF => VirtualKey::plain(vk::DELETE),
            _ => VirtualKey::default(),
        },
        0x00 => VirtualKey::plain(translate_character(key)),
        _ => VirtualKey::default(),
    }
}

fn translate_character(key: u8) -> u8 {
    if key.is_ascii_alphanumeric() {
        return key.to_ascii_uppercase();
    }
    if key == b' ' || (0x09..=0x0D).contains(&key) {
        return key;
    }
    match key {
        b'!' => b'1',
        b'@' => b'2',
        b'#' => b'3',
        b'$' => b'4',
        b'%' => b'5',
        b'^' => b'6',
        b'&' => b'7',
        b'*' => b'8',
        b'(' => b'9',
        b')' => b'0',
        b'`' | b'~' => 0xC0,
        b'-' | b'_' => 0xBD,
        b'=' | b'+' => 0xBB,
        b'[' | b'{' => 0xDB,
        b']' | b'}' => 0xDD,
        b';' | b':' => 0xBA,
        b'\'' | b'"' => 0xDE,
        b',' | b'<' => 0xBC,
        b'.' | b'>' => 0xBE,
        b'/' | b'?' => 0xBF,
        b'\\' | b'|' => 0xDC,
        _ => {
            warn!("Unknown key symbol 0x{:02x}, no virtual key", key);
            0
        },
    }
}

/// Decoded form of the keyboard message `lparam`.
///
/// Bits 0-15 repeat count, 16-23 scan code, 24 extended, 27 produced a
/// character, 29 context (Alt), 30 previous state, 31 transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyTransition {
    pub repeat_count: u16,
    pub scan_code: u8,
    pub extended: bool,
    pub has_char: bool,
    pub context: bool,
    /// On a press, the key was up before it; always set on a release.
    pub previous: bool,
    /// Set for releases.
    pub transition: bool,
}

impl KeyTransition {
    pub fn to_lparam(self) -> u32 {
        u32::from(self.repeat_count)
            | u32::from(self.scan_code) << 16
            | u32::from(self.extended) << 24
            | u32::from(self.has_char) << 27
            | u32::from(self.context) << 29
            | u32::from(self.previous) << 30
            | u32::from(self.transition) << 31
    }

    pub fn from_lparam(lparam: u32) -> Self {
        Self {
            repeat_count: (lparam & 0xFFFF) as u16,
            scan_code: ((lparam >> 16) & 0xFF) as u8,
            extended: lparam & (1 << 24) != 0,
            has_char: lparam & (1 << 27) != 0,
            context: lparam & (1 << 29) != 0,
            previous: lparam & (1 << 30) != 0,
            transition: lparam & (1 << 31) != 0,
        }
    }
}

/// What the display adapter resolved for a key code and modifier mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyLookup {
    pub keysym: u32,
    /// Locale text, at most one character.
    pub text: Option<char>,
}

/// One translated key message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStroke {
    pub kind: MessageKind,
    pub vk: u8,
    pub transition: KeyTransition,
}

/// Persistent key state.
#[derive(Debug, Clone)]
pub struct Keyboard {
    keys: [u8; 256],
    async_keys: [u8; 256],
    last_char: Option<char>,
}

impl Default for Keyboard {
    fn default() -> Self {
        Self {
            keys: [0; 256],
            async_keys: [0; 256],
            last_char: None,
        }
    }
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, keycode: u8, state: ModMask, lookup: KeyLookup) -> KeyStroke {
        let key = translate_keysym(lookup.keysym);
        let index = usize::from(key.code);
        let was_down = self.keys[index] & KEY_DOWN != 0;

        if !was_down {
            self.keys[index] ^= KEY_TOGGLED;
        }
        self.keys[index] |= KEY_DOWN;
        self.async_keys[index] |= KEY_DOWN | KEY_TOGGLED;

        let alt_down = self.is_down(vk::MENU);
        let transition = KeyTransition {
            repeat_count: 1,
            scan_code: keycode.wrapping_sub(8),
            extended: key.extended,
            has_char: lookup.text.is_some(),
            context: state.contains(ModMask::MOD1) || alt_down,
            previous: !was_down,
            transition: false,
        };
        if let Some(c) = lookup.text {
            self.last_char = Some(c);
        }
        trace!(
            "key down keysym=0x{:x} vk=0x{:02x} state=0x{:02x}",
            lookup.keysym,
            key.code,
            self.keys[index]
        );

        KeyStroke {
            kind: if alt_down {
                MessageKind::SysKeyDown
            } else {
                MessageKind::KeyDown
            },
            vk: key.code,
            transition,
        }
    }

    pub fn release(&mut self, keycode: u8, state: ModMask, lookup: KeyLookup) -> KeyStroke {
        let key = translate_keysym(lookup.keysym);
        let index = usize::from(key.code);
        let alt_was_down = self.is_down(vk::MENU);

        self.keys[index] &= !KEY_DOWN;
        self.async_keys[index] &= !KEY_DOWN;

        let transition = KeyTransition {
            repeat_count: 1,
            scan_code: keycode.wrapping_sub(8),
            extended: key.extended,
            has_char: false,
            context: state.contains(ModMask::MOD1),
            previous: true,
            transition: true,
        };
        trace!(
            "key up keysym=0x{:x} vk=0x{:02x} state=0x{:02x}",
            lookup.keysym,
            key.code,
            self.keys[index]
        );

        KeyStroke {
            kind: if alt_was_down {
                MessageKind::SysKeyUp
            } else {
                MessageKind::KeyUp
            },
            vk: key.code,
            transition,
        }
    }

    pub fn is_down(&self, vk: u8) -> bool {
        self.keys[usize::from(vk)] & KEY_DOWN != 0
    }

    /// Raw table entry: [`KEY_DOWN`] and [`KEY_TOGGLED`] bits.
    pub fn key_state(&self, vk: u8) -> u8 {
        self.keys[usize::from(vk)]
    }

    /// Hardware state of `vk`: `0x8000` while held, `0x0001` if pressed
    /// since the previous call. Clears the pressed-since bit.
    pub fn take_async_state(&mut self, vk: u8) -> u16 {
        let entry = &mut self.async_keys[usize::from(vk)];
        let mut result = 0;
        if *entry & KEY_DOWN != 0 {
            result |= 0x8000;
        }
        if *entry & KEY_TOGGLED != 0 {
            result |= 0x0001;
        }
        *entry &= !KEY_TOGGLED;
        result
    }

    pub fn last_char(&self) -> Option<char> {
        self.last_char
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sym(keysym: u32) -> KeyLookup {
        KeyLookup { keysym, text: None }
    }

    #[test]
    fn test_translate_function_class() {
        assert_eq!(translate_keysym(0xFF08), VirtualKey::plain(vk::BACK));
        assert_eq!(translate_keysym(0xFF0D), VirtualKey::plain(vk::RETURN));
        assert_eq!(translate_keysym(0xFF1B), VirtualKey::plain(vk::ESCAPE));
        assert_eq!(translate_keysym(0xFF51), VirtualKey::plain(vk::LEFT));
        assert_eq!(translate_keysym(0xFF63), VirtualKey::plain(vk::INSERT));
        assert_eq!(translate_keysym(0xFF8D), VirtualKey::extended(vk::RETURN));
        assert_eq!(translate_keysym(0xFFB7), VirtualKey::extended(0x67));
        assert_eq!(translate_keysym(0xFFAB), VirtualKey::extended(vk::ADD));
        assert_eq!(translate_keysym(0xFFBE), VirtualKey::extended(vk::F1));
        assert_eq!(translate_keysym(0xFFCD), VirtualKey::extended(vk::F1 + 15));
        assert_eq!(translate_keysym(0xFFE3), VirtualKey::plain(vk::CONTROL));
        assert_eq!(translate_keysym(0xFFE9), VirtualKey::plain(vk::MENU));
        assert_eq!(translate_keysym(0xFFFF), VirtualKey::plain(vk::DELETE));
        assert_eq!(translate_keysym(0xFF00), VirtualKey::default());
    }

    #[test]
    fn test_translate_character_class() {
        assert_eq!(translate_keysym(u32::from(b'a')).code, b'A');
        assert_eq!(translate_keysym(u32::from(b'7')).code, b'7');
        assert_eq!(translate_keysym(u32::from(b' ')).code, vk::SPACE);
        assert_eq!(translate_keysym(u32::from(b'%')).code, b'5');
        assert_eq!(translate_keysym(u32::from(b'?')).code, 0xBF);
        assert_eq!(translate_keysym(u32::from(b'"')).code, 0xDE);
        assert_eq!(translate_keysym(0xE9).code, 0);
        assert_eq!(translate_keysym(0x0641).code, 0);
    }

    #[test]
    fn test_lparam_bit_layout() {
        let t = KeyTransition {
            repeat_count: 1,
            scan_code: 0x1C,
            extended: true,
            has_char: true,
            context: true,
            previous: true,
            transition: true,
        };
        assert_eq!(t.to_lparam(), 0xE91C_0001);
        assert_eq!(KeyTransition::from_lparam(0xE91C_0001), t);
    }

    #[test]
    fn test_press_then_release_of_letter() {
        let mut kb = Keyboard::new();
        let down = kb.press(
            38,
            ModMask::empty(),
            KeyLookup {
                keysym: u32::from(b'a'),
                text: Some('a'),
            },
        );
        assert_eq!(down.kind, MessageKind::KeyDown);
        assert_eq!(down.vk, b'A');
        assert_eq!(down.transition.to_lparam(), 0x481E_0001);
        assert_eq!(kb.last_char(), Some('a'));
        assert_eq!(kb.key_state(b'A'), KEY_DOWN | KEY_TOGGLED);

        let up = kb.release(38, ModMask::empty(), sym(u32::from(b'a')));
        assert_eq!(up.kind, MessageKind::KeyUp);
        assert_eq!(up.transition.to_lparam(), 0xC01E_0001);
        assert_eq!(kb.key_state(b'A'), KEY_TOGGLED);
    }

    #[test]
    fn test_repeat_does_not_toggle() {
        let mut kb = Keyboard::new();
        kb.press(50, ModMask::empty(), sym(0xFFE1));
        let repeat = kb.press(50, ModMask::empty(), sym(0xFFE1));
        assert_eq!(kb.key_state(vk::SHIFT), KEY_DOWN | KEY_TOGGLED);
        assert!(!repeat.transition.previous);
    }

    #[test]
    fn test_alt_makes_system_keys() {
        let mut kb = Keyboard::new();
        let alt = kb.press(64, ModMask::empty(), sym(0xFFE9));
        assert_eq!(alt.kind, MessageKind::SysKeyDown);
        assert!(alt.transition.context);

        let f = kb.press(41, ModMask::MOD1, sym(u32::from(b'f')));
        assert_eq!(f.kind, MessageKind::SysKeyDown);

        let f_up = kb.release(41, ModMask::MOD1, sym(u32::from(b'f')));
        assert_eq!(f_up.kind, MessageKind::SysKeyUp);
        assert!(f_up.transition.context);

        let alt_up = kb.release(64, ModMask::MOD1, sym(0xFFE9));
        assert_eq!(alt_up.kind, MessageKind::SysKeyUp);

        let g_up = kb.release(42, ModMask::empty(), sym(u32::from(b'g')));
        assert_eq!(g_up.kind, MessageKind::KeyUp);
        assert!(!g_up.transition.context);
    }

    #[test]
    fn test_async_state_reads_and_clears() {
        let mut kb = Keyboard::new();
        kb.press(36, ModMask::empty(), sym(0xFF0D));
        assert_eq!(kb.take_async_state(vk::RETURN), 0x8001);
        assert_eq!(kb.take_async_state(vk::RETURN), 0x8000);
        kb.release(36, ModMask::empty(), sym(0xFF0D));
        assert_eq!(kb.take_async_state(vk::RETURN), 0);
    }
}
