//! Key code resolution through xkbcommon.

use tracing::debug;
use xkbcommon::xkb;

use xwinbridge_core::config::InputConfig;
use xwinbridge_core::event::ModMask;
use xwinbridge_core::keyboard::KeyLookup;
use xwinbridge_core::BridgeError;

pub struct XkbKeymap {
    state: xkb::State,
}

impl XkbKeymap {
    /// Compile a keymap from rule names.
    pub fn new(input: &InputConfig) -> Result<Self, BridgeError> {
        let context = xkb::Context::new(xkb::CONTEXT_NO_FLAGS);
        let options = if input.xkb_options.is_empty() {
            None
        } else {
            Some(input.xkb_options.clone())
        };
        let keymap = xkb::Keymap::new_from_names(
            &context,
            &input.xkb_rules,
            &input.xkb_model,
            &input.xkb_layout,
            &input.xkb_variant,
            options,
            xkb::KEYMAP_COMPILE_NO_FLAGS,
        )
        .ok_or_else(|| {
            BridgeError::Keymap(format!("cannot compile layout '{}'", input.xkb_layout))
        })?;

        debug!("Compiled keymap for layout '{}'", input.xkb_layout);
        Ok(Self {
            state: xkb::State::new(&keymap),
        })
    }

    /// Keysym and text for `keycode` under the modifiers of an event.
    pub fn lookup(&mut self, keycode: u8, state: ModMask) -> KeyLookup {
        // core modifier bits share their indices with the xkb ones
        let mods = u32::from(state.bits() & 0xFF);
        let locked = u32::from(ModMask::LOCK.bits());
        self.state
            .update_mask(mods & !locked, 0, mods & locked, 0, 0, 0);

        let code = u32::from(keycode);
        KeyLookup {
            keysym: self.state.key_get_one_sym(code),
            text: self.state.key_get_utf8(code).chars().next(),
        }
    }
}
