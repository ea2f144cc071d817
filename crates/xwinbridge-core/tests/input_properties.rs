//! Property tests for key-state and button-state tracking.

mod support;

use proptest::prelude::*;

use xwinbridge_core::event::ModMask;
use xwinbridge_core::keyboard::{KEY_DOWN, KEY_TOGGLED};
use xwinbridge_core::{MessageKind, NativeEvent};

use support::*;

/// Key codes 10..=19 carry the digits '1'..'9', '0'.
fn digit_core() -> TestCore {
    let mut core = test_core();
    for (keycode, digit) in (10u8..20).zip(b"1234567890".iter()) {
        core.connection_mut()
            .map_key(keycode, u32::from(*digit), Some(char::from(*digit)));
    }
    core
}

fn digit_vk(keycode: u8) -> u8 {
    b"1234567890"[usize::from(keycode - 10)]
}

proptest! {
    /// The toggle bit flips once per fresh press, never on auto-repeat.
    #[test]
    fn toggle_flips_once_per_press_edge(
        keycode in 10u8..20,
        repeats in prop::collection::vec(0usize..4, 1..8),
    ) {
        let mut core = digit_core();
        let vk = digit_vk(keycode);
        let mut edges = 0;

        for extra in repeats {
            core.process_event(NativeEvent::KeyPress(key(MAIN_NATIVE, keycode, ModMask::empty())));
            edges += 1;
            for _ in 0..extra {
                core.process_event(NativeEvent::KeyPress(key(MAIN_NATIVE, keycode, ModMask::empty())));
            }
            let state = core.key_state(vk);
            prop_assert_eq!(state & KEY_DOWN, KEY_DOWN);
            prop_assert_eq!(state & KEY_TOGGLED != 0, edges % 2 == 1);

            core.process_event(NativeEvent::KeyRelease(key(MAIN_NATIVE, keycode, ModMask::empty())));
            prop_assert_eq!(core.key_state(vk) & KEY_DOWN, 0);
        }
    }

    /// Buttons past the third neither emit messages nor touch state.
    #[test]
    fn high_buttons_are_ignored(number in 4u8..=255, press in any::<bool>()) {
        let mut core = test_core();
        let event = button(MAIN_NATIVE, number);
        core.process_event(if press {
            NativeEvent::ButtonPress(event)
        } else {
            NativeEvent::ButtonRelease(event)
        });

        prop_assert!(core.host().hardware.is_empty());
        for index in 0..3 {
            prop_assert!(!core.session().buttons.is_pressed(index));
            prop_assert!(!core.async_button_state(index));
        }
    }

    /// Any burst of motion for one window yields one message at the last
    /// position.
    #[test]
    fn motion_bursts_collapse(points in prop::collection::vec((0i32..2000, 0i32..2000), 1..32)) {
        let mut core = test_core();
        let burst = points.iter().map(|&(x, y)| motion(MAIN_NATIVE, x, y)).collect();
        core.connection_mut().batches.push_back(burst);

        prop_assert!(core.wait_event(true));

        let moves = &core.host().hardware;
        prop_assert_eq!(moves.len(), 1);
        prop_assert_eq!(moves[0].kind, MessageKind::MouseMove);
        let (x, y) = points[points.len() - 1];
        prop_assert_eq!((moves[0].x, moves[0].y), (x - 100, y - 50));
    }
}
