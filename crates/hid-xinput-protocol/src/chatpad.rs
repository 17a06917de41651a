//! Xbox 360 chatpad key state.
//!
//! A chatpad key-state sub-frame carries three bytes: byte 0 is a modifier
//! bitmask, bytes 1 and 2 hold up to two pressed key codes. Codes below
//! [`MODIFIER_LIMIT`] address the modifier bitmask, every other code is
//! compared against the two key bytes.

#![deny(static_mut_refs)]

/// Key codes strictly below this value are modifier bits.
pub const MODIFIER_LIMIT: u8 = 17;

/// Number of keys a chatpad reports at once.
pub const KEY_STATE_LEN: usize = 3;

/// Modifier bits reported in byte 0 of the key state.
pub mod modifiers {
    /// Shift.
    pub const SHIFT: u8 = 0x01;
    /// Green (Duke mode selector).
    pub const GREEN: u8 = 0x02;
    /// Orange (Steel Battalion mode selector).
    pub const ORANGE: u8 = 0x04;
    /// Messenger.
    pub const MESSENGER: u8 = 0x08;
    /// Caps lock. Only used as an LED bit.
    pub const CAPSLOCK: u8 = 0x20;
}

/// Chatpad key codes.
pub mod keys {
    pub const KEY_1: u8 = 23;
    pub const KEY_2: u8 = 22;
    pub const KEY_3: u8 = 21;
    pub const KEY_4: u8 = 20;
    pub const KEY_5: u8 = 19;
    pub const KEY_6: u8 = 18;
    pub const KEY_7: u8 = 17;
    pub const KEY_8: u8 = 103;
    pub const KEY_9: u8 = 102;
    pub const KEY_0: u8 = 101;

    pub const Q: u8 = 39;
    pub const W: u8 = 38;
    pub const E: u8 = 37;
    pub const R: u8 = 36;
    pub const T: u8 = 35;
    pub const Y: u8 = 34;
    pub const U: u8 = 33;
    pub const I: u8 = 118;
    pub const O: u8 = 117;
    pub const P: u8 = 100;

    pub const A: u8 = 55;
    pub const S: u8 = 54;
    pub const D: u8 = 53;
    pub const F: u8 = 52;
    pub const G: u8 = 51;
    pub const H: u8 = 50;
    pub const J: u8 = 49;
    pub const K: u8 = 119;
    pub const L: u8 = 114;
    pub const COMMA: u8 = 98;

    pub const Z: u8 = 70;
    pub const X: u8 = 69;
    pub const C: u8 = 68;
    pub const V: u8 = 67;
    pub const B: u8 = 66;
    pub const N: u8 = 65;
    pub const M: u8 = 82;
    pub const PERIOD: u8 = 83;
    pub const ENTER: u8 = 99;

    pub const LEFT: u8 = 85;
    pub const SPACE: u8 = 84;
    pub const RIGHT: u8 = 81;
    pub const BACK: u8 = 113;

    /// Number row 1..9 in order.
    pub const DIGITS_1_TO_9: [u8; 9] = [
        KEY_1, KEY_2, KEY_3, KEY_4, KEY_5, KEY_6, KEY_7, KEY_8, KEY_9,
    ];
}

/// One chatpad LED and the control codes that switch it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatpadLed {
    /// Bit in the requested/actual LED mask.
    pub mask: u8,
    /// Control code that switches the LED on.
    pub on_code: u8,
    /// Control code that switches the LED off.
    pub off_code: u8,
}

/// The four chatpad LEDs in reconciliation order.
pub const LEDS: [ChatpadLed; 4] = [
    ChatpadLed {
        mask: modifiers::CAPSLOCK,
        on_code: 0x08,
        off_code: 0x00,
    },
    ChatpadLed {
        mask: modifiers::GREEN,
        on_code: 0x09,
        off_code: 0x01,
    },
    ChatpadLed {
        mask: modifiers::ORANGE,
        on_code: 0x0A,
        off_code: 0x02,
    },
    ChatpadLed {
        mask: modifiers::MESSENGER,
        on_code: 0x0B,
        off_code: 0x03,
    },
];

/// Current chatpad key state plus the latch used for rising-edge detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChatpadState {
    keys: [u8; KEY_STATE_LEN],
    latched: [u8; KEY_STATE_LEN],
}

impl ChatpadState {
    /// Replace the current key state with a freshly decoded one.
    pub fn update(&mut self, keys: [u8; KEY_STATE_LEN]) {
        self.keys = keys;
    }

    /// Raw key state as last reported.
    pub fn keys(&self) -> [u8; KEY_STATE_LEN] {
        self.keys
    }

    /// Level-sensitive test of a key or modifier.
    pub fn is_pressed(&self, code: u8) -> bool {
        let [modifier_bits, first, second] = self.keys;
        if code < MODIFIER_LIMIT {
            modifier_bits & code != 0
        } else {
            first == code || second == code
        }
    }

    /// Rising-edge test of a key or modifier.
    ///
    /// Returns `true` once per press. Up to three keys can be latched at
    /// the same time; a release clears the latch for that code.
    pub fn was_pressed(&mut self, code: u8) -> bool {
        if !self.is_pressed(code) {
            for slot in self.latched.iter_mut().filter(|slot| **slot == code) {
                *slot = 0;
            }
            return false;
        }
        if self.latched.contains(&code) {
            return false;
        }
        match self.latched.iter_mut().find(|slot| **slot == 0) {
            Some(slot) => {
                *slot = code;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifiers_use_bitmask_byte() {
        let mut pad = ChatpadState::default();
        pad.update([modifiers::ORANGE | modifiers::SHIFT, 0, 0]);
        assert!(pad.is_pressed(modifiers::ORANGE));
        assert!(pad.is_pressed(modifiers::SHIFT));
        assert!(!pad.is_pressed(modifiers::GREEN));
    }

    #[test]
    fn keys_match_either_key_byte() {
        let mut pad = ChatpadState::default();
        pad.update([0, keys::Q, keys::ENTER]);
        assert!(pad.is_pressed(keys::Q));
        assert!(pad.is_pressed(keys::ENTER));
        assert!(!pad.is_pressed(keys::W));
    }

    #[test]
    fn key_7_is_not_a_modifier() {
        let mut pad = ChatpadState::default();
        pad.update([0xFF, 0, 0]);
        assert!(!pad.is_pressed(keys::KEY_7));
        pad.update([0, keys::KEY_7, 0]);
        assert!(pad.is_pressed(keys::KEY_7));
    }

    #[test]
    fn was_pressed_fires_once_per_press() {
        let mut pad = ChatpadState::default();
        pad.update([0, keys::A, 0]);
        assert!(pad.was_pressed(keys::A));
        assert!(!pad.was_pressed(keys::A));
        pad.update([0, 0, 0]);
        assert!(!pad.was_pressed(keys::A));
        pad.update([0, keys::A, 0]);
        assert!(pad.was_pressed(keys::A));
    }

    #[test]
    fn latch_holds_three_keys() {
        let mut pad = ChatpadState::default();
        pad.update([modifiers::SHIFT, keys::A, keys::S]);
        assert!(pad.was_pressed(modifiers::SHIFT));
        assert!(pad.was_pressed(keys::A));
        assert!(pad.was_pressed(keys::S));
        pad.update([modifiers::SHIFT | modifiers::GREEN, keys::A, keys::S]);
        assert!(!pad.was_pressed(modifiers::GREEN));
    }

    #[test]
    fn led_codes_pair_on_and_off() {
        for led in LEDS {
            assert_eq!(led.on_code, led.off_code | 0x08);
        }
    }
}
