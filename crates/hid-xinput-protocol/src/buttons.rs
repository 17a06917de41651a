//! Canonical button bits and per-protocol wire bit tables.
//!
//! Every decoder translates its wire mask through an explicit table of
//! `(wire_bit, canonical_mask)` pairs. The wire layouts of the three
//! XInput-style protocols differ and must never be assumed identical to
//! the canonical layout.

#![deny(static_mut_refs)]

/// Canonical digital button assignment.
pub mod canonical {
    /// D-pad up.
    pub const DPAD_UP: u16 = 0x0001;
    /// D-pad down.
    pub const DPAD_DOWN: u16 = 0x0002;
    /// D-pad left.
    pub const DPAD_LEFT: u16 = 0x0004;
    /// D-pad right.
    pub const DPAD_RIGHT: u16 = 0x0008;
    /// Start / Menu.
    pub const START: u16 = 0x0010;
    /// Back / View.
    pub const BACK: u16 = 0x0020;
    /// Left stick click.
    pub const LEFT_THUMB: u16 = 0x0040;
    /// Right stick click.
    pub const RIGHT_THUMB: u16 = 0x0080;
    /// Left shoulder (LB, or White on an original Xbox pad).
    pub const LEFT_SHOULDER: u16 = 0x0100;
    /// Right shoulder (RB, or Black on an original Xbox pad).
    pub const RIGHT_SHOULDER: u16 = 0x0200;
    /// Guide / power button.
    pub const GUIDE: u16 = 0x0400;
    /// Sync button.
    pub const SYNC: u16 = 0x0800;
    /// A.
    pub const A: u16 = 0x1000;
    /// B.
    pub const B: u16 = 0x2000;
    /// X.
    pub const X: u16 = 0x4000;
    /// Y.
    pub const Y: u16 = 0x8000;

    /// The four d-pad directions.
    pub const DPAD: u16 = DPAD_UP | DPAD_DOWN | DPAD_LEFT | DPAD_RIGHT;
}

use canonical as c;

/// One wire bit and the canonical mask it sets.
pub type BitMapping = (u8, u16);

/// Original Xbox digital byte pair (bits 0..7 only; the rest are analog).
pub const ORIGINAL_XBOX_DIGITAL: [BitMapping; 8] = [
    (0, c::DPAD_UP),
    (1, c::DPAD_DOWN),
    (2, c::DPAD_LEFT),
    (3, c::DPAD_RIGHT),
    (4, c::START),
    (5, c::BACK),
    (6, c::LEFT_THUMB),
    (7, c::RIGHT_THUMB),
];

/// Xbox 360 wired. Bit 10 (guide) is not reported by wired pads.
pub const XBOX360_WIRED: [BitMapping; 14] = [
    (0, c::DPAD_UP),
    (1, c::DPAD_DOWN),
    (2, c::DPAD_LEFT),
    (3, c::DPAD_RIGHT),
    (4, c::START),
    (5, c::BACK),
    (6, c::LEFT_THUMB),
    (7, c::RIGHT_THUMB),
    (8, c::LEFT_SHOULDER),
    (9, c::RIGHT_SHOULDER),
    (12, c::A),
    (13, c::B),
    (14, c::X),
    (15, c::Y),
];

/// Xbox 360 wireless pad event. Same as wired plus the guide button.
pub const XBOX360_WIRELESS: [BitMapping; 15] = [
    (0, c::DPAD_UP),
    (1, c::DPAD_DOWN),
    (2, c::DPAD_LEFT),
    (3, c::DPAD_RIGHT),
    (4, c::START),
    (5, c::BACK),
    (6, c::LEFT_THUMB),
    (7, c::RIGHT_THUMB),
    (8, c::LEFT_SHOULDER),
    (9, c::RIGHT_SHOULDER),
    (10, c::GUIDE),
    (12, c::A),
    (13, c::B),
    (14, c::X),
    (15, c::Y),
];

/// Xbox One (GIP) input report.
pub const XBOX_ONE: [BitMapping; 14] = [
    (8, c::DPAD_UP),
    (9, c::DPAD_DOWN),
    (10, c::DPAD_LEFT),
    (11, c::DPAD_RIGHT),
    (2, c::START),
    (3, c::BACK),
    (14, c::LEFT_THUMB),
    (15, c::RIGHT_THUMB),
    (12, c::LEFT_SHOULDER),
    (13, c::RIGHT_SHOULDER),
    (4, c::A),
    (5, c::B),
    (6, c::X),
    (7, c::Y),
];

/// Translate a wire button mask into canonical bits.
///
/// Wire bits without an entry in `table` are dropped.
pub fn translate(wire: u16, table: &[BitMapping]) -> u16 {
    table
        .iter()
        .filter(|(bit, _)| wire & (1u16 << bit) != 0)
        .fold(0, |acc, (_, mask)| acc | mask)
}
