//! XID input and feedback report layouts.
//!
//! All multi-byte fields are little-endian. Every report starts with a zero
//! byte followed by its own length.
//!
//! ```text
//! Duke input (20):      00 14 | buttons u16 | A B X Y Black White | LT RT | LX LY RX RY (i16)
//! Duke feedback (6):    00 06 | left u16 | right u16
//! SB input (26):        00 1A | w0 w1 w2 (u16) | aimX aimY (u16) | rotation sightX sightY (i16)
//!                       | left middle right pedal (u16) | tuner i8 | gear i8
//! SB feedback (22):     00 16 | 20 lamp bytes, two 4-bit lamps per byte
//! ```

#![deny(static_mut_refs)]

use serde::Serialize;

use crate::types::XidType;

/// Largest XID report handled by the device.
pub const XID_MAX_REPORT_LEN: usize = 32;
/// Duke input report length.
pub const DUKE_REPORT_LEN: usize = 20;
/// Duke feedback (rumble) report length.
pub const DUKE_FEEDBACK_LEN: usize = 6;
/// Steel Battalion input report length.
pub const STEEL_BATTALION_REPORT_LEN: usize = 26;
/// Steel Battalion feedback (lamp) report length.
pub const STEEL_BATTALION_FEEDBACK_LEN: usize = 22;
/// Number of lamp bytes in a Steel Battalion feedback report.
pub const STEEL_BATTALION_LAMP_BYTES: usize = 20;

/// Duke digital button bits.
pub mod duke {
    /// D-pad up.
    pub const DPAD_UP: u16 = 0x0001;
    /// D-pad down.
    pub const DPAD_DOWN: u16 = 0x0002;
    /// D-pad left.
    pub const DPAD_LEFT: u16 = 0x0004;
    /// D-pad right.
    pub const DPAD_RIGHT: u16 = 0x0008;
    /// Start.
    pub const START: u16 = 0x0010;
    /// Back.
    pub const BACK: u16 = 0x0020;
    /// Left stick click.
    pub const LEFT_THUMB: u16 = 0x0040;
    /// Right stick click.
    pub const RIGHT_THUMB: u16 = 0x0080;
}

/// Steel Battalion button-word bits and fixed values.
pub mod steel_battalion {
    /// Aiming cursor centre.
    pub const AIMING_MID: u16 = 32768;
    /// Largest tuner dial position.
    pub const TUNER_MAX: u8 = 15;

    /// Button word 0.
    pub mod w0 {
        pub const RIGHT_JOY_MAIN_WEAPON: u16 = 0x0001;
        pub const RIGHT_JOY_FIRE: u16 = 0x0002;
        pub const RIGHT_JOY_LOCK_ON: u16 = 0x0004;
        pub const EJECT: u16 = 0x0008;
        pub const COCKPIT_HATCH: u16 = 0x0010;
        pub const IGNITION: u16 = 0x0020;
        pub const START: u16 = 0x0040;
        pub const MULTIMON_OPEN_CLOSE: u16 = 0x0080;
        pub const MULTIMON_MAP_ZOOM_IN_OUT: u16 = 0x0100;
        pub const MULTIMON_MODE_SELECT: u16 = 0x0200;
        pub const MULTIMON_SUB_MONITOR: u16 = 0x0400;
        pub const MAIN_MONITOR_ZOOM_IN: u16 = 0x0800;
        pub const MAIN_MONITOR_ZOOM_OUT: u16 = 0x1000;
        pub const FUNCTION_FSS: u16 = 0x2000;
        pub const FUNCTION_MANIPULATOR: u16 = 0x4000;
        pub const FUNCTION_LINE_COLOR_CHANGE: u16 = 0x8000;
    }

    /// Button word 1.
    pub mod w1 {
        pub const WASHING: u16 = 0x0001;
        pub const EXTINGUISHER: u16 = 0x0002;
        pub const CHAFF: u16 = 0x0004;
        pub const FUNCTION_TANK_DETACH: u16 = 0x0008;
        pub const FUNCTION_OVERRIDE: u16 = 0x0010;
        pub const FUNCTION_NIGHT_SCOPE: u16 = 0x0020;
        pub const FUNCTION_F1: u16 = 0x0040;
        pub const FUNCTION_F2: u16 = 0x0080;
        pub const FUNCTION_F3: u16 = 0x0100;
        pub const WEAPON_CON_MAIN: u16 = 0x0200;
        pub const WEAPON_CON_SUB: u16 = 0x0400;
        pub const WEAPON_CON_MAGAZINE: u16 = 0x0800;
        pub const COMM1: u16 = 0x1000;
        pub const COMM2: u16 = 0x2000;
        pub const COMM3: u16 = 0x4000;
        pub const COMM4: u16 = 0x8000;
    }

    /// Button word 2. Bits from `TOGGLE_FILTER_CONTROL` up are toggle switches.
    pub mod w2 {
        pub const COMM5: u16 = 0x0001;
        pub const LEFT_JOY_SIGHT_CHANGE: u16 = 0x0002;
        pub const TOGGLE_FILTER_CONTROL: u16 = 0x0004;
        pub const TOGGLE_OXYGEN_SUPPLY: u16 = 0x0008;
        pub const TOGGLE_FUEL_FLOW_RATE: u16 = 0x0010;
        pub const TOGGLE_BUFFER_MATERIAL: u16 = 0x0020;
        pub const TOGGLE_VT_LOCATION: u16 = 0x0040;
        /// Every toggle-switch bit.
        pub const TOGGLE_MASK: u16 = 0xFFFC;
    }

    /// Byte index of each lamp pair in the feedback report body.
    ///
    /// The high nibble is the first-named lamp, the low nibble the second.
    pub mod lamps {
        pub const COCKPIT_HATCH_EMERGENCY_EJECT: usize = 0;
        pub const START_IGNITION: usize = 1;
        pub const MAP_ZOOM_IN_OUT_OPEN_CLOSE: usize = 2;
        pub const SUB_MONITOR_MODE_SELECT_MODE_SELECT: usize = 3;
        pub const MAIN_MONITOR_ZOOM_OUT_ZOOM_IN: usize = 4;
        pub const MANIPULATOR_FSS: usize = 5;
        pub const WASHING_LINE_COLOR_CHANGE: usize = 6;
        pub const CHAFF_EXTINGUISHER: usize = 7;
        pub const OVERRIDE_TANK_DETACH: usize = 8;
        pub const F1_NIGHT_SCOPE: usize = 9;
        pub const F3_F2: usize = 10;
        pub const SUB_WEAPON_MAIN_WEAPON: usize = 11;
        pub const COMM1_MAGAZINE_CHANGE: usize = 12;
        pub const COMM3_COMM2: usize = 13;
        pub const COMM5_COMM4: usize = 14;
        pub const GEAR_R: usize = 15;
        pub const GEAR1_GEAR_N: usize = 16;
        pub const GEAR3_GEAR2: usize = 17;
        pub const GEAR5_GEAR4: usize = 18;
    }
}

fn put_u16(out: &mut [u8], offset: usize, value: u16) {
    out[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_i16(out: &mut [u8], offset: usize, value: i16) {
    out[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn get_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn get_i16(data: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes([data[offset], data[offset + 1]])
}

fn header_matches(data: &[u8], len: usize) -> bool {
    data.len() >= len && data[0] == 0 && usize::from(data[1]) == len
}

/// Standard controller input report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DukeReport {
    /// Digital buttons, see [`duke`].
    pub buttons: u16,
    /// Analog A.
    pub a: u8,
    /// Analog B.
    pub b: u8,
    /// Analog X.
    pub x: u8,
    /// Analog Y.
    pub y: u8,
    /// Analog Black.
    pub black: u8,
    /// Analog White.
    pub white: u8,
    /// Left trigger.
    pub left_trigger: u8,
    /// Right trigger.
    pub right_trigger: u8,
    /// Left stick X.
    pub left_stick_x: i16,
    /// Left stick Y.
    pub left_stick_y: i16,
    /// Right stick X.
    pub right_stick_x: i16,
    /// Right stick Y.
    pub right_stick_y: i16,
}

impl DukeReport {
    /// Encode to wire bytes.
    pub fn to_bytes(&self) -> [u8; DUKE_REPORT_LEN] {
        let mut out = [0u8; DUKE_REPORT_LEN];
        out[1] = DUKE_REPORT_LEN as u8;
        put_u16(&mut out, 2, self.buttons);
        out[4..12].copy_from_slice(&[
            self.a,
            self.b,
            self.x,
            self.y,
            self.black,
            self.white,
            self.left_trigger,
            self.right_trigger,
        ]);
        put_i16(&mut out, 12, self.left_stick_x);
        put_i16(&mut out, 14, self.left_stick_y);
        put_i16(&mut out, 16, self.right_stick_x);
        put_i16(&mut out, 18, self.right_stick_y);
        out
    }

    /// Decode from wire bytes.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if !header_matches(data, DUKE_REPORT_LEN) {
            return None;
        }
        Some(Self {
            buttons: get_u16(data, 2),
            a: data[4],
            b: data[5],
            x: data[6],
            y: data[7],
            black: data[8],
            white: data[9],
            left_trigger: data[10],
            right_trigger: data[11],
            left_stick_x: get_i16(data, 12),
            left_stick_y: get_i16(data, 14),
            right_stick_x: get_i16(data, 16),
            right_stick_y: get_i16(data, 18),
        })
    }
}

/// Standard controller rumble report sent by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DukeFeedback {
    /// Left (low-frequency) motor.
    pub left_motor: u16,
    /// Right (high-frequency) motor.
    pub right_motor: u16,
}

impl DukeFeedback {
    /// Encode to wire bytes.
    pub fn to_bytes(&self) -> [u8; DUKE_FEEDBACK_LEN] {
        let mut out = [0u8; DUKE_FEEDBACK_LEN];
        out[1] = DUKE_FEEDBACK_LEN as u8;
        put_u16(&mut out, 2, self.left_motor);
        put_u16(&mut out, 4, self.right_motor);
        out
    }

    /// Decode from wire bytes. All-zero bytes decode as "motors off".
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < DUKE_FEEDBACK_LEN {
            return None;
        }
        Some(Self {
            left_motor: get_u16(data, 2),
            right_motor: get_u16(data, 4),
        })
    }
}

/// Steel Battalion gear lever position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[repr(i8)]
pub enum GearLever {
    /// Reverse.
    Reverse = 7,
    /// Neutral.
    #[default]
    Neutral = 8,
    /// First gear.
    First = 9,
    /// Second gear.
    Second = 10,
    /// Third gear.
    Third = 11,
    /// Fourth gear.
    Fourth = 12,
    /// Fifth gear.
    Fifth = 13,
}

impl GearLever {
    const ORDER: [Self; 7] = [
        Self::Reverse,
        Self::Neutral,
        Self::First,
        Self::Second,
        Self::Third,
        Self::Fourth,
        Self::Fifth,
    ];

    /// Decode a raw gear code.
    pub fn from_code(code: i8) -> Option<Self> {
        Self::ORDER.into_iter().find(|gear| gear.code() == code)
    }

    /// Raw gear code as sent on the wire.
    pub fn code(self) -> i8 {
        self as i8
    }

    /// One gear up, saturating at fifth.
    #[must_use]
    pub fn shift_up(self) -> Self {
        Self::from_code(self.code().saturating_add(1)).unwrap_or(Self::Fifth)
    }

    /// One gear down, saturating at reverse.
    #[must_use]
    pub fn shift_down(self) -> Self {
        Self::from_code(self.code().saturating_sub(1)).unwrap_or(Self::Reverse)
    }
}

/// Steel Battalion cockpit input report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SteelBattalionReport {
    /// Three button words, see [`steel_battalion`].
    pub buttons: [u16; 3],
    /// Absolute aiming cursor X.
    pub aiming_x: u16,
    /// Absolute aiming cursor Y.
    pub aiming_y: u16,
    /// Rotation lever.
    pub rotation_lever: i16,
    /// Sight change stick X.
    pub sight_change_x: i16,
    /// Sight change stick Y.
    pub sight_change_y: i16,
    /// Left (slide step) pedal.
    pub left_pedal: u16,
    /// Middle (brake) pedal.
    pub middle_pedal: u16,
    /// Right (accelerator) pedal.
    pub right_pedal: u16,
    /// Tuner dial position, 0..=15.
    pub tuner_dial: u8,
    /// Gear lever.
    pub gear_lever: GearLever,
}

impl SteelBattalionReport {
    /// Encode to wire bytes.
    pub fn to_bytes(&self) -> [u8; STEEL_BATTALION_REPORT_LEN] {
        let mut out = [0u8; STEEL_BATTALION_REPORT_LEN];
        out[1] = STEEL_BATTALION_REPORT_LEN as u8;
        for (i, word) in self.buttons.iter().enumerate() {
            put_u16(&mut out, 2 + i * 2, *word);
        }
        put_u16(&mut out, 8, self.aiming_x);
        put_u16(&mut out, 10, self.aiming_y);
        put_i16(&mut out, 12, self.rotation_lever);
        put_i16(&mut out, 14, self.sight_change_x);
        put_i16(&mut out, 16, self.sight_change_y);
        put_u16(&mut out, 18, self.left_pedal);
        put_u16(&mut out, 20, self.middle_pedal);
        put_u16(&mut out, 22, self.right_pedal);
        out[24] = self.tuner_dial.min(steel_battalion::TUNER_MAX);
        out[25] = self.gear_lever.code().to_le_bytes()[0];
        out
    }

    /// Decode from wire bytes.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if !header_matches(data, STEEL_BATTALION_REPORT_LEN) {
            return None;
        }
        Some(Self {
            buttons: [get_u16(data, 2), get_u16(data, 4), get_u16(data, 6)],
            aiming_x: get_u16(data, 8),
            aiming_y: get_u16(data, 10),
            rotation_lever: get_i16(data, 12),
            sight_change_x: get_i16(data, 14),
            sight_change_y: get_i16(data, 16),
            left_pedal: get_u16(data, 18),
            middle_pedal: get_u16(data, 20),
            right_pedal: get_u16(data, 22),
            tuner_dial: data[24],
            gear_lever: GearLever::from_code(i8::from_le_bytes([data[25]]))?,
        })
    }
}

/// Steel Battalion lamp report sent by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SteelBattalionFeedback {
    /// Lamp bytes, indexed by [`steel_battalion::lamps`].
    pub lamps: [u8; STEEL_BATTALION_LAMP_BYTES],
}

impl SteelBattalionFeedback {
    /// Encode to wire bytes.
    pub fn to_bytes(&self) -> [u8; STEEL_BATTALION_FEEDBACK_LEN] {
        let mut out = [0u8; STEEL_BATTALION_FEEDBACK_LEN];
        out[1] = STEEL_BATTALION_FEEDBACK_LEN as u8;
        out[2..].copy_from_slice(&self.lamps);
        out
    }

    /// Decode from wire bytes. All-zero bytes decode as "all lamps off".
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        let body = data.get(2..STEEL_BATTALION_FEEDBACK_LEN)?;
        let mut lamps = [0u8; STEEL_BATTALION_LAMP_BYTES];
        lamps.copy_from_slice(body);
        Some(Self { lamps })
    }

    /// Raw lamp byte (two lamps).
    pub fn lamp_pair(&self, index: usize) -> u8 {
        self.lamps.get(index).copied().unwrap_or(0)
    }

    /// Brightness of the first-named lamp of a pair.
    pub fn high(&self, index: usize) -> u8 {
        self.lamp_pair(index) >> 4
    }

    /// Brightness of the second-named lamp of a pair.
    pub fn low(&self, index: usize) -> u8 {
        self.lamp_pair(index) & 0x0F
    }
}

/// Input report of either device type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum InputReport {
    /// Standard controller.
    Duke(DukeReport),
    /// Steel Battalion controller.
    SteelBattalion(SteelBattalionReport),
}

impl InputReport {
    /// Device type this report belongs to.
    pub fn xid_type(&self) -> XidType {
        match self {
            Self::Duke(_) => XidType::Duke,
            Self::SteelBattalion(_) => XidType::SteelBattalion,
        }
    }

    /// Encode into `out`, returning the number of bytes written.
    pub fn encode(&self, out: &mut [u8; XID_MAX_REPORT_LEN]) -> usize {
        match self {
            Self::Duke(report) => {
                out[..DUKE_REPORT_LEN].copy_from_slice(&report.to_bytes());
                DUKE_REPORT_LEN
            }
            Self::SteelBattalion(report) => {
                out[..STEEL_BATTALION_REPORT_LEN].copy_from_slice(&report.to_bytes());
                STEEL_BATTALION_REPORT_LEN
            }
        }
    }

    /// Encode into a freshly allocated buffer.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = [0u8; XID_MAX_REPORT_LEN];
        let len = self.encode(&mut out);
        out[..len].to_vec()
    }
}

/// Feedback report of either device type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FeedbackReport {
    /// Standard controller rumble.
    Duke(DukeFeedback),
    /// Steel Battalion lamps.
    SteelBattalion(SteelBattalionFeedback),
}

impl FeedbackReport {
    /// Decode raw feedback bytes for a device type.
    pub fn parse(xid_type: XidType, data: &[u8]) -> Option<Self> {
        match xid_type {
            XidType::Duke => DukeFeedback::from_bytes(data).map(Self::Duke),
            XidType::SteelBattalion => {
                SteelBattalionFeedback::from_bytes(data).map(Self::SteelBattalion)
            }
            XidType::Disconnected => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn duke_report_layout() -> Result<(), Box<dyn Error>> {
        let report = DukeReport {
            buttons: duke::START,
            a: 0xFF,
            white: 0xFF,
            right_trigger: 0x80,
            left_stick_x: -1,
            right_stick_y: 0x1234,
            ..DukeReport::default()
        };
        let bytes = report.to_bytes();
        assert_eq!(&bytes[..6], &[0x00, 0x14, 0x10, 0x00, 0xFF, 0x00]);
        assert_eq!(bytes[9], 0xFF);
        assert_eq!(bytes[11], 0x80);
        assert_eq!(&bytes[12..14], &[0xFF, 0xFF]);
        assert_eq!(&bytes[18..20], &[0x34, 0x12]);
        assert_eq!(DukeReport::from_bytes(&bytes).ok_or("decode failed")?, report);
        Ok(())
    }

    #[test]
    fn steel_battalion_report_layout() -> Result<(), Box<dyn Error>> {
        let report = SteelBattalionReport {
            buttons: [steel_battalion::w0::START, 0, steel_battalion::w2::TOGGLE_VT_LOCATION],
            aiming_x: steel_battalion::AIMING_MID,
            tuner_dial: 3,
            gear_lever: GearLever::Reverse,
            ..SteelBattalionReport::default()
        };
        let bytes = report.to_bytes();
        assert_eq!(bytes.len(), 26);
        assert_eq!(&bytes[..4], &[0x00, 0x1A, 0x40, 0x00]);
        assert_eq!(&bytes[6..10], &[0x40, 0x00, 0x00, 0x80]);
        assert_eq!(bytes[24], 3);
        assert_eq!(bytes[25], 7);
        assert_eq!(
            SteelBattalionReport::from_bytes(&bytes).ok_or("decode failed")?,
            report
        );
        Ok(())
    }

    #[test]
    fn gear_lever_saturates() {
        assert_eq!(GearLever::Fifth.shift_up(), GearLever::Fifth);
        assert_eq!(GearLever::Reverse.shift_down(), GearLever::Reverse);
        assert_eq!(GearLever::Neutral.shift_up(), GearLever::First);
        assert_eq!(GearLever::Neutral.shift_down(), GearLever::Reverse);
        assert_eq!(GearLever::from_code(6), None);
    }

    #[test]
    fn lamp_nibbles() {
        let mut feedback = SteelBattalionFeedback::default();
        feedback.lamps[steel_battalion::lamps::CHAFF_EXTINGUISHER] = 0xA5;
        assert_eq!(feedback.high(steel_battalion::lamps::CHAFF_EXTINGUISHER), 0x0A);
        assert_eq!(feedback.low(steel_battalion::lamps::CHAFF_EXTINGUISHER), 0x05);
        assert_eq!(feedback.lamp_pair(99), 0);
    }

    #[test]
    fn feedback_parse_by_type() -> Result<(), Box<dyn Error>> {
        let duke = FeedbackReport::parse(XidType::Duke, &[0, 6, 0x00, 0x80, 0xFF, 0xFF])
            .ok_or("parse failed")?;
        assert_eq!(
            duke,
            FeedbackReport::Duke(DukeFeedback {
                left_motor: 0x8000,
                right_motor: 0xFFFF
            })
        );
        assert_eq!(FeedbackReport::parse(XidType::SteelBattalion, &[0; 10]), None);
        assert_eq!(FeedbackReport::parse(XidType::Disconnected, &[0; 22]), None);
        Ok(())
    }

    #[test]
    fn header_mismatch_rejected() {
        let mut bytes = DukeReport::default().to_bytes();
        bytes[1] = 0x13;
        assert_eq!(DukeReport::from_bytes(&bytes), None);
    }
}
