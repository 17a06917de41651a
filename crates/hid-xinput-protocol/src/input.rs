//! Raw interrupt report decoding.
//!
//! [`decode_report`] is pure: it looks only at the bytes and the protocol
//! family of the endpoint they arrived on. A `None` result means the frame
//! was malformed or not recognized, and the caller must leave every piece of
//! prior state untouched. A recognized pad frame always carries a complete
//! [`PadState`]; partial merges never happen.
//!
//! # Frame layouts
//!
//! | Family            | Shape check                    | Buttons | Triggers | Sticks  |
//! |-------------------|--------------------------------|---------|----------|---------|
//! | Original Xbox     | `data[1] == 0x14`, len >= 20   | 2..3 + pressure 4..9 | 10, 11 | 12..19 |
//! | Xbox 360 wired    | `data[0..2] == 00 14`, len >= 14 | 2..3 | 4, 5     | 6..13   |
//! | Xbox 360 wireless | `data[1] & 1`, `data[5] == 0x13` | 6..7 | 8, 9     | 10..17  |
//! | Xbox One          | `data[0] == 0x20`, len >= 18   | 4..5    | 6..9 (10-bit) | 10..17 |

#![deny(static_mut_refs)]

use crate::buttons::{self, canonical};
use crate::chatpad::KEY_STATE_LEN;
use crate::ids::{lengths, markers};
use crate::types::ProtocolFamily;

/// Threshold above which an original Xbox pressure button counts as pressed.
pub const OG_PRESSURE_THRESHOLD: u8 = 0x20;

/// Canonical, protocol-independent pad state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PadState {
    /// Digital buttons, see [`canonical`].
    pub buttons: u16,
    /// Left trigger, 0..=255.
    pub left_trigger: u8,
    /// Right trigger, 0..=255.
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

impl PadState {
    /// Level test of one or more canonical buttons (any bit set).
    pub fn is_pressed(&self, mask: u16) -> bool {
        self.buttons & mask != 0
    }
}

/// Presence change announced by a wireless receiver slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// A controller connected to this receiver slot.
    Connected,
    /// The controller left this receiver slot.
    Disconnected,
}

/// Chatpad sub-frame carried by a wireless report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatpadEvent {
    /// Raw 3-byte key state.
    Keys([u8; KEY_STATE_LEN]),
    /// The chatpad lost its configuration and must be initialised again.
    ReinitRequired,
    /// Chatpad LED state as currently shown.
    LedEcho(u8),
}

/// Everything one wireless receiver report can announce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WirelessFrame {
    /// Controller connect/disconnect.
    pub presence: Option<Presence>,
    /// Chatpad needs re-initialisation (flag byte value).
    pub chatpad_reinit: bool,
    /// Pad event sub-frame.
    pub pad: Option<PadState>,
    /// Chatpad sub-frame.
    pub chatpad: Option<ChatpadEvent>,
}

/// A recognized report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFrame {
    /// A complete pad state replacement.
    Pad(PadState),
    /// Xbox 360 wired LED echo: quadrant actually shown.
    LedEcho(u8),
    /// Xbox 360 wired rumble echo: motor levels as reported by the pad.
    RumbleEcho {
        /// Left (low-frequency) motor.
        left: u8,
        /// Right (high-frequency) motor.
        right: u8,
    },
    /// Wireless receiver report.
    Wireless(WirelessFrame),
    /// Recognized interface that never produces pad state.
    Inert,
}

/// Decode one raw report received on an interface of `family`.
///
/// Returns `None` for malformed or unrecognized frames.
pub fn decode_report(family: ProtocolFamily, data: &[u8]) -> Option<InputFrame> {
    let data = data.get(..data.len().min(lengths::MAX_REPORT))?;
    match family {
        ProtocolFamily::OriginalXbox => decode_original_xbox(data).map(InputFrame::Pad),
        ProtocolFamily::Xbox360Wired => decode_xbox360_wired(data),
        ProtocolFamily::Xbox360Wireless => {
            decode_xbox360_wireless(data).map(InputFrame::Wireless)
        }
        ProtocolFamily::XboxOne => decode_xbox_one(data).map(InputFrame::Pad),
        ProtocolFamily::Keyboard | ProtocolFamily::Mouse => Some(InputFrame::Inert),
        ProtocolFamily::IdleInterface | ProtocolFamily::Unknown => None,
    }
}

fn le_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn le_i16(data: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes([data[offset], data[offset + 1]])
}

fn sticks(pad: &mut PadState, data: &[u8], offset: usize) {
    pad.left_stick_x = le_i16(data, offset);
    pad.left_stick_y = le_i16(data, offset + 2);
    pad.right_stick_x = le_i16(data, offset + 4);
    pad.right_stick_y = le_i16(data, offset + 6);
}

/// Original Xbox (Duke / Controller S) input report.
pub fn decode_original_xbox(data: &[u8]) -> Option<PadState> {
    if data.len() < lengths::OG_INPUT || data[1] != markers::OG_REPORT_LENGTH {
        return None;
    }
    let mut pad = PadState {
        buttons: buttons::translate(le_u16(data, 2), &buttons::ORIGINAL_XBOX_DIGITAL),
        left_trigger: data[10],
        right_trigger: data[11],
        ..PadState::default()
    };
    let pressure = [
        (data[4], canonical::A),
        (data[5], canonical::B),
        (data[6], canonical::X),
        (data[7], canonical::Y),
        (data[8], canonical::RIGHT_SHOULDER),
        (data[9], canonical::LEFT_SHOULDER),
    ];
    for (value, mask) in pressure {
        if value > OG_PRESSURE_THRESHOLD {
            pad.buttons |= mask;
        }
    }
    sticks(&mut pad, data, 12);
    Some(pad)
}

/// Xbox 360 wired input report or one of its two feedback echoes.
pub fn decode_xbox360_wired(data: &[u8]) -> Option<InputFrame> {
    match data.first()? {
        &markers::X360_WIRED_LED_ECHO => {
            if data.len() < lengths::X360_WIRED_LED_ECHO {
                return None;
            }
            let raw = data[2] & 0x0F;
            let quadrant = match raw {
                0 => 0,
                6.. => raw - 5,
                _ => raw - 1,
            };
            Some(InputFrame::LedEcho(quadrant))
        }
        &markers::X360_WIRED_RUMBLE_ECHO => {
            if data.len() < lengths::X360_WIRED_RUMBLE_ECHO {
                return None;
            }
            Some(InputFrame::RumbleEcho {
                left: data[3],
                right: data[4],
            })
        }
        &markers::X360_WIRED_INPUT => {
            if data.len() < lengths::X360_WIRED_INPUT
                || data[1] != markers::X360_WIRED_INPUT_LENGTH
            {
                return None;
            }
            let mut pad = PadState {
                buttons: buttons::translate(le_u16(data, 2), &buttons::XBOX360_WIRED),
                left_trigger: data[4],
                right_trigger: data[5],
                ..PadState::default()
            };
            sticks(&mut pad, data, 6);
            Some(InputFrame::Pad(pad))
        }
        _ => None,
    }
}

/// Xbox 360 wireless receiver report.
///
/// A single report can carry several sub-frames. A flagged sub-frame that
/// is too short rejects the whole report.
pub fn decode_xbox360_wireless(data: &[u8]) -> Option<WirelessFrame> {
    if data.len() < lengths::X360W_HEADER {
        return None;
    }
    let (status, flags) = (data[0], data[1]);
    let mut frame = WirelessFrame::default();

    if status & markers::X360W_PRESENCE_FLAG != 0 {
        frame.presence = Some(if flags != 0 {
            Presence::Connected
        } else {
            Presence::Disconnected
        });
    }

    frame.chatpad_reinit = flags == markers::X360W_CHATPAD_REINIT;

    if flags & markers::X360W_PAD_EVENT_FLAG != 0
        && data.get(5) == Some(&markers::X360W_PAD_EVENT)
    {
        if data.len() < lengths::X360W_PAD_EVENT {
            return None;
        }
        let mut pad = PadState {
            buttons: buttons::translate(le_u16(data, 6), &buttons::XBOX360_WIRELESS),
            left_trigger: data[8],
            right_trigger: data[9],
            ..PadState::default()
        };
        sticks(&mut pad, data, 10);
        frame.pad = Some(pad);
    }

    if flags & markers::X360W_CHATPAD_EVENT_FLAG != 0 {
        frame.chatpad = match data.get(24) {
            Some(&markers::X360W_CHATPAD_KEYS) => {
                if data.len() < lengths::X360W_CHATPAD_KEYS {
                    return None;
                }
                Some(ChatpadEvent::Keys([data[25], data[26], data[27]]))
            }
            Some(&markers::X360W_CHATPAD_STATUS) => {
                if data.len() < lengths::X360W_CHATPAD_STATUS {
                    return None;
                }
                match data[25] {
                    markers::X360W_CHATPAD_STATUS_REINIT => Some(ChatpadEvent::ReinitRequired),
                    markers::X360W_CHATPAD_STATUS_LED if data[26] & 0x80 != 0 => {
                        Some(ChatpadEvent::LedEcho(data[26] & 0x7F))
                    }
                    _ => None,
                }
            }
            _ => None,
        };
    }

    Some(frame)
}

/// Xbox One (GIP) input report.
pub fn decode_xbox_one(data: &[u8]) -> Option<PadState> {
    if data.len() < lengths::XBOXONE_INPUT || data[0] != markers::XBOXONE_INPUT {
        return None;
    }
    let mut pad = PadState {
        buttons: buttons::translate(le_u16(data, 4), &buttons::XBOX_ONE),
        left_trigger: ten_bit_trigger(le_u16(data, 6)),
        right_trigger: ten_bit_trigger(le_u16(data, 8)),
        ..PadState::default()
    };
    sticks(&mut pad, data, 10);
    Some(pad)
}

fn ten_bit_trigger(raw: u16) -> u8 {
    u8::try_from((raw & 0x03FF) >> 2).unwrap_or(u8::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn wired_frame(buttons: u16) -> Vec<u8> {
        let [lo, hi] = buttons.to_le_bytes();
        vec![
            0x00, 0x14, lo, hi, 0x00, 0x00, 0x00, 0x80, 0x00, 0x80, 0x00, 0x80, 0x00, 0x80,
        ]
    }

    #[test]
    fn wired_start_frame_decodes() -> Result<(), Box<dyn Error>> {
        let frame = decode_report(ProtocolFamily::Xbox360Wired, &wired_frame(0x0010))
            .ok_or("decode failed")?;
        let InputFrame::Pad(pad) = frame else {
            return Err("expected pad frame".into());
        };
        assert_eq!(pad.buttons, canonical::START);
        assert_eq!(pad.left_trigger, 0);
        assert_eq!(pad.right_trigger, 0);
        assert_eq!(pad.left_stick_x, i16::MIN);
        assert_eq!(pad.left_stick_y, i16::MIN);
        assert_eq!(pad.right_stick_x, i16::MIN);
        assert_eq!(pad.right_stick_y, i16::MIN);
        Ok(())
    }

    #[test]
    fn wired_rejects_bad_marker_and_short_frames() {
        let mut bad = wired_frame(0);
        bad[1] = 0x13;
        assert_eq!(decode_report(ProtocolFamily::Xbox360Wired, &bad), None);
        let short = &wired_frame(0)[..13];
        assert_eq!(decode_report(ProtocolFamily::Xbox360Wired, short), None);
        assert_eq!(decode_report(ProtocolFamily::Xbox360Wired, &[]), None);
    }

    #[test]
    fn wired_led_echo_quadrant() {
        let cases = [(0x00, 0), (0x02, 1), (0x06, 1), (0x09, 4), (0x45, 4)];
        for (raw, quadrant) in cases {
            assert_eq!(
                decode_report(ProtocolFamily::Xbox360Wired, &[0x01, 0x03, raw]),
                Some(InputFrame::LedEcho(quadrant)),
                "raw {raw:#04x}"
            );
        }
    }

    #[test]
    fn wired_rumble_echo() {
        assert_eq!(
            decode_report(ProtocolFamily::Xbox360Wired, &[0x03, 0x03, 0x00, 0x40, 0x80]),
            Some(InputFrame::RumbleEcho {
                left: 0x40,
                right: 0x80
            })
        );
    }

    #[test]
    fn original_xbox_pressure_threshold() -> Result<(), Box<dyn Error>> {
        let mut data = [0u8; 20];
        data[1] = 0x14;
        data[2] = 0x01;
        data[4] = 0x21;
        data[5] = 0x20;
        data[8] = 0xFF;
        data[9] = 0xFF;
        data[10] = 0x7F;
        data[12..14].copy_from_slice(&1234i16.to_le_bytes());
        let pad = decode_original_xbox(&data).ok_or("decode failed")?;
        assert_eq!(
            pad.buttons,
            canonical::DPAD_UP
                | canonical::A
                | canonical::RIGHT_SHOULDER
                | canonical::LEFT_SHOULDER
        );
        assert_eq!(pad.left_trigger, 0x7F);
        assert_eq!(pad.left_stick_x, 1234);
        Ok(())
    }

    #[test]
    fn xbox_one_triggers_are_scaled() -> Result<(), Box<dyn Error>> {
        let mut data = [0u8; 18];
        data[0] = 0x20;
        data[4] = 0x10;
        data[6..8].copy_from_slice(&1023u16.to_le_bytes());
        data[8..10].copy_from_slice(&512u16.to_le_bytes());
        data[16..18].copy_from_slice(&(-5i16).to_le_bytes());
        let pad = decode_xbox_one(&data).ok_or("decode failed")?;
        assert_eq!(pad.buttons, canonical::A);
        assert_eq!(pad.left_trigger, 255);
        assert_eq!(pad.right_trigger, 128);
        assert_eq!(pad.right_stick_y, -5);
        Ok(())
    }

    #[test]
    fn wireless_connect_and_disconnect() -> Result<(), Box<dyn Error>> {
        let connect = decode_xbox360_wireless(&[0x08, 0x80]).ok_or("decode failed")?;
        assert_eq!(connect.presence, Some(Presence::Connected));
        assert_eq!(connect.pad, None);
        let gone = decode_xbox360_wireless(&[0x08, 0x00]).ok_or("decode failed")?;
        assert_eq!(gone.presence, Some(Presence::Disconnected));
        Ok(())
    }

    #[test]
    fn wireless_pad_event_includes_guide() -> Result<(), Box<dyn Error>> {
        let mut data = [0u8; 29];
        data[1] = 0x01;
        data[5] = 0x13;
        data[6..8].copy_from_slice(&0x0410u16.to_le_bytes());
        data[9] = 0xFF;
        let frame = decode_xbox360_wireless(&data).ok_or("decode failed")?;
        let pad = frame.pad.ok_or("missing pad")?;
        assert_eq!(pad.buttons, canonical::GUIDE | canonical::START);
        assert_eq!(pad.right_trigger, 0xFF);
        assert_eq!(frame.presence, None);
        Ok(())
    }

    #[test]
    fn wireless_truncated_pad_event_is_rejected() {
        let mut data = [0u8; 12];
        data[1] = 0x01;
        data[5] = 0x13;
        assert_eq!(decode_xbox360_wireless(&data), None);
    }

    #[test]
    fn wireless_chatpad_sub_frames() -> Result<(), Box<dyn Error>> {
        let mut data = [0u8; 29];
        data[1] = 0x02;
        data[25] = 0x04;
        data[26] = 39;
        let keys = decode_xbox360_wireless(&data).ok_or("decode failed")?;
        assert_eq!(keys.chatpad, Some(ChatpadEvent::Keys([0x04, 39, 0])));

        data[24] = 0xF0;
        data[25] = 0x03;
        let reinit = decode_xbox360_wireless(&data).ok_or("decode failed")?;
        assert_eq!(reinit.chatpad, Some(ChatpadEvent::ReinitRequired));

        data[25] = 0x04;
        data[26] = 0x82;
        let led = decode_xbox360_wireless(&data).ok_or("decode failed")?;
        assert_eq!(led.chatpad, Some(ChatpadEvent::LedEcho(0x02)));
        Ok(())
    }

    #[test]
    fn wireless_chatpad_reinit_flag_byte() -> Result<(), Box<dyn Error>> {
        let frame = decode_xbox360_wireless(&[0x00, 0xF8]).ok_or("decode failed")?;
        assert!(frame.chatpad_reinit);
        Ok(())
    }

    #[test]
    fn keyboard_and_mouse_are_inert() {
        assert_eq!(
            decode_report(ProtocolFamily::Keyboard, &[1, 2, 3]),
            Some(InputFrame::Inert)
        );
        assert_eq!(decode_report(ProtocolFamily::Mouse, &[]), Some(InputFrame::Inert));
        assert_eq!(decode_report(ProtocolFamily::IdleInterface, &[1, 2]), None);
        assert_eq!(decode_report(ProtocolFamily::Unknown, &[0x00, 0x14]), None);
    }
}
