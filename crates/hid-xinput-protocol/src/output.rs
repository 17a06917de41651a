//! Host-to-pad command encoding.
//!
//! All commands are fixed byte sequences written to the interface's
//! interrupt OUT endpoint, except the HID boot-protocol switch used for
//! keyboards and mice, which is a class control request.
//!
//! # Protocol notes
//!
//! | Command           | Xbox 360 wired           | Xbox 360 wireless              | Xbox One |
//! |-------------------|--------------------------|--------------------------------|----------|
//! | Rumble            | `00 08 00 L R 00 00 00`  | `00 01 0F C0 00 L R 00 ..`     | `09 00 00 09 00 0F 00 00 L R FF 00 EB` |
//! | LED quadrant `q`  | `01 03 q+5`              | `00 00 08 40\|(q+5)`           | n/a      |
//! | Keep-alive        | n/a                      | `00 00 0C 1F` / `00 00 0C 1E`  | n/a      |
//!
//! Original Xbox pads take `00 06 L L R R`.
//!
//! Xbox One motor levels are divided by 2.6 before transmission. The
//! constant is a calibration value observed on real pads.

#![deny(static_mut_refs)]

use crate::chatpad::ChatpadLed;
use crate::ids::{product_ids, vendor_ids};
use crate::types::ProtocolFamily;

/// Largest command this crate emits.
pub const MAX_COMMAND_LEN: usize = 16;

/// Xbox One rumble divisor, scaled by ten (2.6).
const XBOXONE_RUMBLE_DIVISOR_X10: u16 = 26;

/// Fixed-capacity command buffer.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct HostCommand {
    bytes: [u8; MAX_COMMAND_LEN],
    len: usize,
}

impl HostCommand {
    /// Build a command from a byte sequence of at most [`MAX_COMMAND_LEN`] bytes.
    ///
    /// Longer input is truncated.
    pub fn from_slice(data: &[u8]) -> Self {
        let len = data.len().min(MAX_COMMAND_LEN);
        let mut bytes = [0u8; MAX_COMMAND_LEN];
        bytes[..len].copy_from_slice(&data[..len]);
        Self { bytes, len }
    }

    /// The encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl std::fmt::Debug for HostCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("HostCommand").field(&self.as_bytes()).finish()
    }
}

/// One step of a family-specific bring-up sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BringUpStep {
    /// Interrupt OUT transfer.
    Interrupt(HostCommand),
    /// HID `SET_PROTOCOL(boot)` class request to the given interface.
    SetBootProtocol {
        /// Interface number.
        interface: u8,
    },
}

/// Xbox 360 wireless receiver control packets.
pub mod wireless {
    use super::HostCommand;

    /// Ask whether a controller is present on this receiver slot.
    pub fn inquire_present() -> HostCommand {
        HostCommand::from_slice(&[0x08, 0x00, 0x0F, 0xC0])
    }

    /// Request controller information.
    pub fn controller_info() -> HostCommand {
        HostCommand::from_slice(&[0x00, 0x00, 0x00, 0x40])
    }

    /// Undocumented init packet sent once during bring-up.
    pub fn init_unknown() -> HostCommand {
        HostCommand::from_slice(&[0x00, 0x00, 0x02, 0x80])
    }

    /// Enable rumble support.
    pub fn rumble_enable() -> HostCommand {
        HostCommand::from_slice(&[0x00, 0x00, 0x08, 0x01])
    }

    /// Switch the controller off.
    pub fn power_off() -> HostCommand {
        HostCommand::from_slice(&[0x00, 0x00, 0x08, 0xC0])
    }

    /// Initialise an attached chatpad.
    pub fn chatpad_init() -> HostCommand {
        chatpad_control(0x1B)
    }

    /// One of the two alternating chatpad keep-alive payloads.
    pub fn chatpad_keepalive(second: bool) -> HostCommand {
        chatpad_control(if second { 0x1E } else { 0x1F })
    }

    /// Chatpad control packet with an arbitrary control code.
    pub fn chatpad_control(code: u8) -> HostCommand {
        HostCommand::from_slice(&[0x00, 0x00, 0x0C, code])
    }
}

/// Rumble command for `family`, or `None` if the family has no motors.
pub fn rumble_command(family: ProtocolFamily, left: u8, right: u8) -> Option<HostCommand> {
    let command = match family {
        ProtocolFamily::OriginalXbox => {
            HostCommand::from_slice(&[0x00, 0x06, left, left, right, right])
        }
        ProtocolFamily::Xbox360Wired => {
            HostCommand::from_slice(&[0x00, 0x08, 0x00, left, right, 0x00, 0x00, 0x00])
        }
        ProtocolFamily::Xbox360Wireless => HostCommand::from_slice(&[
            0x00, 0x01, 0x0F, 0xC0, 0x00, left, right, 0x00, 0x00, 0x00, 0x00, 0x00,
        ]),
        ProtocolFamily::XboxOne => HostCommand::from_slice(&[
            0x09,
            0x00,
            0x00,
            0x09,
            0x00,
            0x0F,
            0x00,
            0x00,
            xbox_one_motor(left),
            xbox_one_motor(right),
            0xFF,
            0x00,
            0xEB,
        ]),
        _ => return None,
    };
    Some(command)
}

fn xbox_one_motor(level: u8) -> u8 {
    let scaled = u16::from(level) * 10 / XBOXONE_RUMBLE_DIVISOR_X10;
    u8::try_from(scaled).unwrap_or(u8::MAX)
}

/// LED quadrant command (`quadrant` 0 = off, 1..=4 = player ring).
///
/// Only Xbox 360 pads have a player ring.
pub fn led_command(family: ProtocolFamily, quadrant: u8) -> Option<HostCommand> {
    match family {
        ProtocolFamily::Xbox360Wired => Some(HostCommand::from_slice(&[
            0x01,
            0x03,
            if quadrant == 0 {
                0x00
            } else {
                quadrant.saturating_add(5)
            },
        ])),
        ProtocolFamily::Xbox360Wireless => Some(HostCommand::from_slice(&[
            0x00,
            0x00,
            0x08,
            if quadrant == 0 {
                0x40
            } else {
                0x40 | quadrant.saturating_add(5)
            },
        ])),
        _ => None,
    }
}

/// Command switching a single chatpad LED.
pub fn chatpad_led_command(led: ChatpadLed, on: bool) -> HostCommand {
    wireless::chatpad_control(if on { led.on_code } else { led.off_code })
}

/// Family- and vendor-specific bring-up sequence for a freshly allocated slot.
pub fn bring_up_sequence(
    family: ProtocolFamily,
    vendor_id: u16,
    product_id: u16,
    interface: u8,
    slot_index: u8,
) -> Vec<BringUpStep> {
    let interrupt = |data: &[u8]| BringUpStep::Interrupt(HostCommand::from_slice(data));
    match family {
        ProtocolFamily::Xbox360Wired => {
            vec![interrupt(&[0x01, 0x03, slot_index.saturating_add(2)])]
        }
        ProtocolFamily::Xbox360Wireless => vec![
            BringUpStep::Interrupt(wireless::controller_info()),
            BringUpStep::Interrupt(wireless::init_unknown()),
            BringUpStep::Interrupt(wireless::rumble_enable()),
        ],
        ProtocolFamily::XboxOne => {
            let mut steps = vec![interrupt(&[0x05, 0x20, 0x03, 0x01, 0x00])];
            match vendor_id {
                vendor_ids::MICROSOFT
                    if matches!(
                        product_id,
                        product_ids::XBOX_ONE_S | product_ids::XBOX_SERIES
                    ) =>
                {
                    steps.push(interrupt(&[0x05, 0x20, 0x00, 0x0F, 0x06]));
                }
                vendor_ids::PDP => {
                    steps.push(interrupt(&[0x0A, 0x20, 0x00, 0x03, 0x00, 0x01, 0x14]));
                    steps.push(interrupt(&[0x06, 0x30]));
                    steps.push(interrupt(&[0x06, 0x20, 0x00, 0x02, 0x01, 0x00]));
                }
                vendor_ids::POWER_A => {
                    steps.push(interrupt(&[
                        0x09, 0x00, 0x00, 0x09, 0x00, 0x0F, 0x00, 0x00, 0x1D, 0x1D, 0xFF, 0x00,
                        0x00,
                    ]));
                    steps.push(interrupt(&[
                        0x09, 0x00, 0x00, 0x09, 0x00, 0x0F, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                        0x00,
                    ]));
                }
                _ => {}
            }
            steps
        }
        ProtocolFamily::Keyboard | ProtocolFamily::Mouse => {
            vec![BringUpStep::SetBootProtocol { interface }]
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chatpad::LEDS;
    use std::error::Error;

    #[test]
    fn wired_rumble_places_levels() -> Result<(), Box<dyn Error>> {
        let cmd = rumble_command(ProtocolFamily::Xbox360Wired, 0x11, 0x22).ok_or("no cmd")?;
        assert_eq!(cmd.as_bytes(), &[0x00, 0x08, 0x00, 0x11, 0x22, 0x00, 0x00, 0x00]);
        Ok(())
    }

    #[test]
    fn xbox_one_rumble_is_scaled() -> Result<(), Box<dyn Error>> {
        let cmd = rumble_command(ProtocolFamily::XboxOne, 0xFF, 26).ok_or("no cmd")?;
        let bytes = cmd.as_bytes();
        assert_eq!(bytes.len(), 13);
        assert_eq!(bytes[8], 98);
        assert_eq!(bytes[9], 10);
        Ok(())
    }

    #[test]
    fn keyboard_has_no_rumble_or_led() {
        assert_eq!(rumble_command(ProtocolFamily::Keyboard, 1, 1), None);
        assert_eq!(led_command(ProtocolFamily::XboxOne, 1), None);
    }

    #[test]
    fn led_quadrant_zero_is_off() -> Result<(), Box<dyn Error>> {
        let wired = led_command(ProtocolFamily::Xbox360Wired, 0).ok_or("no cmd")?;
        assert_eq!(wired.as_bytes(), &[0x01, 0x03, 0x00]);
        let wireless = led_command(ProtocolFamily::Xbox360Wireless, 2).ok_or("no cmd")?;
        assert_eq!(wireless.as_bytes(), &[0x00, 0x00, 0x08, 0x47]);
        Ok(())
    }

    #[test]
    fn pdp_bring_up_has_three_vendor_packets() {
        let steps = bring_up_sequence(ProtocolFamily::XboxOne, vendor_ids::PDP, 0x02A4, 0, 0);
        assert_eq!(steps.len(), 4);
    }

    #[test]
    fn plain_microsoft_xbox_one_only_starts_input() {
        let steps =
            bring_up_sequence(ProtocolFamily::XboxOne, vendor_ids::MICROSOFT, 0x02D1, 0, 0);
        assert_eq!(
            steps,
            vec![BringUpStep::Interrupt(HostCommand::from_slice(&[
                0x05, 0x20, 0x03, 0x01, 0x00
            ]))]
        );
    }

    #[test]
    fn keyboard_switches_to_boot_protocol() {
        let steps = bring_up_sequence(ProtocolFamily::Keyboard, 0x046D, 0xC31C, 1, 0);
        assert_eq!(steps, vec![BringUpStep::SetBootProtocol { interface: 1 }]);
    }

    #[test]
    fn chatpad_led_commands() {
        let green = LEDS[1];
        assert_eq!(chatpad_led_command(green, true).as_bytes(), &[0, 0, 0x0C, 0x09]);
        assert_eq!(chatpad_led_command(green, false).as_bytes(), &[0, 0, 0x0C, 0x01]);
    }

    #[test]
    fn oversized_command_is_truncated() {
        let cmd = HostCommand::from_slice(&[0xAA; 40]);
        assert_eq!(cmd.as_bytes().len(), MAX_COMMAND_LEN);
    }
}
