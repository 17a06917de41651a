//! Protocol family classification.

#![deny(static_mut_refs)]

use crate::ids::{interface, vendor_ids};

/// Wire protocol spoken by an attached interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProtocolFamily {
    /// Original Xbox controller (XID class).
    OriginalXbox,
    /// Xbox 360 wired controller.
    Xbox360Wired,
    /// One controller slot of an Xbox 360 wireless receiver.
    Xbox360Wireless,
    /// Xbox One / Series controller (GIP).
    XboxOne,
    /// HID boot keyboard. Recognized, produces no pad state.
    Keyboard,
    /// HID boot mouse. Recognized, produces no pad state.
    Mouse,
    /// Idle HID interface exposed by some adapters. Recognized, inert.
    IdleInterface,
    /// Anything else.
    #[default]
    Unknown,
}

impl ProtocolFamily {
    /// Classify an interface from its descriptor triple.
    ///
    /// `num_endpoints == 0` always yields [`ProtocolFamily::Unknown`].
    /// Xbox One pads expose several GIP interfaces; only the first
    /// (`interface_number == 0`) carries input.
    pub fn classify(
        class: u8,
        subclass: u8,
        protocol: u8,
        num_endpoints: u8,
        interface_number: u8,
        vendor_id: u16,
    ) -> Self {
        if num_endpoints == 0 {
            return Self::Unknown;
        }
        match (class, subclass, protocol) {
            (_, interface::XBOX360_SUBCLASS, interface::XBOX360_WIRELESS_PROTOCOL) => {
                Self::Xbox360Wireless
            }
            (_, interface::XBOX360_SUBCLASS, interface::XBOX360_WIRED_PROTOCOL) => {
                Self::Xbox360Wired
            }
            (_, interface::XBOXONE_SUBCLASS, interface::XBOXONE_PROTOCOL)
                if interface_number == 0 =>
            {
                Self::XboxOne
            }
            (interface::XID_CLASS, interface::XID_SUBCLASS, _) => Self::OriginalXbox,
            (
                interface::HID_CLASS,
                interface::HID_BOOT_SUBCLASS,
                interface::HID_KEYBOARD_PROTOCOL,
            ) => Self::Keyboard,
            (interface::HID_CLASS, interface::HID_BOOT_SUBCLASS, interface::HID_MOUSE_PROTOCOL) => {
                Self::Mouse
            }
            (interface::HID_CLASS, 0, 0) if vendor_id == vendor_ids::EIGHT_BIT_DO => {
                Self::IdleInterface
            }
            _ => Self::Unknown,
        }
    }

    /// Whether reports from this family can update a canonical pad state.
    pub fn is_gamepad(self) -> bool {
        matches!(
            self,
            Self::OriginalXbox | Self::Xbox360Wired | Self::Xbox360Wireless | Self::XboxOne
        )
    }

    /// Whether a device record should be allocated at enumeration time.
    ///
    /// Wireless receiver slots are allocated in-band when a controller
    /// announces itself, and unknown interfaces are never allocated.
    pub fn allocates_on_enumeration(self) -> bool {
        matches!(
            self,
            Self::OriginalXbox | Self::Xbox360Wired | Self::XboxOne | Self::Keyboard | Self::Mouse
        )
    }
}

impl std::fmt::Display for ProtocolFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::OriginalXbox => "original-xbox",
            Self::Xbox360Wired => "xbox360-wired",
            Self::Xbox360Wireless => "xbox360-wireless",
            Self::XboxOne => "xbox-one",
            Self::Keyboard => "keyboard",
            Self::Mouse => "mouse",
            Self::IdleInterface => "idle-interface",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xbox360_subclass_splits_on_protocol() {
        assert_eq!(
            ProtocolFamily::classify(0xFF, 0x5D, 0x01, 2, 0, 0x045E),
            ProtocolFamily::Xbox360Wired
        );
        assert_eq!(
            ProtocolFamily::classify(0xFF, 0x5D, 0x81, 2, 0, 0x045E),
            ProtocolFamily::Xbox360Wireless
        );
    }

    #[test]
    fn xbox_one_only_on_first_interface() {
        assert_eq!(
            ProtocolFamily::classify(0xFF, 0x47, 0xD0, 2, 0, 0x045E),
            ProtocolFamily::XboxOne
        );
        assert_eq!(
            ProtocolFamily::classify(0xFF, 0x47, 0xD0, 2, 1, 0x045E),
            ProtocolFamily::Unknown
        );
    }

    #[test]
    fn hid_boot_devices_and_idle_interface() {
        assert_eq!(
            ProtocolFamily::classify(3, 1, 1, 1, 0, 0x1234),
            ProtocolFamily::Keyboard
        );
        assert_eq!(
            ProtocolFamily::classify(3, 1, 2, 1, 0, 0x1234),
            ProtocolFamily::Mouse
        );
        assert_eq!(
            ProtocolFamily::classify(3, 0, 0, 1, 0, 0x2DC8),
            ProtocolFamily::IdleInterface
        );
        assert_eq!(
            ProtocolFamily::classify(3, 0, 0, 1, 0, 0x1234),
            ProtocolFamily::Unknown
        );
    }

    #[test]
    fn interface_without_endpoints_is_unknown() {
        assert_eq!(
            ProtocolFamily::classify(0x58, 0x42, 0x00, 0, 0, 0x045E),
            ProtocolFamily::Unknown
        );
        assert_eq!(
            ProtocolFamily::classify(0x58, 0x42, 0x00, 2, 0, 0x045E),
            ProtocolFamily::OriginalXbox
        );
    }

    #[test]
    fn only_pad_families_are_gamepads() {
        assert!(ProtocolFamily::XboxOne.is_gamepad());
        assert!(!ProtocolFamily::Keyboard.is_gamepad());
        assert!(!ProtocolFamily::Xbox360Wireless.allocates_on_enumeration());
        assert!(ProtocolFamily::Mouse.allocates_on_enumeration());
    }
}
