//! Emulated device type tag.

#![deny(static_mut_refs)]

use serde::{Deserialize, Serialize};

use crate::report::{
    DUKE_FEEDBACK_LEN, DUKE_REPORT_LEN, STEEL_BATTALION_FEEDBACK_LEN, STEEL_BATTALION_REPORT_LEN,
};

/// Controller type presented to the console.
///
/// The discriminant is the tag carried in the low nibble of a bus status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum XidType {
    /// No device attached to the console.
    #[default]
    Disconnected = 0,
    /// Standard controller.
    Duke = 1,
    /// Steel Battalion cockpit controller.
    SteelBattalion = 2,
}

impl XidType {
    /// Decode a 4-bit type tag.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Disconnected),
            1 => Some(Self::Duke),
            2 => Some(Self::SteelBattalion),
            _ => None,
        }
    }

    /// The 4-bit type tag.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Size of the device-to-host input report.
    pub fn input_report_len(self) -> usize {
        match self {
            Self::Disconnected => 0,
            Self::Duke => DUKE_REPORT_LEN,
            Self::SteelBattalion => STEEL_BATTALION_REPORT_LEN,
        }
    }

    /// Size of the host-to-device feedback report.
    pub fn feedback_report_len(self) -> usize {
        match self {
            Self::Disconnected => 0,
            Self::Duke => DUKE_FEEDBACK_LEN,
            Self::SteelBattalion => STEEL_BATTALION_FEEDBACK_LEN,
        }
    }
}

impl std::fmt::Display for XidType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Duke => "duke",
            Self::SteelBattalion => "steel-battalion",
        })
    }
}
