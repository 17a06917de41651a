//! Subcommand implementations.

pub mod config;
pub mod decode;
pub mod replay;

use clap::ValueEnum;
use ogx_hid_xinput_protocol::ProtocolFamily;

/// Controller family named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FamilyArg {
    OriginalXbox,
    Xbox360Wired,
    Xbox360Wireless,
    XboxOne,
}

impl From<FamilyArg> for ProtocolFamily {
    fn from(arg: FamilyArg) -> Self {
        match arg {
            FamilyArg::OriginalXbox => Self::OriginalXbox,
            FamilyArg::Xbox360Wired => Self::Xbox360Wired,
            FamilyArg::Xbox360Wireless => Self::Xbox360Wireless,
            FamilyArg::XboxOne => Self::XboxOne,
        }
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    #[default]
    Text,
    Json,
}
