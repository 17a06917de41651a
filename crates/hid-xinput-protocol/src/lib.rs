//! Xbox-family gamepad wire protocols: report decoding, chatpad state,
//! interface classification and host command encoding.
//!
//! This crate is I/O-free. Decoders are pure functions over byte slices and
//! return `None` for anything they do not recognize, so callers can keep
//! prior state untouched on malformed input.

#![deny(static_mut_refs)]

pub mod buttons;
pub mod chatpad;
pub mod descriptor;
pub mod ids;
pub mod input;
pub mod output;
pub mod types;

pub use buttons::canonical;
pub use chatpad::{ChatpadLed, ChatpadState, KEY_STATE_LEN, LEDS as CHATPAD_LEDS};
pub use descriptor::{parse_configuration, DescriptorError, DiscoveredInterface};
pub use input::{
    decode_report, ChatpadEvent, InputFrame, PadState, Presence, WirelessFrame,
};
pub use output::{
    bring_up_sequence, chatpad_led_command, led_command, rumble_command, BringUpStep,
    HostCommand, MAX_COMMAND_LEN,
};
pub use types::ProtocolFamily;
