//! Fuzzes every controller report decoder with arbitrary bytes.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_xinput_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use ogx_hid_xinput_protocol::{decode_report, ProtocolFamily};

const FAMILIES: [ProtocolFamily; 8] = [
    ProtocolFamily::OriginalXbox,
    ProtocolFamily::Xbox360Wired,
    ProtocolFamily::Xbox360Wireless,
    ProtocolFamily::XboxOne,
    ProtocolFamily::Keyboard,
    ProtocolFamily::Mouse,
    ProtocolFamily::IdleInterface,
    ProtocolFamily::Unknown,
];

fuzz_target!(|data: &[u8]| {
    // Must never panic, whatever the family.
    for family in FAMILIES {
        let _ = decode_report(family, data);
    }
});
