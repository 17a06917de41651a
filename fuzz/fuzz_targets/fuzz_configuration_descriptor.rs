//! Fuzzes the configuration descriptor walk used at enumeration.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_configuration_descriptor

#![no_main]

use libfuzzer_sys::fuzz_target;
use ogx_hid_xinput_protocol::parse_configuration;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let vendor_id = u16::from_le_bytes([data[0], data[1]]);
    if let Ok(interfaces) = parse_configuration(&data[2..], vendor_id) {
        for iface in interfaces {
            // Endpoint addresses keep their direction bit.
            assert!(iface.in_endpoint.is_none_or(|ep| ep & 0x80 != 0));
            assert!(iface.out_endpoint.is_none_or(|ep| ep & 0x80 == 0));
        }
    }
});
