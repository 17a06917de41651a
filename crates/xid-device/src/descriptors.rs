//! Canned descriptor blobs served to the console.

#![deny(static_mut_refs)]

use crate::types::XidType;

/// XID interface class.
pub const XID_INTERFACE_CLASS: u8 = 0x58;
/// XID interface subclass.
pub const XID_INTERFACE_SUBCLASS: u8 = 0x42;
/// `bcdDevice` reported by every emulated type.
pub const XID_BCD_DEVICE: u16 = 0x0121;
/// Interrupt IN endpoint address.
pub const XID_IN_ENDPOINT: u8 = 0x81;
/// Interrupt OUT endpoint address.
pub const XID_OUT_ENDPOINT: u8 = 0x02;
/// Interrupt polling interval (ms).
pub const XID_POLL_INTERVAL_MS: u8 = 4;

/// Microsoft vendor ID used for the Duke.
pub const DUKE_VENDOR_ID: u16 = 0x045E;
/// Duke product ID.
pub const DUKE_PRODUCT_ID: u16 = 0x0202;
/// Capcom vendor ID used by the Steel Battalion controller.
pub const STEEL_BATTALION_VENDOR_ID: u16 = 0x0A7B;
/// Steel Battalion product ID.
pub const STEEL_BATTALION_PRODUCT_ID: u16 = 0xD000;

/// XID descriptor of the standard controller.
pub const DUKE_XID_DESCRIPTOR: [u8; 16] = [
    0x10, 0x42, 0x00, 0x01, 0x01, 0x02, 0x14, 0x06, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
];

/// XID descriptor of the Steel Battalion controller.
pub const STEEL_BATTALION_XID_DESCRIPTOR: [u8; 16] = [
    0x10, 0x42, 0x00, 0x01, 0x80, 0x01, 0x1A, 0x16, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
];

/// Input capability mask returned for vendor request `0x01 / 0x0100`.
pub const DUKE_CAPABILITIES_IN: [u8; 20] = [
    0x00, 0x14, 0xFF, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF,
];

/// Output capability mask returned for vendor request `0x01 / 0x0200`.
pub const DUKE_CAPABILITIES_OUT: [u8; 6] = [0x00, 0x06, 0xFF, 0xFF, 0xFF, 0xFF];

/// XID descriptor for a device type. `None` when disconnected.
pub fn xid_descriptor(xid_type: XidType) -> Option<&'static [u8]> {
    match xid_type {
        XidType::Duke => Some(&DUKE_XID_DESCRIPTOR),
        XidType::SteelBattalion => Some(&STEEL_BATTALION_XID_DESCRIPTOR),
        XidType::Disconnected => None,
    }
}

/// Standard USB device descriptor for a device type.
pub fn device_descriptor(xid_type: XidType) -> [u8; 18] {
    let (vid, pid) = match xid_type {
        XidType::SteelBattalion => (STEEL_BATTALION_VENDOR_ID, STEEL_BATTALION_PRODUCT_ID),
        XidType::Duke | XidType::Disconnected => (DUKE_VENDOR_ID, DUKE_PRODUCT_ID),
    };
    let [vid_lo, vid_hi] = vid.to_le_bytes();
    let [pid_lo, pid_hi] = pid.to_le_bytes();
    let [bcd_lo, bcd_hi] = XID_BCD_DEVICE.to_le_bytes();
    [
        0x12, 0x01, 0x10, 0x01, 0x00, 0x00, 0x00, 0x40, vid_lo, vid_hi, pid_lo, pid_hi, bcd_lo,
        bcd_hi, 0x00, 0x00, 0x00, 0x01,
    ]
}

/// Configuration descriptor: one XID interface with an interrupt IN and OUT
/// endpoint. Identical for both device types.
pub fn configuration_descriptor() -> [u8; 32] {
    [
        // configuration
        0x09, 0x02, 0x20, 0x00, 0x01, 0x01, 0x00, 0x80, 0xFA,
        // interface
        0x09, 0x04, 0x00, 0x00, 0x02, XID_INTERFACE_CLASS, XID_INTERFACE_SUBCLASS, 0x00, 0x00,
        // endpoints
        0x07, 0x05, XID_IN_ENDPOINT, 0x03, 0x20, 0x00, XID_POLL_INTERVAL_MS,
        0x07, 0x05, XID_OUT_ENDPOINT, 0x03, 0x20, 0x00, XID_POLL_INTERVAL_MS,
    ]
}
