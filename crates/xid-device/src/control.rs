//! XID control-request dispatch table.
//!
//! | bmRequestType | bRequest | wValue      | Action                 |
//! |---------------|----------|-------------|------------------------|
//! | `0xC1`        | `0x06`   | `0x4200`    | XID descriptor         |
//! | `0xC1`        | `0x01`   | `0x0100`    | input capabilities     |
//! | `0xC1`        | `0x01`   | `0x0200`    | output capabilities    |
//! | `0xA1`        | `0x01`   | `0x01xx`    | GET_REPORT (input)     |
//! | `0x21`        | `0x09`   | `0x02xx`    | SET_REPORT (output)    |
//!
//! Anything else stalls.

#![deny(static_mut_refs)]

/// Device-to-host, vendor, interface recipient.
pub const REQUEST_TYPE_VENDOR_INTERFACE_IN: u8 = 0xC1;
/// Device-to-host, class, interface recipient.
pub const REQUEST_TYPE_CLASS_INTERFACE_IN: u8 = 0xA1;
/// Host-to-device, class, interface recipient.
pub const REQUEST_TYPE_CLASS_INTERFACE_OUT: u8 = 0x21;

/// Vendor request: get XID descriptor.
pub const XID_GET_DESCRIPTOR: u8 = 0x06;
/// Vendor request: get capabilities.
pub const XID_GET_CAPABILITIES: u8 = 0x01;
/// HID class request GET_REPORT.
pub const HID_GET_REPORT: u8 = 0x01;
/// HID class request SET_REPORT.
pub const HID_SET_REPORT: u8 = 0x09;

/// HID report type carried in the high byte of `wValue`: input.
pub const REPORT_TYPE_INPUT: u8 = 0x01;
/// HID report type carried in the high byte of `wValue`: output.
pub const REPORT_TYPE_OUTPUT: u8 = 0x02;

/// USB SETUP packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupPacket {
    /// `bmRequestType`.
    pub bm_request_type: u8,
    /// `bRequest`.
    pub b_request: u8,
    /// `wValue`.
    pub w_value: u16,
    /// `wIndex`.
    pub w_index: u16,
    /// `wLength`.
    pub w_length: u16,
}

impl SetupPacket {
    /// Parse the 8-byte wire form.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self {
            bm_request_type: bytes[0],
            b_request: bytes[1],
            w_value: u16::from_le_bytes([bytes[2], bytes[3]]),
            w_index: u16::from_le_bytes([bytes[4], bytes[5]]),
            w_length: u16::from_le_bytes([bytes[6], bytes[7]]),
        }
    }

    fn value_high(&self) -> u8 {
        self.w_value.to_be_bytes()[0]
    }
}

/// Outcome of a control request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlResponse {
    /// Data stage payload (device to host).
    Data(Vec<u8>),
    /// Status-stage acknowledgement (host to device).
    Ack,
    /// Protocol stall.
    Stall,
}

/// What a matched request resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    /// Type-specific XID descriptor.
    XidDescriptor,
    /// Input capability mask.
    CapabilitiesIn,
    /// Output capability mask.
    CapabilitiesOut,
    /// Current input report.
    GetInputReport,
    /// New feedback report from the host.
    SetOutputReport,
}

#[derive(Debug, Clone, Copy)]
enum ValueMatch {
    Exact(u16),
    High(u8),
}

#[derive(Debug, Clone, Copy)]
struct ControlRoute {
    request_type: u8,
    request: u8,
    value: ValueMatch,
    action: ControlAction,
}

const ROUTES: [ControlRoute; 5] = [
    ControlRoute {
        request_type: REQUEST_TYPE_VENDOR_INTERFACE_IN,
        request: XID_GET_DESCRIPTOR,
        value: ValueMatch::Exact(0x4200),
        action: ControlAction::XidDescriptor,
    },
    ControlRoute {
        request_type: REQUEST_TYPE_VENDOR_INTERFACE_IN,
        request: XID_GET_CAPABILITIES,
        value: ValueMatch::Exact(0x0100),
        action: ControlAction::CapabilitiesIn,
    },
    ControlRoute {
        request_type: REQUEST_TYPE_VENDOR_INTERFACE_IN,
        request: XID_GET_CAPABILITIES,
        value: ValueMatch::Exact(0x0200),
        action: ControlAction::CapabilitiesOut,
    },
    ControlRoute {
        request_type: REQUEST_TYPE_CLASS_INTERFACE_IN,
        request: HID_GET_REPORT,
        value: ValueMatch::High(REPORT_TYPE_INPUT),
        action: ControlAction::GetInputReport,
    },
    ControlRoute {
        request_type: REQUEST_TYPE_CLASS_INTERFACE_OUT,
        request: HID_SET_REPORT,
        value: ValueMatch::High(REPORT_TYPE_OUTPUT),
        action: ControlAction::SetOutputReport,
    },
];

/// Resolve a SETUP packet against the dispatch table.
///
/// `interface` is the XID interface number; requests addressed to any other
/// interface never match.
pub fn route(setup: &SetupPacket, interface: u8) -> Option<ControlAction> {
    if setup.w_index != u16::from(interface) {
        return None;
    }
    ROUTES
        .iter()
        .find(|r| {
            r.request_type == setup.bm_request_type
                && r.request == setup.b_request
                && match r.value {
                    ValueMatch::Exact(v) => setup.w_value == v,
                    ValueMatch::High(h) => setup.value_high() == h,
                }
        })
        .map(|r| r.action)
}

/// Truncate a response to the host's `wLength`.
pub fn clamp_response(data: &[u8], w_length: u16) -> Vec<u8> {
    let len = data.len().min(usize::from(w_length));
    data[..len].to_vec()
}
