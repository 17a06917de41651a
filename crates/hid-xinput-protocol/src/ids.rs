//! Vendor IDs, interface class triples and wire markers for Xbox-family pads.

#![deny(static_mut_refs)]

/// USB vendor IDs that need vendor-specific handling.
pub mod vendor_ids {
    /// Microsoft.
    pub const MICROSOFT: u16 = 0x045E;
    /// PDP (Performance Designed Products) Xbox One pads.
    pub const PDP: u16 = 0x0E6F;
    /// PowerA Xbox One pads.
    pub const POWER_A: u16 = 0x24C6;
    /// 8BitDo adapters, which expose an extra idle HID interface.
    pub const EIGHT_BIT_DO: u16 = 0x2DC8;
}

/// Microsoft product IDs that need the extra Xbox One init packet.
pub mod product_ids {
    /// Xbox One S controller (Bluetooth-capable revision) over USB.
    pub const XBOX_ONE_S: u16 = 0x02EA;
    /// Xbox Series X|S controller over USB.
    pub const XBOX_SERIES: u16 = 0x0B00;
}

/// `(bInterfaceClass, bInterfaceSubClass, bInterfaceProtocol)` values used
/// for classification.
pub mod interface {
    /// Vendor-specific interface class used by Xbox 360 and Xbox One pads.
    pub const VENDOR_CLASS: u8 = 0xFF;
    /// Xbox 360 subclass, shared by wired pads and the wireless receiver.
    pub const XBOX360_SUBCLASS: u8 = 0x5D;
    /// Xbox 360 wired gamepad protocol.
    pub const XBOX360_WIRED_PROTOCOL: u8 = 0x01;
    /// Xbox 360 wireless receiver protocol.
    pub const XBOX360_WIRELESS_PROTOCOL: u8 = 0x81;
    /// Xbox One (GIP) subclass.
    pub const XBOXONE_SUBCLASS: u8 = 0x47;
    /// Xbox One (GIP) protocol.
    pub const XBOXONE_PROTOCOL: u8 = 0xD0;
    /// Original Xbox XID class.
    pub const XID_CLASS: u8 = 0x58;
    /// Original Xbox XID subclass.
    pub const XID_SUBCLASS: u8 = 0x42;
    /// USB HID class.
    pub const HID_CLASS: u8 = 0x03;
    /// HID boot interface subclass.
    pub const HID_BOOT_SUBCLASS: u8 = 0x01;
    /// HID boot keyboard protocol.
    pub const HID_KEYBOARD_PROTOCOL: u8 = 0x01;
    /// HID boot mouse protocol.
    pub const HID_MOUSE_PROTOCOL: u8 = 0x02;
}

/// Fixed marker bytes that identify report shapes.
pub mod markers {
    /// Byte 1 of an original Xbox report (bLength = 20).
    pub const OG_REPORT_LENGTH: u8 = 0x14;
    /// Byte 0 of an Xbox 360 wired input report.
    pub const X360_WIRED_INPUT: u8 = 0x00;
    /// Byte 1 of an Xbox 360 wired input report.
    pub const X360_WIRED_INPUT_LENGTH: u8 = 0x14;
    /// Byte 0 of an Xbox 360 wired LED status echo.
    pub const X360_WIRED_LED_ECHO: u8 = 0x01;
    /// Byte 0 of an Xbox 360 wired rumble status echo.
    pub const X360_WIRED_RUMBLE_ECHO: u8 = 0x03;
    /// Presence-change flag in byte 0 of a wireless receiver report.
    pub const X360W_PRESENCE_FLAG: u8 = 0x08;
    /// Byte 1 value requesting chatpad re-initialisation.
    pub const X360W_CHATPAD_REINIT: u8 = 0xF8;
    /// Byte 1 flag announcing a pad event sub-frame.
    pub const X360W_PAD_EVENT_FLAG: u8 = 0x01;
    /// Byte 1 flag announcing a chatpad sub-frame.
    pub const X360W_CHATPAD_EVENT_FLAG: u8 = 0x02;
    /// Byte 5 marker of a wireless pad event.
    pub const X360W_PAD_EVENT: u8 = 0x13;
    /// Byte 24 of a chatpad key-state sub-frame.
    pub const X360W_CHATPAD_KEYS: u8 = 0x00;
    /// Byte 24 of a chatpad status sub-frame.
    pub const X360W_CHATPAD_STATUS: u8 = 0xF0;
    /// Status byte 25: chatpad asks for re-initialisation.
    pub const X360W_CHATPAD_STATUS_REINIT: u8 = 0x03;
    /// Status byte 25: chatpad LED echo follows in byte 26.
    pub const X360W_CHATPAD_STATUS_LED: u8 = 0x04;
    /// Byte 0 of an Xbox One input report.
    pub const XBOXONE_INPUT: u8 = 0x20;
}

/// Minimum accepted lengths for each report shape.
pub mod lengths {
    /// Original Xbox input report.
    pub const OG_INPUT: usize = 20;
    /// Xbox 360 wired input report (up to the last stick byte).
    pub const X360_WIRED_INPUT: usize = 14;
    /// Xbox 360 wired LED echo.
    pub const X360_WIRED_LED_ECHO: usize = 3;
    /// Xbox 360 wired rumble echo.
    pub const X360_WIRED_RUMBLE_ECHO: usize = 5;
    /// Wireless receiver header (flag bytes).
    pub const X360W_HEADER: usize = 2;
    /// Wireless pad event (up to the last stick byte).
    pub const X360W_PAD_EVENT: usize = 18;
    /// Wireless chatpad status sub-frame.
    pub const X360W_CHATPAD_STATUS: usize = 27;
    /// Wireless chatpad key-state sub-frame.
    pub const X360W_CHATPAD_KEYS: usize = 28;
    /// Xbox One input report.
    pub const XBOXONE_INPUT: usize = 18;
    /// Largest report the decoder looks at.
    pub const MAX_REPORT: usize = 32;
}
