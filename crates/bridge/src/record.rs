//! Per-slot controller state.

use std::fmt;

use ogx_hid_xinput_protocol::{ChatpadState, PadState, ProtocolFamily, KEY_STATE_LEN};
use serde::Serialize;

/// Number of controller slots.
pub const MAX_SLOTS: usize = 4;

/// Stable index of a controller slot (0..4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SlotId(u8);

impl SlotId {
    /// Every slot, in allocation order.
    pub const ALL: [SlotId; MAX_SLOTS] = [SlotId(0), SlotId(1), SlotId(2), SlotId(3)];

    /// The slot served by the master board's own emulated device.
    pub const LOCAL: SlotId = SlotId(0);

    /// Validate a raw index.
    pub fn new(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Array index.
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// Raw value, also the bus address of the board serving this slot.
    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transport identity and endpoints of one controller interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceBinding {
    /// USB device address.
    pub address: u8,
    /// Interface number on that device.
    pub interface: u8,
    /// Interrupt IN endpoint.
    pub in_endpoint: u8,
    /// Interrupt OUT endpoint, if the interface has one.
    pub out_endpoint: Option<u8>,
    /// Device vendor ID.
    pub vendor_id: u16,
    /// Device product ID.
    pub product_id: u16,
    /// Protocol family of the interface.
    pub family: ProtocolFamily,
}

impl InterfaceBinding {
    /// Registry identity: no two live slots share it.
    pub fn identity(&self) -> (u8, u8) {
        (self.address, self.interface)
    }
}

/// Two motor intensities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Rumble {
    /// Left (low-frequency) motor.
    pub left: u8,
    /// Right (high-frequency) motor.
    pub right: u8,
}

/// Monotonic timestamps (ms) driving the feedback cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotTimers {
    /// Last wireless keep-alive cycle.
    pub periodic_ms: u64,
    /// Last command written to the pad.
    pub last_command_ms: u64,
    /// Start of the current guide-button hold.
    pub power_hold_ms: u64,
}

/// One live controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    /// Where the controller lives.
    pub binding: InterfaceBinding,
    /// Latest decoded pad state.
    pub pad: PadState,
    /// Button latch used by [`DeviceRecord::was_pressed`].
    pub previous_buttons: u16,
    /// Rumble the mapper wants.
    pub rumble_requested: Rumble,
    /// Rumble last sent or echoed.
    pub rumble_actual: Rumble,
    /// Player LED quadrant the mapper wants (0 = off).
    pub led_requested: u8,
    /// Player LED quadrant last sent or echoed.
    pub led_actual: u8,
    /// Chatpad keys.
    pub chatpad: ChatpadState,
    /// Chatpad LEDs wanted, see [`ogx_hid_xinput_protocol::chatpad::modifiers`].
    pub chatpad_led_requested: u8,
    /// Chatpad LEDs last sent or echoed.
    pub chatpad_led_actual: u8,
    /// Feedback timers.
    pub timers: SlotTimers,
    /// The chatpad still needs its init packet.
    pub chatpad_init_pending: bool,
    /// Which of the two keep-alive payloads goes out next.
    pub keepalive_phase: bool,
}

impl DeviceRecord {
    /// Fresh record for a just-allocated interface.
    pub fn new(binding: InterfaceBinding, now_ms: u64) -> Self {
        Self {
            binding,
            pad: PadState::default(),
            previous_buttons: 0,
            rumble_requested: Rumble::default(),
            rumble_actual: Rumble::default(),
            led_requested: 0,
            led_actual: 0,
            chatpad: ChatpadState::default(),
            chatpad_led_requested: 0,
            chatpad_led_actual: 0,
            timers: SlotTimers {
                periodic_ms: now_ms,
                last_command_ms: 0,
                power_hold_ms: now_ms,
            },
            chatpad_init_pending: binding.family == ProtocolFamily::Xbox360Wireless,
            keepalive_phase: false,
        }
    }

    /// Protocol family of the bound interface.
    pub fn family(&self) -> ProtocolFamily {
        self.binding.family
    }

    /// Level test on the canonical button mask.
    pub fn is_pressed(&self, mask: u16) -> bool {
        self.pad.is_pressed(mask)
    }

    /// Rising-edge test on the canonical button mask.
    ///
    /// The latch is updated on each query: the first call after a press
    /// returns `true`, later calls return `false` until the buttons are
    /// released.
    pub fn was_pressed(&mut self, mask: u16) -> bool {
        if self.is_pressed(mask) {
            if self.previous_buttons & mask == 0 {
                self.previous_buttons |= mask;
                return true;
            }
        } else {
            self.previous_buttons &= !mask;
        }
        false
    }

    /// Level test on a chatpad key or modifier.
    pub fn is_chatpad_pressed(&self, code: u8) -> bool {
        self.chatpad.is_pressed(code)
    }

    /// Rising-edge test on a chatpad key or modifier.
    pub fn was_chatpad_pressed(&mut self, code: u8) -> bool {
        self.chatpad.was_pressed(code)
    }

    /// Raw chatpad key state.
    pub fn chatpad_keys(&self) -> [u8; KEY_STATE_LEN] {
        self.chatpad.keys()
    }
}
