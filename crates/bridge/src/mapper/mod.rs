//! Canonical pad state to emulated XID reports.
//!
//! The mapper owns everything that has to survive from one tick to the
//! next but is not part of a report: stick inversion flags, Steel Battalion
//! toggle switches, the gear lever and tuner dial, and the virtual aiming
//! cursor. Reports themselves are rebuilt from scratch on every tick.

mod duke;
mod steel_battalion;

use ogx_hid_xinput_protocol::chatpad::modifiers;
use ogx_xid_device::{
    steel_battalion::AIMING_MID, DukeFeedback, GearLever, InputReport, SteelBattalionFeedback,
    XidType,
};
use tracing::info;

use crate::record::{DeviceRecord, SlotId, MAX_SLOTS};

pub use steel_battalion::{AIMING_DEADZONE, SENSITIVITIES};

/// Per-slot state that persists across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotModifiers {
    /// Invert the right stick X axis (Duke).
    pub invert_right_x: bool,
    /// Invert the right stick Y axis (Duke).
    pub invert_right_y: bool,
    /// Sticky toggle-switch bits of button word 2 (Steel Battalion).
    pub toggles: u16,
    /// Gear lever position.
    pub gear: GearLever,
    /// Tuner dial position.
    pub tuner: u8,
    /// Aiming cursor X accumulator.
    pub aim_x: i32,
    /// Aiming cursor Y accumulator.
    pub aim_y: i32,
    /// When the current left-thumb hold started (ms).
    pub hold_started_ms: u64,
}

impl Default for SlotModifiers {
    fn default() -> Self {
        Self {
            invert_right_x: false,
            invert_right_y: false,
            toggles: 0,
            gear: GearLever::Neutral,
            tuner: 0,
            aim_x: i32::from(AIMING_MID),
            aim_y: i32::from(AIMING_MID),
            hold_started_ms: 0,
        }
    }
}

/// Result of mapping one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MappedSlot {
    /// Report to publish, `None` while the slot is disconnected.
    pub report: Option<InputReport>,
    /// New aiming sensitivity selected on this tick, to be persisted.
    pub sensitivity_changed: Option<u16>,
}

/// Choose the emulated device type for a slot.
///
/// A slot without a controller is disconnected. A newly live slot starts as
/// a standard controller. The chatpad green and orange keys switch between
/// the standard and Steel Battalion controllers and light the matching
/// chatpad LED.
pub fn select_mode(current: XidType, record: Option<&mut DeviceRecord>) -> XidType {
    let Some(record) = record else {
        return XidType::Disconnected;
    };
    let mut next = match current {
        XidType::Disconnected => XidType::Duke,
        other => other,
    };
    if record.is_chatpad_pressed(modifiers::GREEN) {
        next = XidType::Duke;
        record.chatpad_led_requested = modifiers::GREEN;
    } else if record.is_chatpad_pressed(modifiers::ORANGE) {
        next = XidType::SteelBattalion;
        record.chatpad_led_requested = modifiers::ORANGE;
    }
    next
}

/// Maps device records to XID reports, one modifier set per slot.
#[derive(Debug, Clone)]
pub struct ReportMapper {
    modifiers: [SlotModifiers; MAX_SLOTS],
    sensitivity: u16,
    recenter_hold_ms: u64,
}

impl ReportMapper {
    /// Mapper with the given aiming sensitivity divisor and recentre hold time.
    pub fn new(sensitivity: u16, recenter_hold_ms: u64) -> Self {
        Self {
            modifiers: [SlotModifiers::default(); MAX_SLOTS],
            sensitivity: sensitivity.max(1),
            recenter_hold_ms,
        }
    }

    /// Current aiming sensitivity divisor, shared by all slots.
    pub fn sensitivity(&self) -> u16 {
        self.sensitivity
    }

    /// Replace the aiming sensitivity divisor. Zero is treated as one.
    pub fn set_sensitivity(&mut self, sensitivity: u16) {
        self.sensitivity = sensitivity.max(1);
    }

    /// Persistent modifiers of a slot.
    pub fn modifiers(&self, slot: SlotId) -> &SlotModifiers {
        &self.modifiers[slot.index()]
    }

    /// Build this tick's report for `slot`.
    ///
    /// `feedback` holds the raw host feedback bytes for the slot's current
    /// type. Rumble and chatpad LED requests are written back into
    /// `record`.
    pub fn map(
        &mut self,
        slot: SlotId,
        xid_type: XidType,
        record: &mut DeviceRecord,
        feedback: &[u8],
        now_ms: u64,
    ) -> MappedSlot {
        let state = &mut self.modifiers[slot.index()];
        match xid_type {
            XidType::Disconnected => MappedSlot::default(),
            XidType::Duke => {
                let feedback = DukeFeedback::from_bytes(feedback).unwrap_or_default();
                MappedSlot {
                    report: Some(InputReport::Duke(duke::map(record, state, feedback))),
                    sensitivity_changed: None,
                }
            }
            XidType::SteelBattalion => {
                let feedback = SteelBattalionFeedback::from_bytes(feedback).unwrap_or_default();
                let context = steel_battalion::Context {
                    sensitivity: self.sensitivity,
                    recenter_hold_ms: self.recenter_hold_ms,
                    now_ms,
                };
                let (report, selected) =
                    steel_battalion::map(record, state, &feedback, &context);
                if let Some(value) = selected {
                    info!(slot = %slot, sensitivity = value, "aiming sensitivity changed");
                    self.sensitivity = value;
                }
                MappedSlot {
                    report: Some(InputReport::SteelBattalion(report)),
                    sensitivity_changed: selected,
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use ogx_hid_xinput_protocol::ProtocolFamily;

    use crate::record::{DeviceRecord, InterfaceBinding};

    pub(crate) fn wireless_record() -> DeviceRecord {
        DeviceRecord::new(
            InterfaceBinding {
                address: 1,
                interface: 0,
                in_endpoint: 0x81,
                out_endpoint: Some(0x01),
                vendor_id: 0x045E,
                product_id: 0x0719,
                family: ProtocolFamily::Xbox360Wireless,
            },
            0,
        )
    }
}
