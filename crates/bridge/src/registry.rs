//! Fixed-capacity controller slot table.
//!
//! The registry is the only owner of [`DeviceRecord`]s. Everything else
//! refers to a record by [`SlotId`] and looks it up again on each access,
//! so a hot-unplug between two ticks can never leave a dangling reference.

use std::collections::HashMap;

use ogx_hid_xinput_protocol::chatpad::modifiers;
use ogx_hid_xinput_protocol::{
    bring_up_sequence, decode_report, BringUpStep, ChatpadEvent, InputFrame, Presence,
    WirelessFrame,
};
use tracing::{debug, info, warn};

use crate::error::RegistryError;
use crate::ports::HostTransport;
use crate::record::{DeviceRecord, InterfaceBinding, Rumble, SlotId, MAX_SLOTS};

/// Identity of an interrupt IN endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EndpointKey {
    /// Device address.
    pub address: u8,
    /// IN endpoint address.
    pub endpoint: u8,
}

/// What [`DeviceRegistry::ingest`] did with a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestOutcome {
    /// Slot the report was applied to.
    pub slot: Option<SlotId>,
    /// A wireless controller announced itself and got a slot.
    pub allocated: bool,
    /// A wireless controller left and its slot was freed.
    pub freed: bool,
    /// The canonical pad state was replaced.
    pub pad_updated: bool,
}

/// The four controller slots plus the endpoint-to-slot relation.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    slots: [Option<DeviceRecord>; MAX_SLOTS],
    endpoints: HashMap<EndpointKey, SlotId>,
}

impl DeviceRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `binding` to the first free slot and run its bring-up sequence.
    ///
    /// Bring-up transfer failures are logged; the slot stays allocated.
    pub fn allocate<H: HostTransport>(
        &mut self,
        host: &mut H,
        binding: InterfaceBinding,
        now_ms: u64,
    ) -> Result<SlotId, RegistryError> {
        if let Some(slot) = self.slot_for_identity(binding.address, binding.interface) {
            return Err(RegistryError::DuplicateIdentity {
                address: binding.address,
                interface: binding.interface,
                slot,
            });
        }
        let slot = SlotId::ALL
            .into_iter()
            .find(|slot| self.slots[slot.index()].is_none())
            .ok_or(RegistryError::Full(MAX_SLOTS))?;

        let mut record = DeviceRecord::new(binding, now_ms);
        record.led_requested = slot.value().saturating_add(1);
        record.chatpad_led_requested = modifiers::GREEN;

        let steps = bring_up_sequence(
            binding.family,
            binding.vendor_id,
            binding.product_id,
            binding.interface,
            slot.value(),
        );
        for step in steps {
            let result = match (step, binding.out_endpoint) {
                (BringUpStep::Interrupt(command), Some(endpoint)) => {
                    host.write_interrupt(binding.address, endpoint, command.as_bytes())
                }
                (BringUpStep::Interrupt(_), None) => continue,
                (BringUpStep::SetBootProtocol { interface }, _) => {
                    host.set_boot_protocol(binding.address, interface)
                }
            };
            match result {
                Ok(()) => record.timers.last_command_ms = now_ms,
                Err(err) => warn!(slot = %slot, error = %err, "bring-up command failed"),
            }
        }

        self.endpoints.insert(
            EndpointKey {
                address: binding.address,
                endpoint: binding.in_endpoint,
            },
            slot,
        );
        self.slots[slot.index()] = Some(record);
        info!(
            slot = %slot,
            address = binding.address,
            interface = binding.interface,
            family = %binding.family,
            "controller allocated"
        );
        Ok(slot)
    }

    /// Release a slot and every endpoint relation pointing at it.
    pub fn free(&mut self, slot: SlotId) -> Result<DeviceRecord, RegistryError> {
        let record = self.slots[slot.index()]
            .take()
            .ok_or(RegistryError::InvalidSlot(slot))?;
        self.endpoints.retain(|_, bound| *bound != slot);
        info!(slot = %slot, address = record.binding.address, "controller freed");
        Ok(record)
    }

    /// Release every slot held by a device address. Returns the freed slots.
    pub fn free_address(&mut self, address: u8) -> Vec<SlotId> {
        let mut freed: Vec<SlotId> = SlotId::ALL
            .into_iter()
            .filter(|slot| {
                self.slots[slot.index()]
                    .as_ref()
                    .is_some_and(|r| r.binding.address == address)
            })
            .collect();
        freed.retain(|slot| self.free(*slot).is_ok());
        freed
    }

    /// Slot currently bound to an IN endpoint.
    pub fn slot_for_endpoint(&self, address: u8, endpoint: u8) -> Option<SlotId> {
        self.endpoints
            .get(&EndpointKey { address, endpoint })
            .copied()
    }

    fn slot_for_identity(&self, address: u8, interface: u8) -> Option<SlotId> {
        SlotId::ALL.into_iter().find(|slot| {
            self.slots[slot.index()]
                .as_ref()
                .is_some_and(|r| r.binding.identity() == (address, interface))
        })
    }

    /// Live record in a slot.
    pub fn get(&self, slot: SlotId) -> Option<&DeviceRecord> {
        self.slots[slot.index()].as_ref()
    }

    /// Live record in a slot, mutably.
    pub fn get_mut(&mut self, slot: SlotId) -> Option<&mut DeviceRecord> {
        self.slots[slot.index()].as_mut()
    }

    /// Slots holding a live record.
    pub fn live_slots(&self) -> impl Iterator<Item = SlotId> + '_ {
        SlotId::ALL
            .into_iter()
            .filter(|slot| self.slots[slot.index()].is_some())
    }

    /// Number of live records.
    pub fn live_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Decode a report from `binding`'s IN endpoint and apply it.
    ///
    /// Unrecognized or malformed reports change nothing.
    pub fn ingest<H: HostTransport>(
        &mut self,
        host: &mut H,
        binding: &InterfaceBinding,
        data: &[u8],
        now_ms: u64,
    ) -> IngestOutcome {
        let slot = self.slot_for_endpoint(binding.address, binding.in_endpoint);
        let Some(frame) = decode_report(binding.family, data) else {
            debug!(
                address = binding.address,
                endpoint = binding.in_endpoint,
                len = data.len(),
                "discarding unrecognized report"
            );
            return IngestOutcome {
                slot,
                ..IngestOutcome::default()
            };
        };

        if let InputFrame::Wireless(wireless) = frame {
            return self.apply_wireless(host, binding, slot, wireless, now_ms);
        }

        let mut outcome = IngestOutcome {
            slot,
            ..IngestOutcome::default()
        };
        let Some(record) = slot.and_then(|s| self.slots[s.index()].as_mut()) else {
            return outcome;
        };
        match frame {
            InputFrame::Pad(pad) => {
                record.pad = pad;
                outcome.pad_updated = true;
            }
            InputFrame::LedEcho(quadrant) => record.led_actual = quadrant,
            InputFrame::RumbleEcho { left, right } => {
                record.rumble_actual = Rumble { left, right };
            }
            InputFrame::Wireless(_) | InputFrame::Inert => {}
        }
        outcome
    }

    fn apply_wireless<H: HostTransport>(
        &mut self,
        host: &mut H,
        binding: &InterfaceBinding,
        mut slot: Option<SlotId>,
        frame: WirelessFrame,
        now_ms: u64,
    ) -> IngestOutcome {
        let mut outcome = IngestOutcome::default();
        match (frame.presence, slot) {
            (Some(Presence::Connected), None) => match self.allocate(host, *binding, now_ms) {
                Ok(new_slot) => {
                    slot = Some(new_slot);
                    outcome.allocated = true;
                }
                Err(err) => {
                    warn!(address = binding.address, error = %err, "wireless controller not allocated");
                    return outcome;
                }
            },
            (Some(Presence::Disconnected), Some(old)) => {
                if let Err(err) = self.free(old) {
                    warn!(slot = %old, error = %err, "wireless slot already free");
                }
                outcome.slot = Some(old);
                outcome.freed = true;
                return outcome;
            }
            _ => {}
        }

        outcome.slot = slot;
        let Some(record) = slot.and_then(|s| self.slots[s.index()].as_mut()) else {
            return outcome;
        };
        if frame.chatpad_reinit {
            debug!(slot = ?slot, "chatpad requested re-initialisation");
            record.chatpad_init_pending = true;
        }
        if let Some(pad) = frame.pad {
            record.pad = pad;
            outcome.pad_updated = true;
        }
        match frame.chatpad {
            Some(ChatpadEvent::Keys(keys)) => record.chatpad.update(keys),
            Some(ChatpadEvent::ReinitRequired) => record.chatpad_init_pending = true,
            Some(ChatpadEvent::LedEcho(leds)) => record.chatpad_led_actual = leds,
            None => {}
        }
        outcome
    }
}
