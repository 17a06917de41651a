//! Per-tick orchestration.
//!
//! A master board runs [`MasterEngine::tick`] every few milliseconds:
//!
//! 1. drain host events (attach, detach, reports)
//! 2. feedback scheduling for every live slot
//! 3. mode selection and report mapping for every slot
//! 4. publish slot 0 on the local emulated device and poll its feedback
//! 5. exchange slots 1..=3 with the slave boards
//!
//! Slave boards run [`crate::bus::BusSlave`] instead.

use std::collections::HashMap;
use std::time::Duration;

use ogx_hid_xinput_protocol::output::wireless;
use ogx_hid_xinput_protocol::{parse_configuration, ProtocolFamily};
use ogx_xid_device::{InputReport, XidDevice, XidDeviceOptions, XidType, XID_MAX_REPORT_LEN};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::bus::{self, SLAVE_ADDRESSES};
use crate::config::BridgeConfig;
use crate::error::{BusError, EngineResult};
use crate::mapper::{select_mode, ReportMapper};
use crate::ports::{BusTransport, Clock, HostEvent, HostTransport, NonVolatile, XidTransport};
use crate::record::{InterfaceBinding, SlotId, MAX_SLOTS};
use crate::registry::{DeviceRegistry, EndpointKey};
use crate::scheduler::{FeedbackAction, FeedbackScheduler, FeedbackTiming};
use crate::settings::PersistentSettings;

/// Board role, read once from the two strap pins.
///
/// This only decodes the strap value. The board entry point builds a
/// [`MasterEngine`] for [`Role::Master`] or a [`BusSlave`](crate::bus::BusSlave)
/// at the decoded address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Owns the USB host port and slot 0.
    Master,
    /// Serves one slot at this bus address.
    Slave(u8),
}

impl Role {
    /// Decode the strap value. Only the two low bits are wired.
    pub fn from_strap(strap: u8) -> Self {
        match strap & 0x03 {
            0 => Self::Master,
            address => Self::Slave(address),
        }
    }
}

/// What a slot presents to its console this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotOutput {
    /// Emulated device type.
    pub xid_type: XidType,
    /// Mapped input report, `None` while disconnected.
    pub report: Option<InputReport>,
    /// Latest feedback bytes from the console.
    pub feedback: [u8; XID_MAX_REPORT_LEN],
}

impl Default for SlotOutput {
    fn default() -> Self {
        Self {
            xid_type: XidType::Disconnected,
            report: None,
            feedback: [0; XID_MAX_REPORT_LEN],
        }
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Host events handled.
    pub host_events: usize,
    /// Feedback actions sent to controllers.
    pub commands: Vec<(SlotId, FeedbackAction)>,
    /// Slave exchanges that failed and were skipped.
    pub bus_errors: Vec<(SlotId, BusError)>,
}

/// The master board.
#[derive(Debug)]
pub struct MasterEngine<H, B, X, S>
where
    H: HostTransport,
    B: BusTransport,
    X: XidTransport,
    S: NonVolatile,
{
    config: BridgeConfig,
    host: H,
    bus: B,
    local: XidDevice<X>,
    settings: PersistentSettings<S>,
    registry: DeviceRegistry,
    interfaces: HashMap<EndpointKey, InterfaceBinding>,
    mapper: ReportMapper,
    scheduler: FeedbackScheduler,
    outputs: [SlotOutput; MAX_SLOTS],
}

impl<H, B, X, S> MasterEngine<H, B, X, S>
where
    H: HostTransport,
    B: BusTransport,
    X: XidTransport,
    S: NonVolatile,
{
    /// Build the engine and load the persisted sensitivity.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the bus rejects
    /// its parameters, or the settings storage cannot be read or
    /// initialised.
    pub fn new(
        config: BridgeConfig,
        host: H,
        mut bus: B,
        xid: X,
        storage: S,
    ) -> EngineResult<Self> {
        config.validate()?;
        bus.configure(&config.bus)?;
        debug!(
            clock_hz = config.bus.clock_hz,
            timeout_us = config.bus.transaction_timeout_us,
            "bus configured"
        );
        let settings = PersistentSettings::load(storage, config.default_sensitivity)?;
        let local = XidDevice::new(
            xid,
            XidDeviceOptions {
                interface: 0,
                settle_delay: Duration::from_millis(config.settle_delay_ms),
                feedback_expiry_ms: config.feedback_expiry_ms,
            },
        );
        Ok(Self {
            mapper: ReportMapper::new(settings.sensitivity(), config.recenter_hold_ms),
            scheduler: FeedbackScheduler::new(FeedbackTiming::from(&config)),
            config,
            host,
            bus,
            local,
            settings,
            registry: DeviceRegistry::new(),
            interfaces: HashMap::new(),
            outputs: [SlotOutput::default(); MAX_SLOTS],
        })
    }

    /// Announce the master to the slave boards. Returns the slaves that did
    /// not answer; they are still served every tick.
    pub fn start(&mut self) -> Vec<(u8, BusError)> {
        let missing = bus::ping_slaves(&mut self.bus);
        info!(
            slaves = SLAVE_ADDRESSES.len() - missing.len(),
            sensitivity = self.settings.sensitivity(),
            "master started"
        );
        missing
    }

    /// Run one tick at `clock`'s current time.
    pub fn tick_with<C: Clock>(&mut self, clock: &C) -> TickSummary {
        self.tick(clock.now_ms())
    }

    /// Run one tick.
    pub fn tick(&mut self, now_ms: u64) -> TickSummary {
        let mut summary = TickSummary::default();

        while let Some(event) = self.host.poll_event() {
            summary.host_events += 1;
            self.handle_event(event, now_ms);
        }

        for slot in SlotId::ALL {
            let Some(record) = self.registry.get_mut(slot) else {
                continue;
            };
            if let Some(action) = self.scheduler.service(&mut self.host, record, now_ms) {
                summary.commands.push((slot, action));
            }
        }

        for slot in SlotId::ALL {
            self.map_slot(slot, now_ms);
        }

        self.serve_local(now_ms);

        for address in SLAVE_ADDRESSES {
            let Some(slot) = SlotId::new(usize::from(address)) else {
                continue;
            };
            let output = &mut self.outputs[slot.index()];
            if let Err(err) = bus::exchange(
                &mut self.bus,
                address,
                output.xid_type,
                output.report.as_ref(),
                &mut output.feedback,
            ) {
                match err {
                    BusError::ShortRead { .. } => debug!(slot = %slot, error = %err, "slave feedback incomplete"),
                    _ => warn!(slot = %slot, error = %err, "slave exchange skipped"),
                }
                summary.bus_errors.push((slot, err));
            }
        }

        summary
    }

    fn map_slot(&mut self, slot: SlotId, now_ms: u64) {
        let output = &mut self.outputs[slot.index()];
        let record = self.registry.get_mut(slot);
        let xid_type = select_mode(output.xid_type, record);
        if xid_type != output.xid_type {
            info!(slot = %slot, from = %output.xid_type, to = %xid_type, "slot mode changed");
            output.xid_type = xid_type;
            output.feedback = [0; XID_MAX_REPORT_LEN];
        }

        let Some(record) = self.registry.get_mut(slot) else {
            output.report = None;
            return;
        };
        let mapped = self
            .mapper
            .map(slot, output.xid_type, record, &output.feedback, now_ms);
        output.report = mapped.report;
        if let Some(value) = mapped.sensitivity_changed {
            if let Err(err) = self.settings.set_sensitivity(value) {
                warn!(error = %err, "sensitivity not persisted");
            }
        }
    }

    fn serve_local(&mut self, now_ms: u64) {
        let output = &mut self.outputs[SlotId::LOCAL.index()];
        if let Err(err) = self.local.set_type(output.xid_type) {
            warn!(error = %err, "local device retype failed");
        }
        if let Some(report) = output.report {
            if let Err(err) = self.local.publish_input_report(&report.to_vec()) {
                warn!(error = %err, "local input report not sent");
            }
        }
        self.local.poll_output_report(&mut output.feedback, now_ms);
    }

    fn handle_event(&mut self, event: HostEvent, now_ms: u64) {
        match event {
            HostEvent::Attached {
                address,
                vendor_id,
                product_id,
                configuration,
            } => self.attach(address, vendor_id, product_id, &configuration, now_ms),
            HostEvent::Detached { address } => {
                let freed = self.registry.free_address(address);
                self.interfaces.retain(|key, _| key.address != address);
                info!(address, slots = ?freed, "device detached");
            }
            HostEvent::Report {
                address,
                endpoint,
                data,
            } => {
                let key = EndpointKey { address, endpoint };
                let Some(binding) = self.interfaces.get(&key).copied() else {
                    debug!(address, endpoint, "report from unbound endpoint");
                    return;
                };
                self.registry.ingest(&mut self.host, &binding, &data, now_ms);
            }
        }
    }

    fn attach(
        &mut self,
        address: u8,
        vendor_id: u16,
        product_id: u16,
        configuration: &[u8],
        now_ms: u64,
    ) {
        let interfaces = match parse_configuration(configuration, vendor_id) {
            Ok(interfaces) => interfaces,
            Err(err) => {
                warn!(address, error = %err, "unreadable configuration descriptor");
                return;
            }
        };

        for iface in interfaces {
            let Some(in_endpoint) = iface.in_endpoint else {
                continue;
            };
            if iface.family == ProtocolFamily::Unknown {
                continue;
            }
            let binding = InterfaceBinding {
                address,
                interface: iface.number,
                in_endpoint,
                out_endpoint: iface.out_endpoint,
                vendor_id,
                product_id,
                family: iface.family,
            };
            self.interfaces.insert(
                EndpointKey {
                    address,
                    endpoint: in_endpoint,
                },
                binding,
            );

            if binding.family.allocates_on_enumeration() {
                if let Err(err) = self.registry.allocate(&mut self.host, binding, now_ms) {
                    warn!(address, interface = iface.number, error = %err, "controller not allocated");
                }
            } else if binding.family == ProtocolFamily::Xbox360Wireless {
                let Some(out_endpoint) = binding.out_endpoint else {
                    continue;
                };
                let inquiry = wireless::inquire_present();
                if let Err(err) = self.host.write_interrupt(address, out_endpoint, inquiry.as_bytes()) {
                    warn!(address, error = %err, "receiver presence inquiry failed");
                }
            }
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// The device registry.
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// The report mapper.
    pub fn mapper(&self) -> &ReportMapper {
        &self.mapper
    }

    /// The persisted settings.
    pub fn settings(&self) -> &PersistentSettings<S> {
        &self.settings
    }

    /// What a slot presents this tick.
    pub fn output(&self, slot: SlotId) -> &SlotOutput {
        &self.outputs[slot.index()]
    }

    /// Slot 0's emulated device.
    pub fn local_device(&self) -> &XidDevice<X> {
        &self.local
    }

    /// Slot 0's emulated device, mutably, for control requests.
    pub fn local_device_mut(&mut self) -> &mut XidDevice<X> {
        &mut self.local
    }
}
