//! BDD end-to-end scenarios for the adapter engine.
//!
//! Each test drives a [`MasterEngine`] through mock transports with a
//! Given/When/Then structure and checks only externally observable traffic.

use std::error::Error;

use ogx_bridge::bus::{encode_frame, BusSlave, SlaveEvent};
use ogx_bridge::ports::mock::{
    configuration_for, BusOp, MockBus, MockHost, MockIndicator, MockXid, XidEvent,
};
use ogx_bridge::prelude::*;
use ogx_hid_xinput_protocol::ProtocolFamily;
use ogx_xid_device::{DukeReport, XidDeviceOptions};

type Engine = MasterEngine<MockHost, MockBus, MockXid, MemoryNonVolatile>;

struct Scenario {
    host: MockHost,
    bus: MockBus,
    xid: MockXid,
    engine: Engine,
    now_ms: u64,
}

impl Scenario {
    fn new() -> Result<Self, Box<dyn Error>> {
        Self::with_storage(MemoryNonVolatile::default())
    }

    fn with_storage(storage: MemoryNonVolatile) -> Result<Self, Box<dyn Error>> {
        let (host, bus, xid) = (MockHost::new(), MockBus::new(), MockXid::new());
        let engine = MasterEngine::new(
            BridgeConfig::default(),
            host.clone(),
            bus.clone(),
            xid.clone(),
            storage,
        )?;
        Ok(Self {
            host,
            bus,
            xid,
            engine,
            now_ms: 0,
        })
    }

    fn plug(&self, address: u8, family: ProtocolFamily) {
        self.host.push_event(HostEvent::Attached {
            address,
            vendor_id: 0x045E,
            product_id: 0x028E,
            configuration: configuration_for(family),
        });
    }

    fn unplug(&self, address: u8) {
        self.host.push_event(HostEvent::Detached { address });
    }

    fn tick(&mut self) -> TickSummary {
        let summary = self.engine.tick(self.now_ms);
        self.now_ms += 4;
        summary
    }
}

fn wired_frame(buttons: u16) -> Vec<u8> {
    let mut frame = vec![0x00, 0x14];
    frame.extend_from_slice(&buttons.to_le_bytes());
    frame.extend_from_slice(&[0x00, 0x00, 0x00, 0x80, 0x00, 0x80, 0x00, 0x80, 0x00, 0x80]);
    frame
}

// ─── Scenario 1: wired Start press reaches the console ──────────────────────

#[test]
fn scenario_wired_start_press_is_published_on_slot_zero() -> Result<(), Box<dyn Error>> {
    // Given: a wired 360 pad on the host port
    let mut s = Scenario::new()?;
    s.plug(1, ProtocolFamily::Xbox360Wired);
    s.tick();

    // When: it reports Start held
    s.host.push_report(1, 0x81, &wired_frame(0x0010));
    s.tick();

    // Then: slot 0 presents a Duke with the Start bit set
    let output = s.engine.output(SlotId::LOCAL);
    assert_eq!(output.xid_type, XidType::Duke);
    let Some(InputReport::Duke(report)) = output.report else {
        return Err("slot 0 has no Duke report".into());
    };
    assert_eq!(report.buttons & 0x0010, 0x0010);

    // Then: the console received it
    let sent = s.xid.sent();
    let last = sent.last().ok_or("nothing published")?;
    assert_eq!(last[..4], [0x00, 0x14, 0x10, 0x00]);
    Ok(())
}

// ─── Scenario 2: a fifth controller waits for a free slot ───────────────────

#[test]
fn scenario_fifth_controller_takes_freed_slot() -> Result<(), Box<dyn Error>> {
    // Given: four wired pads occupy every slot
    let mut s = Scenario::new()?;
    for address in 1..=4 {
        s.plug(address, ProtocolFamily::Xbox360Wired);
    }
    s.tick();
    assert_eq!(s.engine.registry().live_count(), 4);

    // When: a fifth pad enumerates
    s.plug(5, ProtocolFamily::Xbox360Wired);
    s.tick();

    // Then: it is not allocated
    assert_eq!(s.engine.registry().live_count(), 4);
    assert!(s.host.interrupt_payloads(5).is_empty());

    // When: the pad in slot 2 is unplugged and the fifth re-enumerates
    s.unplug(3);
    s.tick();
    s.plug(5, ProtocolFamily::Xbox360Wired);
    s.tick();

    // Then: the fifth pad lands in slot 2 with the slot 2 bring-up LED
    let slot2 = SlotId::new(2).ok_or("bad slot")?;
    let record = s.engine.registry().get(slot2).ok_or("slot 2 empty")?;
    assert_eq!(record.binding.address, 5);
    assert_eq!(s.host.interrupt_payloads(5).first(), Some(&vec![0x01, 0x03, 0x04]));
    Ok(())
}

// ─── Scenario 3: an absent slave does not stall the others ──────────────────

#[test]
fn scenario_slave_nack_skips_only_that_slot() -> Result<(), Box<dyn Error>> {
    // Given: four pads and slave 2 not answering
    let mut s = Scenario::new()?;
    for address in 1..=4 {
        s.plug(address, ProtocolFamily::Xbox360Wired);
    }
    s.bus.nack(2);
    s.bus.set_response(1, &[0x00, 0x06, 0x00, 0x00, 0x00, 0x00]);
    s.bus.set_response(3, &[0x00, 0x06, 0x00, 0x00, 0x00, 0x00]);

    // When: a tick runs
    let summary = s.tick();

    // Then: slave 2 is reported and skipped
    let slot2 = SlotId::new(2).ok_or("bad slot")?;
    assert_eq!(summary.bus_errors, vec![(slot2, BusError::Nack(2))]);

    // Then: slaves 1 and 3 completed a write and a read
    for address in [1, 3] {
        let ops: Vec<BusOp> = s
            .bus
            .ops()
            .into_iter()
            .filter(|op| match op {
                BusOp::Write { address: a, .. } | BusOp::Read { address: a, .. } => *a == address,
            })
            .collect();
        assert_eq!(ops.len(), 2, "slave {address}");
        assert!(matches!(ops[1], BusOp::Read { len: 6, .. }));
    }
    Ok(())
}

// ─── Scenario 4: a slave board mirrors its slot ─────────────────────────────

#[test]
fn scenario_slave_presents_the_frame_it_receives() -> Result<(), Box<dyn Error>> {
    // Given: two pads, the second on slot 1
    let mut s = Scenario::new()?;
    s.engine.start();
    s.plug(1, ProtocolFamily::Xbox360Wired);
    s.plug(2, ProtocolFamily::Xbox360Wired);
    s.tick();
    s.host.push_report(2, 0x81, &wired_frame(0x1000));
    s.tick();

    // And: a slave board at address 1
    let slave_xid = MockXid::new();
    let indicator = MockIndicator::default();
    let mut slave = BusSlave::new(
        1,
        slave_xid.clone(),
        indicator.clone(),
        XidDeviceOptions::default(),
    );

    // When: it receives the master's traffic
    let frames = s.bus.writes_to(1);
    let mut events = Vec::new();
    for frame in &frames {
        events.push(slave.on_receive(frame));
        slave.tick(s.now_ms)?;
    }

    // Then: it blinked for the ping, retyped to Duke and published A held
    assert_eq!(events.first(), Some(&SlaveEvent::Ping));
    assert_eq!(indicator.pulses(), 1);
    assert!(events.contains(&SlaveEvent::Retyped {
        from: XidType::Disconnected,
        to: XidType::Duke
    }));
    let sent = slave_xid.sent();
    let last = sent.last().ok_or("slave published nothing")?;
    assert_eq!(last.len(), 20);
    assert_eq!(last[4], 0xFF);
    assert_eq!(slave.on_request().len(), 6);
    Ok(())
}

// ─── Scenario 5: wireless controller comes and goes ─────────────────────────

#[test]
fn scenario_wireless_controller_lifecycle() -> Result<(), Box<dyn Error>> {
    // Given: a wireless receiver with no controller synced
    let mut s = Scenario::new()?;
    s.plug(7, ProtocolFamily::Xbox360Wireless);
    s.tick();
    assert_eq!(s.engine.registry().live_count(), 0);

    // When: a controller connects on the first receiver interface
    s.host.push_report(7, 0x81, &[0x08, 0x80]);
    s.tick();

    // Then: it owns slot 0 and slot 0 presents a Duke
    assert_eq!(s.engine.registry().live_count(), 1);
    assert_eq!(s.engine.output(SlotId::LOCAL).xid_type, XidType::Duke);

    // When: enough time passes for the scheduler
    let mut actions = Vec::new();
    for _ in 0..20 {
        actions.extend(s.tick().commands.into_iter().map(|(_, action)| action));
    }

    // Then: the chatpad was initialised and the player LED sent
    assert!(actions.contains(&FeedbackAction::ChatpadInit));
    assert!(actions.contains(&FeedbackAction::Led(1)));

    // When: the controller disconnects
    s.host.push_report(7, 0x81, &[0x08, 0x00]);
    s.tick();

    // Then: the slot is free and the console sees it unplugged
    assert_eq!(s.engine.registry().live_count(), 0);
    assert_eq!(s.engine.output(SlotId::LOCAL).xid_type, XidType::Disconnected);
    Ok(())
}

// ─── Scenario 6: sensitivity survives a restart ─────────────────────────────

#[test]
fn scenario_sensitivity_survives_restart() -> Result<(), Box<dyn Error>> {
    // Given: storage holding a previously chosen divisor
    let mut storage = MemoryNonVolatile::default();
    storage.write(0, &[0xAB])?;
    storage.write(1, &250u16.to_le_bytes())?;

    // When: the engine starts
    let s = Scenario::with_storage(storage)?;

    // Then: the mapper uses it
    assert_eq!(s.engine.mapper().sensitivity(), 250);
    Ok(())
}

// ─── Scenario 7: a slave holding the bus times out without stalling the tick ─

#[test]
fn scenario_slave_timeout_skips_only_that_slot() -> Result<(), Box<dyn Error>> {
    // Given: four pads and slave 3 holding the bus
    let mut s = Scenario::new()?;
    for address in 1..=4 {
        s.plug(address, ProtocolFamily::Xbox360Wired);
    }
    s.bus.stall(3);
    s.bus.set_response(1, &[0x00, 0x06, 0x00, 0x00, 0x00, 0x00]);
    s.bus.set_response(2, &[0x00, 0x06, 0x00, 0x00, 0x00, 0x00]);

    // Then: the bus got the configured timeout at start-up
    let config = s.bus.config().ok_or("bus never configured")?;
    assert_eq!(config.transaction_timeout_us, 4_000);
    assert_eq!(config.clock_hz, 400_000);

    // When: a tick runs
    let summary = s.tick();

    // Then: only slave 3 timed out and slaves 1 and 2 completed
    let slot3 = SlotId::new(3).ok_or("bad slot")?;
    assert_eq!(summary.bus_errors, vec![(slot3, BusError::Timeout(3))]);
    for address in [1, 2] {
        assert_eq!(s.bus.writes_to(address).len(), 1, "slave {address}");
    }
    assert!(s.bus.writes_to(3).is_empty());

    // When: slave 3 lets go of the bus
    s.bus.restore(3);
    let summary = s.tick();

    // Then: it is served again on the next tick
    assert!(summary.bus_errors.is_empty());
    assert_eq!(s.bus.writes_to(3).len(), 1);
    Ok(())
}

// ─── Scenario 8: a refused attach on slot 0 is retried next tick ────────────

#[test]
fn scenario_local_attach_failure_is_retried() -> Result<(), Box<dyn Error>> {
    // Given: a device stack that refuses the first attach
    let mut s = Scenario::new()?;
    s.xid.fail_attaches(1);
    s.plug(1, ProtocolFamily::Xbox360Wired);

    // When: the pad is allocated and slot 0 tries to come up
    s.tick();

    // Then: the console sees nothing yet
    assert_eq!(s.engine.local_device().xid_type(), XidType::Disconnected);
    assert!(s.xid.sent().is_empty());

    // When: the next tick runs with Start held
    s.host.push_report(1, 0x81, &wired_frame(0x0010));
    s.tick();

    // Then: the device attached as a Duke and the report went out
    assert_eq!(s.engine.local_device().xid_type(), XidType::Duke);
    let attaches = s
        .xid
        .events()
        .into_iter()
        .filter(|event| matches!(event, XidEvent::Attach(XidType::Duke)))
        .count();
    assert_eq!(attaches, 1);
    let sent = s.xid.sent();
    let last = sent.last().ok_or("nothing published after retry")?;
    assert_eq!(last[..4], [0x00, 0x14, 0x10, 0x00]);
    Ok(())
}

// ─── Scenario 9: a slave recovers from a refused attach ─────────────────────

#[test]
fn scenario_slave_attach_failure_is_retried() -> Result<(), Box<dyn Error>> {
    // Given: a slave whose device stack refuses the first attach
    let slave_xid = MockXid::new();
    slave_xid.fail_attaches(1);
    let mut slave = BusSlave::new(
        2,
        slave_xid.clone(),
        MockIndicator::default(),
        XidDeviceOptions::default(),
    );
    let report = InputReport::Duke(DukeReport {
        a: 0xFF,
        ..DukeReport::default()
    });
    let frame = encode_frame(XidType::Duke, Some(&report));

    // When: a Duke frame arrives and the slave ticks
    slave.on_receive(&frame);
    assert!(slave.tick(0).is_err());

    // Then: nothing reached the console
    assert!(slave_xid.sent().is_empty());
    assert_eq!(slave.device().xid_type(), XidType::Disconnected);

    // When: the next frame arrives and the slave ticks again
    slave.on_receive(&frame);
    slave.tick(4)?;

    // Then: the device is up and the report was published
    assert_eq!(slave.device().xid_type(), XidType::Duke);
    let sent = slave_xid.sent();
    let last = sent.last().ok_or("slave published nothing after retry")?;
    assert_eq!(last[4], 0xFF);
    Ok(())
}
