//! Hardware seams.
//!
//! The engine never touches hardware directly. Every transport is a trait
//! here; [`mock`] provides in-memory implementations that record traffic
//! for tests and offline replay.

use std::time::Instant;

use crate::config::BusConfig;
use crate::error::{BusError, HostError, StorageError};

pub use ogx_xid_device::XidTransport;

/// Something the USB host stack reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A peripheral finished enumeration.
    Attached {
        /// Assigned device address.
        address: u8,
        /// `idVendor`.
        vendor_id: u16,
        /// `idProduct`.
        product_id: u16,
        /// Full configuration descriptor.
        configuration: Vec<u8>,
    },
    /// A peripheral was unplugged.
    Detached {
        /// Device address it had.
        address: u8,
    },
    /// An interrupt IN transfer completed.
    Report {
        /// Device address.
        address: u8,
        /// IN endpoint address.
        endpoint: u8,
        /// Report bytes.
        data: Vec<u8>,
    },
}

/// USB host side: the controllers plugged into the adapter.
pub trait HostTransport {
    /// Next pending event, if any.
    fn poll_event(&mut self) -> Option<HostEvent>;

    /// Interrupt OUT transfer.
    fn write_interrupt(&mut self, address: u8, endpoint: u8, data: &[u8])
        -> Result<(), HostError>;

    /// HID `SET_PROTOCOL(boot)` on one interface.
    fn set_boot_protocol(&mut self, address: u8, interface: u8) -> Result<(), HostError>;
}

/// Inter-board bus, master side.
///
/// Every transaction is bounded by the configured timeout. A transaction
/// that runs over fails with [`BusError::Timeout`] and leaves the bus reset
/// for the next one.
pub trait BusTransport {
    /// Apply clock rate and transaction timeout. Called once before the
    /// first transaction.
    fn configure(&mut self, config: &BusConfig) -> Result<(), BusError>;

    /// Addressed write of one frame.
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), BusError>;

    /// Addressed read of up to `buf.len()` bytes. Returns the count received.
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<usize, BusError>;
}

/// Byte-addressed non-volatile memory.
pub trait NonVolatile {
    /// Fill `buf` from `offset`.
    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Store `data` at `offset`.
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError>;
}

/// Status light.
pub trait Indicator {
    /// Short visible blink.
    fn pulse(&mut self);
}

/// Monotonic millisecond clock.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> u64;
}

/// [`Clock`] backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Clock starting at zero now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// In-memory port implementations.
///
/// Each mock is a cheap handle around shared state: clone it before handing
/// it to the engine and keep the clone to inspect traffic afterwards.
pub mod mock {
    use super::*;
    use std::collections::{HashMap, HashSet, VecDeque};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex, MutexGuard};
    use std::time::Duration;

    use ogx_hid_xinput_protocol::ProtocolFamily;
    use ogx_xid_device::{XidError, XidResult, XidType};

    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// A command written to a controller.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum HostWrite {
        /// Interrupt OUT transfer.
        Interrupt {
            /// Device address.
            address: u8,
            /// OUT endpoint.
            endpoint: u8,
            /// Bytes written.
            data: Vec<u8>,
        },
        /// Boot-protocol switch.
        BootProtocol {
            /// Device address.
            address: u8,
            /// Interface number.
            interface: u8,
        },
    }

    #[derive(Debug, Default)]
    struct HostState {
        events: VecDeque<HostEvent>,
        writes: Vec<HostWrite>,
        failing: HashSet<u8>,
    }

    /// Scripted USB host.
    #[derive(Debug, Clone, Default)]
    pub struct MockHost {
        state: Arc<Mutex<HostState>>,
    }

    impl MockHost {
        /// Empty host.
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue an event for the next tick.
        pub fn push_event(&self, event: HostEvent) {
            lock(&self.state).events.push_back(event);
        }

        /// Queue an interrupt IN report.
        pub fn push_report(&self, address: u8, endpoint: u8, data: &[u8]) {
            self.push_event(HostEvent::Report {
                address,
                endpoint,
                data: data.to_vec(),
            });
        }

        /// Every write so far.
        pub fn writes(&self) -> Vec<HostWrite> {
            lock(&self.state).writes.clone()
        }

        /// Interrupt payloads written to `address`, in order.
        pub fn interrupt_payloads(&self, address: u8) -> Vec<Vec<u8>> {
            lock(&self.state)
                .writes
                .iter()
                .filter_map(|w| match w {
                    HostWrite::Interrupt {
                        address: a, data, ..
                    } if *a == address => Some(data.clone()),
                    _ => None,
                })
                .collect()
        }

        /// Forget recorded writes.
        pub fn clear_writes(&self) {
            lock(&self.state).writes.clear();
        }

        /// Make every transfer to `address` fail.
        pub fn fail_address(&self, address: u8) {
            lock(&self.state).failing.insert(address);
        }
    }

    impl HostTransport for MockHost {
        fn poll_event(&mut self) -> Option<HostEvent> {
            lock(&self.state).events.pop_front()
        }

        fn write_interrupt(
            &mut self,
            address: u8,
            endpoint: u8,
            data: &[u8],
        ) -> Result<(), HostError> {
            let mut state = lock(&self.state);
            if state.failing.contains(&address) {
                return Err(HostError::Transfer {
                    address,
                    endpoint,
                    reason: "mock failure".to_string(),
                });
            }
            state.writes.push(HostWrite::Interrupt {
                address,
                endpoint,
                data: data.to_vec(),
            });
            Ok(())
        }

        fn set_boot_protocol(&mut self, address: u8, interface: u8) -> Result<(), HostError> {
            let mut state = lock(&self.state);
            if state.failing.contains(&address) {
                return Err(HostError::Disconnected(address));
            }
            state.writes.push(HostWrite::BootProtocol { address, interface });
            Ok(())
        }
    }

    /// One bus transaction as seen by the mock.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum BusOp {
        /// Addressed write.
        Write {
            /// Bus address.
            address: u8,
            /// Frame bytes.
            data: Vec<u8>,
        },
        /// Addressed read.
        Read {
            /// Bus address.
            address: u8,
            /// Bytes requested.
            len: usize,
        },
    }

    #[derive(Debug, Default)]
    struct BusState {
        ops: Vec<BusOp>,
        nack: HashSet<u8>,
        stalled: HashSet<u8>,
        responses: HashMap<u8, Vec<u8>>,
        config: Option<BusConfig>,
    }

    impl BusState {
        fn check(&self, address: u8) -> Result<(), BusError> {
            if self.nack.contains(&address) {
                return Err(BusError::Nack(address));
            }
            if self.stalled.contains(&address) {
                return Err(BusError::Timeout(address));
            }
            Ok(())
        }
    }

    /// Bus with scripted slave answers.
    #[derive(Debug, Clone, Default)]
    pub struct MockBus {
        state: Arc<Mutex<BusState>>,
    }

    impl MockBus {
        /// Bus with no slaves answering reads.
        pub fn new() -> Self {
            Self::default()
        }

        /// Make `address` reject every transaction.
        pub fn nack(&self, address: u8) {
            lock(&self.state).nack.insert(address);
        }

        /// Make `address` hold the bus until the transaction times out.
        pub fn stall(&self, address: u8) {
            lock(&self.state).stalled.insert(address);
        }

        /// Let `address` respond again.
        pub fn restore(&self, address: u8) {
            let mut state = lock(&self.state);
            state.nack.remove(&address);
            state.stalled.remove(&address);
        }

        /// Parameters passed to [`BusTransport::configure`], if it was called.
        pub fn config(&self) -> Option<BusConfig> {
            lock(&self.state).config
        }

        /// Bytes `address` answers reads with.
        pub fn set_response(&self, address: u8, data: &[u8]) {
            lock(&self.state).responses.insert(address, data.to_vec());
        }

        /// Every completed transaction.
        pub fn ops(&self) -> Vec<BusOp> {
            lock(&self.state).ops.clone()
        }

        /// Frames successfully written to `address`.
        pub fn writes_to(&self, address: u8) -> Vec<Vec<u8>> {
            lock(&self.state)
                .ops
                .iter()
                .filter_map(|op| match op {
                    BusOp::Write { address: a, data } if *a == address => Some(data.clone()),
                    _ => None,
                })
                .collect()
        }

        /// Forget recorded transactions.
        pub fn clear(&self) {
            lock(&self.state).ops.clear();
        }
    }

    impl BusTransport for MockBus {
        fn configure(&mut self, config: &BusConfig) -> Result<(), BusError> {
            lock(&self.state).config = Some(*config);
            Ok(())
        }

        fn write(&mut self, address: u8, data: &[u8]) -> Result<(), BusError> {
            let mut state = lock(&self.state);
            state.check(address)?;
            state.ops.push(BusOp::Write {
                address,
                data: data.to_vec(),
            });
            Ok(())
        }

        fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<usize, BusError> {
            let mut state = lock(&self.state);
            state.check(address)?;
            state.ops.push(BusOp::Read {
                address,
                len: buf.len(),
            });
            let response = state.responses.get(&address).cloned().unwrap_or_default();
            let n = response.len().min(buf.len());
            buf[..n].copy_from_slice(&response[..n]);
            Ok(n)
        }
    }

    /// What the emulated USB device stack was asked to do.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum XidEvent {
        /// Attached with the descriptors of a type.
        Attach(XidType),
        /// Detached.
        Detach,
        /// Settle delay.
        Settle(Duration),
    }

    #[derive(Debug, Default)]
    struct XidState {
        events: Vec<XidEvent>,
        sent: Vec<Vec<u8>>,
        pending: VecDeque<Vec<u8>>,
        failing_attaches: u32,
    }

    /// Emulated USB device stack.
    #[derive(Debug, Clone, Default)]
    pub struct MockXid {
        state: Arc<Mutex<XidState>>,
    }

    impl MockXid {
        /// Detached device.
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a feedback report from the console.
        pub fn push_output(&self, data: &[u8]) {
            lock(&self.state).pending.push_back(data.to_vec());
        }

        /// Input reports sent to the console.
        pub fn sent(&self) -> Vec<Vec<u8>> {
            lock(&self.state).sent.clone()
        }

        /// Attach/detach history.
        pub fn events(&self) -> Vec<XidEvent> {
            lock(&self.state).events.clone()
        }

        /// Refuse the next `count` attach requests.
        pub fn fail_attaches(&self, count: u32) {
            lock(&self.state).failing_attaches = count;
        }
    }

    impl XidTransport for MockXid {
        fn attach(&mut self, xid_type: XidType) -> XidResult<()> {
            let mut state = lock(&self.state);
            if state.failing_attaches > 0 {
                state.failing_attaches -= 1;
                return Err(XidError::attach("device stack busy"));
            }
            state.events.push(XidEvent::Attach(xid_type));
            Ok(())
        }

        fn detach(&mut self) -> XidResult<()> {
            lock(&self.state).events.push(XidEvent::Detach);
            Ok(())
        }

        fn settle(&mut self, delay: Duration) {
            lock(&self.state).events.push(XidEvent::Settle(delay));
        }

        fn send_input(&mut self, report: &[u8]) -> XidResult<()> {
            lock(&self.state).sent.push(report.to_vec());
            Ok(())
        }

        fn receive_output(&mut self, buf: &mut [u8]) -> XidResult<Option<usize>> {
            let Some(data) = lock(&self.state).pending.pop_front() else {
                return Ok(None);
            };
            if data.len() > buf.len() {
                return Err(XidError::transfer(0x02, "feedback report larger than buffer"));
            }
            buf[..data.len()].copy_from_slice(&data);
            Ok(Some(data.len()))
        }
    }

    /// Counts indicator pulses.
    #[derive(Debug, Clone, Default)]
    pub struct MockIndicator {
        pulses: Arc<AtomicU64>,
    }

    impl MockIndicator {
        /// Number of pulses so far.
        pub fn pulses(&self) -> u64 {
            self.pulses.load(Ordering::Relaxed)
        }
    }

    impl Indicator for MockIndicator {
        fn pulse(&mut self) {
            self.pulses.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Hand-driven clock.
    #[derive(Debug, Clone, Default)]
    pub struct ManualClock {
        now: Arc<AtomicU64>,
    }

    impl ManualClock {
        /// Clock at `start_ms`.
        pub fn starting_at(start_ms: u64) -> Self {
            Self {
                now: Arc::new(AtomicU64::new(start_ms)),
            }
        }

        /// Move forward.
        pub fn advance(&self, ms: u64) {
            self.now.fetch_add(ms, Ordering::Relaxed);
        }

        /// Jump to an absolute time.
        pub fn set(&self, ms: u64) {
            self.now.store(ms, Ordering::Relaxed);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> u64 {
            self.now.load(Ordering::Relaxed)
        }
    }

    /// Number of controller interfaces on a mock wireless receiver.
    pub const RECEIVER_SLOTS: u8 = 4;

    fn interface_descriptor(number: u8, class: u8, subclass: u8, protocol: u8) -> [u8; 9] {
        [0x09, 0x04, number, 0x00, 0x02, class, subclass, protocol, 0x00]
    }

    fn interrupt_endpoint(address: u8) -> [u8; 7] {
        [0x07, 0x05, address, 0x03, 0x20, 0x00, 0x04]
    }

    /// Configuration descriptor a controller of `family` would present.
    ///
    /// Interface `n` uses IN endpoint `0x81 + 2n` and OUT endpoint
    /// `0x01 + 2n`. A wireless receiver has [`RECEIVER_SLOTS`] interfaces;
    /// every other family has one.
    pub fn configuration_for(family: ProtocolFamily) -> Vec<u8> {
        let (class, subclass, protocol, count) = match family {
            ProtocolFamily::OriginalXbox => (0x58, 0x42, 0x00, 1),
            ProtocolFamily::Xbox360Wired => (0xFF, 0x5D, 0x01, 1),
            ProtocolFamily::Xbox360Wireless => (0xFF, 0x5D, 0x81, RECEIVER_SLOTS),
            ProtocolFamily::XboxOne => (0xFF, 0x47, 0xD0, 1),
            ProtocolFamily::Keyboard => (0x03, 0x01, 0x01, 1),
            ProtocolFamily::Mouse => (0x03, 0x01, 0x02, 1),
            ProtocolFamily::IdleInterface | ProtocolFamily::Unknown => (0x03, 0x00, 0x00, 1),
        };
        let mut out = vec![0x09, 0x02, 0x00, 0x00, count, 0x01, 0x00, 0x80, 0xFA];
        for n in 0..count {
            out.extend_from_slice(&interface_descriptor(n, class, subclass, protocol));
            out.extend_from_slice(&interrupt_endpoint(0x81 + 2 * n));
            out.extend_from_slice(&interrupt_endpoint(0x01 + 2 * n));
        }
        let total = u16::try_from(out.len()).unwrap_or(u16::MAX).to_le_bytes();
        out[2] = total[0];
        out[3] = total[1];
        out
    }
}
