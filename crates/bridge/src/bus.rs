//! Inter-board report distribution.
//!
//! The master owns slot 0 and fans slots 1..=3 out to slave boards at bus
//! addresses 1..=3. Each tick and slave it writes one frame
//!
//! ```text
//! [0xF0 | type tag] [input report bytes ...]
//! ```
//!
//! and then reads back the slave's feedback report for that type. A slave
//! that is sent the reserved ping byte `0xAA` only blinks its indicator.

use ogx_xid_device::{
    InputReport, XidDevice, XidDeviceOptions, XidResult, XidTransport, XidType, XID_MAX_REPORT_LEN,
};
use tracing::{debug, info, warn};

use crate::error::BusError;
use crate::ports::{BusTransport, Indicator};

/// High nibble of every status byte.
pub const STATUS_MARKER: u8 = 0xF0;

/// Presence ping, sent once to every slave at start-up.
pub const PRESENCE_PING: u8 = 0xAA;

/// Bus addresses of the slave boards, which are also their slot numbers.
pub const SLAVE_ADDRESSES: [u8; 3] = [1, 2, 3];

/// Answer of a slave that is not presenting a controller.
const DISCONNECTED_ANSWER: [u8; 1] = [0];

/// Status byte announcing `xid_type`.
pub fn status_byte(xid_type: XidType) -> u8 {
    STATUS_MARKER | xid_type.tag()
}

/// Decode a status byte. `None` for the ping, foreign markers and unknown
/// tags.
pub fn parse_status(byte: u8) -> Option<XidType> {
    if byte & 0xF0 != STATUS_MARKER {
        return None;
    }
    XidType::from_tag(byte & 0x0F)
}

/// Full master-to-slave frame.
pub fn encode_frame(xid_type: XidType, report: Option<&InputReport>) -> Vec<u8> {
    let mut frame = Vec::with_capacity(1 + XID_MAX_REPORT_LEN);
    frame.push(status_byte(xid_type));
    if let Some(report) = report.filter(|r| r.xid_type() == xid_type) {
        frame.extend_from_slice(&report.to_vec());
    }
    frame
}

/// Ping every slave address once. Returns the addresses that did not
/// answer.
pub fn ping_slaves<B: BusTransport>(bus: &mut B) -> Vec<(u8, BusError)> {
    SLAVE_ADDRESSES
        .into_iter()
        .filter_map(|address| match bus.write(address, &[PRESENCE_PING]) {
            Ok(()) => None,
            Err(err) => {
                debug!(address, error = %err, "slave did not answer ping");
                Some((address, err))
            }
        })
        .collect()
}

/// Send one slot's report to its slave and collect the slave's feedback.
///
/// `feedback` is only overwritten when exactly the feedback length of
/// `xid_type` arrives. Returns whether it was.
///
/// # Errors
///
/// Returns the bus error of the write or the read. After a failed write no
/// read is attempted.
pub fn exchange<B: BusTransport>(
    bus: &mut B,
    address: u8,
    xid_type: XidType,
    report: Option<&InputReport>,
    feedback: &mut [u8],
) -> Result<bool, BusError> {
    bus.write(address, &encode_frame(xid_type, report))?;

    let expected = xid_type.feedback_report_len().min(feedback.len());
    if expected == 0 {
        return Ok(false);
    }
    let mut buf = [0u8; XID_MAX_REPORT_LEN];
    let actual = bus.read(address, &mut buf[..expected])?;
    if actual != expected {
        return Err(BusError::ShortRead {
            address,
            expected,
            actual,
        });
    }
    feedback[..expected].copy_from_slice(&buf[..expected]);
    Ok(true)
}

/// What a slave made of a received frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaveEvent {
    /// Presence ping.
    Ping,
    /// New report for the current type.
    Report(XidType),
    /// The master switched this slot to another type.
    Retyped {
        /// Previous type.
        from: XidType,
        /// New type.
        to: XidType,
    },
    /// Noise or a malformed frame, ignored.
    Discarded,
}

/// A slave board: one emulated controller fed from the bus.
#[derive(Debug)]
pub struct BusSlave<X: XidTransport, I: Indicator> {
    address: u8,
    device: XidDevice<X>,
    indicator: I,
    xid_type: XidType,
    report: [u8; XID_MAX_REPORT_LEN],
    report_len: usize,
    feedback: [u8; XID_MAX_REPORT_LEN],
}

impl<X: XidTransport, I: Indicator> BusSlave<X, I> {
    /// Slave answering at `address`.
    pub fn new(address: u8, transport: X, indicator: I, options: XidDeviceOptions) -> Self {
        Self {
            address,
            device: XidDevice::new(transport, options),
            indicator,
            xid_type: XidType::Disconnected,
            report: [0; XID_MAX_REPORT_LEN],
            report_len: 0,
            feedback: [0; XID_MAX_REPORT_LEN],
        }
    }

    /// Bus address.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Type most recently announced by the master.
    pub fn xid_type(&self) -> XidType {
        self.xid_type
    }

    /// The emulated device.
    pub fn device(&self) -> &XidDevice<X> {
        &self.device
    }

    /// The emulated device, mutably, for control requests.
    pub fn device_mut(&mut self) -> &mut XidDevice<X> {
        &mut self.device
    }

    /// The status indicator.
    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    /// Handle a frame written by the master.
    ///
    /// A typed frame is taken only if its payload is exactly one input
    /// report of that type; anything else leaves the slave untouched.
    pub fn on_receive(&mut self, frame: &[u8]) -> SlaveEvent {
        let Some((&status, payload)) = frame.split_first() else {
            return SlaveEvent::Discarded;
        };
        if status == PRESENCE_PING {
            self.indicator.pulse();
            return SlaveEvent::Ping;
        }
        let Some(xid_type) = parse_status(status) else {
            debug!(address = self.address, status, "unknown bus status byte");
            return SlaveEvent::Discarded;
        };
        let expected = xid_type.input_report_len();
        if payload.len() != expected {
            debug!(
                address = self.address,
                %xid_type,
                received = payload.len(),
                expected,
                "bus frame length mismatch"
            );
            return SlaveEvent::Discarded;
        }

        self.report[..expected].copy_from_slice(payload);
        self.report_len = expected;
        let previous = self.xid_type;
        if previous == xid_type {
            return SlaveEvent::Report(xid_type);
        }
        info!(address = self.address, from = %previous, to = %xid_type, "slave retyped");
        self.xid_type = xid_type;
        self.feedback = [0; XID_MAX_REPORT_LEN];
        SlaveEvent::Retyped {
            from: previous,
            to: xid_type,
        }
    }

    /// Bytes to answer a master read with.
    pub fn on_request(&self) -> &[u8] {
        match self.xid_type.feedback_report_len() {
            0 => &DISCONNECTED_ANSWER,
            len => &self.feedback[..len],
        }
    }

    /// Push the latest report to the console and refresh the feedback the
    /// next master read will get.
    ///
    /// # Errors
    ///
    /// Returns an error if the emulated device cannot be retyped or the
    /// report cannot be sent.
    pub fn tick(&mut self, now_ms: u64) -> XidResult<()> {
        self.device.set_type(self.xid_type)?;
        if self.xid_type != XidType::Disconnected {
            if let Err(err) = self.device.publish_input_report(&self.report[..self.report_len]) {
                warn!(address = self.address, error = %err, "input report not sent");
                return Err(err);
            }
        }
        self.device.poll_output_report(&mut self.feedback, now_ms);
        Ok(())
    }
}
