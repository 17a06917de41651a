//! Emulated XID device state machine.

#![deny(static_mut_refs)]

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::control::{self, ControlAction, ControlResponse, SetupPacket};
use crate::descriptors::{self, DUKE_CAPABILITIES_IN, DUKE_CAPABILITIES_OUT};
use crate::error::XidResult;
use crate::report::XID_MAX_REPORT_LEN;
use crate::types::XidType;

/// Default settle delay between detach and re-attach.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(10);
/// Default feedback staleness limit.
pub const DEFAULT_FEEDBACK_EXPIRY_MS: u64 = 500;

/// USB device stack the emulated controller runs on.
pub trait XidTransport {
    /// Present the device to the console with the descriptors of `xid_type`.
    fn attach(&mut self, xid_type: XidType) -> XidResult<()>;

    /// Remove the device from the bus.
    fn detach(&mut self) -> XidResult<()>;

    /// Block for the settle delay between detach and attach.
    fn settle(&mut self, delay: Duration);

    /// Queue an input report on the interrupt IN endpoint.
    fn send_input(&mut self, report: &[u8]) -> XidResult<()>;

    /// Non-blocking read from the interrupt OUT endpoint.
    ///
    /// Returns `Ok(None)` when the host has not sent anything.
    fn receive_output(&mut self, buf: &mut [u8]) -> XidResult<Option<usize>>;
}

/// Where the bytes returned by [`XidDevice::poll_output_report`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackPoll {
    /// A fresh report was read from the host.
    Fresh,
    /// No new report; the cached one is still within the expiry window.
    Cached,
    /// No report for longer than the expiry window; the result is zeroed.
    Expired,
}

/// Tunables for [`XidDevice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XidDeviceOptions {
    /// XID interface number.
    pub interface: u8,
    /// Delay between detach and re-attach on retype.
    pub settle_delay: Duration,
    /// Time after which cached feedback is no longer trusted.
    pub feedback_expiry_ms: u64,
}

impl Default for XidDeviceOptions {
    fn default() -> Self {
        Self {
            interface: 0,
            settle_delay: DEFAULT_SETTLE_DELAY,
            feedback_expiry_ms: DEFAULT_FEEDBACK_EXPIRY_MS,
        }
    }
}

/// One emulated controller as seen by the console.
#[derive(Debug)]
pub struct XidDevice<T: XidTransport> {
    transport: T,
    options: XidDeviceOptions,
    xid_type: XidType,
    input: [u8; XID_MAX_REPORT_LEN],
    input_len: usize,
    feedback: [u8; XID_MAX_REPORT_LEN],
    last_feedback_ms: u64,
}

impl<T: XidTransport> XidDevice<T> {
    /// Create a detached device.
    pub fn new(transport: T, options: XidDeviceOptions) -> Self {
        Self {
            transport,
            options,
            xid_type: XidType::Disconnected,
            input: [0; XID_MAX_REPORT_LEN],
            input_len: 0,
            feedback: [0; XID_MAX_REPORT_LEN],
            last_feedback_ms: 0,
        }
    }

    /// Current device type.
    pub fn xid_type(&self) -> XidType {
        self.xid_type
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Underlying transport, mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Change the presented device type.
    ///
    /// Detaches, waits the settle delay and re-attaches with the new
    /// descriptors, forcing the console to enumerate again. Retyping to
    /// [`XidType::Disconnected`] leaves the device detached. Both report
    /// caches are cleared.
    ///
    /// # Errors
    ///
    /// Returns the transport error if detach or attach fails. A failed
    /// attach leaves the device [`XidType::Disconnected`], so the next call
    /// with the same type retries it.
    pub fn set_type(&mut self, xid_type: XidType) -> XidResult<()> {
        if xid_type == self.xid_type {
            return Ok(());
        }
        info!(from = %self.xid_type, to = %xid_type, "retyping emulated controller");
        self.transport.detach()?;
        self.xid_type = xid_type;
        self.input = [0; XID_MAX_REPORT_LEN];
        self.input_len = 0;
        self.feedback = [0; XID_MAX_REPORT_LEN];
        self.transport.settle(self.options.settle_delay);
        if xid_type != XidType::Disconnected
            && let Err(err) = self.transport.attach(xid_type)
        {
            warn!(to = %xid_type, error = %err, "attach failed, device left detached");
            self.xid_type = XidType::Disconnected;
            return Err(err);
        }
        Ok(())
    }

    /// Publish an input report.
    ///
    /// Identical consecutive reports are not retransmitted. Returns whether
    /// a transfer was issued.
    pub fn publish_input_report(&mut self, report: &[u8]) -> XidResult<bool> {
        if self.xid_type == XidType::Disconnected {
            return Ok(false);
        }
        let len = report.len().min(XID_MAX_REPORT_LEN);
        let report = &report[..len];
        if len == self.input_len && self.input[..len] == *report {
            return Ok(false);
        }
        self.input[..len].copy_from_slice(report);
        self.input_len = len;
        self.transport.send_input(report)?;
        Ok(true)
    }

    /// Read the host's feedback report into `buf`.
    ///
    /// The buffer is filled up to the feedback length of the current type.
    /// Once `feedback_expiry_ms` have passed since the last fresh report the
    /// result is zeroed so stale rumble never repeats forever.
    pub fn poll_output_report(&mut self, buf: &mut [u8], now_ms: u64) -> FeedbackPoll {
        let expected = self.xid_type.feedback_report_len();
        let len = expected.min(buf.len());
        let mut fresh = [0u8; XID_MAX_REPORT_LEN];

        if expected > 0 {
            match self.transport.receive_output(&mut fresh[..expected]) {
                Ok(Some(n)) if n == expected => {
                    self.feedback[..expected].copy_from_slice(&fresh[..expected]);
                    self.last_feedback_ms = now_ms;
                    buf[..len].copy_from_slice(&self.feedback[..len]);
                    return FeedbackPoll::Fresh;
                }
                Ok(Some(n)) => debug!(received = n, expected, "short feedback report ignored"),
                Ok(None) => {}
                Err(err) => debug!(error = %err, "feedback read failed"),
            }
        }

        if now_ms.saturating_sub(self.last_feedback_ms) >= self.options.feedback_expiry_ms {
            buf[..len].fill(0);
            FeedbackPoll::Expired
        } else {
            buf[..len].copy_from_slice(&self.feedback[..len]);
            FeedbackPoll::Cached
        }
    }

    /// Handle a control request addressed to the XID interface.
    ///
    /// `data` is the host-to-device data stage, if any.
    pub fn handle_control_request(
        &mut self,
        setup: &SetupPacket,
        data: &[u8],
        now_ms: u64,
    ) -> ControlResponse {
        let Some(action) = control::route(setup, self.options.interface) else {
            warn!(
                bm_request_type = setup.bm_request_type,
                b_request = setup.b_request,
                w_value = setup.w_value,
                w_index = setup.w_index,
                "stalling unsupported control request"
            );
            return ControlResponse::Stall;
        };

        match action {
            ControlAction::XidDescriptor => match descriptors::xid_descriptor(self.xid_type) {
                Some(desc) => ControlResponse::Data(control::clamp_response(desc, setup.w_length)),
                None => ControlResponse::Stall,
            },
            ControlAction::CapabilitiesIn => ControlResponse::Data(control::clamp_response(
                &DUKE_CAPABILITIES_IN,
                setup.w_length,
            )),
            ControlAction::CapabilitiesOut => ControlResponse::Data(control::clamp_response(
                &DUKE_CAPABILITIES_OUT,
                setup.w_length,
            )),
            ControlAction::GetInputReport => ControlResponse::Data(control::clamp_response(
                &self.input[..self.input_len],
                setup.w_length,
            )),
            ControlAction::SetOutputReport => {
                let len = data
                    .len()
                    .min(usize::from(setup.w_length))
                    .min(XID_MAX_REPORT_LEN);
                self.feedback[..len].copy_from_slice(&data[..len]);
                self.last_feedback_ms = now_ms;
                ControlResponse::Ack
            }
        }
    }
}
