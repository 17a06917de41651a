//! Property tests for the emulated device state machine.

use std::collections::VecDeque;
use std::time::Duration;

use ogx_xid_device::{
    FeedbackPoll, XidDevice, XidDeviceOptions, XidResult, XidTransport, XidType,
};
use proptest::prelude::*;

#[derive(Debug, Default)]
struct CountingTransport {
    sends: usize,
    pending: VecDeque<Vec<u8>>,
}

impl XidTransport for CountingTransport {
    fn attach(&mut self, _xid_type: XidType) -> XidResult<()> {
        Ok(())
    }

    fn detach(&mut self) -> XidResult<()> {
        Ok(())
    }

    fn settle(&mut self, _delay: Duration) {}

    fn send_input(&mut self, _report: &[u8]) -> XidResult<()> {
        self.sends += 1;
        Ok(())
    }

    fn receive_output(&mut self, buf: &mut [u8]) -> XidResult<Option<usize>> {
        Ok(self.pending.pop_front().map(|data| {
            let n = data.len().min(buf.len());
            buf[..n].copy_from_slice(&data[..n]);
            n
        }))
    }
}

fn device(xid_type: XidType) -> Result<XidDevice<CountingTransport>, TestCaseError> {
    let mut device = XidDevice::new(CountingTransport::default(), XidDeviceOptions::default());
    device
        .set_type(xid_type)
        .map_err(|e| TestCaseError::fail(e.to_string()))?;
    Ok(device)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn prop_publish_sends_only_on_change(
        reports in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 20), 1..40),
        repeat in 1usize..4,
    ) {
        let mut dev = device(XidType::Duke)?;
        let mut expected = 0usize;
        let mut last: Option<Vec<u8>> = None;
        for report in &reports {
            if last.as_ref() != Some(report) {
                expected += 1;
            }
            for _ in 0..repeat {
                dev.publish_input_report(report)
                    .map_err(|e| TestCaseError::fail(e.to_string()))?;
            }
            last = Some(report.clone());
        }
        prop_assert_eq!(dev.transport().sends, expected);
    }

    #[test]
    fn prop_feedback_zeroed_iff_expired(
        gaps in proptest::collection::vec((0u64..1_200, any::<bool>()), 1..60),
    ) {
        let mut dev = device(XidType::Duke)?;
        let mut now = 10_000u64;
        let mut last_success = 0u64;
        let report = vec![0u8, 6, 0x00, 0x80, 0x00, 0x80];
        for (gap, deliver) in gaps {
            now += gap;
            if deliver {
                dev.transport_mut().pending.push_back(report.clone());
            }
            let mut buf = [0u8; 6];
            let outcome = dev.poll_output_report(&mut buf, now);
            if deliver {
                last_success = now;
                prop_assert_eq!(outcome, FeedbackPoll::Fresh);
            } else if now - last_success >= 500 {
                prop_assert_eq!(outcome, FeedbackPoll::Expired);
                prop_assert_eq!(buf, [0u8; 6]);
            } else {
                prop_assert_eq!(outcome, FeedbackPoll::Cached);
                prop_assert_eq!(&buf[..], &report[..]);
            }
        }
    }
}
