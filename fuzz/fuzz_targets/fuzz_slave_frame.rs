//! Fuzzes a slave board with arbitrary bus frames.
//!
//! The first byte splits the input into frames; each frame is applied and
//! the slave ticked, as on hardware.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_slave_frame

#![no_main]

use libfuzzer_sys::fuzz_target;
use ogx_bridge::bus::BusSlave;
use ogx_bridge::ports::mock::{MockIndicator, MockXid};
use ogx_xid_device::XidDeviceOptions;

fuzz_target!(|data: &[u8]| {
    let Some((&chunk, rest)) = data.split_first() else {
        return;
    };
    let chunk = usize::from(chunk).clamp(1, 40);
    let mut slave = BusSlave::new(1, MockXid::new(), MockIndicator::default(), XidDeviceOptions::default());
    for (tick, frame) in rest.chunks(chunk).enumerate() {
        let _ = slave.on_receive(frame);
        let _ = slave.tick(tick as u64 * 4);
        let expected = slave.xid_type().feedback_report_len().max(1);
        assert_eq!(slave.on_request().len(), expected);
    }
});
