//! Original Xbox XID controller emulation.
//!
//! Two device types are supported: the standard "Duke" controller and the
//! Steel Battalion cockpit controller. [`XidDevice`] owns the per-slot
//! emulated-device state; the USB device stack itself is abstracted behind
//! [`XidTransport`].

#![deny(static_mut_refs)]

pub mod control;
pub mod descriptors;
pub mod device;
pub mod error;
pub mod report;
pub mod types;

pub use control::{ControlResponse, SetupPacket};
pub use device::{FeedbackPoll, XidDevice, XidDeviceOptions, XidTransport};
pub use error::{XidError, XidResult};
pub use report::{
    DukeFeedback, DukeReport, FeedbackReport, GearLever, InputReport, SteelBattalionFeedback,
    SteelBattalionReport, XID_MAX_REPORT_LEN, duke, steel_battalion,
};
pub use types::XidType;
