//! Commonly used engine types.

pub use crate::bus::{BusSlave, SlaveEvent, SLAVE_ADDRESSES};
pub use crate::config::{BridgeConfig, BusConfig};
pub use crate::error::{BusError, EngineError, EngineResult};
pub use crate::ports::{BusTransport, Clock, HostEvent, HostTransport, NonVolatile, SystemClock};
pub use crate::record::SlotId;
pub use crate::runtime::{MasterEngine, Role, TickSummary};
pub use crate::scheduler::FeedbackAction;
pub use crate::settings::{FileNonVolatile, MemoryNonVolatile};
pub use ogx_xid_device::{InputReport, XidType};
