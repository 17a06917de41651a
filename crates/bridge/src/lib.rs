//! Xbox controller adapter engine.
//!
//! Up to four modern Xbox-family controllers are plugged into one USB host
//! port and presented to original Xbox consoles as XID devices: slot 0 on
//! the master board's own device port, slots 1 to 3 on slave boards reached
//! over a shared two-wire bus.
//!
//! - [`registry`]: slot allocation, bring-up, report ingestion
//! - [`scheduler`]: rate-limited rumble, LED, chatpad and keep-alive traffic
//! - [`mapper`]: canonical pad state to Duke and Steel Battalion reports
//! - [`bus`]: master/slave frame exchange
//! - [`runtime`]: the per-tick loop tying them together
//!
//! All hardware sits behind the traits in [`ports`].
//!
//! # Example
//!
//! ```
//! use ogx_bridge::ports::mock::{MockBus, MockHost, MockXid};
//! use ogx_bridge::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut engine = MasterEngine::new(
//!     BridgeConfig::default(),
//!     MockHost::new(),
//!     MockBus::new(),
//!     MockXid::new(),
//!     MemoryNonVolatile::default(),
//! )?;
//! engine.start();
//! let summary = engine.tick(0);
//! assert_eq!(summary.host_events, 0);
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]

pub mod bus;
pub mod config;
pub mod error;
pub mod mapper;
pub mod ports;
pub mod record;
pub mod registry;
pub mod runtime;
pub mod scheduler;
pub mod settings;

pub mod prelude;

pub use bus::{BusSlave, SlaveEvent};
pub use config::{BridgeConfig, BusConfig};
pub use error::{BusError, ConfigError, EngineError, EngineResult, RegistryError, StorageError};
pub use mapper::{select_mode, MappedSlot, ReportMapper, SlotModifiers};
pub use record::{DeviceRecord, InterfaceBinding, SlotId, MAX_SLOTS};
pub use registry::DeviceRegistry;
pub use runtime::{MasterEngine, Role, SlotOutput, TickSummary};
pub use scheduler::{FeedbackAction, FeedbackScheduler, FeedbackTiming};
pub use settings::{FileNonVolatile, MemoryNonVolatile, PersistentSettings};
