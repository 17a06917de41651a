//! Error types for the adapter engine.
//!
//! None of these are fatal. Callers log them and keep serving the other
//! slots; the affected operation is retried on the next tick.

use ogx_hid_xinput_protocol::DescriptorError;
use ogx_xid_device::XidError;
use thiserror::Error;

use crate::record::SlotId;

/// Device registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// All slots are occupied.
    #[error("all {0} controller slots are in use")]
    Full(usize),

    /// The transport identity already owns a slot.
    #[error("device {address}:{interface} already bound to slot {slot}")]
    DuplicateIdentity {
        /// USB device address.
        address: u8,
        /// Interface number.
        interface: u8,
        /// Slot already holding it.
        slot: SlotId,
    },

    /// The slot index does not refer to a live record.
    #[error("slot {0} is not live")]
    InvalidSlot(SlotId),
}

/// Bus transport errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// Address or data not acknowledged.
    #[error("no acknowledge from bus address {0:#04x}")]
    Nack(u8),

    /// The transaction did not complete in time.
    #[error("bus transaction with {0:#04x} timed out")]
    Timeout(u8),

    /// A read returned fewer bytes than requested.
    #[error("short read from {address:#04x}: expected {expected}, got {actual}")]
    ShortRead {
        /// Bus address.
        address: u8,
        /// Bytes requested.
        expected: usize,
        /// Bytes received.
        actual: usize,
    },
}

/// Host-side USB transport errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// A transfer to the peripheral failed.
    #[error("transfer to device {address} endpoint {endpoint:#04x} failed: {reason}")]
    Transfer {
        /// USB device address.
        address: u8,
        /// Endpoint address.
        endpoint: u8,
        /// Transport-specific reason.
        reason: String,
    },

    /// The device is gone.
    #[error("device {0} disconnected")]
    Disconnected(u8),
}

/// Non-volatile storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Access outside the storage image.
    #[error("storage access at {offset}+{len} exceeds capacity {capacity}")]
    OutOfRange {
        /// Offset requested.
        offset: usize,
        /// Length requested.
        len: usize,
        /// Capacity of the image.
        capacity: usize,
    },

    /// Backing file I/O failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value failed validation.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The configuration file could not be read or written.
    #[error("configuration I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON.
    #[error("configuration parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Create a validation error.
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(reason.into())
    }
}

/// Umbrella error for engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Registry failure.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Bus failure.
    #[error(transparent)]
    Bus(#[from] BusError),

    /// Host transport failure.
    #[error(transparent)]
    Host(#[from] HostError),

    /// Emulated device failure.
    #[error(transparent)]
    Xid(#[from] XidError),

    /// Storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Configuration failure.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Descriptor walk failure.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
