//! Error types for the emulated XID device.

use thiserror::Error;

/// Errors reported by an [`XidTransport`](crate::XidTransport).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XidError {
    /// The device stack refused to attach or detach.
    #[error("USB attach/detach failed: {0}")]
    Attach(String),

    /// An interrupt transfer failed.
    #[error("USB transfer failed on endpoint {endpoint:#04x}: {reason}")]
    Transfer {
        /// Endpoint address.
        endpoint: u8,
        /// Transport-specific reason.
        reason: String,
    },

    /// The console has not configured the device yet.
    #[error("device not configured by host")]
    NotConfigured,
}

impl XidError {
    /// Create an attach error.
    #[must_use]
    pub fn attach(reason: impl Into<String>) -> Self {
        Self::Attach(reason.into())
    }

    /// Create a transfer error.
    #[must_use]
    pub fn transfer(endpoint: u8, reason: impl Into<String>) -> Self {
        Self::Transfer {
            endpoint,
            reason: reason.into(),
        }
    }
}

/// Result alias for XID device operations.
pub type XidResult<T> = Result<T, XidError>;
