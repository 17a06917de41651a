//! Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Bus transport parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Bus clock (Hz).
    pub clock_hz: u32,
    /// Per-transaction timeout (microseconds), handed to the bus transport.
    /// The bus is reset after a timeout.
    pub transaction_timeout_us: u32,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            clock_hz: 400_000,
            transaction_timeout_us: 4_000,
        }
    }
}

/// Timing and tuning parameters for the adapter engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Polling tick period (ms).
    pub tick_interval_ms: u64,
    /// Minimum spacing between two host commands to the same slot (ms).
    pub command_spacing_ms: u64,
    /// Wireless keep-alive period (ms).
    pub keepalive_interval_ms: u64,
    /// Guide-button hold time before a wireless pad is switched off (ms).
    pub power_off_hold_ms: u64,
    /// Left-thumb hold time that recentres the Steel Battalion cursor (ms).
    pub recenter_hold_ms: u64,
    /// Age after which host feedback is treated as stale (ms).
    pub feedback_expiry_ms: u64,
    /// Detach/attach settle delay when the emulated type changes (ms).
    pub settle_delay_ms: u64,
    /// Aiming sensitivity used when nothing is persisted.
    pub default_sensitivity: u16,
    /// Bus parameters.
    pub bus: BusConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 4,
            command_spacing_ms: 20,
            keepalive_interval_ms: 1_000,
            power_off_hold_ms: 1_000,
            recenter_hold_ms: 500,
            feedback_expiry_ms: 500,
            settle_delay_ms: 10,
            default_sensitivity: 400,
            bus: BusConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::invalid("tick_interval_ms must be greater than 0"));
        }
        if self.keepalive_interval_ms == 0 {
            return Err(ConfigError::invalid(
                "keepalive_interval_ms must be greater than 0",
            ));
        }
        if self.feedback_expiry_ms == 0 {
            return Err(ConfigError::invalid("feedback_expiry_ms must be greater than 0"));
        }
        if self.default_sensitivity == 0 {
            return Err(ConfigError::invalid(
                "default_sensitivity must be greater than 0",
            ));
        }
        if self.bus.clock_hz == 0 {
            return Err(ConfigError::invalid("bus.clock_hz must be greater than 0"));
        }
        if self.bus.transaction_timeout_us == 0 {
            return Err(ConfigError::invalid(
                "bus.transaction_timeout_us must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Load and validate a JSON configuration file. Missing fields take
    /// their default values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        debug!(path = %path.display(), "loaded bridge configuration");
        Ok(config)
    }

    /// Write the configuration as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }
}

/// Builder for [`BridgeConfig`].
#[derive(Debug, Default)]
pub struct BridgeConfigBuilder {
    config: BridgeConfig,
}

impl BridgeConfigBuilder {
    /// Set the tick period.
    #[must_use]
    pub fn tick_interval_ms(mut self, ms: u64) -> Self {
        self.config.tick_interval_ms = ms;
        self
    }

    /// Set the minimum command spacing.
    #[must_use]
    pub fn command_spacing_ms(mut self, ms: u64) -> Self {
        self.config.command_spacing_ms = ms;
        self
    }

    /// Set the wireless keep-alive period.
    #[must_use]
    pub fn keepalive_interval_ms(mut self, ms: u64) -> Self {
        self.config.keepalive_interval_ms = ms;
        self
    }

    /// Set the power-off hold time.
    #[must_use]
    pub fn power_off_hold_ms(mut self, ms: u64) -> Self {
        self.config.power_off_hold_ms = ms;
        self
    }

    /// Set the cursor recentre hold time.
    #[must_use]
    pub fn recenter_hold_ms(mut self, ms: u64) -> Self {
        self.config.recenter_hold_ms = ms;
        self
    }

    /// Set the feedback staleness limit.
    #[must_use]
    pub fn feedback_expiry_ms(mut self, ms: u64) -> Self {
        self.config.feedback_expiry_ms = ms;
        self
    }

    /// Set the retype settle delay.
    #[must_use]
    pub fn settle_delay_ms(mut self, ms: u64) -> Self {
        self.config.settle_delay_ms = ms;
        self
    }

    /// Set the default aiming sensitivity.
    #[must_use]
    pub fn default_sensitivity(mut self, value: u16) -> Self {
        self.config.default_sensitivity = value;
        self
    }

    /// Set the bus parameters.
    #[must_use]
    pub fn bus(mut self, bus: BusConfig) -> Self {
        self.config.bus = bus;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<BridgeConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
