//! Host-to-pad feedback cadence.
//!
//! At most one action per slot per tick, chosen by priority:
//!
//! | # | Action            | Condition                                   | Families  |
//! |---|-------------------|---------------------------------------------|-----------|
//! | 1 | rumble            | requested != actual                         | all       |
//! | 2 | player LED        | requested != actual                         | all       |
//! | 3 | chatpad init      | init pending                                | wireless  |
//! | 4 | chatpad LED       | one LED bit differs                         | wireless  |
//! | 5 | power off         | guide held longer than the hold time        | wireless  |
//! | 6 | keep-alive cycle  | keep-alive interval elapsed                 | wireless  |
//!
//! Nothing is sent while the previous command to the slot is younger than
//! the minimum spacing.

use ogx_hid_xinput_protocol::output::wireless;
use ogx_hid_xinput_protocol::{
    canonical, chatpad_led_command, led_command, rumble_command, ChatpadLed, HostCommand,
    ProtocolFamily, CHATPAD_LEDS,
};
use tracing::{debug, warn};

use crate::config::BridgeConfig;
use crate::ports::HostTransport;
use crate::record::DeviceRecord;

/// Timing parameters of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackTiming {
    /// Minimum spacing between two commands to the same slot (ms).
    pub min_spacing_ms: u64,
    /// Wireless keep-alive period (ms).
    pub keepalive_interval_ms: u64,
    /// Guide hold time before power-off (ms).
    pub power_off_hold_ms: u64,
}

impl Default for FeedbackTiming {
    fn default() -> Self {
        Self {
            min_spacing_ms: 20,
            keepalive_interval_ms: 1_000,
            power_off_hold_ms: 1_000,
        }
    }
}

impl From<&BridgeConfig> for FeedbackTiming {
    fn from(config: &BridgeConfig) -> Self {
        Self {
            min_spacing_ms: config.command_spacing_ms,
            keepalive_interval_ms: config.keepalive_interval_ms,
            power_off_hold_ms: config.power_off_hold_ms,
        }
    }
}

/// One scheduled feedback step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackAction {
    /// Set motor levels.
    Rumble {
        /// Left motor.
        left: u8,
        /// Right motor.
        right: u8,
    },
    /// Set the player LED quadrant.
    Led(u8),
    /// Initialise the chatpad.
    ChatpadInit,
    /// Switch one chatpad LED.
    ChatpadLed {
        /// Which LED.
        led: ChatpadLed,
        /// New state.
        on: bool,
    },
    /// Switch the controller off.
    PowerOff,
    /// Presence inquiry, controller info, LED refresh and chatpad keep-alive.
    KeepAlive {
        /// Which of the two keep-alive payloads.
        second: bool,
        /// LED quadrant to refresh.
        led: u8,
    },
}

impl FeedbackAction {
    /// Wire commands for this action. Empty when the family has no such
    /// feature.
    pub fn commands(&self, family: ProtocolFamily) -> Vec<HostCommand> {
        match *self {
            Self::Rumble { left, right } => rumble_command(family, left, right).into_iter().collect(),
            Self::Led(quadrant) => led_command(family, quadrant).into_iter().collect(),
            Self::ChatpadInit => vec![wireless::chatpad_init()],
            Self::ChatpadLed { led, on } => vec![chatpad_led_command(led, on)],
            Self::PowerOff => vec![wireless::power_off()],
            Self::KeepAlive { second, led } => {
                let mut commands = vec![wireless::inquire_present(), wireless::controller_info()];
                commands.extend(led_command(family, led));
                commands.push(wireless::chatpad_keepalive(second));
                commands
            }
        }
    }
}

/// Decides and sends feedback commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedbackScheduler {
    timing: FeedbackTiming,
}

impl FeedbackScheduler {
    /// Scheduler with the given timing.
    pub fn new(timing: FeedbackTiming) -> Self {
        Self { timing }
    }

    /// Pick this tick's action for `record` and update its bookkeeping as if
    /// the action had been delivered.
    pub fn next_action(&self, record: &mut DeviceRecord, now_ms: u64) -> Option<FeedbackAction> {
        record.binding.out_endpoint?;
        let wireless = record.family() == ProtocolFamily::Xbox360Wireless;
        if !record.is_pressed(canonical::GUIDE) {
            record.timers.power_hold_ms = now_ms;
        }
        if now_ms.saturating_sub(record.timers.last_command_ms) < self.timing.min_spacing_ms {
            return None;
        }

        let action = if record.rumble_requested != record.rumble_actual {
            record.rumble_actual = record.rumble_requested;
            FeedbackAction::Rumble {
                left: record.rumble_requested.left,
                right: record.rumble_requested.right,
            }
        } else if record.led_requested != record.led_actual {
            record.led_actual = record.led_requested;
            FeedbackAction::Led(record.led_requested)
        } else if wireless && record.chatpad_init_pending {
            record.chatpad_init_pending = false;
            FeedbackAction::ChatpadInit
        } else if wireless {
            match self.reconcile_chatpad_led(record, now_ms) {
                Some(action) => action,
                None => self.power_or_keepalive(record, now_ms)?,
            }
        } else {
            return None;
        };

        record.timers.last_command_ms = now_ms;
        Some(action)
    }

    fn reconcile_chatpad_led(&self, record: &mut DeviceRecord, now_ms: u64) -> Option<FeedbackAction> {
        let led = CHATPAD_LEDS.into_iter().find(|led| {
            record.chatpad_led_requested & led.mask != record.chatpad_led_actual & led.mask
        })?;
        let on = record.chatpad_led_requested & led.mask != 0;
        if on {
            record.chatpad_led_actual |= led.mask;
        } else {
            record.chatpad_led_actual &= !led.mask;
        }
        // Pull the keep-alive forward so the chatpad confirms the new state.
        record.timers.periodic_ms = now_ms.saturating_sub(self.timing.keepalive_interval_ms);
        Some(FeedbackAction::ChatpadLed { led, on })
    }

    fn power_or_keepalive(&self, record: &mut DeviceRecord, now_ms: u64) -> Option<FeedbackAction> {
        if record.is_pressed(canonical::GUIDE)
            && now_ms.saturating_sub(record.timers.power_hold_ms) > self.timing.power_off_hold_ms
        {
            record.timers.power_hold_ms = now_ms;
            return Some(FeedbackAction::PowerOff);
        }

        if now_ms.saturating_sub(record.timers.periodic_ms) < self.timing.keepalive_interval_ms {
            return None;
        }
        record.timers.periodic_ms = now_ms;
        let second = record.keepalive_phase;
        record.keepalive_phase = !second;
        Some(FeedbackAction::KeepAlive {
            second,
            led: record.led_requested,
        })
    }

    /// Run one scheduling step for `record` and write the resulting
    /// commands. Returns the action taken, if any.
    pub fn service<H: HostTransport>(
        &self,
        host: &mut H,
        record: &mut DeviceRecord,
        now_ms: u64,
    ) -> Option<FeedbackAction> {
        let action = self.next_action(record, now_ms)?;
        let binding = record.binding;
        let endpoint = binding.out_endpoint?;
        for command in action.commands(binding.family) {
            debug!(address = binding.address, ?action, bytes = ?command.as_bytes(), "feedback command");
            if let Err(err) = host.write_interrupt(binding.address, endpoint, command.as_bytes()) {
                warn!(address = binding.address, error = %err, "feedback command failed");
            }
        }
        Some(action)
    }
}
