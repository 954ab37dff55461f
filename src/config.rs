//! Node configuration parameters
//!
//! All tunable parameters for the sensor node.  Defaults are the values the
//! node ships with; periods are expressed in wake cycles (one cycle is one
//! power-down watchdog interval, ~8 s).

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Deepest reply chain a configuration may allow.  Each level is one
/// stack frame of `exchange` plus a packet buffer.
pub const MAX_SESSION_DEPTH_LIMIT: u8 = 8;

/// Hardware watchdog prescaler steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WatchdogTimeout {
    Ms15,
    Ms30,
    Ms60,
    Ms120,
    Ms250,
    Ms500,
    S1,
    S2,
    S4,
    S8,
}

impl WatchdogTimeout {
    /// Nominal timeout in milliseconds.
    pub const fn as_millis(self) -> u32 {
        match self {
            Self::Ms15 => 15,
            Self::Ms30 => 30,
            Self::Ms60 => 60,
            Self::Ms120 => 120,
            Self::Ms250 => 250,
            Self::Ms500 => 500,
            Self::S1 => 1000,
            Self::S2 => 2000,
            Self::S4 => 4000,
            Self::S8 => 8000,
        }
    }
}

/// Core node configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    // --- Identity ---
    /// This node's 5-bit device id (0..=30; 31 is broadcast)
    pub device_id: u8,
    /// Radio protocol version (3 bits)
    pub protocol_version: u8,

    // --- Battery ---
    /// Low-battery warning threshold (mV)
    pub battery_warning_mv: i16,

    // --- Periods (wake cycles) ---
    /// Battery voltage check period
    pub battery_check_period: u32,
    /// Run-time report period
    pub runtime_report_period: u32,
    /// Humidity/temperature report period
    pub climate_report_period: u32,

    // --- Recovery ---
    /// Consecutive erroring cycles before a software reset
    pub error_cycles_reset: u16,
    /// Maximum nesting of send/reply exchanges
    pub max_session_depth: u8,

    // --- Timing ---
    /// Watchdog interrupt interval while sleeping
    pub power_down_timeout: WatchdogTimeout,
    /// Watchdog reset interval while awake
    pub reset_timeout: WatchdogTimeout,
    /// Watchdog interval used to force a reboot
    pub reboot_timeout: WatchdogTimeout,
    /// Radio settle time after power-up (ms)
    pub radio_settle_ms: u32,
    /// Sleep iterations allowed while a transmission is pending
    pub send_sleep_limit: u8,
    /// ADC busy polls allowed for one battery conversion
    pub adc_poll_limit: u16,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            // Identity
            device_id: 0x01,
            protocol_version: 0x0,

            // Battery
            battery_warning_mv: 1800,

            // Periods
            battery_check_period: 300 / 8, // ~5 min
            runtime_report_period: 8 / 8,  // every cycle
            climate_report_period: 300 / 8, // ~5 min

            // Recovery
            error_cycles_reset: (3600 * 24 / 8) as u16, // one day
            max_session_depth: 2,

            // Timing
            power_down_timeout: WatchdogTimeout::S8,
            reset_timeout: WatchdogTimeout::S2,
            reboot_timeout: WatchdogTimeout::Ms15,
            radio_settle_ms: 5,
            send_sleep_limit: 4,
            adc_poll_limit: 1000,
        }
    }
}

impl NodeConfig {
    /// Reject values the node cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device_id >= crate::proto::BROADCAST_DEVICE_ID {
            return Err(ConfigError::DeviceId);
        }
        if self.protocol_version > 0b111 {
            return Err(ConfigError::ProtocolVersion);
        }
        if self.battery_check_period == 0 {
            return Err(ConfigError::Zero("battery_check_period"));
        }
        if self.runtime_report_period == 0 {
            return Err(ConfigError::Zero("runtime_report_period"));
        }
        if self.climate_report_period == 0 {
            return Err(ConfigError::Zero("climate_report_period"));
        }
        if self.error_cycles_reset == 0 {
            return Err(ConfigError::Zero("error_cycles_reset"));
        }
        if !(1..=MAX_SESSION_DEPTH_LIMIT).contains(&self.max_session_depth) {
            return Err(ConfigError::SessionDepth);
        }
        if self.send_sleep_limit == 0 {
            return Err(ConfigError::Zero("send_sleep_limit"));
        }
        Ok(())
    }
}
