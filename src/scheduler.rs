//! Periodic status work, keyed off the wake counter.
//!
//! The node has no clock; one wake cycle is one watchdog sleep interval.
//! Every periodic item fires when `wake_counter % period == 0`, so the
//! decision is a pure function of the counter and can be evaluated twice
//! per cycle: once as a side-effect-free dry run to decide whether the
//! radio needs powering at all, and once for real.
//!
//! ```text
//!  wake_counter ──▶ DutySchedule::due() ──▶ DueWork { battery, runtime, climate }
//!                                              │
//!                       any() == false ────────┴──▶ straight back to sleep
//! ```

use crate::config::NodeConfig;

/// Periodic items that can be due in a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkItem {
    /// Sample the battery rail.
    Battery,
    /// Report elapsed time and wake counter.
    Runtime,
    /// Sample humidity and temperature.
    Climate,
}

/// Result of a schedule evaluation for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DueWork {
    pub battery: bool,
    pub runtime: bool,
    pub climate: bool,
}

impl DueWork {
    /// True if this cycle needs the radio.
    pub fn any(&self) -> bool {
        self.battery || self.runtime || self.climate
    }

    pub fn contains(&self, item: WorkItem) -> bool {
        match item {
            WorkItem::Battery => self.battery,
            WorkItem::Runtime => self.runtime,
            WorkItem::Climate => self.climate,
        }
    }
}

/// Periods of every status item, in wake cycles.
#[derive(Debug, Clone, Copy)]
pub struct DutySchedule {
    battery_period: u32,
    runtime_period: u32,
    climate_period: u32,
}

impl DutySchedule {
    /// Periods are clamped to at least one cycle.
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            battery_period: config.battery_check_period.max(1),
            runtime_period: config.runtime_report_period.max(1),
            climate_period: config.climate_report_period.max(1),
        }
    }

    /// Which items fall on `wake_counter`.  Pure; safe to call as a dry run.
    pub fn due(&self, wake_counter: u32) -> DueWork {
        DueWork {
            battery: wake_counter % self.battery_period == 0,
            runtime: wake_counter % self.runtime_period == 0,
            climate: wake_counter % self.climate_period == 0,
        }
    }
}
