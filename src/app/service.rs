//! Node service, the duty-cycle orchestrator.
//!
//! [`NodeService`] owns the node context, the reset supervisor and the
//! power scheduler.  The firmware's main loop is `boot()` once, then
//! `wake_cycle()` forever.  All I/O flows through port traits passed in at
//! each call, so the whole service runs against mock hardware.
//!
//! ```text
//!  wake ─▶ wake_counter += 1 ─▶ dry run ──nothing due──────────────┐
//!                                 │ due                             │
//!                                 ▼                                 ▼
//!         rotate errors ─▶ power up ─▶ sample ─▶ STATUS exchange ─▶ reset check ─▶ sleep
//! ```

use log::{debug, error, info, warn};

use crate::config::NodeConfig;
use crate::error::{ErrorFlag, Result};
use crate::fault::{NO_RADIO_ERRORS, ResetCause, ResetSupervisor};
use crate::irq::WakeFlag;
use crate::power::PowerScheduler;
use crate::proto::Command;
use crate::proto::status::{StatusBit, StatusReport};
use crate::scheduler::{DueWork, DutySchedule};
use crate::sensors::battery::BatteryMonitor;

use super::context::NodeContext;
use super::ports::NodeHardware;

// ───────────────────────────────────────────────────────────────
// Cycle outcome
// ───────────────────────────────────────────────────────────────

/// What one wake cycle ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing was due (or no radio); went straight back to sleep.
    Slept,
    /// A STATUS exchange ran, then the node slept.
    Reported,
    /// The reset supervisor fired; the reboot was requested.
    Rebooting(ResetCause),
}

// ───────────────────────────────────────────────────────────────
// NodeService
// ───────────────────────────────────────────────────────────────

pub struct NodeService<'a> {
    pub(super) ctx: NodeContext,
    pub(super) supervisor: ResetSupervisor,
    pub(super) power: PowerScheduler,
    pub(super) irq: &'a WakeFlag,
    schedule: DutySchedule,
    battery: BatteryMonitor,
}

impl<'a> NodeService<'a> {
    /// Construct the service.  `irq` is the flag the radio ISR signals.
    pub fn new(config: NodeConfig, irq: &'a WakeFlag) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            supervisor: ResetSupervisor::new(config.error_cycles_reset),
            power: PowerScheduler::new(&config),
            schedule: DutySchedule::new(&config),
            battery: BatteryMonitor::new(config.battery_warning_mv, config.adc_poll_limit),
            ctx: NodeContext::new(config),
            irq,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// One-time start-up: arm the safety-net watchdog, park the
    /// peripherals, and probe the radio.
    pub fn boot(&mut self, hw: &mut impl NodeHardware) {
        hw.arm_watchdog(self.ctx.config.reset_timeout);
        hw.set_watchdog_interrupt(false);
        hw.disable_peripherals();

        self.ctx.radio_present = hw.is_present();
        if self.ctx.radio_present {
            info!(
                "Node {} booted (protocol v{})",
                self.ctx.config.device_id, self.ctx.config.protocol_version
            );
        } else {
            error!("Radio not detected; running degraded until reset");
        }
    }

    /// Run one full wake cycle, ending in either sleep or a reboot request.
    pub fn wake_cycle(&mut self, hw: &mut impl NodeHardware) -> CycleOutcome {
        self.ctx.wake_counter = self.ctx.wake_counter.wrapping_add(1);
        let mut outcome = CycleOutcome::Slept;

        if self.ctx.radio_present {
            // Dry run: modulo checks only, no peripheral touched.
            let due = self.schedule.due(self.ctx.wake_counter);
            if due.any() {
                self.report(hw, due);
                outcome = CycleOutcome::Reported;
            } else {
                debug!("Cycle {}: nothing due", self.ctx.wake_counter);
            }
        } else {
            self.ctx.errors.force(NO_RADIO_ERRORS);
        }

        if let Some(cause) = self.supervisor.evaluate(self.ctx.errors.current()) {
            warn!("Cycle {}: rebooting ({cause})", self.ctx.wake_counter);
            hw.software_reset(self.ctx.config.reboot_timeout);
            return CycleOutcome::Rebooting(cause);
        }

        self.power.idle(hw, self.irq);
        outcome
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn context(&self) -> &NodeContext {
        &self.ctx
    }

    /// Mutable access for board bring-up and tests (e.g. seeding counters).
    pub fn context_mut(&mut self) -> &mut NodeContext {
        &mut self.ctx
    }

    pub fn supervisor(&self) -> &ResetSupervisor {
        &self.supervisor
    }

    /// The STATUS payload as it would be encoded right now.
    pub fn status_report(&self) -> StatusReport {
        let r = &self.ctx.readings;
        StatusReport {
            word: self.ctx.status,
            error_mask: self.ctx.errors.any(),
            elapsed_ms: 0,
            wake_counter: self.ctx.wake_counter,
            battery_mv: r.battery_mv,
            humidity_deci_pct: r.humidity_deci_pct,
            temperature_deci_c: r.temperature_deci_c,
        }
    }

    // ── Internal ──────────────────────────────────────────────

    /// Working half of a cycle: fresh error window, peripherals up, real
    /// sampling pass, one STATUS exchange, peripherals down.
    fn report(&mut self, hw: &mut impl NodeHardware, due: DueWork) {
        self.ctx.errors.rotate();
        self.ctx.status.set(StatusBit::Error, false);

        hw.enable_peripherals();
        hw.power_up_rx();
        hw.delay_ms(self.ctx.config.radio_settle_ms);

        self.sample(hw, due);
        self.exchange(hw, Command::Status, &[]);

        hw.power_down();
        hw.disable_peripherals();
    }

    /// Real pass over the due items, setting status bits and readings.
    fn sample(&mut self, hw: &mut impl NodeHardware, due: DueWork) {
        let status = &mut self.ctx.status;

        if due.battery {
            match self.battery.read(hw) {
                Ok(reading) => {
                    self.ctx.readings.battery_mv = reading.mv;
                    status.set(StatusBit::BatteryVoltage, true);
                    status.set(StatusBit::LowBattery, reading.low);
                    if reading.low {
                        warn!("Battery low: {} mV", reading.mv);
                    }
                }
                Err(e) => {
                    warn!("Battery read failed: {e}");
                    status.set(StatusBit::BatteryVoltage, false);
                }
            }
        } else {
            // Low-battery flag keeps its last measured value.
            status.set(StatusBit::BatteryVoltage, false);
        }

        status.set(StatusBit::Runtime, due.runtime);

        if due.climate {
            match hw.read_climate() {
                Ok(reading) => {
                    self.ctx.readings.humidity_deci_pct = reading.humidity_deci_pct;
                    self.ctx.readings.temperature_deci_c = reading.temperature_deci_c;
                    status.set(StatusBit::ClimateData, true);
                }
                Err(e) => {
                    warn!("Climate read failed: {e}");
                    status.set(StatusBit::ClimateData, false);
                    self.ctx.errors.set(ErrorFlag::HtRead);
                }
            }
        } else {
            status.set(StatusBit::ClimateData, false);
        }
    }
}
