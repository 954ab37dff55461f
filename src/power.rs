//! Power/retry scheduler.
//!
//! Turns "wait for the hardware" into watchdog-bounded sleep intervals.
//! The watchdog plays two roles:
//!
//! ```text
//!            arm(power_down), irq on          arm(reset), irq off
//!   awake ──────────────────────────▶ sleep ─────────────────────────▶ awake
//!     ▲                                 │ wake: watchdog irq or radio irq   │
//!     └─────────────────────────────────┴───────────────────────────────────┘
//! ```
//!
//! While asleep it is a periodic wake source; while awake it is a reset
//! safety net in case control never comes back.  [`PowerScheduler::power_down`]
//! is the only suspension point of the node.

use log::{debug, warn};

use crate::app::ports::{PowerPort, SendStatus, Transceiver};
use crate::config::{NodeConfig, WatchdogTimeout};
use crate::irq::WakeFlag;

/// Bounded sleep and transmit-and-wait primitives.
#[derive(Debug, Clone)]
pub struct PowerScheduler {
    power_down_timeout: WatchdogTimeout,
    reset_timeout: WatchdogTimeout,
    send_sleep_limit: u8,
}

impl PowerScheduler {
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            power_down_timeout: config.power_down_timeout,
            reset_timeout: config.reset_timeout,
            send_sleep_limit: config.send_sleep_limit,
        }
    }

    /// One bounded sleep.
    ///
    /// Skips the sleep if `irq` is already set.  The check and the sleep
    /// instruction share one critical section so an interrupt cannot slip
    /// in between them.  Returns `true` if the CPU actually slept.
    pub fn power_down(&self, hw: &mut impl PowerPort, irq: &WakeFlag) -> bool {
        self.bounded_sleep(hw, irq, false)
    }

    /// End-of-cycle sleep.  Drops an IRQ left over from the cycle's own
    /// exchange, then sleeps until the next watchdog tick or a fresh IRQ.
    pub fn idle(&self, hw: &mut impl PowerPort, irq: &WakeFlag) {
        self.bounded_sleep(hw, irq, true);
    }

    /// Hand `frame` to the radio and sleep until it reports an outcome.
    ///
    /// Ends when the radio leaves [`SendStatus::InProgress`], the radio IRQ
    /// fires, or `send_sleep_limit` sleeps have elapsed.  The final status
    /// register decides the outcome; anything but `Delivered` is a failure.
    /// No retry happens here.
    pub fn transmit<H>(&self, hw: &mut H, irq: &WakeFlag, frame: &[u8]) -> SendStatus
    where
        H: Transceiver + PowerPort,
    {
        irq.clear();
        hw.send(frame);

        let mut sleeps: u8 = 0;
        while hw.send_status() == SendStatus::InProgress && !irq.is_set() {
            if sleeps >= self.send_sleep_limit {
                warn!("Transmit still pending after {} sleeps", sleeps);
                break;
            }
            self.power_down(hw, irq);
            sleeps += 1;
        }

        match hw.send_status() {
            SendStatus::Delivered => {
                debug!("Frame delivered ({} bytes, {} sleeps)", frame.len(), sleeps);
                SendStatus::Delivered
            }
            _ => SendStatus::Failed,
        }
    }

    fn bounded_sleep(&self, hw: &mut impl PowerPort, irq: &WakeFlag, drop_stale: bool) -> bool {
        hw.arm_watchdog(self.power_down_timeout);
        hw.set_watchdog_interrupt(true);

        let slept = critical_section::with(|_| {
            if drop_stale {
                irq.clear();
            }
            if irq.is_set() {
                false
            } else {
                hw.sleep();
                true
            }
        });

        hw.arm_watchdog(self.reset_timeout);
        hw.set_watchdog_interrupt(false);
        slept
    }
}
