//! Error accumulation and self-reset state machine.
//!
//! ## Error mask lifecycle
//!
//! 1. Any component latches an [`ErrorFlag`] into `current` during a cycle.
//! 2. At the start of the next working cycle `current` moves to `previous`
//!    and is cleared.
//! 3. STATUS reports carry `current | previous`, so a transient error stays
//!    visible to the controller for exactly one extra cycle.
//!
//! ## Reset supervisor
//!
//! ```text
//!   NORMAL ──(error cycles ≥ ceiling  or  countdown hits 0)──▶ RESETTING
//! ```
//!
//! `RESETTING` is terminal: the node reboots and every counter here is
//! wiped with the rest of RAM.

use core::fmt;

use log::{error, info, warn};

use crate::error::ErrorFlag;

/// Sentinel error mask for a node whose radio never answered.
pub const NO_RADIO_ERRORS: u16 = 0xffff;

// ---------------------------------------------------------------------------
// Error mask
// ---------------------------------------------------------------------------

/// Current-cycle and previous-cycle error bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorMask {
    current: u16,
    previous: u16,
}

impl ErrorMask {
    pub const fn new() -> Self {
        Self {
            current: 0,
            previous: 0,
        }
    }

    /// Latch a flag for this cycle.
    pub fn set(&mut self, flag: ErrorFlag) {
        if self.current & flag.mask() == 0 {
            warn!("Error flag set: {flag}");
        }
        self.current |= flag.mask();
    }

    /// Overwrite the current mask wholesale (degraded no-radio mode).
    pub fn force(&mut self, mask: u16) {
        self.current = mask;
    }

    /// Move `current` into `previous` and start a clean cycle.
    pub fn rotate(&mut self) {
        self.previous = self.current;
        self.current = 0;
    }

    /// Errors seen this cycle or the one before.
    pub fn any(&self) -> u16 {
        self.current | self.previous
    }

    pub fn current(&self) -> u16 {
        self.current
    }

    pub fn previous(&self) -> u16 {
        self.previous
    }

    pub fn has(&self, flag: ErrorFlag) -> bool {
        self.current & flag.mask() != 0
    }
}

// ---------------------------------------------------------------------------
// Reset supervisor
// ---------------------------------------------------------------------------

/// Why the node decided to reboot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetCause {
    /// Too many consecutive cycles ended with errors.
    ErrorCycles,
    /// The controller's RESET countdown expired.
    Countdown,
}

impl fmt::Display for ResetCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ErrorCycles => write!(f, "consecutive error cycles"),
            Self::Countdown => write!(f, "reset countdown expired"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Normal,
    Resetting(ResetCause),
}

/// Tracks consecutive erroring cycles and the controller's reset countdown.
#[derive(Debug, Clone)]
pub struct ResetSupervisor {
    ceiling: u16,
    /// Saturating count of consecutive cycles that ended with errors.
    error_cycles: u16,
    /// 0 = disabled.
    countdown: u8,
    state: NodeState,
}

impl ResetSupervisor {
    pub fn new(ceiling: u16) -> Self {
        Self {
            ceiling,
            error_cycles: 0,
            countdown: 0,
            state: NodeState::Normal,
        }
    }

    /// Store a RESET operand verbatim: 0 disables, n resets after n
    /// evaluations.
    pub fn set_countdown(&mut self, cycles: u8) {
        if cycles == 0 {
            info!("Reset countdown disabled");
        } else {
            info!("Reset countdown set to {} cycles", cycles);
        }
        self.countdown = cycles;
    }

    /// End-of-cycle evaluation.  `cycle_errors` is the cycle's `current`
    /// error mask.
    ///
    /// Both conditions are evaluated every call; the error-cycle ceiling is
    /// checked first and wins if both fire together.
    pub fn evaluate(&mut self, cycle_errors: u16) -> Option<ResetCause> {
        if cycle_errors != 0 {
            self.error_cycles = self.error_cycles.saturating_add(1);
        } else {
            self.error_cycles = 0;
        }

        let mut cause = None;

        if self.error_cycles >= self.ceiling {
            cause = Some(ResetCause::ErrorCycles);
        }

        if self.countdown > 0 {
            self.countdown -= 1;
            if self.countdown == 0 {
                cause = cause.or(Some(ResetCause::Countdown));
            }
        }

        if let Some(c) = cause {
            if self.state == NodeState::Normal {
                error!("Software reset: {c}");
                self.state = NodeState::Resetting(c);
            }
        }

        match self.state {
            NodeState::Resetting(c) => Some(c),
            NodeState::Normal => None,
        }
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn error_cycles(&self) -> u16 {
        self.error_cycles
    }

    pub fn countdown(&self) -> u8 {
        self.countdown
    }
}
