//! Volatile node state shared by every stage of a wake cycle.
//!
//! `NodeContext` is the single struct the codec, session guard and
//! orchestrator read from and write to.  Nothing here survives a reboot.

use crate::config::NodeConfig;
use crate::fault::ErrorMask;
use crate::proto::status::StatusWord;

// ---------------------------------------------------------------------------
// Sequence counters
// ---------------------------------------------------------------------------

/// Per-direction 8-bit wrapping packet counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceCounters {
    /// Counter of the last packet accepted from the controller.
    pub last_received: u8,
    /// Counter the next outbound packet will carry.
    pub last_sent: u8,
}

impl SequenceCounters {
    /// Boot values: the first inbound packet is expected to carry 0, and
    /// the first outbound packet carries 0.
    pub const fn boot() -> Self {
        Self {
            last_received: 0xff,
            last_sent: 0,
        }
    }

    /// Advance the inbound counter and compare it with `received`.
    ///
    /// On mismatch the counter resynchronises to `received` and `false` is
    /// returned, so one lost packet costs exactly one counter error.
    pub fn accept_inbound(&mut self, received: u8) -> bool {
        self.last_received = self.last_received.wrapping_add(1);
        if received == self.last_received {
            true
        } else {
            self.last_received = received;
            false
        }
    }

    /// Take the counter for the next outbound packet.
    pub fn next_outbound(&mut self) -> u8 {
        let c = self.last_sent;
        self.last_sent = c.wrapping_add(1);
        c
    }
}

impl Default for SequenceCounters {
    fn default() -> Self {
        Self::boot()
    }
}

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

/// Latest sampled values, reported when their status bit is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readings {
    pub battery_mv: i16,
    pub humidity_deci_pct: u16,
    pub temperature_deci_c: i16,
}

// ---------------------------------------------------------------------------
// NodeContext
// ---------------------------------------------------------------------------

pub struct NodeContext {
    // -- Configuration --
    pub config: NodeConfig,

    // -- Protocol --
    pub counters: SequenceCounters,
    /// Nesting of send/reply exchanges currently in progress.
    pub session_depth: u8,

    // -- Reporting --
    /// What the next STATUS packet reports.
    pub status: StatusWord,
    pub errors: ErrorMask,
    pub readings: Readings,

    // -- Timing --
    /// Wake cycles since boot (wrapping).  Starts one below zero so the
    /// first cycle is cycle 0.
    pub wake_counter: u32,

    // -- Hardware --
    /// Radio answered at boot.
    pub radio_present: bool,
}

impl NodeContext {
    pub fn new(config: NodeConfig) -> Self {
        Self {
            config,
            counters: SequenceCounters::boot(),
            session_depth: 0,
            status: StatusWord::default(),
            errors: ErrorMask::new(),
            readings: Readings::default(),
            wake_counter: u32::MAX,
            radio_present: true,
        }
    }
}
