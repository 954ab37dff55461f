//! Interrupt-to-main-loop wake flag.
//!
//! The radio IRQ handler does exactly one thing: bump a counter.  The main
//! flow reads and clears it.  This is the only state shared across
//! execution contexts.
//!
//! ```text
//! ┌─────────────┐  signal()   ┌───────────┐  is_set() / clear()  ┌───────────┐
//! │ Radio ISR   │────────────▶│ WakeFlag  │◀─────────────────────│ Main flow │
//! └─────────────┘             └───────────┘  (inside cs before   └───────────┘
//!                                             the sleep decision)
//! ```
//!
//! The watchdog ISR only exists to wake the CPU; it touches no state.

use core::sync::atomic::{AtomicU8, Ordering};

/// Single-writer / single-reader IRQ counter.
pub struct WakeFlag {
    count: AtomicU8,
}

impl WakeFlag {
    pub const fn new() -> Self {
        Self {
            count: AtomicU8::new(0),
        }
    }

    /// Record an interrupt.  Safe to call from ISR context.
    pub fn signal(&self) {
        // Single writer; no read-modify-write needed.
        let n = self.count.load(Ordering::Relaxed);
        self.count.store(n.saturating_add(1), Ordering::Release);
    }

    /// True if at least one interrupt arrived since the last [`clear`](Self::clear).
    pub fn is_set(&self) -> bool {
        self.count.load(Ordering::Acquire) != 0
    }

    /// Forget pending interrupts.  Call with interrupts masked when the
    /// result feeds a sleep decision.
    pub fn clear(&self) {
        self.count.store(0, Ordering::Release);
    }
}

impl Default for WakeFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Flag written by the radio IRQ handler of the firmware image.
pub static RADIO_IRQ: WakeFlag = WakeFlag::new();

/// Body of the radio IRQ handler.
pub fn on_radio_irq() {
    RADIO_IRQ.signal();
}
