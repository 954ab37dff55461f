//! Port traits: the hexagonal boundary between node logic and hardware.
//!
//! ```text
//!   Driver ──▶ Port trait ──▶ NodeService (domain)
//! ```
//!
//! Register-level drivers (radio over SPI, ADC, watchdog, sleep controller)
//! implement these traits.  [`NodeService`](super::service::NodeService)
//! consumes them via generics, so the protocol and recovery logic never
//! touch registers directly and run unchanged against host mocks.

use embedded_hal::delay::DelayNs;

use crate::config::WatchdogTimeout;
use crate::error::SensorError;
use crate::proto::MAX_PAYLOAD;
use crate::sensors::climate::ClimateReading;

// ───────────────────────────────────────────────────────────────
// Transceiver port
// ───────────────────────────────────────────────────────────────

/// Progress of the last transmission, as reported by the radio's own
/// status register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    /// Still transmitting or waiting for an auto-acknowledge.
    InProgress,
    /// Acknowledged by the peer.
    Delivered,
    /// Retransmit budget exhausted without acknowledge.
    Failed,
}

/// Short-range packet radio.
pub trait Transceiver {
    /// True if the chip answers on its bus.  Queried once at boot.
    fn is_present(&mut self) -> bool;

    /// Load `frame` into the TX FIFO and start transmitting.
    fn send(&mut self, frame: &[u8]);

    /// Poll the outcome of the last [`send`](Self::send).
    fn send_status(&mut self) -> SendStatus;

    /// True if a received packet is waiting in the RX FIFO.
    fn data_ready(&mut self) -> bool;

    /// Move one received packet into `buf`.  Returns its length, which is
    /// 0 if the FIFO held nothing usable.
    fn receive(&mut self, buf: &mut [u8; MAX_PAYLOAD]) -> usize;

    /// Power up in receive mode.
    fn power_up_rx(&mut self);

    /// Enter the radio's power-down mode.
    fn power_down(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Power port (watchdog + sleep controller)
// ───────────────────────────────────────────────────────────────

/// Watchdog and sleep primitives of the MCU.
pub trait PowerPort {
    /// (Re)start the watchdog with the given timeout.
    fn arm_watchdog(&mut self, timeout: WatchdogTimeout);

    /// `true`: watchdog expiry raises an interrupt (wake source).
    /// `false`: watchdog expiry resets the MCU.
    fn set_watchdog_interrupt(&mut self, enabled: bool);

    /// Enter the deepest sleep mode.  Called with interrupts masked;
    /// implementations must unmask atomically with the sleep instruction so
    /// an interrupt between the caller's check and the sleep still wakes
    /// the CPU.  Returns on any wake source.
    fn sleep(&mut self);

    /// Power the serial interface used by the radio.
    fn enable_peripherals(&mut self);

    /// Cut power to the serial interface.
    fn disable_peripherals(&mut self);

    /// Reboot via watchdog timeout with interrupts masked.  Hardware
    /// implementations never return.
    fn software_reset(&mut self, timeout: WatchdogTimeout);
}

// ───────────────────────────────────────────────────────────────
// ADC port (battery sampling)
// ───────────────────────────────────────────────────────────────

/// Single-channel ADC wired to the battery rail.
pub trait BatteryAdc {
    fn enable(&mut self);
    fn disable(&mut self);
    /// Start one conversion.
    fn start(&mut self);
    /// True while the conversion is running.
    fn is_busy(&mut self) -> bool;
    /// 10-bit raw sample of the last conversion.
    fn read(&mut self) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Climate port
// ───────────────────────────────────────────────────────────────

/// Humidity / temperature sensor.
pub trait ClimateSensor {
    fn read_climate(&mut self) -> Result<ClimateReading, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Aggregate
// ───────────────────────────────────────────────────────────────

/// Everything one wake cycle touches.
///
/// A single `&mut` of this type is threaded through the whole cycle,
/// including nested reply exchanges, which avoids juggling several mutable
/// borrows of the board.
pub trait NodeHardware: Transceiver + PowerPort + BatteryAdc + ClimateSensor + DelayNs {}

impl<T> NodeHardware for T where T: Transceiver + PowerPort + BatteryAdc + ClimateSensor + DelayNs {}
