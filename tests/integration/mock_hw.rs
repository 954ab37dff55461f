//! Mock board for integration tests.
//!
//! Records every port call so tests can assert on the full hardware
//! history, and simulates a controller peer that may answer each
//! transmitted frame with one reply packet.

use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use radionode::app::ports::{BatteryAdc, ClimateSensor, PowerPort, SendStatus, Transceiver};
use radionode::config::WatchdogTimeout;
use radionode::error::SensorError;
use radionode::proto::MAX_PAYLOAD;
use radionode::sensors::climate::ClimateReading;

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum HwCall {
    ArmWatchdog(WatchdogTimeout),
    WatchdogIrq(bool),
    Sleep,
    PeripheralsOn,
    PeripheralsOff,
    SoftwareReset(WatchdogTimeout),
    RadioRx,
    RadioOff,
    Send(Vec<u8>),
    Receive(usize),
    AdcOn,
    AdcOff,
    ClimateRead,
    DelayMs(u32),
}

/// Computes the peer's reply to a transmitted frame.
pub type Peer = Box<dyn FnMut(&[u8]) -> Option<Vec<u8>>>;

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<HwCall>,
    pub present: bool,
    /// Outcome per transmitted frame; `Delivered` once exhausted.
    pub send_outcomes: VecDeque<SendStatus>,
    pub peer: Option<Peer>,
    pub adc_raw: u16,
    pub climate: Result<ClimateReading, SensorError>,
    pending_reply: Option<Vec<u8>>,
    last_outcome: SendStatus,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            present: true,
            send_outcomes: VecDeque::new(),
            peer: None,
            adc_raw: 1023,
            climate: Ok(ClimateReading {
                humidity_deci_pct: 455,
                temperature_deci_c: 215,
            }),
            pending_reply: None,
            last_outcome: SendStatus::Delivered,
        }
    }

    /// Peer that answers every frame with the same packet.
    pub fn with_peer(peer: impl FnMut(&[u8]) -> Option<Vec<u8>> + 'static) -> Self {
        Self {
            peer: Some(Box::new(peer)),
            ..Self::new()
        }
    }

    /// Frames handed to the radio, in order.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::Send(f) => Some(f.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &HwCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn reset_requested(&self) -> bool {
        self.calls
            .iter()
            .any(|c| matches!(c, HwCall::SoftwareReset(_)))
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Queue a reply for the next `data_ready` poll, bypassing the peer.
    pub fn inject(&mut self, pkt: &[u8]) {
        self.pending_reply = Some(pkt.to_vec());
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl Transceiver for MockHardware {
    fn is_present(&mut self) -> bool {
        self.present
    }

    fn send(&mut self, frame: &[u8]) {
        self.calls.push(HwCall::Send(frame.to_vec()));
        self.last_outcome = self
            .send_outcomes
            .pop_front()
            .unwrap_or(SendStatus::Delivered);
        if let Some(peer) = self.peer.as_mut() {
            self.pending_reply = (*peer)(frame);
        }
    }

    fn send_status(&mut self) -> SendStatus {
        self.last_outcome
    }

    fn data_ready(&mut self) -> bool {
        self.pending_reply.is_some()
    }

    fn receive(&mut self, buf: &mut [u8; MAX_PAYLOAD]) -> usize {
        let Some(pkt) = self.pending_reply.take() else {
            return 0;
        };
        let n = pkt.len().min(MAX_PAYLOAD);
        buf[..n].copy_from_slice(&pkt[..n]);
        self.calls.push(HwCall::Receive(n));
        n
    }

    fn power_up_rx(&mut self) {
        self.calls.push(HwCall::RadioRx);
    }

    fn power_down(&mut self) {
        self.calls.push(HwCall::RadioOff);
    }
}

impl PowerPort for MockHardware {
    fn arm_watchdog(&mut self, timeout: WatchdogTimeout) {
        self.calls.push(HwCall::ArmWatchdog(timeout));
    }

    fn set_watchdog_interrupt(&mut self, enabled: bool) {
        self.calls.push(HwCall::WatchdogIrq(enabled));
    }

    fn sleep(&mut self) {
        self.calls.push(HwCall::Sleep);
    }

    fn enable_peripherals(&mut self) {
        self.calls.push(HwCall::PeripheralsOn);
    }

    fn disable_peripherals(&mut self) {
        self.calls.push(HwCall::PeripheralsOff);
    }

    fn software_reset(&mut self, timeout: WatchdogTimeout) {
        self.calls.push(HwCall::SoftwareReset(timeout));
    }
}

impl BatteryAdc for MockHardware {
    fn enable(&mut self) {
        self.calls.push(HwCall::AdcOn);
    }

    fn disable(&mut self) {
        self.calls.push(HwCall::AdcOff);
    }

    fn start(&mut self) {}

    fn is_busy(&mut self) -> bool {
        false
    }

    fn read(&mut self) -> u16 {
        self.adc_raw
    }
}

impl ClimateSensor for MockHardware {
    fn read_climate(&mut self) -> Result<ClimateReading, SensorError> {
        self.calls.push(HwCall::ClimateRead);
        self.climate
    }
}

impl DelayNs for MockHardware {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.calls.push(HwCall::DelayMs(ms));
    }
}

// ── Packet helpers ────────────────────────────────────────────

/// Controller→device packet for device 1, protocol v0.
pub fn to_node(counter: u8, commands: &[u8]) -> Vec<u8> {
    let mut pkt = vec![0x01, counter];
    pkt.extend_from_slice(commands);
    pkt
}
