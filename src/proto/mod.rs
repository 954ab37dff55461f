//! Radio protocol ("communication model 1").
//!
//! Wire format shared by both directions:
//! ```text
//! ┌───────────────────────┬───────────┬─────────────────────────────┐
//! │ byte 0                │ byte 1    │ byte 2..                    │
//! │ ver(7..5) | id(4..0)  │ counter   │ opcode + operands, repeated │
//! └───────────────────────┴───────────┴─────────────────────────────┘
//! ```
//!
//! - [`codec`]: header framing and the inbound command-record reader.
//! - [`status`]: the bitmask-gated STATUS payload writer and reader.

pub mod codec;
pub mod status;

/// Hardware payload ceiling of the transceiver (bytes).
pub const MAX_PAYLOAD: usize = 32;

/// One encoded outbound packet.
pub type Frame = heapless::Vec<u8, MAX_PAYLOAD>;

/// Header (version/id + counter) plus one opcode.
pub const MIN_PACKET: usize = 3;

/// Device id accepted by every node.
pub const BROADCAST_DEVICE_ID: u8 = 0x1f;

/// Low 5 bits of byte 0.
pub const DEVICE_ID_MASK: u8 = 0x1f;

/// Shift of the version field in byte 0.
pub const VERSION_SHIFT: u8 = 5;

/// Command opcodes.
///
/// D→C: device to controller, C→D: controller to device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    /// D→C only: mandatory, as the first command.  +2 bytes status bitmask.
    Status = 0,
    /// C→D only: heartbeat.
    Nop = 1,
    /// C→D only: ping request with a 1-byte id.
    Ping = 2,
    /// D→C only: pong echoing the ping id.
    Pong = 3,
    /// C→D only: +1 byte, 0 disables, 1 resets now, n resets after n cycles.
    Reset = 4,
    /// Reserved for a radio bootloader.
    Firmware = 254,
    /// Reserved for protocol extension.
    Reserved255 = 255,
}

impl Command {
    /// Decode an opcode byte.  Unassigned values return `None`.
    pub fn from_opcode(op: u8) -> Option<Self> {
        match op {
            0 => Some(Self::Status),
            1 => Some(Self::Nop),
            2 => Some(Self::Ping),
            3 => Some(Self::Pong),
            4 => Some(Self::Reset),
            254 => Some(Self::Firmware),
            255 => Some(Self::Reserved255),
            _ => None,
        }
    }

    pub const fn opcode(self) -> u8 {
        self as u8
    }
}
