//! Packet header framing and command-record reader.
//!
//! Decoding never reads past the received slice: every operand is
//! bounds-checked before it is consumed, and the reader stops for good on
//! the first malformed record.  Corrupted framing is never guessed past.

use super::{BROADCAST_DEVICE_ID, Command, DEVICE_ID_MASK, MIN_PACKET, VERSION_SHIFT};

/// Size of the fixed header (version/id byte + counter byte).
pub const HEADER_SIZE: usize = 2;

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Decoded packet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u8,
    pub device_id: u8,
    pub counter: u8,
}

impl Header {
    /// Parse the header of an inbound packet.
    ///
    /// Returns `None` for frames shorter than [`MIN_PACKET`]; such frames
    /// are partial and not worth flagging.
    pub fn parse(pkt: &[u8]) -> Option<Self> {
        if pkt.len() < MIN_PACKET {
            return None;
        }
        Some(Self {
            version: pkt[0] >> VERSION_SHIFT,
            device_id: pkt[0] & DEVICE_ID_MASK,
            counter: pkt[1],
        })
    }

    /// True if the packet targets `own_id` or the broadcast id.
    pub fn addressed_to(&self, own_id: u8) -> bool {
        self.device_id == own_id || self.device_id == BROADCAST_DEVICE_ID
    }

    /// The packed version/id byte.
    pub const fn id_byte(&self) -> u8 {
        (self.version << VERSION_SHIFT) | (self.device_id & DEVICE_ID_MASK)
    }

    /// Write the header into the first [`HEADER_SIZE`] bytes of `out`.
    /// Returns the number of bytes written.
    pub fn write(&self, out: &mut [u8]) -> usize {
        out[0] = self.id_byte();
        out[1] = self.counter;
        HEADER_SIZE
    }
}

// ---------------------------------------------------------------------------
// Command records
// ---------------------------------------------------------------------------

/// One controller-to-device command record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record {
    Nop,
    Ping(u8),
    Pong(u8),
    Reset(u8),
}

/// Reasons the command stream stops early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    /// Opcode outside the controller-to-device set.
    Unknown(u8),
    /// The opcode's operand lies beyond the received bytes.
    Truncated(Command),
}

/// Iterator over the command records that follow the header.
///
/// Yields `Err` at most once, then fuses.
pub struct Records<'a> {
    stream: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> Records<'a> {
    /// Reader over a full packet; skips the header.
    pub fn new(pkt: &'a [u8]) -> Self {
        Self {
            stream: pkt,
            pos: HEADER_SIZE,
            done: false,
        }
    }

    fn operand(&mut self, cmd: Command) -> Result<u8, RecordError> {
        match self.stream.get(self.pos) {
            Some(&b) => {
                self.pos += 1;
                Ok(b)
            }
            None => Err(RecordError::Truncated(cmd)),
        }
    }
}

impl Iterator for Records<'_> {
    type Item = Result<Record, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let &op = self.stream.get(self.pos)?;
        self.pos += 1;

        let item = match Command::from_opcode(op) {
            Some(Command::Nop) => Ok(Record::Nop),
            Some(cmd @ Command::Ping) => self.operand(cmd).map(Record::Ping),
            Some(cmd @ Command::Pong) => self.operand(cmd).map(Record::Pong),
            Some(cmd @ Command::Reset) => self.operand(cmd).map(Record::Reset),
            _ => Err(RecordError::Unknown(op)),
        };

        if item.is_err() {
            self.done = true;
        }
        Some(item)
    }
}
