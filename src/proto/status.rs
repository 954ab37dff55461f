//! STATUS payload: a 16-bit status word followed by optional fields.
//!
//! Each optional field is present only when its bit is set, and fields
//! appear strictly in bit order.  Writer and reader are keyed by the same
//! word, so receivers never rely on fixed offsets.
//!
//! | Bit | Name           | Payload                                   |
//! |-----|----------------|-------------------------------------------|
//! | 0   | Error          | u16 error mask                            |
//! | 1   | Runtime        | u32 elapsed ms (placeholder) + u32 cycles |
//! | 2   | BatteryVoltage | i16 millivolts                            |
//! | 3   | LowBattery     | flag only                                 |
//! | 4   | ClimateData    | u16 humidity ‰ + i16 temperature 0.1 °C   |
//!
//! All multi-byte fields are little-endian.

/// One bit of the status word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StatusBit {
    Error = 0,
    Runtime = 1,
    BatteryVoltage = 2,
    LowBattery = 3,
    ClimateData = 4,
}

impl StatusBit {
    pub const fn mask(self) -> u16 {
        1 << (self as u8)
    }
}

/// What to report this cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusWord(pub u16);

impl StatusWord {
    pub fn set(&mut self, bit: StatusBit, on: bool) {
        if on {
            self.0 |= bit.mask();
        } else {
            self.0 &= !bit.mask();
        }
    }

    pub fn get(&self, bit: StatusBit) -> bool {
        self.0 & bit.mask() != 0
    }

    pub const fn bits(&self) -> u16 {
        self.0
    }
}

/// A complete STATUS payload (everything after the opcode byte).
///
/// Fields whose bit is unset in `word` are ignored by the writer and left
/// at their defaults by the reader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusReport {
    pub word: StatusWord,
    pub error_mask: u16,
    /// Milliseconds since boot; the node has no running clock and sends 0.
    pub elapsed_ms: u32,
    pub wake_counter: u32,
    pub battery_mv: i16,
    pub humidity_deci_pct: u16,
    pub temperature_deci_c: i16,
}

impl StatusReport {
    /// Exact number of bytes [`write`](Self::write) will produce.
    pub fn encoded_len(&self) -> usize {
        let w = self.word;
        let mut len = 2;
        if w.get(StatusBit::Error) {
            len += 2;
        }
        if w.get(StatusBit::Runtime) {
            len += 8;
        }
        if w.get(StatusBit::BatteryVoltage) {
            len += 2;
        }
        if w.get(StatusBit::ClimateData) {
            len += 4;
        }
        len
    }

    /// Serialize into `out`, which must hold [`encoded_len`](Self::encoded_len)
    /// bytes.  Returns the number of bytes written.
    pub fn write(&self, out: &mut [u8]) -> usize {
        let mut w = Writer { out, len: 0 };
        w.put(&self.word.bits().to_le_bytes());

        if self.word.get(StatusBit::Error) {
            w.put(&self.error_mask.to_le_bytes());
        }
        if self.word.get(StatusBit::Runtime) {
            w.put(&self.elapsed_ms.to_le_bytes());
            w.put(&self.wake_counter.to_le_bytes());
        }
        if self.word.get(StatusBit::BatteryVoltage) {
            w.put(&self.battery_mv.to_le_bytes());
        }
        if self.word.get(StatusBit::ClimateData) {
            w.put(&self.humidity_deci_pct.to_le_bytes());
            w.put(&self.temperature_deci_c.to_le_bytes());
        }
        w.len
    }

    /// Parse a STATUS payload.  Returns `None` if a field announced by the
    /// word is missing or bytes are left over.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        let mut r = Reader { buf: payload };
        let word = StatusWord(u16::from_le_bytes(r.take()?));
        let mut report = Self {
            word,
            ..Self::default()
        };

        if word.get(StatusBit::Error) {
            report.error_mask = u16::from_le_bytes(r.take()?);
        }
        if word.get(StatusBit::Runtime) {
            report.elapsed_ms = u32::from_le_bytes(r.take()?);
            report.wake_counter = u32::from_le_bytes(r.take()?);
        }
        if word.get(StatusBit::BatteryVoltage) {
            report.battery_mv = i16::from_le_bytes(r.take()?);
        }
        if word.get(StatusBit::ClimateData) {
            report.humidity_deci_pct = u16::from_le_bytes(r.take()?);
            report.temperature_deci_c = i16::from_le_bytes(r.take()?);
        }

        r.buf.is_empty().then_some(report)
    }
}

struct Writer<'a> {
    out: &'a mut [u8],
    len: usize,
}

impl Writer<'_> {
    fn put(&mut self, bytes: &[u8]) {
        self.out[self.len..self.len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
    }
}

struct Reader<'a> {
    buf: &'a [u8],
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let (head, rest) = self.buf.split_first_chunk::<N>()?;
        self.buf = rest;
        Some(*head)
    }
}
