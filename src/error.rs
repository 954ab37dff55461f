//! Unified error types for the radio node.
//!
//! Two families live here:
//!
//! - [`ErrorFlag`]: the protocol-level error taxonomy.  These never travel
//!   as return values; they are latched into the per-cycle error mask and
//!   reported to the controller in the next STATUS packet.
//! - [`Error`] and its sub-enums: typed failures from collaborators and
//!   configuration, which the service converts into error flags at the
//!   port boundary.

use core::fmt;

// ---------------------------------------------------------------------------
// Error flags (wire-visible)
// ---------------------------------------------------------------------------

/// One bit of the 16-bit error mask carried in STATUS reports.
///
/// The discriminant is the bit index on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorFlag {
    /// Inbound packet carried an unsupported protocol version.  Aborts the parse.
    ProtoVersion = 0,
    /// Inbound sequence counter did not follow the expected value.
    WrongCounter = 1,
    /// Inbound opcode is not part of the command set.  Aborts the parse.
    UnknownCommand = 2,
    /// Inbound opcode is valid but only ever sent by devices.
    UnexpectedCommand = 3,
    /// The transceiver reported a failed delivery.
    CantDeliver = 4,
    /// Reply chain nested deeper than the session guard allows.
    CommDepth = 5,
    /// Humidity/temperature sensor read failed.
    HtRead = 6,
    /// Internal: encode requested for a command the node never sends.
    EncodeUnsupported = 7,
    /// Internal: encoded frame would exceed the radio payload ceiling.
    EncodeOversize = 8,
}

impl ErrorFlag {
    /// Bit index inside the error mask.
    pub const fn bit(self) -> u8 {
        self as u8
    }

    /// Return the bitmask for this flag.
    pub const fn mask(self) -> u16 {
        1 << (self as u8)
    }
}

impl fmt::Display for ErrorFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProtoVersion => write!(f, "protocol version mismatch"),
            Self::WrongCounter => write!(f, "wrong sequence counter"),
            Self::UnknownCommand => write!(f, "unknown command"),
            Self::UnexpectedCommand => write!(f, "unexpected command"),
            Self::CantDeliver => write!(f, "cannot deliver"),
            Self::CommDepth => write!(f, "reply chain too deep"),
            Self::HtRead => write!(f, "humidity/temperature read failed"),
            Self::EncodeUnsupported => write!(f, "internal: unsupported encode command"),
            Self::EncodeOversize => write!(f, "internal: frame exceeds payload ceiling"),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible collaborator or configuration call funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read.
    Sensor(SensorError),
    /// Configuration is invalid.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Sensor did not acknowledge on its bus.
    NoResponse,
    /// Conversion did not finish within the poll budget.
    Timeout,
    /// Reading failed its checksum.
    Checksum,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoResponse => write!(f, "no response"),
            Self::Timeout => write!(f, "conversion timed out"),
            Self::Checksum => write!(f, "checksum mismatch"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// A configuration field failed range validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Device id collides with the broadcast id or exceeds 5 bits.
    DeviceId,
    /// Protocol version does not fit in 3 bits.
    ProtocolVersion,
    /// A period or ceiling that must be nonzero is zero.
    /// The `&'static str` names the field.
    Zero(&'static str),
    /// Reply chain depth outside `1..=MAX_SESSION_DEPTH_LIMIT`.
    SessionDepth,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceId => write!(f, "device id must be in 0..=30"),
            Self::ProtocolVersion => write!(f, "protocol version must be in 0..=7"),
            Self::Zero(field) => write!(f, "{field} must be nonzero"),
            Self::SessionDepth => write!(
                f,
                "max session depth must be in 1..={}",
                crate::config::MAX_SESSION_DEPTH_LIMIT
            ),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
