//! Humidity / temperature reading as carried in STATUS reports.

/// One sample from the climate sensor, in the wire's fixed-point units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClimateReading {
    /// Relative humidity in tenths of a percent.
    pub humidity_deci_pct: u16,
    /// Temperature in tenths of a degree Celsius.
    pub temperature_deci_c: i16,
}
