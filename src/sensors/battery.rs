//! Battery rail voltage via the on-chip ADC.
//!
//! One-shot conversion against VCC as reference: enable, start, poll until
//! done, read, disable.  The ADC is powered only for the duration of the
//! conversion.

use log::warn;

use crate::app::ports::BatteryAdc;
use crate::error::SensorError;

/// Reference voltage of the conversion (mV).
pub const ADC_REF_MV: i32 = 3300;

/// Full-scale raw value of the 10-bit converter.
pub const ADC_FULL_SCALE: i32 = 1023;

/// Convert a raw sample to millivolts.
pub fn raw_to_mv(raw: u16) -> i16 {
    let raw = i32::from(raw).min(ADC_FULL_SCALE);
    (ADC_REF_MV * raw / ADC_FULL_SCALE) as i16
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryReading {
    pub raw: u16,
    pub mv: i16,
    pub low: bool,
}

pub struct BatteryMonitor {
    warning_mv: i16,
    poll_limit: u16,
}

impl BatteryMonitor {
    pub fn new(warning_mv: i16, poll_limit: u16) -> Self {
        Self {
            warning_mv,
            poll_limit,
        }
    }

    /// Run one conversion.  The ADC is disabled again on every path.
    pub fn read(&self, adc: &mut impl BatteryAdc) -> Result<BatteryReading, SensorError> {
        adc.enable();
        adc.start();

        let mut polls: u16 = 0;
        while adc.is_busy() {
            polls += 1;
            if polls >= self.poll_limit {
                adc.disable();
                warn!("Battery ADC conversion stuck after {} polls", polls);
                return Err(SensorError::Timeout);
            }
        }

        let raw = adc.read();
        adc.disable();

        let mv = raw_to_mv(raw);
        Ok(BatteryReading {
            raw,
            mv,
            low: mv <= self.warning_mv,
        })
    }
}
