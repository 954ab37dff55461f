//! Sensor subsystem: conversions from raw collaborator samples to the
//! fixed-point units reported over the radio.

pub mod battery;
pub mod climate;
