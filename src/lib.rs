//! RadioNode firmware core.
//!
//! Protocol, power scheduling and self-recovery logic for a duty-cycled
//! battery-powered sensor node.  Register-level drivers for the radio,
//! ADC and watchdog live in the board image and plug in through the traits
//! in [`app::ports`]; everything here builds for the MCU (`no_std`) and for
//! the host test suite.

#![cfg_attr(not(test), no_std)]
#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod fault;
pub mod irq;
pub mod power;
pub mod proto;
pub mod scheduler;
pub mod sensors;
