//! Node core: protocol, recovery and duty-cycle logic with no register I/O.
//!
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without a radio.

pub mod context;
pub mod ports;
pub mod service;
pub mod session;
