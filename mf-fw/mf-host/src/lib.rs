//! Desktop host for the MobiFlight device core.
//!
//! Runs the same producer/consumer pair as the firmware: a reader thread bound
//! to stdin or a serial port feeds the ring buffer, and the main thread runs
//! the device loop.

pub mod args;
pub mod buttons;
pub mod config;
pub mod device_loop;
pub mod screen;
pub mod shutdown;
pub mod transport;

pub use device_loop::run_device_loop;
