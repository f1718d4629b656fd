//! # clk-posix
//!
//! Host port of the clock-control collaborators. Provides a standard-library
//! semaphore and simulated stand-ins for the platform on/off manager and the
//! vendor clock driver, so the gate can run and be tested on Linux/Unix.
//! Linking this crate also installs the `std` critical-section
//! implementation.

pub mod driver;
pub mod onoff;
pub mod semaphore;

pub use driver::SimClockDriver;
pub use onoff::{SimOnOffManager, Transition, MAX_PENDING};
pub use semaphore::StdSemaphore;
