#![no_std]
#![forbid(unsafe_code)]

//! # clk-core
//!
//! Types and collaborator traits shared by the clock-control gate and its
//! platform ports. Nothing in this crate touches hardware: the on/off
//! resource manager, the vendor clock driver and the kernel semaphore are
//! described as traits and supplied by the platform.

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

use core::fmt;

pub mod driver;
pub mod onoff;
pub mod sync;
pub mod time;

pub use driver::ClockDriver;
pub use onoff::{Notify, OnOffClient, OnOffError, OnOffManager, OnOffOutcome, OnOffState};
pub use sync::{Semaphore, TakeError};
pub use time::Timeout;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type used by the clock-control gate
pub type ClkResult<T> = Result<T, ClkError>;

/// Errors reported by clock-control operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClkError {
    /// The clock did not report ready within the configured timeout
    Timeout,
    /// The semaphore refused the take for a reason other than a timeout
    Semaphore,
    /// The on/off manager rejected or failed the request
    OnOff(OnOffError),
    /// An earlier LFCLK wait failed; the clock is not usable
    LfclkUnavailable,
}

impl From<OnOffError> for ClkError {
    fn from(err: OnOffError) -> Self {
        ClkError::OnOff(err)
    }
}

impl From<TakeError> for ClkError {
    fn from(err: TakeError) -> Self {
        match err {
            TakeError::Timeout => ClkError::Timeout,
            TakeError::Busy => ClkError::Semaphore,
        }
    }
}

impl fmt::Display for ClkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClkError::Timeout => write!(f, "Clock did not become ready in time"),
            ClkError::Semaphore => write!(f, "Semaphore take failed"),
            ClkError::OnOff(err) => write!(f, "On/off manager error: {}", err),
            ClkError::LfclkUnavailable => write!(f, "Low-frequency clock is unavailable"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ClkError {}

#[cfg(feature = "defmt")]
impl defmt::Format for ClkError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ClkError::Timeout => defmt::write!(fmt, "Timeout"),
            ClkError::Semaphore => defmt::write!(fmt, "Semaphore"),
            ClkError::OnOff(err) => defmt::write!(fmt, "OnOff({})", err),
            ClkError::LfclkUnavailable => defmt::write!(fmt, "LfclkUnavailable"),
        }
    }
}
