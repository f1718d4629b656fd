//! Kernel synchronization primitive used by the blocking clock wait.

use core::fmt;

use crate::time::Timeout;

/// Reasons a semaphore take can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TakeError {
    /// The timeout elapsed before the semaphore was given.
    Timeout,
    /// A no-wait take found the semaphore unavailable.
    Busy,
}

impl fmt::Display for TakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "semaphore take timed out"),
            Self::Busy => write!(f, "semaphore unavailable"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TakeError {}

#[cfg(feature = "defmt")]
impl defmt::Format for TakeError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Timeout => defmt::write!(fmt, "Timeout"),
            Self::Busy => defmt::write!(fmt, "Busy"),
        }
    }
}

/// Binary semaphore provided by the platform kernel.
///
/// `give` may be called from any context, including the manager's
/// completion path. `take` suspends only the calling thread.
pub trait Semaphore: Send + Sync {
    /// Creates a binary semaphore with count 0 and limit 1.
    fn binary() -> Self
    where
        Self: Sized;

    /// Signals the semaphore. Giving an already given semaphore is a no-op.
    fn give(&self);

    /// Waits until the semaphore is given or `timeout` elapses.
    fn take(&self, timeout: Timeout) -> Result<(), TakeError>;
}

