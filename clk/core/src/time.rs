//! Kernel timeout values

use core::fmt;
use core::time::Duration;

/// Bound on how long a blocking kernel call may wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timeout {
    // `None` waits forever
    millis: Option<u32>,
}

impl Timeout {
    /// Return immediately if the call would block
    pub const NO_WAIT: Self = Self { millis: Some(0) };

    /// Wait without bound
    pub const FOREVER: Self = Self { millis: None };

    /// Create a timeout from milliseconds
    pub const fn from_millis(millis: u32) -> Self {
        Self { millis: Some(millis) }
    }

    /// Create a timeout from seconds
    pub const fn from_secs(secs: u32) -> Self {
        Self {
            millis: Some(secs.saturating_mul(1000)),
        }
    }

    /// Milliseconds, or `None` for [`Timeout::FOREVER`]
    pub const fn as_millis(&self) -> Option<u32> {
        self.millis
    }

    /// Check if this is the no-wait timeout
    pub const fn is_no_wait(&self) -> bool {
        matches!(self.millis, Some(0))
    }

    /// Check if this timeout never expires
    pub const fn is_forever(&self) -> bool {
        self.millis.is_none()
    }

    /// Convert to a [`Duration`]; `None` for [`Timeout::FOREVER`]
    pub fn to_duration(&self) -> Option<Duration> {
        self.millis.map(|ms| Duration::from_millis(u64::from(ms)))
    }
}

impl From<Duration> for Timeout {
    fn from(duration: Duration) -> Self {
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        Self::from_millis(millis)
    }
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.millis {
            Some(ms) => write!(f, "{}ms", ms),
            None => write!(f, "forever"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Timeout {
    fn format(&self, fmt: defmt::Formatter) {
        match self.millis {
            Some(ms) => defmt::write!(fmt, "{}ms", ms),
            None => defmt::write!(fmt, "forever"),
        }
    }
}

/// Macro to create compile-time timeouts
#[macro_export]
macro_rules! timeout {
    ($value:literal ms) => {
        $crate::Timeout::from_millis($value)
    };
    ($value:literal s) => {
        $crate::Timeout::from_secs($value)
    };
    (forever) => {
        $crate::Timeout::FOREVER
    };
    (no_wait) => {
        $crate::Timeout::NO_WAIT
    };
}
