//! HFCLK reference counting.
//!
//! The radio driver's HFCLK request/release entry points are plain on/off
//! switches. [`HfclkRefCount`] decides which caller gets to flip them: only
//! the caller whose update moved the count off zero requests, and only the
//! caller whose update brought it back to zero releases.

use core::sync::atomic::{AtomicU32, Ordering};

use clk_core::ClockDriver;
use log::{trace, warn};

use crate::ClockCtrl;

/// Logical HFCLK state derived from the reference count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HfclkState {
    /// No users.
    Idle,
    /// At least one user.
    Active,
}

#[cfg(feature = "defmt")]
impl defmt::Format for HfclkState {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            HfclkState::Idle => defmt::write!(fmt, "Idle"),
            HfclkState::Active => defmt::write!(fmt, "Active"),
        }
    }
}

/// Atomic HFCLK user count.
#[derive(Debug, Default)]
pub struct HfclkRefCount {
    count: AtomicU32,
}

impl HfclkRefCount {
    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
        }
    }

    /// Adds a user. Returns `true` if this call moved the count from 0 to 1.
    ///
    /// Saturates at `u32::MAX`; a saturated acquire is dropped.
    pub fn acquire(&self) -> bool {
        match self
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| c.checked_add(1))
        {
            Ok(prev) => prev == 0,
            Err(_) => {
                warn!("HFCLK refcount saturated");
                false
            }
        }
    }

    /// Removes a user. Returns `true` if this call moved the count from 1 to 0.
    ///
    /// A release at zero leaves the count at zero.
    pub fn release(&self) -> bool {
        match self
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| c.checked_sub(1))
        {
            Ok(prev) => prev == 1,
            Err(_) => {
                warn!("HFCLK release without request");
                false
            }
        }
    }

    /// Current number of users.
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Acquire)
    }

    pub fn state(&self) -> HfclkState {
        if self.count() > 0 {
            HfclkState::Active
        } else {
            HfclkState::Idle
        }
    }
}

/// HFCLK user handle. Releases its reference when dropped.
#[must_use = "the HFCLK is released as soon as the guard is dropped"]
pub struct HfclkGuard<'a, M, D: ClockDriver, S> {
    ctrl: &'a ClockCtrl<M, D, S>,
}

impl<'a, M, D: ClockDriver, S> HfclkGuard<'a, M, D, S> {
    pub(crate) fn new(ctrl: &'a ClockCtrl<M, D, S>) -> Self {
        ctrl.hfclk_request();
        Self { ctrl }
    }
}

impl<M, D: ClockDriver, S> Drop for HfclkGuard<'_, M, D, S> {
    fn drop(&mut self) {
        self.ctrl.hfclk_release();
    }
}

impl<M, D: ClockDriver, S> ClockCtrl<M, D, S> {
    /// Requests the HFCLK; the driver is called only for the first user.
    pub fn hfclk_request(&self) {
        if self.hfclk.acquire() {
            trace!("{}: HFCLK request (0 -> 1)", self.config.name);
            self.driver.hfclk_request();
        }
    }

    /// Releases the HFCLK; the driver is called only for the last user.
    pub fn hfclk_release(&self) {
        if self.hfclk.release() {
            trace!("{}: HFCLK release (1 -> 0)", self.config.name);
            self.driver.hfclk_release();
        }
    }

    /// Reports the HFCLK as running as soon as any user holds it.
    ///
    /// Oscillator startup latency is not modelled; consumers plan for it with
    /// the advertised startup time.
    pub fn hfclk_is_running(&self) -> bool {
        self.hfclk.count() > 0
    }

    /// Requests the HFCLK and returns a guard that releases it on drop.
    pub fn hfclk_acquire(&self) -> HfclkGuard<'_, M, D, S> {
        HfclkGuard::new(self)
    }

    /// Current number of HFCLK users.
    pub fn hfclk_users(&self) -> u32 {
        self.hfclk.count()
    }

    pub fn hfclk_state(&self) -> HfclkState {
        self.hfclk.state()
    }
}
