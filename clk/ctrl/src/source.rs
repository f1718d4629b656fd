//! Clock control sources as seen by the radio protocol stack.
//!
//! A protocol stack drives clocks through two tables of operations, one per
//! domain, plus a few static properties it uses for scheduling. These traits
//! are those tables; [`ClockCtrl`] provides both.

use clk_core::{ClkResult, ClockDriver, OnOffError, OnOffManager, OnOffOutcome, Semaphore};

use crate::ClockCtrl;

/// LFCLK operations consumed by the protocol stack.
pub trait LfclkCtrl {
    /// Block until the LFCLK runs. Only the first call waits.
    fn lfclk_wait(&self) -> ClkResult<()>;

    /// Start an LFCLK calibration pass.
    fn lfclk_calibration_start(&self);

    /// Whether a calibration pass is running.
    fn lfclk_calibration_is_enabled(&self) -> bool;

    /// Non-blocking request held until [`lfclk_release`](Self::lfclk_release).
    fn lfclk_request(&self) -> OnOffOutcome;

    /// Drop the non-blocking request, canceling it if still in flight.
    fn lfclk_release(&self) -> Result<(), OnOffError>;

    /// Clock accuracy in parts per million.
    fn accuracy_ppm(&self) -> u16;

    /// Whether the stack may start before the LFCLK reports started.
    fn skip_wait_lfclk_started(&self) -> bool;
}

/// HFCLK operations consumed by the protocol stack.
pub trait HfclkCtrl {
    /// Add an HFCLK user; the first one starts the oscillator.
    fn hfclk_request(&self);

    /// Remove an HFCLK user; the last one stops the oscillator.
    fn hfclk_release(&self);

    /// Whether any user holds the HFCLK.
    fn hfclk_is_running(&self) -> bool;

    /// Time from request until the oscillator is stable, in microseconds.
    fn startup_time_us(&self) -> u16;
}

impl<M, D, S> LfclkCtrl for ClockCtrl<M, D, S>
where
    M: OnOffManager,
    D: ClockDriver,
    S: Semaphore + 'static,
{
    fn lfclk_wait(&self) -> ClkResult<()> {
        ClockCtrl::lfclk_wait(self)
    }

    fn lfclk_calibration_start(&self) {
        ClockCtrl::lfclk_calibration_start(self)
    }

    fn lfclk_calibration_is_enabled(&self) -> bool {
        ClockCtrl::lfclk_calibration_is_enabled(self)
    }

    fn lfclk_request(&self) -> OnOffOutcome {
        ClockCtrl::lfclk_request(self)
    }

    fn lfclk_release(&self) -> Result<(), OnOffError> {
        ClockCtrl::lfclk_release(self)
    }

    fn accuracy_ppm(&self) -> u16 {
        self.config.lfclk_accuracy_ppm
    }

    fn skip_wait_lfclk_started(&self) -> bool {
        self.config.skip_wait_lfclk_started
    }
}

impl<M, D, S> HfclkCtrl for ClockCtrl<M, D, S>
where
    D: ClockDriver,
{
    fn hfclk_request(&self) {
        ClockCtrl::hfclk_request(self)
    }

    fn hfclk_release(&self) {
        ClockCtrl::hfclk_release(self)
    }

    fn hfclk_is_running(&self) -> bool {
        ClockCtrl::hfclk_is_running(self)
    }

    fn startup_time_us(&self) -> u16 {
        self.config.hfclk_startup_time_us
    }
}
