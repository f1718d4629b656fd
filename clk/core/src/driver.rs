//! Vendor clock driver entry points

use alloc::sync::Arc;

/// Hardware-specific clock control supplied by the platform.
///
/// The HFCLK entry points do not count references: every `hfclk_request`
/// starts the oscillator request and every `hfclk_release` drops it,
/// regardless of how many callers asked. Counting is the gate's job.
pub trait ClockDriver {
    /// Start an LFCLK calibration pass immediately.
    fn calibration_force_start(&self);

    /// Check if an LFCLK calibration pass is running.
    fn calibration_in_progress(&self) -> bool;

    /// Request the HFCLK for the radio.
    fn hfclk_request(&self);

    /// Release the HFCLK for the radio.
    fn hfclk_release(&self);
}

impl<D: ClockDriver + ?Sized> ClockDriver for &D {
    fn calibration_force_start(&self) {
        (**self).calibration_force_start()
    }

    fn calibration_in_progress(&self) -> bool {
        (**self).calibration_in_progress()
    }

    fn hfclk_request(&self) {
        (**self).hfclk_request()
    }

    fn hfclk_release(&self) {
        (**self).hfclk_release()
    }
}

impl<D: ClockDriver + ?Sized> ClockDriver for Arc<D> {
    fn calibration_force_start(&self) {
        (**self).calibration_force_start()
    }

    fn calibration_in_progress(&self) -> bool {
        (**self).calibration_in_progress()
    }

    fn hfclk_request(&self) {
        (**self).hfclk_request()
    }

    fn hfclk_release(&self) {
        (**self).hfclk_release()
    }
}
