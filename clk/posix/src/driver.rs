//! Simulated clock driver for POSIX

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use clk_core::ClockDriver;
use log::trace;

/// Clock driver that records every call.
///
/// Like the hardware it stands in for, the HFCLK switch does not count:
/// a second request while running just keeps it running, and one release
/// stops it.
#[derive(Debug, Default)]
pub struct SimClockDriver {
    hf_requests: AtomicUsize,
    hf_releases: AtomicUsize,
    hf_running: AtomicBool,
    calibrations: AtomicUsize,
    calibrating: AtomicBool,
}

impl SimClockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `hfclk_request` calls
    pub fn hf_request_count(&self) -> usize {
        self.hf_requests.load(Ordering::SeqCst)
    }

    /// Number of `hfclk_release` calls
    pub fn hf_release_count(&self) -> usize {
        self.hf_releases.load(Ordering::SeqCst)
    }

    /// Physical oscillator state
    pub fn hf_running(&self) -> bool {
        self.hf_running.load(Ordering::SeqCst)
    }

    /// Number of forced calibration starts
    pub fn calibration_count(&self) -> usize {
        self.calibrations.load(Ordering::SeqCst)
    }

    /// End the running calibration pass
    pub fn finish_calibration(&self) {
        self.calibrating.store(false, Ordering::SeqCst);
    }
}

impl ClockDriver for SimClockDriver {
    fn calibration_force_start(&self) {
        self.calibrations.fetch_add(1, Ordering::SeqCst);
        self.calibrating.store(true, Ordering::SeqCst);
    }

    fn calibration_in_progress(&self) -> bool {
        self.calibrating.load(Ordering::SeqCst)
    }

    fn hfclk_request(&self) {
        self.hf_requests.fetch_add(1, Ordering::SeqCst);
        if self.hf_running.swap(true, Ordering::SeqCst) {
            trace!("sim driver: HFCLK already running");
        }
    }

    fn hfclk_release(&self) {
        self.hf_releases.fetch_add(1, Ordering::SeqCst);
        self.hf_running.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_does_not_count() {
        let driver = SimClockDriver::new();
        driver.hfclk_request();
        driver.hfclk_request();
        driver.hfclk_release();

        assert!(!driver.hf_running());
        assert_eq!(driver.hf_request_count(), 2);
        assert_eq!(driver.hf_release_count(), 1);
    }

    #[test]
    fn test_calibration_flag() {
        let driver = SimClockDriver::new();
        assert!(!driver.calibration_in_progress());
        driver.calibration_force_start();
        assert!(driver.calibration_in_progress());
        driver.finish_calibration();
        assert!(!driver.calibration_in_progress());
        assert_eq!(driver.calibration_count(), 1);
    }
}
