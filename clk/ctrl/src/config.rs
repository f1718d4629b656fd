//! Clock-control configuration.

use clk_core::Timeout;

/// What to do when the boot-time LFCLK wait fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootPolicy {
    /// Panic. Nothing downstream can run without the LFCLK.
    Assert,
    /// Return the error to the caller and remember the failure.
    Report,
}

#[cfg(feature = "defmt")]
impl defmt::Format for BootPolicy {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            BootPolicy::Assert => defmt::write!(fmt, "Assert"),
            BootPolicy::Report => defmt::write!(fmt, "Report"),
        }
    }
}

/// Configuration for [`ClockCtrl`](crate::ClockCtrl).
///
/// The accuracy, skip-wait and startup-time values are advertised to the
/// radio stack through the control-source traits; the gate itself does not
/// act on them.
#[derive(Debug, Clone)]
pub struct ClockCtrlConfig {
    pub name: &'static str,
    pub lfclk_timeout: Timeout,
    pub boot_policy: BootPolicy,
    pub lfclk_accuracy_ppm: u16,
    pub skip_wait_lfclk_started: bool,
    pub hfclk_startup_time_us: u16,
}

impl Default for ClockCtrlConfig {
    fn default() -> Self {
        Self {
            name: "MPSL",
            lfclk_timeout: Timeout::from_millis(500),
            boot_policy: BootPolicy::Assert,
            lfclk_accuracy_ppm: 250,
            skip_wait_lfclk_started: false,
            hfclk_startup_time_us: 1400,
        }
    }
}

impl ClockCtrlConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ClockCtrlConfigBuilder {
        ClockCtrlConfigBuilder::default()
    }
}

/// Builder for [`ClockCtrlConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClockCtrlConfigBuilder {
    config: ClockCtrlConfig,
}

impl ClockCtrlConfigBuilder {
    /// Sets the name used as the log prefix.
    pub fn name(mut self, name: &'static str) -> Self {
        self.config.name = name;
        self
    }

    /// Sets how long the boot-time LFCLK wait may block.
    pub fn lfclk_timeout(mut self, timeout: Timeout) -> Self {
        self.config.lfclk_timeout = timeout;
        self
    }

    /// Sets the LFCLK wait failure policy.
    pub fn boot_policy(mut self, policy: BootPolicy) -> Self {
        self.config.boot_policy = policy;
        self
    }

    /// Sets the advertised LFCLK accuracy in parts per million.
    pub fn lfclk_accuracy_ppm(mut self, ppm: u16) -> Self {
        self.config.lfclk_accuracy_ppm = ppm;
        self
    }

    /// Lets the radio stack start before the LFCLK reports started.
    pub fn skip_wait_lfclk_started(mut self, skip: bool) -> Self {
        self.config.skip_wait_lfclk_started = skip;
        self
    }

    /// Sets the advertised HFCLK startup latency in microseconds.
    pub fn hfclk_startup_time_us(mut self, us: u16) -> Self {
        self.config.hfclk_startup_time_us = us;
        self
    }

    /// Builds the final configuration.
    pub fn build(self) -> ClockCtrlConfig {
        self.config
    }
}
