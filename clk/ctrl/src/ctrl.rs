//! The clock-control gate.

use core::fmt;
use core::marker::PhantomData;

use crate::config::ClockCtrlConfig;
use crate::hfclk::HfclkRefCount;
use crate::lfclk::LfclkState;

/// Clock-control gate over an on/off manager `M` for the LF domain and a
/// clock driver `D`, using semaphores of type `S` for the blocking wait.
///
/// All state lives in the gate; one instance serves the whole system.
pub struct ClockCtrl<M, D, S> {
    pub(crate) manager: M,
    pub(crate) driver: D,
    pub(crate) config: ClockCtrlConfig,
    pub(crate) lfclk: LfclkState,
    pub(crate) hfclk: HfclkRefCount,
    _sem: PhantomData<fn() -> S>,
}

impl<M, D, S> ClockCtrl<M, D, S> {
    /// Creates a gate with the default configuration.
    pub fn new(manager: M, driver: D) -> Self {
        Self::with_config(manager, driver, ClockCtrlConfig::default())
    }

    /// Creates a gate with a custom configuration.
    pub fn with_config(manager: M, driver: D, config: ClockCtrlConfig) -> Self {
        Self {
            manager,
            driver,
            config,
            lfclk: LfclkState::new(),
            hfclk: HfclkRefCount::new(),
            _sem: PhantomData,
        }
    }

    /// Configuration the gate was built with.
    pub fn config(&self) -> &ClockCtrlConfig {
        &self.config
    }

    /// The LF domain on/off manager.
    pub fn manager(&self) -> &M {
        &self.manager
    }

    /// The vendor clock driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }
}

impl<M, D, S> fmt::Debug for ClockCtrl<M, D, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClockCtrl")
            .field("name", &self.config.name)
            .field("lfclk", &self.lfclk)
            .field("hfclk_users", &self.hfclk.count())
            .finish()
    }
}
