//! LFCLK control: boot-time readiness wait, calibration pass-through and the
//! long-lived non-blocking request.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use clk_core::{
    ClkError, ClkResult, ClockDriver, OnOffClient, OnOffError, OnOffManager, OnOffOutcome,
    OnOffState, Semaphore,
};
use log::{debug, error, trace, warn};

use crate::config::BootPolicy;
use crate::wait::blocking_wait;
use crate::ClockCtrl;

const LATCH_IDLE: u8 = 0;
const LATCH_WAITING: u8 = 1;
const LATCH_READY: u8 = 2;
const LATCH_FAILED: u8 = 3;

/// Progress of the boot-time LFCLK wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LfclkStatus {
    NotStarted,
    Waiting,
    Ready,
    Failed,
}

#[cfg(feature = "defmt")]
impl defmt::Format for LfclkStatus {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            LfclkStatus::NotStarted => defmt::write!(fmt, "NotStarted"),
            LfclkStatus::Waiting => defmt::write!(fmt, "Waiting"),
            LfclkStatus::Ready => defmt::write!(fmt, "Ready"),
            LfclkStatus::Failed => defmt::write!(fmt, "Failed"),
        }
    }
}

/// Per-gate LFCLK state.
#[derive(Debug)]
pub(crate) struct LfclkState {
    latch: AtomicU8,
    client: OnOffClient,
    held: AtomicBool,
}

impl LfclkState {
    pub(crate) fn new() -> Self {
        Self {
            latch: AtomicU8::new(LATCH_IDLE),
            client: OnOffClient::spin_wait(),
            held: AtomicBool::new(false),
        }
    }

    /// Waits out the first caller's wait and reports its result.
    fn settled(&self) -> ClkResult<()> {
        loop {
            match self.latch.load(Ordering::Acquire) {
                LATCH_WAITING => core::hint::spin_loop(),
                LATCH_FAILED => return Err(ClkError::LfclkUnavailable),
                _ => return Ok(()),
            }
        }
    }

    fn status(&self) -> LfclkStatus {
        match self.latch.load(Ordering::Acquire) {
            LATCH_IDLE => LfclkStatus::NotStarted,
            LATCH_WAITING => LfclkStatus::Waiting,
            LATCH_READY => LfclkStatus::Ready,
            _ => LfclkStatus::Failed,
        }
    }
}

impl<M, D, S> ClockCtrl<M, D, S>
where
    M: OnOffManager,
    S: Semaphore + 'static,
{
    /// Blocks until the LFCLK is ready. Only the first call does any work.
    ///
    /// The first caller requests the LF domain, waits up to the configured
    /// timeout for the manager to report it running and then drops its own
    /// reference again. Callers racing the first one spin until it finishes
    /// and then report its result; later callers return immediately. None of
    /// them touch the manager. After a failure under [`BootPolicy::Report`],
    /// they return [`ClkError::LfclkUnavailable`].
    ///
    /// # Panics
    ///
    /// Under [`BootPolicy::Assert`] if the clock does not become ready.
    pub fn lfclk_wait(&self) -> ClkResult<()> {
        if self
            .lfclk
            .latch
            .compare_exchange(
                LATCH_IDLE,
                LATCH_WAITING,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            return self.lfclk.settled();
        }

        debug!(
            "{}: waiting for LFCLK (timeout {})",
            self.config.name, self.config.lfclk_timeout
        );

        let result = blocking_wait::<_, S>(&self.manager, self.config.lfclk_timeout);
        match result {
            Ok(state) => {
                if let Err(err) = self.manager.release() {
                    warn!("{}: LFCLK release after wait: {}", self.config.name, err);
                }
                self.lfclk.latch.store(LATCH_READY, Ordering::Release);
                debug!("{}: LFCLK ready ({})", self.config.name, state);
                Ok(())
            }
            Err(err) => {
                self.lfclk.latch.store(LATCH_FAILED, Ordering::Release);
                match self.config.boot_policy {
                    BootPolicy::Assert => {
                        error!("{}: LFCLK not ready: {}", self.config.name, err);
                        panic!("{}: LFCLK not ready: {}", self.config.name, err);
                    }
                    BootPolicy::Report => {
                        warn!("{}: LFCLK not ready: {}", self.config.name, err);
                        Err(err)
                    }
                }
            }
        }
    }
}

impl<M, D, S> ClockCtrl<M, D, S>
where
    M: OnOffManager,
{
    /// Requests the LF domain without blocking.
    ///
    /// Returns the manager state at request time; completion is observed
    /// with [`lfclk_poll`](Self::lfclk_poll). The request is held until
    /// [`lfclk_release`](Self::lfclk_release).
    pub fn lfclk_request(&self) -> OnOffOutcome {
        if self.lfclk.held.swap(true, Ordering::AcqRel) {
            return Err(OnOffError::ClientBusy);
        }

        self.lfclk.client.reset();
        let result = self.manager.request(&self.lfclk.client);
        match result {
            Ok(state) => debug!("{}: LFCLK requested ({})", self.config.name, state),
            Err(err) => {
                self.lfclk.held.store(false, Ordering::Release);
                warn!("{}: LFCLK request failed: {}", self.config.name, err);
            }
        }
        result
    }

    /// Polls the outstanding non-blocking request.
    pub fn lfclk_poll(&self) -> nb::Result<OnOffState, OnOffError> {
        if !self.lfclk.held.load(Ordering::Acquire) {
            return Err(nb::Error::Other(OnOffError::NotActive));
        }
        self.lfclk.client.fetch_result()
    }

    /// Drops the non-blocking request.
    ///
    /// A request still in flight is canceled and owns nothing afterwards. A
    /// completed request is released. Does nothing if no request is held.
    /// Returns `NotPending` if the manager already dequeued the request but
    /// has not completed it yet; the request stays held, call again later.
    pub fn lfclk_release(&self) -> Result<(), OnOffError> {
        if !self.lfclk.held.swap(false, Ordering::AcqRel) {
            return Ok(());
        }

        let client = &self.lfclk.client;
        match self.manager.cancel(client) {
            Ok(state) => {
                debug!("{}: LFCLK request canceled ({})", self.config.name, state);
                Ok(())
            }
            Err(OnOffError::NotPending) => match client.fetch_result() {
                Ok(_) => {
                    debug!("{}: LFCLK released", self.config.name);
                    self.manager.release().map(|_| ())
                }
                // a failed request holds no reference
                Err(nb::Error::Other(_)) => Ok(()),
                // off the pending list but not yet notified; the completion
                // will own a reference, so keep it for the next release
                Err(nb::Error::WouldBlock) => {
                    self.lfclk.held.store(true, Ordering::Release);
                    Err(OnOffError::NotPending)
                }
            },
            Err(err) => Err(err),
        }
    }

    /// Progress of the boot-time wait.
    pub fn lfclk_status(&self) -> LfclkStatus {
        self.lfclk.status()
    }
}

impl<M, D, S> ClockCtrl<M, D, S>
where
    D: ClockDriver,
{
    /// Starts an LFCLK calibration pass.
    pub fn lfclk_calibration_start(&self) {
        trace!("{}: LFCLK calibration start", self.config.name);
        self.driver.calibration_force_start();
    }

    /// Reports whether a calibration pass is running. The answer may be
    /// stale by the time the caller acts on it.
    pub fn lfclk_calibration_is_enabled(&self) -> bool {
        self.driver.calibration_in_progress()
    }
}
