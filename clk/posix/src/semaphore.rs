//! Binary semaphore for POSIX
//!
//! Built on a standard library mutex and condition variable. Spurious
//! wakeups are absorbed by waiting on the `given` flag, not on the wakeup.

use std::sync::{Condvar, Mutex, MutexGuard};

use clk_core::{Semaphore, TakeError, Timeout};

/// Binary semaphore with bounded, no-wait and unbounded takes
#[derive(Debug, Default)]
pub struct StdSemaphore {
    given: Mutex<bool>,
    cond: Condvar,
}

impl StdSemaphore {
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.given.lock().expect("mutex poisoned")
    }

    /// Check if the semaphore is currently given
    pub fn is_given(&self) -> bool {
        *self.lock()
    }
}

impl Semaphore for StdSemaphore {
    fn binary() -> Self {
        Self::default()
    }

    fn give(&self) {
        let mut given = self.lock();
        *given = true;
        self.cond.notify_one();
    }

    fn take(&self, timeout: Timeout) -> Result<(), TakeError> {
        let guard = self.lock();
        let mut given = match timeout.to_duration() {
            None => self
                .cond
                .wait_while(guard, |given| !*given)
                .expect("mutex poisoned"),
            Some(limit) if limit.is_zero() => {
                if !*guard {
                    return Err(TakeError::Busy);
                }
                guard
            }
            Some(limit) => {
                let (guard, _) = self
                    .cond
                    .wait_timeout_while(guard, limit, |given| !*given)
                    .expect("mutex poisoned");
                if !*guard {
                    return Err(TakeError::Timeout);
                }
                guard
            }
        };
        *given = false;
        Ok(())
    }
}
