//! Simulated on/off resource manager for POSIX
//!
//! Counts references like a platform on/off manager: every completed request
//! owns one reference, the resource stops when the last one is released.
//! How the start transition completes is chosen with [`Transition`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use clk_core::{OnOffClient, OnOffError, OnOffManager, OnOffOutcome, OnOffState};
use heapless::Vec;
use log::trace;

/// Maximum number of clients waiting for one start transition
pub const MAX_PENDING: usize = 8;

/// How the simulated start transition completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Inside `request`, before it returns
    Immediate,
    /// When the test calls [`SimOnOffManager::finish_transition`]
    Deferred,
    /// On a worker thread after the delay
    Delayed(Duration),
    /// Immediately, with the given platform error code
    Fail(i32),
}

struct SimState {
    state: OnOffState,
    refs: u32,
    pending: Vec<OnOffClient, MAX_PENDING>,
}

struct SimInner {
    transition: Transition,
    state: Mutex<SimState>,
    requests: AtomicUsize,
    releases: AtomicUsize,
    cancels: AtomicUsize,
}

impl SimInner {
    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().expect("mutex poisoned")
    }

    fn complete_start(&self, result: Result<(), i32>) {
        let clients = {
            let mut st = self.lock();
            if st.state != OnOffState::ToOn {
                return;
            }
            let clients = core::mem::take(&mut st.pending);
            match result {
                Ok(()) if clients.is_empty() => st.state = OnOffState::Off,
                Ok(()) => {
                    st.state = OnOffState::On;
                    st.refs = clients.len() as u32;
                }
                Err(_) => st.state = OnOffState::Error,
            }
            clients
        };

        trace!("sim onoff: start finished ({} clients)", clients.len());
        let outcome = match result {
            Ok(()) => Ok(OnOffState::On),
            Err(code) => Err(OnOffError::Transition(code)),
        };
        for client in clients.iter() {
            client.complete(outcome);
        }
    }
}

/// Simulated on/off manager. Clones share the same resource.
#[derive(Clone)]
pub struct SimOnOffManager {
    inner: Arc<SimInner>,
}

impl SimOnOffManager {
    /// Create a manager for a resource that starts off
    pub fn new(transition: Transition) -> Self {
        Self {
            inner: Arc::new(SimInner {
                transition,
                state: Mutex::new(SimState {
                    state: OnOffState::Off,
                    refs: 0,
                    pending: Vec::new(),
                }),
                requests: AtomicUsize::new(0),
                releases: AtomicUsize::new(0),
                cancels: AtomicUsize::new(0),
            }),
        }
    }

    /// Create a manager whose resource is already on with `refs` holders
    pub fn running(transition: Transition, refs: u32) -> Self {
        let mgr = Self::new(transition);
        {
            let mut st = mgr.inner.lock();
            st.state = OnOffState::On;
            st.refs = refs;
        }
        mgr
    }

    /// Complete a [`Transition::Deferred`] start successfully
    pub fn finish_transition(&self) {
        self.inner.complete_start(Ok(()));
    }

    /// Complete a [`Transition::Deferred`] start with an error
    pub fn fail_transition(&self, code: i32) {
        self.inner.complete_start(Err(code));
    }

    /// Recover from the error state
    pub fn reset(&self) {
        let mut st = self.inner.lock();
        if st.state == OnOffState::Error {
            st.state = OnOffState::Off;
            st.refs = 0;
        }
    }

    pub fn state(&self) -> OnOffState {
        self.inner.lock().state
    }

    /// Number of references currently held
    pub fn refs(&self) -> u32 {
        self.inner.lock().refs
    }

    /// Number of clients waiting for the start transition
    pub fn pending(&self) -> usize {
        self.inner.lock().pending.len()
    }

    pub fn request_count(&self) -> usize {
        self.inner.requests.load(Ordering::SeqCst)
    }

    pub fn release_count(&self) -> usize {
        self.inner.releases.load(Ordering::SeqCst)
    }

    pub fn cancel_count(&self) -> usize {
        self.inner.cancels.load(Ordering::SeqCst)
    }

    fn start(&self) {
        match self.inner.transition {
            Transition::Immediate => self.inner.complete_start(Ok(())),
            Transition::Deferred => {}
            Transition::Delayed(delay) => {
                let inner = Arc::clone(&self.inner);
                thread::spawn(move || {
                    thread::sleep(delay);
                    inner.complete_start(Ok(()));
                });
            }
            Transition::Fail(code) => self.inner.complete_start(Err(code)),
        }
    }
}

impl OnOffManager for SimOnOffManager {
    fn request(&self, client: &OnOffClient) -> OnOffOutcome {
        self.inner.requests.fetch_add(1, Ordering::SeqCst);

        let mut st = self.inner.lock();
        let prev = st.state;
        match prev {
            OnOffState::Error | OnOffState::Resetting => return Err(OnOffError::ManagerFault),
            _ if st.pending.iter().any(|c| c.same(client)) => {
                return Err(OnOffError::ClientBusy)
            }
            OnOffState::On => {
                st.refs = st.refs.checked_add(1).ok_or(OnOffError::Overflow)?;
                drop(st);
                client.complete(Ok(OnOffState::On));
                return Ok(prev);
            }
            _ => {}
        }

        st.pending
            .push(client.clone())
            .map_err(|_| OnOffError::Overflow)?;
        let starting = prev == OnOffState::Off;
        if starting {
            st.state = OnOffState::ToOn;
        }
        drop(st);

        if starting {
            trace!("sim onoff: starting");
            self.start();
        }
        Ok(prev)
    }

    fn release(&self) -> OnOffOutcome {
        self.inner.releases.fetch_add(1, Ordering::SeqCst);

        let mut st = self.inner.lock();
        if st.state != OnOffState::On || st.refs == 0 {
            return Err(OnOffError::NotActive);
        }
        st.refs -= 1;
        if st.refs == 0 {
            trace!("sim onoff: stopped");
            st.state = OnOffState::Off;
        }
        Ok(st.state)
    }

    fn cancel(&self, client: &OnOffClient) -> OnOffOutcome {
        self.inner.cancels.fetch_add(1, Ordering::SeqCst);

        let mut st = self.inner.lock();
        match st.pending.iter().position(|c| c.same(client)) {
            Some(index) => {
                st.pending.swap_remove(index);
                Ok(st.state)
            }
            None => Err(OnOffError::NotPending),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immediate_start_and_stop() {
        let mgr = SimOnOffManager::new(Transition::Immediate);
        let client = OnOffClient::spin_wait();

        assert_eq!(mgr.request(&client), Ok(OnOffState::Off));
        assert_eq!(client.fetch_result(), Ok(OnOffState::On));
        assert_eq!(mgr.state(), OnOffState::On);
        assert_eq!(mgr.refs(), 1);

        assert_eq!(mgr.release(), Ok(OnOffState::Off));
        assert_eq!(mgr.refs(), 0);
        assert_eq!(mgr.release(), Err(OnOffError::NotActive));
    }

    #[test]
    fn test_deferred_start_completes_all_waiters() {
        let mgr = SimOnOffManager::new(Transition::Deferred);
        let first = OnOffClient::spin_wait();
        let second = OnOffClient::spin_wait();

        assert_eq!(mgr.request(&first), Ok(OnOffState::Off));
        assert_eq!(mgr.request(&second), Ok(OnOffState::ToOn));
        assert!(first.is_pending());
        assert_eq!(mgr.pending(), 2);

        mgr.finish_transition();
        assert_eq!(first.fetch_result(), Ok(OnOffState::On));
        assert_eq!(second.fetch_result(), Ok(OnOffState::On));
        assert_eq!(mgr.refs(), 2);
    }

    #[test]
    fn test_duplicate_pending_client_rejected() {
        let mgr = SimOnOffManager::new(Transition::Deferred);
        let client = OnOffClient::spin_wait();
        mgr.request(&client).unwrap();
        assert_eq!(mgr.request(&client), Err(OnOffError::ClientBusy));
    }

    #[test]
    fn test_cancel_pending_request() {
        let mgr = SimOnOffManager::new(Transition::Deferred);
        let client = OnOffClient::spin_wait();
        mgr.request(&client).unwrap();

        assert_eq!(mgr.cancel(&client), Ok(OnOffState::ToOn));
        assert_eq!(mgr.cancel(&client), Err(OnOffError::NotPending));

        mgr.finish_transition();
        assert!(client.is_pending());
        assert_eq!(mgr.state(), OnOffState::Off);
        assert_eq!(mgr.refs(), 0);
    }

    #[test]
    fn test_failed_start_enters_error() {
        let mgr = SimOnOffManager::new(Transition::Fail(-5));
        let client = OnOffClient::spin_wait();
        mgr.request(&client).unwrap();

        assert_eq!(
            client.fetch_result(),
            Err(nb::Error::Other(OnOffError::Transition(-5)))
        );
        assert_eq!(mgr.state(), OnOffState::Error);
        assert_eq!(
            mgr.request(&OnOffClient::spin_wait()),
            Err(OnOffError::ManagerFault)
        );

        mgr.reset();
        assert_eq!(mgr.state(), OnOffState::Off);
    }

    #[test]
    fn test_delayed_start_on_worker_thread() {
        let mgr = SimOnOffManager::new(Transition::Delayed(Duration::from_millis(10)));
        let client = OnOffClient::spin_wait();
        mgr.request(&client).unwrap();

        let result = loop {
            match client.fetch_result() {
                Err(nb::Error::WouldBlock) => thread::sleep(Duration::from_millis(1)),
                other => break other,
            }
        };
        assert_eq!(result, Ok(OnOffState::On));
    }

    #[test]
    fn test_running_manager_completes_synchronously() {
        let mgr = SimOnOffManager::running(Transition::Deferred, 1);
        let client = OnOffClient::spin_wait();
        assert_eq!(mgr.request(&client), Ok(OnOffState::On));
        assert_eq!(client.fetch_result(), Ok(OnOffState::On));
        assert_eq!(mgr.refs(), 2);
    }

    #[test]
    fn test_pending_overflow() {
        let mgr = SimOnOffManager::new(Transition::Deferred);
        let clients: std::vec::Vec<_> = (0..MAX_PENDING)
            .map(|_| OnOffClient::spin_wait())
            .collect();
        for client in &clients {
            mgr.request(client).unwrap();
        }
        assert_eq!(
            mgr.request(&OnOffClient::spin_wait()),
            Err(OnOffError::Overflow)
        );
    }
}
