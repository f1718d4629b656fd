//! On/off resource manager abstraction
//!
//! The manager serializes requests for a shared clock domain and tells each
//! client when the domain reached the requested state. Clients are shared
//! handles: the manager keeps a clone while a request is in flight and
//! completes it from whatever context finishes the transition.

use alloc::sync::Arc;
use core::cell::Cell;
use core::fmt;

use critical_section::Mutex;

/// State of a managed on/off resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnOffState {
    /// Resource is off and has no users
    Off,
    /// Resource is starting
    ToOn,
    /// Resource is running
    On,
    /// Resource is stopping
    ToOff,
    /// Manager is recovering from an error
    Resetting,
    /// A transition failed; the manager needs a reset
    Error,
}

impl OnOffState {
    /// Check if the resource is running
    pub const fn is_on(self) -> bool {
        matches!(self, OnOffState::On)
    }

    /// Check if the resource is between stable states
    pub const fn is_transitioning(self) -> bool {
        matches!(
            self,
            OnOffState::ToOn | OnOffState::ToOff | OnOffState::Resetting
        )
    }
}

impl fmt::Display for OnOffState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnOffState::Off => write!(f, "off"),
            OnOffState::ToOn => write!(f, "to-on"),
            OnOffState::On => write!(f, "on"),
            OnOffState::ToOff => write!(f, "to-off"),
            OnOffState::Resetting => write!(f, "resetting"),
            OnOffState::Error => write!(f, "error"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for OnOffState {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            OnOffState::Off => defmt::write!(fmt, "Off"),
            OnOffState::ToOn => defmt::write!(fmt, "ToOn"),
            OnOffState::On => defmt::write!(fmt, "On"),
            OnOffState::ToOff => defmt::write!(fmt, "ToOff"),
            OnOffState::Resetting => defmt::write!(fmt, "Resetting"),
            OnOffState::Error => defmt::write!(fmt, "Error"),
        }
    }
}

/// Errors reported by an on/off manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnOffError {
    /// The client already has an outstanding request
    ClientBusy,
    /// Cancel found no pending request for the client
    NotPending,
    /// Release with no outstanding reference
    NotActive,
    /// Too many users or pending clients
    Overflow,
    /// Manager is in the error state
    ManagerFault,
    /// The start or stop transition failed with a platform error code
    Transition(i32),
}

impl fmt::Display for OnOffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnOffError::ClientBusy => write!(f, "client already has a request in flight"),
            OnOffError::NotPending => write!(f, "no pending request for client"),
            OnOffError::NotActive => write!(f, "resource has no active users"),
            OnOffError::Overflow => write!(f, "too many users"),
            OnOffError::ManagerFault => write!(f, "manager is in error state"),
            OnOffError::Transition(code) => write!(f, "transition failed ({})", code),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for OnOffError {}

#[cfg(feature = "defmt")]
impl defmt::Format for OnOffError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            OnOffError::ClientBusy => defmt::write!(fmt, "ClientBusy"),
            OnOffError::NotPending => defmt::write!(fmt, "NotPending"),
            OnOffError::NotActive => defmt::write!(fmt, "NotActive"),
            OnOffError::Overflow => defmt::write!(fmt, "Overflow"),
            OnOffError::ManagerFault => defmt::write!(fmt, "ManagerFault"),
            OnOffError::Transition(code) => defmt::write!(fmt, "Transition({})", code),
        }
    }
}

/// Result of a manager operation or of a completed request
pub type OnOffOutcome = Result<OnOffState, OnOffError>;

/// Completion callback type
pub type NotifyFn = dyn Fn(OnOffOutcome) + Send + Sync;

/// How a client learns that its request completed
#[derive(Clone)]
pub enum Notify {
    /// No callback; the owner polls [`OnOffClient::fetch_result`]
    SpinWait,
    /// Invoked once, from the completing context
    Callback(Arc<NotifyFn>),
}

impl fmt::Debug for Notify {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notify::SpinWait => write!(f, "SpinWait"),
            Notify::Callback(_) => write!(f, "Callback"),
        }
    }
}

struct ClientInner {
    notify: Notify,
    outcome: Mutex<Cell<Option<OnOffOutcome>>>,
}

/// Request record handed to an [`OnOffManager`]
///
/// Cloning yields another handle to the same record.
#[derive(Clone)]
pub struct OnOffClient {
    inner: Arc<ClientInner>,
}

impl OnOffClient {
    fn with_notify(notify: Notify) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                notify,
                outcome: Mutex::new(Cell::new(None)),
            }),
        }
    }

    /// Create a client that is polled for completion
    pub fn spin_wait() -> Self {
        Self::with_notify(Notify::SpinWait)
    }

    /// Create a client that invokes `callback` on completion
    pub fn with_callback<F>(callback: F) -> Self
    where
        F: Fn(OnOffOutcome) + Send + Sync + 'static,
    {
        Self::with_notify(Notify::Callback(Arc::new(callback)))
    }

    /// Notification method of this client
    pub fn notify(&self) -> &Notify {
        &self.inner.notify
    }

    /// Record the outcome and fire the callback.
    ///
    /// Only the first completion counts; returns `false` for later ones.
    /// The callback runs outside the critical section.
    pub fn complete(&self, outcome: OnOffOutcome) -> bool {
        let first = critical_section::with(|cs| {
            let slot = self.inner.outcome.borrow(cs);
            if slot.get().is_some() {
                return false;
            }
            slot.set(Some(outcome));
            true
        });

        if first {
            if let Notify::Callback(callback) = &self.inner.notify {
                callback(outcome);
            }
        }
        first
    }

    /// Poll for the outcome of the request
    pub fn fetch_result(&self) -> nb::Result<OnOffState, OnOffError> {
        let outcome = critical_section::with(|cs| self.inner.outcome.borrow(cs).get());
        match outcome {
            None => Err(nb::Error::WouldBlock),
            Some(Ok(state)) => Ok(state),
            Some(Err(err)) => Err(nb::Error::Other(err)),
        }
    }

    /// Check if the request has not completed yet
    pub fn is_pending(&self) -> bool {
        critical_section::with(|cs| self.inner.outcome.borrow(cs).get().is_none())
    }

    /// Clear the recorded outcome so the client can be reused
    pub fn reset(&self) {
        critical_section::with(|cs| self.inner.outcome.borrow(cs).set(None));
    }

    /// Check if both handles refer to the same record
    pub fn same(&self, other: &OnOffClient) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for OnOffClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = critical_section::with(|cs| self.inner.outcome.borrow(cs).get());
        f.debug_struct("OnOffClient")
            .field("notify", &self.inner.notify)
            .field("outcome", &outcome)
            .finish()
    }
}

/// Platform on/off resource manager
///
/// `request` returns the manager state observed when the request was
/// accepted; completion is reported later through the client. Each
/// successfully completed request owns one reference that `release` drops.
pub trait OnOffManager {
    /// Queue a request for the resource on behalf of `client`
    fn request(&self, client: &OnOffClient) -> OnOffOutcome;

    /// Drop one reference, stopping the resource when it was the last
    fn release(&self) -> OnOffOutcome;

    /// Withdraw a pending request; `NotPending` if it already completed
    fn cancel(&self, client: &OnOffClient) -> OnOffOutcome;

    /// Withdraw a request whether or not it completed.
    ///
    /// A pending request is canceled. A request that completed successfully
    /// owns a reference, which is released. A request that completed with an
    /// error owns nothing and its error is returned.
    ///
    /// A manager may take the client off its pending list before notifying
    /// it; cancel then reports `NotPending` while the outcome is still
    /// missing. The outcome is already on its way, so this spins until it
    /// lands.
    fn cancel_or_release(&self, client: &OnOffClient) -> OnOffOutcome {
        match self.cancel(client) {
            Err(OnOffError::NotPending) => loop {
                match client.fetch_result() {
                    Ok(_) => break self.release(),
                    Err(nb::Error::Other(err)) => break Err(err),
                    Err(nb::Error::WouldBlock) => core::hint::spin_loop(),
                }
            },
            other => other,
        }
    }
}

impl<M: OnOffManager + ?Sized> OnOffManager for &M {
    fn request(&self, client: &OnOffClient) -> OnOffOutcome {
        (**self).request(client)
    }

    fn release(&self) -> OnOffOutcome {
        (**self).release()
    }

    fn cancel(&self, client: &OnOffClient) -> OnOffOutcome {
        (**self).cancel(client)
    }

    fn cancel_or_release(&self, client: &OnOffClient) -> OnOffOutcome {
        (**self).cancel_or_release(client)
    }
}

impl<M: OnOffManager + ?Sized> OnOffManager for Arc<M> {
    fn request(&self, client: &OnOffClient) -> OnOffOutcome {
        (**self).request(client)
    }

    fn release(&self) -> OnOffOutcome {
        (**self).release()
    }

    fn cancel(&self, client: &OnOffClient) -> OnOffOutcome {
        (**self).cancel(client)
    }

    fn cancel_or_release(&self, client: &OnOffClient) -> OnOffOutcome {
        (**self).cancel_or_release(client)
    }
}
