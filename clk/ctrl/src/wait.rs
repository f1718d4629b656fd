//! Blocking wait on an on/off request.

use alloc::sync::Arc;

use clk_core::{ClkError, ClkResult, OnOffClient, OnOffManager, OnOffState, Semaphore, Timeout};
use log::warn;

/// Requests the resource and blocks until the manager reports completion.
///
/// The completion callback gives a binary semaphore created for this call.
/// On timeout the request is withdrawn with cancel-or-release, so the
/// manager never keeps a reference on behalf of a wait that gave up.
pub(crate) fn blocking_wait<M, S>(mgr: &M, timeout: Timeout) -> ClkResult<OnOffState>
where
    M: OnOffManager,
    S: Semaphore + 'static,
{
    let sem = Arc::new(S::binary());
    let signal = Arc::clone(&sem);
    let client = OnOffClient::with_callback(move |_| signal.give());

    mgr.request(&client)?;

    if let Err(err) = sem.take(timeout) {
        if let Err(withdraw) = mgr.cancel_or_release(&client) {
            warn!("withdrawing timed-out request: {}", withdraw);
        }
        return Err(err.into());
    }

    match client.fetch_result() {
        Ok(state) => Ok(state),
        Err(nb::Error::Other(err)) => Err(ClkError::OnOff(err)),
        // given without a completion
        Err(nb::Error::WouldBlock) => Err(ClkError::Semaphore),
    }
}
