//! Per-call cancellation.
//!
//! Cancellation handles belong to the caller of one operation and are never
//! stored on a [`Client`](crate::Client), so concurrent calls on the same
//! client cancel independently.

use std::future::Future;

use futures::FutureExt;
use futures::future::{AbortHandle, Abortable, Aborted, Map};

use crate::error::{ClientError, ClientResult, TransportFailure};
use crate::exchange::ExchangeState;

/// An operation future that resolves with [`TransportFailure::Aborted`]
/// once its [`CancelHandle`] is used.
pub type Cancellable<F, T> = Map<Abortable<F>, fn(Result<ClientResult<T>, Aborted>) -> ClientResult<T>>;

/// Cancels one operation.
#[derive(Debug, Clone)]
pub struct CancelHandle(AbortHandle);

impl CancelHandle {
    /// Aborts the operation at whichever suspension point it is parked at.
    ///
    /// The connection is dropped with the operation future.
    pub fn cancel(&self) {
        tracing::debug!("Cancelling operation");
        self.0.abort();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.is_aborted()
    }
}

/// ## Summary
/// Wraps an operation future so it can be cancelled through the returned handle.
///
/// ```ignore
/// let (handle, listing) = cancellable(client.list("/docs/", None));
/// handle.cancel();
/// assert!(listing.await.unwrap_err().is_aborted());
/// ```
#[must_use]
pub fn cancellable<F, T>(future: F) -> (CancelHandle, Cancellable<F, T>)
where
    F: Future<Output = ClientResult<T>>,
{
    let (handle, registration) = AbortHandle::new_pair();
    let future = Abortable::new(future, registration)
        .map(flatten_aborted::<T> as fn(Result<ClientResult<T>, Aborted>) -> ClientResult<T>);
    (CancelHandle(handle), future)
}

fn flatten_aborted<T>(result: Result<ClientResult<T>, Aborted>) -> ClientResult<T> {
    match result {
        Ok(result) => result,
        Err(Aborted) => Err(ClientError::TransportError {
            state: ExchangeState::Faulted,
            source: TransportFailure::Aborted,
        }),
    }
}
