use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;

/// Cancellation scope of one loader or search session.
///
/// Every fetch task holds the token of the scope it was started in.
/// Renewing or cancelling happens under the session lock, and tasks check
/// their token under the same lock before touching state, so a task of a
/// superseded scope never mutates or publishes anything.
#[derive(Debug, Default)]
pub(crate) struct SessionScope {
    token: CancellationToken,
}

impl SessionScope {
    /// Cancel all work of the current scope and open a new one.
    pub(crate) fn renew(&mut self) -> CancellationToken {
        self.token.cancel();
        self.token = CancellationToken::new();
        self.token.clone()
    }

    /// Token of the current scope.
    pub(crate) fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }
}

/// Lock session state, a panicked task does not leave it unusable.
pub(crate) fn lock<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
