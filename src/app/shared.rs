//! Shared handle to the executor.
//!
//! Every caller (interactive loop, automation thread) goes through one
//! `Mutex` around the whole [`LampService`]. The lock is held across the
//! entire read-decide-act-persist sequence, including the rate-limit
//! wait, so frame sequences from different callers never interleave on
//! the bus. Callers queue on the lock; there is no separate work queue.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::state::LampState;

use super::commands::ActionRequest;
use super::ports::{Clock, LampTransport, StatePort};
use super::service::{LampService, Outcome};

pub struct SharedLamp<T, S, C> {
    inner: Arc<Mutex<LampService<T, S, C>>>,
}

impl<T, S, C> Clone for SharedLamp<T, S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, S, C> SharedLamp<T, S, C>
where
    T: LampTransport,
    S: StatePort,
    C: Clock,
{
    pub fn new(service: LampService<T, S, C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    /// Execute one request under the lock.
    pub fn execute(&self, req: ActionRequest) -> Result<Outcome> {
        self.lock()?.execute(req)
    }

    /// Apply an ordered batch. The lock is taken per request, so another
    /// caller may slip in between two requests but never inside one.
    pub fn apply_all(&self, reqs: &[ActionRequest]) -> Vec<Result<Outcome>> {
        reqs.iter().map(|req| self.execute(*req)).collect()
    }

    /// Copy of the current lamp state.
    pub fn snapshot(&self) -> Result<LampState> {
        Ok(self.lock()?.state())
    }

    /// Run `f` with exclusive access to the service.
    pub fn with<R>(&self, f: impl FnOnce(&mut LampService<T, S, C>) -> R) -> Result<R> {
        let mut guard = self.lock()?;
        Ok(f(&mut guard))
    }

    fn lock(&self) -> Result<MutexGuard<'_, LampService<T, S, C>>> {
        self.inner
            .lock()
            .map_err(|_| Error::Poisoned("lamp service"))
    }
}
