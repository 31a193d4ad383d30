//! Single-flight loader for an async resource.
//!
//! The first caller of [`Loader::load`] runs the fetch; callers arriving
//! while it runs are parked as waiters and receive the same outcome.  Once
//! ready, the value is served from memory.  A failed load is remembered
//! until the next `load`, which tries again.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::oneshot;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("load failed: {0}")]
    Failed(String),
    #[error("load timed out after {0:?}")]
    TimedOut(Duration),
    /// The caller running the fetch went away before it finished.
    #[error("load cancelled")]
    Cancelled,
}

/// Observable loader state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    Unloaded,
    Loading,
    Ready,
    Failed,
}

type Waiter<T> = oneshot::Sender<Result<T, LoadError>>;

enum Slot<T> {
    Unloaded,
    Loading { waiters: Vec<Waiter<T>> },
    Ready(T),
    Failed(LoadError),
}

enum Role<T> {
    Done(Result<T, LoadError>),
    Wait(oneshot::Receiver<Result<T, LoadError>>),
    Fetch,
}

/// Cheap to clone; clones share the same slot.
pub struct Loader<T> {
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T> Clone for Loader<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: Clone> Default for Loader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Loader<T> {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::Unloaded)),
        }
    }

    pub fn state(&self) -> LoaderState {
        match &*lock(&self.slot) {
            Slot::Unloaded => LoaderState::Unloaded,
            Slot::Loading { .. } => LoaderState::Loading,
            Slot::Ready(_) => LoaderState::Ready,
            Slot::Failed(_) => LoaderState::Failed,
        }
    }

    /// The loaded value, if ready.
    pub fn get(&self) -> Option<T> {
        match &*lock(&self.slot) {
            Slot::Ready(v) => Some(v.clone()),
            _ => None,
        }
    }

    /// Forget any value or failure.  Waiters of an in-flight load are
    /// left alone; the fetch still resolves them.
    pub fn reset(&self) {
        let mut slot = lock(&self.slot);
        if !matches!(*slot, Slot::Loading { .. }) {
            *slot = Slot::Unloaded;
        }
    }

    /// Resolve the resource, running `fetch` only if nobody else is.
    pub async fn load<F, Fut>(&self, fetch: F) -> Result<T, LoadError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, LoadError>>,
    {
        let role = {
            let mut slot = lock(&self.slot);
            match &mut *slot {
                Slot::Ready(v) => Role::Done(Ok(v.clone())),
                Slot::Loading { waiters } => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Role::Wait(rx)
                }
                Slot::Unloaded | Slot::Failed(_) => {
                    *slot = Slot::Loading {
                        waiters: Vec::new(),
                    };
                    Role::Fetch
                }
            }
        };

        match role {
            Role::Done(result) => result,
            Role::Wait(rx) => rx.await.unwrap_or(Err(LoadError::Cancelled)),
            Role::Fetch => {
                let mut guard = FetchGuard {
                    slot: &self.slot,
                    armed: true,
                };
                let result = fetch().await;
                guard.armed = false;
                self.finish(&result);
                result
            }
        }
    }

    /// Like [`Loader::load`], failing with [`LoadError::TimedOut`] if the
    /// fetch takes longer than `limit`.
    pub async fn load_with_timeout<F, Fut>(&self, limit: Duration, fetch: F) -> Result<T, LoadError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, LoadError>>,
    {
        self.load(|| async move {
            match tokio::time::timeout(limit, fetch()).await {
                Ok(result) => result,
                Err(_) => Err(LoadError::TimedOut(limit)),
            }
        })
        .await
    }

    fn finish(&self, result: &Result<T, LoadError>) {
        let previous = {
            let mut slot = lock(&self.slot);
            let next = match result {
                Ok(v) => Slot::Ready(v.clone()),
                Err(e) => Slot::Failed(e.clone()),
            };
            std::mem::replace(&mut *slot, next)
        };
        if let Slot::Loading { waiters } = previous {
            tracing::debug!(waiters = waiters.len(), ok = result.is_ok(), "loader resolved");
            for waiter in waiters {
                let _ = waiter.send(result.clone());
            }
        }
    }
}

/// Resets the slot when the fetching future is dropped mid-flight, which
/// drops every waiter's sender and wakes them with `Cancelled`.
struct FetchGuard<'a, T> {
    slot: &'a Mutex<Slot<T>>,
    armed: bool,
}

impl<T> Drop for FetchGuard<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            *lock(self.slot) = Slot::Unloaded;
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
