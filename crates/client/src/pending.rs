//! Pending-result handles.
//!
//! A [`PendingResult`] represents a value that is still being produced on
//! a worker pool. Callers may block for it (with or without a bound),
//! cancel it, or compose it: [`PendingResultExt::adapt`] maps a pending
//! result of one type into another while preserving the cancellation and
//! timeout semantics of the source. Useful to adapt the data vehicles
//! returned by the REST API into instances of the caller's domain model
//! without leaking the wire type.
//!
//! Outcomes are memoized: once a handle has resolved, every later wait
//! returns a clone of the same outcome, and an adapted handle applies its
//! mapping function exactly once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use biblion_core::{Error, Result};

/// What a worker task produced.
#[derive(Debug, Clone)]
pub(crate) enum Outcome<T> {
    /// The task ran to completion (successfully or not).
    Ready(Result<T>),
    /// The task panicked; the payload message is re-raised on wait.
    Panicked(String),
}

/// An asynchronous handle to a value not yet available.
///
/// Blocking reads resolve to the same outcome every time. A panic inside
/// the producing task is re-raised as a panic on the waiting thread, so
/// programming errors keep their usual behavior.
pub trait PendingResult<T>: Send + Sync {
    /// Request cancellation. Work that has not started yet will not run;
    /// in-flight work observes the flag and is otherwise left to the
    /// pool's own lifecycle. Returns `false` when the result had already
    /// completed.
    fn cancel(&self) -> bool;

    /// Whether cancellation has been requested.
    fn is_cancelled(&self) -> bool;

    /// Whether an outcome is available without blocking.
    fn is_complete(&self) -> bool;

    /// Block until the outcome is available.
    fn wait(&self) -> Result<T>;

    /// Block up to `timeout`. Expiry yields [`Error::Timeout`] and leaves
    /// the handle intact: a later wait may still succeed.
    fn wait_timeout(&self, timeout: Duration) -> Result<T>;
}

/// Composition helpers for pending results.
pub trait PendingResultExt<T>: PendingResult<T> + Sized {
    /// A pending result that yields `adapter(value)` instead of `value`.
    ///
    /// The adapter runs on the first successful wait, exactly once; the
    /// mapped value is cached for subsequent waits. Cancellation and
    /// completion queries forward to the source handle.
    fn adapt<U, F>(self, adapter: F) -> AdaptedHandle<T, U, Self>
    where
        F: FnOnce(T) -> U + Send + 'static,
    {
        AdaptedHandle {
            source: self,
            state: Mutex::new(AdaptState {
                adapter: Some(Box::new(adapter)),
                cached: None,
            }),
        }
    }
}

impl<T, P: PendingResult<T>> PendingResultExt<T> for P {}

// ============================================================================
// DispatchHandle
// ============================================================================

enum HandleState<T> {
    Waiting(Receiver<Outcome<T>>),
    Done(Outcome<T>),
}

/// Handle to a task dispatched on one of the executor's worker pools.
pub struct DispatchHandle<T> {
    state: Mutex<HandleState<T>>,
    cancelled: Arc<AtomicBool>,
    join: JoinHandle<()>,
}

impl<T> std::fmt::Debug for DispatchHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchHandle")
            .field("cancelled", &self.cancelled.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Send> DispatchHandle<T> {
    pub(crate) fn new(
        receiver: Receiver<Outcome<T>>,
        join: JoinHandle<()>,
        cancelled: Arc<AtomicBool>,
    ) -> Self {
        DispatchHandle {
            state: Mutex::new(HandleState::Waiting(receiver)),
            cancelled,
            join,
        }
    }

    fn resolve(outcome: &Outcome<T>) -> Result<T> {
        match outcome {
            Outcome::Ready(result) => result.clone(),
            Outcome::Panicked(message) => panic!("worker task panicked: {message}"),
        }
    }

    fn wait_inner(&self, timeout: Option<Duration>) -> Result<T> {
        let mut state = self.state.lock();
        let outcome = match &*state {
            HandleState::Done(outcome) => return Self::resolve(outcome),
            HandleState::Waiting(receiver) => match timeout {
                None => match receiver.recv() {
                    Ok(outcome) => outcome,
                    // The producing task was torn down before it could
                    // report; treat as cancellation.
                    Err(_) => Outcome::Ready(Err(Error::Cancelled)),
                },
                Some(bound) => match receiver.recv_timeout(bound) {
                    Ok(outcome) => outcome,
                    Err(RecvTimeoutError::Timeout) => {
                        return Err(Error::Timeout { waited: bound })
                    }
                    Err(RecvTimeoutError::Disconnected) => Outcome::Ready(Err(Error::Cancelled)),
                },
            },
        };

        let result = Self::resolve(&outcome);
        *state = HandleState::Done(outcome);
        result
    }
}

impl<T: Clone + Send> PendingResult<T> for DispatchHandle<T> {
    fn cancel(&self) -> bool {
        if self.is_complete() {
            return false;
        }
        let newly = !self.cancelled.swap(true, Ordering::SeqCst);
        // Aborts work that has not started; running blocking work is
        // left to the pool.
        self.join.abort();
        newly
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn is_complete(&self) -> bool {
        let mut state = self.state.lock();
        match &mut *state {
            HandleState::Done(_) => true,
            HandleState::Waiting(receiver) => match receiver.try_recv() {
                Ok(outcome) => {
                    *state = HandleState::Done(outcome);
                    true
                }
                Err(TryRecvError::Disconnected) => {
                    *state = HandleState::Done(Outcome::Ready(Err(Error::Cancelled)));
                    true
                }
                Err(TryRecvError::Empty) => false,
            },
        }
    }

    fn wait(&self) -> Result<T> {
        self.wait_inner(None)
    }

    fn wait_timeout(&self, timeout: Duration) -> Result<T> {
        self.wait_inner(Some(timeout))
    }
}

// ============================================================================
// AdaptedHandle
// ============================================================================

struct AdaptState<A, B> {
    adapter: Option<Box<dyn FnOnce(A) -> B + Send>>,
    cached: Option<B>,
}

/// A pending result of type `B` backed by a pending result of type `A`
/// and a one-shot mapping function.
pub struct AdaptedHandle<A, B, S> {
    source: S,
    state: Mutex<AdaptState<A, B>>,
}

impl<A, B, S> PendingResult<B> for AdaptedHandle<A, B, S>
where
    B: Clone + Send,
    S: PendingResult<A>,
{
    fn cancel(&self) -> bool {
        self.source.cancel()
    }

    fn is_cancelled(&self) -> bool {
        self.source.is_cancelled()
    }

    fn is_complete(&self) -> bool {
        self.state.lock().cached.is_some() || self.source.is_complete()
    }

    fn wait(&self) -> Result<B> {
        self.wait_adapted(None)
    }

    fn wait_timeout(&self, timeout: Duration) -> Result<B> {
        self.wait_adapted(Some(timeout))
    }
}

impl<A, B, S> AdaptedHandle<A, B, S>
where
    B: Clone + Send,
    S: PendingResult<A>,
{
    fn wait_adapted(&self, timeout: Option<Duration>) -> Result<B> {
        let mut state = self.state.lock();
        if let Some(cached) = &state.cached {
            return Ok(cached.clone());
        }

        // A failed source wait leaves the adapter in place so a later
        // attempt can still map.
        let value = match timeout {
            None => self.source.wait()?,
            Some(bound) => self.source.wait_timeout(bound)?,
        };

        let adapter = state
            .adapter
            .take()
            .ok_or_else(|| Error::environment("adapter function already consumed"))?;
        let mapped = adapter(value);
        state.cached = Some(mapped.clone());
        Ok(mapped)
    }
}
