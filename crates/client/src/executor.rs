//! Bounded thread-pool execution of REST round trips.
//!
//! The executor owns two pools:
//!
//! - a round-trip pool sized for interactive request/response work
//! - a wide background pool for adapter chains and other follow-up work
//!
//! Submitted work produces a [`DispatchHandle`] that callers block on with
//! a bounded timeout. [`CommandExecutor::unwrap`] collapses a handle into a
//! plain `Result`, classifying failures into the usage / remote / local
//! tiers of [`Error`].

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, warn};

use biblion_core::{Error, Result, RestRequest, RestResponse, Transport};

use crate::pending::{DispatchHandle, Outcome, PendingResult};

/// Blocking threads available for concurrent round trips by default.
pub const DEFAULT_POOL_SIZE: usize = 10;

/// Default bound on a single blocking wait.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How long `close` waits for in-flight work before abandoning it.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

// ============================================================================
// CommandExecutor
// ============================================================================

/// Dispatches REST round trips onto a bounded pool and hands back
/// cancellable, waitable handles.
///
/// The executor is shared behind an `Arc` by every [`crate::Library`] built
/// on it. `close` is idempotent and also runs on drop.
pub struct CommandExecutor {
    transport: Arc<dyn Transport>,
    round_trip: Mutex<Option<Runtime>>,
    background: Mutex<Option<Runtime>>,
    timeout: Duration,
    is_shutdown: AtomicBool,
}

impl CommandExecutor {
    /// Creates an executor with the default pool size and wait timeout.
    pub fn new(transport: Arc<dyn Transport>) -> Result<Self> {
        Self::with_config(transport, DEFAULT_POOL_SIZE, DEFAULT_TIMEOUT)
    }

    /// Creates an executor with an explicit round-trip pool size and
    /// blocking-wait timeout.
    pub fn with_config(
        transport: Arc<dyn Transport>,
        pool_size: usize,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            transport,
            round_trip: Mutex::new(Some(build_pool("biblion-rest", pool_size)?)),
            background: Mutex::new(Some(build_pool("biblion-task", 512)?)),
            timeout,
            is_shutdown: AtomicBool::new(false),
        })
    }

    /// The bound applied to blocking waits issued through [`Self::unwrap`].
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends `request` over the transport on the round-trip pool and decodes
    /// the response with `decode` on the same worker.
    pub fn submit<T, F>(&self, request: RestRequest, decode: F) -> Result<DispatchHandle<T>>
    where
        T: Clone + Send + 'static,
        F: FnOnce(RestResponse) -> Result<T> + Send + 'static,
    {
        let transport = Arc::clone(&self.transport);
        self.dispatch(&self.round_trip, move || {
            debug!(method = ?request.method, path = %request.path_string(), "dispatching request");
            let response = transport.exchange(&request)?;
            decode(response)
        })
    }

    /// Runs an arbitrary fallible task on the background pool.
    pub fn submit_background<T, F>(&self, task: F) -> Result<DispatchHandle<T>>
    where
        T: Clone + Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        self.dispatch(&self.background, task)
    }

    fn dispatch<T, F>(&self, pool: &Mutex<Option<Runtime>>, work: F) -> Result<DispatchHandle<T>>
    where
        T: Clone + Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        if self.is_shutdown.load(Ordering::SeqCst) {
            return Err(Error::ExecutorShutDown);
        }
        let guard = pool.lock();
        let runtime = guard.as_ref().ok_or(Error::ExecutorShutDown)?;

        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let (tx, rx) = mpsc::sync_channel(1);

        let join = runtime.spawn_blocking(move || {
            let outcome = if flag.load(Ordering::SeqCst) {
                Outcome::Ready(Err(Error::Cancelled))
            } else {
                match catch_unwind(AssertUnwindSafe(work)) {
                    Ok(result) => Outcome::Ready(result),
                    Err(payload) => Outcome::Panicked(panic_message(payload)),
                }
            };
            // The receiver may have been dropped by a cancelled caller.
            let _ = tx.send(outcome);
        });

        Ok(DispatchHandle::new(rx, join, cancelled))
    }

    /// Blocks on `handle` with the executor timeout and folds the result
    /// into the three-tier error taxonomy.
    ///
    /// Usage and remote errors pass through unchanged. Everything else is
    /// wrapped as an environmental error carrying `context`.
    pub fn unwrap<T, P>(&self, handle: &P, context: impl FnOnce() -> String) -> Result<T>
    where
        T: Clone,
        P: PendingResult<T> + ?Sized,
    {
        match handle.wait_timeout(self.timeout) {
            Ok(value) => Ok(value),
            Err(err) if err.is_usage() || err.is_remote() => Err(err),
            Err(err) => Err(Error::environment(format!("{}: {err}", context()))),
        }
    }

    /// Shuts both pools down, waiting up to a grace period for in-flight
    /// work. Safe to call more than once; later submissions fail with
    /// [`Error::ExecutorShutDown`].
    pub fn close(&self) {
        if self.is_shutdown.swap(true, Ordering::SeqCst) {
            return;
        }
        for pool in [&self.round_trip, &self.background] {
            if let Some(runtime) = pool.lock().take() {
                runtime.shutdown_timeout(SHUTDOWN_GRACE);
            }
        }
    }
}

impl Drop for CommandExecutor {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for CommandExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandExecutor")
            .field("timeout", &self.timeout)
            .field("is_shutdown", &self.is_shutdown.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

fn build_pool(name: &str, blocking_threads: usize) -> Result<Runtime> {
    Builder::new_multi_thread()
        .worker_threads(1)
        .max_blocking_threads(blocking_threads.max(1))
        .thread_name(name)
        .enable_all()
        .build()
        .map_err(|e| {
            warn!(pool = name, error = %e, "failed to build worker pool");
            Error::environment(format!("failed to build {name} pool: {e}"))
        })
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use biblion_core::{Method, RestRequest, RestResponse};
    use std::sync::atomic::AtomicUsize;

    struct EchoTransport {
        calls: AtomicUsize,
    }

    impl EchoTransport {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl Transport for EchoTransport {
        fn exchange(&self, request: &RestRequest) -> Result<RestResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RestResponse::new(200).header("Echo-Path", request.path_string()))
        }
    }

    fn executor(transport: Arc<dyn Transport>) -> CommandExecutor {
        CommandExecutor::with_config(transport, 2, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_submit_round_trip() {
        let transport = EchoTransport::new();
        let exec = executor(transport.clone());
        let request = RestRequest::new(Method::Get).path("items");
        let handle = exec
            .submit(request, |response| {
                Ok(response
                    .header_value("Echo-Path")
                    .unwrap_or_default()
                    .to_string())
            })
            .unwrap();
        let path = exec.unwrap(&handle, || "echo".to_string()).unwrap();
        assert_eq!(path, "items");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_submit_background_task() {
        let exec = executor(EchoTransport::new());
        let handle = exec.submit_background(|| Ok(21 * 2)).unwrap();
        assert_eq!(handle.wait().unwrap(), 42);
    }

    #[test]
    fn test_unwrap_passes_remote_errors_through() {
        let exec = executor(EchoTransport::new());
        let handle = exec
            .submit_background::<u32, _>(|| Err(Error::rest(409, "Conflict", Vec::new())))
            .unwrap();
        let err = exec.unwrap(&handle, || "save".to_string()).unwrap_err();
        assert!(matches!(err, Error::Rest { status: 409, .. }));
    }

    #[test]
    fn test_unwrap_wraps_environment_errors_with_context() {
        let exec = executor(EchoTransport::new());
        let handle = exec
            .submit_background::<u32, _>(|| Err(Error::environment("socket closed")))
            .unwrap();
        let err = exec.unwrap(&handle, || "fetch page 3".to_string()).unwrap_err();
        match err {
            Error::Environment { message } => {
                assert!(message.contains("fetch page 3"));
                assert!(message.contains("socket closed"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unwrap_times_out_and_leaves_handle_usable() {
        let exec = CommandExecutor::with_config(
            EchoTransport::new(),
            2,
            Duration::from_millis(20),
        )
        .unwrap();
        let handle = exec
            .submit_background(|| {
                std::thread::sleep(Duration::from_millis(150));
                Ok(7u32)
            })
            .unwrap();

        let err = exec.unwrap(&handle, || "slow fetch".to_string()).unwrap_err();
        match err {
            Error::Environment { message } => assert!(message.contains("slow fetch")),
            other => panic!("unexpected error: {other:?}"),
        }

        // Expiry does not consume the outcome.
        assert_eq!(handle.wait().unwrap(), 7);
    }

    #[test]
    #[should_panic(expected = "boom")]
    fn test_panicked_task_reraises_at_wait() {
        let exec = executor(EchoTransport::new());
        let handle = exec
            .submit_background::<u32, _>(|| panic!("boom"))
            .unwrap();
        let _ = handle.wait();
    }

    #[test]
    fn test_close_is_idempotent_and_rejects_new_work() {
        let exec = executor(EchoTransport::new());
        exec.close();
        exec.close();
        let err = exec.submit_background::<u32, _>(|| Ok(1)).unwrap_err();
        assert!(matches!(err, Error::ExecutorShutDown));
    }
}
