//! One-shot command scaffolding shared by every remote operation.
//!
//! An [`Operation`] describes a single REST interaction: how to build the
//! request and how to decode the response. [`Command`] wraps an operation
//! with the cross-cutting concerns every dispatch needs:
//!
//! - at-most-once execution, enforced with an atomic guard
//! - library scope prefixes on the request path
//! - authentication and protocol version headers

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use biblion_core::{
    wire, Credentials, Error, LibraryScope, RestRequest, RestResponse, Result,
};

use crate::executor::CommandExecutor;
use crate::library::Library;
use crate::pending::DispatchHandle;

/// A single REST interaction with the remote service.
///
/// Implementations are plain data: `build` produces the request without the
/// library prefix or auth headers, and `decode` consumes the operation to
/// interpret the response. `check_ready` runs before any dispatch and is the
/// place to reject structurally invalid input.
pub trait Operation: Send + 'static {
    /// The decoded result of a successful round trip. `Clone` so pending
    /// handles can memoize it.
    type Output: Clone + Send + 'static;

    /// Validates the operation before dispatch.
    fn check_ready(&self) -> Result<()> {
        Ok(())
    }

    /// Builds the request, relative to the library scope.
    fn build(&self) -> RestRequest;

    /// Interprets the response, consuming the operation.
    fn decode(self, response: RestResponse) -> Result<Self::Output>;
}

// ============================================================================
// Command
// ============================================================================

/// An executable wrapper around an [`Operation`].
///
/// A command executes at most once. A second call to [`Command::execute`]
/// fails with [`Error::AlreadyExecuted`] without touching the transport.
pub struct Command<O: Operation> {
    executor: Arc<CommandExecutor>,
    scope: Option<LibraryScope>,
    credentials: Option<Credentials>,
    operation: Mutex<Option<O>>,
    executed: AtomicBool,
}

impl<O: Operation> Command<O> {
    /// Builds a command that runs against `library`'s scope and credentials.
    pub fn scoped(library: &Library, operation: O) -> Self {
        Command {
            executor: library.executor(),
            scope: Some(library.scope().clone()),
            credentials: library.credentials().cloned(),
            operation: Mutex::new(Some(operation)),
            executed: AtomicBool::new(false),
        }
    }

    /// Builds a command with no library path prefix, for endpoints that
    /// live outside a library scope.
    pub fn unscoped(
        executor: Arc<CommandExecutor>,
        credentials: Option<Credentials>,
        operation: O,
    ) -> Self {
        Command {
            executor,
            scope: None,
            credentials,
            operation: Mutex::new(Some(operation)),
            executed: AtomicBool::new(false),
        }
    }

    /// Dispatches the operation, returning a handle to the in-flight result.
    pub fn execute(&self) -> Result<DispatchHandle<O::Output>> {
        if self
            .executed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::AlreadyExecuted);
        }
        let operation = self
            .operation
            .lock()
            .take()
            .ok_or(Error::AlreadyExecuted)?;
        operation.check_ready()?;

        let mut request = operation.build();
        if let Some(scope) = &self.scope {
            let mut path = scope.path_segments().to_vec();
            path.append(&mut request.path);
            request.path = path;
        }
        request = self.append_headers(request);
        debug!(method = ?request.method, path = %request.path_string(), "executing command");

        self.executor
            .submit(request, move |response| operation.decode(response))
    }

    fn append_headers(&self, mut request: RestRequest) -> RestRequest {
        if let Some(bearer) = self.credentials.as_ref().and_then(|c| c.bearer()) {
            request = request.header(wire::HEADER_AUTHORIZATION, bearer);
        }
        request = request.header(wire::HEADER_API_VERSION, wire::API_VERSION);
        if request.body.is_some() {
            request = request.header(wire::HEADER_CONTENT_TYPE, wire::APPLICATION_JSON);
        }
        request
    }
}
