//! Wire-level request/response model and the transport seam.
//!
//! The access layer treats the remote service as an abstract
//! request/response exchange: commands describe a [`RestRequest`], a
//! [`Transport`] implementation performs the round trip, and commands
//! decode the resulting [`RestResponse`]. The concrete HTTP client, TLS
//! configuration, and connection pooling all live behind the trait.
//!
//! A response owns its body bytes outright, so a decode step always
//! consumes the full payload before the transport resource is released.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

// ============================================================================
// Header and parameter names
// ============================================================================

/// Fixed API version sent with every request.
pub const API_VERSION: &str = "3";

/// Header carrying [`API_VERSION`].
pub const HEADER_API_VERSION: &str = "Api-Version";

/// Bearer token header.
pub const HEADER_AUTHORIZATION: &str = "Authorization";

/// Total result count for a paged response.
pub const HEADER_TOTAL_RESULTS: &str = "Total-Results";

/// Server version of the data at response time.
pub const HEADER_LAST_MODIFIED_VERSION: &str = "Last-Modified-Version";

/// Version precondition for write operations.
pub const HEADER_IF_UNMODIFIED_SINCE_VERSION: &str = "If-Unmodified-Since-Version";

/// Content type header for write bodies.
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";

/// The only content type this layer produces.
pub const APPLICATION_JSON: &str = "application/json";

// ============================================================================
// Request
// ============================================================================

/// HTTP method of a request description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    /// Retrieve a resource.
    Get,
    /// Create resources.
    Post,
    /// Replace a resource.
    Put,
    /// Remove resources.
    Delete,
}

/// A transport-independent description of one REST round trip.
///
/// Query parameters are an ordered list of pairs; the same key may appear
/// more than once (tag filters rely on repeated `tag` parameters).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestRequest {
    /// HTTP method.
    pub method: Method,
    /// Resource path segments, joined with `/` by the transport.
    pub path: Vec<String>,
    /// Query parameters in emission order. Keys may repeat.
    pub query: Vec<(String, String)>,
    /// Request headers.
    pub headers: Vec<(String, String)>,
    /// JSON body for write operations.
    pub body: Option<serde_json::Value>,
}

impl RestRequest {
    /// An empty request description for the given method.
    pub fn new(method: Method) -> Self {
        RestRequest {
            method,
            path: Vec::new(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Append a path segment.
    pub fn path(mut self, segment: impl Into<String>) -> Self {
        self.path.push(segment.into());
        self
    }

    /// Append a query parameter. Repeated keys are preserved in order.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a JSON body.
    pub fn body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// The path rendered as a `/`-joined string, for logging.
    pub fn path_string(&self) -> String {
        self.path.join("/")
    }

    /// Look up a header value by case-insensitive name.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

// ============================================================================
// Response
// ============================================================================

/// One server response, fully read from the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RestResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Vec<(String, String)>,
    /// Raw body bytes. Empty for `204 No Content`.
    pub body: Vec<u8>,
}

impl RestResponse {
    /// A body-less response with the given status.
    pub fn new(status: u16) -> Self {
        RestResponse {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Attach a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: &impl Serialize) -> Self {
        // Serializing library-owned values cannot fail.
        self.body = serde_json::to_vec(body).unwrap_or_default();
        self
    }

    /// Look up a header value by case-insensitive name.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The `Total-Results` pagination header.
    ///
    /// A paged response without a parseable total violates the service
    /// contract, so this is an error rather than a default.
    pub fn total_results(&self) -> Result<u64> {
        self.required_u64(HEADER_TOTAL_RESULTS)
    }

    /// The `Last-Modified-Version` header.
    pub fn last_modified_version(&self) -> Result<u64> {
        self.required_u64(HEADER_LAST_MODIFIED_VERSION)
    }

    fn required_u64(&self, name: &str) -> Result<u64> {
        let raw = self.header_value(name).ok_or_else(|| {
            warn!(header = name, status = self.status, "response header missing");
            Error::unexpected(format!("response is missing the {name} header"))
        })?;

        raw.trim().parse::<u64>().map_err(|_| {
            warn!(header = name, value = raw, "response header is not an integer");
            Error::unexpected(format!("response header {name} is not an integer: {raw:?}"))
        })
    }

    /// Decode the body as JSON into `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            warn!(status = self.status, error = %e, "failed to decode response body");
            Error::unexpected(format!("malformed response body: {e}"))
        })
    }
}

/// Standard reason phrase for the status codes this layer inspects.
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        304 => "Not Modified",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        412 => "Precondition Failed",
        413 => "Request Entity Too Large",
        428 => "Precondition Required",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unexpected Status",
    }
}

// ============================================================================
// Transport
// ============================================================================

/// The abstract request/response exchange primitive.
///
/// Implementations perform one blocking round trip per call and must
/// return the response with its body fully read. Failures that prevent an
/// answer from the server (connection refused, DNS, interrupted reads)
/// are reported as [`Error::Environment`].
pub trait Transport: Send + Sync {
    /// Execute one round trip.
    fn exchange(&self, request: &RestRequest) -> Result<RestResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder_accumulates() {
        let req = RestRequest::new(Method::Get)
            .path("items")
            .path("K123")
            .query("start", 0)
            .query("tag", "alpha")
            .query("tag", "beta")
            .header(HEADER_API_VERSION, API_VERSION);

        assert_eq!(req.path_string(), "items/K123");
        assert_eq!(req.query[1], ("tag".to_string(), "alpha".to_string()));
        assert_eq!(req.query[2], ("tag".to_string(), "beta".to_string()));
        assert_eq!(req.header_value("api-version"), Some("3"));
    }

    #[test]
    fn test_pagination_headers_are_strict() {
        let resp = RestResponse::new(200).header(HEADER_TOTAL_RESULTS, "250");
        assert_eq!(resp.total_results().unwrap(), 250);

        let err = resp.last_modified_version().unwrap_err();
        assert!(matches!(err, Error::UnexpectedResponse { .. }));

        let garbled = RestResponse::new(200).header(HEADER_TOTAL_RESULTS, "many");
        assert!(matches!(
            garbled.total_results(),
            Err(Error::UnexpectedResponse { .. })
        ));
    }

    #[test]
    fn test_decode_malformed_body() {
        let mut resp = RestResponse::new(200);
        resp.body = b"not json".to_vec();
        let err = resp.decode::<Vec<String>>().unwrap_err();
        assert!(err.is_remote());
    }
}
