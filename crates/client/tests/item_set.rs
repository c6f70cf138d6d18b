//! End-to-end tests of paginated listings over a scripted transport.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::json;

use biblion_client::{CommandExecutor, Library};
use biblion_core::{
    wire, Credentials, Error, LibraryScope, Method, RestRequest, RestResponse, Result, Transport,
};

/// Serves item listing pages from a fixed corpus, with a switchable
/// snapshot so tests can simulate the library changing mid-iteration.
struct PagedTransport {
    items: Vec<serde_json::Value>,
    version: Mutex<u64>,
    reported_total: Mutex<Option<u64>>,
    dispatches: AtomicUsize,
}

impl PagedTransport {
    fn new(count: usize) -> Arc<Self> {
        let items = (0..count)
            .map(|i| json!({"key": format!("K{i:04}"), "version": 1}))
            .collect();
        Arc::new(Self {
            items,
            version: Mutex::new(10),
            reported_total: Mutex::new(None),
            dispatches: AtomicUsize::new(0),
        })
    }

    fn bump_version(&self) {
        *self.version.lock() += 1;
    }

    fn report_total(&self, total: u64) {
        *self.reported_total.lock() = Some(total);
    }

    fn dispatch_count(&self) -> usize {
        self.dispatches.load(Ordering::SeqCst)
    }

    fn param<'a>(request: &'a RestRequest, name: &str) -> Option<&'a str> {
        request
            .query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl Transport for PagedTransport {
    fn exchange(&self, request: &RestRequest) -> Result<RestResponse> {
        self.dispatches.fetch_add(1, Ordering::SeqCst);
        assert_eq!(request.method, Method::Get);

        let start: usize = Self::param(request, "start")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let limit: usize = Self::param(request, "limit")
            .and_then(|v| v.parse().ok())
            .unwrap_or(100);
        let end = (start + limit).min(self.items.len());
        let slice: Vec<_> = self.items[start.min(end)..end].to_vec();

        let total = self
            .reported_total
            .lock()
            .unwrap_or(self.items.len() as u64);
        Ok(RestResponse::new(200)
            .header(wire::HEADER_TOTAL_RESULTS, total.to_string())
            .header(wire::HEADER_LAST_MODIFIED_VERSION, self.version.lock().to_string())
            .json(&slice))
    }
}

fn library(transport: Arc<PagedTransport>) -> Library {
    let executor = Arc::new(
        CommandExecutor::with_config(transport, 4, Duration::from_secs(5)).unwrap(),
    );
    Library::new(
        LibraryScope::user("42"),
        Some(Credentials::new("42", "token")),
        executor,
    )
}

#[test]
fn eager_first_page_pins_total_and_version() {
    let transport = PagedTransport::new(250);
    let lib = library(transport.clone());

    let query = lib.item_query().build();
    let set = lib.search(&query).unwrap();

    assert_eq!(set.len(), 250);
    assert_eq!(set.version(), 10);
    assert_eq!(transport.dispatch_count(), 1);
}

#[test]
fn pages_fetched_once_on_demand() {
    let transport = PagedTransport::new(250);
    let lib = library(transport.clone());
    let set = lib.search(&lib.item_query().build()).unwrap();

    // Page 0 came with construction.
    assert_eq!(set.get(5).unwrap().key, "K0005");
    assert_eq!(transport.dispatch_count(), 1);

    // Page 2 fetched once, then served from cache.
    assert_eq!(set.get(205).unwrap().key, "K0205");
    assert_eq!(set.get(249).unwrap().key, "K0249");
    assert_eq!(transport.dispatch_count(), 2);

    // Page 1 still untouched until asked for.
    assert_eq!(set.get(100).unwrap().key, "K0100");
    assert_eq!(transport.dispatch_count(), 3);
}

#[test]
fn out_of_bounds_index_is_a_usage_error() {
    let transport = PagedTransport::new(42);
    let lib = library(transport);
    let set = lib.search(&lib.item_query().build()).unwrap();

    match set.get(42).unwrap_err() {
        Error::IndexOutOfBounds { index, size } => {
            assert_eq!(index, 42);
            assert_eq!(size, 42);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn version_drift_poisons_the_set() {
    let transport = PagedTransport::new(250);
    let lib = library(transport.clone());
    let set = lib.search(&lib.item_query().build()).unwrap();

    transport.bump_version();

    assert!(matches!(
        set.get(150).unwrap_err(),
        Error::ConcurrentModification
    ));
    assert!(set.is_poisoned());

    // Even indices whose page is already cached are refused now.
    assert!(matches!(
        set.get(0).unwrap_err(),
        Error::ConcurrentModification
    ));

    // Reload picks up the new snapshot.
    let fresh = set.reload().unwrap();
    assert_eq!(fresh.version(), 11);
    assert_eq!(fresh.get(150).unwrap().key, "K0150");
}

#[test]
fn total_drift_poisons_the_set() {
    let transport = PagedTransport::new(250);
    let lib = library(transport.clone());
    let set = lib.search(&lib.item_query().build()).unwrap();

    transport.report_total(251);

    assert!(matches!(
        set.get(200).unwrap_err(),
        Error::ConcurrentModification
    ));
    assert!(set.is_poisoned());
}

#[test]
fn iter_walks_every_page_in_order() {
    let transport = PagedTransport::new(130);
    let lib = library(transport.clone());
    let query = lib.item_query().limit(50).build();
    let set = lib.search(&query).unwrap();

    let keys: Vec<String> = set.iter().map(|r| r.unwrap().key).collect();
    assert_eq!(keys.len(), 130);
    assert_eq!(keys[0], "K0000");
    assert_eq!(keys[129], "K0129");
    // Pages 0 (eager), 1, 2.
    assert_eq!(transport.dispatch_count(), 3);
}

#[test]
fn derived_query_builder_carries_the_original() {
    let transport = PagedTransport::new(10);
    let lib = library(transport);
    let query = lib.item_query().limit(5).query("tides").build();
    let set = lib.search(&query).unwrap();

    let derived = set.query().start(5).build();
    assert_eq!(derived.data().limit, 5);
    assert_eq!(derived.data().q.as_deref(), Some("tides"));
    assert_eq!(derived.data().start, 5);
}

#[test]
fn empty_listing_is_empty() {
    let transport = PagedTransport::new(0);
    let lib = library(transport);
    let set = lib.search(&lib.item_query().build()).unwrap();

    assert!(set.is_empty());
    assert!(matches!(
        set.get(0).unwrap_err(),
        Error::IndexOutOfBounds { .. }
    ));
}
