//! End-to-end tests of the library handle over a scripted transport.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::json;

use biblion_client::{CollectionSelector, CommandExecutor, Library};
use biblion_core::{wire, Credentials, Error, RestRequest, RestResponse, Result, Transport};

/// Replays a queue of canned responses and records every request sent.
struct ScriptedTransport {
    responses: Mutex<Vec<RestResponse>>,
    requests: Mutex<Vec<RestRequest>>,
}

impl ScriptedTransport {
    fn new(responses: Vec<RestResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn sent(&self) -> Vec<RestRequest> {
        self.requests.lock().clone()
    }
}

impl Transport for ScriptedTransport {
    fn exchange(&self, request: &RestRequest) -> Result<RestResponse> {
        self.requests.lock().push(request.clone());
        let mut responses = self.responses.lock();
        if responses.is_empty() {
            return Err(Error::environment("no scripted response left"));
        }
        Ok(responses.remove(0))
    }
}

fn user_library(transport: Arc<ScriptedTransport>) -> Library {
    let executor = Arc::new(
        CommandExecutor::with_config(transport, 2, Duration::from_secs(5)).unwrap(),
    );
    Library::user(Credentials::new("42", "secret-token"), executor)
}

#[test]
fn get_item_is_scoped_and_authenticated() {
    let transport = ScriptedTransport::new(vec![
        RestResponse::new(200).json(&json!({"key": "A1", "version": 3})),
    ]);
    let lib = user_library(transport.clone());

    let item = lib.get_item("A1").unwrap();
    assert_eq!(item.key, "A1");

    let sent = transport.sent();
    assert_eq!(sent[0].path, vec!["users", "42", "items", "A1"]);
    assert_eq!(
        sent[0].header_value(wire::HEADER_AUTHORIZATION),
        Some("Bearer secret-token")
    );
    assert_eq!(sent[0].header_value(wire::HEADER_API_VERSION), Some("3"));
}

#[test]
fn group_library_uses_group_path() {
    let transport = ScriptedTransport::new(vec![
        RestResponse::new(200).json(&json!({"key": "B2", "version": 1})),
    ]);
    let executor = Arc::new(
        CommandExecutor::with_config(transport.clone(), 2, Duration::from_secs(5)).unwrap(),
    );
    let lib = Library::group("777", Credentials::new("42", "t"), executor);

    lib.get_item("B2").unwrap();
    assert_eq!(transport.sent()[0].path, vec!["groups", "777", "items", "B2"]);
}

#[test]
fn get_items_requests_by_key_batch() {
    let transport = ScriptedTransport::new(vec![RestResponse::new(200).json(&json!([
        {"key": "A1", "version": 3},
        {"key": "B2", "version": 4}
    ]))]);
    let lib = user_library(transport.clone());

    let keys: BTreeSet<String> = ["B2", "A1"].iter().map(|s| s.to_string()).collect();
    let items = lib.get_items(keys).unwrap();
    assert_eq!(items.len(), 2);

    let sent = transport.sent();
    assert_eq!(sent[0].path, vec!["users", "42", "items"]);
    assert_eq!(
        sent[0].query,
        vec![("itemKey".to_string(), "A1,B2".to_string())]
    );
}

#[test]
fn save_item_unwraps_the_write_envelope() {
    let transport = ScriptedTransport::new(vec![RestResponse::new(200).json(&json!({
        "successful": {"0": {"key": "N1", "version": 12}},
        "unchanged": {},
        "failed": {}
    }))]);
    let lib = user_library(transport.clone());

    let stored = lib.save_item(json!({"itemType": "book", "title": "Tides"})).unwrap();
    assert_eq!(stored.key, "N1");
    assert_eq!(stored.version, 12);

    let sent = transport.sent();
    assert_eq!(
        sent[0].header_value(wire::HEADER_CONTENT_TYPE),
        Some(wire::APPLICATION_JSON)
    );
}

#[test]
fn save_item_without_stored_record_is_unexpected() {
    let transport = ScriptedTransport::new(vec![RestResponse::new(200).json(&json!({
        "successful": {},
        "unchanged": {},
        "failed": {"0": {"code": 400, "message": "invalid field"}}
    }))]);
    let lib = user_library(transport);

    assert!(matches!(
        lib.save_item(json!({})).unwrap_err(),
        Error::UnexpectedResponse { .. }
    ));
}

#[test]
fn update_item_returns_new_version_and_conflicts_pass_through() {
    let transport = ScriptedTransport::new(vec![
        RestResponse::new(204).header(wire::HEADER_LAST_MODIFIED_VERSION, "13"),
        RestResponse::new(412),
    ]);
    let lib = user_library(transport);

    assert_eq!(lib.update_item("A1", 12, json!({"title": "x"})).unwrap(), 13);

    match lib.update_item("A1", 12, json!({"title": "y"})).unwrap_err() {
        Error::Rest { status, keys, .. } => {
            assert_eq!(status, 412);
            assert_eq!(keys, vec!["A1"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn delete_items_sends_version_guard() {
    let transport = ScriptedTransport::new(vec![RestResponse::new(204)]);
    let lib = user_library(transport.clone());

    let keys: BTreeSet<String> = ["A1", "B2"].iter().map(|s| s.to_string()).collect();
    lib.delete_items(keys, 13).unwrap();

    let sent = transport.sent();
    assert_eq!(
        sent[0].header_value(wire::HEADER_IF_UNMODIFIED_SINCE_VERSION),
        Some("13")
    );
    assert_eq!(
        sent[0].query,
        vec![("itemKey".to_string(), "A1,B2".to_string())]
    );
}

#[test]
fn collection_listing_selectors_hit_distinct_paths() {
    let transport = ScriptedTransport::new(vec![
        RestResponse::new(200).json(&json!([])),
        RestResponse::new(200).json(&json!([])),
    ]);
    let lib = user_library(transport.clone());

    lib.get_collections(CollectionSelector::Top).unwrap();
    lib.get_collections(CollectionSelector::Children("C1".into())).unwrap();

    let sent = transport.sent();
    assert_eq!(sent[0].path, vec!["users", "42", "collections", "top"]);
    assert_eq!(sent[1].path, vec!["users", "42", "collections", "C1", "collections"]);
}

#[test]
fn user_groups_bypass_the_library_scope() {
    let transport = ScriptedTransport::new(vec![RestResponse::new(200).json(&json!([
        {"id": 777, "version": 2, "data": {"id": 777, "name": "Reading group"}}
    ]))]);
    let lib = user_library(transport.clone());

    let groups = lib.user_groups().unwrap();
    assert_eq!(groups[0].data.name, "Reading group");

    // The request path is account-scoped, not library-scoped.
    assert_eq!(transport.sent()[0].path, vec!["users", "42", "groups"]);
}

#[test]
fn user_groups_without_credentials_is_a_usage_error() {
    let transport = ScriptedTransport::new(Vec::new());
    let executor = Arc::new(
        CommandExecutor::with_config(transport.clone(), 2, Duration::from_secs(5)).unwrap(),
    );
    let lib = Library::new(biblion_core::LibraryScope::user("42"), None, executor);

    let err = lib.user_groups().unwrap_err();
    assert!(matches!(err, Error::NotReady { .. }));
    assert!(err.is_usage());
    // The contract violation is caught before any dispatch.
    assert!(transport.sent().is_empty());
}

#[test]
fn transport_failures_become_environment_errors() {
    let transport = ScriptedTransport::new(Vec::new());
    let lib = user_library(transport);

    match lib.get_item("A1").unwrap_err() {
        Error::Environment { message } => {
            assert!(message.contains("failed to retrieve item A1"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
