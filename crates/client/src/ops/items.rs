//! Item read and write operations.

use std::collections::BTreeSet;

use serde_json::Value;

use biblion_core::{wire, Error, ItemDto, Method, RestRequest, RestResponse, Result, WriteResponseDto};

use crate::command::Operation;
use crate::ops::{expect_status, unexpected_status};

pub(crate) const MSG_LIBRARY_LOCKED: &str = "the target library is locked";
pub(crate) const MSG_VERSION_MISMATCH: &str =
    "the item has changed since retrieval (the provided version no longer matches)";
pub(crate) const MSG_VERSION_REQUIRED: &str =
    "the If-Unmodified-Since-Version header was not provided";
pub(crate) const MSG_INVALID_WRITE: &str = "invalid type/field or unparseable JSON";
pub(crate) const MSG_TOO_MANY_ITEMS: &str = "too many items submitted";

// ============================================================================
// GetItem
// ============================================================================

/// Retrieves a single item by key.
pub struct GetItem {
    key: String,
}

impl GetItem {
    /// Fetch of the item with the given key.
    pub fn new(key: impl Into<String>) -> Self {
        GetItem { key: key.into() }
    }
}

impl Operation for GetItem {
    type Output = ItemDto;

    fn build(&self) -> RestRequest {
        RestRequest::new(Method::Get)
            .path("items")
            .path(self.key.clone())
    }

    fn decode(self, response: RestResponse) -> Result<ItemDto> {
        expect_status(&response, 200)?;
        response.decode()
    }
}

// ============================================================================
// GetItems
// ============================================================================

/// Retrieves a batch of items by key in one call.
///
/// The response contains only the keys that exist; absent keys are not an
/// error.
pub struct GetItems {
    keys: BTreeSet<String>,
}

impl GetItems {
    /// Fetch of the items with the given keys.
    pub fn new(keys: BTreeSet<String>) -> Self {
        GetItems { keys }
    }
}

impl Operation for GetItems {
    type Output = Vec<ItemDto>;

    fn check_ready(&self) -> Result<()> {
        if self.keys.is_empty() {
            return Err(Error::NotReady {
                reason: "no item keys to retrieve".to_string(),
            });
        }
        Ok(())
    }

    fn build(&self) -> RestRequest {
        let joined = self.keys.iter().cloned().collect::<Vec<_>>().join(",");
        RestRequest::new(Method::Get)
            .path("items")
            .query("itemKey", joined)
    }

    fn decode(self, response: RestResponse) -> Result<Vec<ItemDto>> {
        expect_status(&response, 200)?;
        response.decode()
    }
}

// ============================================================================
// SaveItems
// ============================================================================

/// Creates new items from raw item-data JSON objects.
///
/// The server processes each submitted object independently and reports
/// per-object success or failure in the response envelope.
pub struct SaveItems {
    items: Vec<Value>,
}

impl SaveItems {
    /// Creation of the given item-data objects.
    pub fn new(items: Vec<Value>) -> Self {
        SaveItems { items }
    }
}

impl Operation for SaveItems {
    type Output = WriteResponseDto<ItemDto>;

    fn check_ready(&self) -> Result<()> {
        if self.items.is_empty() {
            return Err(Error::NotReady {
                reason: "no items to save".to_string(),
            });
        }
        Ok(())
    }

    fn build(&self) -> RestRequest {
        RestRequest::new(Method::Post)
            .path("items")
            .body(Value::Array(self.items.clone()))
    }

    fn decode(self, response: RestResponse) -> Result<WriteResponseDto<ItemDto>> {
        match response.status {
            200 => response.decode(),
            400 => Err(Error::rest(400, MSG_INVALID_WRITE, Vec::new())),
            409 => Err(Error::rest(409, MSG_LIBRARY_LOCKED, Vec::new())),
            412 => Err(Error::rest(412, MSG_VERSION_MISMATCH, Vec::new())),
            413 => Err(Error::rest(413, MSG_TOO_MANY_ITEMS, Vec::new())),
            _ => Err(unexpected_status(&response)),
        }
    }
}

// ============================================================================
// UpdateItem
// ============================================================================

/// Replaces the data of an existing item, guarded by its version.
///
/// On success the server reports the new library version, which becomes the
/// item's version.
pub struct UpdateItem {
    key: String,
    version: u64,
    data: Value,
}

impl UpdateItem {
    /// Update of item `key`, last seen at `version`, to `data`.
    pub fn new(key: impl Into<String>, version: u64, data: Value) -> Self {
        UpdateItem {
            key: key.into(),
            version,
            data,
        }
    }
}

impl Operation for UpdateItem {
    type Output = u64;

    fn build(&self) -> RestRequest {
        RestRequest::new(Method::Put)
            .path("items")
            .path(self.key.clone())
            .header(
                wire::HEADER_IF_UNMODIFIED_SINCE_VERSION,
                self.version.to_string(),
            )
            .body(self.data.clone())
    }

    fn decode(self, response: RestResponse) -> Result<u64> {
        match response.status {
            204 => response.last_modified_version(),
            400 => Err(Error::rest(400, MSG_INVALID_WRITE, vec![self.key])),
            409 => Err(Error::rest(409, MSG_LIBRARY_LOCKED, vec![self.key])),
            412 => Err(Error::rest(412, MSG_VERSION_MISMATCH, vec![self.key])),
            428 => Err(Error::rest(428, MSG_VERSION_REQUIRED, vec![self.key])),
            _ => Err(unexpected_status(&response)),
        }
    }
}

// ============================================================================
// DeleteItems
// ============================================================================

/// Deletes up to 50 items in one call, guarded by the library version.
pub struct DeleteItems {
    keys: BTreeSet<String>,
    version: u64,
}

/// Server-imposed cap on keys per delete call.
pub const MAX_DELETE_KEYS: usize = 50;

impl DeleteItems {
    /// Deletion of `keys`, valid as of library `version`.
    pub fn new(keys: BTreeSet<String>, version: u64) -> Self {
        DeleteItems { keys, version }
    }

    fn joined_keys(&self) -> String {
        self.keys.iter().cloned().collect::<Vec<_>>().join(",")
    }
}

impl Operation for DeleteItems {
    type Output = ();

    fn check_ready(&self) -> Result<()> {
        if self.keys.is_empty() {
            return Err(Error::NotReady {
                reason: "no items to delete".to_string(),
            });
        }
        if self.keys.len() > MAX_DELETE_KEYS {
            return Err(Error::NotReady {
                reason: format!(
                    "{} items exceed the delete cap of {MAX_DELETE_KEYS}",
                    self.keys.len()
                ),
            });
        }
        Ok(())
    }

    fn build(&self) -> RestRequest {
        RestRequest::new(Method::Delete)
            .path("items")
            .query("itemKey", self.joined_keys())
            .header(
                wire::HEADER_IF_UNMODIFIED_SINCE_VERSION,
                self.version.to_string(),
            )
    }

    fn decode(self, response: RestResponse) -> Result<()> {
        let keys = || self.keys.iter().cloned().collect::<Vec<_>>();
        match response.status {
            204 => Ok(()),
            409 => Err(Error::rest(409, MSG_LIBRARY_LOCKED, keys())),
            412 => Err(Error::rest(412, MSG_VERSION_MISMATCH, keys())),
            428 => Err(Error::rest(428, MSG_VERSION_REQUIRED, keys())),
            _ => Err(unexpected_status(&response)),
        }
    }
}
