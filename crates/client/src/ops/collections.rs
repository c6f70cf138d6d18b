//! Collection read and write operations.

use std::collections::BTreeSet;

use serde_json::Value;

use biblion_core::{
    wire, CollectionDto, Error, Method, RestRequest, RestResponse, Result, WriteResponseDto,
};

use crate::command::Operation;
use crate::ops::items::{
    MSG_INVALID_WRITE, MSG_LIBRARY_LOCKED, MSG_TOO_MANY_ITEMS, MSG_VERSION_MISMATCH,
    MSG_VERSION_REQUIRED,
};
use crate::ops::{expect_status, unexpected_status};

/// Which slice of the collection tree a listing covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionSelector {
    /// Every collection in the library.
    All,
    /// Only top-level collections.
    Top,
    /// Direct subcollections of the named collection.
    Children(String),
}

// ============================================================================
// Reads
// ============================================================================

/// Retrieves a single collection by key.
pub struct GetCollection {
    key: String,
}

impl GetCollection {
    /// Fetch of the collection with the given key.
    pub fn new(key: impl Into<String>) -> Self {
        GetCollection { key: key.into() }
    }
}

impl Operation for GetCollection {
    type Output = CollectionDto;

    fn build(&self) -> RestRequest {
        RestRequest::new(Method::Get)
            .path("collections")
            .path(self.key.clone())
    }

    fn decode(self, response: RestResponse) -> Result<CollectionDto> {
        expect_status(&response, 200)?;
        response.decode()
    }
}

/// Lists collections per a [`CollectionSelector`].
pub struct GetCollections {
    selector: CollectionSelector,
}

impl GetCollections {
    /// Listing of the selected slice of the collection tree.
    pub fn new(selector: CollectionSelector) -> Self {
        GetCollections { selector }
    }
}

impl Operation for GetCollections {
    type Output = Vec<CollectionDto>;

    fn build(&self) -> RestRequest {
        let request = RestRequest::new(Method::Get).path("collections");
        match &self.selector {
            CollectionSelector::All => request,
            CollectionSelector::Top => request.path("top"),
            CollectionSelector::Children(key) => {
                request.path(key.clone()).path("collections")
            }
        }
    }

    fn decode(self, response: RestResponse) -> Result<Vec<CollectionDto>> {
        expect_status(&response, 200)?;
        response.decode()
    }
}

// ============================================================================
// Writes
// ============================================================================

/// Creates new collections from raw collection-data JSON objects.
pub struct SaveCollections {
    collections: Vec<Value>,
}

impl SaveCollections {
    /// Creation of the given collection-data objects.
    pub fn new(collections: Vec<Value>) -> Self {
        SaveCollections { collections }
    }
}

impl Operation for SaveCollections {
    type Output = WriteResponseDto<CollectionDto>;

    fn check_ready(&self) -> Result<()> {
        if self.collections.is_empty() {
            return Err(Error::NotReady {
                reason: "no collections to save".to_string(),
            });
        }
        Ok(())
    }

    fn build(&self) -> RestRequest {
        RestRequest::new(Method::Post)
            .path("collections")
            .body(Value::Array(self.collections.clone()))
    }

    fn decode(self, response: RestResponse) -> Result<WriteResponseDto<CollectionDto>> {
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

/// Replaces the data of an existing collection, guarded by its version.
pub struct UpdateCollection {
    key: String,
    version: u64,
    data: Value,
}

impl UpdateCollection {
    /// Update of collection `key`, last seen at `version`, to `data`.
    pub fn new(key: impl Into<String>, version: u64, data: Value) -> Self {
        UpdateCollection {
            key: key.into(),
            version,
            data,
        }
    }
}

impl Operation for UpdateCollection {
    type Output = u64;

    fn build(&self) -> RestRequest {
        RestRequest::new(Method::Put)
            .path("collections")
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

/// Deletes collections in one call, guarded by the library version.
pub struct DeleteCollections {
    keys: BTreeSet<String>,
    version: u64,
}

impl DeleteCollections {
    /// Deletion of `keys`, valid as of library `version`.
    pub fn new(keys: BTreeSet<String>, version: u64) -> Self {
        DeleteCollections { keys, version }
    }
}

impl Operation for DeleteCollections {
    type Output = ();

    fn check_ready(&self) -> Result<()> {
        if self.keys.is_empty() {
            return Err(Error::NotReady {
                reason: "no collections to delete".to_string(),
            });
        }
        Ok(())
    }

    fn build(&self) -> RestRequest {
        let joined = self.keys.iter().cloned().collect::<Vec<_>>().join(",");
        RestRequest::new(Method::Delete)
            .path("collections")
            .query("collectionKey", joined)
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_collections_selectors() {
        assert_eq!(
            GetCollections::new(CollectionSelector::All).build().path,
            vec!["collections"]
        );
        assert_eq!(
            GetCollections::new(CollectionSelector::Top).build().path,
            vec!["collections", "top"]
        );
        assert_eq!(
            GetCollections::new(CollectionSelector::Children("C9".into()))
                .build()
                .path,
            vec!["collections", "C9", "collections"]
        );
    }

    #[test]
    fn test_get_collection_decodes() {
        let op = GetCollection::new("C1");
        let response = RestResponse::new(200).json(&json!({
            "key": "C1",
            "version": 3,
            "data": {"name": "Reading list", "parentCollection": false}
        }));
        let collection = op.decode(response).unwrap();
        assert_eq!(collection.key, "C1");
        assert_eq!(collection.data.name, "Reading list");
    }

    #[test]
    fn test_update_collection_guard_and_version() {
        let op = UpdateCollection::new("C1", 5, json!({"name": "x"}));
        let request = op.build();
        assert_eq!(
            request.header_value(wire::HEADER_IF_UNMODIFIED_SINCE_VERSION),
            Some("5")
        );
        let response =
            RestResponse::new(204).header(wire::HEADER_LAST_MODIFIED_VERSION, "6");
        assert_eq!(op.decode(response).unwrap(), 6);
    }

    #[test]
    fn test_delete_collections_param_name() {
        let keys: BTreeSet<String> = ["C2", "C1"].iter().map(|s| s.to_string()).collect();
        let request = DeleteCollections::new(keys, 7).build();
        assert_eq!(
            request.query,
            vec![("collectionKey".to_string(), "C1,C2".to_string())]
        );
    }
}
