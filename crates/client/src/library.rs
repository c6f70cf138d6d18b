//! The library handle: one remote library plus how to reach it.
//!
//! A [`Library`] bundles a scope (user or group), optional credentials and
//! a shared [`CommandExecutor`]. It is cheap to clone and safe to share;
//! every remote operation in this crate is reachable from it.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;

use biblion_core::{
    CollectionDto, Credentials, Error, GroupDto, ItemDto, LibraryScope, Result, WriteResponseDto,
};
use biblion_search::{ItemQuery, ItemQueryBuilder};

use crate::command::Command;
use crate::executor::CommandExecutor;
use crate::item_set::ItemSet;
use crate::ops::{
    CollectionSelector, DeleteCollections, DeleteItems, GetCollection, GetCollections, GetItem,
    GetItems, GetUserGroups, SaveCollections, SaveItems, UpdateCollection, UpdateItem,
};
use crate::pending::PendingResultExt;

/// Handle to one remote library.
#[derive(Clone)]
pub struct Library {
    inner: Arc<Inner>,
}

struct Inner {
    scope: LibraryScope,
    credentials: Option<Credentials>,
    executor: Arc<CommandExecutor>,
}

impl Library {
    /// Builds a handle for `scope`, authenticated with `credentials` when
    /// given, executing on `executor`.
    pub fn new(
        scope: LibraryScope,
        credentials: Option<Credentials>,
        executor: Arc<CommandExecutor>,
    ) -> Self {
        Library {
            inner: Arc::new(Inner {
                scope,
                credentials,
                executor,
            }),
        }
    }

    /// Handle to the authenticated user's own library.
    pub fn user(credentials: Credentials, executor: Arc<CommandExecutor>) -> Self {
        let scope = LibraryScope::user(credentials.user_id());
        Library::new(scope, Some(credentials), executor)
    }

    /// Handle to a group library, using the given account's credentials.
    pub fn group(
        group_id: impl Into<String>,
        credentials: Credentials,
        executor: Arc<CommandExecutor>,
    ) -> Self {
        Library::new(LibraryScope::group(group_id), Some(credentials), executor)
    }

    /// The library's scope.
    pub fn scope(&self) -> &LibraryScope {
        &self.inner.scope
    }

    /// The credentials in use, if any.
    pub fn credentials(&self) -> Option<&Credentials> {
        self.inner.credentials.as_ref()
    }

    /// The executor shared by commands built on this handle.
    pub fn executor(&self) -> Arc<CommandExecutor> {
        Arc::clone(&self.inner.executor)
    }

    // ========================================================================
    // Items
    // ========================================================================

    /// A fresh query builder for this library.
    pub fn item_query(&self) -> ItemQueryBuilder {
        ItemQueryBuilder::new()
    }

    /// Runs `query` and returns the pinned, paginated result set.
    pub fn search(&self, query: &ItemQuery) -> Result<ItemSet> {
        ItemSet::new(self.clone(), query.data().clone())
    }

    /// Retrieves one item by key.
    pub fn get_item(&self, key: &str) -> Result<ItemDto> {
        let handle = Command::scoped(self, GetItem::new(key)).execute()?;
        self.executor()
            .unwrap(&handle, || format!("failed to retrieve item {key}"))
    }

    /// Retrieves a batch of items by key. Keys the server does not know
    /// are simply absent from the result.
    pub fn get_items(&self, keys: BTreeSet<String>) -> Result<Vec<ItemDto>> {
        let handle = Command::scoped(self, GetItems::new(keys)).execute()?;
        self.executor()
            .unwrap(&handle, || "failed to retrieve items".to_string())
    }

    /// Creates items from raw item-data objects and returns the per-record
    /// write envelope.
    pub fn save_items(&self, items: Vec<Value>) -> Result<WriteResponseDto<ItemDto>> {
        let handle = Command::scoped(self, SaveItems::new(items)).execute()?;
        self.executor()
            .unwrap(&handle, || "failed to save items".to_string())
    }

    /// Creates a single item and returns the stored record.
    pub fn save_item(&self, item: Value) -> Result<ItemDto> {
        let handle = Command::scoped(self, SaveItems::new(vec![item])).execute()?;
        let first = handle.adapt(|mut envelope: WriteResponseDto<ItemDto>| {
            envelope.successful.remove("0")
        });
        self.executor()
            .unwrap(&first, || "failed to save item".to_string())?
            .ok_or_else(|| Error::unexpected("write acknowledged without a stored record"))
    }

    /// Replaces an item's data, guarded by `version`. Returns the item's
    /// new version.
    pub fn update_item(&self, key: &str, version: u64, data: Value) -> Result<u64> {
        let handle = Command::scoped(self, UpdateItem::new(key, version, data)).execute()?;
        self.executor()
            .unwrap(&handle, || format!("failed to update item {key}"))
    }

    /// Deletes the given items, guarded by the library `version`.
    pub fn delete_items(&self, keys: BTreeSet<String>, version: u64) -> Result<()> {
        let handle = Command::scoped(self, DeleteItems::new(keys, version)).execute()?;
        self.executor()
            .unwrap(&handle, || "failed to delete items".to_string())
    }

    // ========================================================================
    // Collections
    // ========================================================================

    /// Retrieves one collection by key.
    pub fn get_collection(&self, key: &str) -> Result<CollectionDto> {
        let handle = Command::scoped(self, GetCollection::new(key)).execute()?;
        self.executor()
            .unwrap(&handle, || format!("failed to retrieve collection {key}"))
    }

    /// Lists collections per `selector`.
    pub fn get_collections(&self, selector: CollectionSelector) -> Result<Vec<CollectionDto>> {
        let handle = Command::scoped(self, GetCollections::new(selector)).execute()?;
        self.executor()
            .unwrap(&handle, || "failed to list collections".to_string())
    }

    /// Creates collections from raw collection-data objects.
    pub fn save_collections(
        &self,
        collections: Vec<Value>,
    ) -> Result<WriteResponseDto<CollectionDto>> {
        let handle = Command::scoped(self, SaveCollections::new(collections)).execute()?;
        self.executor()
            .unwrap(&handle, || "failed to save collections".to_string())
    }

    /// Replaces a collection's data, guarded by `version`. Returns the new
    /// version.
    pub fn update_collection(&self, key: &str, version: u64, data: Value) -> Result<u64> {
        let handle = Command::scoped(self, UpdateCollection::new(key, version, data)).execute()?;
        self.executor()
            .unwrap(&handle, || format!("failed to update collection {key}"))
    }

    /// Deletes the given collections, guarded by the library `version`.
    pub fn delete_collections(&self, keys: BTreeSet<String>, version: u64) -> Result<()> {
        let handle = Command::scoped(self, DeleteCollections::new(keys, version)).execute()?;
        self.executor()
            .unwrap(&handle, || "failed to delete collections".to_string())
    }

    // ========================================================================
    // Groups
    // ========================================================================

    /// Lists the groups the authenticated user belongs to.
    ///
    /// Requires credentials; group endpoints are account-scoped rather than
    /// library-scoped.
    pub fn user_groups(&self) -> Result<Vec<GroupDto>> {
        let credentials = self.credentials().cloned().ok_or_else(|| Error::NotReady {
            reason: "listing groups requires credentials".to_string(),
        })?;
        let user_id = credentials.user_id().to_string();
        let command = Command::unscoped(
            self.executor(),
            Some(credentials),
            GetUserGroups::new(user_id),
        );
        let handle = command.execute()?;
        self.executor()
            .unwrap(&handle, || "failed to list user groups".to_string())
    }
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("scope", &self.inner.scope)
            .field("authenticated", &self.inner.credentials.is_some())
            .finish_non_exhaustive()
    }
}
