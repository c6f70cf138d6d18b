//! REST data vehicles.
//!
//! These structs mirror the JSON shapes returned by the remote service.
//! They are deliberately raw: commands return DTOs and leave the mapping
//! into a richer domain model to the caller. Unknown fields are ignored so
//! that additive server changes do not break decoding; the free-form
//! `data` maps carry the type-specific bibliographic fields untouched.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A link entry from a `links` map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimpleLink {
    /// Target URL.
    #[serde(default)]
    pub href: String,
    /// Media type of the target.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Display title, when provided.
    #[serde(default)]
    pub title: Option<String>,
    /// Payload size in bytes, for attachment links.
    #[serde(default)]
    pub length: Option<u64>,
}

/// Reference to the library that owns a record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryRefDto {
    /// `user` or `group`.
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Library id.
    #[serde(default)]
    pub id: serde_json::Value,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Related links.
    #[serde(default)]
    pub links: HashMap<String, SimpleLink>,
}

/// Server-computed display metadata for an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetaDto {
    /// Formatted creator summary, e.g. `"Smith et al."`.
    #[serde(default)]
    pub creator_summary: String,
    /// Parsed publication date.
    #[serde(default)]
    pub parsed_date: String,
    /// Number of child records (notes, attachments).
    #[serde(default)]
    pub num_children: u32,
}

/// A bibliographic item as returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemDto {
    /// Record key.
    #[serde(default)]
    pub key: String,
    /// Record version.
    #[serde(default)]
    pub version: u64,
    /// Owning library.
    #[serde(default)]
    pub library: Option<LibraryRefDto>,
    /// Related links.
    #[serde(default)]
    pub links: HashMap<String, SimpleLink>,
    /// Display metadata.
    #[serde(default)]
    pub meta: Option<ItemMetaDto>,
    /// Type-specific fields (`itemType`, `title`, `creators`, ...).
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

/// A tag attached to an item, as it appears inside `data.tags`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemTagDto {
    /// Tag text.
    #[serde(default)]
    pub tag: String,
    /// Tag kind flag reported by the server.
    #[serde(default, rename = "type")]
    pub kind: Option<u32>,
}

/// Collection counts reported alongside a collection record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionMetaDto {
    /// Number of child collections.
    #[serde(default)]
    pub num_collections: u32,
    /// Number of items in the collection.
    #[serde(default)]
    pub num_items: u32,
}

/// Editable fields of a collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDataDto {
    /// Record key.
    #[serde(default)]
    pub key: String,
    /// Record version.
    #[serde(default)]
    pub version: u64,
    /// Collection name.
    #[serde(default)]
    pub name: String,
    /// Parent collection key; absent (or `false` on the wire) for
    /// top-level collections.
    #[serde(default)]
    pub parent_collection: serde_json::Value,
    /// Relation links to other records.
    #[serde(default)]
    pub relations: serde_json::Map<String, serde_json::Value>,
}

/// A collection record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionDto {
    /// Record key.
    #[serde(default)]
    pub key: String,
    /// Record version.
    #[serde(default)]
    pub version: u64,
    /// Owning library.
    #[serde(default)]
    pub library: Option<LibraryRefDto>,
    /// Related links.
    #[serde(default)]
    pub links: HashMap<String, SimpleLink>,
    /// Counts.
    #[serde(default)]
    pub meta: Option<CollectionMetaDto>,
    /// Editable fields.
    #[serde(default)]
    pub data: CollectionDataDto,
}

/// Group metadata reported alongside a group record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMetaDto {
    /// Creation timestamp.
    #[serde(default)]
    pub created: String,
    /// Last modification timestamp.
    #[serde(default)]
    pub last_modified: String,
    /// Number of items in the group library.
    #[serde(default)]
    pub num_items: u32,
}

/// Editable fields of a group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDataDto {
    /// Group id.
    #[serde(default)]
    pub id: u64,
    /// Record version.
    #[serde(default)]
    pub version: u64,
    /// Account id of the group owner.
    #[serde(default)]
    pub owner: u64,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Group type (`Private`, `PublicOpen`, ...).
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Public URL.
    #[serde(default)]
    pub url: String,
    /// Who may edit library records.
    #[serde(default)]
    pub library_editing: String,
    /// Who may read library records.
    #[serde(default)]
    pub library_reading: String,
    /// Who may edit file attachments.
    #[serde(default)]
    pub file_editing: String,
}

/// A group library the account participates in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupDto {
    /// Group id.
    #[serde(default)]
    pub id: u64,
    /// Record version.
    #[serde(default)]
    pub version: u64,
    /// Related links.
    #[serde(default)]
    pub links: HashMap<String, SimpleLink>,
    /// Group metadata.
    #[serde(default)]
    pub meta: Option<GroupMetaDto>,
    /// Editable fields.
    #[serde(default)]
    pub data: GroupDataDto,
}

/// Outcome entry for a record the server refused to write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteFailureDto {
    /// Machine-readable failure code.
    #[serde(default)]
    pub code: u32,
    /// Human-readable failure message.
    #[serde(default)]
    pub message: String,
}

/// Multi-record write acknowledgement.
///
/// Maps are keyed by the zero-based index of the record in the submitted
/// batch, rendered as a string (`"0"`, `"1"`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteResponseDto<T> {
    /// Records the server created or replaced, in full.
    #[serde(default = "HashMap::new")]
    pub successful: HashMap<String, T>,
    /// Records that matched the server state and were left untouched.
    #[serde(default)]
    pub unchanged: HashMap<String, String>,
    /// Records the server rejected.
    #[serde(default)]
    pub failed: HashMap<String, WriteFailureDto>,
}
