//! Search query data model.
//!
//! [`ItemQueryData`] is the serializable snapshot of one search: scope,
//! phrase, type and tag constraints, sort order, and pagination window.
//! It is pure data; translating it into a wire request is the client
//! crate's concern. Snapshots are cheap to clone and are copied
//! defensively whenever they are embedded in a command or a result set,
//! so later builder mutation can never affect an issued request.

use serde::{Deserialize, Serialize};

use crate::filter::TagFilter;

/// Smallest accepted page size.
pub const MIN_LIMIT: u32 = 1;

/// Largest page size the service will honor.
pub const MAX_LIMIT: u32 = 100;

/// Default page size.
pub const DEFAULT_LIMIT: u32 = 100;

/// Which fields a free-text phrase searches over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryMode {
    /// Titles plus individual creator fields (the service default).
    #[default]
    TitleCreatorYear,
    /// All indexed fields, including full text.
    Everything,
}

impl QueryMode {
    /// The wire value for the `qmode` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryMode::TitleCreatorYear => "titleCreatorYear",
            QueryMode::Everything => "everything",
        }
    }
}

/// The field used to order search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub enum SortField {
    DateAdded,
    DateModified,
    Title,
    Creator,
    Type,
    Date,
    Publisher,
    PublicationTitle,
    JournalAbbreviation,
    Language,
    AccessDate,
    LibraryCatalog,
    CallNumber,
    Rights,
    AddedBy,
    /// Only meaningful when retrieving tags.
    NumItems,
}

impl SortField {
    /// The wire value for the `sort` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::DateAdded => "dateAdded",
            SortField::DateModified => "dateModified",
            SortField::Title => "title",
            SortField::Creator => "creator",
            SortField::Type => "type",
            SortField::Date => "date",
            SortField::Publisher => "publisher",
            SortField::PublicationTitle => "publicationTitle",
            SortField::JournalAbbreviation => "journalAbbreviation",
            SortField::Language => "language",
            SortField::AccessDate => "accessDate",
            SortField::LibraryCatalog => "libraryCatalog",
            SortField::CallNumber => "callNumber",
            SortField::Rights => "rights",
            SortField::AddedBy => "addedBy",
            SortField::NumItems => "numItems",
        }
    }
}

/// Sorting direction. The service default varies by [`SortField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// The wire value for the `direction` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Serializable representation of a search.
///
/// Some parameters with valid service-side defaults are defined here
/// explicitly, for the sake of being explicit when snapshots are cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemQueryData {
    /// Restrict the search to one collection; `None` searches the whole
    /// library.
    pub collection_id: Option<String>,
    /// Descend into sub-collections (the default), or stay at the top
    /// level.
    pub recursive: bool,
    /// Free-text phrase.
    pub q: Option<String>,
    /// Fields the phrase searches over.
    pub qmode: QueryMode,
    /// Sort field.
    pub sort_by: Option<SortField>,
    /// Sort direction.
    pub sort_dir: Option<SortDirection>,
    /// Item types to include; a leading `-` excludes a type.
    pub item_types: Vec<String>,
    /// Tag constraint in conjunctive normal form.
    pub tag_filter: Option<TagFilter>,
    /// Index of the first result to return.
    pub start: u32,
    /// Page size, within `[MIN_LIMIT, MAX_LIMIT]`.
    pub limit: u32,
    /// Only return records modified after this library version.
    pub since: Option<u64>,
}

impl Default for ItemQueryData {
    fn default() -> Self {
        ItemQueryData {
            collection_id: None,
            recursive: true,
            q: None,
            qmode: QueryMode::default(),
            sort_by: None,
            sort_dir: None,
            item_types: Vec::new(),
            tag_filter: None,
            start: 0,
            limit: DEFAULT_LIMIT,
            since: None,
        }
    }
}

impl ItemQueryData {
    /// A copy of this query scoped to the given page: `start` becomes
    /// `page * limit`.
    pub fn for_page(&self, page: usize) -> ItemQueryData {
        let mut data = self.clone();
        data.start = (page as u32).saturating_mul(data.limit);
        data
    }
}
