//! Immutable query builder.
//!
//! Every setter copies the current snapshot, mutates the copy, and
//! returns a new builder wrapping it; the receiver is never altered. This
//! lets a caller keep a prototype query around and derive variations from
//! it. `build()` yields an [`ItemQuery`] snapshot that can be handed to
//! the client crate for execution; the snapshot can be turned back into a
//! builder for derived searches.

use crate::filter::{self, TagFilter};
use crate::query::{ItemQueryData, QueryMode, SortDirection, SortField, MAX_LIMIT, MIN_LIMIT};

/// Accumulates search parameters immutably.
///
/// All parameters have sensible defaults, so an empty builder can be
/// built and executed immediately.
#[derive(Debug, Clone, Default)]
pub struct ItemQueryBuilder {
    data: ItemQueryData,
}

impl ItemQueryBuilder {
    /// A builder with all defaults.
    pub fn new() -> Self {
        ItemQueryBuilder::default()
    }

    /// A builder pre-seeded with an existing snapshot.
    pub fn seeded(data: ItemQueryData) -> Self {
        ItemQueryBuilder { data }
    }

    fn update(&self, mutate: impl FnOnce(&mut ItemQueryData)) -> Self {
        let mut data = self.data.clone();
        mutate(&mut data);
        ItemQueryBuilder { data }
    }

    /// Search only within the given collection; `None` searches the
    /// whole library.
    pub fn search_within(&self, collection_id: Option<&str>) -> Self {
        self.update(|d| d.collection_id = collection_id.map(str::to_string))
    }

    /// Descend into sub-collections recursively, or search only the top
    /// level of the current scope.
    pub fn recursive(&self, recursive: bool) -> Self {
        self.update(|d| d.recursive = recursive)
    }

    /// Phrase to search for, over titles and creator fields.
    pub fn query(&self, q: &str) -> Self {
        self.query_mode(q, QueryMode::TitleCreatorYear)
    }

    /// Phrase to search for, with an explicit query mode.
    pub fn query_mode(&self, q: &str, mode: QueryMode) -> Self {
        self.update(|d| {
            d.q = Some(q.to_string());
            d.qmode = mode;
        })
    }

    /// Sort results by `field`, using the service default direction.
    pub fn sort(&self, field: SortField) -> Self {
        self.update(|d| {
            d.sort_by = Some(field);
            d.sort_dir = None;
        })
    }

    /// Sort results by `field` in the given direction.
    pub fn sort_directed(&self, field: SortField, direction: SortDirection) -> Self {
        self.update(|d| {
            d.sort_by = Some(field);
            d.sort_dir = Some(direction);
        })
    }

    /// Show only items matching one of the supplied types. Replaces any
    /// previously configured type constraint.
    pub fn of_type(&self, item_types: &[&str]) -> Self {
        self.update(|d| d.item_types = item_types.iter().map(|t| t.to_string()).collect())
    }

    /// Exclude items of a specific type. Replaces any previously
    /// configured type constraint.
    pub fn exclude_type(&self, item_type: &str) -> Self {
        self.update(|d| d.item_types = vec![format!("-{item_type}")])
    }

    /// Keep only items carrying `tag`. Like the other tag methods, this
    /// resets any pre-existing tag filter.
    pub fn has_tag(&self, tag: &str) -> Self {
        self.filter(filter::filter(tag).into())
    }

    /// Keep only items carrying every one of `tags`.
    pub fn has_all_tags(&self, tags: &[&str]) -> Self {
        if tags.is_empty() {
            return self.clone();
        }
        self.filter(filter::all(tags).into())
    }

    /// Keep only items carrying at least one of `tags`.
    pub fn has_any_tags(&self, tags: &[&str]) -> Self {
        if tags.is_empty() {
            return self.clone();
        }
        self.filter(filter::any(tags).into())
    }

    /// Apply a composed tag filter, replacing any existing one.
    pub fn filter(&self, filter: TagFilter) -> Self {
        self.update(|d| d.tag_filter = Some(filter))
    }

    /// Index of the first result. Combine with [`limit`](Self::limit) to
    /// select a slice of the available results.
    pub fn start(&self, start: u32) -> Self {
        self.update(|d| d.start = start)
    }

    /// Maximum number of results per request, clamped to `[1, 100]`.
    pub fn limit(&self, limit: u32) -> Self {
        self.update(|d| d.limit = limit.clamp(MIN_LIMIT, MAX_LIMIT))
    }

    /// Return only records modified after the given library version.
    pub fn since(&self, version: u64) -> Self {
        self.update(|d| d.since = Some(version))
    }

    /// Snapshot the current state. May be called multiple times.
    pub fn build(&self) -> ItemQuery {
        ItemQuery {
            data: self.data.clone(),
        }
    }
}

/// An immutable, executable search snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemQuery {
    data: ItemQueryData,
}

impl ItemQuery {
    /// The underlying query data.
    pub fn data(&self) -> &ItemQueryData {
        &self.data
    }

    /// A builder pre-seeded with this snapshot, for derived searches.
    pub fn to_builder(&self) -> ItemQueryBuilder {
        ItemQueryBuilder::seeded(self.data.clone())
    }
}

impl From<ItemQuery> for ItemQueryData {
    fn from(query: ItemQuery) -> Self {
        query.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters_return_new_builders() {
        let base = ItemQueryBuilder::new();
        let refined = base
            .query("divine comedy")
            .recursive(false)
            .sort(SortField::Title);

        // the original is untouched
        assert_eq!(base.build().data(), &ItemQueryData::default());

        let data = refined.build();
        assert_eq!(data.data().q.as_deref(), Some("divine comedy"));
        assert!(!data.data().recursive);
        assert_eq!(data.data().sort_by, Some(SortField::Title));
    }

    #[test]
    fn test_limit_clamps() {
        assert_eq!(ItemQueryBuilder::new().limit(0).build().data().limit, 1);
        assert_eq!(ItemQueryBuilder::new().limit(500).build().data().limit, 100);
        assert_eq!(ItemQueryBuilder::new().limit(30).build().data().limit, 30);
    }

    #[test]
    fn test_tag_methods_reset_filter() {
        let b = ItemQueryBuilder::new()
            .has_all_tags(&["a", "b"])
            .has_tag("only");

        let data = b.build();
        let f = data.data().tag_filter.as_ref().unwrap();
        assert_eq!(f.build_parameters(), "tag=only");
    }

    #[test]
    fn test_empty_tag_lists_are_no_ops() {
        let b = ItemQueryBuilder::new().has_all_tags(&[]).has_any_tags(&[]);
        assert!(b.build().data().tag_filter.is_none());
    }

    #[test]
    fn test_exclude_type_replaces_includes() {
        let b = ItemQueryBuilder::new()
            .of_type(&["book", "journalArticle"])
            .exclude_type("note");
        assert_eq!(b.build().data().item_types, vec!["-note".to_string()]);
    }

    #[test]
    fn test_snapshot_to_builder_round_trip() {
        let query = ItemQueryBuilder::new()
            .search_within(Some("C7"))
            .since(12)
            .build();

        let derived = query.to_builder().limit(10).build();
        assert_eq!(derived.data().collection_id.as_deref(), Some("C7"));
        assert_eq!(derived.data().since, Some(12));
        assert_eq!(derived.data().limit, 10);
        // the source snapshot is unchanged
        assert_eq!(query.data().limit, 100);
    }
}
