//! Lazily paginated, version-pinned item listings.
//!
//! An [`ItemSet`] is created from one eager fetch of page zero, which pins
//! the listing's total size and library version. Later pages are fetched on
//! demand, at most once each, and verified against the pinned snapshot. Any
//! drift poisons the whole set; the only way forward is [`ItemSet::reload`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use biblion_core::{Error, ItemDto, Result};
use biblion_search::{ItemQueryBuilder, ItemQueryData};

use crate::command::Command;
use crate::library::Library;
use crate::ops::{GetItemsPage, ItemPage};

/// A consistent, random-access view over one item listing.
///
/// Indexing is absolute across the whole listing. `get` resolves the page
/// holding the index, fetching it if needed; concurrent fetches of distinct
/// pages proceed in parallel while each page is fetched at most once.
pub struct ItemSet {
    library: Library,
    query: ItemQueryData,
    pages: DashMap<usize, Arc<OnceCell<Arc<ItemPage>>>>,
    total: u64,
    version: u64,
    poisoned: AtomicBool,
}

impl ItemSet {
    /// Runs the query's first page eagerly and pins the listing snapshot.
    pub fn new(library: Library, query: ItemQueryData) -> Result<Self> {
        let first = Self::fetch(&library, &query, 0)?;
        let set = ItemSet {
            library,
            total: first.total_results,
            version: first.last_modified_version,
            query,
            pages: DashMap::new(),
            poisoned: AtomicBool::new(false),
        };
        set.pages
            .insert(0, Arc::new(OnceCell::with_value(Arc::new(first))));
        Ok(set)
    }

    /// Total records in the listing, across all pages.
    pub fn len(&self) -> u64 {
        self.total
    }

    /// True when the listing matched nothing.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// The library version the listing is pinned to.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// True once any page fetch observed drift from the pinned snapshot.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned.load(Ordering::SeqCst)
    }

    /// The record at absolute `index`, fetching its page if needed.
    pub fn get(&self, index: usize) -> Result<ItemDto> {
        if self.is_poisoned() {
            return Err(Error::ConcurrentModification);
        }
        if index as u64 >= self.total {
            return Err(Error::IndexOutOfBounds {
                index,
                size: self.total as usize,
            });
        }
        let limit = self.query.limit.max(1) as usize;
        let page = self.page(index / limit)?;
        let offset = index % limit;
        page.items.get(offset).cloned().ok_or_else(|| {
            Error::unexpected(format!(
                "page {} holds {} records, expected one at offset {offset}",
                index / limit,
                page.items.len()
            ))
        })
    }

    /// Iterates the whole listing in order, fetching pages as reached.
    pub fn iter(&self) -> impl Iterator<Item = Result<ItemDto>> + '_ {
        (0..self.total as usize).map(move |index| self.get(index))
    }

    /// A builder pre-seeded with this listing's query, for derived searches.
    pub fn query(&self) -> ItemQueryBuilder {
        ItemQueryBuilder::seeded(self.query.clone())
    }

    /// Re-runs the query from scratch, returning a fresh set pinned to the
    /// current server state.
    pub fn reload(&self) -> Result<ItemSet> {
        ItemSet::new(self.library.clone(), self.query.clone())
    }

    fn page(&self, number: usize) -> Result<Arc<ItemPage>> {
        let cell = self.pages.entry(number).or_default().clone();
        let page = cell.get_or_try_init(|| {
            let fetched = Self::fetch(&self.library, &self.query, number)?;
            self.check_unchanged(number, &fetched)?;
            Ok(Arc::new(fetched))
        })?;
        Ok(Arc::clone(page))
    }

    fn fetch(library: &Library, query: &ItemQueryData, page: usize) -> Result<ItemPage> {
        debug!(page, "fetching item page");
        let handle = Command::scoped(library, GetItemsPage::new(query, page)).execute()?;
        library
            .executor()
            .unwrap(&handle, || format!("failed to retrieve item set page {page}"))
    }

    fn check_unchanged(&self, number: usize, fetched: &ItemPage) -> Result<()> {
        if fetched.total_results != self.total || fetched.last_modified_version != self.version {
            self.poisoned.store(true, Ordering::SeqCst);
            warn!(
                page = number,
                pinned_total = self.total,
                pinned_version = self.version,
                seen_total = fetched.total_results,
                seen_version = fetched.last_modified_version,
                "listing changed under a pinned item set"
            );
            return Err(Error::ConcurrentModification);
        }
        Ok(())
    }
}

impl std::fmt::Debug for ItemSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemSet")
            .field("total", &self.total)
            .field("version", &self.version)
            .field("cached_pages", &self.pages.len())
            .field("poisoned", &self.is_poisoned())
            .finish_non_exhaustive()
    }
}
