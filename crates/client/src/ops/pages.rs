//! Retrieval of one page of an item listing.

use biblion_core::{ItemDto, Method, RestRequest, RestResponse, Result};
use biblion_search::filter::encode;
use biblion_search::ItemQueryData;

use crate::command::Operation;
use crate::ops::expect_status;

/// One decoded page of an item listing, together with the listing metadata
/// the server reports alongside it.
#[derive(Debug, Clone)]
pub struct ItemPage {
    /// The query this page was fetched with, offset already applied.
    pub query: ItemQueryData,
    /// The records on this page, in server order.
    pub items: Vec<ItemDto>,
    /// Absolute offset of the first record on this page.
    pub offset: u32,
    /// Library version reported by the server for this listing.
    pub last_modified_version: u64,
    /// Total matching records across all pages.
    pub total_results: u64,
}

/// Fetches a single page of the listing described by an [`ItemQueryData`].
pub struct GetItemsPage {
    query: ItemQueryData,
}

impl GetItemsPage {
    /// Builds the fetch for page `page` of `query`, where pages are
    /// `query.limit` records wide.
    pub fn new(query: &ItemQueryData, page: usize) -> Self {
        GetItemsPage {
            query: query.for_page(page),
        }
    }
}

impl Operation for GetItemsPage {
    type Output = ItemPage;

    fn build(&self) -> RestRequest {
        let q = &self.query;
        let mut request = RestRequest::new(Method::Get);
        if let Some(collection) = &q.collection_id {
            request = request.path("collections").path(collection.clone());
        }
        request = request.path("items");
        if !q.recursive {
            request = request.path("top");
        }

        request = request.query("start", q.start).query("limit", q.limit);
        if let Some(since) = q.since {
            request = request.query("since", since);
        }
        if !q.item_types.is_empty() {
            let joined = q
                .item_types
                .iter()
                .map(|t| encode(t))
                .collect::<Vec<_>>()
                .join(" || ");
            request = request.query("itemType", joined);
        }
        if let Some(text) = q.q.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            request = request
                .query("q", text)
                .query("qmode", q.qmode.as_str());
        }
        if let Some(filter) = &q.tag_filter {
            for (name, value) in filter.query_params() {
                request = request.query(name, value);
            }
        }
        if let Some(field) = q.sort_by {
            request = request.query("sort", field.as_str());
            if let Some(direction) = q.sort_dir {
                request = request.query("direction", direction.as_str());
            }
        }
        request
    }

    fn decode(self, response: RestResponse) -> Result<ItemPage> {
        expect_status(&response, 200)?;
        let total_results = response.total_results()?;
        let last_modified_version = response.last_modified_version()?;
        let items: Vec<ItemDto> = response.decode()?;
        let offset = self.query.start;
        Ok(ItemPage {
            query: self.query,
            items,
            offset,
            last_modified_version,
            total_results,
        })
    }
}
