//! Client access layer for a versioned, paginated bibliographic REST
//! service.
//!
//! The facade re-exports the three layers:
//! - `core`: errors, credentials, the wire model and raw DTOs
//! - `search`: the tag-filter algebra and the immutable query builder
//! - `client`: executors, commands and the [`Library`] entry point
//!
//! A minimal session looks like:
//!
//! ```no_run
//! use std::sync::Arc;
//! use biblion::{CommandExecutor, Credentials, Library, Transport};
//!
//! fn run(transport: Arc<dyn Transport>) -> biblion::Result<()> {
//!     let executor = Arc::new(CommandExecutor::new(transport)?);
//!     let library = Library::user(Credentials::new("12345", "api-key"), executor);
//!
//!     let query = library.item_query().query("dark matter").limit(50).build();
//!     let results = library.search(&query)?;
//!     for item in results.iter() {
//!         println!("{}", item?.key);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use biblion_core::{
    reason_phrase, CollectionDataDto, CollectionDto, CollectionMetaDto, Credentials, Error,
    GroupDataDto, GroupDto, GroupMetaDto, ItemDto, ItemMetaDto, ItemTagDto, LibraryRefDto,
    LibraryScope, LibraryType, Method, RestRequest, RestResponse, Result, SimpleLink, Transport,
    WriteFailureDto, WriteResponseDto,
};

pub use biblion_search::{
    AndClause, ItemQuery, ItemQueryBuilder, ItemQueryData, OrClause, QueryMode, SortDirection,
    SortField, TagFilter, DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT,
};

pub use biblion_client::{
    AdaptedHandle, CollectionSelector, Command, CommandExecutor, DispatchHandle, ItemPage,
    ItemSet, Library, Operation, PendingResult, PendingResultExt,
};

/// Tag-filter construction helpers (`filter`, `any`, `all`, `not`).
pub mod filters {
    pub use biblion_search::filter::{all, any, filter, not};
}

/// Wire-level constants shared with custom [`Transport`] implementations.
pub mod wire {
    pub use biblion_core::wire::{
        APPLICATION_JSON, API_VERSION, HEADER_API_VERSION, HEADER_AUTHORIZATION,
        HEADER_CONTENT_TYPE, HEADER_IF_UNMODIFIED_SINCE_VERSION, HEADER_LAST_MODIFIED_VERSION,
        HEADER_TOTAL_RESULTS,
    };
}
