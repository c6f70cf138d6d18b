//! Concrete remote operations.
//!
//! Each submodule defines the [`crate::command::Operation`] implementations
//! for one family of endpoints. Operations are pure request/response logic;
//! scoping, auth headers and dispatch live in [`crate::command::Command`].

pub mod collections;
pub mod groups;
pub mod items;
pub mod pages;

pub use collections::{
    CollectionSelector, DeleteCollections, GetCollection, GetCollections, SaveCollections,
    UpdateCollection,
};
pub use groups::GetUserGroups;
pub use items::{DeleteItems, GetItem, GetItems, SaveItems, UpdateItem};
pub use pages::{GetItemsPage, ItemPage};

use biblion_core::{reason_phrase, Error, Result, RestResponse};

/// Maps a response status outside the expected set to a remote error with
/// the standard reason phrase.
pub(crate) fn unexpected_status(response: &RestResponse) -> Error {
    Error::rest(response.status, reason_phrase(response.status), Vec::new())
}

/// Accepts only the given status, otherwise produces the standard remote
/// error for the response.
pub(crate) fn expect_status(response: &RestResponse, status: u16) -> Result<()> {
    if response.status == status {
        Ok(())
    } else {
        Err(unexpected_status(response))
    }
}
