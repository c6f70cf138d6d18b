//! Core types for the biblion access layer.
//!
//! This crate defines the foundational types shared by the search and
//! client crates:
//! - Error: the three-tier error taxonomy and `Result` alias
//! - Wire model: request/response descriptions and the `Transport` seam
//! - Credentials and library scoping
//! - DTOs: raw serde data vehicles for the remote record shapes

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dto;
pub mod error;
pub mod types;
pub mod wire;

// Re-export commonly used types
pub use dto::{
    CollectionDataDto, CollectionDto, CollectionMetaDto, GroupDataDto, GroupDto, GroupMetaDto,
    ItemDto, ItemMetaDto, ItemTagDto, LibraryRefDto, SimpleLink, WriteFailureDto, WriteResponseDto,
};
pub use error::{Error, Result};
pub use types::{Credentials, LibraryScope, LibraryType};
pub use wire::{reason_phrase, Method, RestRequest, RestResponse, Transport};
