//! Remote access layer: executors, commands and the library handle.
//!
//! This crate turns the pure data of `biblion-core` and `biblion-search`
//! into running requests:
//! - [`CommandExecutor`]: bounded worker pools and blocking waits
//! - [`PendingResult`] / [`DispatchHandle`]: cancellable in-flight results
//! - [`Operation`] / [`Command`]: one-shot request/response units
//! - [`ItemSet`]: pinned, lazily paginated listings
//! - [`Library`]: the user-facing entry point
//!
//! The transport itself stays behind the [`biblion_core::Transport`] seam,
//! so the whole crate is testable against in-memory fakes.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
pub mod executor;
pub mod item_set;
pub mod library;
pub mod ops;
pub mod pending;

// Re-export commonly used types
pub use command::{Command, Operation};
pub use executor::{CommandExecutor, DEFAULT_POOL_SIZE, DEFAULT_TIMEOUT};
pub use item_set::ItemSet;
pub use library::Library;
pub use ops::{CollectionSelector, ItemPage};
pub use pending::{AdaptedHandle, DispatchHandle, PendingResult, PendingResultExt};
