//! A dashboard of tracked repositories showing each one's latest commit.
//!
//! The whole configuration (tracked repositories, style, sort order,
//! collapsed flag) lives in a query string, so a board is shared by sharing
//! its link.

pub mod config;
pub mod controls;
pub mod error;
pub mod lookup;
pub mod orchestrator;
pub mod render;
pub mod repo;
pub mod store;
pub mod timeago;

pub use controls::Controls;
pub use error::{Error, Result};
pub use lookup::{CommitLookup, CommitSummary, FetchOutcome, GithubClient, LookupFailure};
pub use orchestrator::{refresh, Board, BoardItem};
pub use render::{Element, HtmlRenderer, Renderer, TerminalRenderer};
pub use repo::RepositoryRef;
pub use store::{AddressStore, BoardState, FileStore, SortMode, StateStore, StyleMode, TrackedSet, ViewConfig};
