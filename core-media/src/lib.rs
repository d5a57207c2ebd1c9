//! # Core Media
//!
//! Provider-neutral building blocks for media discovery.
//!
//! ## Overview
//!
//! - [`link`] turns raw public URLs into [`NormalizedLink`]s
//! - [`classify`] decides whether a file is a photo, a video or neither
//! - [`dedup`] derives the stable [`DedupKey`] of a discovered item
//! - [`traverse`] walks a provider's folder tree with pagination, pacing,
//!   a cycle guard and a configurable ceiling; provider crates only supply a
//!   [`FolderSource`] describing how to list one page of one folder
//!
//! Nothing here performs I/O on its own; listings arrive through
//! [`FolderSource`] implementations that sit on top of `bridge_traits::HttpClient`.

pub mod classify;
pub mod dedup;
pub mod error;
pub mod link;
pub mod traverse;
pub mod types;

pub use classify::classify_media;
pub use dedup::DedupKey;
pub use error::{LinkError, TraversalError};
pub use link::{classify_link, validate_links, LinkValidation};
pub use traverse::{
    FolderRef, FolderSource, FolderTraverser, FolderWalker, JitterPacer, ListingPage,
    MediaTraverser, NoDelay, Pacer, RemoteEntry, RemoteFile, RemoteFolder, TraversalState,
};
pub use types::{LinkKind, MediaItem, MediaType, NormalizedLink, Provider};
