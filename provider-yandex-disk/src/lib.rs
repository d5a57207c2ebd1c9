//! # Yandex.Disk Provider
//!
//! Lists public Yandex.Disk and Yandex 360 links through the public-resources
//! API (`/v1/disk/public/resources`).
//!
//! ## Overview
//!
//! This module provides:
//! - [`YandexDiskSource`], the [`FolderSource`](core_media::FolderSource) for
//!   `/d/` folder links and `/i/` file links
//! - [`YandexDiskTraverser`], the source wrapped in the shared folder walker
//! - Optional `Authorization: OAuth` header for higher request quotas
//!
//! Public resources need no authentication; the token only lifts rate limits.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::{YandexDiskSource, YandexDiskTraverser};
pub use error::{Result, YandexDiskError};
