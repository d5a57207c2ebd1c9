//! # Mail.ru Cloud Provider
//!
//! Lists public Mail.ru Cloud weblinks through the web API
//! (`/api/v2/folder`).
//!
//! ## Overview
//!
//! This module provides:
//! - [`MailRuSource`], the [`FolderSource`](core_media::FolderSource) for
//!   `cloud.mail.ru/public/<weblink>` links
//! - [`MailRuTraverser`], the source wrapped in the shared folder walker
//!
//! The API reports no MIME types, so media detection relies on file
//! extensions. Every public link is listed as a folder.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::{MailRuSource, MailRuTraverser};
pub use error::{MailRuError, Result};
