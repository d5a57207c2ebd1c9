//! # WEEEK Record Store
//!
//! [`RecordStore`](bridge_traits::RecordStore) implementation for the WEEEK
//! task manager public API (`/public/v1`).
//!
//! ## Overview
//!
//! - `ping` checks the token against `GET /tm/tasks`
//! - `exists_by_link` loads every task once, keeps those of the configured
//!   project and indexes the values of the configured link custom field;
//!   later checks are answered from that index
//! - `create_record` posts to `/tm/tasks` and adds the new link to the index,
//!   so a repeated link in the same run is reported as existing
//!
//! Field and option identifiers come from
//! [`RecordSchema`](core_runtime::config::RecordSchema); nothing is hardcoded.

pub mod client;
pub mod error;
pub mod types;

pub use client::WeeekRecordStore;
pub use error::{Result, WeeekError};
