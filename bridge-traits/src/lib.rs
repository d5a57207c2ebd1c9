//! # Bridge Traits
//!
//! Contracts between the media sync core and the outside world.
//!
//! ## Overview
//!
//! The core never talks to the network directly. Storage-provider listings and
//! destination-store reads and writes are expressed against the traits in this
//! crate, and hosts inject concrete implementations (see `bridge-desktop` for
//! the reqwest-based HTTP client and `store-weeek` for the task store).
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP with per-call timeouts and retry
//! - [`RecordStore`](record::RecordStore) - Existence oracle plus write sink for
//!   destination records
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert their own errors into it and keep messages actionable
//! (status code, endpoint, response excerpt).
//!
//! ## Thread Safety
//!
//! Bridge traits require `Send + Sync` so implementations can be shared behind
//! `Arc` across async tasks.

pub mod error;
pub mod http;
pub mod record;

pub use error::BridgeError;

pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use record::{RecordId, RecordPayload, RecordStore};
