//! Workspace umbrella crate.
//!
//! Re-exports the service façade so hosts can depend on `media-sync-workspace`
//! and enable `desktop-shims` instead of wiring every crate individually.

#[cfg(feature = "desktop-shims")]
pub use core_service::*;
