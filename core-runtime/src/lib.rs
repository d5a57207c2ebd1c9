//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the media sync engine:
//! - Logging and tracing infrastructure
//! - Configuration management (environment loading, validation, record schema)
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that other modules depend on. It
//! establishes the logging conventions and the single configuration structure
//! the service façade reads when wiring providers, the destination store and
//! the sync orchestrator together.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{RecordSchema, SyncConfig, SyncConfigBuilder, TraversalLimits};
pub use error::{Error, Result};
