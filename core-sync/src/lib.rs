//! # Sync Engine
//!
//! Turns a list of public storage links into records in a destination store,
//! exactly once per logical file.
//!
//! ## Components
//!
//! - **Provider Selector** (`selector`): routes a classified link to its traverser
//! - **Payload Builder** (`payload`): maps a media item onto the store's schema
//! - **Sync Orchestrator** (`orchestrator`): validate, traverse, filter, plan,
//!   then report (dry run) or create in batches
//! - **Results** (`result`): `SyncResult`, `SyncPlan` and per-unit error entries

pub mod error;
pub mod orchestrator;
pub mod payload;
pub mod result;
pub mod selector;

pub use error::{Result, SyncError};
pub use orchestrator::{OrchestratorOptions, SyncOrchestrator};
pub use payload::RecordPayloadBuilder;
pub use result::{
    BatchReport, PlanEntry, PlanStatus, SyncErrorEntry, SyncPlan, SyncReport, SyncResult,
    SyncStage,
};
pub use selector::ProviderSelector;
