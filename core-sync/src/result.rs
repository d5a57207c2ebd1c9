//! Run outcomes: [`SyncResult`] for real runs, [`SyncPlan`] for dry runs

use core_media::{DedupKey, Provider};
use serde::Serialize;
use std::fmt;

/// Pipeline stage a per-unit error was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStage {
    Classification,
    Traversal,
    ExistenceCheck,
    Creation,
}

impl SyncStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStage::Classification => "classification",
            SyncStage::Traversal => "traversal",
            SyncStage::ExistenceCheck => "existence_check",
            SyncStage::Creation => "creation",
        }
    }

    /// Stages that concern a single discovered item
    pub fn is_item_stage(&self) -> bool {
        matches!(self, SyncStage::ExistenceCheck | SyncStage::Creation)
    }
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal failure of one link or one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncErrorEntry {
    /// Root link, or the item's link for item stages
    pub url: String,
    pub error: String,
    pub stage: SyncStage,
}

impl SyncErrorEntry {
    pub fn new(url: impl Into<String>, error: impl ToString, stage: SyncStage) -> Self {
        Self {
            url: url.into(),
            error: error.to_string(),
            stage,
        }
    }
}

impl fmt::Display for SyncErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.stage, self.url, self.error)
    }
}

/// Outcome of one creation chunk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Zero-based position in partition order
    pub index: usize,
    pub size: usize,
    pub created: usize,
    pub failed: usize,
}

/// Summary of a sync run, built additively
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    pub created: usize,
    pub skipped: usize,
    pub errors: Vec<SyncErrorEntry>,
    pub batches: Vec<BatchReport>,

    /// Root links that classified
    pub links: usize,
    /// Photo/video items that reached the plan stage
    pub eligible: usize,
    /// Items dropped by the media filter
    pub filtered_out: usize,
}

impl SyncResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors_in(&self, stage: SyncStage) -> usize {
        self.errors.iter().filter(|e| e.stage == stage).count()
    }

    /// `created + skipped + item errors == eligible`
    pub fn is_reconciled(&self) -> bool {
        let item_errors = self.errors.iter().filter(|e| e.stage.is_item_stage()).count();
        self.created + self.skipped + item_errors == self.eligible
    }
}

/// Planned fate of one candidate item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlanStatus {
    WouldCreate,
    AlreadyExists,
    /// Same dedup key or link already planned earlier in this run
    DuplicateInRun,
    CheckFailed { error: String },
}

impl PlanStatus {
    pub fn is_skip(&self) -> bool {
        matches!(self, PlanStatus::AlreadyExists | PlanStatus::DuplicateInRun)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    pub provider: Provider,
    pub file_name: String,
    pub link: String,
    pub dedup_key: DedupKey,
    #[serde(flatten)]
    pub status: PlanStatus,
}

/// Dry-run report: what a real run would do, without writing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncPlan {
    pub entries: Vec<PlanEntry>,
    /// Classification and traversal errors met while planning
    pub errors: Vec<SyncErrorEntry>,
    pub links: usize,
    pub filtered_out: usize,
}

impl SyncPlan {
    pub fn would_create(&self) -> usize {
        self.count(|status| matches!(status, PlanStatus::WouldCreate))
    }

    pub fn already_exists(&self) -> usize {
        self.count(|status| matches!(status, PlanStatus::AlreadyExists))
    }

    pub fn duplicates(&self) -> usize {
        self.count(|status| matches!(status, PlanStatus::DuplicateInRun))
    }

    pub fn check_failures(&self) -> usize {
        self.count(|status| matches!(status, PlanStatus::CheckFailed { .. }))
    }

    fn count(&self, predicate: impl Fn(&PlanStatus) -> bool) -> usize {
        self.entries.iter().filter(|e| predicate(&e.status)).count()
    }
}

/// Outcome of [`SyncOrchestrator::run`](crate::SyncOrchestrator::run)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SyncReport {
    Synced(SyncResult),
    Planned(SyncPlan),
}
