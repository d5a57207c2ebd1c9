//! # Sync Orchestrator
//!
//! Drives one invocation end to end:
//!
//! 1. Validate the raw links; zero survivors is fatal
//! 2. Ping the destination store; an unreachable store is fatal
//! 3. Traverse each link in input order with its provider's traverser
//! 4. Drop anything that is not a photo or a video
//! 5. Plan: resolve every item against the store and against the items
//!    already planned in this run
//! 6. Dry run: report the plan. Otherwise create the missing records in
//!    fixed-size chunks, one at a time
//!
//! Everything after step 2 is failure-tolerant: a failing link or item is
//! recorded in the error list and the run moves on. Created records are
//! never rolled back.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let orchestrator = SyncOrchestrator::new(selector, store, payloads, options)?;
//! let result = orchestrator.sync(&urls).await?;
//! println!("created {} skipped {}", result.created, result.skipped);
//! ```

use bridge_traits::record::RecordStore;
use core_media::{validate_links, DedupKey, MediaItem};
use core_runtime::config::SyncConfig;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, SyncError};
use crate::payload::RecordPayloadBuilder;
use crate::result::{
    BatchReport, PlanEntry, PlanStatus, SyncErrorEntry, SyncPlan, SyncReport, SyncResult,
    SyncStage,
};
use crate::selector::ProviderSelector;

/// Run-level knobs
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Records created per chunk
    pub max_tasks_per_batch: usize,

    /// Pause between consecutive record creations
    pub request_delay: Duration,

    /// Pause between consecutive root-link traversals
    pub link_delay: Duration,

    /// Plan only, never write
    pub dry_run: bool,
}

impl OrchestratorOptions {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            max_tasks_per_batch: config.max_tasks_per_batch,
            request_delay: config.request_delay,
            link_delay: config.request_delay,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            max_tasks_per_batch: core_runtime::config::DEFAULT_MAX_TASKS_PER_BATCH,
            request_delay: Duration::from_millis(core_runtime::config::DEFAULT_REQUEST_DELAY_MS),
            link_delay: Duration::from_millis(core_runtime::config::DEFAULT_REQUEST_DELAY_MS),
            dry_run: false,
        }
    }
}

/// Items gathered by the traverse and filter stages
#[derive(Debug, Default)]
struct Discovery {
    items: Vec<MediaItem>,
    errors: Vec<SyncErrorEntry>,
    links: usize,
    filtered_out: usize,
}

/// One eligible item with its planned fate
#[derive(Debug)]
struct PlannedItem {
    item: MediaItem,
    key: DedupKey,
    status: PlanStatus,
}

pub struct SyncOrchestrator {
    selector: ProviderSelector,
    store: Arc<dyn RecordStore>,
    payloads: RecordPayloadBuilder,
    options: OrchestratorOptions,
}

impl SyncOrchestrator {
    /// # Errors
    ///
    /// [`SyncError::Configuration`] when the batch size is zero or no
    /// traverser is registered.
    pub fn new(
        selector: ProviderSelector,
        store: Arc<dyn RecordStore>,
        payloads: RecordPayloadBuilder,
        options: OrchestratorOptions,
    ) -> Result<Self> {
        if options.max_tasks_per_batch == 0 {
            return Err(SyncError::Configuration(
                "max_tasks_per_batch must be at least 1".to_string(),
            ));
        }
        if selector.is_empty() {
            return Err(SyncError::Configuration(
                "no provider traversers registered".to_string(),
            ));
        }

        Ok(Self {
            selector,
            store,
            payloads,
            options,
        })
    }

    pub fn options(&self) -> &OrchestratorOptions {
        &self.options
    }

    /// Sync or plan, depending on [`OrchestratorOptions::dry_run`]
    pub async fn run<S: AsRef<str>>(&self, urls: &[S]) -> Result<SyncReport> {
        if self.options.dry_run {
            self.plan(urls).await.map(SyncReport::Planned)
        } else {
            self.sync(urls).await.map(SyncReport::Synced)
        }
    }

    /// Compute what a sync would do without writing anything
    #[instrument(skip(self, urls), fields(links = urls.len()))]
    pub async fn plan<S: AsRef<str>>(&self, urls: &[S]) -> Result<SyncPlan> {
        let discovery = self.discover(urls).await?;
        let planned = self.plan_items(discovery.items).await;

        let plan = SyncPlan {
            entries: planned
                .into_iter()
                .map(|planned| PlanEntry {
                    provider: planned.item.provider,
                    file_name: planned.item.file_name.clone(),
                    link: planned.item.best_link().to_string(),
                    dedup_key: planned.key,
                    status: planned.status,
                })
                .collect(),
            errors: discovery.errors,
            links: discovery.links,
            filtered_out: discovery.filtered_out,
        };

        info!(
            would_create = plan.would_create(),
            already_exists = plan.already_exists(),
            duplicates = plan.duplicates(),
            check_failures = plan.check_failures(),
            errors = plan.errors.len(),
            "Dry run complete"
        );
        Ok(plan)
    }

    /// Create every missing record
    #[instrument(skip(self, urls), fields(links = urls.len()))]
    pub async fn sync<S: AsRef<str>>(&self, urls: &[S]) -> Result<SyncResult> {
        let discovery = self.discover(urls).await?;
        let planned = self.plan_items(discovery.items).await;

        let mut result = SyncResult {
            errors: discovery.errors,
            links: discovery.links,
            eligible: planned.len(),
            filtered_out: discovery.filtered_out,
            ..SyncResult::default()
        };

        let mut to_create = Vec::new();
        for planned in planned {
            match planned.status {
                PlanStatus::WouldCreate => to_create.push(planned.item),
                PlanStatus::AlreadyExists | PlanStatus::DuplicateInRun => result.skipped += 1,
                PlanStatus::CheckFailed { error } => result.errors.push(SyncErrorEntry::new(
                    planned.item.best_link(),
                    error,
                    SyncStage::ExistenceCheck,
                )),
            }
        }

        self.create_batches(&to_create, &mut result).await;

        info!(
            created = result.created,
            skipped = result.skipped,
            errors = result.errors.len(),
            batches = result.batches.len(),
            "Sync complete"
        );
        Ok(result)
    }

    /// Validate, preflight, traverse and filter
    async fn discover<S: AsRef<str>>(&self, urls: &[S]) -> Result<Discovery> {
        let validation = validate_links(urls.iter().map(|url| url.as_ref()));
        let mut discovery = Discovery {
            errors: validation
                .rejected
                .iter()
                .map(|(url, error)| SyncErrorEntry::new(url.as_str(), error, SyncStage::Classification))
                .collect(),
            links: validation.valid.len(),
            ..Discovery::default()
        };

        if validation.valid.is_empty() {
            return Err(SyncError::NoValidLinks);
        }

        self.store
            .ping()
            .await
            .map_err(|e| SyncError::Connectivity(e.to_string()))?;

        for (position, link) in validation.valid.iter().enumerate() {
            if position > 0 {
                pause(self.options.link_delay).await;
            }

            let traverser = match self.selector.select(link) {
                Ok(traverser) => traverser,
                Err(e) => {
                    warn!(url = %link.url, error = %e, "No traverser for link");
                    discovery
                        .errors
                        .push(SyncErrorEntry::new(link.url.as_str(), e, SyncStage::Traversal));
                    continue;
                }
            };

            info!(url = %link.url, provider = %link.provider, "Traversing link");
            match traverser.list_media_items(link).await {
                Ok(items) => {
                    debug!(url = %link.url, items = items.len(), "Link traversed");
                    discovery.items.extend(items);
                }
                Err(e) => {
                    warn!(url = %link.url, error = %e, "Traversal failed");
                    discovery
                        .errors
                        .push(SyncErrorEntry::new(link.url.as_str(), e, SyncStage::Traversal));
                }
            }
        }

        let before = discovery.items.len();
        discovery.items.retain(|item| item.media_type.is_syncable());
        discovery.filtered_out = before - discovery.items.len();

        info!(
            links = discovery.links,
            items = discovery.items.len(),
            filtered_out = discovery.filtered_out,
            "Discovery finished"
        );
        Ok(discovery)
    }

    /// Resolve each item against this run and the store, in order
    async fn plan_items(&self, items: Vec<MediaItem>) -> Vec<PlannedItem> {
        let mut seen_keys = HashSet::new();
        let mut seen_links = HashSet::new();
        let mut planned = Vec::with_capacity(items.len());

        for item in items {
            let key = DedupKey::for_item(&item);
            let link = item.best_link().to_string();

            let first_key = seen_keys.insert(key.clone());
            let first_link = seen_links.insert(link.clone());

            let status = if !(first_key && first_link) {
                debug!(path = %item.path_key, "Duplicate within run");
                PlanStatus::DuplicateInRun
            } else {
                match self.store.exists_by_link(&link).await {
                    Ok(true) => PlanStatus::AlreadyExists,
                    Ok(false) => PlanStatus::WouldCreate,
                    Err(e) => {
                        warn!(link = %link, error = %e, "Existence check failed");
                        PlanStatus::CheckFailed {
                            error: e.to_string(),
                        }
                    }
                }
            };

            planned.push(PlannedItem { item, key, status });
        }

        planned
    }

    async fn create_batches(&self, items: &[MediaItem], result: &mut SyncResult) {
        let total_batches = items.len().div_ceil(self.options.max_tasks_per_batch);

        for (index, chunk) in items.chunks(self.options.max_tasks_per_batch).enumerate() {
            info!(
                batch = index + 1,
                of = total_batches,
                size = chunk.len(),
                "Creating batch"
            );

            let mut report = BatchReport {
                index,
                size: chunk.len(),
                ..BatchReport::default()
            };

            for (position, item) in chunk.iter().enumerate() {
                if index > 0 || position > 0 {
                    pause(self.options.request_delay).await;
                }

                match self.store.create_record(self.payloads.build(item)).await {
                    Ok(id) => {
                        debug!(record = %id, file = %item.file_name, "Record created");
                        report.created += 1;
                    }
                    Err(e) => {
                        warn!(file = %item.file_name, error = %e, "Record creation failed");
                        report.failed += 1;
                        result.errors.push(SyncErrorEntry::new(
                            item.best_link(),
                            e,
                            SyncStage::Creation,
                        ));
                    }
                }
            }

            result.created += report.created;
            result.batches.push(report);
        }
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
