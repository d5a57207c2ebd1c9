//! Integration tests for the sync orchestrator
//!
//! These tests drive the full pipeline against in-memory collaborators:
//! - Idempotent re-runs against a persisting store
//! - Per-link failure isolation
//! - Chunked creation order and batch reports
//! - Dry-run planning without writes
//! - Fatal preflight errors
//! - Result reconciliation under item-level failures

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::record::{RecordId, RecordPayload, RecordStore};
use core_media::error::{Result as TraversalResult, TraversalError};
use core_media::{MediaItem, MediaTraverser, MediaType, NormalizedLink, Provider};
use core_runtime::config::RecordSchema;
use core_sync::{
    OrchestratorOptions, PlanStatus, ProviderSelector, RecordPayloadBuilder, SyncError,
    SyncOrchestrator, SyncReport, SyncStage,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// In-memory collaborators
// ============================================================================

/// Destination store that keeps records in memory
#[derive(Default)]
struct InMemoryStore {
    links: Mutex<HashSet<String>>,
    created: Mutex<Vec<RecordPayload>>,
    fail_create: HashSet<String>,
    fail_exists: HashSet<String>,
    ping_error: Option<String>,
    pings: AtomicUsize,
}

impl InMemoryStore {
    fn with_existing(links: &[String]) -> Self {
        let store = Self::default();
        store
            .links
            .lock()
            .unwrap()
            .extend(links.iter().cloned());
        store
    }

    fn created_titles(&self) -> Vec<String> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .map(|payload| payload.title.clone())
            .collect()
    }

    fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn ping(&self) -> BridgeResult<()> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        match &self.ping_error {
            Some(message) => Err(BridgeError::OperationFailed(message.clone())),
            None => Ok(()),
        }
    }

    async fn exists_by_link(&self, link: &str) -> BridgeResult<bool> {
        if self.fail_exists.contains(link) {
            return Err(BridgeError::Timeout(link.to_string()));
        }
        Ok(self.links.lock().unwrap().contains(link))
    }

    async fn create_record(&self, payload: RecordPayload) -> BridgeResult<RecordId> {
        if self.fail_create.contains(&payload.link) {
            return Err(BridgeError::OperationFailed("store rejected record".to_string()));
        }

        self.links.lock().unwrap().insert(payload.link.clone());
        let mut created = self.created.lock().unwrap();
        created.push(payload);
        Ok(RecordId(created.len().to_string()))
    }
}

/// Traverser that answers from a fixed script keyed by link URL
#[derive(Default)]
struct ScriptedTraverser {
    script: HashMap<String, std::result::Result<Vec<MediaItem>, String>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTraverser {
    fn items(mut self, url: &str, items: Vec<MediaItem>) -> Self {
        self.script.insert(url.to_string(), Ok(items));
        self
    }

    fn failure(mut self, url: &str, message: &str) -> Self {
        self.script.insert(url.to_string(), Err(message.to_string()));
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaTraverser for ScriptedTraverser {
    fn supports(&self, _provider: Provider) -> bool {
        true
    }

    async fn list_media_items(&self, link: &NormalizedLink) -> TraversalResult<Vec<MediaItem>> {
        self.calls.lock().unwrap().push(link.url.clone());

        match self.script.get(&link.url) {
            Some(Ok(items)) => Ok(items.clone()),
            Some(Err(message)) => Err(TraversalError::Source {
                url: link.url.clone(),
                source: BridgeError::OperationFailed(message.clone()),
            }),
            None => Ok(Vec::new()),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

const YANDEX_ROOT: &str = "https://disk.yandex.ru/d/trip";
const MAILRU_ROOT: &str = "https://cloud.mail.ru/public/P1ZJ/WGntm7zig";

fn media(root: &str, name: &str, media_type: MediaType) -> MediaItem {
    let provider = if root.contains("mail.ru") {
        Provider::MailRu
    } else {
        Provider::YandexDisk
    };

    MediaItem {
        provider,
        source_public_url: root.to_string(),
        direct_url: Some(format!("{}/{}", root.split('?').next().unwrap_or(root), name)),
        path_key: name.to_string(),
        file_name: name.to_string(),
        media_type,
        original_uploaded_at: None,
        size_bytes: None,
    }
}

fn photos(root: &str, count: usize) -> Vec<MediaItem> {
    (0..count)
        .map(|i| media(root, &format!("IMG_{:03}.jpg", i), MediaType::Photo))
        .collect()
}

fn options(batch: usize) -> OrchestratorOptions {
    OrchestratorOptions {
        max_tasks_per_batch: batch,
        request_delay: Duration::ZERO,
        link_delay: Duration::ZERO,
        dry_run: false,
    }
}

fn orchestrator(
    traverser: Arc<ScriptedTraverser>,
    store: Arc<InMemoryStore>,
    options: OrchestratorOptions,
) -> SyncOrchestrator {
    let schema = RecordSchema {
        link_field_id: Some("f-link".to_string()),
        ..RecordSchema::default()
    };

    SyncOrchestrator::new(
        ProviderSelector::new().with_traverser(traverser),
        store,
        RecordPayloadBuilder::new(schema),
        options,
    )
    .unwrap()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_second_run_creates_nothing() {
    let traverser = Arc::new(
        ScriptedTraverser::default()
            .items(YANDEX_ROOT, photos(YANDEX_ROOT, 4))
            .items(MAILRU_ROOT, vec![media(MAILRU_ROOT, "clip.mp4", MediaType::Video)]),
    );
    let store = Arc::new(InMemoryStore::default());
    let orchestrator = orchestrator(traverser, store.clone(), options(50));
    let urls = [YANDEX_ROOT, MAILRU_ROOT];

    let first = orchestrator.sync(&urls).await.unwrap();
    assert_eq!(first.created, 5);
    assert_eq!(first.skipped, 0);
    assert!(first.is_reconciled());

    let second = orchestrator.sync(&urls).await.unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.skipped, 5);
    assert!(second.is_reconciled());
    assert_eq!(store.created_count(), 5);
}

#[tokio::test]
async fn test_invalid_middle_link_does_not_block_others() {
    let traverser = Arc::new(
        ScriptedTraverser::default()
            .items(YANDEX_ROOT, photos(YANDEX_ROOT, 2))
            .items(MAILRU_ROOT, photos(MAILRU_ROOT, 3)),
    );
    let store = Arc::new(InMemoryStore::default());
    let orchestrator = orchestrator(traverser.clone(), store.clone(), options(50));

    let result = orchestrator
        .sync(&[YANDEX_ROOT, "https://example.com/not-a-provider", MAILRU_ROOT])
        .await
        .unwrap();

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].url, "https://example.com/not-a-provider");
    assert_eq!(result.errors[0].stage, SyncStage::Classification);
    assert_eq!(result.links, 2);
    assert_eq!(result.created, 5);
    assert_eq!(traverser.calls(), vec![YANDEX_ROOT, MAILRU_ROOT]);
}

#[tokio::test]
async fn test_items_are_created_in_chunks_in_order() {
    let items = photos(YANDEX_ROOT, 45);
    let expected: Vec<String> = items.iter().map(|item| item.file_name.clone()).collect();
    let traverser = Arc::new(ScriptedTraverser::default().items(YANDEX_ROOT, items));
    let store = Arc::new(InMemoryStore::default());

    let result = orchestrator(traverser, store.clone(), options(20))
        .sync(&[YANDEX_ROOT])
        .await
        .unwrap();

    let sizes: Vec<usize> = result.batches.iter().map(|batch| batch.size).collect();
    assert_eq!(sizes, vec![20, 20, 5]);
    assert_eq!(
        result.batches.iter().map(|batch| batch.index).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
    assert!(result.batches.iter().all(|batch| batch.failed == 0));
    assert_eq!(result.created, 45);
    assert_eq!(store.created_titles(), expected);
}

#[tokio::test]
async fn test_dry_run_reports_plan_without_writing() {
    let items = photos(YANDEX_ROOT, 3);
    let existing = vec![items[1].best_link().to_string()];
    let traverser = Arc::new(ScriptedTraverser::default().items(YANDEX_ROOT, items));
    let store = Arc::new(InMemoryStore::with_existing(&existing));

    let report = orchestrator(traverser, store.clone(), options(50).with_dry_run(true))
        .run(&[YANDEX_ROOT])
        .await
        .unwrap();

    let SyncReport::Planned(plan) = report else {
        panic!("dry run must produce a plan");
    };

    let statuses: Vec<PlanStatus> = plan.entries.iter().map(|e| e.status.clone()).collect();
    assert_eq!(
        statuses,
        vec![
            PlanStatus::WouldCreate,
            PlanStatus::AlreadyExists,
            PlanStatus::WouldCreate
        ]
    );
    assert_eq!(plan.would_create(), 2);
    assert_eq!(plan.already_exists(), 1);
    assert_eq!(plan.entries[0].file_name, "IMG_000.jpg");
    assert_eq!(plan.entries[0].dedup_key.as_str().len(), 64);
    assert_eq!(store.created_count(), 0);
}

#[tokio::test]
async fn test_no_valid_links_is_fatal() {
    let store = Arc::new(InMemoryStore::default());
    let orchestrator = orchestrator(
        Arc::new(ScriptedTraverser::default()),
        store.clone(),
        options(50),
    );

    let err = orchestrator
        .sync(&["https://example.com/a", "   "])
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::NoValidLinks));
    assert_eq!(store.pings.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unreachable_store_aborts_before_traversal() {
    let traverser = Arc::new(ScriptedTraverser::default().items(YANDEX_ROOT, photos(YANDEX_ROOT, 1)));
    let store = Arc::new(InMemoryStore {
        ping_error: Some("401 Unauthorized".to_string()),
        ..InMemoryStore::default()
    });

    let err = orchestrator(traverser.clone(), store.clone(), options(50))
        .sync(&[YANDEX_ROOT])
        .await
        .unwrap_err();

    match err {
        SyncError::Connectivity(message) => assert!(message.contains("401")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(traverser.calls().is_empty());
    assert_eq!(store.created_count(), 0);
}

#[tokio::test]
async fn test_creation_failure_is_counted_and_run_continues() {
    let items = photos(YANDEX_ROOT, 5);
    let failing = items[2].best_link().to_string();
    let traverser = Arc::new(ScriptedTraverser::default().items(YANDEX_ROOT, items));
    let store = Arc::new(InMemoryStore {
        fail_create: HashSet::from([failing.clone()]),
        ..InMemoryStore::default()
    });

    let result = orchestrator(traverser, store.clone(), options(2))
        .sync(&[YANDEX_ROOT])
        .await
        .unwrap();

    assert_eq!(result.created, 4);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].stage, SyncStage::Creation);
    assert_eq!(result.errors[0].url, failing);
    assert_eq!(result.batches[1].created, 1);
    assert_eq!(result.batches[1].failed, 1);
    assert!(result.is_reconciled());
}

#[tokio::test]
async fn test_existence_check_failure_skips_write() {
    let items = photos(MAILRU_ROOT, 3);
    let unchecked = items[0].best_link().to_string();
    let traverser = Arc::new(ScriptedTraverser::default().items(MAILRU_ROOT, items));
    let store = Arc::new(InMemoryStore {
        fail_exists: HashSet::from([unchecked.clone()]),
        ..InMemoryStore::default()
    });

    let result = orchestrator(traverser, store.clone(), options(50))
        .sync(&[MAILRU_ROOT])
        .await
        .unwrap();

    assert_eq!(result.created, 2);
    assert_eq!(result.errors_in(SyncStage::ExistenceCheck), 1);
    assert_eq!(result.eligible, 3);
    assert!(result.is_reconciled());
    assert!(!store.links.lock().unwrap().contains(&unchecked));
}

#[tokio::test]
async fn test_same_file_twice_in_one_run_is_created_once() {
    let with_query = format!("{}?utm_source=mail", YANDEX_ROOT);
    let traverser = Arc::new(
        ScriptedTraverser::default()
            .items(YANDEX_ROOT, photos(YANDEX_ROOT, 2))
            .items(&with_query, photos(&with_query, 2)),
    );
    let store = Arc::new(InMemoryStore::default());

    let result = orchestrator(traverser, store.clone(), options(50))
        .sync(&[YANDEX_ROOT, with_query.as_str()])
        .await
        .unwrap();

    assert_eq!(result.created, 2);
    assert_eq!(result.skipped, 2);
    assert_eq!(store.created_count(), 2);
    assert!(result.is_reconciled());
}

#[tokio::test]
async fn test_traversal_failure_is_recorded_per_link() {
    let traverser = Arc::new(
        ScriptedTraverser::default()
            .failure(YANDEX_ROOT, "404 DiskNotFoundError")
            .items(MAILRU_ROOT, photos(MAILRU_ROOT, 2)),
    );
    let store = Arc::new(InMemoryStore::default());

    let result = orchestrator(traverser, store, options(50))
        .sync(&[YANDEX_ROOT, MAILRU_ROOT])
        .await
        .unwrap();

    assert_eq!(result.created, 2);
    assert_eq!(result.errors_in(SyncStage::Traversal), 1);
    assert_eq!(result.errors[0].url, YANDEX_ROOT);
    assert!(result.errors[0].error.contains("DiskNotFoundError"));
    assert!(result.is_reconciled());
}

#[tokio::test]
async fn test_unknown_media_is_filtered_out() {
    let traverser = Arc::new(ScriptedTraverser::default().items(
        YANDEX_ROOT,
        vec![
            media(YANDEX_ROOT, "a.jpg", MediaType::Photo),
            media(YANDEX_ROOT, "notes.txt", MediaType::Unknown),
            media(YANDEX_ROOT, "b.mov", MediaType::Video),
        ],
    ));
    let store = Arc::new(InMemoryStore::default());

    let result = orchestrator(traverser, store.clone(), options(50))
        .sync(&[YANDEX_ROOT])
        .await
        .unwrap();

    assert_eq!(result.filtered_out, 1);
    assert_eq!(result.eligible, 2);
    assert_eq!(store.created_titles(), vec!["a.jpg", "b.mov"]);

    let created = store.created.lock().unwrap();
    assert_eq!(created[1].tags, vec!["Video".to_string()]);
    assert_eq!(created[1].custom_fields["f-link"], created[1].link.as_str());
}

#[test]
fn test_zero_batch_size_is_rejected() {
    let result = SyncOrchestrator::new(
        ProviderSelector::new().with_traverser(Arc::new(ScriptedTraverser::default())),
        Arc::new(InMemoryStore::default()),
        RecordPayloadBuilder::default(),
        options(0),
    );

    assert!(matches!(result, Err(SyncError::Configuration(_))));
}
