//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridges (HTTP client, destination store,
//! request pacer) and a [`SyncConfig`] into ready-to-use sync components.
//! Server and CLI hosts typically enable the `desktop-shims` feature (which
//! depends on `bridge-desktop`) and call [`bootstrap_desktop`].

pub mod error;

pub use error::{CoreError, Result};

pub use core_runtime::{RecordSchema, SyncConfig, TraversalLimits};
pub use core_sync::{
    OrchestratorOptions, PlanStatus, SyncErrorEntry, SyncOrchestrator, SyncPlan, SyncReport,
    SyncResult, SyncStage,
};

use std::sync::Arc;

use bridge_traits::{http::HttpClient, record::RecordStore};
use core_media::{JitterPacer, Pacer};
use core_sync::{ProviderSelector, RecordPayloadBuilder};
use provider_mailru::MailRuSource;
use provider_yandex_disk::YandexDiskSource;
use store_weeek::WeeekRecordStore;
use tracing::info;

/// Aggregated handle to all bridge dependencies the core requires.
pub struct CoreDependencies {
    pub http_client: Arc<dyn HttpClient>,
    pub record_store: Arc<dyn RecordStore>,
    pub pacer: Arc<dyn Pacer>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit bridge handles.
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        record_store: Arc<dyn RecordStore>,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        Self {
            http_client,
            record_store,
            pacer,
        }
    }

    /// WEEEK store and jittered pacing on top of the given HTTP client.
    pub fn from_config(http_client: Arc<dyn HttpClient>, config: &SyncConfig) -> Self {
        let record_store = WeeekRecordStore::new(Arc::clone(&http_client), config.api_token.clone())
            .with_api_base(config.api_base_url.clone())
            .with_schema(config.schema.clone())
            .with_timeout(config.http_timeout);

        Self {
            http_client,
            record_store: Arc::new(record_store),
            pacer: Arc::new(JitterPacer::new(config.page_delay_min, config.page_delay_max)),
        }
    }
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    config: Arc<SyncConfig>,
    deps: Arc<CoreDependencies>,
}

impl CoreService {
    /// Create a new service from the provided configuration and dependencies.
    pub fn new(config: SyncConfig, deps: CoreDependencies) -> Self {
        Self {
            config: Arc::new(config),
            deps: Arc::new(deps),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Access the bridge dependencies being used by the service.
    pub fn dependencies(&self) -> Arc<CoreDependencies> {
        Arc::clone(&self.deps)
    }

    /// Yandex (Disk and 360) and Mail.ru traversers sharing the pacer.
    pub fn selector(&self) -> ProviderSelector {
        let http = &self.deps.http_client;
        let limits = self.config.limits;

        let mut yandex = YandexDiskSource::new(Arc::clone(http)).with_timeout(self.config.http_timeout);
        if let Some(token) = &self.config.yandex_oauth_token {
            yandex = yandex.with_oauth_token(token.clone());
        }

        let mailru = MailRuSource::new(Arc::clone(http)).with_timeout(self.config.http_timeout);

        ProviderSelector::new()
            .with_traverser(Arc::new(
                yandex.into_traverser(Arc::clone(&self.deps.pacer), limits),
            ))
            .with_traverser(Arc::new(
                mailru.into_traverser(Arc::clone(&self.deps.pacer), limits),
            ))
    }

    /// Orchestrator configured from the service's config.
    pub fn orchestrator(&self, dry_run: bool) -> Result<SyncOrchestrator> {
        let options = OrchestratorOptions::from_config(&self.config).with_dry_run(dry_run);

        Ok(SyncOrchestrator::new(
            self.selector(),
            Arc::clone(&self.deps.record_store),
            RecordPayloadBuilder::new(self.config.schema.clone()),
            options,
        )?)
    }

    /// Sync (or plan, when `dry_run`) the given links.
    pub async fn run<S: AsRef<str>>(&self, urls: &[S], dry_run: bool) -> Result<SyncReport> {
        info!(links = urls.len(), dry_run, "Starting media sync");
        Ok(self.orchestrator(dry_run)?.run(urls).await?)
    }
}

/// Convenience bootstrapper for desktop and server hosts.
///
/// ```no_run
/// # async fn example() -> core_service::Result<()> {
/// use core_service::{bootstrap_desktop, SyncConfig};
///
/// let config = SyncConfig::from_env()?;
/// let core = bootstrap_desktop(config)?;
/// let report = core.run(&["https://disk.yandex.ru/d/abc"], true).await?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_desktop(config: SyncConfig) -> Result<CoreService> {
    let http_client = bridge_desktop::ReqwestHttpClient::builder()
        .timeout(config.http_timeout)
        .max_retries(config.max_retries)
        .build()
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;

    let deps = CoreDependencies::from_config(Arc::new(http_client), &config);
    Ok(CoreService::new(config, deps))
}
