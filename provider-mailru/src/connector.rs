//! Mail.ru Cloud weblink connector
//!
//! Implements `FolderSource` on top of `GET /api/v2/folder?weblink=...`.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::{HttpClient, HttpRequest};
use chrono::{DateTime, Utc};
use core_media::dedup::root_url;
use core_media::error::{Result as TraversalResult, TraversalError};
use core_media::link::mailru_weblink;
use core_media::{
    FolderRef, FolderSource, FolderTraverser, ListingPage, NormalizedLink, Pacer, Provider,
    RemoteEntry, RemoteFile, RemoteFolder,
};
use core_runtime::config::TraversalLimits;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::{MailRuError, Result};
use crate::types::{CloudEntry, Envelope, FolderBody};

/// Mail.ru web API base URL
const MAILRU_API_BASE: &str = "https://cloud.mail.ru/api/v2";

/// Public link prefix for building per-file links
const MAILRU_PUBLIC_BASE: &str = "https://cloud.mail.ru/public";

/// Children requested per page
const DEFAULT_PAGE_SIZE: u32 = 500;

/// Shared folder walker over [`MailRuSource`]
pub type MailRuTraverser = FolderTraverser<MailRuSource>;

/// Mail.ru Cloud public-weblink source
pub struct MailRuSource {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,
    api_base: String,
    page_size: u32,
    timeout: Option<Duration>,
}

impl MailRuSource {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            api_base: MAILRU_API_BASE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: None,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn into_traverser(self, pacer: Arc<dyn Pacer>, limits: TraversalLimits) -> MailRuTraverser {
        FolderTraverser::new(self, pacer, limits)
    }

    fn folder_request(&self, weblink: &str, offset: u64, limit: u32) -> HttpRequest {
        let mut request = HttpRequest::get(format!("{}/folder", self.api_base))
            .query("weblink", urlencoding::encode(weblink))
            .query("limit", limit.to_string())
            .query("offset", offset.to_string())
            .query("sort", "name")
            .header("Accept", "application/json")
            .header("Referer", "https://cloud.mail.ru/");

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        request
    }

    /// Execute a listing request and unwrap the `{status, body}` envelope
    async fn fetch_folder(&self, weblink: &str, offset: u64, limit: u32) -> Result<FolderBody> {
        let response = self
            .http_client
            .execute(self.folder_request(weblink, offset, limit))
            .await?;

        if !response.is_success() {
            return Err(MailRuError::ApiError {
                status_code: response.status,
                message: response.error_snippet(),
            });
        }

        let envelope: Envelope = serde_json::from_slice(&response.body)
            .map_err(|e| MailRuError::ParseError(format!("Invalid folder JSON: {}", e)))?;

        if envelope.status != 200 {
            return Err(MailRuError::ApiError {
                status_code: envelope.status,
                message: response.error_snippet(),
            });
        }

        Ok(envelope.body.unwrap_or_default())
    }

    fn convert_child(parent: &FolderRef, raw: serde_json::Value) -> Option<RemoteEntry> {
        let entry: CloudEntry = match serde_json::from_value(raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(folder = %parent.logical_path, error = %e, "Skipping malformed entry");
                return None;
            }
        };

        if entry.is_file() {
            Some(RemoteEntry::File(RemoteFile {
                uploaded_at: entry
                    .mtime_seconds()
                    .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
                name: entry.name,
                mime_type: None,
                size_bytes: entry.size,
                public_url: None,
            }))
        } else if entry.is_folder() {
            let handle = entry
                .weblink
                .map(|w| w.trim_matches('/').to_string())
                .filter(|w| !w.is_empty())
                .unwrap_or_else(|| format!("{}/{}", parent.handle.trim_end_matches('/'), entry.name));
            Some(RemoteEntry::Folder(RemoteFolder {
                name: entry.name,
                handle,
            }))
        } else {
            warn!(name = %entry.name, entry_type = %entry.entry_type, "Skipping entry of unknown type");
            None
        }
    }

    /// Public folder link the per-file links hang off
    fn public_base(root: &NormalizedLink) -> Option<String> {
        let base = root_url(&root.url).trim_end_matches('/');
        if base.contains("/public/") {
            return Some(base.to_string());
        }
        mailru_weblink(&root.url).map(|weblink| {
            format!("{}/{}", MAILRU_PUBLIC_BASE, encode_segments(&weblink))
        })
    }
}

/// Percent-encode each `/`-separated segment
fn encode_segments(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl FolderSource for MailRuSource {
    fn supports(&self, provider: Provider) -> bool {
        provider == Provider::MailRu
    }

    fn page_size(&self) -> u32 {
        self.page_size
    }

    fn root_folder(&self, root: &NormalizedLink) -> TraversalResult<FolderRef> {
        mailru_weblink(&root.url)
            .map(FolderRef::root)
            .ok_or_else(|| TraversalError::InvalidLink {
                url: root.url.clone(),
                reason: "no weblink in Mail.ru URL".to_string(),
            })
    }

    async fn fetch_file(&self, root: &NormalizedLink) -> BridgeResult<Option<RemoteFile>> {
        Err(BridgeError::NotAvailable(format!(
            "Mail.ru public links are listed as folders: {}",
            root.url
        )))
    }

    #[instrument(skip(self, root, folder), fields(url = %root.url, weblink = %folder.handle))]
    async fn list_page(
        &self,
        root: &NormalizedLink,
        folder: &FolderRef,
        offset: u64,
        limit: u32,
    ) -> BridgeResult<ListingPage> {
        let body = self.fetch_folder(&folder.handle, offset, limit).await?;
        let total = body.total();
        debug!(returned = body.list.len(), total = ?total, "Fetched folder page");

        let raw_len = body.list.len() as u64;
        let entries = body
            .list
            .into_iter()
            .filter_map(|raw| Self::convert_child(folder, raw))
            .collect();

        Ok(ListingPage {
            entries,
            raw_len,
            total,
        })
    }

    fn direct_url(&self, root: &NormalizedLink, path_key: &str, _file: &RemoteFile) -> Option<String> {
        Self::public_base(root).map(|base| format!("{}/{}", base, encode_segments(path_key)))
    }
}
