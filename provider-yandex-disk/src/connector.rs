//! Yandex.Disk public-resources connector
//!
//! Implements `FolderSource` on top of `GET /v1/disk/public/resources`.

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpRequest};
use chrono::{DateTime, Utc};
use core_media::error::{Result as TraversalResult, TraversalError};
use core_media::{
    FolderRef, FolderSource, FolderTraverser, ListingPage, NormalizedLink, Pacer, Provider,
    RemoteEntry, RemoteFile, RemoteFolder,
};
use core_runtime::config::TraversalLimits;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::{Result, YandexDiskError};
use crate::types::PublicResource;

/// Yandex Disk API base URL
const YANDEX_API_BASE: &str = "https://cloud-api.yandex.net/v1/disk";

/// Children requested per page
const DEFAULT_PAGE_SIZE: u32 = 200;

/// Path of the public folder's root
const ROOT_PATH: &str = "/";

/// Shared folder walker over [`YandexDiskSource`]
pub type YandexDiskTraverser = FolderTraverser<YandexDiskSource>;

/// Yandex.Disk public-resources source
///
/// # Example
///
/// ```ignore
/// use provider_yandex_disk::YandexDiskSource;
///
/// let traverser = YandexDiskSource::new(http_client)
///     .with_oauth_token(token)
///     .into_traverser(pacer, limits);
/// let items = traverser.list_media_items(&link).await?;
/// ```
pub struct YandexDiskSource {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    api_base: String,

    /// Optional OAuth token, only raises rate limits
    oauth_token: Option<String>,

    page_size: u32,

    timeout: Option<Duration>,
}

impl YandexDiskSource {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            api_base: YANDEX_API_BASE.to_string(),
            oauth_token: None,
            page_size: DEFAULT_PAGE_SIZE,
            timeout: None,
        }
    }

    pub fn with_oauth_token(mut self, token: impl Into<String>) -> Self {
        self.oauth_token = Some(token.into());
        self
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

    pub fn into_traverser(self, pacer: Arc<dyn Pacer>, limits: TraversalLimits) -> YandexDiskTraverser {
        FolderTraverser::new(self, pacer, limits)
    }

    fn resources_url(&self, public_key: &str, path: Option<&str>, page: Option<(u64, u32)>) -> HttpRequest {
        let mut request = HttpRequest::get(format!("{}/public/resources", self.api_base))
            .query("public_key", urlencoding::encode(public_key))
            .header("Accept", "application/json");

        if let Some(path) = path.filter(|p| !p.is_empty() && *p != ROOT_PATH) {
            request = request.query("path", urlencoding::encode(path));
        }

        if let Some((offset, limit)) = page {
            request = request
                .query("limit", limit.to_string())
                .query("offset", offset.to_string());
        }

        if let Some(token) = &self.oauth_token {
            request = request.header("Authorization", format!("OAuth {}", token));
        }

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        request
    }

    /// Execute a request and parse the resource body
    async fn fetch_resource(&self, request: HttpRequest) -> Result<PublicResource> {
        let response = self.http_client.execute(request).await?;

        if !response.is_success() {
            return Err(YandexDiskError::ApiError {
                status_code: response.status,
                message: response.error_snippet(),
            });
        }

        serde_json::from_slice(&response.body)
            .map_err(|e| YandexDiskError::ParseError(format!("Invalid resource JSON: {}", e)))
    }

    /// Parse RFC 3339 timestamp, preferring `created` over `modified`
    fn upload_time(resource: &PublicResource) -> Option<DateTime<Utc>> {
        resource
            .created
            .as_deref()
            .or(resource.modified.as_deref())
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    fn to_remote_file(resource: &PublicResource) -> RemoteFile {
        RemoteFile {
            name: resource.name.clone(),
            mime_type: resource.mime_type.clone(),
            size_bytes: resource.size,
            uploaded_at: Self::upload_time(resource),
            public_url: resource.public_url.clone(),
        }
    }

    /// Convert one raw child into an entry; `None` for malformed or foreign types
    fn convert_child(parent: &FolderRef, raw: serde_json::Value) -> Option<RemoteEntry> {
        let resource: PublicResource = match serde_json::from_value(raw) {
            Ok(resource) => resource,
            Err(e) => {
                warn!(folder = %parent.logical_path, error = %e, "Skipping malformed entry");
                return None;
            }
        };

        if resource.is_file() {
            Some(RemoteEntry::File(Self::to_remote_file(&resource)))
        } else if resource.is_dir() {
            let handle = resource
                .path
                .clone()
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| child_path(&parent.handle, &resource.name));
            Some(RemoteEntry::Folder(RemoteFolder {
                name: resource.name,
                handle,
            }))
        } else {
            warn!(
                name = %resource.name,
                resource_type = %resource.resource_type,
                "Skipping entry of unknown type"
            );
            None
        }
    }
}

fn child_path(parent: &str, name: &str) -> String {
    format!("{}/{}", parent.trim_end_matches('/'), name)
}

#[async_trait]
impl FolderSource for YandexDiskSource {
    fn supports(&self, provider: Provider) -> bool {
        provider.is_yandex()
    }

    fn page_size(&self) -> u32 {
        self.page_size
    }

    fn root_folder(&self, root: &NormalizedLink) -> TraversalResult<FolderRef> {
        if root.url.trim().is_empty() {
            return Err(TraversalError::InvalidLink {
                url: root.url.clone(),
                reason: "empty public key".to_string(),
            });
        }
        Ok(FolderRef::root(ROOT_PATH))
    }

    #[instrument(skip(self, root), fields(url = %root.url))]
    async fn fetch_file(&self, root: &NormalizedLink) -> BridgeResult<Option<RemoteFile>> {
        let resource = self
            .fetch_resource(self.resources_url(&root.url, None, None))
            .await?;

        if !resource.is_file() {
            debug!(resource_type = %resource.resource_type, "Public link is not a file");
            return Ok(None);
        }

        let mut file = Self::to_remote_file(&resource);
        // A shared single file is best addressed by its own public link
        file.public_url = Some(root.url.clone());
        Ok(Some(file))
    }

    #[instrument(skip(self, root, folder), fields(url = %root.url, path = %folder.handle))]
    async fn list_page(
        &self,
        root: &NormalizedLink,
        folder: &FolderRef,
        offset: u64,
        limit: u32,
    ) -> BridgeResult<ListingPage> {
        let resource = self
            .fetch_resource(self.resources_url(
                &root.url,
                Some(&folder.handle),
                Some((offset, limit)),
            ))
            .await?;

        let Some(embedded) = resource.embedded else {
            debug!("Resource has no embedded listing");
            return Ok(ListingPage::default());
        };

        let raw_len = embedded.items.len() as u64;
        let entries = embedded
            .items
            .into_iter()
            .filter_map(|raw| Self::convert_child(folder, raw))
            .collect();

        Ok(ListingPage {
            entries,
            raw_len,
            total: embedded.total,
        })
    }

    fn direct_url(&self, root: &NormalizedLink, path_key: &str, file: &RemoteFile) -> Option<String> {
        if let Some(public_url) = &file.public_url {
            return Some(public_url.clone());
        }

        Some(format!(
            "{}/public/resources/download?public_key={}&path={}",
            self.api_base,
            urlencoding::encode(&root.url),
            urlencoding::encode(&format!("/{}", path_key))
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::http::HttpResponse;
    use bytes::Bytes;
    use core_media::{LinkKind, MediaTraverser, MediaType, NoDelay};
    use mockall::mock;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    const FOLDER_URL: &str = "https://disk.yandex.ru/d/xNv4Njt4wmH7xQ";

    fn ok(body: &str) -> BridgeResult<HttpResponse> {
        Ok(HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        })
    }

    fn folder_link() -> NormalizedLink {
        NormalizedLink {
            url: FOLDER_URL.to_string(),
            provider: Provider::YandexDisk,
            kind: LinkKind::Folder,
        }
    }

    fn traverser(mock_http: MockHttpClient, page_size: u32) -> YandexDiskTraverser {
        YandexDiskSource::new(Arc::new(mock_http))
            .with_page_size(page_size)
            .into_traverser(Arc::new(NoDelay), TraversalLimits::default())
    }

    #[tokio::test]
    async fn test_list_folder_with_subfolder_and_pages() {
        let mut mock_http = MockHttpClient::new();

        mock_http
            .expect_execute()
            .withf(|req| !req.url.contains("path=") && req.url.contains("offset=0"))
            .times(1)
            .returning(|req| {
                assert!(req.url.contains("public_key=https%3A%2F%2Fdisk.yandex.ru%2Fd%2FxNv4Njt4wmH7xQ"));
                assert!(req.url.contains("limit=2"));
                ok(r#"{
                    "name": "Trip", "type": "dir", "path": "/",
                    "_embedded": {
                        "items": [
                            {"name": "IMG_1.jpg", "type": "file", "path": "/IMG_1.jpg",
                             "mime_type": "image/jpeg", "size": 2048,
                             "created": "2023-05-01T10:00:00+00:00"},
                            {"name": "Day 2", "type": "dir", "path": "/Day 2"}
                        ],
                        "limit": 2, "offset": 0, "total": 3
                    }
                }"#)
            });

        mock_http
            .expect_execute()
            .withf(|req| !req.url.contains("path=") && req.url.contains("offset=2"))
            .times(1)
            .returning(|_| {
                ok(r#"{
                    "name": "Trip", "type": "dir",
                    "_embedded": {
                        "items": [
                            {"name": "notes.txt", "type": "file", "mime_type": "text/plain"}
                        ],
                        "limit": 2, "offset": 2, "total": 3
                    }
                }"#)
            });

        mock_http
            .expect_execute()
            .withf(|req| req.url.contains("path=%2FDay%202"))
            .times(1)
            .returning(|_| {
                ok(r#"{
                    "name": "Day 2", "type": "dir",
                    "_embedded": {
                        "items": [
                            {"name": "clip.mov", "type": "file", "modified": "2023-05-02T08:30:00Z",
                             "public_url": "https://yadi.sk/i/clip"}
                        ],
                        "limit": 2, "offset": 0, "total": 1
                    }
                }"#)
            });

        let items = traverser(mock_http, 2)
            .list_media_items(&folder_link())
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].path_key, "IMG_1.jpg");
        assert_eq!(items[0].media_type, MediaType::Photo);
        assert_eq!(items[0].size_bytes, Some(2048));
        assert_eq!(
            items[0].original_uploaded_at.unwrap().to_rfc3339(),
            "2023-05-01T10:00:00+00:00"
        );
        assert_eq!(
            items[0].direct_url.as_deref(),
            Some(
                "https://cloud-api.yandex.net/v1/disk/public/resources/download\
                 ?public_key=https%3A%2F%2Fdisk.yandex.ru%2Fd%2FxNv4Njt4wmH7xQ&path=%2FIMG_1.jpg"
            )
        );

        assert_eq!(items[1].path_key, "Day 2/clip.mov");
        assert_eq!(items[1].media_type, MediaType::Video);
        assert_eq!(items[1].direct_url.as_deref(), Some("https://yadi.sk/i/clip"));
        assert!(items[1].original_uploaded_at.is_some());
    }

    #[tokio::test]
    async fn test_malformed_children_are_skipped() {
        let mut mock_http = MockHttpClient::new();

        mock_http.expect_execute().times(1).returning(|_| {
            ok(r#"{
                "name": "root", "type": "dir",
                "_embedded": {
                    "items": [
                        {"type": "file"},
                        {"name": "odd", "type": "symlink"},
                        {"name": "ok.png", "type": "file"}
                    ],
                    "total": 3
                }
            }"#)
        });

        let items = traverser(mock_http, 200)
            .list_media_items(&folder_link())
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].file_name, "ok.png");
    }

    #[tokio::test]
    async fn test_malformed_child_on_full_page_keeps_paging() {
        let mut mock_http = MockHttpClient::new();

        mock_http
            .expect_execute()
            .withf(|req| req.url.contains("offset=0"))
            .times(1)
            .returning(|_| {
                ok(r#"{
                    "name": "root", "type": "dir",
                    "_embedded": {
                        "items": [
                            {"type": "file"},
                            {"name": "a.jpg", "type": "file"}
                        ],
                        "limit": 2, "offset": 0, "total": 4
                    }
                }"#)
            });

        mock_http
            .expect_execute()
            .withf(|req| req.url.contains("offset=2"))
            .times(1)
            .returning(|_| {
                ok(r#"{
                    "name": "root", "type": "dir",
                    "_embedded": {
                        "items": [
                            {"name": "b.jpg", "type": "file"},
                            {"name": "c.jpg", "type": "file"}
                        ],
                        "limit": 2, "offset": 2, "total": 4
                    }
                }"#)
            });

        let items = traverser(mock_http, 2)
            .list_media_items(&folder_link())
            .await
            .unwrap();

        let names: Vec<_> = items.iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg"]);
    }

    #[tokio::test]
    async fn test_single_file_link_uses_link_as_direct_url() {
        let mut mock_http = MockHttpClient::new();

        mock_http
            .expect_execute()
            .times(1)
            .returning(|req| {
                assert!(!req.url.contains("limit="));
                ok(r#"{"name": "sunset.HEIC", "type": "file", "created": "2022-01-01T00:00:00Z"}"#)
            });

        let link = NormalizedLink {
            url: "https://yadi.sk/i/abcdef".to_string(),
            provider: Provider::YandexDisk,
            kind: LinkKind::File,
        };
        let items = traverser(mock_http, 200).list_media_items(&link).await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].path_key, "sunset.HEIC");
        assert_eq!(items[0].direct_url.as_deref(), Some("https://yadi.sk/i/abcdef"));
    }

    #[tokio::test]
    async fn test_api_error_fails_traversal() {
        let mut mock_http = MockHttpClient::new();

        mock_http.expect_execute().times(1).returning(|_| {
            Ok(HttpResponse {
                status: 404,
                headers: HashMap::new(),
                body: Bytes::from_static(br#"{"error":"DiskNotFoundError"}"#),
            })
        });

        let err = traverser(mock_http, 200)
            .list_media_items(&folder_link())
            .await
            .unwrap_err();

        match err {
            TraversalError::Source { url, source } => {
                assert_eq!(url, FOLDER_URL);
                assert!(source.to_string().contains("404"));
                assert!(source.to_string().contains("DiskNotFoundError"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_oauth_header_is_sent() {
        let mut mock_http = MockHttpClient::new();

        mock_http
            .expect_execute()
            .withf(|req| req.headers.get("Authorization") == Some(&"OAuth ya-token".to_string()))
            .times(1)
            .returning(|_| ok(r#"{"name": "root", "type": "dir", "_embedded": {"items": [], "total": 0}}"#));

        let traverser = YandexDiskSource::new(Arc::new(mock_http))
            .with_oauth_token("ya-token")
            .into_traverser(Arc::new(NoDelay), TraversalLimits::default());

        let items = traverser.list_media_items(&folder_link()).await.unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_handles_mailru_rejected() {
        let source = YandexDiskSource::new(Arc::new(MockHttpClient::new()));
        assert!(source.supports(Provider::YandexDisk));
        assert!(source.supports(Provider::Yandex360));
        assert!(!source.supports(Provider::MailRu));
    }
}
