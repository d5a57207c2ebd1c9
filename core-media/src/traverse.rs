//! # Folder Traversal
//!
//! Shared engine that expands a public root link into a flat list of
//! [`MediaItem`]s.
//!
//! ## Overview
//!
//! Provider crates implement [`FolderSource`]: how to resolve a root, how to
//! fetch one page of one folder, and how to build a file's direct link.
//! [`FolderWalker`] owns everything else:
//!
//! - Offset/limit pagination until the page is short or the reported total is
//!   reached, whichever the provider signals
//! - A per-root [`TraversalState`]; a folder is marked visited before its
//!   children are listed and an already-visited folder is never re-expanded
//! - A depth and item ceiling from [`TraversalLimits`]
//! - A [`Pacer`] pause between consecutive provider requests
//!
//! Folders are expanded depth-first with an explicit stack, so listing order
//! within a folder is preserved and deep trees cannot overflow the call stack.
//!
//! ## Example
//!
//! ```ignore
//! use core_media::{FolderTraverser, JitterPacer, MediaTraverser};
//!
//! let traverser = FolderTraverser::new(source, Arc::new(JitterPacer::default()), limits);
//! let items = traverser.list_media_items(&link).await?;
//! ```

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use chrono::{DateTime, Utc};
use core_runtime::config::TraversalLimits;
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::classify::classify_media;
use crate::error::{Result, TraversalError};
use crate::types::{LinkKind, MediaItem, NormalizedLink, Provider};

/// A folder to be listed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRef {
    /// Provider identifier used in listing requests (Yandex path, Mail.ru weblink)
    pub handle: String,
    /// Path relative to the root link; empty for the root itself
    pub logical_path: String,
}

impl FolderRef {
    pub fn root(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            logical_path: String::new(),
        }
    }
}

/// File entry as reported by a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub name: String,
    pub mime_type: Option<String>,
    pub size_bytes: Option<u64>,
    pub uploaded_at: Option<DateTime<Utc>>,
    /// Per-file public link, when the provider hands one out
    pub public_url: Option<String>,
}

/// Sub-folder entry as reported by a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFolder {
    pub name: String,
    /// Identifier to list this folder with; also its identity for cycle detection
    pub handle: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteEntry {
    File(RemoteFile),
    Folder(RemoteFolder),
}

/// One page of a folder listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub entries: Vec<RemoteEntry>,
    /// Children the provider returned, including any dropped as malformed
    pub raw_len: u64,
    /// Total children in the folder, when the provider reports it
    pub total: Option<u64>,
}


/// Provider-specific listing primitives
#[async_trait]
pub trait FolderSource: Send + Sync {
    /// Providers whose links this source can list
    fn supports(&self, provider: Provider) -> bool;

    /// Entries requested per page
    fn page_size(&self) -> u32;

    /// Folder the walk starts from
    fn root_folder(&self, root: &NormalizedLink) -> Result<FolderRef>;

    /// Metadata of a single-file root link; `None` if it is not a file
    async fn fetch_file(&self, root: &NormalizedLink) -> BridgeResult<Option<RemoteFile>>;

    /// List one page of `folder` starting at `offset`
    ///
    /// Malformed entries should be dropped (with a warning) by the implementation
    /// rather than failing the page. [`ListingPage::raw_len`] still counts them,
    /// since pagination advances over what the provider returned.
    async fn list_page(
        &self,
        root: &NormalizedLink,
        folder: &FolderRef,
        offset: u64,
        limit: u32,
    ) -> BridgeResult<ListingPage>;

    /// Download/view link of a file at `path_key` under `root`
    fn direct_url(&self, root: &NormalizedLink, path_key: &str, file: &RemoteFile) -> Option<String>;
}

/// Pause between consecutive provider requests
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self);
}

/// Uniformly random pause within `[min, max]`
#[derive(Debug, Clone, Copy)]
pub struct JitterPacer {
    min: Duration,
    max: Duration,
}

impl JitterPacer {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    fn next_delay(&self) -> Duration {
        let min_ms = self.min.as_millis() as u64;
        let max_ms = self.max.as_millis() as u64;
        if max_ms <= min_ms {
            return self.min;
        }
        let millis = rand::thread_rng().gen_range(min_ms..=max_ms);
        Duration::from_millis(millis)
    }
}

impl Default for JitterPacer {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000), Duration::from_millis(3000))
    }
}

#[async_trait]
impl Pacer for JitterPacer {
    async fn pause(&self) {
        let delay = self.next_delay();
        debug!(delay_ms = delay.as_millis() as u64, "Pacing provider request");
        tokio::time::sleep(delay).await;
    }
}

/// Pacer that never waits
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Pacer for NoDelay {
    async fn pause(&self) {}
}

/// Mutable bookkeeping of one root traversal
#[derive(Debug, Default)]
pub struct TraversalState {
    visited: HashSet<String>,
    path_keys: HashSet<String>,
    requests: u64,
}

impl TraversalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a folder as visited; `false` if it already was
    pub fn mark_visited(&mut self, handle: &str) -> bool {
        self.visited.insert(normalize_handle(handle))
    }

    /// Record an emitted path key; `false` if it was already emitted
    fn claim_path_key(&mut self, path_key: &str) -> bool {
        self.path_keys.insert(path_key.to_string())
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn requests(&self) -> u64 {
        self.requests
    }
}

fn normalize_handle(handle: &str) -> String {
    let trimmed = handle.trim().trim_matches('/');
    trimmed.strip_prefix("disk:").unwrap_or(trimmed).trim_matches('/').to_string()
}

/// Join a folder's logical path and a child name
pub fn join_path(parent: &str, name: &str) -> String {
    let parent = parent.trim_matches('/');
    let name = name.trim_matches('/');
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Whether another page must be requested after one returning `returned` entries
///
/// A short page ends the listing, and so does reaching the reported total.
pub fn has_more_pages(offset: u64, limit: u32, returned: u64, total: Option<u64>) -> bool {
    if returned == 0 || returned < u64::from(limit) {
        return false;
    }
    match total {
        Some(total) => offset + returned < total,
        None => true,
    }
}

/// Walks one root link over a [`FolderSource`]
pub struct FolderWalker<'a, S: FolderSource + ?Sized> {
    source: &'a S,
    pacer: &'a dyn Pacer,
    limits: TraversalLimits,
}

impl<'a, S: FolderSource + ?Sized> FolderWalker<'a, S> {
    pub fn new(source: &'a S, pacer: &'a dyn Pacer, limits: TraversalLimits) -> Self {
        Self {
            source,
            pacer,
            limits,
        }
    }

    /// Expand `root` into its media items
    ///
    /// # Errors
    ///
    /// Any failed provider request fails the whole root with
    /// [`TraversalError::Source`]; items already collected are discarded.
    #[instrument(skip(self, root), fields(url = %root.url, provider = %root.provider))]
    pub async fn walk(&self, root: &NormalizedLink) -> Result<Vec<MediaItem>> {
        if !self.source.supports(root.provider) {
            return Err(TraversalError::UnsupportedLink {
                provider: root.provider,
                url: root.url.clone(),
            });
        }

        let mut state = TraversalState::new();
        let items = match root.kind {
            LinkKind::File => self.walk_file(root).await?,
            LinkKind::Folder => self.walk_folders(root, &mut state).await?,
        };

        info!(
            items = items.len(),
            folders = state.visited_count(),
            requests = state.requests(),
            "Traversal finished"
        );
        Ok(items)
    }

    async fn walk_file(&self, root: &NormalizedLink) -> Result<Vec<MediaItem>> {
        let file = self
            .source
            .fetch_file(root)
            .await
            .map_err(|source| TraversalError::Source {
                url: root.url.clone(),
                source,
            })?;

        let Some(file) = file else {
            warn!("File link resolved to something other than a file");
            return Ok(Vec::new());
        };

        let path_key = join_path("", &file.name);
        Ok(self.to_media_item(root, path_key, file).into_iter().collect())
    }

    async fn walk_folders(
        &self,
        root: &NormalizedLink,
        state: &mut TraversalState,
    ) -> Result<Vec<MediaItem>> {
        let root_folder = self.source.root_folder(root)?;
        let limit = self.source.page_size().max(1);
        let mut items = Vec::new();

        state.mark_visited(&root_folder.handle);
        let mut stack: Vec<(FolderRef, usize)> = vec![(root_folder, 0)];

        while let Some((folder, depth)) = stack.pop() {
            debug!(path = %folder.logical_path, depth, "Expanding folder");
            let mut subfolders = Vec::new();
            let mut offset = 0u64;

            loop {
                if state.requests > 0 {
                    self.pacer.pause().await;
                }
                state.requests += 1;

                let page = self
                    .source
                    .list_page(root, &folder, offset, limit)
                    .await
                    .map_err(|source| TraversalError::Source {
                        url: root.url.clone(),
                        source,
                    })?;

                let returned = page.raw_len;
                debug!(
                    path = %folder.logical_path,
                    offset,
                    limit,
                    returned,
                    kept = page.entries.len(),
                    total = ?page.total,
                    "Listed page"
                );

                for entry in page.entries {
                    match entry {
                        RemoteEntry::File(file) => {
                            let path_key = join_path(&folder.logical_path, &file.name);
                            if !state.claim_path_key(&path_key) {
                                debug!(path_key = %path_key, "Duplicate entry in listing, skipping");
                                continue;
                            }
                            if let Some(item) = self.to_media_item(root, path_key, file) {
                                items.push(item);
                                if items.len() >= self.limits.max_items {
                                    warn!(
                                        max_items = self.limits.max_items,
                                        "Item ceiling reached, stopping traversal early"
                                    );
                                    return Ok(items);
                                }
                            }
                        }
                        RemoteEntry::Folder(child) => {
                            let logical_path = join_path(&folder.logical_path, &child.name);
                            if depth + 1 > self.limits.max_depth {
                                warn!(
                                    path = %logical_path,
                                    max_depth = self.limits.max_depth,
                                    "Folder deeper than the depth ceiling, skipping"
                                );
                                continue;
                            }
                            if !state.mark_visited(&child.handle) {
                                warn!(
                                    path = %logical_path,
                                    handle = %child.handle,
                                    "Folder already visited, skipping"
                                );
                                continue;
                            }
                            subfolders.push((
                                FolderRef {
                                    handle: child.handle,
                                    logical_path,
                                },
                                depth + 1,
                            ));
                        }
                    }
                }

                if !has_more_pages(offset, limit, returned, page.total) {
                    break;
                }
                offset += returned;
            }

            // LIFO stack: push in reverse so subfolders expand in listing order
            stack.extend(subfolders.into_iter().rev());
        }

        Ok(items)
    }

    fn to_media_item(
        &self,
        root: &NormalizedLink,
        path_key: String,
        file: RemoteFile,
    ) -> Option<MediaItem> {
        let media_type = classify_media(&file.name, file.mime_type.as_deref());
        if !media_type.is_syncable() {
            debug!(path_key = %path_key, "Not a photo or video, skipping");
            return None;
        }

        let direct_url = self.source.direct_url(root, &path_key, &file);
        Some(MediaItem {
            provider: root.provider,
            source_public_url: root.url.clone(),
            direct_url,
            path_key,
            file_name: file.name,
            media_type,
            original_uploaded_at: file.uploaded_at,
            size_bytes: file.size_bytes,
        })
    }
}

/// Anything that expands a classified link into media items
#[async_trait]
pub trait MediaTraverser: Send + Sync {
    /// Whether links of this provider are handled
    fn supports(&self, provider: Provider) -> bool;

    async fn list_media_items(&self, link: &NormalizedLink) -> Result<Vec<MediaItem>>;
}

/// [`MediaTraverser`] built from a [`FolderSource`]
pub struct FolderTraverser<S: FolderSource> {
    source: S,
    pacer: Arc<dyn Pacer>,
    limits: TraversalLimits,
}

impl<S: FolderSource> FolderTraverser<S> {
    pub fn new(source: S, pacer: Arc<dyn Pacer>, limits: TraversalLimits) -> Self {
        Self {
            source,
            pacer,
            limits,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

#[async_trait]
impl<S: FolderSource> MediaTraverser for FolderTraverser<S> {
    fn supports(&self, provider: Provider) -> bool {
        self.source.supports(provider)
    }

    async fn list_media_items(&self, link: &NormalizedLink) -> Result<Vec<MediaItem>> {
        FolderWalker::new(&self.source, self.pacer.as_ref(), self.limits)
            .walk(link)
            .await
    }
}
