//! Domain types shared by classifiers, traversers and the sync engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported storage providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// Yandex.Disk public links (`disk.yandex.ru`, `yadi.sk`, ...)
    YandexDisk,
    /// Yandex 360 public links (`disk.360.yandex.ru`), same public API as Yandex.Disk
    #[serde(rename = "yandex_360")]
    Yandex360,
    /// Mail.ru Cloud public weblinks
    #[serde(rename = "mailru")]
    MailRu,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::YandexDisk => "yandex_disk",
            Provider::Yandex360 => "yandex_360",
            Provider::MailRu => "mailru",
        }
    }

    /// Whether the provider speaks the Yandex public-resources API
    pub fn is_yandex(&self) -> bool {
        matches!(self, Provider::YandexDisk | Provider::Yandex360)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of the resource a public link points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    File,
    Folder,
}

/// A classified input URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedLink {
    /// Trimmed input URL
    pub url: String,
    pub provider: Provider,
    pub kind: LinkKind,
}

/// Semantic media kind of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Photo,
    Video,
    Unknown,
}

impl MediaType {
    /// Only photos and videos are synced
    pub fn is_syncable(&self) -> bool {
        !matches!(self, MediaType::Unknown)
    }

    /// Human-facing tag, e.g. for record tags
    pub fn tag(&self) -> &'static str {
        match self {
            MediaType::Photo => "Photo",
            MediaType::Video => "Video",
            MediaType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A media file discovered under a root link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub provider: Provider,

    /// The root link the item was discovered under
    pub source_public_url: String,

    /// Provider download/view link for this specific file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direct_url: Option<String>,

    /// Slash-joined path from the root, unique within one root traversal
    pub path_key: String,

    pub file_name: String,

    pub media_type: MediaType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_uploaded_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

impl MediaItem {
    /// Link used for existence checks and written into records
    pub fn best_link(&self) -> &str {
        self.direct_url.as_deref().unwrap_or(&self.source_public_url)
    }
}
