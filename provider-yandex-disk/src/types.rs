//! Yandex.Disk public-resources API response types
//!
//! See: https://yandex.ru/dev/disk-api/doc/ru/reference/public

use serde::Deserialize;

/// A public resource (file or folder)
///
/// Folder listings arrive in `_embedded.items`; items are kept as raw JSON so
/// one malformed entry does not fail the whole page.
#[derive(Debug, Clone, Deserialize)]
pub struct PublicResource {
    pub name: String,

    /// Path inside the public folder, e.g. `/Trip/IMG_1.jpg`
    #[serde(default)]
    pub path: Option<String>,

    /// `file` or `dir`
    #[serde(rename = "type")]
    pub resource_type: String,

    #[serde(default)]
    pub mime_type: Option<String>,

    /// Creation time (RFC 3339)
    #[serde(default)]
    pub created: Option<String>,

    /// Modification time (RFC 3339)
    #[serde(default)]
    pub modified: Option<String>,

    #[serde(default)]
    pub size: Option<u64>,

    #[serde(default)]
    pub public_url: Option<String>,

    #[serde(rename = "_embedded", default)]
    pub embedded: Option<EmbeddedItems>,
}

impl PublicResource {
    pub fn is_file(&self) -> bool {
        self.resource_type == "file"
    }

    pub fn is_dir(&self) -> bool {
        self.resource_type == "dir"
    }
}

/// Page of folder children
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmbeddedItems {
    #[serde(default)]
    pub items: Vec<serde_json::Value>,

    #[serde(default)]
    pub limit: Option<u64>,

    #[serde(default)]
    pub offset: Option<u64>,

    /// Total children in the folder
    #[serde(default)]
    pub total: Option<u64>,
}
