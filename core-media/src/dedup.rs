//! Dedup-key derivation
//!
//! A [`DedupKey`] identifies "the same logical file" across runs: SHA-256 over
//! the provider, the root link without query or fragment, and the item's
//! path key, joined with the ASCII unit separator.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::types::{MediaItem, Provider};

const SEPARATOR: char = '\u{1f}';

/// Lowercase hex SHA-256 fingerprint of an item
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DedupKey(String);

impl DedupKey {
    pub fn for_item(item: &MediaItem) -> Self {
        Self::from_parts(item.provider, &item.source_public_url, &item.path_key)
    }

    pub fn from_parts(provider: Provider, source_public_url: &str, path_key: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(provider.as_str().as_bytes());
        hasher.update(SEPARATOR.to_string().as_bytes());
        hasher.update(root_url(source_public_url).as_bytes());
        hasher.update(SEPARATOR.to_string().as_bytes());
        hasher.update(path_key.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The link with query string and fragment removed
pub fn root_url(url: &str) -> &str {
    let url = url.trim();
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}
