//! Provider selector
//!
//! Routes a classified link to the traverser registered for its provider.

use core_media::{classify_link, MediaTraverser, NormalizedLink};
use std::sync::Arc;

use crate::error::{Result, SyncError};

/// Registry of traversers, consulted in registration order
#[derive(Clone, Default)]
pub struct ProviderSelector {
    traversers: Vec<Arc<dyn MediaTraverser>>,
}

impl ProviderSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_traverser(mut self, traverser: Arc<dyn MediaTraverser>) -> Self {
        self.register(traverser);
        self
    }

    pub fn register(&mut self, traverser: Arc<dyn MediaTraverser>) {
        self.traversers.push(traverser);
    }

    pub fn len(&self) -> usize {
        self.traversers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traversers.is_empty()
    }

    /// Traverser for an already classified link
    pub fn select(&self, link: &NormalizedLink) -> Result<Arc<dyn MediaTraverser>> {
        self.traversers
            .iter()
            .find(|traverser| traverser.supports(link.provider))
            .cloned()
            .ok_or_else(|| SyncError::UnsupportedProvider {
                url: link.url.clone(),
            })
    }

    /// Classify a raw URL and pick its traverser
    pub fn select_url(&self, url: &str) -> Result<(NormalizedLink, Arc<dyn MediaTraverser>)> {
        let link = classify_link(url)?;
        let traverser = self.select(&link)?;
        Ok((link, traverser))
    }
}

impl std::fmt::Debug for ProviderSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSelector")
            .field("traversers", &self.traversers.len())
            .finish()
    }
}
