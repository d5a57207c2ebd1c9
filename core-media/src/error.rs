//! Error types for link classification and folder traversal

use bridge_traits::error::BridgeError;
use thiserror::Error;

use crate::types::Provider;

/// Why a raw URL was rejected by the link classifier
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// Host/path matches none of the supported providers
    #[error("Unsupported provider for URL: {url}")]
    UnsupportedProvider { url: String },

    /// Provider recognized, but file vs. folder cannot be told from the URL
    #[error("Cannot tell whether {provider} link is a file or a folder: {url}")]
    AmbiguousKind { provider: Provider, url: String },
}

/// Failure of one root traversal
#[derive(Error, Debug)]
pub enum TraversalError {
    /// A provider request failed
    #[error("Failed to list {url}: {source}")]
    Source {
        url: String,
        #[source]
        source: BridgeError,
    },

    /// The link cannot be resolved into a provider resource
    #[error("Invalid link {url}: {reason}")]
    InvalidLink { url: String, reason: String },

    /// The link belongs to a provider this traverser does not serve
    #[error("Link is not handled by the {provider} traverser: {url}")]
    UnsupportedLink { provider: Provider, url: String },
}

pub type Result<T> = std::result::Result<T, TraversalError>;
