use core_media::LinkError;
use thiserror::Error;

/// Errors that abort a whole sync run
///
/// Failures local to one link or one item never surface here; they are
/// recorded in the run's error list instead.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("No valid links to process")]
    NoValidLinks,

    #[error("Destination store unreachable: {0}")]
    Connectivity(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("No traverser registered for URL: {url}")]
    UnsupportedProvider { url: String },

    #[error(transparent)]
    InvalidLink(#[from] LinkError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
