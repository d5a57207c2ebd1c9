//! Error types for the Mail.ru Cloud provider

use thiserror::Error;

/// Mail.ru Cloud provider errors
#[derive(Error, Debug)]
pub enum MailRuError {
    /// HTTP status or envelope status other than 200
    #[error("Mail.ru API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Failed to parse API response
    #[error("Failed to parse Mail.ru response: {0}")]
    ParseError(String),

    /// No weblink could be extracted from the link
    #[error("Invalid public URL: {0}")]
    InvalidPublicUrl(String),

    /// Bridge error
    #[error(transparent)]
    BridgeError(#[from] bridge_traits::error::BridgeError),
}

/// Result type for Mail.ru operations
pub type Result<T> = std::result::Result<T, MailRuError>;

impl From<MailRuError> for bridge_traits::error::BridgeError {
    fn from(error: MailRuError) -> Self {
        use bridge_traits::error::BridgeError;

        match error {
            MailRuError::ApiError {
                status_code,
                message,
            } => BridgeError::OperationFailed(format!(
                "Mail.ru API error (status {}): {}",
                status_code, message
            )),
            MailRuError::ParseError(msg) => {
                BridgeError::OperationFailed(format!("Parse error: {}", msg))
            }
            MailRuError::InvalidPublicUrl(url) => {
                BridgeError::OperationFailed(format!("Invalid public URL: {}", url))
            }
            MailRuError::BridgeError(e) => e,
        }
    }
}
