//! Error types for the WEEEK store

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeeekError {
    /// Non-2xx HTTP status
    #[error("WEEEK API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Failed to parse API response
    #[error("Failed to parse WEEEK response: {0}")]
    ParseError(String),

    /// 2xx response carrying `"success": false`
    #[error("WEEEK rejected the request: {0}")]
    Rejected(String),

    #[error(transparent)]
    BridgeError(#[from] bridge_traits::error::BridgeError),
}

pub type Result<T> = std::result::Result<T, WeeekError>;

impl From<WeeekError> for bridge_traits::error::BridgeError {
    fn from(error: WeeekError) -> Self {
        use bridge_traits::error::BridgeError;

        match error {
            WeeekError::ApiError {
                status_code,
                message,
            } => BridgeError::OperationFailed(format!(
                "WEEEK API error (status {}): {}",
                status_code, message
            )),
            WeeekError::ParseError(msg) => {
                BridgeError::OperationFailed(format!("Parse error: {}", msg))
            }
            WeeekError::Rejected(msg) => {
                BridgeError::OperationFailed(format!("WEEEK rejected the request: {}", msg))
            }
            WeeekError::BridgeError(e) => e,
        }
    }
}
