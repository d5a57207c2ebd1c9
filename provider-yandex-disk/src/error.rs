//! Error types for the Yandex.Disk provider

use thiserror::Error;

/// Yandex.Disk provider errors
#[derive(Error, Debug)]
pub enum YandexDiskError {
    /// API request returned an error
    #[error("Yandex.Disk API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Failed to parse API response
    #[error("Failed to parse Yandex.Disk response: {0}")]
    ParseError(String),

    /// The link is not a public Yandex resource
    #[error("Invalid public URL: {0}")]
    InvalidPublicUrl(String),

    /// Bridge error
    #[error(transparent)]
    BridgeError(#[from] bridge_traits::error::BridgeError),
}

/// Result type for Yandex.Disk operations
pub type Result<T> = std::result::Result<T, YandexDiskError>;

impl From<YandexDiskError> for bridge_traits::error::BridgeError {
    fn from(error: YandexDiskError) -> Self {
        use bridge_traits::error::BridgeError;

        match error {
            YandexDiskError::ApiError {
                status_code,
                message,
            } => BridgeError::OperationFailed(format!(
                "Yandex.Disk API error (status {}): {}",
                status_code, message
            )),
            YandexDiskError::ParseError(msg) => {
                BridgeError::OperationFailed(format!("Parse error: {}", msg))
            }
            YandexDiskError::InvalidPublicUrl(url) => {
                BridgeError::OperationFailed(format!("Invalid public URL: {}", url))
            }
            YandexDiskError::BridgeError(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = YandexDiskError::ApiError {
            status_code: 404,
            message: "DiskNotFoundError".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Yandex.Disk API error (status 404): DiskNotFoundError"
        );
    }

    #[test]
    fn test_error_conversion() {
        let error = YandexDiskError::ParseError("missing name".to_string());
        let bridge_error: bridge_traits::error::BridgeError = error.into();

        assert!(matches!(
            bridge_error,
            bridge_traits::error::BridgeError::OperationFailed(msg) if msg.contains("missing name")
        ));
    }
}
