//! Error types for s3seed-core

use thiserror::Error;

/// Result type alias for s3seed-core
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for s3seed-core
#[derive(Error, Debug)]
pub enum Error {
    /// No pair list was configured
    #[error("Configuration missing: {0}")]
    ConfigMissing(String),

    /// The remote-store client program cannot be found
    #[error("Tool unavailable: {0}")]
    ToolUnavailable(String),

    /// A pair without a usable source/destination separator
    #[error("Malformed pair: '{0}'")]
    MalformedPair(String),

    /// Source or destination failed the endpoint checks
    #[error("Invalid pair '{pair}': {reason}")]
    InvalidEndpoint { pair: String, reason: String },

    /// Transfer returned a non-zero status
    #[error("Failed to copy {from} to {to} (exit status {status})")]
    TransferFailed { from: String, to: String, status: i32 },

    /// Invalid configuration file
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// S3 operation errors
    #[error("S3 operation failed: {0}")]
    S3Operation(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// Generic SdkError conversion for all S3 operations
impl<E> From<aws_sdk_s3::error::SdkError<E>> for Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: aws_sdk_s3::error::SdkError<E>) -> Self {
        Error::S3Operation(err.to_string())
    }
}

// ByteStreamError conversion
impl From<aws_sdk_s3::primitives::ByteStreamError> for Error {
    fn from(err: aws_sdk_s3::primitives::ByteStreamError) -> Self {
        Error::S3Operation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_pair_message() {
        let err = Error::MalformedPair("no-separator".to_string());
        assert_eq!(err.to_string(), "Malformed pair: 'no-separator'");
    }

    #[test]
    fn test_transfer_failed_message() {
        let err = Error::TransferFailed {
            from: "s3://b/k".to_string(),
            to: "/tmp/k".to_string(),
            status: 2,
        };
        assert_eq!(
            err.to_string(),
            "Failed to copy s3://b/k to /tmp/k (exit status 2)"
        );
    }
}
