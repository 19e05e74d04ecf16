//! Object-store transfer interface

use crate::error::{Error, Result};
use crate::pair::S3_SCHEME;
use async_trait::async_trait;
use std::fmt;

/// Exit status of one transfer (0 = success)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferStatus(pub i32);

impl TransferStatus {
    pub const SUCCESS: TransferStatus = TransferStatus(0);
    pub const FAILURE: TransferStatus = TransferStatus(1);

    pub fn success(&self) -> bool {
        self.0 == 0
    }

    pub fn code(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transfer engine behind remote operations.
///
/// Either end may be an `s3://` URL or a local path. With `dry_run` the
/// implementation reports what it would do and moves nothing.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Copy a single object or file
    async fn copy_object(
        &self,
        source: &str,
        destination: &str,
        dry_run: bool,
    ) -> Result<TransferStatus>;

    /// Recursively synchronize a prefix or directory tree
    async fn sync_tree(
        &self,
        source: &str,
        destination: &str,
        dry_run: bool,
    ) -> Result<TransferStatus>;
}

/// Bucket and key of an `s3://` URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Url {
    pub bucket: String,
    pub key: String,
}

impl S3Url {
    /// Parse `s3://bucket[/key]`
    pub fn parse(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix(S3_SCHEME)
            .ok_or_else(|| Error::InvalidInput(format!("'{}' is not an s3:// URL", url)))?;
        let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(Error::InvalidInput(format!("'{}' has no bucket", url)));
        }
        Ok(Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }

    /// Key treated as a prefix (empty, or ending with `/`)
    pub fn prefix(&self) -> String {
        if self.key.is_empty() || self.key.ends_with('/') {
            self.key.clone()
        } else {
            format!("{}/", self.key)
        }
    }

    /// Last path segment of the key
    pub fn file_name(&self) -> Option<&str> {
        self.key.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Whether the key names a "directory" a copied object lands in
    pub fn is_directory(&self) -> bool {
        self.key.is_empty() || self.key.ends_with('/')
    }
}

impl fmt::Display for S3Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}/{}", S3_SCHEME, self.bucket, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url() {
        let url = S3Url::parse("s3://bucket/path/to/file.zip").unwrap();
        assert_eq!(url.bucket, "bucket");
        assert_eq!(url.key, "path/to/file.zip");
        assert_eq!(url.file_name(), Some("file.zip"));
        assert_eq!(url.prefix(), "path/to/file.zip/");
        assert!(!url.is_directory());
        assert_eq!(url.to_string(), "s3://bucket/path/to/file.zip");
    }

    #[test]
    fn test_parse_bucket_only() {
        let url = S3Url::parse("s3://bucket").unwrap();
        assert_eq!(url.key, "");
        assert_eq!(url.prefix(), "");
        assert!(url.is_directory());
        assert_eq!(url.file_name(), None);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(S3Url::parse("/local/path").is_err());
        assert!(S3Url::parse("s3:///key").is_err());
    }

    #[test]
    fn test_status() {
        assert!(TransferStatus::SUCCESS.success());
        assert!(!TransferStatus(255).success());
        assert_eq!(TransferStatus::FAILURE.code(), 1);
    }
}
