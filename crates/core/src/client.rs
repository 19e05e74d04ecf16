//! Native S3 transfers using the AWS S3 SDK

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::pair::is_remote;
use crate::store::{ObjectStore, S3Url, TransferStatus};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{config::Region, primitives::ByteStream, Client};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// S3 client resolving credentials from the environment
pub struct SdkStore {
    client: Client,
}

/// Listed object under a prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Key relative to the listed prefix
    pub relative_key: String,
    pub size: i64,
}

impl SdkStore {
    /// Create a new client from the environment plus optional overrides
    pub async fn new(config: &ClientConfig) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let shared = loader.load().await;

        // S3-compatible stores generally want path-style addressing
        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
        })
    }

    /// Download one object to a local path
    async fn download(&self, src: &S3Url, dest_path: &Path) -> Result<()> {
        let response = self
            .client
            .get_object()
            .bucket(&src.bucket)
            .key(&src.key)
            .send()
            .await?;

        let body = response.body.collect().await?.into_bytes();

        if let Some(parent) = dest_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest_path, body.as_ref()).await?;

        Ok(())
    }

    /// Upload one local file
    async fn upload(&self, file_path: &Path, dest: &S3Url) -> Result<()> {
        let content_type = mime_guess::from_path(file_path)
            .first_or_octet_stream()
            .to_string();
        let body = ByteStream::from_path(file_path).await?;

        self.client
            .put_object()
            .bucket(&dest.bucket)
            .key(&dest.key)
            .body(body)
            .content_type(content_type)
            .send()
            .await?;

        Ok(())
    }

    /// Server-side copy of one object
    async fn copy(&self, src: &S3Url, dest: &S3Url) -> Result<()> {
        self.client
            .copy_object()
            .bucket(&dest.bucket)
            .key(&dest.key)
            .copy_source(format!("{}/{}", src.bucket, src.key))
            .send()
            .await?;

        Ok(())
    }

    /// List every object under `prefix`, following continuation tokens
    pub async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectInfo>> {
        let mut objects = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let response = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .set_continuation_token(token.take())
                .send()
                .await?;

            for obj in response.contents() {
                let key = obj.key().unwrap_or("");
                let relative = key.strip_prefix(prefix).unwrap_or(key);
                // Folder placeholders
                if relative.is_empty() || relative.ends_with('/') {
                    continue;
                }
                objects.push(ObjectInfo {
                    relative_key: relative.to_string(),
                    size: obj.size().unwrap_or(0),
                });
            }

            match response.next_continuation_token() {
                Some(next) if response.is_truncated().unwrap_or(false) => {
                    token = Some(next.to_string());
                }
                _ => break,
            }
        }

        Ok(objects)
    }

    async fn sync_remote_to_local(&self, src: &S3Url, dest: &Path, dry_run: bool) -> Result<()> {
        let prefix = src.prefix();
        for obj in self.list_objects(&src.bucket, &prefix).await? {
            let target = dest.join(&obj.relative_key);
            let local_size = tokio::fs::metadata(&target).await.ok().map(|m| m.len() as i64);
            if local_size == Some(obj.size) {
                continue;
            }
            let object = S3Url {
                bucket: src.bucket.clone(),
                key: format!("{}{}", prefix, obj.relative_key),
            };
            if dry_run {
                println!("(dryrun) download: {} to {}", object, target.display());
            } else {
                tracing::debug!(object = %object, target = %target.display(), "Downloading");
                self.download(&object, &target).await?;
            }
        }
        Ok(())
    }

    async fn sync_local_to_remote(&self, src: &Path, dest: &S3Url, dry_run: bool) -> Result<()> {
        let prefix = dest.prefix();
        let remote: HashMap<String, i64> = self
            .list_objects(&dest.bucket, &prefix)
            .await?
            .into_iter()
            .map(|o| (o.relative_key, o.size))
            .collect();

        for (path, relative_key, size) in local_files(src)? {
            if remote.get(&relative_key) == Some(&size) {
                continue;
            }
            let object = S3Url {
                bucket: dest.bucket.clone(),
                key: format!("{}{}", prefix, relative_key),
            };
            if dry_run {
                println!("(dryrun) upload: {} to {}", path.display(), object);
            } else {
                tracing::debug!(file = %path.display(), object = %object, "Uploading");
                self.upload(&path, &object).await?;
            }
        }
        Ok(())
    }

    async fn sync_remote_to_remote(&self, src: &S3Url, dest: &S3Url, dry_run: bool) -> Result<()> {
        let src_prefix = src.prefix();
        let dest_prefix = dest.prefix();
        let existing: HashMap<String, i64> = self
            .list_objects(&dest.bucket, &dest_prefix)
            .await?
            .into_iter()
            .map(|o| (o.relative_key, o.size))
            .collect();

        for obj in self.list_objects(&src.bucket, &src_prefix).await? {
            if existing.get(&obj.relative_key) == Some(&obj.size) {
                continue;
            }
            let from = S3Url {
                bucket: src.bucket.clone(),
                key: format!("{}{}", src_prefix, obj.relative_key),
            };
            let to = S3Url {
                bucket: dest.bucket.clone(),
                key: format!("{}{}", dest_prefix, obj.relative_key),
            };
            if dry_run {
                println!("(dryrun) copy: {} to {}", from, to);
            } else {
                tracing::debug!(from = %from, to = %to, "Copying");
                self.copy(&from, &to).await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for SdkStore {
    async fn copy_object(
        &self,
        source: &str,
        destination: &str,
        dry_run: bool,
    ) -> Result<TransferStatus> {
        match (is_remote(source), is_remote(destination)) {
            (true, true) => {
                let src = S3Url::parse(source)?;
                let dest = object_destination(&src, S3Url::parse(destination)?)?;
                if dry_run {
                    println!("(dryrun) copy: {} to {}", src, dest);
                } else {
                    self.copy(&src, &dest).await?;
                }
            }
            (true, false) => {
                let src = S3Url::parse(source)?;
                let name = src.file_name().ok_or_else(|| {
                    Error::InvalidInput(format!("'{}' does not name an object", source))
                })?;
                let target = local_destination(name, destination);
                if dry_run {
                    println!("(dryrun) download: {} to {}", src, target.display());
                } else {
                    self.download(&src, &target).await?;
                }
            }
            (false, true) => {
                let path = Path::new(source);
                let name = path.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
                    Error::InvalidInput(format!("'{}' has no file name", source))
                })?;
                let mut dest = S3Url::parse(destination)?;
                if dest.is_directory() {
                    dest.key = format!("{}{}", dest.key, name);
                }
                if dry_run {
                    println!("(dryrun) upload: {} to {}", source, dest);
                } else {
                    self.upload(path, &dest).await?;
                }
            }
            (false, false) => {
                return Err(Error::InvalidInput(format!(
                    "'{}' and '{}' are both local paths",
                    source, destination
                )));
            }
        }

        Ok(TransferStatus::SUCCESS)
    }

    async fn sync_tree(
        &self,
        source: &str,
        destination: &str,
        dry_run: bool,
    ) -> Result<TransferStatus> {
        match (is_remote(source), is_remote(destination)) {
            (true, true) => {
                self.sync_remote_to_remote(&S3Url::parse(source)?, &S3Url::parse(destination)?, dry_run)
                    .await?
            }
            (true, false) => {
                self.sync_remote_to_local(&S3Url::parse(source)?, Path::new(destination), dry_run)
                    .await?
            }
            (false, true) => {
                self.sync_local_to_remote(Path::new(source), &S3Url::parse(destination)?, dry_run)
                    .await?
            }
            (false, false) => {
                return Err(Error::InvalidInput(format!(
                    "'{}' and '{}' are both local paths",
                    source, destination
                )));
            }
        }

        Ok(TransferStatus::SUCCESS)
    }
}

/// Destination object for a server-side copy; a directory-like key keeps the source name
fn object_destination(src: &S3Url, mut dest: S3Url) -> Result<S3Url> {
    if dest.is_directory() {
        let name = src
            .file_name()
            .ok_or_else(|| Error::InvalidInput(format!("'{}' does not name an object", src)))?;
        dest.key = format!("{}{}", dest.key, name);
    }
    Ok(dest)
}

/// Local file path a downloaded object is written to
fn local_destination(name: &str, destination: &str) -> PathBuf {
    let path = Path::new(destination);
    if destination.ends_with('/') || path.is_dir() {
        path.join(name)
    } else {
        path.to_path_buf()
    }
}

/// Regular files under `root` as (path, `/`-separated relative key, size)
fn local_files(root: &Path) -> Result<Vec<(PathBuf, String, i64)>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| Error::InvalidInput(e.to_string()))?;
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let size = entry.metadata().map_err(|e| Error::Io(e.into()))?.len() as i64;
        files.push((entry.path().to_path_buf(), key, size));
    }
    Ok(files)
}
