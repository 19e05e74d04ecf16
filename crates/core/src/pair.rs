//! Parsing of `source:destination` pair lists

use crate::error::{Error, Result};
use std::path::Path;

/// URL scheme marking a remote object-store endpoint
pub const S3_SCHEME: &str = "s3://";

/// Marker for a local source followed by a remote destination
const REMOTE_DEST_MARKER: &str = ":s3://";

/// Whether an endpoint points at the object store
pub fn is_remote(endpoint: &str) -> bool {
    endpoint.starts_with(S3_SCHEME)
}

/// Final state of a copy task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed,
    SkippedMalformed,
    /// Processed under dry-run, nothing was moved
    Simulated,
}

/// One requested transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyTask {
    /// Untrimmed text between two commas
    pub raw_pair: String,
    pub source: String,
    pub destination: String,
    pub source_is_remote: bool,
    pub destination_is_remote: bool,
    pub outcome: Option<Outcome>,
}

impl CopyTask {
    /// Split a raw pair into a task.
    ///
    /// Fails with [`Error::MalformedPair`] when no separator is found or
    /// either half is empty once trimmed.
    pub fn parse(raw_pair: &str) -> Result<Self> {
        let (source, destination) = split_pair(raw_pair.trim())
            .filter(|(src, dst)| !src.is_empty() && !dst.is_empty())
            .ok_or_else(|| Error::MalformedPair(raw_pair.to_string()))?;

        Ok(Self {
            raw_pair: raw_pair.to_string(),
            source_is_remote: is_remote(&source),
            destination_is_remote: is_remote(&destination),
            source,
            destination,
            outcome: None,
        })
    }

    /// Best-effort endpoint checks.
    ///
    /// A local source must exist, or at least its parent directory must.
    /// Remote sources are never checked. The destination check only
    /// catches obviously garbage strings.
    pub fn validate(&self) -> Result<()> {
        if !self.source_is_remote {
            let source = Path::new(&self.source);
            let parent = match source.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            if !source.exists() && !parent.exists() {
                return Err(self.invalid(format!(
                    "source '{}' does not exist and neither does its parent directory",
                    self.source
                )));
            }
        }

        if !is_plausible_destination(&self.destination) {
            return Err(self.invalid(format!(
                "destination '{}' is not a valid path or URL",
                self.destination
            )));
        }

        Ok(())
    }

    /// Source names a remote prefix rather than a single object
    pub fn source_is_prefix(&self) -> bool {
        self.source.ends_with('/')
    }

    fn invalid(&self, reason: String) -> Error {
        Error::InvalidEndpoint {
            pair: self.raw_pair.trim().to_string(),
            reason,
        }
    }
}

fn is_plausible_destination(destination: &str) -> bool {
    is_remote(destination)
        || destination.starts_with('/')
        || destination.starts_with("./")
        || destination
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
}

/// Split one trimmed segment into source and destination.
///
/// Separator precedence:
/// 1. `s3://` source: the scheme is set aside and the separator is looked
///    up in the remainder only (a `:s3://` destination first, else the
///    last `:`), so the scheme's own colon never splits
/// 2. `:s3://` anywhere: local source, remote destination
/// 3. otherwise the last `:` (local to local)
///
/// Both halves come back trimmed. `None` when no separator exists.
pub fn split_pair(segment: &str) -> Option<(String, String)> {
    let (source, destination) = if let Some(rest) = segment.strip_prefix(S3_SCHEME) {
        let idx = separator_index(rest)?;
        (
            format!("{}{}", S3_SCHEME, &rest[..idx]),
            rest[idx + 1..].to_string(),
        )
    } else {
        let idx = separator_index(segment)?;
        (segment[..idx].to_string(), segment[idx + 1..].to_string())
    };

    Some((source.trim().to_string(), destination.trim().to_string()))
}

fn separator_index(text: &str) -> Option<usize> {
    text.find(REMOTE_DEST_MARKER).or_else(|| text.rfind(':'))
}

/// Split a comma-separated pair list into task candidates, in order.
///
/// Empty segments are dropped and never counted. Malformed segments are
/// kept as errors so the caller can count them.
pub fn parse_pairs(raw: &str) -> Vec<Result<CopyTask>> {
    raw.split(',')
        .filter(|segment| {
            let keep = !segment.trim().is_empty();
            if !keep {
                tracing::debug!("Skipping empty pair segment");
            }
            keep
        })
        .map(CopyTask::parse)
        .collect()
}
