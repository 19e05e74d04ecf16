//! Operation selection for a validated copy task

use crate::pair::CopyTask;
use std::fmt;
use std::path::{Path, PathBuf};

/// Transfer primitive chosen for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Recursive synchronization through the object-store client
    SyncTree,
    /// Single-object copy through the object-store client
    CopyObject,
    /// Recursive local directory copy
    LocalTree,
    /// Direct local file copy
    LocalFile,
}

impl Operation {
    /// Whether the operation goes through the object-store client
    pub fn is_remote(&self) -> bool {
        matches!(self, Operation::SyncTree | Operation::CopyObject)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Operation::SyncTree => "sync",
            Operation::CopyObject => "copy",
            Operation::LocalTree => "local tree copy",
            Operation::LocalFile => "local file copy",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What to do for one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub operation: Operation,
    /// Directory to create before transferring (skipped under dry-run)
    pub create_dir: Option<PathBuf>,
}

impl CopyTask {
    /// Pick the operation from the remote/local combination of both ends.
    ///
    /// Local sources are inspected on disk to tell directories from files.
    pub fn plan(&self) -> Plan {
        match (self.source_is_remote, self.destination_is_remote) {
            (true, true) => Plan {
                operation: if self.source_is_prefix() {
                    Operation::SyncTree
                } else {
                    Operation::CopyObject
                },
                create_dir: None,
            },
            (true, false) => {
                if self.source_is_prefix() {
                    Plan {
                        operation: Operation::SyncTree,
                        create_dir: Some(PathBuf::from(&self.destination)),
                    }
                } else {
                    Plan {
                        operation: Operation::CopyObject,
                        create_dir: target_directory(&self.destination),
                    }
                }
            }
            (false, true) => Plan {
                operation: if Path::new(&self.source).is_dir() {
                    Operation::SyncTree
                } else {
                    Operation::CopyObject
                },
                create_dir: None,
            },
            (false, false) => {
                if Path::new(&self.source).is_dir() {
                    Plan {
                        operation: Operation::LocalTree,
                        create_dir: Some(PathBuf::from(&self.destination)),
                    }
                } else {
                    Plan {
                        operation: Operation::LocalFile,
                        create_dir: None,
                    }
                }
            }
        }
    }
}

/// Directory that must exist before a single object lands at `destination`.
///
/// A trailing `/` means the destination itself is the directory.
fn target_directory(destination: &str) -> Option<PathBuf> {
    if destination.ends_with('/') {
        return Some(PathBuf::from(destination));
    }
    Path::new(destination)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(pair: &str) -> Plan {
        CopyTask::parse(pair).unwrap().plan()
    }

    #[test]
    fn test_remote_to_remote() {
        assert_eq!(plan("s3://a/dir/:s3://b/dir/").operation, Operation::SyncTree);
        assert_eq!(plan("s3://a/key:s3://b/key").operation, Operation::CopyObject);
        assert_eq!(plan("s3://a/key:s3://b/key").create_dir, None);
    }

    #[test]
    fn test_remote_prefix_to_local_creates_destination() {
        let p = plan("s3://a/models/:/app/models");
        assert_eq!(p.operation, Operation::SyncTree);
        assert_eq!(p.create_dir, Some(PathBuf::from("/app/models")));
    }

    #[test]
    fn test_remote_object_to_local_directory() {
        let p = plan("s3://b/f.zip:/app/data/");
        assert_eq!(p.operation, Operation::CopyObject);
        assert_eq!(p.create_dir, Some(PathBuf::from("/app/data/")));
    }

    #[test]
    fn test_remote_object_to_local_file_creates_parent() {
        let p = plan("s3://b/f.zip:/app/data/f.zip");
        assert_eq!(p.operation, Operation::CopyObject);
        assert_eq!(p.create_dir, Some(PathBuf::from("/app/data")));

        let bare = plan("s3://b/f.zip:f.zip");
        assert_eq!(bare.create_dir, None);
    }

    #[test]
    fn test_local_to_remote() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, b"a").unwrap();

        let p = plan(&format!("{}:s3://b/prefix/", dir.path().display()));
        assert_eq!(p.operation, Operation::SyncTree);

        let p = plan(&format!("{}:s3://b/a.txt", file.display()));
        assert_eq!(p.operation, Operation::CopyObject);
        assert_eq!(p.create_dir, None);
    }

    #[test]
    fn test_local_to_local() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, b"a").unwrap();

        let p = plan(&format!("{}:/tmp/out", dir.path().display()));
        assert_eq!(p.operation, Operation::LocalTree);
        assert_eq!(p.create_dir, Some(PathBuf::from("/tmp/out")));

        let p = plan(&format!("{}:/tmp/out.txt", file.display()));
        assert_eq!(p.operation, Operation::LocalFile);
        assert_eq!(p.create_dir, None);
    }

    #[test]
    fn test_operation_kind() {
        assert!(Operation::SyncTree.is_remote());
        assert!(Operation::CopyObject.is_remote());
        assert!(!Operation::LocalTree.is_remote());
        assert!(!Operation::LocalFile.is_remote());
    }
}
