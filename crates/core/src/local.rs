//! Local filesystem copy primitives

use crate::error::{Error, Result};
use crate::plan::Operation;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Copy the contents of `src` into `dst`, creating directories as needed.
///
/// Returns the number of files copied.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<u64> {
    // The walk would pick up its own output
    if resolve_path(dst)?.starts_with(src.canonicalize()?) {
        return Err(Error::InvalidInput(format!(
            "destination '{}' is inside source '{}'",
            dst.display(),
            src.display()
        )));
    }

    fs::create_dir_all(dst)?;

    let mut copied = 0;
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| Error::InvalidInput(e.to_string()))?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    tracing::debug!(files = copied, src = %src.display(), dst = %dst.display(), "Copied tree");
    Ok(copied)
}

/// Canonical form of a path that may not exist yet: the deepest existing
/// ancestor is canonicalized and the missing components are appended.
fn resolve_path(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }

    let mut resolved = existing.canonicalize()?;
    resolved.extend(missing.iter().rev());
    Ok(resolved)
}

/// Copy a single file.
///
/// When `dst` ends with `/` or is an existing directory the file keeps its
/// name inside it.
pub fn copy_file(src: &Path, dst: &str) -> Result<PathBuf> {
    let target = resolve_file_target(src, dst)?;
    fs::copy(src, &target)?;
    Ok(target)
}

fn resolve_file_target(src: &Path, dst: &str) -> Result<PathBuf> {
    let dst_path = Path::new(dst);
    if dst.ends_with('/') || dst_path.is_dir() {
        let name = src
            .file_name()
            .ok_or_else(|| Error::InvalidInput(format!("'{}' has no file name", src.display())))?;
        Ok(dst_path.join(name))
    } else {
        Ok(dst_path.to_path_buf())
    }
}

/// Shell equivalent of a local operation, for dry-run output
pub fn describe_local(operation: Operation, src: &str, dst: &str) -> String {
    match operation {
        Operation::LocalTree => format!("cp -r {}/. {}", src.trim_end_matches('/'), dst),
        _ => format!("cp {} {}", src, dst),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_tree() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        fs::create_dir_all(src.path().join("nested/deep")).unwrap();
        fs::create_dir_all(src.path().join("empty")).unwrap();
        fs::write(src.path().join("top.txt"), b"top").unwrap();
        fs::write(src.path().join("nested/deep/leaf.bin"), b"leaf").unwrap();

        let target = dst.path().join("out");
        let copied = copy_tree(src.path(), &target).unwrap();

        assert_eq!(copied, 2);
        assert_eq!(fs::read(target.join("top.txt")).unwrap(), b"top");
        assert_eq!(fs::read(target.join("nested/deep/leaf.bin")).unwrap(), b"leaf");
        assert!(target.join("empty").is_dir());
    }

    #[test]
    fn test_copy_tree_rejects_destination_inside_source() {
        let src = tempfile::tempdir().unwrap();
        fs::write(src.path().join("a.txt"), b"a").unwrap();
        let target = src.path().join("out/nested");

        let result = copy_tree(src.path(), &target);

        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(!src.path().join("out").exists());
    }

    #[test]
    fn test_copy_tree_sibling_with_common_prefix() {
        let root = tempfile::tempdir().unwrap();
        let src = root.path().join("seed");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("a.txt"), b"a").unwrap();
        let target = root.path().join("seed-copy");

        assert_eq!(copy_tree(&src, &target).unwrap(), 1);
        assert!(target.join("a.txt").exists());
    }

    #[test]
    fn test_copy_file_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.txt");
        fs::write(&src, b"hello").unwrap();
        let dst = dir.path().join("b.txt");

        let target = copy_file(&src, dst.to_str().unwrap()).unwrap();
        assert_eq!(target, dst);
        assert_eq!(fs::read(&dst).unwrap(), b"hello");
    }

    #[test]
    fn test_copy_file_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.txt");
        fs::write(&src, b"hello").unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let target = copy_file(&src, out.to_str().unwrap()).unwrap();
        assert_eq!(target, out.join("a.txt"));
        assert!(target.exists());
    }

    #[test]
    fn test_copy_file_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join("b.txt");
        let result = copy_file(&dir.path().join("nope"), dst.to_str().unwrap());
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_describe_local() {
        assert_eq!(
            describe_local(Operation::LocalTree, "/seed/", "/app/seed"),
            "cp -r /seed/. /app/seed"
        );
        assert_eq!(
            describe_local(Operation::LocalFile, "/a.txt", "/b.txt"),
            "cp /a.txt /b.txt"
        );
    }
}
