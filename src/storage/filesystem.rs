//! File system operations
//!
//! Existence checks and the write-to-temp-then-rename rewrite used by the
//! flat-file backend.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use log::trace;
use tempfile::NamedTempFile;

use crate::error::StoreError;

/// Fails with `PathNotFound` unless `path` exists.
pub fn ensure_exists(path: &Path) -> Result<(), StoreError> {
    if path.exists() {
        Ok(())
    } else {
        Err(StoreError::PathNotFound(path.to_path_buf()))
    }
}

/// Replaces the contents of `path` so that readers see either the old or
/// the new file, never a partial one.
///
/// Symlinks are followed: the file they point at is replaced and the link
/// stays a link. The new content is written to a temporary file next to
/// that target, synced, given its permissions and (on unix) its owner and
/// group, and renamed over it. On any early return the temporary file is
/// removed when it drops.
pub fn rewrite_atomically(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let target = fs::canonicalize(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => StoreError::PathNotFound(path.to_path_buf()),
        _ => StoreError::io(path, e),
    })?;
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
    tmp.write_all(contents)
        .map_err(|e| StoreError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| StoreError::io(tmp.path(), e))?;

    let metadata = fs::metadata(&target).map_err(|e| StoreError::io(&target, e))?;
    fs::set_permissions(tmp.path(), metadata.permissions())
        .map_err(|e| StoreError::io(tmp.path(), e))?;
    #[cfg(unix)]
    copy_ownership(&tmp, &metadata)?;

    trace!(
        "Renaming {} over {} ({} bytes)",
        tmp.path().display(),
        target.display(),
        contents.len()
    );
    tmp.persist(&target)
        .map_err(|e| StoreError::io(&target, e.error))?;
    Ok(())
}

/// Gives the temporary file the owner and group of the file it replaces.
///
/// Without privileges a process can only keep its own uid; EPERM is then
/// tolerated as long as the owner already matches.
#[cfg(unix)]
fn copy_ownership(tmp: &NamedTempFile, original: &fs::Metadata) -> Result<(), StoreError> {
    use std::os::unix::fs::{MetadataExt, fchown};

    let current = tmp
        .as_file()
        .metadata()
        .map_err(|e| StoreError::io(tmp.path(), e))?;
    if current.uid() == original.uid() && current.gid() == original.gid() {
        return Ok(());
    }

    match fchown(tmp.as_file(), Some(original.uid()), Some(original.gid())) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied && current.uid() == original.uid() => {
            trace!(
                "Keeping group {} on {}: {}",
                current.gid(),
                tmp.path().display(),
                e
            );
            Ok(())
        }
        Err(e) => Err(StoreError::io(tmp.path(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("passwd");
        assert!(matches!(
            ensure_exists(&missing),
            Err(StoreError::PathNotFound(p)) if p == missing
        ));
    }

    #[test]
    fn rewrite_replaces_content_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passwd");
        fs::write(&path, "old:content\n").unwrap();

        rewrite_atomically(&path, b"new:content\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new:content\n");
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn rewrite_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passwd");
        fs::write(&path, "").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        rewrite_atomically(&path, b"u:h\n").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[cfg(unix)]
    #[test]
    fn rewrite_keeps_owner_and_group() {
        use std::os::unix::fs::{MetadataExt, chown};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passwd");
        fs::write(&path, "alice:h1\n").unwrap();

        // Only root can hand a file to another user; otherwise the file
        // stays with the current user and must keep that owner.
        let running_as_root = fs::metadata(&path).unwrap().uid() == 0;
        if running_as_root {
            chown(&path, Some(1000), Some(1000)).unwrap();
        }
        let before = fs::metadata(&path).unwrap();

        rewrite_atomically(&path, b"alice:h1\nbob:h2\n").unwrap();

        let after = fs::metadata(&path).unwrap();
        assert_eq!((after.uid(), after.gid()), (before.uid(), before.gid()));
        if running_as_root {
            assert_eq!((after.uid(), after.gid()), (1000, 1000));
        }
    }

    #[cfg(unix)]
    #[test]
    fn rewrite_through_symlink_updates_target() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("real_passwd");
        let link = dir.path().join("passwd");
        fs::write(&target, "alice:h1\n").unwrap();
        symlink(&target, &link).unwrap();

        rewrite_atomically(&link, b"alice:h1\nbob:h2\n").unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&target).unwrap(), "alice:h1\nbob:h2\n");
        assert_eq!(fs::read_to_string(&link).unwrap(), "alice:h1\nbob:h2\n");
    }
}
