//! Filesystem primitives shared by the backup recorder, the restore selector and the install
//! overlay.
use crate::configs::error::Result;
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Whether anything (including a dangling symlink) lives at `path`.
pub fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Remove a file, symlink or directory tree. Removing an absent path is a no-op.
pub fn remove_path(path: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err.into()),
    };

    if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }

    Ok(())
}

/// Recursively copy `src` to `dst`, creating parents as needed. Symlinks are recreated rather
/// than followed.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }

    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        let target = if relative.as_os_str().is_empty() {
            dst.to_path_buf()
        } else {
            dst.join(relative)
        };
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    let link = fs::read_link(src)?;
    remove_path(dst)?;
    std::os::unix::fs::symlink(link, dst)?;

    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst)?;

    Ok(())
}

/// Move `src` to `dst`. A plain rename is attempted first; only when the two live on
/// different filesystems is the tree copied and the source removed. Any other rename failure,
/// such as `dst` already holding a non-empty directory, is returned untouched.
pub fn move_path(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }

    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(err) if crosses_devices(&err) => {
            debug!(src = %src.display(), dst = %dst.display(), "rename across devices, copying");
            copy_tree(src, dst)?;
            remove_path(src)
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(unix)]
fn crosses_devices(err: &io::Error) -> bool {
    err.raw_os_error() == Some(nix::errno::Errno::EXDEV as i32)
}

#[cfg(not(unix))]
fn crosses_devices(_err: &io::Error) -> bool {
    false
}

/// Add the executable bits to a file, or to every regular file below a directory. Returns the
/// number of files touched.
#[cfg(unix)]
pub fn make_executable(path: &Path) -> Result<usize> {
    use std::os::unix::fs::PermissionsExt;

    let mut touched = 0;

    for entry in WalkDir::new(path) {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let mut permissions = entry.metadata().map_err(io::Error::from)?.permissions();
        permissions.set_mode(permissions.mode() | 0o111);
        fs::set_permissions(entry.path(), permissions)?;
        touched += 1;
    }

    Ok(touched)
}

#[cfg(not(unix))]
pub fn make_executable(_path: &Path) -> Result<usize> {
    Ok(0)
}
