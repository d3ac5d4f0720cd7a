use std::{
    ffi::OsString,
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info, trace};
use thiserror::Error;

const BACKUP_SUFFIX: &str = "_backup";

#[derive(Error, Debug)]
pub enum FilesystemError {
    #[error("Could not move {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    #[error("Could not delete {path}: {source}")]
    Remove { path: PathBuf, source: io::Error },
    #[error("Could not create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
}

/// `<path>_backup`, next to `path`.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(BACKUP_SUFFIX);
    path.with_file_name(name)
}

/// Clears the way for a fresh checkout at `path`.
///
/// The first existing checkout is kept aside as `<path>_backup`; any later
/// one is discarded since a backup is already present.
pub fn prepare_destination(path: &Path) -> Result<(), FilesystemError> {
    let backup = backup_path(path);
    if path.exists() && !backup.exists() {
        debug!("Backing up {} to {}", path.display(), backup.display());
        rename(path, &backup)?;
    }
    if path.exists() {
        debug!("Removing previous checkout {}", path.display());
        force_remove_dir_all(path)?;
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| FilesystemError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Moves `<path>_backup` back to `path`, replacing whatever is there.
/// Returns `false` when there is no backup to restore.
pub fn restore(path: &Path) -> Result<bool, FilesystemError> {
    let backup = backup_path(path);
    if !backup.exists() {
        trace!("No backup for {}", path.display());
        return Ok(false);
    }
    if path.exists() {
        force_remove_dir_all(path)?;
    }
    rename(&backup, path)?;
    info!("Restored {}", path.display());
    Ok(true)
}

/// Recursively deletes `path`. Read-only entries are made writable and the
/// deletion retried when the first attempt is refused.
pub fn force_remove_dir_all(path: &Path) -> Result<(), FilesystemError> {
    let remove = |path: &Path| {
        if fs::symlink_metadata(path)?.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        }
    };
    match remove(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::PermissionDenied => {
            debug!(
                "Deleting {} was refused ({}), clearing read-only attributes",
                path.display(),
                error
            );
            clear_readonly(path)
                .and_then(|_| remove(path))
                .map_err(|source| FilesystemError::Remove {
                    path: path.to_path_buf(),
                    source,
                })
        }
        Err(source) => Err(FilesystemError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn clear_readonly(path: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.file_type().is_symlink() {
        return Ok(());
    }
    let mut permissions = metadata.permissions();
    if permissions.readonly() {
        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(false);
        fs::set_permissions(path, permissions)?;
    }
    if metadata.is_dir() {
        for entry in fs::read_dir(path)? {
            clear_readonly(&entry?.path())?;
        }
    }
    Ok(())
}

fn rename(from: &Path, to: &Path) -> Result<(), FilesystemError> {
    fs::rename(from, to).map_err(|source| FilesystemError::Rename {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}
