use std::{
    fs::File,
    path::{Path, PathBuf},
};

use fs4::fs_std::FileExt;
use log::debug;
use thiserror::Error;

/// Advisory lock on an SDK root, released on drop.
#[derive(Debug)]
pub struct FileLock {
    _file: File,
    path: PathBuf,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0} is locked, another SDK operation is in progress")]
    Contended(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FileLock {
    /// Takes the lock without waiting.
    pub fn try_new(path: &Path) -> Result<Self, Error> {
        let file = File::create(path)?;
        if file.try_lock_exclusive()? {
            debug!("Acquired a lock on {}", path.display());
            Ok(Self {
                _file: file,
                path: path.to_path_buf(),
            })
        } else {
            Err(Error::Contended(path.to_path_buf()))
        }
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        debug!("Releasing the lock on {}", self.path.display());
    }
}
