use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use log::debug;
use thiserror::Error;

use crate::{backup, git::repository::head_commit, model::RepoSpec};

/// Name of the SDK directory a project may carry next to its files.
pub const LOCAL_SDK_DIRECTORY: &str = "armsdk";

#[derive(Error, Debug, Clone)]
pub enum SdkError {
    #[error("Configure Armory SDK path first")]
    NotConfigured,
    #[error("Cannot resolve SDK path {path}: {source}")]
    BadPath {
        path: PathBuf,
        source: Arc<std::io::Error>,
    },
}

/// Where the SDK lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkLocation {
    root: PathBuf,
    local: bool,
}

impl SdkLocation {
    /// A project-local `armsdk` directory wins over the configured path.
    pub fn resolve(
        configured: Option<&Path>,
        project_dir: Option<&Path>,
    ) -> Result<SdkLocation, SdkError> {
        if let Some(local) = project_dir
            .map(|dir| dir.join(LOCAL_SDK_DIRECTORY))
            .filter(|dir| dir.is_dir())
        {
            debug!("Using project-local SDK {}", local.display());
            return Ok(SdkLocation {
                root: local,
                local: true,
            });
        }

        match configured.filter(|path| !path.as_os_str().is_empty()) {
            Some(path) => {
                let root = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    std::env::current_dir()
                        .map_err(|source| SdkError::BadPath {
                            path: path.to_path_buf(),
                            source: Arc::new(source),
                        })?
                        .join(path)
                };
                Ok(SdkLocation { root, local: false })
            }
            None => Err(SdkError::NotConfigured),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the SDK sits inside a project directory.
    pub fn is_local(&self) -> bool {
        self.local
    }

    pub fn armory_path(&self) -> PathBuf {
        self.root.join("armory")
    }

    /// Directory holding the engine's host-side scripts.
    pub fn scripts_path(&self) -> PathBuf {
        self.armory_path().join("blender")
    }

    /// True once the engine repository has been downloaded, even if only its
    /// backup is left.
    pub fn exists(&self) -> bool {
        let armory = self.armory_path();
        armory.exists() || backup::backup_path(&armory).exists()
    }

    pub fn status(&self, specs: &[RepoSpec]) -> Vec<RepoStatus> {
        specs
            .iter()
            .map(|spec| {
                let path = spec.path_in(&self.root);
                let installed = path.exists();
                RepoStatus {
                    spec: *spec,
                    installed,
                    backup: backup::backup_path(&path).exists(),
                    head: installed.then(|| head_commit(&path)).flatten(),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoStatus {
    pub spec: RepoSpec,
    pub installed: bool,
    pub backup: bool,
    pub head: Option<String>,
}
