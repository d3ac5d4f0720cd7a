use std::path::PathBuf;

use log::info;

use crate::{
    fetch::{restore_all, BatchFetcher, FetchHandle, FetchReport, RestoreReport},
    git::{GitCli, ProbeError, VersionControl},
    lifecycle::{Integration, Lifecycle},
    model::ARMORY_REPOSITORIES,
    sdk::{RepoStatus, SdkError, SdkLocation},
};

mod builder;

pub use builder::SdkManagerBuilder;

/// Installs, updates and restores the Armory SDK.
pub struct SdkManager {
    fetcher: BatchFetcher<GitCli>,
    sdk_path: Option<PathBuf>,
    project_dir: Option<PathBuf>,
}

impl SdkManager {
    pub fn builder() -> SdkManagerBuilder {
        SdkManagerBuilder::default()
    }

    pub fn location(&self) -> Result<SdkLocation, SdkError> {
        SdkLocation::resolve(self.sdk_path.as_deref(), self.project_dir.as_deref())
    }

    /// Runs the git capability probe.
    pub fn check_git(&self) -> Result<String, ProbeError> {
        self.fetcher.vcs().probe()
    }

    /// Downloads the latest development version of every SDK repository.
    /// Previous checkouts are kept as backups. Must be called from within a
    /// tokio runtime.
    pub fn install<F>(&self, on_complete: F) -> anyhow::Result<FetchHandle>
    where
        F: FnOnce(&FetchReport) + Send + 'static,
    {
        let location = self.location()?;
        info!(
            "Downloading Armory SDK into {}, cloning {} repositories",
            location.root().display(),
            ARMORY_REPOSITORIES.len()
        );
        Ok(self
            .fetcher
            .fetch_all(location.root(), ARMORY_REPOSITORIES, on_complete)?)
    }

    /// Puts the backed up checkouts back in place.
    pub fn restore(&self) -> anyhow::Result<RestoreReport> {
        let location = self.location()?;
        Ok(restore_all(location.root(), ARMORY_REPOSITORIES)?)
    }

    pub fn status(&self) -> anyhow::Result<Vec<RepoStatus>> {
        Ok(self.location()?.status(ARMORY_REPOSITORIES))
    }

    /// Lifecycle controller for an integration hosted by this SDK.
    pub fn lifecycle<I: Integration>(&self, integration: I) -> Lifecycle<I> {
        Lifecycle::new(integration, self.location())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    #[test]
    fn builder_settings_override_config() {
        let config = crate::config::ArmsdkConfig {
            sdk_path: Some("/opt/armsdk".into()),
            git_program: "git".into(),
            git_host: "https://github.com/".to_owned(),
            git_jobs: 4,
        };
        let project = tempfile::tempdir().unwrap();
        fs::create_dir(project.path().join("armsdk")).unwrap();

        let manager = SdkManagerBuilder::from_config(config)
            .project_dir(project.path())
            .build();

        let location = manager.location().unwrap();
        assert!(location.is_local());
        assert_eq!(location.root(), project.path().join("armsdk"));
    }

    #[test]
    fn unconfigured_manager_cannot_restore() {
        let manager = SdkManager::builder().build();
        assert!(manager.restore().is_err());
        assert!(manager.status().is_err());
    }

    #[test]
    fn status_lists_every_repository() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("Kha")).unwrap();
        let manager = SdkManager::builder().sdk_path(root.path()).build();

        let status = manager.status().unwrap();

        assert_eq!(status.len(), ARMORY_REPOSITORIES.len());
        let installed: Vec<_> = status
            .iter()
            .filter(|repo| repo.installed)
            .map(|repo| repo.spec.local_path)
            .collect();
        assert_eq!(installed, vec!["Kha"]);
    }

    #[tokio::test]
    async fn install_with_broken_git_starts_nothing() {
        let root = tempfile::tempdir().unwrap();
        let manager = SdkManager::builder()
            .sdk_path(root.path().join("sdk"))
            .git_program("/nonexistent/armsdk-git")
            .build();

        assert!(manager.install(|_| {}).is_err());
        assert!(!root.path().join("sdk").exists());
    }
}
