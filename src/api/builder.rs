use std::path::PathBuf;

use crate::{
    config::ArmsdkConfig,
    fetch::{BatchFetcher, DEFAULT_GIT_HOST},
    git::{GitCli, DEFAULT_SUBMODULE_JOBS},
    SdkManager,
};

#[derive(Default)]
pub struct SdkManagerBuilder {
    sdk_path: Option<PathBuf>,
    project_dir: Option<PathBuf>,
    git_program: Option<PathBuf>,
    git_host: Option<String>,
    git_jobs: Option<u32>,
}

impl SdkManagerBuilder {
    /// Starts from loaded configuration; values set afterwards win.
    pub fn from_config(config: ArmsdkConfig) -> Self {
        Self {
            sdk_path: config.sdk_path,
            project_dir: None,
            git_program: Some(config.git_program),
            git_host: Some(config.git_host),
            git_jobs: Some(config.git_jobs),
        }
    }

    /// Directory the SDK is installed into.
    pub fn sdk_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.sdk_path = Some(path.into());
        self
    }

    /// Project directory. An `armsdk` directory inside it takes precedence
    /// over the configured SDK path.
    pub fn project_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_dir = Some(path.into());
        self
    }

    /// The git executable.
    ///
    /// Defaults to `git` on the `PATH`.
    pub fn git_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.git_program = Some(program.into());
        self
    }

    /// URL prefix of the SDK repositories.
    ///
    /// Defaults to `https://github.com/`.
    pub fn git_host(mut self, host: impl Into<String>) -> Self {
        self.git_host = Some(host.into());
        self
    }

    /// Parallel submodule fetches for recursive repositories.
    ///
    /// Defaults to 4.
    pub fn git_jobs(mut self, jobs: u32) -> Self {
        self.git_jobs = Some(jobs);
        self
    }

    pub fn build(self) -> SdkManager {
        let Self {
            sdk_path,
            project_dir,
            git_program,
            git_host,
            git_jobs,
        } = self;

        let git = git_program.map(GitCli::new).unwrap_or_default();
        let fetcher = BatchFetcher::new(git)
            .with_host(git_host.unwrap_or_else(|| DEFAULT_GIT_HOST.to_owned()))
            .with_jobs(git_jobs.unwrap_or(DEFAULT_SUBMODULE_JOBS));

        SdkManager {
            fetcher,
            sdk_path,
            project_dir,
        }
    }
}
