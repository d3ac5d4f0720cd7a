use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use log::{debug, error, info, warn};
use thiserror::Error;
use tokio::{
    runtime::Handle,
    task::{JoinHandle, JoinSet},
};

use crate::{
    backup::{self, FilesystemError},
    flock::FileLock,
    git::{CloneError, CloneRequest, ProbeError, VersionControl, DEFAULT_SUBMODULE_JOBS},
    model::{FetchJob, FetchSignal, RepoSpec},
};

pub const DEFAULT_GIT_HOST: &str = "https://github.com/";

const LOCK_FILE_NAME: &str = ".armsdk.lock";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error(
        "Git test failed. Make sure git is installed (https://git-scm.com/downloads) or is working correctly: {0}"
    )]
    ToolUnavailable(#[from] ProbeError),
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
    #[error("Cannot lock the SDK directory: {0}")]
    Lock(#[from] crate::flock::Error),
    #[error("Fetching requires a running tokio runtime")]
    NoRuntime,
    #[error("Fetch task did not complete: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}

/// Why a single repository could not be fetched.
#[derive(Error, Debug)]
pub enum RepoError {
    #[error(transparent)]
    Clone(#[from] CloneError),
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
    #[error("Preparing the checkout did not complete: {0}")]
    Interrupted(#[from] tokio::task::JoinError),
}

#[derive(Debug)]
pub struct RepoFailure {
    pub spec: RepoSpec,
    pub error: RepoError,
}

/// Final state of a batch fetch.
#[derive(Debug)]
pub struct FetchReport {
    pub job: FetchJob,
    pub signal: FetchSignal,
    pub failures: Vec<RepoFailure>,
}

impl FetchReport {
    pub fn is_success(&self) -> bool {
        self.signal.is_success()
    }
}

/// Shared view of the counters of a running batch.
#[derive(Clone)]
pub struct FetchProgress(Arc<Mutex<FetchJob>>);

impl FetchProgress {
    pub fn snapshot(&self) -> FetchJob {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A running batch fetch.
pub struct FetchHandle {
    progress: FetchProgress,
    task: JoinHandle<FetchReport>,
}

impl FetchHandle {
    /// Snapshot of the batch counters.
    pub fn progress(&self) -> FetchJob {
        self.progress.snapshot()
    }

    /// A progress view that outlives [`FetchHandle::wait`].
    pub fn tracker(&self) -> FetchProgress {
        self.progress.clone()
    }

    pub async fn wait(self) -> Result<FetchReport, FetchError> {
        Ok(self.task.await?)
    }
}

/// Clones a set of repositories concurrently into one directory.
pub struct BatchFetcher<V> {
    vcs: Arc<V>,
    host: String,
    jobs: u32,
}

impl<V: VersionControl> BatchFetcher<V> {
    pub fn new(vcs: V) -> Self {
        Self {
            vcs: Arc::new(vcs),
            host: DEFAULT_GIT_HOST.to_owned(),
            jobs: DEFAULT_SUBMODULE_JOBS,
        }
    }

    /// Prefix the remote ids are appended to.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Parallel submodule fetches of recursive clones.
    pub fn with_jobs(mut self, jobs: u32) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn vcs(&self) -> &V {
        &self.vcs
    }

    /// Starts cloning every repository into `target_dir` and returns without
    /// waiting for the clones.
    ///
    /// Fails up front, before anything is cloned, when the version control
    /// tool does not respond. Otherwise each repository is fetched on its
    /// own task; a failing repository does not affect the others.
    /// `on_complete` runs exactly once, after the last repository reported.
    pub fn fetch_all<F>(
        &self,
        target_dir: &Path,
        specs: &[RepoSpec],
        on_complete: F,
    ) -> Result<FetchHandle, FetchError>
    where
        F: FnOnce(&FetchReport) + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| FetchError::NoRuntime)?;

        let version = self.vcs.probe()?;
        info!("Using {}", version);

        std::fs::create_dir_all(target_dir).map_err(|source| FilesystemError::CreateDir {
            path: target_dir.to_path_buf(),
            source,
        })?;
        let lock = FileLock::try_new(&target_dir.join(LOCK_FILE_NAME))?;

        info!(
            "Fetching {} repositories into {}",
            specs.len(),
            target_dir.display()
        );

        let job = Arc::new(Mutex::new(FetchJob::new(specs.len())));
        let mut tasks = JoinSet::new();
        for spec in specs.iter().copied() {
            let request = CloneRequest {
                url: spec.to_git_url(&self.host),
                destination: spec.path_in(target_dir),
                recursive: spec.recursive,
                jobs: self.jobs,
            };
            let vcs = Arc::clone(&self.vcs);
            tasks.spawn_on(
                async move {
                    let result = match prepare(request.destination.clone()).await {
                        Ok(()) => vcs.clone_repository(request).await.map_err(RepoError::from),
                        Err(error) => Err(error),
                    };
                    (spec, result)
                },
                &runtime,
            );
        }

        let target = target_dir.display().to_string();
        let aggregate = Arc::clone(&job);
        let task = runtime.spawn(async move {
            let _lock = lock;
            let mut failures = Vec::new();
            let mut signal = None;
            while let Some(joined) = tasks.join_next().await {
                let success = match joined {
                    Ok((spec, Ok(()))) => {
                        debug!("Fetched {}", spec);
                        true
                    }
                    Ok((spec, Err(error))) => {
                        warn!("Failed to fetch {}: {}", spec, error);
                        failures.push(RepoFailure { spec, error });
                        false
                    }
                    Err(error) => {
                        error!("A fetch task did not complete: {}", error);
                        false
                    }
                };
                if let Some(done) = record(&aggregate, success) {
                    signal = Some(done);
                }
            }
            let (job, signal) = finish(&aggregate, signal);

            match signal {
                FetchSignal::AllSucceeded => {
                    info!("All {} repositories fetched into {}", job.total(), target)
                }
                FetchSignal::Failed { failed } => error!(
                    "Failed fetching {} of {} repositories into {}",
                    failed,
                    job.total(),
                    target
                ),
            }

            let report = FetchReport {
                job,
                signal,
                failures,
            };
            on_complete(&report);
            report
        });

        Ok(FetchHandle {
            progress: FetchProgress(job),
            task,
        })
    }
}

/// Backs up or clears `destination` on the blocking pool.
async fn prepare(destination: PathBuf) -> Result<(), RepoError> {
    tokio::task::spawn_blocking(move || backup::prepare_destination(&destination)).await??;
    Ok(())
}

fn record(job: &Mutex<FetchJob>, success: bool) -> Option<FetchSignal> {
    job.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .record(success)
}

fn finish(job: &Mutex<FetchJob>, signal: Option<FetchSignal>) -> (FetchJob, FetchSignal) {
    let mut job = job.lock().unwrap_or_else(PoisonError::into_inner);
    let signal = signal.or_else(|| job.take_signal()).unwrap_or(FetchSignal::Failed {
        failed: job.total() - job.succeeded(),
    });
    (*job, signal)
}

/// Outcome of [`restore_all`].
#[derive(Debug, Default)]
pub struct RestoreReport {
    pub restored: Vec<RepoSpec>,
    pub failures: Vec<RepoFailure>,
}

impl RestoreReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Puts every `_backup` copy under `target_dir` back in place.
///
/// Leaves the filesystem untouched when there is nothing to restore.
pub fn restore_all(target_dir: &Path, specs: &[RepoSpec]) -> Result<RestoreReport, FetchError> {
    let mut report = RestoreReport::default();
    let has_backups = specs
        .iter()
        .any(|spec| backup::backup_path(&spec.path_in(target_dir)).exists());
    if !has_backups {
        info!("Nothing to restore in {}", target_dir.display());
        return Ok(report);
    }

    let _lock = FileLock::try_new(&target_dir.join(LOCK_FILE_NAME))?;
    for spec in specs.iter().copied() {
        match backup::restore(&spec.path_in(target_dir)) {
            Ok(true) => report.restored.push(spec),
            Ok(false) => {}
            Err(error) => {
                error!("Failed to restore {}: {}", spec, error);
                report.failures.push(RepoFailure {
                    spec,
                    error: error.into(),
                });
            }
        }
    }
    Ok(report)
}
