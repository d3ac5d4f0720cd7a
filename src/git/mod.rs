mod cli;
pub mod repository;

use std::{future::Future, path::PathBuf, process::ExitStatus};

use thiserror::Error;

pub use cli::{is_git_version, GitCli};

/// Submodule fetch parallelism used by recursive clones.
pub const DEFAULT_SUBMODULE_JOBS: u32 = 4;

/// Seam between the batch fetcher and the version control tool.
pub trait VersionControl: Send + Sync + 'static {
    /// Checks that the tool is installed and responsive, returning its
    /// version string.
    fn probe(&self) -> Result<String, ProbeError>;

    /// Clones one repository. Resolves once the clone has finished.
    fn clone_repository(
        &self,
        request: CloneRequest,
    ) -> impl Future<Output = Result<(), CloneError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneRequest {
    pub url: String,
    pub destination: PathBuf,
    pub recursive: bool,
    pub jobs: u32,
}

impl CloneRequest {
    /// Arguments of the shallow `git clone` invocation.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["clone".to_owned()];
        if self.recursive {
            args.push("--recursive".to_owned());
        }
        args.push(self.url.clone());
        args.push(self.destination.to_string_lossy().into_owned());
        args.push("--depth".to_owned());
        args.push("1".to_owned());
        if self.recursive {
            args.push("--shallow-submodules".to_owned());
            args.push("--jobs".to_owned());
            args.push(self.jobs.to_string());
        }
        args
    }
}

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Could not run `{command}`: {source}")]
    Launch {
        command: String,
        source: std::io::Error,
    },
    #[error("Unexpected version output {0:?}")]
    UnexpectedOutput(String),
}

#[derive(Error, Debug)]
pub enum CloneError {
    #[error("Could not start `{command}`: {source}{}", launch_hint(.source))]
    Launch {
        command: String,
        source: std::io::Error,
    },
    #[error("`{command}` failed with {status}")]
    Exited { command: String, status: ExitStatus },
    #[error("Lost track of `{command}`: {source}")]
    Wait {
        command: String,
        source: std::io::Error,
    },
}

fn launch_hint(error: &std::io::Error) -> &'static str {
    const ENOMEM: i32 = 12;
    const EACCES: i32 = 13;
    match error.raw_os_error() {
        Some(ENOMEM) => ". Make sure there is enough space for the SDK (at least 500mb)",
        Some(EACCES) => ". Permission denied, try modifying the permissions of the SDK folder",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn shallow_clone_args() {
        let request = CloneRequest {
            url: "https://github.com/armory3d/iron".to_owned(),
            destination: PathBuf::from("/sdk/iron"),
            recursive: false,
            jobs: DEFAULT_SUBMODULE_JOBS,
        };
        assert_eq!(
            request.to_args(),
            vec![
                "clone",
                "https://github.com/armory3d/iron",
                "/sdk/iron",
                "--depth",
                "1"
            ]
        );
    }

    #[test]
    fn recursive_clone_args() {
        let request = CloneRequest {
            url: "https://github.com/armory3d/Kha".to_owned(),
            destination: PathBuf::from("/sdk/Kha"),
            recursive: true,
            jobs: 4,
        };
        assert_eq!(
            request.to_args(),
            vec![
                "clone",
                "--recursive",
                "https://github.com/armory3d/Kha",
                "/sdk/Kha",
                "--depth",
                "1",
                "--shallow-submodules",
                "--jobs",
                "4"
            ]
        );
    }

    #[test]
    fn launch_error_mentions_disk_space() {
        let error = CloneError::Launch {
            command: "git clone".to_owned(),
            source: std::io::Error::from_raw_os_error(12),
        };
        assert!(error.to_string().contains("at least 500mb"));
    }
}
