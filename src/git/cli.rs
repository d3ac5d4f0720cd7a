use std::{
    path::{Path, PathBuf},
    process::Stdio,
    sync::OnceLock,
};

use log::{debug, error, info, trace};
use regex_lite::Regex;
use tokio::process::Command;

use super::{CloneError, CloneRequest, ProbeError, VersionControl};

/// Runs the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn describe(&self, args: &[String]) -> String {
        let mut command = self.program.display().to_string();
        for arg in args {
            command.push(' ');
            command.push_str(arg);
        }
        command
    }
}

/// Whether `output` starts with `git version X.Y.Z`.
pub fn is_git_version(output: &str) -> bool {
    static GIT_VERSION: OnceLock<Regex> = OnceLock::new();
    GIT_VERSION
        .get_or_init(|| Regex::new(r"^git version [0-9]+\.[0-9]+\.[0-9]+").unwrap())
        .is_match(output)
}

impl VersionControl for GitCli {
    fn probe(&self) -> Result<String, ProbeError> {
        debug!("Testing if git is working...");
        let command = self.describe(&["--version".to_owned()]);
        let output = std::process::Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ProbeError::Launch {
                command: command.clone(),
                source,
            })?;
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        let text = text.trim().to_owned();
        trace!("`{}` printed {:?}", command, text);
        if is_git_version(&text) {
            debug!("Git test succeeded: {}", text);
            Ok(text)
        } else {
            Err(ProbeError::UnexpectedOutput(text))
        }
    }

    async fn clone_repository(&self, request: CloneRequest) -> Result<(), CloneError> {
        let args = request.to_args();
        let command = self.describe(&args);
        info!("Cloning {} into {}", request.url, request.destination.display());

        let child = Command::new(&self.program)
            .args(&args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .spawn();
        let mut child = match child {
            Ok(child) => child,
            Err(source) => {
                let error = CloneError::Launch { command, source };
                error!("{}", error);
                return Err(error);
            }
        };

        let status = child.wait().await.map_err(|source| CloneError::Wait {
            command: command.clone(),
            source,
        })?;
        if status.success() {
            debug!("`{}` finished", command);
            Ok(())
        } else {
            let error = CloneError::Exited { command, status };
            error!("{}", error);
            Err(error)
        }
    }
}
