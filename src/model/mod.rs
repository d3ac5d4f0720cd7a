pub mod job;

use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

pub use job::{FetchJob, FetchSignal};

/// A repository that belongs to the SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RepoSpec {
    /// `organization/repository` on the git host.
    pub remote_id: &'static str,
    /// Location of the checkout, relative to the SDK root.
    pub local_path: &'static str,
    /// Whether submodules are fetched too.
    pub recursive: bool,
}

impl RepoSpec {
    pub const fn new(remote_id: &'static str, local_path: &'static str) -> Self {
        Self {
            remote_id,
            local_path,
            recursive: false,
        }
    }

    pub const fn recursive(remote_id: &'static str, local_path: &'static str) -> Self {
        Self {
            remote_id,
            local_path,
            recursive: true,
        }
    }

    pub fn to_git_url(&self, host: &str) -> String {
        let remote_id = self.remote_id.trim_matches('/');
        if host.ends_with('/') {
            format!("{host}{remote_id}")
        } else {
            format!("{host}/{remote_id}")
        }
    }

    pub fn path_in(&self, root: &Path) -> PathBuf {
        root.join(self.local_path)
    }
}

impl Display for RepoSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} ({})", self.remote_id, self.local_path)
    }
}

/// Repositories that make up the Armory SDK, in launch order.
pub const ARMORY_REPOSITORIES: &[RepoSpec] = &[
    RepoSpec::new("armory3d/armory", "armory"),
    RepoSpec::new("armory3d/iron", "iron"),
    RepoSpec::new("armory3d/haxebullet", "lib/haxebullet"),
    RepoSpec::new("armory3d/haxerecast", "lib/haxerecast"),
    RepoSpec::new("armory3d/zui", "lib/zui"),
    RepoSpec::new("armory3d/armory_tools", "lib/armory_tools"),
    RepoSpec::new("armory3d/Kromx_bin", "Krom"),
    RepoSpec::recursive("armory3d/Kha", "Kha"),
    RepoSpec::new("armory3d/nodejs_bin", "nodejs"),
];

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn git_url_joins_host_and_remote() {
        let spec = RepoSpec::new("armory3d/iron", "iron");
        assert_eq!(
            spec.to_git_url("https://github.com/"),
            "https://github.com/armory3d/iron"
        );
        assert_eq!(
            spec.to_git_url("https://example.org/git"),
            "https://example.org/git/armory3d/iron"
        );
    }

    #[test]
    fn git_url_drops_trailing_slash_of_remote() {
        let spec = RepoSpec::new("armory3d/nodejs_bin/", "nodejs");
        assert_eq!(
            spec.to_git_url("https://github.com/"),
            "https://github.com/armory3d/nodejs_bin"
        );
    }

    #[test]
    fn armory_repositories() {
        assert_eq!(ARMORY_REPOSITORIES.len(), 9);
        let recursive: Vec<_> = ARMORY_REPOSITORIES
            .iter()
            .filter(|spec| spec.recursive)
            .map(|spec| spec.local_path)
            .collect();
        assert_eq!(recursive, vec!["Kha"]);
        assert_eq!(ARMORY_REPOSITORIES[0].local_path, "armory");
    }
}
