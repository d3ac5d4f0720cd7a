use std::path::Path;

use git2::Repository;
use log::trace;

/// Short id of the commit checked out at `path`, if it is a readable
/// repository.
pub fn head_commit(path: &Path) -> Option<String> {
    match read_head(path) {
        Ok(oid) => {
            let mut id = oid.to_string();
            id.truncate(7);
            Some(id)
        }
        Err(error) => {
            trace!("Could not read HEAD of {}: {}", path.display(), error);
            None
        }
    }
}

fn read_head(path: &Path) -> Result<git2::Oid, git2::Error> {
    let repo = Repository::open(path)?;
    let head = repo.head()?;
    let commit = head.peel_to_commit()?;
    Ok(commit.id())
}
