//! Resolves a repository location to a [`PygrackEngine`], trying the
//! location itself and then its `.git` subdirectory, the same two
//! candidates `GitHandler.__call__` tries before giving up with a 404.

use std::path::{Path, PathBuf};

use vcsgate_core::Extras;
use vcsgate_pygrack::{PygrackError, PygrackEngine};

pub struct GitHandler {
    repo_location: PathBuf,
    repo_name: String,
    git_path: String,
    update_server_info: bool,
}

impl GitHandler {
    pub fn new(
        repo_location: impl Into<PathBuf>,
        repo_name: impl Into<String>,
        git_path: impl Into<String>,
        update_server_info: bool,
    ) -> Result<Self, PygrackError> {
        let repo_location = repo_location.into();
        if !repo_location.is_dir() {
            return Err(PygrackError::NotAGitRepository(
                repo_location.display().to_string(),
            ));
        }

        Ok(Self {
            repo_location,
            repo_name: repo_name.into(),
            git_path: git_path.into(),
            update_server_info,
        })
    }

    /// Builds the engine against whichever of `repo_location` and
    /// `repo_location/.git` actually looks like a Git directory.
    pub fn resolve(&self, extras: Extras) -> Result<PygrackEngine, PygrackError> {
        let candidates: [PathBuf; 2] = [
            self.repo_location.clone(),
            self.repo_location.join(".git"),
        ];

        let mut last_err = None;
        for content_path in candidates {
            match PygrackEngine::new(
                self.repo_name.clone(),
                content_path,
                self.git_path.clone(),
                self.update_server_info,
                extras.clone(),
            ) {
                Ok(engine) => return Ok(engine),
                Err(e) => last_err = Some(e),
            }
        }

        Err(last_err.unwrap_or_else(|| {
            PygrackError::NotAGitRepository(self.repo_location.display().to_string())
        }))
    }

    pub fn repo_location(&self) -> &Path {
        &self.repo_location
    }
}
