//! Every Subversion operation is a one-shot CLI invocation against a path,
//! so the cached handle carries nothing beyond the repository path itself.
//! It exists so Subversion participates in the same per-region context
//! cache as the Git and Mercurial adapters.

use std::path::PathBuf;

use vcsgate_core::RepoHandle;

pub struct SvnRepoHandle {
    pub path: PathBuf,
}

impl SvnRepoHandle {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl RepoHandle for SvnRepoHandle {
    fn region(&self) -> &'static str {
        "svn"
    }
}
