//! The cached Mercurial repository handle.
//!
//! Unlike `vcsgate-git`'s handle, there is no long-lived library object to
//! hold open: every operation shells out to a fresh `hg` invocation. The
//! handle still exists so the adapter participates in the same
//! `RepoFactory`/context-cache machinery as Git and Subversion (one region
//! per backend, as required by the cache's shared shape); what it caches is
//! the validated repository path plus the per-wire config entries that
//! `make_ui_from_config` would have applied, so repeated calls against the
//! same context don't re-validate the path every time.

use std::path::PathBuf;

use vcsgate_core::{ConfigEntry, RepoHandle};

pub struct HgRepoHandle {
    pub path: PathBuf,
    pub config: Vec<ConfigEntry>,
}

impl HgRepoHandle {
    pub fn new(path: PathBuf, config: Vec<ConfigEntry>) -> Self {
        Self { path, config }
    }
}

impl RepoHandle for HgRepoHandle {
    fn region(&self) -> &'static str {
        "hg"
    }
}
