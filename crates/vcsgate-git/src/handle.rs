//! The cached Git repository handle.
//!
//! `git2::Repository` is `Send` but not `Sync`; the context cache shares one
//! handle across concurrent callers via `Arc`, so every access goes through
//! an internal mutex. The spec's "close all OS file descriptors on release"
//! invariant (mirroring dulwich's pack-index leak workaround) is satisfied
//! here simply by dropping the `git2::Repository`, which closes its odb and
//! pack files in its own destructor.

use std::sync::Mutex;

use vcsgate_core::RepoHandle;

pub struct GitRepoHandle {
    repo: Mutex<git2::Repository>,
}

impl GitRepoHandle {
    pub fn new(repo: git2::Repository) -> Self {
        Self {
            repo: Mutex::new(repo),
        }
    }

    pub fn with_repo<T>(&self, f: impl FnOnce(&git2::Repository) -> T) -> T {
        let repo = self.repo.lock().expect("git repo mutex poisoned");
        f(&repo)
    }
}

impl RepoHandle for GitRepoHandle {
    fn region(&self) -> &'static str {
        "git"
    }
}
