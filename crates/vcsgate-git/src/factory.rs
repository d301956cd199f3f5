//! `GitFactory`: opens (or creates) a `git2::Repository` for a [`Wire`],
//! reusing the shared context cache.

use std::sync::Arc;

use vcsgate_context_cache::{CacheSizing, RepoFactory};
use vcsgate_core::{ErrorKind, VcsError, VcsResult, Wire};

use crate::error::kind_for;
use crate::handle::GitRepoHandle;

pub struct GitFactory {
    factory: RepoFactory<GitRepoHandle>,
}

impl GitFactory {
    pub fn new(sizing: CacheSizing) -> Self {
        Self {
            factory: RepoFactory::new("git", sizing),
        }
    }

    pub async fn repo(&self, wire: &Wire) -> VcsResult<Arc<GitRepoHandle>> {
        self.repo_impl(wire, false).await
    }

    pub async fn repo_create(&self, wire: &Wire, bare: bool) -> VcsResult<Arc<GitRepoHandle>> {
        self.repo_impl_create(wire, bare).await
    }

    async fn repo_impl(&self, wire: &Wire, _create: bool) -> VcsResult<Arc<GitRepoHandle>> {
        let path = wire.path.clone();
        self.factory
            .repo(wire, || async move {
                git2::Repository::open(&path).map(GitRepoHandle::new)
            })
            .await
            .map_err(|e| to_vcs_error(&e))
    }

    async fn repo_impl_create(&self, wire: &Wire, bare: bool) -> VcsResult<Arc<GitRepoHandle>> {
        let path = wire.path.clone();
        self.factory
            .repo(wire, || async move {
                if bare {
                    git2::Repository::init_bare(&path).map(GitRepoHandle::new)
                } else {
                    git2::Repository::init(&path).map(GitRepoHandle::new)
                }
            })
            .await
            .map_err(|e| to_vcs_error(&e))
    }
}

fn to_vcs_error(e: &Arc<git2::Error>) -> VcsError {
    let kind = kind_for(e);
    let err = VcsError::new(kind, e.to_string());
    err.log();
    err
}

/// Alternate constructor error path used by `init`/`init_bare`, which
/// (unlike every other method) are not routed through the context cache at
/// all in the original: each call opens a throwaway repo object.
pub fn open_fresh(wire: &Wire) -> VcsResult<git2::Repository> {
    git2::Repository::open(&wire.path).map_err(|e| {
        let err = VcsError::with_source(kind_for(&e), e.message().to_string(), e);
        err.log();
        err
    })
}

pub fn init_fresh(wire: &Wire, bare: bool) -> VcsResult<git2::Repository> {
    let result = if bare {
        git2::Repository::init_bare(&wire.path)
    } else {
        git2::Repository::init(&wire.path)
    };
    result.map_err(|e| {
        let err = VcsError::with_source(ErrorKind::Error, e.message().to_string(), e);
        err.log();
        err
    })
}
