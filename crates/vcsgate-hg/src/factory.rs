//! `HgFactory`: validates (or creates) a repository path for a [`Wire`] and
//! hands back a cached [`HgRepoHandle`].

use std::sync::Arc;

use vcsgate_context_cache::{CacheSizing, RepoFactory};
use vcsgate_core::{ErrorKind, VcsError, VcsResult, Wire};

use crate::cli::HgCli;
use crate::handle::HgRepoHandle;

pub struct HgFactory {
    factory: RepoFactory<HgRepoHandle>,
    cli: HgCli,
}

impl HgFactory {
    pub fn new(sizing: CacheSizing, cli: HgCli) -> Self {
        Self {
            factory: RepoFactory::new("hg", sizing),
            cli,
        }
    }

    pub fn cli(&self) -> &HgCli {
        &self.cli
    }

    pub async fn repo(&self, wire: &Wire) -> VcsResult<Arc<HgRepoHandle>> {
        let path = wire.path.clone();
        let config = wire.config.clone();

        self.factory
            .repo(wire, || async move {
                if !path.is_dir() {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("{path:?} is not a directory"),
                    ));
                }
                Ok(HgRepoHandle::new(path, config))
            })
            .await
            .map_err(|e| {
                let err = VcsError::with_source(ErrorKind::Lookup, e.to_string(), e);
                err.log();
                err
            })
    }

    /// Validates or creates a repository path without going through the
    /// cache, mirroring `localrepository(wire, create=True)`.
    pub async fn repo_create(&self, wire: &Wire, create: bool) -> VcsResult<HgRepoHandle> {
        if create {
            self.cli.init(&wire.path).await?;
        } else if !wire.path.is_dir() {
            return Err(VcsError::new(
                ErrorKind::Lookup,
                format!("{:?} is not a directory", wire.path),
            ));
        }
        Ok(HgRepoHandle::new(wire.path.clone(), wire.config.clone()))
    }
}
