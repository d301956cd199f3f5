//! `SvnFactory`: validates (or creates) a repository path for a [`Wire`] and
//! hands back a cached [`SvnRepoHandle`].

use std::sync::Arc;

use vcsgate_context_cache::{CacheSizing, RepoFactory};
use vcsgate_core::{ErrorKind, VcsError, VcsResult, Wire};

use crate::cli::SvnCli;
use crate::handle::SvnRepoHandle;

/// Compare with `subversion/svnadmin/svnadmin.c`'s `--compatible-version`
/// flag values, quoted the way the original's `svn_compatible_versions` set
/// names them.
const SVN_COMPATIBLE_VERSIONS: &[(&str, &str)] = &[
    ("pre-1.4-compatible", "1.3"),
    ("pre-1.5-compatible", "1.4"),
    ("pre-1.6-compatible", "1.5"),
    ("pre-1.8-compatible", "1.7"),
];

pub struct SvnFactory {
    factory: RepoFactory<SvnRepoHandle>,
    cli: SvnCli,
}

impl SvnFactory {
    pub fn new(sizing: CacheSizing, cli: SvnCli) -> Self {
        Self {
            factory: RepoFactory::new("svn", sizing),
            cli,
        }
    }

    pub fn cli(&self) -> &SvnCli {
        &self.cli
    }

    pub async fn repo(&self, wire: &Wire) -> VcsResult<Arc<SvnRepoHandle>> {
        let path = wire.path.clone();

        self.factory
            .repo(wire, || async move {
                if !path.is_dir() {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("{path:?} is not a directory"),
                    ));
                }
                Ok(SvnRepoHandle::new(path))
            })
            .await
            .map_err(|e| {
                let err = VcsError::with_source(ErrorKind::Lookup, e.to_string(), e);
                err.log();
                err
            })
    }

    /// `create_repository`: maps the original's `fs_config` compatibility
    /// flag names to the `svnadmin create --compatible-version=X` CLI flag.
    pub async fn create_repository(&self, wire: &Wire, compatible_version: Option<&str>) -> VcsResult<()> {
        log::info!("Creating Subversion repository in path {:?}", wire.path);

        let mut args = vec!["create".to_string()];
        if let Some(name) = compatible_version {
            let version = SVN_COMPATIBLE_VERSIONS
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, version)| *version)
                .ok_or_else(|| {
                    VcsError::new(ErrorKind::Error, format!("Unknown SVN compatible version {name:?}"))
                })?;
            args.push(format!("--compatible-version={version}"));
        }
        args.push(wire.path.to_string_lossy().into_owned());

        self.cli.svnadmin(&args).await?;
        Ok(())
    }

    pub async fn is_path_valid_repository(&self, path: &std::path::Path) -> bool {
        self.cli
            .svnlook(path, &["uuid".to_string()])
            .await
            .is_ok()
    }
}
