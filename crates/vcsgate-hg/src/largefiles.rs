//! Largefiles extension helpers: `is_large_file`, `in_store`,
//! `in_user_cache`, `store_path`, `link`. These mirror `hgext.largefiles
//! .lfutil`'s path conventions directly rather than shelling out, since
//! they are pure path arithmetic plus filesystem existence checks.

use std::path::{Path, PathBuf};

use vcsgate_core::{ErrorKind, VcsError, VcsResult};

use crate::config::get_config_value;
use crate::handle::HgRepoHandle;
use crate::HgFactory;

const STANDIN_DIR: &str = ".hglf";
const DEFAULT_USERCACHE: &str = ".cache/largefiles";

/// A path is a largefiles "standin" if it lives under the `.hglf/`
/// directory, matching `lfutil.isstandin`'s prefix check.
pub fn is_large_file(path: &str) -> bool {
    path.starts_with(&format!("{STANDIN_DIR}/")) || path == STANDIN_DIR
}

pub fn store_path(handle: &HgRepoHandle, sha: &str) -> PathBuf {
    handle.path.join(".hg").join("largefiles").join(sha)
}

pub fn in_store(handle: &HgRepoHandle, sha: &str) -> VcsResult<bool> {
    Ok(store_path(handle, sha).is_file())
}

async fn usercache_dir(factory: &HgFactory, handle: &HgRepoHandle) -> VcsResult<PathBuf> {
    if let Some(configured) = get_config_value(factory, handle, "largefiles", "usercache").await? {
        return Ok(PathBuf::from(configured));
    }
    let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    Ok(home.join(DEFAULT_USERCACHE))
}

pub async fn in_user_cache(factory: &HgFactory, handle: &HgRepoHandle, sha: &str) -> VcsResult<bool> {
    let dir = usercache_dir(factory, handle).await?;
    Ok(dir.join(sha).is_file())
}

/// Hardlinks the user-cache copy of `sha` to `path`, matching
/// `lfutil.link`'s use of `util.oslink` (falling back to a copy when the
/// filesystem doesn't support hard links, same as the original's
/// `util.copyfile` fallback inside `oslink`).
pub async fn link(factory: &HgFactory, handle: &HgRepoHandle, sha: &str, path: &Path) -> VcsResult<()> {
    let dir = usercache_dir(factory, handle).await?;
    let source = dir.join(sha);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    match std::fs::hard_link(&source, path) {
        Ok(()) => Ok(()),
        Err(_) => std::fs::copy(&source, path).map(|_| ()).map_err(io_err),
    }
}

fn io_err(e: std::io::Error) -> VcsError {
    let err = VcsError::with_source(ErrorKind::Error, e.to_string(), e);
    err.log();
    err
}
