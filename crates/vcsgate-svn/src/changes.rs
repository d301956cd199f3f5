//! `revision_changes`: `svnlook changed -r REV PATH`, parsing the
//! `<status-code>   <path>` lines it prints. Directory entries (trailing
//! `/`) are dropped, matching the original's `ChangeCollector` skipping
//! `svn_node_dir` changes.

use serde::Serialize;
use vcsgate_core::VcsResult;

use crate::cli::{self, SvnCli};
use crate::handle::SvnRepoHandle;

#[derive(Debug, Default, Serialize)]
pub struct RevisionChanges {
    pub added: Vec<String>,
    pub changed: Vec<String>,
    pub removed: Vec<String>,
}

pub async fn revision_changes(cli: &SvnCli, handle: &SvnRepoHandle, revision: i64) -> VcsResult<RevisionChanges> {
    let out = cli
        .svnlook(&handle.path, &["changed".to_string(), "-r".to_string(), revision.to_string()])
        .await?;

    let mut result = RevisionChanges::default();
    for line in cli::lines(&out) {
        let (code, path) = match line.split_once(|c: char| c.is_whitespace()) {
            Some((code, rest)) => (code, rest.trim_start()),
            None => continue,
        };
        if path.ends_with('/') {
            continue;
        }
        match code.chars().next() {
            Some('A') => result.added.push(path.to_string()),
            Some('D') => result.removed.push(path.to_string()),
            Some('U') | Some('_') | Some('M') => result.changed.push(path.to_string()),
            _ => result.changed.push(path.to_string()),
        }
    }
    Ok(result)
}
