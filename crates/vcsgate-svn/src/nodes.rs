//! `get_node_type`/`get_nodes`/`get_file_content`/`get_file_size`: reads
//! against a single revision root, reproduced with `svnlook tree` (listing),
//! `svnlook cat` (content) and `svnlook filesize`.

use vcsgate_core::{ErrorKind, VcsError, VcsResult};

use crate::cli::{self, SvnCli};
use crate::handle::SvnRepoHandle;
use crate::lookup;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    File,
    Dir,
}

async fn revision_or_youngest(cli: &SvnCli, handle: &SvnRepoHandle, revision: Option<i64>) -> VcsResult<i64> {
    match revision {
        Some(rev) => Ok(rev),
        None => lookup::youngest(cli, handle).await,
    }
}

pub async fn get_node_type(
    cli: &SvnCli,
    handle: &SvnRepoHandle,
    path: &str,
    revision: Option<i64>,
) -> VcsResult<Option<NodeType>> {
    let rev = revision_or_youngest(cli, handle, revision).await?;
    let (parent, leaf) = split_parent(path);

    let out = cli
        .svnlook(
            &handle.path,
            &["tree".to_string(), "--full-paths".to_string(), "-N".to_string(), "-r".to_string(), rev.to_string(), parent.to_string()],
        )
        .await;

    let out = match out {
        Ok(out) => out,
        Err(_) => return Ok(None),
    };

    for entry in cli::lines(&out) {
        let entry = entry.trim();
        let is_dir = entry.ends_with('/');
        let name = entry.trim_end_matches('/');
        if name == path.trim_start_matches('/') || name == leaf {
            return Ok(Some(if is_dir { NodeType::Dir } else { NodeType::File }));
        }
    }
    Ok(None)
}

fn split_parent(path: &str) -> (&str, &str) {
    let trimmed = path.trim_start_matches('/');
    match trimmed.rsplit_once('/') {
        Some((parent, leaf)) => (parent, leaf),
        None => ("", trimmed),
    }
}

pub async fn get_nodes(
    cli: &SvnCli,
    handle: &SvnRepoHandle,
    path: &str,
    revision: Option<i64>,
) -> VcsResult<Vec<(String, NodeType)>> {
    let rev = revision_or_youngest(cli, handle, revision).await?;

    let out = cli
        .svnlook(
            &handle.path,
            &["tree".to_string(), "--full-paths".to_string(), "-N".to_string(), "-r".to_string(), rev.to_string(), path.to_string()],
        )
        .await?;

    let mut result = Vec::new();
    let base = path.trim_start_matches('/').trim_end_matches('/');
    for entry in cli::lines(&out) {
        let entry = entry.trim();
        let is_dir = entry.ends_with('/');
        let name = entry.trim_end_matches('/');
        if name == base {
            continue;
        }
        result.push((name.to_string(), if is_dir { NodeType::Dir } else { NodeType::File }));
    }
    Ok(result)
}

pub async fn get_file_content(
    cli: &SvnCli,
    handle: &SvnRepoHandle,
    path: &str,
    revision: Option<i64>,
) -> VcsResult<Vec<u8>> {
    let rev = revision_or_youngest(cli, handle, revision).await?;
    cli.svnlook(&handle.path, &["cat".to_string(), "-r".to_string(), rev.to_string(), path.to_string()])
        .await
}

pub async fn get_file_size(
    cli: &SvnCli,
    handle: &SvnRepoHandle,
    path: &str,
    revision: Option<i64>,
) -> VcsResult<u64> {
    let rev = revision_or_youngest(cli, handle, revision).await?;
    let out = cli
        .svnlook(&handle.path, &["filesize".to_string(), "-r".to_string(), rev.to_string(), path.to_string()])
        .await?;
    cli::to_text(&out)
        .parse()
        .map_err(|e| VcsError::new(ErrorKind::Error, format!("unparsable file size: {e}")))
}
