//! `diff(rev1, rev2, path1?, path2?, ignore_whitespace, context)`: reads
//! both revisions of a file with `svnlook cat` and hands the two texts to
//! [`vcsgate_svn_diff::unified_diff_text`] rather than shelling out to
//! `svn diff`, so ignore-whitespace semantics match the shared differ used
//! for every backend instead of the native client's own flag behavior.

use vcsgate_svn_diff::{unified_diff_text, DiffOptions};

use vcsgate_core::VcsResult;

use crate::cli::SvnCli;
use crate::handle::SvnRepoHandle;
use crate::nodes;

pub async fn diff(
    cli: &SvnCli,
    handle: &SvnRepoHandle,
    rev1: i64,
    rev2: i64,
    path1: &str,
    path2: Option<&str>,
    ignore_whitespace: bool,
    context: usize,
) -> VcsResult<String> {
    let path2 = path2.unwrap_or(path1);

    let old = read_or_empty(cli, handle, path1, rev1).await?;
    let new = read_or_empty(cli, handle, path2, rev2).await?;

    let opts = DiffOptions {
        ignore_blank_lines: false,
        ignore_case: false,
        ignore_space_changes: ignore_whitespace,
        context,
    };

    Ok(unified_diff_text(
        &String::from_utf8_lossy(&old),
        &String::from_utf8_lossy(&new),
        &opts,
    ))
}

async fn read_or_empty(
    cli: &SvnCli,
    handle: &SvnRepoHandle,
    path: &str,
    revision: i64,
) -> VcsResult<Vec<u8>> {
    match nodes::get_node_type(cli, handle, path, Some(revision)).await? {
        Some(nodes::NodeType::File) => nodes::get_file_content(cli, handle, path, Some(revision)).await,
        _ => Ok(Vec::new()),
    }
}
