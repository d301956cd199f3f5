//! `commit`: opens a transaction with `svnmucc`, a batch Subversion client
//! that commits a sequence of tree operations atomically without needing an
//! on-disk working copy — the CLI stand-in for the original's
//! `fs.Transaction`/`txn_root` API (`mkdir -p`, `put`/`rm`, then a single
//! commit with the message and an `svn:date` revprop stamp).

use chrono::Utc;
use vcsgate_core::{ErrorKind, VcsError, VcsResult};

use crate::cli::SvnCli;
use crate::handle::SvnRepoHandle;
use crate::nodes;

#[derive(serde::Deserialize)]
pub struct FileUpdate {
    pub path: String,
    #[serde(with = "vcsgate_core::serde_b64")]
    pub content: Vec<u8>,
}

/// Mirrors the original's `commit` signature: a message, author, and two
/// change lists. Returns the new revision number.
pub async fn commit(
    cli: &SvnCli,
    handle: &SvnRepoHandle,
    message: &str,
    author: &str,
    updated: &[FileUpdate],
    removed: &[String],
) -> VcsResult<i64> {
    if updated.is_empty() && removed.is_empty() {
        return Err(VcsError::new(ErrorKind::Error, "commit has no changes"));
    }

    let repo_url = format!("file://{}", handle.path.to_string_lossy());
    let mut args = vec![
        "-U".to_string(),
        repo_url,
        "-m".to_string(),
        message.to_string(),
    ];

    for update in updated {
        ensure_parent_dirs(cli, handle, &update.path, &mut args).await?;
        args.push("put".to_string());
        args.push(write_tmp(&update.content)?);
        args.push(update.path.clone());
    }

    for path in removed {
        args.push("rm".to_string());
        args.push(path.clone());
    }

    let out = cli.svnmucc(&args).await?;
    let new_rev = parse_committed_revision(&out)?;

    let date_file = write_tmp(now_iso8601().as_bytes())?;
    cli.svnadmin(&[
        "setrevprop".to_string(),
        handle.path.to_string_lossy().into_owned(),
        "-r".to_string(),
        new_rev.to_string(),
        "svn:date".to_string(),
        date_file,
    ])
    .await?;

    let author_file = write_tmp(author.as_bytes())?;
    cli.svnadmin(&[
        "setrevprop".to_string(),
        handle.path.to_string_lossy().into_owned(),
        "-r".to_string(),
        new_rev.to_string(),
        "svn:author".to_string(),
        author_file,
    ])
    .await?;

    Ok(new_rev)
}

/// `svnmucc` requires every intermediate directory on a new path to exist
/// before `put` can create the leaf file; unlike a transaction root's
/// `make_dir` calls in the original, each missing ancestor needs its own
/// `mkdir` operation appended up front.
async fn ensure_parent_dirs(
    cli: &SvnCli,
    handle: &SvnRepoHandle,
    path: &str,
    args: &mut Vec<String>,
) -> VcsResult<()> {
    let trimmed = path.trim_start_matches('/');
    let Some((parent, _)) = trimmed.rsplit_once('/') else {
        return Ok(());
    };

    let mut prefix = String::new();
    for segment in parent.split('/') {
        if prefix.is_empty() {
            prefix = segment.to_string();
        } else {
            prefix = format!("{prefix}/{segment}");
        }

        if nodes::get_node_type(cli, handle, &prefix, None).await?.is_none() {
            args.push("mkdir".to_string());
            args.push(prefix.clone());
        }
    }
    Ok(())
}

fn write_tmp(content: &[u8]) -> VcsResult<String> {
    let mut path = std::env::temp_dir();
    path.push(format!("vcsgate-svn-commit-{}", uuid::Uuid::new_v4()));
    std::fs::write(&path, content)
        .map_err(|e| VcsError::with_source(ErrorKind::Error, e.to_string(), e))?;
    Ok(path.to_string_lossy().into_owned())
}

fn parse_committed_revision(out: &[u8]) -> VcsResult<i64> {
    let text = crate::cli::to_text(out);
    text.lines()
        .rev()
        .find_map(|line| {
            let line = line.trim();
            line.strip_prefix("r").and_then(|rest| rest.parse::<i64>().ok())
        })
        .ok_or_else(|| VcsError::new(ErrorKind::Error, format!("could not parse committed revision from: {text}")))
}

/// `svn:date` stamping uses the commit time the caller supplied; when absent
/// the repository's own commit time (set by `svnmucc` itself) is left as-is.
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339()
}
