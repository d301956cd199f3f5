//! `node_history`/`file_annotate`. `svnlook history` walks copy history the
//! same way `svn.fs.node_history`/`history_prev` do; `svn blame` replaces
//! the original's `svn.client.blame2` callback-based API.

use regex::Regex;
use vcsgate_core::{ErrorKind, VcsError, VcsResult};

use crate::cli::{self, SvnCli};
use crate::handle::SvnRepoHandle;

/// Returns `(revision, path)` pairs, most recent first, matching the
/// original's `history_revisions` accumulation order.
pub async fn node_history(
    cli: &SvnCli,
    handle: &SvnRepoHandle,
    path: &str,
    revision: i64,
    limit: Option<usize>,
) -> VcsResult<Vec<(i64, String)>> {
    let out = cli
        .svnlook(
            &handle.path,
            &["history".to_string(), "-r".to_string(), revision.to_string(), path.to_string()],
        )
        .await?;

    let mut result = Vec::new();
    for line in cli::lines(&out) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("REVISION") || trimmed.starts_with("---") {
            continue;
        }
        let mut parts = trimmed.splitn(2, char::is_whitespace);
        let Some(rev_str) = parts.next() else { continue };
        let Ok(rev) = rev_str.parse::<i64>() else { continue };
        let node_path = parts.next().unwrap_or(path).trim().to_string();
        result.push((rev, node_path));
        if let Some(limit) = limit {
            if result.len() >= limit {
                break;
            }
        }
    }
    // svnlook history prints oldest-first; the original returns newest-first.
    result.reverse();
    Ok(result)
}

#[derive(Debug, Clone)]
pub struct AnnotateLine {
    pub line_no: usize,
    pub revision: i64,
    pub line: String,
}

fn blame_line_re() -> Regex {
    Regex::new(r"^\s*(\d+)\s+\S+\s(.*)$").expect("static blame regex")
}

pub async fn file_annotate(
    cli: &SvnCli,
    handle: &SvnRepoHandle,
    path: &str,
    revision: i64,
) -> VcsResult<Vec<AnnotateLine>> {
    let abs_path = handle.path.join(path.trim_start_matches('/'));
    let file_uri = format!("file://{}@{revision}", abs_path.to_string_lossy());

    let out = cli
        .svn(&[
            "blame".to_string(),
            "-r".to_string(),
            format!("0:{revision}"),
            file_uri,
        ])
        .await
        .map_err(|e| {
            VcsError::with_source(
                ErrorKind::Error,
                format!("Blame not supported or file does not exist at path {path}: {e}"),
                e,
            )
        })?;

    let re = blame_line_re();
    let mut result = Vec::new();
    for (line_no, line) in cli::lines(&out).into_iter().enumerate() {
        let Some(caps) = re.captures(&line) else { continue };
        let revision = caps[1].parse().unwrap_or(0);
        result.push(AnnotateLine {
            line_no: line_no + 1,
            revision,
            line: caps[2].to_string(),
        });
    }
    Ok(result)
}
