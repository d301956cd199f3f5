//! `lookup`/`lookup_interval`/`is_path_valid_repository`: revision-number
//! resolution. `svnlook` has no direct `svn.repos.dated_revision`
//! equivalent, so the timestamp-to-revision mapping is done with a binary
//! search over `svnlook date`, which is monotonic in revision number.

use chrono::{DateTime, FixedOffset};
use vcsgate_core::{ErrorKind, VcsError, VcsResult};

use crate::cli::{self, SvnCli};
use crate::handle::SvnRepoHandle;

pub async fn youngest(cli: &SvnCli, handle: &SvnRepoHandle) -> VcsResult<i64> {
    let out = cli.svnlook(&handle.path, &["youngest".to_string()]).await?;
    cli::to_text(&out)
        .parse()
        .map_err(|e| VcsError::new(ErrorKind::Error, format!("unparsable youngest revision: {e}")))
}

/// `revision` is `None` (or `-1`/`"HEAD"` on the wire) for the youngest
/// revision; anything else is rejected the same way the original raises
/// `NotImplementedError` for non-head lookups.
pub async fn lookup(cli: &SvnCli, handle: &SvnRepoHandle, revision: Option<i64>) -> VcsResult<i64> {
    match revision {
        None | Some(-1) => youngest(cli, handle).await,
        Some(_) => Err(VcsError::new(
            ErrorKind::Unhandled,
            "lookup only supports the youngest/HEAD revision",
        )),
    }
}

async fn date_at(cli: &SvnCli, handle: &SvnRepoHandle, rev: i64) -> VcsResult<DateTime<FixedOffset>> {
    let out = cli
        .svnlook(&handle.path, &["date".to_string(), "-r".to_string(), rev.to_string()])
        .await?;
    let text = cli::to_text(&out);
    let head = text.split(" (").next().unwrap_or(&text).trim();
    DateTime::parse_from_str(head, "%Y-%m-%d %H:%M:%S %z")
        .map_err(|e| VcsError::new(ErrorKind::Error, format!("unparsable svnlook date {text:?}: {e}")))
}

/// Mirrors `svn_repos_dated_rev`: the youngest revision whose commit time is
/// `<= ts`, searching in `[0, youngest]` (revision 0 always qualifies).
async fn dated_revision(cli: &SvnCli, handle: &SvnRepoHandle, ts: DateTime<FixedOffset>) -> VcsResult<i64> {
    let mut lo = 0i64;
    let mut hi = youngest(cli, handle).await?;
    let mut result = 0i64;
    while lo <= hi {
        let mid = lo + (hi - lo) / 2;
        if mid == 0 {
            result = 0;
            lo = mid + 1;
            continue;
        }
        let mid_ts = date_at(cli, handle, mid).await?;
        if mid_ts <= ts {
            result = mid;
            lo = mid + 1;
        } else {
            hi = mid - 1;
        }
    }
    Ok(result)
}

pub async fn lookup_interval(
    cli: &SvnCli,
    handle: &SvnRepoHandle,
    start_ts: Option<DateTime<FixedOffset>>,
    end_ts: Option<DateTime<FixedOffset>>,
) -> VcsResult<(i64, i64)> {
    let start_rev = match start_ts {
        Some(ts) => dated_revision(cli, handle, ts).await? + 1,
        None => 1,
    };
    let end_rev = match end_ts {
        Some(ts) => dated_revision(cli, handle, ts).await?,
        None => youngest(cli, handle).await?,
    };
    Ok((start_rev, end_rev))
}
