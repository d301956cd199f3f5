//! `check_url`: validates that `url` is a reachable Subversion source,
//! reproducing the original's `hgsubversion`-based UUID probe with an
//! `svn info` round trip (no `hgsubversion` binding exists to call from
//! Rust, and `svn info` fails exactly the same way against a non-SVN or
//! unreachable URL).

use vcsgate_core::{ErrorKind, VcsError, VcsResult};

use crate::cli::SvnCli;

pub async fn check_url(cli: &SvnCli, url: &str) -> VcsResult<bool> {
    cli.svn(&[
        "info".to_string(),
        "--non-interactive".to_string(),
        url.to_string(),
    ])
    .await
    .map(|_| true)
    .map_err(|_| {
        VcsError::new(
            ErrorKind::UrlError,
            format!("\"{url}\" is not a valid Subversion source url."),
        )
    })
}
