//! `check_url`: probes a remote URL the same way a real Mercurial client's
//! initial handshake would, then confirms it is actually an hg repository.
//!
//! The original's second check drives `httppeer(...).lookup('tip')`
//! in-process; with no Mercurial library binding available, this instead
//! shells out to `hg identify <url>`, a deliberate process-based substitute
//! for the same "is this really an hg server" probe.

use vcsgate_core::{ErrorKind, VcsError, VcsResult};
use vcsgate_subprocio::{SpawnParams, SubprocIo};

use crate::cli::HgCli;

fn strip_scheme_prefix(url: &str) -> (Option<String>, String) {
    if let Some(scheme_end) = url.find("://") {
        if let Some(plus) = url[..scheme_end].find('+') {
            let proto = url[..plus].to_string();
            return (Some(proto), url[plus + 1..].to_string());
        }
    }
    (None, url.to_string())
}

pub async fn check_url(cli: &HgCli, url: &str) -> VcsResult<bool> {
    let (proto, url) = strip_scheme_prefix(url);

    let client = reqwest::blocking::Client::new();
    let pairs = format!("{}-{}", "0".repeat(40), "0".repeat(40));
    let probe = client
        .get(&url)
        .query(&[("cmd", "between"), ("pairs", pairs.as_str())])
        .header("Content-Type", "application/mercurial-0.1")
        .header("Accept", "application/mercurial-0.1")
        .send();

    match probe {
        Ok(resp) if resp.status().is_success() => {}
        Ok(resp) => {
            return Err(VcsError::new(
                ErrorKind::UrlError,
                format!("[{url}] org_exc: status {}", resp.status()),
            ))
        }
        Err(e) => {
            return Err(VcsError::new(ErrorKind::UrlError, format!("[{url}] org_exc: {e}")));
        }
    }

    if proto.as_deref() == Some("svn") {
        return Ok(true);
    }

    let argv = vec![cli.hg_path.clone(), "identify".to_string(), "--id".to_string(), url.clone()];
    let subproc = SubprocIo::spawn(SpawnParams::new(argv).fail_on_stderr(false))
        .map_err(|e| VcsError::new(ErrorKind::UrlError, format!("[{url}] org_exc: {e}")))?;

    subproc
        .wait_collect()
        .await
        .map(|_| true)
        .map_err(|e| VcsError::new(ErrorKind::UrlError, format!("url [{url}] does not look like an hg repo org_exc: {e}")))
}
