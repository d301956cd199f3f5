//! `import_remote_repository(src_url)`: pipes `svnrdump dump` straight into
//! `svnadmin load`, the same two-process pipeline as the original's
//! `subprocess.Popen(rdump, stdout=PIPE)` / `Popen(load, stdin=rdump.stdout)`
//! pair, reimplemented over [`SubprocIo`] so the dump's stdout feeds the
//! load's stdin without ever buffering the whole dump file in memory.
//!
//! **Open question, resolved** (see `DESIGN.md`): `svnrdump`'s stderr is
//! scanned for a fixed set of substrings to classify the failure. The
//! pattern table is centralized here as [`classify_rdump_error`] rather
//! than inlined, so future status codes stay in one place.

use futures::StreamExt;
use vcsgate_core::{ErrorKind, VcsError, VcsResult};
use vcsgate_subprocio::{SpawnParams, SubprocIo};

use crate::cli::SvnCli;
use crate::factory::SvnFactory;
use crate::handle::SvnRepoHandle;

/// Stable classification of `svnrdump`'s failure reasons, matched against
/// substrings of its stderr output. Unrecognized failures classify as
/// `"UNKNOWN"`, matching the original's fallback.
pub fn classify_rdump_error(stderr: &str) -> &'static str {
    const PATTERNS: &[(&str, &str)] = &[("svnrdump: E230001:", "INVALID_CERTIFICATE")];

    PATTERNS
        .iter()
        .find(|(needle, _)| stderr.contains(needle))
        .map(|(_, reason)| *reason)
        .unwrap_or("UNKNOWN")
}

pub async fn import_remote_repository(
    cli: &SvnCli,
    factory: &SvnFactory,
    handle: &SvnRepoHandle,
    src_url: &str,
) -> VcsResult<()> {
    if !factory.is_path_valid_repository(&handle.path).await {
        return Err(VcsError::new(
            ErrorKind::Error,
            format!("Path {:?} is not a valid Subversion repository.", handle.path),
        ));
    }

    let dump = SubprocIo::spawn(
        SpawnParams::new(vec![
            cli.svnrdump_path.clone(),
            "dump".to_string(),
            "--non-interactive".to_string(),
            src_url.to_string(),
        ])
        .fail_on_stderr(false)
        .fail_on_return_code(false),
    )
    .map_err(|e| VcsError::with_source(ErrorKind::Error, e.to_string(), e))?;

    let stderr_handle = dump.stderr_handle();
    let dump_stream = dump.stdout_chunks();
    let piped_input: vcsgate_subprocio::ByteStream = Box::pin(dump_stream.map(|chunk| {
        chunk.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
    }));

    let load = SubprocIo::spawn(
        SpawnParams::new(vec![
            cli.svnadmin_path.clone(),
            "load".to_string(),
            handle.path.to_string_lossy().into_owned(),
        ])
        .input(piped_input)
        .fail_on_stderr(false),
    )
    .map_err(|e| VcsError::with_source(ErrorKind::Error, e.to_string(), e))?;

    let load_result = load.wait_collect().await;

    if let Err(e) = load_result {
        let stderr = stderr_handle.lock().await;
        let reason = classify_rdump_error(&String::from_utf8_lossy(&stderr));
        let err = VcsError::with_source(
            ErrorKind::Error,
            format!("svnrdump/svnadmin load pipeline failed ({reason}): {e}"),
            e,
        );
        err.log();
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_invalid_certificate() {
        assert_eq!(
            classify_rdump_error("svnrdump: E230001: Server SSL certificate verification failed"),
            "INVALID_CERTIFICATE"
        );
    }

    #[test]
    fn unrecognized_text_is_unknown() {
        assert_eq!(classify_rdump_error("connection refused"), "UNKNOWN");
    }
}
