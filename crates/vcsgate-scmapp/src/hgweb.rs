//! Mercurial's HTTP entry point, reworked as a pipe. `create_hg_wsgi_app`'s
//! original wraps `mercurial.hgweb.hgweb_mod.hgweb` in-process; that object
//! has no Rust equivalent, so this instead spawns `hg serve --stdio`, which
//! speaks the same wire protocol Mercurial's own `sshpeer`/`httppeer`
//! clients use, and wires its stdin/stdout straight through to the caller.
//! See the Open Question entry in the grounding ledger.

use vcsgate_core::{ConfigEntry, ErrorKind, VcsError, VcsResult};
use vcsgate_subprocio::{ByteStream, SpawnParams, SubprocIo};

#[derive(Clone)]
pub struct HgWebApp {
    pub hg_path: String,
    pub repo_path: std::path::PathBuf,
    pub repo_name: String,
    pub config: Vec<ConfigEntry>,
}

impl HgWebApp {
    pub fn new(
        hg_path: impl Into<String>,
        repo_path: impl Into<std::path::PathBuf>,
        repo_name: impl Into<String>,
        config: Vec<ConfigEntry>,
    ) -> VcsResult<Self> {
        let repo_path = repo_path.into();
        if !repo_path.is_dir() {
            return Err(VcsError::new(
                ErrorKind::Requirement,
                format!("{} is not a Mercurial repository", repo_path.display()),
            ));
        }

        Ok(Self {
            hg_path: hg_path.into(),
            repo_path,
            repo_name: repo_name.into(),
            config,
        })
    }

    /// Spawns `hg serve --stdio` against this repository, feeding `input`
    /// to its stdin and exposing its stdout lazily: the two ends form a
    /// bidirectional pipe for as long as the caller keeps driving `input`.
    pub fn serve_stdio(&self, input: ByteStream) -> VcsResult<ByteStream> {
        let mut argv = vec![
            self.hg_path.clone(),
            "-R".to_string(),
            self.repo_path.to_string_lossy().into_owned(),
            "--config".to_string(),
            "ui.quiet=true".to_string(),
            "--config".to_string(),
            "worker.numcpus=1".to_string(),
        ];
        for (section, option, value) in &self.config {
            argv.push("--config".to_string());
            argv.push(format!("{section}.{option}={value}"));
        }
        argv.push("serve".to_string());
        argv.push("--stdio".to_string());

        let params = SpawnParams::new(argv)
            .env("HGPLAIN", "1")
            .input(input)
            .fail_on_return_code(false)
            .fail_on_stderr(false);

        let subproc = SubprocIo::spawn(params).map_err(|e| {
            let err = VcsError::with_source(ErrorKind::Error, e.to_string(), e);
            err.log();
            err
        })?;

        Ok(Box::pin(MapErr(subproc.stdout_chunks())))
    }
}

/// Adapts `Stream<Item = Result<Bytes, SubprocError>>` to the
/// `io::Result`-based [`ByteStream`] every transport in this workspace
/// speaks.
struct MapErr<S>(S);

impl<S> futures::Stream for MapErr<S>
where
    S: futures::Stream<Item = Result<bytes::Bytes, vcsgate_subprocio::SubprocError>> + Unpin,
{
    type Item = std::io::Result<bytes::Bytes>;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        use futures::Stream;
        match std::pin::Pin::new(&mut self.0).poll_next(cx) {
            std::task::Poll::Ready(Some(Ok(b))) => std::task::Poll::Ready(Some(Ok(b))),
            std::task::Poll::Ready(Some(Err(e))) => std::task::Poll::Ready(Some(Err(
                std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
            ))),
            std::task::Poll::Ready(None) => std::task::Poll::Ready(None),
            std::task::Poll::Pending => std::task::Poll::Pending,
        }
    }
}
