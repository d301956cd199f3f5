//! Shells out to `svnadmin`, `svnlook`, `svn`, `svnrdump` and `svnmucc`.
//! There is no safe Rust binding to Subversion's `libsvn_fs`/`libsvn_repos`
//! internals, so every read the original performs through `svn.fs`/`svn.repos`
//! is reproduced here as the equivalent `svnlook` subcommand, and every
//! mutation through an in-memory `txn_root` is reproduced as an `svnmucc`
//! invocation against a `file://` URL.

use std::path::Path;

use vcsgate_core::{ErrorKind, VcsError, VcsResult};
use vcsgate_subprocio::{SpawnParams, SubprocError, SubprocIo};

#[derive(Clone)]
pub struct SvnCli {
    pub svnadmin_path: String,
    pub svnlook_path: String,
    pub svn_path: String,
    pub svnrdump_path: String,
    pub svnmucc_path: String,
}

impl Default for SvnCli {
    fn default() -> Self {
        Self {
            svnadmin_path: "svnadmin".to_string(),
            svnlook_path: "svnlook".to_string(),
            svn_path: "svn".to_string(),
            svnrdump_path: "svnrdump".to_string(),
            svnmucc_path: "svnmucc".to_string(),
        }
    }
}

impl SvnCli {
    pub async fn svnlook(&self, path: &Path, args: &[String]) -> VcsResult<Vec<u8>> {
        let mut argv = vec![self.svnlook_path.clone()];
        argv.extend(args.iter().cloned());
        argv.push(path.to_string_lossy().into_owned());
        self.run(argv).await
    }

    pub async fn svnadmin(&self, args: &[String]) -> VcsResult<Vec<u8>> {
        let mut argv = vec![self.svnadmin_path.clone()];
        argv.extend(args.iter().cloned());
        self.run(argv).await
    }

    pub async fn svn(&self, args: &[String]) -> VcsResult<Vec<u8>> {
        let mut argv = vec![self.svn_path.clone()];
        argv.extend(args.iter().cloned());
        self.run(argv).await
    }

    pub async fn svnmucc(&self, args: &[String]) -> VcsResult<Vec<u8>> {
        let mut argv = vec![self.svnmucc_path.clone()];
        argv.extend(args.iter().cloned());
        self.run(argv).await
    }

    async fn run(&self, argv: Vec<String>) -> VcsResult<Vec<u8>> {
        let params = SpawnParams::new(argv).fail_on_stderr(false);
        let subproc = SubprocIo::spawn(params).map_err(translate_spawn)?;
        subproc.wait_collect().await.map_err(translate_run)
    }
}

fn translate_spawn(e: std::io::Error) -> VcsError {
    let err = VcsError::with_source(ErrorKind::Error, e.to_string(), e);
    err.log();
    err
}

fn translate_run(e: SubprocError) -> VcsError {
    let kind = match &e {
        SubprocError::NonZeroExit(_) => ErrorKind::Abort,
        SubprocError::Stderr(_) => ErrorKind::Error,
        SubprocError::Io(_) => ErrorKind::Error,
    };
    let err = VcsError::with_source(kind, e.to_string(), e);
    err.log();
    err
}

pub fn to_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim_end().to_string()
}

pub fn lines(bytes: &[u8]) -> Vec<String> {
    to_text(bytes)
        .lines()
        .map(str::to_string)
        .filter(|l| !l.is_empty())
        .collect()
}
