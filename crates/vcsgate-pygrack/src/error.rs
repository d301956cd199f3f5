//! Errors an HTTP front end turns into a status code, as opposed to the
//! tagged [`vcsgate_core::VcsError`] carried across the RPC boundary proper:
//! this crate sits below the RPC layer and speaks plain Git smart-HTTP, so
//! its failures are framed in terms of that protocol instead.

#[derive(Debug, thiserror::Error)]
pub enum PygrackError {
    #[error("not a valid git repository: {0}")]
    NotAGitRepository(String),

    #[error("service {0:?} is not supported")]
    UnsupportedService(String),

    #[error("subprocess failed: {0}")]
    Subprocess(#[from] vcsgate_subprocio::SubprocError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
