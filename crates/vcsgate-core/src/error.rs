//! The tagged error carrier shared by every backend adapter and RPC boundary.

use std::fmt;

/// The fixed vocabulary of failure kinds that may cross an RPC or hook
/// boundary. Every public adapter method must translate whatever it catches
/// internally into one of these before it escapes the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Object lookup / missing commit / checksum mismatch.
    Lookup,
    /// Abort / intervention-required / user-visible operational abort.
    Abort,
    /// Protocol hangup / unexpected command / anything else concrete but not
    /// covered by the other variants.
    Error,
    /// Repository format requirement unmet.
    Requirement,
    /// Repository locked, surfaced from a hook callback.
    RepoLocked,
    /// Archive format unsupported.
    Archive,
    /// URL fetch / validation failure.
    UrlError,
    /// Anything else; the original cause is preserved.
    Unhandled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Lookup => "lookup",
            ErrorKind::Abort => "abort",
            ErrorKind::Error => "error",
            ErrorKind::Requirement => "requirement",
            ErrorKind::RepoLocked => "repo_locked",
            ErrorKind::Archive => "archive",
            ErrorKind::UrlError => "url_error",
            ErrorKind::Unhandled => "unhandled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The universal failure value. Carries a `kind` drawn from [`ErrorKind`],
/// a human-readable message, and the original cause chain so it can be
/// logged in full at the point of translation even though only `kind` and
/// `message` cross the RPC boundary.
#[derive(Debug)]
pub struct VcsError {
    kind: ErrorKind,
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl VcsError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Logs this error at the point of translation, including the full
    /// cause chain. Every adapter method is expected to call this exactly
    /// once, at the earliest point the error is known to be tagged.
    pub fn log(&self) {
        log::error!("[{}] {}", self.kind, self.message);
        let mut cause = self.source.as_deref().map(|e| e as &dyn std::error::Error);
        while let Some(e) = cause {
            log::error!("  caused by: {e}");
            cause = e.source();
        }
    }
}

impl fmt::Display for VcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::error::Error for VcsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

pub type VcsResult<T> = Result<T, VcsError>;

/// Translates a `Result<T, E>` into a [`VcsResult<T>`], tagging the error
/// with whatever `kind_for` decides and preserving `E` as the source cause.
/// Every backend adapter method ends its body with a call to this instead of
/// letting a raw backend exception escape.
pub fn translate<T, E>(
    kind_for: impl FnOnce(&E) -> ErrorKind,
    result: Result<T, E>,
) -> VcsResult<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    result.map_err(|e| {
        let kind = kind_for(&e);
        let message = e.to_string();
        let err = VcsError::with_source(kind, message, e);
        err.log();
        err
    })
}
