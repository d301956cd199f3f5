//! Maps `git2::Error` onto the gateway's tagged error vocabulary.

use vcsgate_core::ErrorKind;

/// Chooses a `kind` for a raw `git2` failure. Mirrors the Python original's
/// `reraise_safe_exceptions` decorator, which narrows a handful of dulwich
/// exception types to `lookup`/`error` and otherwise lets a generic
/// exception type fall through as `unhandled`.
pub fn kind_for(err: &git2::Error) -> ErrorKind {
    use git2::ErrorCode::*;

    match err.code() {
        NotFound | Ambiguous | Peel => ErrorKind::Lookup,
        UncommittedState | Conflict | Locked | Modified => ErrorKind::Abort,
        InvalidSpec | Directory | Exists | Applied | MergeConflict => ErrorKind::Error,
        _ => match err.class() {
            git2::ErrorClass::Repository if err.message().contains("requirement") => {
                ErrorKind::Requirement
            }
            git2::ErrorClass::Net | git2::ErrorClass::Http | git2::ErrorClass::Ssh => {
                ErrorKind::UrlError
            }
            _ => ErrorKind::Unhandled,
        },
    }
}
