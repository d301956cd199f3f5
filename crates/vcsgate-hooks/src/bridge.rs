use std::io::Write;

use vcsgate_core::{
    Extras, ErrorKind, HookResponse, VcsError, VcsResult, HOOK_TRANSPORT_ERROR_STATUS,
};

use crate::name::HookName;
use crate::transport::{
    EmbeddedHooksRegistry, HookOutcome, HookTransport, HttpTransport, InProcessTransport,
};

fn exception_kind(exception: &str) -> ErrorKind {
    match exception {
        "HTTPLockedRC" => ErrorKind::RepoLocked,
        "RepositoryError" => ErrorKind::Error,
        _ => ErrorKind::Unhandled,
    }
}

/// Picks a transport from `extras` and exposes the two call shapes every
/// caller needs: `call` (tagged-error-raising, for non-Git operations) and
/// `call_for_response` (protocol-legal `HookResponse`-returning, for Git's
/// pre/post pull/push wrappers, where the protocol must always complete
/// with valid framing and can never propagate a raw error mid-stream).
pub struct HookBridge {
    transport: Box<dyn HookTransport>,
}

impl HookBridge {
    pub fn new(transport: Box<dyn HookTransport>) -> Self {
        Self { transport }
    }

    /// Resolves a transport the way the spec describes: `hooks_uri` +
    /// `http` protocol -> HTTP; `hooks_uri` present otherwise -> the
    /// in-process legacy callable; neither -> the named embedded module.
    pub fn from_extras(
        extras: &Extras,
        in_process: Option<InProcessTransport>,
        embedded: &EmbeddedHooksRegistry,
    ) -> Option<Self> {
        match (&extras.hooks_uri, extras.hooks_protocol.as_deref()) {
            (Some(uri), Some("http")) => Some(Self::new(Box::new(HttpTransport::new(uri)))),
            (Some(_uri), _) => in_process.map(|t| Self::new(Box::new(t))),
            (None, _) => extras
                .hooks_module
                .as_deref()
                .and_then(|module| embedded.resolve(module))
                .map(|t| Self::new(Box::new(t))),
        }
    }

    /// Generic call: skipped entirely (status 0, empty output, no
    /// transport invocation) when the hook's category isn't enabled.
    /// Transport-level failures become `HookResponse(128, ...)` rather
    /// than an `Err` (see module docs); a reported `exception` is
    /// translated into a tagged error and returned as `Err`.
    pub fn call(&self, name: HookName, extras: &Extras, writer: &mut dyn Write) -> VcsResult<i32> {
        if !extras.hook_enabled(name.category()) {
            return Ok(0);
        }

        match self.transport.invoke(name, extras) {
            Ok(HookOutcome::Ok { status, output }) => {
                let _ = writer.write_all(&output);
                Ok(status)
            }
            Ok(HookOutcome::Exception {
                message,
                exception,
                exception_args,
            }) => {
                let kind = exception_kind(&exception);
                let full = format!("{exception}({}): {message}", exception_args.join(", "));
                Err(VcsError::with_source(
                    kind,
                    full,
                    std::io::Error::new(std::io::ErrorKind::Other, message.clone()),
                ))
            }
            Err(io_err) => {
                let message = format!("ERROR: {io_err}");
                let _ = writer.write_all(message.as_bytes());
                VcsError::with_source(ErrorKind::Unhandled, "hook transport failed", io_err).log();
                Ok(HOOK_TRANSPORT_ERROR_STATUS)
            }
        }
    }

    /// Git's wrapper shape: always a [`HookResponse`], never an `Err`.
    /// Both a transport failure and a reported exception collapse into a
    /// status-128 rejection so the calling protocol engine can always
    /// finish the response stream.
    pub fn call_for_response(&self, name: HookName, extras: &Extras) -> HookResponse {
        if !extras.hook_enabled(name.category()) {
            return HookResponse::allow();
        }

        match self.transport.invoke(name, extras) {
            Ok(HookOutcome::Ok { status, output }) => HookResponse {
                status,
                output,
            },
            Ok(HookOutcome::Exception {
                message, exception, ..
            }) => HookResponse::transport_error(format!("ERROR: {exception}: {message}")),
            Err(io_err) => HookResponse::transport_error(format!("ERROR: {io_err}")),
        }
    }
}
