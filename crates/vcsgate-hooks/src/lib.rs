//! The hook bridge: picks a transport (HTTP, in-process, or embedded
//! module) per-call from [`vcsgate_core::Extras`] and invokes the fixed set
//! of hook names around pull/push/repo-size operations.
//!
//! Git's own pre/post pull/push wrappers live in [`git`], since unlike the
//! generic dispatcher surface they must always complete with a protocol-legal
//! [`vcsgate_core::HookResponse`] rather than raise a tagged error.

mod bridge;
pub mod git;
mod name;
mod transport;

pub use bridge::HookBridge;
pub use name::HookName;
pub use transport::{
    EmbeddedHooks, EmbeddedHooksRegistry, EmbeddedTransport, HookOutcome, HookTransport,
    HttpTransport, InProcessTransport,
};

#[cfg(test)]
mod tests {
    use std::io;

    use vcsgate_core::{Extras, HookCategory};

    use super::*;

    fn extras_with(hooks: &[&str]) -> Extras {
        Extras {
            hooks: hooks.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn disabled_category_skips_transport_entirely() {
        let called = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let called2 = called.clone();

        let transport = InProcessTransport::new(move |_name, _extras| {
            called2.store(true, std::sync::atomic::Ordering::SeqCst);
            Ok(HookOutcome::Ok {
                status: 0,
                output: Vec::new(),
            })
        });
        let bridge = HookBridge::new(Box::new(transport));

        let extras = extras_with(&["push"]);
        let mut out = Vec::new();
        let status = bridge.call(HookName::PrePull, &extras, &mut out).unwrap();

        assert_eq!(status, 0);
        assert!(!called.load(std::sync::atomic::Ordering::SeqCst));
        assert!(extras.hook_enabled(HookCategory::Push));
    }

    #[test]
    fn enabled_category_invokes_transport_and_forwards_output() {
        let transport = InProcessTransport::new(|_name, _extras| {
            Ok(HookOutcome::Ok {
                status: 7,
                output: b"hello".to_vec(),
            })
        });
        let bridge = HookBridge::new(Box::new(transport));

        let extras = extras_with(&["pull"]);
        let mut out = Vec::new();
        let status = bridge.call(HookName::PrePull, &extras, &mut out).unwrap();

        assert_eq!(status, 7);
        assert_eq!(out, b"hello");
    }

    #[test]
    fn exception_outcome_is_tagged_by_name() {
        let transport = InProcessTransport::new(|_name, _extras| {
            Ok(HookOutcome::Exception {
                message: "repo is locked".to_string(),
                exception: "HTTPLockedRC".to_string(),
                exception_args: vec![],
            })
        });
        let bridge = HookBridge::new(Box::new(transport));

        let extras = extras_with(&["push"]);
        let mut out = Vec::new();
        let err = bridge
            .call(HookName::PrePush, &extras, &mut out)
            .unwrap_err();

        assert_eq!(err.kind(), vcsgate_core::ErrorKind::RepoLocked);
    }

    #[test]
    fn unrecognized_exception_name_is_unhandled() {
        let transport = InProcessTransport::new(|_name, _extras| {
            Ok(HookOutcome::Exception {
                message: "boom".to_string(),
                exception: "SomeOtherError".to_string(),
                exception_args: vec![],
            })
        });
        let bridge = HookBridge::new(Box::new(transport));

        let extras = extras_with(&["push"]);
        let mut out = Vec::new();
        let err = bridge
            .call(HookName::PrePush, &extras, &mut out)
            .unwrap_err();

        assert_eq!(err.kind(), vcsgate_core::ErrorKind::Unhandled);
    }

    #[test]
    fn transport_io_failure_collapses_to_128_instead_of_erroring() {
        let transport = InProcessTransport::new(|_name, _extras| {
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "no route"))
        });
        let bridge = HookBridge::new(Box::new(transport));

        let extras = extras_with(&["push"]);
        let mut out = Vec::new();
        let status = bridge.call(HookName::PrePush, &extras, &mut out).unwrap();

        assert_eq!(status, 128);
        assert!(String::from_utf8_lossy(&out).starts_with("ERROR:"));
    }

    #[test]
    fn call_for_response_never_errors_on_exception() {
        let transport = InProcessTransport::new(|_name, _extras| {
            Ok(HookOutcome::Exception {
                message: "nope".to_string(),
                exception: "RepositoryError".to_string(),
                exception_args: vec![],
            })
        });
        let bridge = HookBridge::new(Box::new(transport));

        let extras = extras_with(&["push"]);
        let response = bridge.call_for_response(HookName::PrePush, &extras);

        assert!(response.is_transport_error());
    }
}
