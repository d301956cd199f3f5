//! The three hook transports, unified behind a common `invoke` operation.
//! Which one a [`HookBridge`] uses is picked once, at construction, from
//! the `extras` that described the operation.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use vcsgate_core::Extras;

use crate::name::HookName;

/// What a transport invocation returned, before translation into either a
/// [`vcsgate_core::HookResponse`] or a tagged error.
#[derive(Debug, Clone)]
pub enum HookOutcome {
    Ok {
        status: i32,
        output: Vec<u8>,
    },
    Exception {
        message: String,
        exception: String,
        exception_args: Vec<String>,
    },
}

pub trait HookTransport: Send + Sync {
    fn invoke(&self, name: HookName, extras: &Extras) -> io::Result<HookOutcome>;
}

/// `hooks_uri` present with `hooks_protocol = http`: POST JSON to
/// `hooks_uri`, body `{method, extras}`.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    uri: String,
}

#[derive(Serialize)]
struct HttpHookRequest<'a> {
    method: &'a str,
    extras: &'a Extras,
}

#[derive(Deserialize)]
struct HttpHookResponse {
    status: i32,
    output: String,
    #[serde(default)]
    exception: Option<String>,
    #[serde(default)]
    exception_args: Vec<String>,
}

impl HttpTransport {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            uri: uri.into(),
        }
    }
}

impl HookTransport for HttpTransport {
    fn invoke(&self, name: HookName, extras: &Extras) -> io::Result<HookOutcome> {
        let body = HttpHookRequest {
            method: name.as_str(),
            extras,
        };

        let resp = self
            .client
            .post(&self.uri)
            .json(&body)
            .send()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
            .error_for_status()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        let parsed: HttpHookResponse = resp
            .json()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        Ok(match parsed.exception {
            Some(exception) => HookOutcome::Exception {
                message: parsed.output,
                exception,
                exception_args: parsed.exception_args,
            },
            None => HookOutcome::Ok {
                status: parsed.status,
                output: parsed.output.into_bytes(),
            },
        })
    }
}

/// The legacy in-process callable path, used when `hooks_uri` is present
/// but the protocol isn't `http`.
pub struct InProcessTransport {
    callback: Arc<dyn Fn(HookName, &Extras) -> io::Result<HookOutcome> + Send + Sync>,
}

impl InProcessTransport {
    pub fn new(
        callback: impl Fn(HookName, &Extras) -> io::Result<HookOutcome> + Send + Sync + 'static,
    ) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }
}

impl HookTransport for InProcessTransport {
    fn invoke(&self, name: HookName, extras: &Extras) -> io::Result<HookOutcome> {
        (self.callback)(name, extras)
    }
}

/// A statically-linked module exposing a `Hooks`-shaped implementation,
/// resolved by name at construction from a caller-provided registry. This
/// is the systems-language analogue of the original's `importlib`-based
/// `hooks_module` loading: no dynamic loading, but the same one-name ->
/// one-implementation resolution.
pub trait EmbeddedHooks: Send + Sync {
    fn invoke(&self, name: HookName, extras: &Extras) -> io::Result<HookOutcome>;
}

#[derive(Default)]
pub struct EmbeddedHooksRegistry {
    modules: HashMap<String, Arc<dyn EmbeddedHooks>>,
}

impl EmbeddedHooksRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module_name: impl Into<String>, hooks: Arc<dyn EmbeddedHooks>) {
        self.modules.insert(module_name.into(), hooks);
    }

    pub fn resolve(&self, module_name: &str) -> Option<EmbeddedTransport> {
        self.modules
            .get(module_name)
            .cloned()
            .map(|hooks| EmbeddedTransport { hooks })
    }
}

pub struct EmbeddedTransport {
    hooks: Arc<dyn EmbeddedHooks>,
}

impl HookTransport for EmbeddedTransport {
    fn invoke(&self, name: HookName, extras: &Extras) -> io::Result<HookOutcome> {
        self.hooks.invoke(name, extras)
    }
}
