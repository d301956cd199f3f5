//! Positional-or-keyword parameter extraction for RPC method dispatch.
//!
//! The original calls every remote method as `getattr(remote, method)(*args,
//! **kwargs)`, so a client may pass a parameter either by position or by
//! name. [`required`]/[`optional`] reproduce that by checking `kwargs` by
//! name first and falling back to the positional slot.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use vcsgate_core::{ErrorKind, VcsError, VcsResult};

fn raw<'a>(args: &'a [Value], kwargs: &'a HashMap<String, Value>, index: usize, name: &str) -> Option<&'a Value> {
    kwargs.get(name).or_else(|| args.get(index))
}

pub fn required<T: DeserializeOwned>(
    args: &[Value],
    kwargs: &HashMap<String, Value>,
    index: usize,
    name: &str,
) -> VcsResult<T> {
    match raw(args, kwargs, index, name) {
        Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
            VcsError::with_source(ErrorKind::Requirement, format!("invalid parameter `{name}`"), e)
        }),
        None => Err(VcsError::new(ErrorKind::Requirement, format!("missing parameter `{name}`"))),
    }
}

pub fn optional<T: DeserializeOwned>(
    args: &[Value],
    kwargs: &HashMap<String, Value>,
    index: usize,
    name: &str,
) -> VcsResult<Option<T>> {
    match raw(args, kwargs, index, name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|e| {
            VcsError::with_source(ErrorKind::Requirement, format!("invalid parameter `{name}`"), e)
        }),
    }
}

pub fn optional_or<T: DeserializeOwned>(
    args: &[Value],
    kwargs: &HashMap<String, Value>,
    index: usize,
    name: &str,
    default: T,
) -> VcsResult<T> {
    Ok(optional(args, kwargs, index, name)?.unwrap_or(default))
}

pub fn wire_required(wire: Option<vcsgate_core::Wire>) -> VcsResult<vcsgate_core::Wire> {
    wire.ok_or_else(|| VcsError::new(ErrorKind::Requirement, "this method requires a `wire` parameter"))
}
