//! Dispatch table for the `server` backend: the gateway's own remote
//! control surface, matching `VcsServer` in
//! `original_source/vcsserver/server.py`. There is no Python GC to trigger,
//! so `run_gc` reports a fixed, empty collection result rather than
//! fabricating one.

use std::collections::HashMap;

use serde_json::{json, Value};

use vcsgate_core::{ErrorKind, VcsError, VcsResult};

use crate::args::required;
use crate::state::AppState;

pub async fn dispatch(
    state: &AppState,
    method: &str,
    args: &[Value],
    kwargs: &HashMap<String, Value>,
) -> VcsResult<Value> {
    match method {
        "ping" => {
            log::debug!("Received server ping.");
            Ok(Value::Null)
        }
        "echo" => {
            let data: Value = required(args, kwargs, 0, "data")?;
            log::debug!("Received server echo.");
            Ok(data)
        }
        "sleep" => {
            let seconds: f64 = required(args, kwargs, 0, "seconds")?;
            log::debug!("Sleeping {seconds} seconds");
            if seconds < 0.0 || !seconds.is_finite() {
                return Err(VcsError::new(ErrorKind::Requirement, "seconds must be a non-negative, finite number"));
            }
            tokio::time::sleep(std::time::Duration::from_secs_f64(seconds)).await;
            Ok(Value::Null)
        }
        "get_pid" => Ok(json!(std::process::id())),
        "run_gc" => Ok(json!({ "freed_objects": 0, "garbage": 0 })),
        "shutdown" => {
            state.request_shutdown();
            Ok(Value::Null)
        }
        _ => Err(VcsError::new(ErrorKind::Error, format!("unknown server method: {method}"))),
    }
}
