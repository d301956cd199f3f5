//! Request/response framing shared by the RPC dispatcher (`vcsgate-rpc`)
//! and every backend adapter's method signature.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::wire::Wire;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcParams {
    pub wire: Option<Wire>,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub kwargs: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub id: Option<Value>,
    pub method: String,
    pub params: RpcParams,
}

/// Error types that are safe to expose verbatim to the RPC caller. Anything
/// else is reported with `type: null`.
const EXPOSABLE_ERROR_TYPES: &[&str] = &["KeyError", "URLError"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    #[serde(rename = "_vcs_kind")]
    pub vcs_kind: Option<String>,
}

impl RpcError {
    pub fn from_vcs_error(err: &crate::error::VcsError) -> Self {
        Self {
            message: err.message().to_string(),
            error_type: None,
            vcs_kind: Some(err.kind().as_str().to_string()),
        }
    }

    /// Builds an error whose `python_type` name is exposed only if it
    /// belongs to the allow-list; everything else is sanitized to `null`.
    pub fn from_named(message: impl Into<String>, python_type: &str, vcs_kind: Option<&str>) -> Self {
        let error_type = EXPOSABLE_ERROR_TYPES
            .contains(&python_type)
            .then(|| python_type.to_string());

        Self {
            message: message.into(),
            error_type,
            vcs_kind: vcs_kind.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcResponse {
    Success {
        id: Option<Value>,
        result: Value,
    },
    Error {
        id: Option<Value>,
        error: RpcError,
    },
}

impl RpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        RpcResponse::Success { id, result }
    }

    pub fn error(id: Option<Value>, error: RpcError) -> Self {
        RpcResponse::Error { id, error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposable_error_types_pass_through() {
        let e = RpcError::from_named("missing key", "KeyError", Some("lookup"));
        assert_eq!(e.error_type.as_deref(), Some("KeyError"));
    }

    #[test]
    fn unknown_error_types_are_sanitized() {
        let e = RpcError::from_named("boom", "RuntimeError", Some("unhandled"));
        assert_eq!(e.error_type, None);
    }
}
