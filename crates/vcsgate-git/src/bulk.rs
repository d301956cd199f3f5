//! `bulk_request`: batches several per-commit attribute lookups into a
//! single round trip, the same dispatch-table shape as the original's
//! `_bulk_methods` map on `GitRemote.__init__`.

use std::collections::HashMap;

use vcsgate_core::{ErrorKind, VcsError, VcsResult};

use crate::handle::GitRepoHandle;
use crate::objects;

const KNOWN_ATTRS: &[&str] = &["author", "date", "message", "parents", "_commit"];

pub fn bulk_request(
    handle: &GitRepoHandle,
    rev: &str,
    pre_load: &[String],
) -> VcsResult<HashMap<String, serde_json::Value>> {
    let mut result = HashMap::with_capacity(pre_load.len());

    for attr in pre_load {
        if !KNOWN_ATTRS.contains(&attr.as_str()) {
            return Err(VcsError::new(
                ErrorKind::Error,
                format!("Unknown bulk attribute: {attr}"),
            ));
        }

        let value = match attr.as_str() {
            "date" => {
                let attrs = objects::get_object_attrs(
                    handle,
                    rev,
                    &["commit_time".to_string(), "commit_timezone".to_string()],
                )?;
                serde_json::Value::Array(attrs)
            }
            "author" | "message" | "parents" => objects::commit_attribute(handle, rev, attr)?,
            "_commit" => objects::revision(handle, rev)?,
            _ => unreachable!(),
        };

        result.insert(attr.clone(), value);
    }

    Ok(result)
}
