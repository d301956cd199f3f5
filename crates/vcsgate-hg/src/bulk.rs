//! `bulk_request`: the same dispatch-table-of-ctx-methods shape as
//! `HgRemote._bulk_methods`.

use std::collections::HashMap;

use vcsgate_core::{ErrorKind, VcsError, VcsResult};

use crate::ctx;
use crate::handle::HgRepoHandle;
use crate::HgFactory;

const KNOWN_ATTRS: &[&str] = &[
    "affected_files",
    "author",
    "branch",
    "children",
    "date",
    "message",
    "parents",
    "status",
    "_file_paths",
];

pub async fn bulk_request(
    factory: &HgFactory,
    handle: &HgRepoHandle,
    rev: &str,
    pre_load: &[String],
) -> VcsResult<HashMap<String, serde_json::Value>> {
    let mut result = HashMap::with_capacity(pre_load.len());

    for attr in pre_load {
        if !KNOWN_ATTRS.contains(&attr.as_str()) {
            return Err(VcsError::new(
                ErrorKind::Error,
                format!("Unknown bulk attribute: {attr:?}"),
            ));
        }

        let value = match attr.as_str() {
            "affected_files" => serde_json::to_value(ctx::ctx_files(factory, handle, rev).await?),
            "author" => serde_json::to_value(ctx::ctx_user(factory, handle, rev).await?),
            "branch" => serde_json::to_value(ctx::ctx_branch(factory, handle, rev).await?),
            "children" => serde_json::to_value(ctx::ctx_children(factory, handle, rev).await?),
            "date" => serde_json::to_value(ctx::ctx_date(factory, handle, rev).await?),
            "message" => serde_json::to_value(ctx::ctx_description(factory, handle, rev).await?),
            "parents" => serde_json::to_value(ctx::ctx_parents(factory, handle, rev).await?),
            "status" => serde_json::to_value(ctx::ctx_status(factory, handle, rev).await?),
            "_file_paths" => serde_json::to_value(ctx::ctx_list(factory, handle, rev).await?),
            _ => unreachable!(),
        }
        .map_err(|e| VcsError::with_source(ErrorKind::Error, e.to_string(), e))?;

        result.insert(attr.clone(), value);
    }

    Ok(result)
}
