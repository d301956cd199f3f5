//! Dispatch table for the `svn` backend, matching `SvnRemote`'s method
//! surface in `original_source/vcsserver/svn.py`.

use std::collections::HashMap;

use serde_json::{json, Value};

use vcsgate_core::{ErrorKind, VcsError, VcsResult, Wire};
use vcsgate_svn::{changes, check_url, commit, diff, history, import, lookup, nodes, props, FileUpdate, SvnFactory};

use crate::args::{optional, optional_or, required, wire_required};

pub async fn dispatch(
    factory: &SvnFactory,
    method: &str,
    wire: Option<Wire>,
    args: &[Value],
    kwargs: &HashMap<String, Value>,
) -> VcsResult<Value> {
    if method == "check_url" {
        let url: String = required(args, kwargs, 0, "url")?;
        return Ok(json!(check_url::check_url(factory.cli(), &url).await?));
    }

    let wire = wire_required(wire)?;

    if method == "create_repository" {
        let compatible_version: Option<String> = optional(args, kwargs, 0, "compatible_version")?;
        factory
            .create_repository(&wire, compatible_version.as_deref())
            .await?;
        return Ok(Value::Null);
    }

    let handle = factory.repo(&wire).await?;
    let cli = factory.cli();

    match method {
        "lookup" => {
            let revision: Option<i64> = optional(args, kwargs, 0, "revision")?;
            Ok(json!(lookup::lookup(cli, &handle, revision).await?))
        }
        "lookup_interval" => {
            let start_ts: Option<chrono::DateTime<chrono::FixedOffset>> =
                optional(args, kwargs, 0, "start_ts")?;
            let end_ts: Option<chrono::DateTime<chrono::FixedOffset>> =
                optional(args, kwargs, 1, "end_ts")?;
            let (start, end) = lookup::lookup_interval(cli, &handle, start_ts, end_ts).await?;
            Ok(json!({ "start": start, "end": end }))
        }
        "revision_properties" => {
            let revision: i64 = required(args, kwargs, 0, "revision")?;
            Ok(json!(props::revision_properties(cli, &handle, revision).await?))
        }
        "revision_changes" => {
            let revision: i64 = required(args, kwargs, 0, "revision")?;
            let result = changes::revision_changes(cli, &handle, revision).await?;
            Ok(json!(result))
        }
        "node_history" => {
            let path: String = required(args, kwargs, 0, "path")?;
            let revision: i64 = required(args, kwargs, 1, "revision")?;
            let limit: Option<usize> = optional(args, kwargs, 2, "limit")?;
            Ok(json!(history::node_history(cli, &handle, &path, revision, limit).await?))
        }
        "node_properties" => {
            let path: String = required(args, kwargs, 0, "path")?;
            let revision: i64 = required(args, kwargs, 1, "revision")?;
            Ok(json!(props::node_properties(cli, &handle, &path, revision).await?))
        }
        "file_annotate" => {
            let path: String = required(args, kwargs, 0, "path")?;
            let revision: i64 = required(args, kwargs, 1, "revision")?;
            let lines = history::file_annotate(cli, &handle, &path, revision).await?;
            let lines: Vec<Value> = lines
                .into_iter()
                .map(|l| json!({ "line_no": l.line_no, "revision": l.revision, "line": l.line }))
                .collect();
            Ok(json!(lines))
        }
        "get_node_type" => {
            let path: String = required(args, kwargs, 0, "path")?;
            let revision: Option<i64> = optional(args, kwargs, 1, "revision")?;
            let node_type = nodes::get_node_type(cli, &handle, &path, revision).await?;
            Ok(json!(node_type.map(node_type_str)))
        }
        "get_nodes" => {
            let path: String = required(args, kwargs, 0, "path")?;
            let revision: Option<i64> = optional(args, kwargs, 1, "revision")?;
            let result = nodes::get_nodes(cli, &handle, &path, revision).await?;
            let result: Vec<Value> = result
                .into_iter()
                .map(|(name, kind)| json!({ "name": name, "type": node_type_str(kind) }))
                .collect();
            Ok(json!(result))
        }
        "get_file_content" => {
            let path: String = required(args, kwargs, 0, "path")?;
            let revision: Option<i64> = optional(args, kwargs, 1, "revision")?;
            let content = nodes::get_file_content(cli, &handle, &path, revision).await?;
            Ok(json!(crate::b64::encode(content)))
        }
        "get_file_size" => {
            let path: String = required(args, kwargs, 0, "path")?;
            let revision: Option<i64> = optional(args, kwargs, 1, "revision")?;
            Ok(json!(nodes::get_file_size(cli, &handle, &path, revision).await?))
        }
        "commit" => {
            let message: String = required(args, kwargs, 0, "message")?;
            let author: String = required(args, kwargs, 1, "author")?;
            let updated: Vec<FileUpdate> = optional_or(args, kwargs, 2, "updated", Vec::new())?;
            let removed: Vec<String> = optional_or(args, kwargs, 3, "removed", Vec::new())?;
            let rev = commit::commit(cli, &handle, &message, &author, &updated, &removed).await?;
            Ok(json!(rev))
        }
        "diff" => {
            let rev1: i64 = required(args, kwargs, 0, "rev1")?;
            let rev2: i64 = required(args, kwargs, 1, "rev2")?;
            let path1: String = required(args, kwargs, 2, "path1")?;
            let path2: Option<String> = optional(args, kwargs, 3, "path2")?;
            let ignore_whitespace: bool = optional_or(args, kwargs, 4, "ignore_whitespace", false)?;
            let context: usize = optional_or(args, kwargs, 5, "context", 3)?;
            let out = diff::diff(cli, &handle, rev1, rev2, &path1, path2.as_deref(), ignore_whitespace, context).await?;
            Ok(json!(out))
        }
        "import_remote_repository" => {
            let src_url: String = required(args, kwargs, 0, "src_url")?;
            import::import_remote_repository(cli, factory, &handle, &src_url).await?;
            Ok(Value::Null)
        }
        _ => Err(VcsError::new(ErrorKind::Error, format!("unknown svn method: {method}"))),
    }
}

fn node_type_str(kind: nodes::NodeType) -> &'static str {
    match kind {
        nodes::NodeType::File => "file",
        nodes::NodeType::Dir => "dir",
    }
}
