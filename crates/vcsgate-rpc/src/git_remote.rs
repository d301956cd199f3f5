//! Dispatch table for the `git` backend: one arm per method name, matching
//! `GitRemote`'s flat method surface in `original_source/vcsserver/git.py`.

use std::collections::HashMap;

use serde_json::{json, Value};

use vcsgate_core::{ErrorKind, VcsError, VcsResult, Wire};
use vcsgate_git::{bulk_request, objects, refs, remote, tree, GitFactory};

use crate::args::{optional, optional_or, required, wire_required};

pub async fn dispatch(
    factory: &GitFactory,
    git_path: &str,
    method: &str,
    wire: Option<Wire>,
    args: &[Value],
    kwargs: &HashMap<String, Value>,
) -> VcsResult<Value> {
    match method {
        "check_url" => {
            let url: String = required(args, kwargs, 0, "url")?;
            Ok(json!(remote::check_url(&url)?))
        }
        "run_git_command" => {
            let cmd: Vec<String> = required(args, kwargs, 0, "cmd")?;
            let bare: bool = optional_or(args, kwargs, 1, "bare", false)?;
            let wire = wire_required(wire)?;
            let (stdout, stderr) = vcsgate_git::cli::run_git_command(git_path, Some(&wire), &cmd, bare).await?;
            Ok(json!({ "stdout": crate::b64::encode(stdout), "stderr": crate::b64::encode(stderr) }))
        }
        "discover_git_version" => {
            let version = vcsgate_git::cli::discover_git_version(git_path).await?;
            Ok(json!(version))
        }
        _ => dispatch_repo(factory, method, wire, args, kwargs).await,
    }
}

async fn dispatch_repo(
    factory: &GitFactory,
    method: &str,
    wire: Option<Wire>,
    args: &[Value],
    kwargs: &HashMap<String, Value>,
) -> VcsResult<Value> {
    let wire = wire_required(wire)?;
    let handle = factory.repo(&wire).await?;

    match method {
        "bulk_request" => {
            let rev: String = required(args, kwargs, 0, "rev")?;
            let pre_load: Vec<String> = optional_or(args, kwargs, 1, "pre_load", Vec::new())?;
            let result = bulk_request(&handle, &rev, &pre_load)?;
            Ok(json!(result))
        }
        "get_object" => {
            let sha: String = required(args, kwargs, 0, "sha")?;
            let info = objects::get_object(&handle, &sha)?;
            Ok(json!({ "id": info.id, "type": info.object_type, "commit_id": info.commit_id }))
        }
        "get_object_attrs" => {
            let rev: String = required(args, kwargs, 0, "rev")?;
            let attrs: Vec<String> = required(args, kwargs, 1, "attrs")?;
            Ok(json!(objects::get_object_attrs(&handle, &rev, &attrs)?))
        }
        "revision" => {
            let rev: String = required(args, kwargs, 0, "rev")?;
            Ok(objects::revision(&handle, &rev)?)
        }
        "commit_attribute" => {
            let rev: String = required(args, kwargs, 0, "rev")?;
            let attr: String = required(args, kwargs, 1, "attr")?;
            Ok(objects::commit_attribute(&handle, &rev, &attr)?)
        }
        "add_object" => {
            let content: String = required(args, kwargs, 0, "content")?;
            let content = crate::b64::decode(&content)
                .map_err(|e| VcsError::with_source(ErrorKind::Requirement, "content is not valid base64", e))?;
            Ok(json!(objects::add_object(&handle, &content)?))
        }
        "blob_as_pretty_string" => {
            let sha: String = required(args, kwargs, 0, "sha")?;
            Ok(json!(objects::blob_as_pretty_string(&handle, &sha)?))
        }
        "blob_raw_length" => {
            let sha: String = required(args, kwargs, 0, "sha")?;
            Ok(json!(objects::blob_raw_length(&handle, &sha)?))
        }
        "bare" => Ok(json!(objects::bare(&handle)?)),
        "get_description" => Ok(json!(objects::get_description(&handle)?)),
        "get_file_history" => {
            let file_path: String = required(args, kwargs, 0, "file_path")?;
            let commit_id: String = required(args, kwargs, 1, "commit_id")?;
            let limit: usize = optional_or(args, kwargs, 2, "limit", usize::MAX)?;
            Ok(json!(objects::get_file_history(&handle, &file_path, &commit_id, limit)?))
        }
        "get_missing_revs" => {
            let rev1: String = required(args, kwargs, 0, "rev1")?;
            let path2: std::path::PathBuf = required(args, kwargs, 1, "path2")?;
            let rev2: String = required(args, kwargs, 2, "rev2")?;
            let other_wire = Wire::new(path2);
            let other_handle = factory.repo(&other_wire).await?;
            Ok(json!(objects::get_missing_revs(&handle, &rev1, &other_handle, &rev2)?))
        }
        "get_refs" => {
            let keys: Option<Vec<(String, String)>> = optional(args, kwargs, 0, "keys")?;
            let keys_slice = keys.as_deref();
            Ok(json!(refs::get_refs(&handle, keys_slice)?))
        }
        "get_refs_path" => Ok(json!(refs::get_refs_path(&handle)?)),
        "set_refs" => {
            let key: String = required(args, kwargs, 0, "key")?;
            let value: String = required(args, kwargs, 1, "value")?;
            refs::set_refs(&handle, &key, &value)?;
            Ok(Value::Null)
        }
        "remove_ref" => {
            let key: String = required(args, kwargs, 0, "key")?;
            refs::remove_ref(&handle, &key)?;
            Ok(Value::Null)
        }
        "fetch" => {
            let url: String = required(args, kwargs, 0, "url")?;
            let apply_refs: bool = optional_or(args, kwargs, 1, "apply_refs", true)?;
            let refs_filter: Option<Vec<String>> = optional(args, kwargs, 2, "refs")?;
            let result = remote::fetch(&handle, &url, apply_refs, refs_filter.as_deref())?;
            Ok(json!(result))
        }
        "push" => {
            let url: String = required(args, kwargs, 0, "url")?;
            let refspecs: Vec<String> = required(args, kwargs, 1, "refspecs")?;
            remote::push(&handle, &url, &refspecs)?;
            Ok(Value::Null)
        }
        "clone" => {
            let url: String = required(args, kwargs, 0, "url")?;
            let valid_refs: Vec<String> = required(args, kwargs, 1, "valid_refs")?;
            let deferred: String = optional_or(args, kwargs, 2, "deferred", "^{}".to_string())?;
            let update_after_clone: bool = optional_or(args, kwargs, 3, "update_after_clone", false)?;
            remote::clone(&handle, &url, &valid_refs, &deferred, update_after_clone)?;
            Ok(Value::Null)
        }
        "commit" => {
            let data: tree::CommitData = required(args, kwargs, 0, "data")?;
            let branch: String = required(args, kwargs, 1, "branch")?;
            let base_tree: Option<String> = optional(args, kwargs, 2, "base_tree")?;
            let updated: Vec<tree::UpdatedNode> = optional_or(args, kwargs, 3, "updated", Vec::new())?;
            let removed: Vec<String> = optional_or(args, kwargs, 4, "removed", Vec::new())?;
            Ok(json!(tree::commit(&handle, data, &branch, base_tree, &updated, &removed)?))
        }
        "tree_items" => {
            let tree_id: String = required(args, kwargs, 0, "tree_id")?;
            Ok(json!(tree::tree_items(&handle, &tree_id)?))
        }
        "tree_changes" => {
            let source_id: Option<String> = optional(args, kwargs, 0, "source_id")?;
            let target_id: String = required(args, kwargs, 1, "target_id")?;
            Ok(json!(tree::tree_changes(&handle, source_id.as_deref(), &target_id)?))
        }
        "assert_correct_path" => {
            objects::assert_correct_path(&wire.path)?;
            Ok(Value::Null)
        }
        _ => Err(VcsError::new(ErrorKind::Error, format!("unknown git method: {method}"))),
    }
}
