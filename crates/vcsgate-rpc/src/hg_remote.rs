//! Dispatch table for the `hg` backend, matching `HgRemote`'s method
//! surface in `original_source/vcsserver/hg.py`.

use std::collections::HashMap;

use serde_json::{json, Value};

use vcsgate_core::{ErrorKind, VcsError, VcsResult, Wire};
use vcsgate_hg::{archive, bulk, check_url, config, ctx, diff, file, largefiles, mutate, refs, revset, HgFactory};

use crate::args::{optional, optional_or, required, wire_required};

pub async fn dispatch(
    factory: &HgFactory,
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
    let handle = factory.repo(&wire).await?;

    match method {
        "bulk_request" => {
            let rev: String = required(args, kwargs, 0, "rev")?;
            let pre_load: Vec<String> = optional_or(args, kwargs, 1, "pre_load", Vec::new())?;
            Ok(json!(bulk::bulk_request(factory, &handle, &rev, &pre_load).await?))
        }
        "ctx_branch" => {
            let rev: String = required(args, kwargs, 0, "revision")?;
            Ok(json!(ctx::ctx_branch(factory, &handle, &rev).await?))
        }
        "ctx_children" => {
            let rev: String = required(args, kwargs, 0, "revision")?;
            Ok(json!(ctx::ctx_children(factory, &handle, &rev).await?))
        }
        "ctx_date" => {
            let rev: String = required(args, kwargs, 0, "revision")?;
            Ok(json!(ctx::ctx_date(factory, &handle, &rev).await?))
        }
        "ctx_description" => {
            let rev: String = required(args, kwargs, 0, "revision")?;
            Ok(json!(ctx::ctx_description(factory, &handle, &rev).await?))
        }
        "ctx_user" => {
            let rev: String = required(args, kwargs, 0, "revision")?;
            Ok(json!(ctx::ctx_user(factory, &handle, &rev).await?))
        }
        "ctx_files" => {
            let rev: String = required(args, kwargs, 0, "revision")?;
            Ok(json!(ctx::ctx_files(factory, &handle, &rev).await?))
        }
        "ctx_list" => {
            let rev: String = required(args, kwargs, 0, "revision")?;
            Ok(json!(ctx::ctx_list(factory, &handle, &rev).await?))
        }
        "ctx_parents" => {
            let rev: String = required(args, kwargs, 0, "revision")?;
            Ok(json!(ctx::ctx_parents(factory, &handle, &rev).await?))
        }
        "ctx_status" => {
            let rev: String = required(args, kwargs, 0, "revision")?;
            Ok(json!(ctx::ctx_status(factory, &handle, &rev).await?))
        }
        "diff" => {
            let rev1: String = required(args, kwargs, 0, "rev1")?;
            let rev2: String = required(args, kwargs, 1, "rev2")?;
            let file_filter: Option<String> = optional(args, kwargs, 2, "file_filter")?;
            let opt_git: bool = optional_or(args, kwargs, 3, "opt_git", true)?;
            let opt_ignorews: bool = optional_or(args, kwargs, 4, "opt_ignorews", false)?;
            let context: usize = optional_or(args, kwargs, 5, "context", 3)?;
            let out = diff::diff(factory, &handle, &rev1, &rev2, file_filter.as_deref(), opt_git, opt_ignorews, context).await?;
            Ok(json!(crate::b64::encode(out)))
        }
        "ctx_diff" => {
            let revision: String = required(args, kwargs, 0, "revision")?;
            let git: bool = optional_or(args, kwargs, 1, "git", true)?;
            let ignore_whitespace: bool = optional_or(args, kwargs, 2, "ignore_whitespace", false)?;
            let context: usize = optional_or(args, kwargs, 3, "context", 3)?;
            let out = diff::ctx_diff(factory, &handle, &revision, git, ignore_whitespace, context).await?;
            Ok(json!(crate::b64::encode(out)))
        }
        "file_history" => {
            let revision: String = required(args, kwargs, 0, "revision")?;
            let path: String = required(args, kwargs, 1, "path")?;
            let limit: usize = optional_or(args, kwargs, 2, "limit", 0)?;
            Ok(json!(file::file_history(factory, &handle, &revision, &path, limit).await?))
        }
        "file_history_untill" => {
            let revision: String = required(args, kwargs, 0, "revision")?;
            let path: String = required(args, kwargs, 1, "path")?;
            let limit: usize = optional_or(args, kwargs, 2, "limit", 0)?;
            Ok(json!(file::file_history_untill(factory, &handle, &revision, &path, limit).await?))
        }
        "fctx_annotate" => {
            let revision: String = required(args, kwargs, 0, "revision")?;
            let path: String = required(args, kwargs, 1, "path")?;
            Ok(json!(file::fctx_annotate(factory, &handle, &revision, &path).await?))
        }
        "fctx_data" => {
            let revision: String = required(args, kwargs, 0, "revision")?;
            let path: String = required(args, kwargs, 1, "path")?;
            Ok(json!(crate::b64::encode(file::fctx_data(factory, &handle, &revision, &path).await?)))
        }
        "fctx_size" => {
            let revision: String = required(args, kwargs, 0, "revision")?;
            let path: String = required(args, kwargs, 1, "path")?;
            Ok(json!(file::fctx_size(factory, &handle, &revision, &path).await?))
        }
        "fctx_flags" => {
            let revision: String = required(args, kwargs, 0, "revision")?;
            let path: String = required(args, kwargs, 1, "path")?;
            Ok(json!(file::fctx_flags(factory, &handle, &revision, &path).await?))
        }
        "clone" => {
            let source: String = required(args, kwargs, 0, "source")?;
            let dest: std::path::PathBuf = required(args, kwargs, 1, "dest")?;
            let update_after_clone: bool = optional_or(args, kwargs, 2, "update_after_clone", false)?;
            let hooks: bool = optional_or(args, kwargs, 3, "hooks", true)?;
            mutate::clone(factory, &handle, &source, &dest, update_after_clone, hooks).await?;
            Ok(Value::Null)
        }
        "pull" => {
            let url: String = required(args, kwargs, 0, "url")?;
            let commit_ids: Vec<String> = optional_or(args, kwargs, 1, "commit_ids", Vec::new())?;
            mutate::pull(factory, &handle, &url, &commit_ids).await?;
            Ok(Value::Null)
        }
        "pull_cmd" => {
            let source: String = required(args, kwargs, 0, "source")?;
            let bookmark: Option<String> = optional(args, kwargs, 1, "bookmark")?;
            let branch: Option<String> = optional(args, kwargs, 2, "branch")?;
            let revision: Option<String> = optional(args, kwargs, 3, "revision")?;
            let hooks: bool = optional_or(args, kwargs, 4, "hooks", true)?;
            let opts = mutate::PullCmdOpts { bookmark, branch, revision };
            mutate::pull_cmd(factory, &handle, &source, opts, hooks).await?;
            Ok(Value::Null)
        }
        "push" => {
            let revisions: Vec<String> = optional_or(args, kwargs, 0, "revisions", Vec::new())?;
            let dest_path: String = required(args, kwargs, 1, "dest_path")?;
            let hooks: bool = optional_or(args, kwargs, 2, "hooks", true)?;
            let push_branches: bool = optional_or(args, kwargs, 3, "push_branches", false)?;
            mutate::push(factory, &handle, &revisions, &dest_path, hooks, push_branches).await?;
            Ok(Value::Null)
        }
        "update" => {
            let node: Option<String> = optional(args, kwargs, 0, "node")?;
            let clean: bool = optional_or(args, kwargs, 1, "clean", false)?;
            mutate::update(factory, &handle, node.as_deref(), clean).await?;
            Ok(Value::Null)
        }
        "merge" => {
            let revision: String = required(args, kwargs, 0, "revision")?;
            mutate::merge(factory, &handle, &revision).await?;
            Ok(Value::Null)
        }
        "commit" => {
            let message: String = required(args, kwargs, 0, "message")?;
            let username: String = required(args, kwargs, 1, "username")?;
            mutate::commit(factory, &handle, &message, &username).await?;
            Ok(Value::Null)
        }
        "rebase" => {
            let source: Option<String> = optional(args, kwargs, 0, "source")?;
            let dest: Option<String> = optional(args, kwargs, 1, "dest")?;
            let abort: bool = optional_or(args, kwargs, 2, "abort", false)?;
            mutate::rebase(factory, &handle, source.as_deref(), dest.as_deref(), abort).await?;
            Ok(Value::Null)
        }
        "strip" => {
            let revision: String = required(args, kwargs, 0, "revision")?;
            let update: bool = optional_or(args, kwargs, 1, "update", false)?;
            let backup: bool = optional_or(args, kwargs, 2, "backup", true)?;
            mutate::strip(factory, &handle, &revision, update, backup).await?;
            Ok(Value::Null)
        }
        "tag" => {
            let name: String = required(args, kwargs, 0, "name")?;
            let revision: String = required(args, kwargs, 1, "revision")?;
            let message: String = required(args, kwargs, 2, "message")?;
            let local: bool = optional_or(args, kwargs, 3, "local", false)?;
            let user: String = required(args, kwargs, 4, "user")?;
            let tag_time: i64 = required(args, kwargs, 5, "tag_time")?;
            let tag_timezone: i32 = required(args, kwargs, 6, "tag_timezone")?;
            mutate::tag(factory, &handle, &name, &revision, &message, local, &user, tag_time, tag_timezone).await?;
            Ok(Value::Null)
        }
        "bookmark" => {
            let bookmark: String = required(args, kwargs, 0, "bookmark")?;
            let revision: Option<String> = optional(args, kwargs, 1, "revision")?;
            mutate::bookmark(factory, &handle, &bookmark, revision.as_deref()).await?;
            Ok(Value::Null)
        }
        "commitctx" => {
            let message: String = required(args, kwargs, 0, "message")?;
            let parents: Vec<String> = required(args, kwargs, 1, "parents")?;
            let commit_time: i64 = required(args, kwargs, 2, "commit_time")?;
            let commit_timezone: i32 = required(args, kwargs, 3, "commit_timezone")?;
            let user: String = required(args, kwargs, 4, "user")?;
            let removed: Vec<String> = optional_or(args, kwargs, 5, "removed", Vec::new())?;
            let updated_b64: Vec<(String, String)> = optional_or(args, kwargs, 6, "updated", Vec::new())?;
            let mut updated = Vec::with_capacity(updated_b64.len());
            for (path, content) in updated_b64 {
                let content = crate::b64::decode(&content)
                    .map_err(|e| VcsError::with_source(ErrorKind::Requirement, "updated file content is not valid base64", e))?;
                updated.push((path, content));
            }
            let node = mutate::commitctx(factory, &handle, &message, &parents, commit_time, commit_timezone, &user, &removed, &updated).await?;
            Ok(json!(node))
        }
        "bookmarks" => Ok(json!(refs::bookmarks(factory, &handle).await?)),
        "branches" => {
            let normal: bool = optional_or(args, kwargs, 0, "normal", true)?;
            let closed: bool = optional_or(args, kwargs, 1, "closed", true)?;
            Ok(json!(refs::branches(factory, &handle, normal, closed).await?))
        }
        "tags" => Ok(json!(refs::tags(factory, &handle).await?)),
        "heads" => {
            let branch: Option<String> = optional(args, kwargs, 0, "branch")?;
            Ok(json!(refs::heads(factory, &handle, branch.as_deref()).await?))
        }
        "identify" => Ok(json!(refs::identify(factory, &handle).await?)),
        "ancestor" => {
            let revision1: String = required(args, kwargs, 0, "revision1")?;
            let revision2: String = required(args, kwargs, 1, "revision2")?;
            Ok(json!(refs::ancestor(factory, &handle, &revision1, &revision2).await?))
        }
        "lookup" => {
            let revision: String = required(args, kwargs, 0, "revision")?;
            let both: bool = optional_or(args, kwargs, 1, "both", false)?;
            let (node, rev) = revset::lookup(factory, &handle, &revision, both).await?;
            Ok(json!({ "node": node, "rev": rev }))
        }
        "revision" => {
            let rev: String = required(args, kwargs, 0, "rev")?;
            Ok(json!(revset::revision(factory, &handle, &rev).await?))
        }
        "rev_range" => {
            let filter: String = required(args, kwargs, 0, "filter")?;
            Ok(json!(revset::rev_range(factory, &handle, &filter).await?))
        }
        "rev_range_hash" => {
            let node: String = required(args, kwargs, 0, "node")?;
            Ok(json!(revset::rev_range_hash(factory, &handle, &node).await?))
        }
        "revs_from_revspec" => {
            let rev_spec: String = required(args, kwargs, 0, "rev_spec")?;
            let other_path: Option<std::path::PathBuf> = optional(args, kwargs, 1, "other_path")?;
            Ok(json!(revset::revs_from_revspec(factory, &handle, &rev_spec, other_path.as_deref()).await?))
        }
        "get_config_value" => {
            let section: String = required(args, kwargs, 0, "section")?;
            let name: String = required(args, kwargs, 1, "name")?;
            Ok(json!(config::get_config_value(factory, &handle, &section, &name).await?))
        }
        "get_config_bool" => {
            let section: String = required(args, kwargs, 0, "section")?;
            let name: String = required(args, kwargs, 1, "name")?;
            Ok(json!(config::get_config_bool(factory, &handle, &section, &name).await?))
        }
        "get_config_list" => {
            let section: String = required(args, kwargs, 0, "section")?;
            let name: String = required(args, kwargs, 1, "name")?;
            Ok(json!(config::get_config_list(factory, &handle, &section, &name).await?))
        }
        "archive_repo" => {
            let archive_path: std::path::PathBuf = required(args, kwargs, 0, "archive_path")?;
            let kind: String = required(args, kwargs, 1, "kind")?;
            let files: Vec<ArchiveFileArg> = required(args, kwargs, 2, "files")?;
            let files: Vec<archive::ArchiveFile> = files
                .into_iter()
                .map(|f| -> VcsResult<archive::ArchiveFile> {
                    Ok(archive::ArchiveFile {
                        path: f.path,
                        mode: f.mode,
                        is_link: f.is_link,
                        content: crate::b64::decode(&f.content)
                            .map_err(|e| VcsError::with_source(ErrorKind::Requirement, "archive file content is not valid base64", e))?,
                    })
                })
                .collect::<VcsResult<Vec<_>>>()?;
            archive::archive_repo(&archive_path, &kind, &files).await?;
            Ok(Value::Null)
        }
        "is_large_file" => {
            let path: String = required(args, kwargs, 0, "path")?;
            Ok(json!(largefiles::is_large_file(&path)))
        }
        "largefiles_in_store" => {
            let sha: String = required(args, kwargs, 0, "sha")?;
            Ok(json!(largefiles::in_store(&handle, &sha)?))
        }
        "largefiles_in_user_cache" => {
            let sha: String = required(args, kwargs, 0, "sha")?;
            Ok(json!(largefiles::in_user_cache(factory, &handle, &sha).await?))
        }
        "largefiles_link" => {
            let sha: String = required(args, kwargs, 0, "sha")?;
            let path: std::path::PathBuf = required(args, kwargs, 1, "path")?;
            largefiles::link(factory, &handle, &sha, &path).await?;
            Ok(Value::Null)
        }
        _ => Err(VcsError::new(ErrorKind::Error, format!("unknown hg method: {method}"))),
    }
}

#[derive(serde::Deserialize)]
struct ArchiveFileArg {
    path: String,
    mode: u32,
    is_link: bool,
    content: String,
}
