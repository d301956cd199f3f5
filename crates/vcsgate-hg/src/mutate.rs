//! Repository-mutating operations: clone, pull, push, update, merge,
//! commit, rebase, strip, tag, bookmark. All are plain `hg` subcommand
//! invocations; the interesting behavior lives in which flags are derived
//! from the caller's arguments.

use std::path::Path;

use vcsgate_core::{ErrorKind, VcsError, VcsResult};

use crate::cli::to_text;
use crate::handle::HgRepoHandle;
use crate::HgFactory;

pub async fn clone(
    factory: &HgFactory,
    handle: &HgRepoHandle,
    source: &str,
    dest: &Path,
    update_after_clone: bool,
    hooks: bool,
) -> VcsResult<()> {
    let mut args = vec!["clone".to_string()];
    if !update_after_clone {
        args.push("--noupdate".to_string());
    }
    args.push(source.to_string());
    args.push(dest.to_string_lossy().into_owned());

    factory.cli().run(None, &args, &handle.config, hooks).await?;
    Ok(())
}

pub async fn pull(
    factory: &HgFactory,
    handle: &HgRepoHandle,
    url: &str,
    commit_ids: &[String],
) -> VcsResult<()> {
    let mut args = vec!["pull".to_string()];
    for id in commit_ids {
        args.push("-r".to_string());
        args.push(id.clone());
    }
    args.push(url.to_string());

    factory.cli().run(Some(&handle.path), &args, &handle.config, true).await?;
    Ok(())
}

#[derive(Default)]
pub struct PullCmdOpts {
    pub bookmark: Option<String>,
    pub branch: Option<String>,
    pub revision: Option<String>,
}

pub async fn pull_cmd(
    factory: &HgFactory,
    handle: &HgRepoHandle,
    source: &str,
    opts: PullCmdOpts,
    hooks: bool,
) -> VcsResult<()> {
    let mut args = vec!["pull".to_string()];
    if let Some(bookmark) = opts.bookmark {
        args.push("-B".to_string());
        args.push(bookmark);
    }
    if let Some(branch) = opts.branch {
        args.push("-b".to_string());
        args.push(branch);
    }
    if let Some(revision) = opts.revision {
        args.push("-r".to_string());
        args.push(revision);
    }
    args.push(source.to_string());

    factory.cli().run(Some(&handle.path), &args, &handle.config, hooks).await?;
    Ok(())
}

pub async fn push(
    factory: &HgFactory,
    handle: &HgRepoHandle,
    revisions: &[String],
    dest_path: &str,
    hooks: bool,
    push_branches: bool,
) -> VcsResult<()> {
    let mut args = vec!["push".to_string()];
    for rev in revisions {
        args.push("-r".to_string());
        args.push(rev.clone());
    }
    if push_branches {
        args.push("--new-branch".to_string());
    }
    args.push(dest_path.to_string());

    factory.cli().run(Some(&handle.path), &args, &handle.config, hooks).await?;
    Ok(())
}

pub async fn update(
    factory: &HgFactory,
    handle: &HgRepoHandle,
    node: Option<&str>,
    clean: bool,
) -> VcsResult<()> {
    let mut args = vec!["update".to_string()];
    if clean {
        args.push("--clean".to_string());
    }
    if let Some(node) = node {
        args.push(node.to_string());
    }

    factory.cli().run(Some(&handle.path), &args, &handle.config, true).await?;
    Ok(())
}

pub async fn merge(factory: &HgFactory, handle: &HgRepoHandle, revision: &str) -> VcsResult<()> {
    let args = vec!["merge".to_string(), "-r".to_string(), revision.to_string()];
    let mut config = handle.config.clone();
    config.push(("ui".to_string(), "merge".to_string(), "internal:dump".to_string()));

    factory.cli().run(Some(&handle.path), &args, &config, true).await?;
    Ok(())
}

pub async fn commit(
    factory: &HgFactory,
    handle: &HgRepoHandle,
    message: &str,
    username: &str,
) -> VcsResult<()> {
    let args = vec!["commit".to_string(), "-m".to_string(), message.to_string()];
    let mut config = handle.config.clone();
    config.push(("ui".to_string(), "username".to_string(), username.to_string()));

    factory.cli().run(Some(&handle.path), &args, &config, true).await?;
    Ok(())
}

pub async fn rebase(
    factory: &HgFactory,
    handle: &HgRepoHandle,
    source: Option<&str>,
    dest: Option<&str>,
    abort: bool,
) -> VcsResult<()> {
    let mut args = vec!["rebase".to_string()];
    if abort {
        args.push("--abort".to_string());
    } else {
        args.push("--keep".to_string());
    }
    if let Some(source) = source {
        args.push("-s".to_string());
        args.push(source.to_string());
    }
    if let Some(dest) = dest {
        args.push("-d".to_string());
        args.push(dest.to_string());
    }
    let mut config = handle.config.clone();
    config.push(("ui".to_string(), "merge".to_string(), "internal:dump".to_string()));

    factory.cli().run(Some(&handle.path), &args, &config, true).await?;
    Ok(())
}

pub async fn strip(
    factory: &HgFactory,
    handle: &HgRepoHandle,
    revision: &str,
    update: bool,
    backup: bool,
) -> VcsResult<()> {
    let mut args = vec!["strip".to_string(), revision.to_string()];
    if !backup {
        args.push("--no-backup".to_string());
    }
    if !update {
        args.push("--keep".to_string());
    }

    factory.cli().run(Some(&handle.path), &args, &handle.config, true).await?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn tag(
    factory: &HgFactory,
    handle: &HgRepoHandle,
    name: &str,
    revision: &str,
    message: &str,
    local: bool,
    user: &str,
    tag_time: i64,
    tag_timezone: i32,
) -> VcsResult<()> {
    let mut args = vec![
        "tag".to_string(),
        name.to_string(),
        "-r".to_string(),
        revision.to_string(),
        "-m".to_string(),
        message.to_string(),
        "-u".to_string(),
        user.to_string(),
        "-d".to_string(),
        format!("{tag_time} {tag_timezone}"),
    ];
    if local {
        args.push("--local".to_string());
    }

    let result = factory.cli().run(Some(&handle.path), &args, &handle.config, true).await;
    result.map(|_| ()).map_err(|e| {
        if e.kind() == ErrorKind::Abort {
            VcsError::new(ErrorKind::Abort, "tag operation aborted")
        } else {
            e
        }
    })
}

pub async fn bookmark(
    factory: &HgFactory,
    handle: &HgRepoHandle,
    bookmark: &str,
    revision: Option<&str>,
) -> VcsResult<()> {
    let mut args = vec!["bookmark".to_string(), bookmark.to_string(), "--force".to_string()];
    if let Some(revision) = revision {
        args.push("-r".to_string());
        args.push(revision.to_string());
    }

    factory.cli().run(Some(&handle.path), &args, &handle.config, true).await?;
    Ok(())
}

/// A single-parent, working-copy-free commit. The original builds an
/// in-memory `memctx` with arbitrary parents and a `filectxfn` callback, a
/// shape with no CLI equivalent; this reproduces the common case (commit on
/// top of the current working parent) by updating to `parents[0]`, applying
/// `updated`/`removed` to the working directory, and running a normal `hg
/// commit`. Multi-parent (merge) commits are out of reach for a
/// process-based adapter and are rejected rather than silently mis-applied.
pub async fn commitctx(
    factory: &HgFactory,
    handle: &HgRepoHandle,
    message: &str,
    parents: &[String],
    commit_time: i64,
    commit_timezone: i32,
    user: &str,
    removed: &[String],
    updated: &[(String, Vec<u8>)],
) -> VcsResult<String> {
    if parents.len() > 1 {
        return Err(VcsError::new(
            ErrorKind::Unhandled,
            "commitctx with more than one parent is not supported by the process-based adapter",
        ));
    }

    if let Some(parent) = parents.first() {
        update(factory, handle, Some(parent), true).await?;
    }

    for path in removed {
        let full = handle.path.join(path);
        let _ = std::fs::remove_file(&full);
        let args = vec!["remove".to_string(), "--after".to_string(), "--force".to_string(), path.clone()];
        let _ = factory.cli().run(Some(&handle.path), &args, &handle.config, true).await;
    }

    for (path, content) in updated {
        let full = handle.path.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_error(e))?;
        }
        std::fs::write(&full, content).map_err(|e| io_error(e))?;
        let args = vec!["add".to_string(), path.clone()];
        factory.cli().run(Some(&handle.path), &args, &handle.config, true).await?;
    }

    let args = vec![
        "commit".to_string(),
        "-m".to_string(),
        message.to_string(),
        "-u".to_string(),
        user.to_string(),
        "-d".to_string(),
        format!("{commit_time} {commit_timezone}"),
    ];
    factory.cli().run(Some(&handle.path), &args, &handle.config, true).await?;

    let out = factory
        .cli()
        .run(
            Some(&handle.path),
            &["log".to_string(), "-r".to_string(), ".".to_string(), "--template".to_string(), "{node}".to_string()],
            &handle.config,
            true,
        )
        .await?;
    Ok(to_text(&out))
}

fn io_error(e: std::io::Error) -> VcsError {
    let err = VcsError::with_source(ErrorKind::Error, e.to_string(), e);
    err.log();
    err
}
