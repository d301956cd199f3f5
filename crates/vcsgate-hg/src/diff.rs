//! Unified diff generation: `diff` (between two arbitrary revisions) and
//! `ctx_diff` (a single changeset against its parent), both backed by
//! `hg diff`'s own `--git`/`--ignore-all-space`/`-U` flags rather than a
//! reimplementation, since Mercurial's diff engine is only reachable here
//! through the CLI anyway.

use vcsgate_core::VcsResult;

use crate::handle::HgRepoHandle;
use crate::HgFactory;

fn common_flags(git: bool, ignore_whitespace: bool, context: usize) -> Vec<String> {
    let mut flags = Vec::new();
    if git {
        flags.push("--git".to_string());
    }
    if ignore_whitespace {
        flags.push("--ignore-all-space".to_string());
    }
    flags.push("-U".to_string());
    flags.push(context.to_string());
    flags
}

pub async fn diff(
    factory: &HgFactory,
    handle: &HgRepoHandle,
    rev1: &str,
    rev2: &str,
    file_filter: Option<&str>,
    opt_git: bool,
    opt_ignorews: bool,
    context: usize,
) -> VcsResult<Vec<u8>> {
    let mut args = vec!["diff".to_string(), "-r".to_string(), rev1.to_string(), "-r".to_string(), rev2.to_string()];
    args.extend(common_flags(opt_git, opt_ignorews, context));
    if let Some(path) = file_filter {
        args.push("--".to_string());
        args.push(path.to_string());
    }

    factory.cli().run(Some(&handle.path), &args, &handle.config, true).await
}

pub async fn ctx_diff(
    factory: &HgFactory,
    handle: &HgRepoHandle,
    revision: &str,
    git: bool,
    ignore_whitespace: bool,
    context: usize,
) -> VcsResult<Vec<u8>> {
    let mut args = vec!["diff".to_string(), "--change".to_string(), revision.to_string()];
    args.extend(common_flags(git, ignore_whitespace, context));

    factory.cli().run(Some(&handle.path), &args, &handle.config, true).await
}
