//! Per-changeset ("ctx") introspection: branch, children, date,
//! description, files, parents, status, user. Each maps to a single `hg
//! log`/`hg parents`/`hg status` invocation with an explicit template,
//! since there is no in-process changectx object to query directly.

use vcsgate_core::{ErrorKind, VcsError, VcsResult};

use crate::cli::to_text;
use crate::handle::HgRepoHandle;
use crate::HgFactory;

async fn log_template(factory: &HgFactory, handle: &HgRepoHandle, rev: &str, template: &str) -> VcsResult<String> {
    let args = vec![
        "log".to_string(),
        "-r".to_string(),
        rev.to_string(),
        "--template".to_string(),
        template.to_string(),
    ];
    let out = factory
        .cli()
        .run(Some(&handle.path), &args, &handle.config, true)
        .await?;
    Ok(to_text(&out))
}

pub async fn ctx_branch(factory: &HgFactory, handle: &HgRepoHandle, rev: &str) -> VcsResult<String> {
    log_template(factory, handle, rev, "{branch}").await
}

pub async fn ctx_children(factory: &HgFactory, handle: &HgRepoHandle, rev: &str) -> VcsResult<Vec<i64>> {
    let args = vec![
        "log".to_string(),
        "-r".to_string(),
        format!("children({rev})"),
        "--template".to_string(),
        "{rev}\n".to_string(),
    ];
    let out = factory
        .cli()
        .run(Some(&handle.path), &args, &handle.config, true)
        .await?;
    parse_revs(&out)
}

pub async fn ctx_date(factory: &HgFactory, handle: &HgRepoHandle, rev: &str) -> VcsResult<(i64, i32)> {
    let text = log_template(factory, handle, rev, "{date|hgdate}").await?;
    let mut parts = text.split_whitespace();
    let time = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| parse_error(&text))?;
    let tz = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| parse_error(&text))?;
    Ok((time, tz))
}

pub async fn ctx_description(factory: &HgFactory, handle: &HgRepoHandle, rev: &str) -> VcsResult<String> {
    log_template(factory, handle, rev, "{desc}").await
}

pub async fn ctx_user(factory: &HgFactory, handle: &HgRepoHandle, rev: &str) -> VcsResult<String> {
    log_template(factory, handle, rev, "{author}").await
}

pub async fn ctx_files(factory: &HgFactory, handle: &HgRepoHandle, rev: &str) -> VcsResult<Vec<String>> {
    let text = log_template(factory, handle, rev, "{files % '{file}\\n'}").await?;
    Ok(lines(&text))
}

/// `list(ctx)`: every path in the revision's manifest, not just the ones it
/// touched.
pub async fn ctx_list(factory: &HgFactory, handle: &HgRepoHandle, rev: &str) -> VcsResult<Vec<String>> {
    let args = vec!["files".to_string(), "-r".to_string(), rev.to_string()];
    let out = factory
        .cli()
        .run(Some(&handle.path), &args, &handle.config, true)
        .await?;
    Ok(lines(&to_text(&out)))
}

pub async fn ctx_parents(factory: &HgFactory, handle: &HgRepoHandle, rev: &str) -> VcsResult<Vec<i64>> {
    let args = vec![
        "parents".to_string(),
        "-r".to_string(),
        rev.to_string(),
        "--template".to_string(),
        "{rev}\n".to_string(),
    ];
    let out = factory
        .cli()
        .run(Some(&handle.path), &args, &handle.config, true)
        .await?;
    parse_revs(&out)
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct StatusEntry {
    pub change: char,
    pub path: String,
}

/// The changes introduced by `rev` relative to its first parent, equivalent
/// to `repo[ctx.p1().node()].status(other=ctx.node())`.
pub async fn ctx_status(factory: &HgFactory, handle: &HgRepoHandle, rev: &str) -> VcsResult<Vec<StatusEntry>> {
    let args = vec!["status".to_string(), "--change".to_string(), rev.to_string()];
    let out = factory
        .cli()
        .run(Some(&handle.path), &args, &handle.config, true)
        .await?;

    let mut entries = Vec::new();
    for line in lines(&to_text(&out)) {
        let mut chars = line.chars();
        let Some(change) = chars.next() else { continue };
        let path = chars.as_str().trim_start().to_string();
        entries.push(StatusEntry { change, path });
    }
    Ok(entries)
}

fn lines(text: &str) -> Vec<String> {
    text.lines().filter(|l| !l.is_empty()).map(str::to_string).collect()
}

fn parse_revs(out: &[u8]) -> VcsResult<Vec<i64>> {
    to_text(out)
        .lines()
        .filter(|l| !l.is_empty())
        .map(|l| l.parse::<i64>().map_err(|_| parse_error(l)))
        .collect()
}

fn parse_error(text: &str) -> VcsError {
    VcsError::new(ErrorKind::Error, format!("could not parse hg output: {text:?}"))
}
