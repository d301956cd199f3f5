//! File-level history and content: `file_history`, `file_history_untill`,
//! `fctx_annotate`, `fctx_data`, `fctx_flags`, `fctx_size`.

use vcsgate_core::{ErrorKind, VcsError, VcsResult};

use crate::cli::to_text;
use crate::handle::HgRepoHandle;
use crate::HgFactory;

async fn log_nodes(
    factory: &HgFactory,
    handle: &HgRepoHandle,
    revset: &str,
    limit: Option<usize>,
) -> VcsResult<Vec<String>> {
    let mut args = vec![
        "log".to_string(),
        "-r".to_string(),
        revset.to_string(),
        "--template".to_string(),
        "{node}\n".to_string(),
    ];
    if let Some(limit) = limit {
        args.push("--limit".to_string());
        args.push(limit.to_string());
    }
    let out = factory
        .cli()
        .run(Some(&handle.path), &args, &handle.config, true)
        .await?;
    Ok(to_text(&out).lines().filter(|l| !l.is_empty()).map(str::to_string).collect())
}

/// File revisions reaching `revision`, most recent first, capped at
/// `limit` (0 means unlimited), matching the original's walk of
/// `fctx.filelog()` reversed and filtered by `limit_rev >= obj.rev()`.
pub async fn file_history(
    factory: &HgFactory,
    handle: &HgRepoHandle,
    revision: &str,
    path: &str,
    limit: usize,
) -> VcsResult<Vec<String>> {
    let revset = format!("reverse(file('{path}') and ::{revision})");
    let limit = if limit == 0 { None } else { Some(limit) };
    log_nodes(factory, handle, &revset, limit).await
}

/// The last `limit` file revisions reaching `revision` (ascending order in
/// the filelog), reported most recent first, matching
/// `file_log[-limit:]` then `reversed(...)`.
pub async fn file_history_untill(
    factory: &HgFactory,
    handle: &HgRepoHandle,
    revision: &str,
    path: &str,
    limit: usize,
) -> VcsResult<Vec<String>> {
    let revset = if limit == 0 {
        format!("reverse(file('{path}') and ::{revision})")
    } else {
        format!("reverse(last(file('{path}') and ::{revision}, {limit}))")
    };
    log_nodes(factory, handle, &revset, None).await
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct AnnotateLine {
    pub line_no: usize,
    pub node: String,
    pub content: String,
}

/// Per-line blame for `path` as of `revision`. Relies on `hg`'s templated
/// annotate output (the `lines`/`node`/`lineno`/`line` keywords), with `\x01`
/// separating a record's fields and `\x02` separating records, avoiding any
/// ambiguity with file content that itself contains newlines.
pub async fn fctx_annotate(
    factory: &HgFactory,
    handle: &HgRepoHandle,
    revision: &str,
    path: &str,
) -> VcsResult<Vec<AnnotateLine>> {
    let template = "{lines % '{node}\\x01{lineno}\\x01{line}\\x02'}";
    let args = vec![
        "annotate".to_string(),
        "-r".to_string(),
        revision.to_string(),
        "--template".to_string(),
        template.to_string(),
        path.to_string(),
    ];
    let out = factory
        .cli()
        .run(Some(&handle.path), &args, &handle.config, true)
        .await?;
    let text = String::from_utf8_lossy(&out);

    let mut result = Vec::new();
    for (i, record) in text.split('\u{2}').filter(|r| !r.is_empty()).enumerate() {
        let mut fields = record.splitn(3, '\u{1}');
        let node = fields.next().unwrap_or_default().to_string();
        let line_no: usize = fields
            .next()
            .and_then(|s| s.parse().ok())
            .unwrap_or(i + 1);
        let content = fields.next().unwrap_or_default().trim_end_matches('\n').to_string();
        result.push(AnnotateLine { line_no, node, content });
    }
    Ok(result)
}

pub async fn fctx_data(
    factory: &HgFactory,
    handle: &HgRepoHandle,
    revision: &str,
    path: &str,
) -> VcsResult<Vec<u8>> {
    let args = vec!["cat".to_string(), "-r".to_string(), revision.to_string(), path.to_string()];
    factory.cli().run(Some(&handle.path), &args, &handle.config, true).await
}

pub async fn fctx_size(
    factory: &HgFactory,
    handle: &HgRepoHandle,
    revision: &str,
    path: &str,
) -> VcsResult<usize> {
    Ok(fctx_data(factory, handle, revision, path).await?.len())
}

/// The filelog flag string (`""`, `"x"` for executable, `"l"` for symlink),
/// looked up through `hg files`'s `{flags}` template keyword.
pub async fn fctx_flags(
    factory: &HgFactory,
    handle: &HgRepoHandle,
    revision: &str,
    path: &str,
) -> VcsResult<String> {
    let args = vec![
        "files".to_string(),
        "-r".to_string(),
        revision.to_string(),
        "--template".to_string(),
        "{path}\\x01{flags}\\x02".to_string(),
    ];
    let out = factory
        .cli()
        .run(Some(&handle.path), &args, &handle.config, true)
        .await?;
    let text = String::from_utf8_lossy(&out);

    for record in text.split('\u{2}').filter(|r| !r.is_empty()) {
        let mut fields = record.splitn(2, '\u{1}');
        if fields.next() == Some(path) {
            return Ok(fields.next().unwrap_or_default().to_string());
        }
    }

    Err(VcsError::new(ErrorKind::Lookup, format!("no such file: {path}")))
}
