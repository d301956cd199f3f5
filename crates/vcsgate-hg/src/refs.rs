//! Bookmarks, branches, tags, heads, identify and ancestor lookups.

use std::collections::HashMap;

use vcsgate_core::VcsResult;

use crate::cli::to_text;
use crate::handle::HgRepoHandle;
use crate::HgFactory;

const RECORD_SEP: char = '\u{2}';
const FIELD_SEP: char = '\u{1}';

fn split_records(text: &str) -> impl Iterator<Item = Vec<&str>> {
    text.split(RECORD_SEP)
        .filter(|r| !r.is_empty())
        .map(|r| r.split(FIELD_SEP).collect())
}

pub async fn bookmarks(factory: &HgFactory, handle: &HgRepoHandle) -> VcsResult<HashMap<String, String>> {
    let args = vec![
        "bookmarks".to_string(),
        "--template".to_string(),
        format!("{{bookmark}}{FIELD_SEP}{{node}}{RECORD_SEP}"),
    ];
    let out = factory
        .cli()
        .run(Some(&handle.path), &args, &handle.config, true)
        .await?;
    let text = String::from_utf8_lossy(&out).into_owned();

    Ok(split_records(&text)
        .filter_map(|fields| Some((fields.first()?.to_string(), fields.get(1)?.to_string())))
        .collect())
}

pub async fn branches(
    factory: &HgFactory,
    handle: &HgRepoHandle,
    normal: bool,
    closed: bool,
) -> VcsResult<HashMap<String, String>> {
    let args = vec![
        "branches".to_string(),
        "--closed".to_string(),
        "--template".to_string(),
        format!("{{branch}}{FIELD_SEP}{{node}}{FIELD_SEP}{{if(closed, \"1\", \"0\")}}{RECORD_SEP}"),
    ];
    let out = factory
        .cli()
        .run(Some(&handle.path), &args, &handle.config, true)
        .await?;
    let text = String::from_utf8_lossy(&out).into_owned();

    let mut out_map = HashMap::new();
    for fields in split_records(&text) {
        let (Some(branch), Some(node), Some(is_closed)) = (fields.first(), fields.get(1), fields.get(2)) else {
            continue;
        };
        let is_closed = *is_closed == "1";
        if (normal && !is_closed) || (closed && is_closed) {
            out_map.insert(branch.to_string(), node.to_string());
        }
    }
    Ok(out_map)
}

pub async fn tags(factory: &HgFactory, handle: &HgRepoHandle) -> VcsResult<HashMap<String, String>> {
    let args = vec![
        "tags".to_string(),
        "--template".to_string(),
        format!("{{tag}}{FIELD_SEP}{{node}}{RECORD_SEP}"),
    ];
    let out = factory
        .cli()
        .run(Some(&handle.path), &args, &handle.config, true)
        .await?;
    let text = String::from_utf8_lossy(&out).into_owned();

    Ok(split_records(&text)
        .filter_map(|fields| Some((fields.first()?.to_string(), fields.get(1)?.to_string())))
        .collect())
}

/// Returns the raw `hg heads --template '{node} '` output, same shape as
/// the original (which captures `commands.heads`'s write buffer verbatim
/// rather than parsing it).
pub async fn heads(factory: &HgFactory, handle: &HgRepoHandle, branch: Option<&str>) -> VcsResult<String> {
    let mut args = vec!["heads".to_string(), "--template".to_string(), "{node} ".to_string()];
    if let Some(branch) = branch {
        args.push(branch.to_string());
    }
    let out = factory
        .cli()
        .run(Some(&handle.path), &args, &handle.config, true)
        .await?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

pub async fn identify(factory: &HgFactory, handle: &HgRepoHandle) -> VcsResult<String> {
    let args = vec!["identify".to_string(), "--id".to_string(), "--debug".to_string()];
    let out = factory
        .cli()
        .run(Some(&handle.path), &args, &handle.config, true)
        .await?;
    Ok(to_text(&out))
}

pub async fn ancestor(
    factory: &HgFactory,
    handle: &HgRepoHandle,
    revision1: &str,
    revision2: &str,
) -> VcsResult<String> {
    let args = vec![
        "debugancestor".to_string(),
        revision1.to_string(),
        revision2.to_string(),
    ];
    let out = factory
        .cli()
        .run(Some(&handle.path), &args, &handle.config, true)
        .await?;
    Ok(to_text(&out))
}
