//! `revision_properties`/`node_properties`: `svnlook proplist` plus one
//! `propget` per name, since `svnlook` has no single "list names and
//! values" subcommand (`svn.fs.revision_proplist`/`svn.fs.node_proplist`
//! return the whole dict in one call in the original).

use std::collections::HashMap;

use vcsgate_core::VcsResult;

use crate::cli::{self, SvnCli};
use crate::handle::SvnRepoHandle;

fn prop_names(out: &[u8]) -> Vec<String> {
    cli::to_text(out)
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

pub async fn revision_properties(
    cli: &SvnCli,
    handle: &SvnRepoHandle,
    revision: i64,
) -> VcsResult<HashMap<String, String>> {
    let list = cli
        .svnlook(
            &handle.path,
            &["proplist".to_string(), "--revprop".to_string(), "-r".to_string(), revision.to_string()],
        )
        .await?;

    let mut props = HashMap::new();
    for name in prop_names(&list) {
        let value = cli
            .svnlook(
                &handle.path,
                &[
                    "propget".to_string(),
                    "--revprop".to_string(),
                    "-r".to_string(),
                    revision.to_string(),
                    name.clone(),
                ],
            )
            .await?;
        props.insert(name, cli::to_text(&value));
    }
    Ok(props)
}

pub async fn node_properties(
    cli: &SvnCli,
    handle: &SvnRepoHandle,
    path: &str,
    revision: i64,
) -> VcsResult<HashMap<String, String>> {
    let list = cli
        .svnlook(
            &handle.path,
            &["proplist".to_string(), "-r".to_string(), revision.to_string(), path.to_string()],
        )
        .await?;

    let mut props = HashMap::new();
    for name in prop_names(&list) {
        let value = cli
            .svnlook(
                &handle.path,
                &["propget".to_string(), "-r".to_string(), revision.to_string(), name.clone(), path.to_string()],
            )
            .await?;
        props.insert(name, cli::to_text(&value));
    }
    Ok(props)
}
