//! Repository configuration lookups: `get_config_value`, `get_config_bool`,
//! `get_config_list`, backed by `hg config <section>.<name>` rather than
//! `repo.ui.config*`, since there is no `ui` object to query directly.

use vcsgate_core::{ErrorKind, VcsError, VcsResult};

use crate::cli::to_text;
use crate::handle::HgRepoHandle;
use crate::HgFactory;

async fn raw_config(
    factory: &HgFactory,
    handle: &HgRepoHandle,
    section: &str,
    name: &str,
) -> VcsResult<Option<String>> {
    let args = vec!["config".to_string(), format!("{section}.{name}")];
    match factory.cli().run(Some(&handle.path), &args, &handle.config, true).await {
        Ok(out) => Ok(Some(to_text(&out))),
        Err(e) if e.kind() == ErrorKind::Abort => Ok(None),
        Err(e) => Err(e),
    }
}

pub async fn get_config_value(
    factory: &HgFactory,
    handle: &HgRepoHandle,
    section: &str,
    name: &str,
) -> VcsResult<Option<String>> {
    raw_config(factory, handle, section, name).await
}

/// Mirrors `ui.configbool`'s accepted truthy/falsy spellings.
pub async fn get_config_bool(
    factory: &HgFactory,
    handle: &HgRepoHandle,
    section: &str,
    name: &str,
) -> VcsResult<bool> {
    let value = raw_config(factory, handle, section, name).await?;
    Ok(match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("1" | "yes" | "true" | "on" | "always") => true,
        Some("0" | "no" | "false" | "off" | "never" | "") | None => false,
        Some(other) => {
            return Err(VcsError::new(
                ErrorKind::Error,
                format!("{section}.{name} is not a boolean: {other}"),
            ))
        }
    })
}

/// Mirrors `ui.configlist`'s comma/whitespace-separated splitting.
pub async fn get_config_list(
    factory: &HgFactory,
    handle: &HgRepoHandle,
    section: &str,
    name: &str,
) -> VcsResult<Vec<String>> {
    let value = raw_config(factory, handle, section, name).await?;
    Ok(match value {
        Some(value) => value
            .split([',', ' ', '\t'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    })
}
