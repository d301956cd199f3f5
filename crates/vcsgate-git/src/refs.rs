//! Reference listing and mutation: `get_refs`/`set_refs`/`remove_ref` plus
//! `get_refs_path`, mirroring `vcsserver/git.py`'s thin wrappers around
//! dulwich's `repo.refs`.

use std::collections::HashMap;

use serde::Serialize;

use vcsgate_core::{translate, VcsResult};

use crate::error::kind_for;
use crate::handle::GitRepoHandle;

#[derive(Debug, Clone, Serialize)]
pub struct RefEntry {
    pub sha: String,
    pub ref_type: String,
}

/// Lists every ref, optionally filtered/renamed by `keys` (a list of
/// `(prefix, type)` pairs). A ref matching a prefix is reported under the
/// remainder of its name with the pair's declared type; `type == "T"` peels
/// tag objects down to the commit they point at, same as the original's
/// `repo.get_object(sha).id` peel.
pub fn get_refs(
    handle: &GitRepoHandle,
    keys: Option<&[(String, String)]>,
) -> VcsResult<HashMap<String, RefEntry>> {
    let result: Result<HashMap<String, RefEntry>, git2::Error> = handle.with_repo(|repo| {
        let mut out = HashMap::new();
        for reference in repo.references()? {
            let reference = reference?;
            let Some(name) = reference.name() else {
                continue;
            };
            let Some(oid) = reference.target() else {
                continue;
            };

            match keys {
                None => {
                    out.insert(
                        name.to_string(),
                        RefEntry {
                            sha: oid.to_string(),
                            ref_type: "H".to_string(),
                        },
                    );
                }
                Some(keys) => {
                    for (prefix, ref_type) in keys {
                        if let Some(rest) = name.strip_prefix(prefix.as_str()) {
                            let sha = if ref_type == "T" {
                                repo.find_object(oid, None)?.peel_to_commit()?.id().to_string()
                            } else {
                                oid.to_string()
                            };
                            out.insert(
                                rest.to_string(),
                                RefEntry {
                                    sha,
                                    ref_type: ref_type.clone(),
                                },
                            );
                            break;
                        }
                    }
                }
            }
        }
        Ok(out)
    });

    translate(kind_for, result)
}

pub fn get_refs_path(handle: &GitRepoHandle) -> VcsResult<String> {
    let result: Result<String, git2::Error> = handle.with_repo(|repo| {
        Ok(repo
            .path()
            .join("packed-refs")
            .parent()
            .unwrap_or_else(|| repo.path())
            .to_string_lossy()
            .into_owned())
    });
    translate(kind_for, result)
}

pub fn set_refs(handle: &GitRepoHandle, key: &str, value: &str) -> VcsResult<()> {
    let result: Result<(), git2::Error> = handle.with_repo(|repo| {
        let oid = git2::Oid::from_str(value)?;
        repo.reference(key, oid, true, "gateway set_refs")?;
        Ok(())
    });
    translate(kind_for, result)
}

pub fn remove_ref(handle: &GitRepoHandle, key: &str) -> VcsResult<()> {
    let result: Result<(), git2::Error> = handle.with_repo(|repo| {
        let mut reference = repo.find_reference(key)?;
        reference.delete()
    });
    translate(kind_for, result)
}
