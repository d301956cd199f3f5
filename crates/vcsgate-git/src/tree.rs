//! Tree and commit construction.
//!
//! `commit` reimplements `vcsserver/git.py`'s incremental tree builder: dig
//! for the deepest existing subtree, create any missing subtrees bottom-up,
//! then rewrite every ancestor on the way back to the root. `git2`'s
//! `TreeBuilder` makes the ancestor rewrite naturally recursive rather than
//! the original's explicit ancestor list + reversed zip, but the result is
//! the same bottom-up write order and the same empty-parent pruning on
//! removal.

use git2::{Oid, Repository, Signature, Time, Tree};
use serde::{Deserialize, Serialize};

use crate::error::kind_for;
use crate::handle::GitRepoHandle;
use vcsgate_core::{translate, ErrorKind, VcsError, VcsResult};

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatedNode {
    pub path: String,
    #[serde(with = "vcsgate_core::serde_b64")]
    pub content: Vec<u8>,
    pub mode: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitData {
    pub message: String,
    pub author: String,
    pub author_email: String,
    pub author_time: i64,
    pub author_timezone: i32,
    pub committer: Option<String>,
    pub committer_email: Option<String>,
    pub commit_time: Option<i64>,
    pub commit_timezone: Option<i32>,
    #[serde(default)]
    pub parents: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TreeItem {
    pub path: String,
    pub mode: i32,
    pub sha: String,
    pub item_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TreeChange {
    pub old_path: Option<String>,
    pub new_path: Option<String>,
    pub old_mode: Option<i32>,
    pub new_mode: Option<i32>,
    pub old_sha: Option<String>,
    pub new_sha: Option<String>,
}

const GITLINK_MODE: i32 = 0o160000;
const DIR_MODE: i32 = 0o040000;

fn path_components(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn subtree_of<'repo>(
    repo: &'repo Repository,
    tree: Option<&Tree<'repo>>,
    name: &str,
) -> Option<Tree<'repo>> {
    let tree = tree?;
    let entry = tree.get_name(name)?;
    let obj = entry.to_object(repo).ok()?;
    obj.into_tree().ok()
}

fn insert_path(
    repo: &Repository,
    tree: Option<&Tree>,
    components: &[&str],
    oid: Oid,
    mode: i32,
) -> Result<Oid, git2::Error> {
    let mut builder = repo.treebuilder(tree)?;

    if components.len() == 1 {
        builder.insert(components[0], oid, mode)?;
    } else {
        let name = components[0];
        let existing = subtree_of(repo, tree, name);
        let new_subtree = insert_path(repo, existing.as_ref(), &components[1..], oid, mode)?;
        builder.insert(name, new_subtree, DIR_MODE)?;
    }

    builder.write()
}

/// Removes `components` from `tree`, pruning empty ancestor trees on the way
/// back up. Returns `None` when the resulting tree (or subtree) has no
/// remaining entries, matching the original's "stop as soon as a parent
/// still has entries" early exit.
fn remove_path(
    repo: &Repository,
    tree: &Tree,
    components: &[&str],
) -> Result<Option<Oid>, git2::Error> {
    let mut builder = repo.treebuilder(Some(tree))?;
    let name = components[0];

    if components.len() == 1 {
        let _ = builder.remove(name);
    } else if let Some(subtree) = subtree_of(repo, Some(tree), name) {
        match remove_path(repo, &subtree, &components[1..])? {
            Some(new_subtree) => {
                builder.insert(name, new_subtree, DIR_MODE)?;
            }
            None => {
                let _ = builder.remove(name);
            }
        }
    }

    if builder.len() == 0 {
        Ok(None)
    } else {
        Ok(Some(builder.write()?))
    }
}

fn empty_tree_oid(repo: &Repository) -> Result<Oid, git2::Error> {
    repo.treebuilder(None)?.write()
}

pub fn commit(
    handle: &GitRepoHandle,
    data: CommitData,
    branch: &str,
    base_tree: Option<String>,
    updated: &[UpdatedNode],
    removed: &[String],
) -> VcsResult<String> {
    let result: Result<String, git2::Error> = handle.with_repo(|repo| {
        let mut current_tree = match &base_tree {
            Some(id) => Some(repo.find_tree(Oid::from_str(id)?)?),
            None => None,
        };

        for node in updated {
            let blob_oid = repo.blob(&node.content)?;
            let components = path_components(&node.path);
            let new_tree = insert_path(repo, current_tree.as_ref(), &components, blob_oid, node.mode)?;
            current_tree = Some(repo.find_tree(new_tree)?);
        }

        for path in removed {
            let components = path_components(path);
            if let Some(tree) = &current_tree {
                let new_tree = remove_path(repo, tree, &components)?;
                current_tree = Some(repo.find_tree(new_tree.unwrap_or(empty_tree_oid(repo)?))?);
            }
        }

        let final_tree = match current_tree {
            Some(t) => t,
            None => repo.find_tree(empty_tree_oid(repo)?)?,
        };

        let author_sig = Signature::new(
            &data.author,
            &data.author_email,
            &Time::new(data.author_time, data.author_timezone),
        )?;
        let committer_sig = match (
            &data.committer,
            &data.committer_email,
            data.commit_time,
            data.commit_timezone,
        ) {
            (Some(name), Some(email), Some(time), Some(tz)) => {
                Signature::new(name, email, &Time::new(time, tz))?
            }
            _ => author_sig.clone(),
        };

        let parents: Vec<git2::Commit> = data
            .parents
            .iter()
            .map(|p| Oid::from_str(p).and_then(|oid| repo.find_commit(oid)))
            .collect::<Result<_, _>>()?;
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

        let commit_oid = repo.commit(
            None,
            &author_sig,
            &committer_sig,
            &data.message,
            &final_tree,
            &parent_refs,
        )?;

        let ref_name = format!("refs/heads/{branch}");
        repo.reference(&ref_name, commit_oid, true, "gateway commit")?;

        Ok(commit_oid.to_string())
    });

    translate(kind_for, result)
}

pub fn tree_items(handle: &GitRepoHandle, tree_id: &str) -> VcsResult<Vec<TreeItem>> {
    let result: Result<Vec<TreeItem>, git2::Error> = handle.with_repo(|repo| {
        let oid = Oid::from_str(tree_id)?;
        let tree = repo.find_tree(oid)?;

        let mut items = Vec::with_capacity(tree.len());
        for entry in tree.iter() {
            let mode = entry.filemode();
            let item_type = if mode == GITLINK_MODE {
                "link".to_string()
            } else {
                entry
                    .kind()
                    .map(|k| k.str().to_string())
                    .unwrap_or_else(|| "unknown".to_string())
            };

            items.push(TreeItem {
                path: entry.name().unwrap_or_default().to_string(),
                mode,
                sha: entry.id().to_string(),
                item_type,
            });
        }
        Ok(items)
    });

    translate(kind_for, result)
}

pub fn tree_changes(
    handle: &GitRepoHandle,
    source_id: Option<&str>,
    target_id: &str,
) -> VcsResult<Vec<TreeChange>> {
    let result: Result<Vec<TreeChange>, git2::Error> = handle.with_repo(|repo| {
        let source_tree = source_id
            .map(|id| Oid::from_str(id).and_then(|oid| repo.find_tree(oid)))
            .transpose()?;
        let target_tree = repo.find_tree(Oid::from_str(target_id)?)?;

        let diff = repo.diff_tree_to_tree(source_tree.as_ref(), Some(&target_tree), None)?;

        let mut changes = Vec::new();
        for delta in diff.deltas() {
            let old_file = delta.old_file();
            let new_file = delta.new_file();

            changes.push(TreeChange {
                old_path: old_file.path().map(|p| p.to_string_lossy().into_owned()),
                new_path: new_file.path().map(|p| p.to_string_lossy().into_owned()),
                old_mode: if old_file.exists() {
                    Some(old_file.mode() as i32)
                } else {
                    None
                },
                new_mode: if new_file.exists() {
                    Some(new_file.mode() as i32)
                } else {
                    None
                },
                old_sha: if old_file.exists() {
                    Some(old_file.id().to_string())
                } else {
                    None
                },
                new_sha: if new_file.exists() {
                    Some(new_file.id().to_string())
                } else {
                    None
                },
            });
        }
        Ok(changes)
    });

    translate(kind_for, result)
}

pub fn missing_tree_error() -> VcsError {
    VcsError::new(ErrorKind::Lookup, "tree not found")
}
