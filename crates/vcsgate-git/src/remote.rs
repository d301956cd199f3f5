//! Talking to a remote: `fetch`, `push`, `clone`, and the `check_url`
//! reachability probe that runs ahead of a clone/pull to fail fast with a
//! clean error instead of a confusing transport failure partway through.
//!
//! The original drives `dulwich.client.{Local,Http}GitClient` directly; here
//! `git2::Remote` plays the same role, anonymously for local paths and
//! through libgit2's own transport negotiation for everything else.

use std::collections::HashMap;

use vcsgate_core::{translate, ErrorKind, VcsError, VcsResult};

use crate::error::kind_for;
use crate::handle::GitRepoHandle;

fn remote_callbacks() -> git2::RemoteCallbacks<'static> {
    let mut callbacks = git2::RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, allowed| {
        if allowed.contains(git2::CredentialType::SSH_KEY) {
            if let Some(username) = username_from_url {
                return git2::Cred::ssh_key_from_agent(username);
            }
        }
        git2::Cred::default()
    });
    callbacks
}

/// Fetches from `url` into the wired repository. When `apply_refs` is
/// `false` the remote refs are returned to the caller instead of being
/// written locally, mirroring the original's use of this mode from `clone`
/// (which filters the result before applying it itself).
pub fn fetch(
    handle: &GitRepoHandle,
    url: &str,
    apply_refs: bool,
    refs: Option<&[String]>,
) -> VcsResult<HashMap<String, String>> {
    let result: Result<HashMap<String, String>, git2::Error> = handle.with_repo(|repo| {
        let mut remote = repo.remote_anonymous(url)?;
        let mut opts = git2::FetchOptions::new();
        opts.remote_callbacks(remote_callbacks());

        let refspecs: Vec<String> = match refs {
            Some(refs) => refs.iter().map(|r| format!("+{r}:{r}")).collect(),
            None => Vec::new(),
        };
        let refspecs_ref: Vec<&str> = refspecs.iter().map(String::as_str).collect();

        remote.fetch(&refspecs_ref, Some(&mut opts), None)?;

        let remote_refs: HashMap<String, String> = remote
            .list()?
            .iter()
            .map(|head| (head.name().to_string(), head.oid().to_string()))
            .collect();

        if apply_refs {
            for (name, oid) in &remote_refs {
                if name.ends_with("^{}") {
                    log::info!("skipping peeled reference {name}");
                    continue;
                }
                if let Some(filter) = refs {
                    if !filter.iter().any(|r| r == name) {
                        continue;
                    }
                }
                repo.reference(name, git2::Oid::from_str(oid)?, true, "gateway fetch")?;
            }
            if let Some(refs) = refs {
                if let Some(last) = refs.last() {
                    if let Some(oid) = remote_refs.get(last) {
                        repo.reference("HEAD", git2::Oid::from_str(oid)?, true, "gateway fetch")?;
                    }
                }
            }
        }

        Ok(remote_refs)
    });

    translate(kind_for, result)
}

pub fn push(handle: &GitRepoHandle, url: &str, refspecs: &[String]) -> VcsResult<()> {
    let result: Result<(), git2::Error> = handle.with_repo(|repo| {
        let mut remote = repo.remote_anonymous(url)?;
        let mut opts = git2::PushOptions::new();
        opts.remote_callbacks(remote_callbacks());
        let specs: Vec<&str> = refspecs.iter().map(String::as_str).collect();
        remote.push(&specs, Some(&mut opts))
    });

    translate(kind_for, result)
}

/// Clones by fetching everything (`apply_refs = false`) and then writing
/// only the refs whose names start with one of `valid_refs` and don't end in
/// `deferred` (peeled tag markers), same filter as the original.
pub fn clone(
    handle: &GitRepoHandle,
    url: &str,
    valid_refs: &[String],
    deferred: &str,
    update_after_clone: bool,
) -> VcsResult<()> {
    let remote_refs = fetch(handle, url, false, None)?;

    let result: Result<(), git2::Error> = handle.with_repo(|repo| {
        for (name, oid) in &remote_refs {
            let matches_prefix = valid_refs.iter().any(|p| name.starts_with(p.as_str()));
            if matches_prefix && !name.ends_with(deferred) {
                repo.reference(name, git2::Oid::from_str(oid)?, true, "gateway clone")?;
            }
        }

        if update_after_clone {
            if let Some(head_oid) = remote_refs.get("HEAD") {
                let oid = git2::Oid::from_str(head_oid)?;
                repo.reference("HEAD", oid, true, "gateway clone")?;
                let commit = repo.find_commit(oid)?;
                let tree = commit.tree()?;
                repo.checkout_tree(tree.as_object(), None)?;
            }
        }

        Ok(())
    });

    translate(kind_for, result)
}

/// Probes `url`'s `info/refs?service=git-upload-pack` endpoint, the same
/// smart-HTTP discovery request a real git client issues before cloning.
/// Fails with `ErrorKind::UrlError` on anything other than a 200 response
/// that looks like a git advertisement.
pub fn check_url(url: &str) -> VcsResult<bool> {
    let mut probe_url = url.trim_end_matches('/').to_string();
    if !probe_url.ends_with("info/refs") {
        probe_url.push_str("/info/refs");
    }

    let client = reqwest::blocking::Client::new();
    let response = client
        .get(&probe_url)
        .query(&[("service", "git-upload-pack")])
        .header("User-Agent", "git/1.7.8.0")
        .send()
        .map_err(|e| url_error(url, &e))?;

    if !response.status().is_success() {
        return Err(VcsError::new(
            ErrorKind::UrlError,
            format!("[{url}] org_exc: status {}", response.status()),
        ));
    }

    let body = response.text().map_err(|e| url_error(url, &e))?;

    let looks_like_git = body.contains("service=git-upload-pack")
        || regex_has_sha_refs(&body);

    if looks_like_git {
        Ok(true)
    } else {
        Err(VcsError::new(
            ErrorKind::UrlError,
            format!("url [{url}] does not look like an git"),
        ))
    }
}

fn regex_has_sha_refs(body: &str) -> bool {
    body.split_whitespace().any(|tok| {
        tok.len() == 40 && tok.bytes().all(|b| b.is_ascii_hexdigit())
    })
}

fn url_error(url: &str, e: &reqwest::Error) -> VcsError {
    let err = VcsError::new(ErrorKind::UrlError, format!("[{url}] org_exc: {e}"));
    err.log();
    err
}
