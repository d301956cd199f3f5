//! Git's own hook wrappers, layered on top of the generic [`crate::HookBridge`].
//!
//! Git's receive-pack flow can't propagate a Rust `Err` mid-response: the
//! smart-HTTP protocol must always finish with legal framing, so every
//! wrapper here returns a [`HookResponse`] and collapses both transport
//! failures and reported exceptions into status 128 rather than raising.

use std::io;
use std::path::Path;

use vcsgate_core::{Extras, HookResponse};
use vcsgate_subprocio::{SpawnParams, SubprocIo};

use crate::{HookBridge, HookName};

const ZERO_OID: &str = "0000000000000000000000000000000000000000";
const HEADS_PREFIX: &str = "refs/heads/";
const TAGS_PREFIX: &str = "refs/tags/";

pub fn git_pre_pull(bridge: &HookBridge, extras: &Extras) -> HookResponse {
    bridge.call_for_response(HookName::PrePull, extras)
}

pub fn git_post_pull(bridge: &HookBridge, extras: &Extras) -> HookResponse {
    bridge.call_for_response(HookName::PostPull, extras)
}

pub fn git_pre_receive(bridge: &HookBridge, extras: &Extras) -> HookResponse {
    bridge.call_for_response(HookName::PrePush, extras)
}

/// Computes `commit_ids` from the raw `old new ref` hook input, stores it
/// into `extras`, then invokes `post_push`.
pub async fn git_post_receive(
    bridge: &HookBridge,
    repo_path: &Path,
    hook_input: &str,
    mut extras: Extras,
) -> (Extras, HookResponse) {
    match compute_commit_ids(repo_path, hook_input).await {
        Ok(commit_ids) => extras.commit_ids = commit_ids,
        Err(e) => {
            return (
                extras,
                HookResponse::transport_error(format!("ERROR: {e}")),
            );
        }
    }

    let response = bridge.call_for_response(HookName::PostPush, &extras);
    (extras, response)
}

struct RefUpdate {
    old_rev: String,
    new_rev: String,
    ref_name: String,
}

fn parse_ref_updates(hook_input: &str) -> Vec<RefUpdate> {
    hook_input
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let old_rev = parts.next()?.to_string();
            let new_rev = parts.next()?.to_string();
            let ref_name = parts.next()?.to_string();
            Some(RefUpdate {
                old_rev,
                new_rev,
                ref_name,
            })
        })
        .collect()
}

async fn run_git(repo_path: &Path, args: &[&str]) -> io::Result<Vec<u8>> {
    let argv = std::iter::once("git".to_string())
        .chain(args.iter().map(|s| s.to_string()))
        .collect();
    let subproc = SubprocIo::spawn(SpawnParams::new(argv).cwd(repo_path).fail_on_stderr(false))
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    subproc
        .wait_collect()
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}

async fn existing_heads_excluding(repo_path: &Path, exclude: &str) -> io::Result<Vec<String>> {
    let out = run_git(repo_path, &["for-each-ref", "--format=%(refname)", HEADS_PREFIX]).await?;
    let text = String::from_utf8_lossy(&out);
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|r| !r.is_empty() && *r != exclude)
        .map(str::to_string)
        .collect())
}

fn commit_hashes(out: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(out)
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

async fn compute_commit_ids(repo_path: &Path, hook_input: &str) -> io::Result<Vec<String>> {
    let mut commit_ids = Vec::new();

    for update in parse_ref_updates(hook_input) {
        let RefUpdate {
            old_rev,
            new_rev,
            ref_name,
        } = update;

        if new_rev == ZERO_OID {
            let name = ref_name
                .strip_prefix(HEADS_PREFIX)
                .unwrap_or(ref_name.as_str());
            commit_ids.push(format!("delete_branch=>{name}"));
            continue;
        }

        if let Some(name) = ref_name.strip_prefix(TAGS_PREFIX) {
            commit_ids.push(format!("tag=>{name}"));
            continue;
        }

        if old_rev == ZERO_OID {
            if run_git(repo_path, &["show", "HEAD"]).await.is_err() {
                let _ = run_git(repo_path, &["symbolic-ref", "HEAD", &ref_name]).await;
            }

            let other_heads = existing_heads_excluding(repo_path, &ref_name).await?;
            let mut args = vec![
                "log".to_string(),
                "--reverse".to_string(),
                "--pretty=format:%H".to_string(),
                "--".to_string(),
                new_rev.clone(),
                "--not".to_string(),
            ];
            args.extend(other_heads);
            let argv: Vec<&str> = args.iter().map(String::as_str).collect();
            let out = run_git(repo_path, &argv).await?;
            commit_ids.extend(commit_hashes(&out));
        } else {
            let range = format!("{old_rev}..{new_rev}");
            let out = run_git(
                repo_path,
                &["log", &range, "--reverse", "--pretty=format:%H"],
            )
            .await?;
            commit_ids.extend(commit_hashes(&out));
        }
    }

    Ok(commit_ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_old_new_ref_lines() {
        let input = format!("{ZERO_OID} abc123 refs/heads/main\ndef456 {ZERO_OID} refs/heads/old\n");
        let updates = parse_ref_updates(&input);
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].ref_name, "refs/heads/main");
        assert_eq!(updates[1].new_rev, ZERO_OID);
    }

    #[test]
    fn commit_hashes_splits_and_trims_lines() {
        let out = b"abc123\ndef456\n".to_vec();
        assert_eq!(commit_hashes(&out), vec!["abc123", "def456"]);
    }
}
