//! `PygrackEngine`: the Git smart-HTTP endpoint itself, serving
//! `info/refs`, `git-upload-pack` and `git-receive-pack` by shelling out to
//! `git ... --stateless-rpc`. Grounded on `GitRepository` in
//! `original_source/vcsserver/pygrack.py`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use vcsgate_core::Extras;
use vcsgate_hooks::{HookBridge, HookName};
use vcsgate_subprocio::{ByteStream, SpawnParams, SubprocIo};

use crate::capabilities::parse_want_line_capabilities;
use crate::error::PygrackError;
use crate::peek::peek_first_line;
use crate::pktline::{flush_pkt, pkt_line};
use crate::response::{build_failed_pre_pull_response, inject_messages};

const GIT_FOLDER_SIGNATURE: [&str; 5] = ["config", "head", "info", "objects", "refs"];
const COMMANDS: [&str; 2] = ["git-upload-pack", "git-receive-pack"];

/// Either a lazily-produced byte stream or a fully materialized list of
/// chunks. Materialization is only paid for on the two paths that need the
/// whole response in hand before replying: upload-pack (to inject hook
/// messages) and receive-pack with `update_server_info` set (to run
/// `update-server-info` once the push is done).
pub enum BackendBody {
    Stream(ByteStream),
    Chunks(Vec<Bytes>),
}

pub struct BackendResponse {
    pub content_type: String,
    pub body: BackendBody,
}

pub struct InfoRefsResponse {
    pub content_type: String,
    pub body: ByteStream,
}

pub struct PygrackEngine {
    repo_name: String,
    content_path: PathBuf,
    git_path: String,
    update_server_info: bool,
    extras: Extras,
}

impl PygrackEngine {
    /// Validates `content_path` looks like a Git directory (case-insensitive
    /// match against the fixed folder signature) before accepting it as a
    /// serving target.
    pub fn new(
        repo_name: impl Into<String>,
        content_path: impl Into<PathBuf>,
        git_path: impl Into<String>,
        update_server_info: bool,
        extras: Extras,
    ) -> Result<Self, PygrackError> {
        let content_path = content_path.into();
        if !is_git_directory(&content_path) {
            return Err(PygrackError::NotAGitRepository(
                content_path.display().to_string(),
            ));
        }

        Ok(Self {
            repo_name: repo_name.into(),
            content_path,
            git_path: git_path.into(),
            update_server_info,
            extras,
        })
    }

    pub fn repo_name(&self) -> &str {
        &self.repo_name
    }

    /// `GET /info/refs?service=<command>`.
    pub async fn info_refs(&self, service: &str) -> Result<InfoRefsResponse, PygrackError> {
        if !COMMANDS.contains(&service) {
            return Err(PygrackError::UnsupportedService(service.to_string()));
        }

        let advertisement = pkt_line(format!("# service={service}\n").as_bytes());
        let mut starting = advertisement;
        starting.extend_from_slice(&flush_pkt());

        let command = &service[4..];
        let argv = vec![
            self.git_path.clone(),
            command.to_string(),
            "--stateless-rpc".to_string(),
            "--advertise-refs".to_string(),
            self.content_path.display().to_string(),
        ];
        let params = SpawnParams::new(argv)
            .starting_values(vec![Bytes::from(starting)])
            .fail_on_stderr(false);
        let subproc = SubprocIo::spawn(params)?;

        Ok(InfoRefsResponse {
            content_type: format!("application/x-{service}-advertisement"),
            body: Box::pin(subproc.stdout_chunks()),
        })
    }

    /// `POST /<repo>/<command>`.
    pub async fn backend(
        &self,
        service: &str,
        body: ByteStream,
        bridge: Option<&HookBridge>,
    ) -> Result<BackendResponse, PygrackError> {
        if !COMMANDS.contains(&service) {
            return Err(PygrackError::UnsupportedService(service.to_string()));
        }

        let (capabilities, body) = if service == "git-upload-pack" {
            let (first_line, rest) = peek_first_line(body).await?;
            (parse_want_line_capabilities(&first_line), rest)
        } else {
            (HashSet::new(), body)
        };

        let content_type = format!("application/x-{service}-result");

        let mut pre_pull_messages: Vec<u8> = Vec::new();
        if service == "git-upload-pack" {
            if let Some(bridge) = bridge {
                let response = bridge.call_for_response(HookName::PrePull, &self.extras);
                pre_pull_messages = response.output.clone();
                if !response.is_allowed() {
                    let rejection = build_failed_pre_pull_response(
                        &capabilities,
                        &pre_pull_messages,
                        b"Pre pull hook failed: aborting\n",
                    );
                    return Ok(BackendResponse {
                        content_type,
                        body: BackendBody::Chunks(rejection),
                    });
                }
            }
        }

        let command = &service[4..];
        let argv = vec![
            self.git_path.clone(),
            command.to_string(),
            "--stateless-rpc".to_string(),
            self.content_path.display().to_string(),
        ];
        let params = SpawnParams::new(argv)
            .input(body)
            .cwd(&self.content_path)
            .fail_on_return_code(false)
            .fail_on_stderr(false);
        let subproc = SubprocIo::spawn(params)?;

        if self.update_server_info && service == "git-receive-pack" {
            let chunks = materialize(subproc).await?;
            vcsgate_git::cli::update_server_info(&self.git_path, &self.content_path)
                .await
                .ok();
            return Ok(BackendResponse {
                content_type,
                body: BackendBody::Chunks(chunks),
            });
        }

        if service == "git-upload-pack" {
            let chunks = materialize(subproc).await?;
            let post_pull_messages = match bridge {
                Some(bridge) => bridge.call_for_response(HookName::PostPull, &self.extras).output,
                None => Vec::new(),
            };
            let injected = inject_messages(chunks, &capabilities, &pre_pull_messages, &post_pull_messages);
            return Ok(BackendResponse {
                content_type,
                body: BackendBody::Chunks(injected),
            });
        }

        Ok(BackendResponse {
            content_type,
            body: BackendBody::Stream(Box::pin(subproc.stdout_chunks())),
        })
    }
}

async fn materialize(subproc: SubprocIo) -> Result<Vec<Bytes>, PygrackError> {
    use futures::StreamExt;

    let mut chunks = Vec::new();
    let mut stream = Box::pin(subproc.stdout_chunks());
    while let Some(chunk) = stream.next().await {
        chunks.push(chunk?);
    }
    Ok(chunks)
}

pub fn fixed_path(repo_name: &str, path: &str) -> String {
    match path.split_once(repo_name) {
        Some((_, rest)) => rest.trim_matches('/').to_string(),
        None => path.trim_matches('/').to_string(),
    }
}

pub fn is_git_directory(path: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(path) else {
        return false;
    };
    let found: HashSet<String> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().to_str().map(|s| s.to_lowercase()))
        .collect();
    GIT_FOLDER_SIGNATURE.iter().all(|f| found.contains(*f))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_path_strips_repo_prefix_and_slashes() {
        assert_eq!(fixed_path("myrepo", "/myrepo/info/refs"), "info/refs");
        assert_eq!(fixed_path("myrepo", "/myrepo/git-upload-pack"), "git-upload-pack");
    }
}
