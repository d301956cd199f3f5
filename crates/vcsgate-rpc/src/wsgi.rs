//! `WsgiAppCaller`'s Rust analogue: a pure function from a WSGI-like
//! environ plus a fully-materialized request body to a fully-materialized
//! `(status, headers, body chunks)` response, matching
//! `WSGIAppCaller.handle` in `original_source/vcsserver/wsgi_app_caller.py`.
//! Used only by the `/proxy/hg` and `/proxy/git` routes, which unlike
//! `/stream/hg`/`/stream/git` speak one msgpack-framed request/response
//! pair rather than proxying a live byte-transparent connection.

use std::path::PathBuf;

use bytes::Bytes;
use futures::StreamExt;

use vcsgate_core::{ConfigEntry, Extras, VcsResult};
use vcsgate_hooks::HookBridge;
use vcsgate_pygrack::{BackendBody, PygrackError};
use vcsgate_scmapp::{GitHandler, HgWebApp};
use vcsgate_subprocio::ByteStream;

/// The handful of WSGI environ keys these two apps actually inspect:
/// `REQUEST_METHOD`, `PATH_INFO`, `QUERY_STRING`.
#[derive(Debug, Clone, Default)]
pub struct WsgiEnviron {
    pub request_method: String,
    pub path_info: String,
    pub query_string: String,
}

#[derive(Debug)]
pub struct WsgiResponse {
    pub status: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<Bytes>,
}

fn single_chunk_stream(data: Vec<u8>) -> ByteStream {
    Box::pin(futures::stream::once(
        async move { Ok(Bytes::from(data)) },
    ))
}

async fn collect(mut stream: ByteStream) -> Result<Vec<Bytes>, PygrackError> {
    let mut out = Vec::new();
    while let Some(chunk) = stream.next().await {
        out.push(chunk?);
    }
    Ok(out)
}

fn query_param<'a>(query_string: &'a str, name: &str) -> Option<&'a str> {
    query_string
        .split('&')
        .find_map(|kv| kv.strip_prefix(name)?.strip_prefix('='))
}

pub async fn call_git(
    repo_path: PathBuf,
    repo_name: String,
    git_path: String,
    update_server_info: bool,
    extras: Extras,
    bridge: Option<&HookBridge>,
    environ: WsgiEnviron,
    input: Vec<u8>,
) -> Result<WsgiResponse, PygrackError> {
    let handler = GitHandler::new(repo_path, repo_name, git_path, update_server_info)?;
    let engine = handler.resolve(extras)?;

    if environ.request_method.eq_ignore_ascii_case("GET") {
        let service = query_param(&environ.query_string, "service").unwrap_or_default();
        let resp = engine.info_refs(service).await?;
        let body = collect(resp.body).await?;
        Ok(WsgiResponse {
            status: "200 OK".to_string(),
            headers: vec![("Content-Type".to_string(), resp.content_type)],
            body,
        })
    } else {
        let service = environ
            .path_info
            .rsplit('/')
            .next()
            .unwrap_or(&environ.path_info);
        let resp = engine
            .backend(service, single_chunk_stream(input), bridge)
            .await?;
        let body = match resp.body {
            BackendBody::Chunks(chunks) => chunks,
            BackendBody::Stream(stream) => collect(stream).await?,
        };
        Ok(WsgiResponse {
            status: "200 OK".to_string(),
            headers: vec![("Content-Type".to_string(), resp.content_type)],
            body,
        })
    }
}

/// Mercurial's WSGI app has no Rust equivalent to call in-process (see
/// `HgWebApp`'s module docs); `/proxy/hg` drives the same `hg serve --stdio`
/// pipe as `/stream/hg`, collecting the whole response before returning
/// since this route's framing isn't incremental.
pub async fn call_hg(
    hg_path: String,
    repo_path: PathBuf,
    repo_name: String,
    config: Vec<ConfigEntry>,
    input: Vec<u8>,
) -> VcsResult<WsgiResponse> {
    let app = HgWebApp::new(hg_path, repo_path, repo_name, config)?;
    let output = app.serve_stdio(single_chunk_stream(input))?;

    let mut body = Vec::new();
    let mut stream = output;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            vcsgate_core::VcsError::with_source(vcsgate_core::ErrorKind::Error, e.to_string(), e)
        })?;
        body.push(chunk);
    }

    Ok(WsgiResponse {
        status: "200 OK".to_string(),
        headers: vec![("Content-Type".to_string(), "application/mercurial-0.1".to_string())],
        body,
    })
}
