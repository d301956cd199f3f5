//! HTTP routes, grounded on `HTTPApplication._configure`/`vcs_view`/
//! `status_view`/`hg_proxy`/`git_proxy`/`hg_stream`/`git_stream` in
//! `original_source/vcsserver/http_main.py`. Msgpack framing throughout,
//! matching `_msgpack_renderer_factory`.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;

use bytes::Bytes;
use rocket::data::Data;
use rocket::http::{ContentType, Status};
use rocket::request::{FromRequest, Outcome};
use rocket::response::Responder;
use rocket::serde::json::Json;
use rocket::{get, post, routes, Request, Response, Route, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::io::{ReaderStream, StreamReader};

use vcsgate_core::{ConfigEntry, ErrorKind, Extras, RpcError, RpcRequest, RpcResponse, VcsError, Wire};
use vcsgate_hooks::HookBridge;
use vcsgate_subprocio::ByteStream;

use crate::state::AppState;
use crate::wsgi::{WsgiEnviron, WsgiResponse};
use crate::{git_remote, hg_remote, server_control, svn_remote, wsgi};

const RPC_BODY_LIMIT: rocket::data::ByteUnit = rocket::data::ByteUnit::Gibibyte(1);

pub fn routes() -> Vec<Route> {
    routes![
        status,
        vcs_rpc,
        proxy_hg,
        proxy_git,
        stream_git_get,
        stream_git_post,
        stream_hg_get,
        stream_hg_post,
    ]
}

#[derive(Serialize)]
struct StatusBody {
    status: &'static str,
}

#[get("/status")]
fn status() -> Json<StatusBody> {
    Json(StatusBody { status: "OK" })
}

/// Raw msgpack bytes, tagged `application/x-msgpack` the way
/// `_msgpack_renderer_factory` tags its renderer's output.
pub struct MsgpackBody(pub Vec<u8>);

impl<'r> Responder<'r, 'static> for MsgpackBody {
    fn respond_to(self, _request: &'r Request<'_>) -> rocket::response::Result<'static> {
        Response::build()
            .header(ContentType::new("application", "x-msgpack"))
            .sized_body(self.0.len(), Cursor::new(self.0))
            .ok()
    }
}

async fn read_body(data: Data<'_>, limit: rocket::data::ByteUnit) -> Result<Vec<u8>, std::io::Error> {
    Ok(data.open(limit).into_bytes().await?.into_inner())
}

fn pack<T: Serialize>(value: &T) -> Vec<u8> {
    rmp_serde::to_vec_named(value).unwrap_or_default()
}

#[post("/<backend>", data = "<body>")]
async fn vcs_rpc(backend: &str, body: Data<'_>, state: &State<AppState>) -> MsgpackBody {
    let bytes = match read_body(body, RPC_BODY_LIMIT).await {
        Ok(b) => b,
        Err(e) => {
            let err = RpcError::from_named(e.to_string(), "IOError", None);
            return MsgpackBody(pack(&RpcResponse::error(None, err)));
        }
    };

    let request: RpcRequest = match rmp_serde::from_slice(&bytes) {
        Ok(r) => r,
        Err(e) => {
            let err = RpcError::from_named(format!("invalid request: {e}"), "ValueError", None);
            return MsgpackBody(pack(&RpcResponse::error(None, err)));
        }
    };

    let RpcRequest { id, method, params } = request;
    let result = dispatch_backend(state, backend, &method, params.wire, &params.args, &params.kwargs).await;

    let response = match result {
        Ok(value) => RpcResponse::success(id, value),
        Err(err) => RpcResponse::error(id, RpcError::from_vcs_error(&err)),
    };

    MsgpackBody(pack(&response))
}

async fn dispatch_backend(
    state: &AppState,
    backend: &str,
    method: &str,
    wire: Option<Wire>,
    args: &[Value],
    kwargs: &HashMap<String, Value>,
) -> Result<Value, VcsError> {
    match backend {
        "git" => git_remote::dispatch(&state.git, &state.git_path, method, wire, args, kwargs).await,
        "hg" => match &state.hg {
            Some(factory) => hg_remote::dispatch(factory, method, wire, args, kwargs).await,
            None => Err(VcsError::new(ErrorKind::Error, "Mercurial backend is disabled")),
        },
        "svn" => match &state.svn {
            Some(factory) => svn_remote::dispatch(factory, method, wire, args, kwargs).await,
            None => Err(VcsError::new(ErrorKind::Error, "Subversion backend is disabled")),
        },
        "server" => server_control::dispatch(state, method, args, kwargs).await,
        _ => Err(VcsError::new(ErrorKind::Error, format!("unknown backend: {backend}"))),
    }
}

/// Body shape of `/proxy/hg` and `/proxy/git`, matching `WSGIAppCaller`'s
/// `environment`/`input_data`/`args`/`kwargs` request dict.
#[derive(Deserialize)]
struct WsgiProxyRequest {
    #[serde(default)]
    environment: HashMap<String, Value>,
    #[serde(default)]
    input_data: serde_bytes::ByteBuf,
    #[serde(default)]
    args: Vec<Value>,
    #[serde(default)]
    kwargs: HashMap<String, Value>,
}

fn environ_from_map(map: &HashMap<String, Value>) -> WsgiEnviron {
    let get = |key: &str| map.get(key).and_then(Value::as_str).unwrap_or_default().to_string();
    WsgiEnviron {
        request_method: get("REQUEST_METHOD"),
        path_info: get("PATH_INFO"),
        query_string: get("QUERY_STRING"),
    }
}

/// Encodes the response the same way `WsgiProxy._iterator` does: `error`,
/// `status`, `headers`, then each body chunk, each as its own back-to-back
/// msgpack value.
fn pack_wsgi_response(error: Option<&VcsError>, response: Option<WsgiResponse>) -> Vec<u8> {
    let mut out = Vec::new();

    match error {
        Some(err) => {
            let rpc_err = RpcError::from_vcs_error(err);
            out.extend(pack(&Some(rpc_err)));
            out.extend(pack::<Option<String>>(&None));
            out.extend(pack::<Option<Vec<(String, String)>>>(&None));
        }
        None => {
            out.extend(pack::<Option<RpcError>>(&None));
            let response = response.expect("response present when there is no error");
            out.extend(pack(&response.status));
            out.extend(pack(&response.headers));
            for chunk in response.body {
                out.extend(pack(&serde_bytes::ByteBuf::from(chunk.to_vec())));
            }
        }
    }

    out
}

#[post("/proxy/git", data = "<body>")]
async fn proxy_git(body: Data<'_>, state: &State<AppState>) -> MsgpackBody {
    let bytes = match read_body(body, RPC_BODY_LIMIT).await {
        Ok(b) => b,
        Err(e) => {
            let err = VcsError::new(ErrorKind::Unhandled, e.to_string());
            return MsgpackBody(pack_wsgi_response(Some(&err), None));
        }
    };

    let request: WsgiProxyRequest = match rmp_serde::from_slice(&bytes) {
        Ok(r) => r,
        Err(e) => {
            let err = VcsError::new(ErrorKind::Unhandled, format!("invalid request: {e}"));
            return MsgpackBody(pack_wsgi_response(Some(&err), None));
        }
    };

    if state.use_echo_app {
        return MsgpackBody(pack_wsgi_response(None, Some(echo_response())));
    }

    let environ = environ_from_map(&request.environment);

    let (repo_path, repo_name, extras_map) = match parse_git_proxy_args(&request.args) {
        Ok(parts) => parts,
        Err(e) => return MsgpackBody(pack_wsgi_response(Some(&e), None)),
    };

    let mut extras_map = extras_map;
    let update_server_info = extras_map
        .remove("git_update_server_info")
        .and_then(|v| v.as_bool())
        .unwrap_or(state.git_update_server_info);
    let extras: Extras = serde_json::from_value(Value::Object(extras_map.into_iter().collect()))
        .unwrap_or_default();
    let bridge = HookBridge::from_extras(&extras, None, &state.embedded_hooks);

    let result = wsgi::call_git(
        repo_path,
        repo_name,
        state.git_path.clone(),
        update_server_info,
        extras,
        bridge.as_ref(),
        environ,
        request.input_data.into_vec(),
    )
    .await;

    match result {
        Ok(resp) => MsgpackBody(pack_wsgi_response(None, Some(resp))),
        Err(e) => {
            let err = VcsError::new(ErrorKind::Unhandled, e.to_string());
            MsgpackBody(pack_wsgi_response(Some(&err), None))
        }
    }
}

fn parse_git_proxy_args(
    args: &[Value],
) -> Result<(PathBuf, String, serde_json::Map<String, Value>), VcsError> {
    let bad_args = || VcsError::new(ErrorKind::Requirement, "git proxy requires (repo_path, repo_name, config)");

    let repo_path = args.first().and_then(Value::as_str).ok_or_else(bad_args)?;
    let repo_name = args.get(1).and_then(Value::as_str).ok_or_else(bad_args)?;
    let config = args
        .get(2)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    Ok((PathBuf::from(repo_path), repo_name.to_string(), config))
}

#[post("/proxy/hg", data = "<body>")]
async fn proxy_hg(body: Data<'_>, state: &State<AppState>) -> MsgpackBody {
    let bytes = match read_body(body, RPC_BODY_LIMIT).await {
        Ok(b) => b,
        Err(e) => {
            let err = VcsError::new(ErrorKind::Unhandled, e.to_string());
            return MsgpackBody(pack_wsgi_response(Some(&err), None));
        }
    };

    let request: WsgiProxyRequest = match rmp_serde::from_slice(&bytes) {
        Ok(r) => r,
        Err(e) => {
            let err = VcsError::new(ErrorKind::Unhandled, format!("invalid request: {e}"));
            return MsgpackBody(pack_wsgi_response(Some(&err), None));
        }
    };

    if state.use_echo_app {
        return MsgpackBody(pack_wsgi_response(None, Some(echo_response())));
    }

    if state.hg.is_none() {
        let err = VcsError::new(ErrorKind::Error, "Mercurial backend is disabled");
        return MsgpackBody(pack_wsgi_response(Some(&err), None));
    }

    let (repo_path, repo_name, config) = match parse_hg_proxy_args(&request.args) {
        Ok(parts) => parts,
        Err(e) => return MsgpackBody(pack_wsgi_response(Some(&e), None)),
    };

    let hg_path = state
        .hg
        .as_ref()
        .map(|f| f.cli().hg_path.clone())
        .unwrap_or_default();

    let result = wsgi::call_hg(hg_path, repo_path, repo_name, config, request.input_data.into_vec()).await;

    match result {
        Ok(resp) => MsgpackBody(pack_wsgi_response(None, Some(resp))),
        Err(e) => MsgpackBody(pack_wsgi_response(Some(&e), None)),
    }
}

fn parse_hg_proxy_args(args: &[Value]) -> Result<(PathBuf, String, Vec<ConfigEntry>), VcsError> {
    let bad_args = || VcsError::new(ErrorKind::Requirement, "hg proxy requires (repo_path, repo_name, config)");

    let repo_path = args.first().and_then(Value::as_str).ok_or_else(bad_args)?;
    let repo_name = args.get(1).and_then(Value::as_str).ok_or_else(bad_args)?;
    let config: Vec<ConfigEntry> = args
        .get(2)
        .cloned()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| VcsError::new(ErrorKind::Requirement, format!("invalid hg config: {e}")))?
        .unwrap_or_default();

    Ok((PathBuf::from(repo_path), repo_name.to_string(), config))
}

fn echo_response() -> WsgiResponse {
    WsgiResponse {
        status: "200 OK".to_string(),
        headers: Vec::new(),
        body: vec![Bytes::from_static(b"ECHO")],
    }
}

/// Reads the `X-RC-Repo-*` headers every `/stream/*` route relies on to
/// locate and configure the target repository, matching `hg_stream`'s and
/// `git_stream`'s environ lookups in `http_main.py`.
struct RepoHeaders {
    repo_path: PathBuf,
    repo_name: String,
    path_info: String,
    raw_config: Value,
}

#[derive(Debug, thiserror::Error)]
enum StreamError {
    #[error("missing required header {0}")]
    MissingHeader(&'static str),
    #[error("X-RC-Repo-Config header is not valid base64/msgpack")]
    InvalidConfig,
    #[error("invalid repo config: {0}")]
    Config(#[from] VcsError),
    #[error(transparent)]
    Pygrack(#[from] vcsgate_pygrack::PygrackError),
    #[error("backend is disabled")]
    BackendDisabled,
}

impl<'r, 'o: 'r> Responder<'r, 'o> for StreamError {
    fn respond_to(self, request: &'r Request<'_>) -> rocket::response::Result<'o> {
        log::warn!("stream request failed: {self}");
        (Status::BadRequest, self.to_string()).respond_to(request)
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for RepoHeaders {
    type Error = StreamError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let header = |name: &str| request.headers().get_one(name).map(str::to_string);

        let Some(repo_path) = header("X-RC-Repo-Path") else {
            return Outcome::Failure((Status::BadRequest, StreamError::MissingHeader("X-RC-Repo-Path")));
        };
        let Some(repo_name) = header("X-RC-Repo-Name") else {
            return Outcome::Failure((Status::BadRequest, StreamError::MissingHeader("X-RC-Repo-Name")));
        };
        let Some(path_info) = header("X-RC-Path-Info") else {
            return Outcome::Failure((Status::BadRequest, StreamError::MissingHeader("X-RC-Path-Info")));
        };

        let raw_config = match header("X-RC-Repo-Config") {
            Some(encoded) => {
                let decoded = match crate::b64::decode(&encoded) {
                    Ok(d) => d,
                    Err(_) => return Outcome::Failure((Status::BadRequest, StreamError::InvalidConfig)),
                };
                match rmp_serde::from_slice(&decoded) {
                    Ok(v) => v,
                    Err(_) => return Outcome::Failure((Status::BadRequest, StreamError::InvalidConfig)),
                }
            }
            None => Value::Null,
        };

        Outcome::Success(Self {
            repo_path: PathBuf::from(repo_path),
            repo_name,
            path_info,
            raw_config,
        })
    }
}

/// Streamed HTTP response: status line, headers, and a byte-transparent
/// body, matching `GitHttpBackendResponder` in the teacher's
/// `git_http_protocol.rs`, adapted to a `futures::Stream` body (here
/// bridged through `tokio_util::io::StreamReader`) rather than a
/// subprocess's own `AsyncRead` child handle.
struct StreamResponder {
    status: Status,
    content_type: String,
    body: ByteStream,
}

impl<'r, 'o: 'r> Responder<'r, 'o> for StreamResponder {
    fn respond_to(self, _request: &'r Request<'_>) -> rocket::response::Result<'o> {
        Response::build()
            .status(self.status)
            .raw_header("Content-Type", self.content_type)
            .streamed_body(StreamReader::new(self.body))
            .ok()
    }
}

fn git_extras(raw_config: Value) -> (bool, Extras) {
    let mut map = raw_config.as_object().cloned().unwrap_or_default();
    let update_server_info = map
        .remove("git_update_server_info")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let extras = serde_json::from_value(Value::Object(map)).unwrap_or_default();
    (update_server_info, extras)
}

fn hg_config(raw_config: Value) -> Vec<ConfigEntry> {
    serde_json::from_value(raw_config).unwrap_or_default()
}

#[get("/stream/git/<_path..>?<service>")]
async fn stream_git_get(
    _path: PathBuf,
    service: Option<String>,
    headers: RepoHeaders,
    state: &State<AppState>,
) -> Result<StreamResponder, StreamError> {
    if state.use_echo_app {
        return Ok(echo_stream_response());
    }

    let (update_server_info, extras) = git_extras(headers.raw_config);
    let handler = vcsgate_scmapp::GitHandler::new(
        headers.repo_path,
        headers.repo_name,
        state.git_path.clone(),
        update_server_info,
    )?;
    let engine = handler.resolve(extras)?;
    let service = service.unwrap_or_default();
    let resp = engine.info_refs(&service).await?;

    Ok(StreamResponder {
        status: Status::Ok,
        content_type: resp.content_type,
        body: resp.body,
    })
}

#[post("/stream/git/<_path..>", data = "<body>")]
async fn stream_git_post(
    _path: PathBuf,
    body: Data<'_>,
    headers: RepoHeaders,
    state: &State<AppState>,
) -> Result<StreamResponder, StreamError> {
    if state.use_echo_app {
        let _ = read_body(body, RPC_BODY_LIMIT).await;
        return Ok(echo_stream_response());
    }

    let (update_server_info, extras) = git_extras(headers.raw_config);
    let bridge = HookBridge::from_extras(&extras, None, &state.embedded_hooks);
    let handler = vcsgate_scmapp::GitHandler::new(
        headers.repo_path,
        headers.repo_name,
        state.git_path.clone(),
        update_server_info,
    )?;
    let engine = handler.resolve(extras)?;

    let service = vcsgate_pygrack::fixed_path(engine.repo_name(), &headers.path_info);
    let service = service.rsplit('/').next().unwrap_or(&service).to_string();

    let input: ByteStream = Box::pin(ReaderStream::new(body.open(RPC_BODY_LIMIT)));
    let resp = engine.backend(&service, input, bridge.as_ref()).await?;

    let body_stream: ByteStream = match resp.body {
        vcsgate_pygrack::BackendBody::Stream(s) => s,
        vcsgate_pygrack::BackendBody::Chunks(chunks) => {
            Box::pin(futures::stream::iter(chunks.into_iter().map(Ok)))
        }
    };

    Ok(StreamResponder {
        status: Status::Ok,
        content_type: resp.content_type,
        body: body_stream,
    })
}

#[get("/stream/hg/<_path..>")]
async fn stream_hg_get(
    _path: PathBuf,
    headers: RepoHeaders,
    state: &State<AppState>,
) -> Result<StreamResponder, StreamError> {
    stream_hg(headers, state, None).await
}

#[post("/stream/hg/<_path..>", data = "<body>")]
async fn stream_hg_post(
    _path: PathBuf,
    body: Data<'_>,
    headers: RepoHeaders,
    state: &State<AppState>,
) -> Result<StreamResponder, StreamError> {
    stream_hg(headers, state, Some(body)).await
}

async fn stream_hg(
    headers: RepoHeaders,
    state: &State<AppState>,
    body: Option<Data<'_>>,
) -> Result<StreamResponder, StreamError> {
    if state.use_echo_app {
        if let Some(body) = body {
            let _ = read_body(body, RPC_BODY_LIMIT).await;
        }
        return Ok(echo_stream_response());
    }

    if state.hg.is_none() {
        return Err(StreamError::BackendDisabled);
    }

    let config = hg_config(headers.raw_config);
    let hg_path = state
        .hg
        .as_ref()
        .map(|f| f.cli().hg_path.clone())
        .unwrap_or_default();
    let app = vcsgate_scmapp::HgWebApp::new(hg_path, headers.repo_path, headers.repo_name, config)?;

    let input: ByteStream = match body {
        Some(body) => Box::pin(ReaderStream::new(body.open(RPC_BODY_LIMIT))),
        None => Box::pin(futures::stream::empty()),
    };
    let output = app.serve_stdio(input)?;

    Ok(StreamResponder {
        status: Status::Ok,
        content_type: "application/mercurial-0.1".to_string(),
        body: output,
    })
}

fn echo_stream_response() -> StreamResponder {
    StreamResponder {
        status: Status::Ok,
        content_type: "text/plain".to_string(),
        body: Box::pin(futures::stream::once(async {
            Ok(Bytes::from_static(b"ECHO"))
        })),
    }
}
