//! HTTP-facing integration tests using rocket's blocking test client, per
//! `SPEC_FULL.md` §8's test-tooling notes. These exercise routing and
//! framing without needing an on-disk Git/Mercurial/Subversion repository:
//! the `server` backend and dev-mode echo app cover that surface.

use rocket::http::{ContentType, Status};
use rocket::local::blocking::Client;

use vcsgate_core::{RpcRequest, RpcResponse};
use vcsgate_rpc::config::{CacheConfig, DevConfig, GatewayConfig, GitConfig, HgSection, HooksConfig, SvnSection};
use vcsgate_rpc::AppState;

fn test_config(use_echo_app: bool) -> GatewayConfig {
    GatewayConfig {
        git: GitConfig {
            path: "git".to_string(),
            repo_root: std::env::temp_dir(),
            update_server_info: true,
        },
        hg: HgSection::Disabled,
        svn: SvnSection::Disabled,
        cache: CacheConfig::default(),
        hooks: HooksConfig::default(),
        dev: DevConfig { use_echo_app },
    }
}

fn test_client(use_echo_app: bool) -> Client {
    let state = AppState::from_config(&test_config(use_echo_app));
    let rocket = vcsgate_rpc::mount_routes(rocket::build().manage(state));
    Client::tracked(rocket).expect("valid rocket instance")
}

fn rpc_request(method: &str, args: Vec<serde_json::Value>) -> Vec<u8> {
    let request = RpcRequest {
        id: Some(serde_json::json!(1)),
        method: method.to_string(),
        params: vcsgate_core::RpcParams {
            wire: None,
            args,
            kwargs: Default::default(),
        },
    };
    rmp_serde::to_vec_named(&request).expect("request encodes")
}

#[test]
fn status_reports_ok() {
    let client = test_client(false);
    let response = client.get("/status").dispatch();

    assert_eq!(response.status(), Status::Ok);
    let body: serde_json::Value = response.into_json().expect("json body");
    assert_eq!(body["status"], "OK");
}

#[test]
fn server_ping_succeeds() {
    let client = test_client(false);
    let body = rpc_request("ping", vec![]);

    let response = client
        .post("/server")
        .header(ContentType::new("application", "x-msgpack"))
        .body(body)
        .dispatch();

    assert_eq!(response.status(), Status::Ok);
    let bytes = response.into_bytes().expect("response body");
    let decoded: RpcResponse = rmp_serde::from_slice(&bytes).expect("msgpack response");

    match decoded {
        RpcResponse::Success { result, .. } => assert_eq!(result, serde_json::Value::Null),
        RpcResponse::Error { error, .. } => panic!("expected success, got error: {}", error.message),
    }
}

#[test]
fn server_echo_returns_input_verbatim() {
    let client = test_client(false);
    let body = rpc_request("echo", vec![serde_json::json!("hello")]);

    let response = client
        .post("/server")
        .header(ContentType::new("application", "x-msgpack"))
        .body(body)
        .dispatch();

    let bytes = response.into_bytes().expect("response body");
    let decoded: RpcResponse = rmp_serde::from_slice(&bytes).expect("msgpack response");

    match decoded {
        RpcResponse::Success { result, .. } => assert_eq!(result, serde_json::json!("hello")),
        RpcResponse::Error { error, .. } => panic!("expected success, got error: {}", error.message),
    }
}

#[test]
fn unknown_backend_is_reported_as_an_rpc_error() {
    let client = test_client(false);
    let body = rpc_request("ping", vec![]);

    let response = client
        .post("/nonexistent")
        .header(ContentType::new("application", "x-msgpack"))
        .body(body)
        .dispatch();

    assert_eq!(response.status(), Status::Ok);
    let bytes = response.into_bytes().expect("response body");
    let decoded: RpcResponse = rmp_serde::from_slice(&bytes).expect("msgpack response");

    match decoded {
        RpcResponse::Error { error, .. } => assert!(error.message.contains("unknown backend")),
        RpcResponse::Success { .. } => panic!("expected an error response"),
    }
}

#[test]
fn disabled_hg_backend_is_reported_as_an_rpc_error() {
    let client = test_client(false);
    let body = rpc_request("lookup", vec![]);

    let response = client
        .post("/hg")
        .header(ContentType::new("application", "x-msgpack"))
        .body(body)
        .dispatch();

    let bytes = response.into_bytes().expect("response body");
    let decoded: RpcResponse = rmp_serde::from_slice(&bytes).expect("msgpack response");

    match decoded {
        RpcResponse::Error { error, .. } => assert!(error.message.contains("disabled")),
        RpcResponse::Success { .. } => panic!("expected an error response"),
    }
}

#[test]
fn proxy_git_dev_mode_returns_the_echo_response() {
    let client = test_client(true);

    let request = rmp_serde::to_vec_named(&serde_json::json!({
        "environment": {"REQUEST_METHOD": "POST"},
        "input_data": Vec::<u8>::new(),
        "args": ["/tmp", "repo", {}],
        "kwargs": {},
    }))
    .expect("request encodes");

    let response = client
        .post("/proxy/git")
        .header(ContentType::new("application", "x-msgpack"))
        .body(request)
        .dispatch();

    assert_eq!(response.status(), Status::Ok);
    let bytes = response.into_bytes().expect("response body");

    // [error, status, headers, body chunk...] as independent back-to-back
    // msgpack values, matching `WsgiProxy._iterator`'s framing.
    let mut de = rmp_serde::Deserializer::new(&bytes[..]);
    let error: Option<vcsgate_core::RpcError> =
        serde::Deserialize::deserialize(&mut de).expect("error slot");
    assert!(error.is_none());

    let status: String = serde::Deserialize::deserialize(&mut de).expect("status slot");
    assert_eq!(status, "200 OK");

    let headers: Vec<(String, String)> = serde::Deserialize::deserialize(&mut de).expect("headers slot");
    assert!(headers.is_empty());

    let chunk: serde_bytes::ByteBuf = serde::Deserialize::deserialize(&mut de).expect("body chunk");
    assert_eq!(chunk.into_vec(), b"ECHO".to_vec());
}
