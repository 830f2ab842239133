//! End-to-end tests against a running `may_minihttp` server
//!
//! Starts the demo router with the document endpoint on a free local port
//! and exercises it over raw TCP.

use routedoc::controllers::demo_router;
use routedoc::middleware::TracingMiddleware;
use routedoc::server::{AppService, HttpServer, ServerHandle};
use routedoc::{Dispatcher, DocumentService};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::TempDir;

mod common;
use common::http::{parse_json_response, parse_response, send_request};
use common::test_server::{free_addr, setup_may_runtime};

fn start_demo() -> (ServerHandle, SocketAddr, TempDir) {
    setup_may_runtime();
    let dir = TempDir::new().unwrap();
    let docs = DocumentService::with_overlay_path(dir.path().join("OpenAPI.json"));
    let router = Arc::new(demo_router(&docs).unwrap());

    let mut dispatcher = Dispatcher::new();
    dispatcher.add_middleware(Arc::new(TracingMiddleware));
    unsafe {
        dispatcher.register_router(&router);
    }
    let service = AppService::new(router, Arc::new(dispatcher))
        .with_docs("/api-docs", docs.get_document().unwrap());

    let addr = free_addr();
    let handle = HttpServer(service).start(addr).unwrap();
    handle.wait_ready().unwrap();
    (handle, addr, dir)
}

fn get(addr: &SocketAddr, path: &str, extra: &str) -> String {
    send_request(
        addr,
        &format!("GET {path} HTTP/1.1\r\nHost: localhost\r\n{extra}\r\n"),
    )
}

fn send(addr: &SocketAddr, method: &str, path: &str, headers: &str, body: &str) -> String {
    send_request(
        addr,
        &format!(
            "{method} {path} HTTP/1.1\r\nHost: localhost\r\n{headers}Content-Length: {}\r\n\r\n{body}",
            body.len()
        ),
    )
}

#[test]
fn test_demo_server_end_to_end() {
    let (handle, addr, _dir) = start_demo();

    let (status, body) = parse_json_response(&get(&addr, "/health", ""));
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "status": "ok" }));

    let resp = get(&addr, "/", "");
    let (status, body) = parse_response(&resp);
    assert_eq!(status, 200);
    assert_eq!(body, "Hello, World!");
    assert!(resp.contains("Content-Type: text/plain"));

    let (status, body) = parse_response(&get(&addr, "/second", ""));
    assert_eq!(status, 200);
    assert_eq!(body, "Hello, World! 2x");

    let user = r#"{"email":"paul@example.com","password":"L1m1t3dAcc355","firstName":"Paul","lastName":"Forbes"}"#;
    let (status, created) = parse_json_response(&send(
        &addr,
        "POST",
        "/api/user",
        "Content-Type: application/json\r\n",
        user,
    ));
    assert_eq!(status, 201);
    assert_eq!(created["email"], "paul@example.com");

    let (status, _) = parse_json_response(&send(
        &addr,
        "POST",
        "/api/user",
        "Content-Type: application/json\r\n",
        user,
    ));
    assert_eq!(status, 409);

    let (status, listed) = parse_json_response(&get(&addr, "/api/user?name=paul", ""));
    assert_eq!(status, 200);
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let id = created["id"].to_string();
    let (status, fetched) = parse_json_response(&get(&addr, &format!("/api/user/{id}"), ""));
    assert_eq!(status, 200);
    assert_eq!(fetched["lastName"], "Forbes");

    let (status, _) = parse_json_response(&send(&addr, "DELETE", &format!("/api/user/{id}"), "", ""));
    assert_eq!(status, 401);

    let (status, _) = parse_json_response(&send(
        &addr,
        "DELETE",
        &format!("/api/user/{id}"),
        "X-Api-Key: secret\r\n",
        "",
    ));
    assert_eq!(status, 200);

    let (status, _) = parse_json_response(&get(&addr, &format!("/api/user/{id}"), ""));
    assert_eq!(status, 404);

    let (status, body) = parse_json_response(&get(&addr, "/nowhere", ""));
    assert_eq!(status, 404);
    assert_eq!(body["path"], "/nowhere");

    handle.stop();
}

#[test]
fn test_document_endpoint_serves_live_document() {
    let (handle, addr, _dir) = start_demo();

    let (status, doc) = parse_json_response(&get(&addr, "/api-docs", ""));
    assert_eq!(status, 200);
    assert_eq!(doc["openapi"], "3.0.1");
    assert_eq!(doc["info"]["title"], "General API");
    assert!(doc["paths"]["/"]["get"].is_object());
    assert!(doc["paths"]["/user"]["post"].is_object());
    assert!(doc["paths"]["/user/:userId"]["delete"]["security"].is_array());
    assert_eq!(doc["tags"][0]["name"], "user");

    handle.stop();
}

#[test]
fn test_form_encoded_body_reaches_handler() {
    let (handle, addr, _dir) = start_demo();

    let (status, created) = parse_json_response(&send(
        &addr,
        "POST",
        "/api/user",
        "Content-Type: application/x-www-form-urlencoded\r\n",
        "email=ada%40example.com&password=analytical&firstName=Ada&lastName=Lovelace",
    ));
    assert_eq!(status, 201);
    assert_eq!(created["email"], "ada@example.com");
    assert_eq!(created["firstName"], "Ada");

    let (status, body) = parse_json_response(&send(
        &addr,
        "POST",
        "/api/user",
        "Content-Type: application/json\r\n",
        r#"{"email":"bad","password":"short","firstName":"A","lastName":"B"}"#,
    ));
    assert_eq!(status, 403);
    assert_eq!(body["error"], "Validation Failed");

    handle.stop();
}
