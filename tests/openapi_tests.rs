//! Tests for OpenAPI document synthesis and overlay loading
//!
//! # Test Coverage
//!
//! - Operation shape for body, query and path parameters
//! - Response ordering and content schemas
//! - Security requirements and global tags
//! - Overlay replacement, error handling and reload after reset
//! - Programmatic `info` and tag mutation

use routedoc::controllers::{HelloWorldController, UserController};
use routedoc::openapi::Tag;
use routedoc::{register_group, DocumentError, DocumentService};
use serde_json::{json, Map, Value};
use tempfile::TempDir;

mod common;
use common::overlay::write_overlay;

/// Service whose overlay location is an empty temp directory
fn isolated_service() -> (DocumentService, TempDir) {
    let dir = TempDir::new().unwrap();
    let docs = DocumentService::with_overlay_path(dir.path().join("OpenAPI.json"));
    (docs, dir)
}

fn rendered(docs: &DocumentService) -> Value {
    docs.get_document().unwrap().render().unwrap()
}

fn user_document() -> Value {
    let (docs, _dir) = isolated_service();
    register_group(UserController::default(), &docs).unwrap();
    rendered(&docs)
}

#[test]
fn test_create_user_operation() {
    let doc = user_document();
    let post = &doc["paths"]["/user"]["post"];

    assert_eq!(post["description"], "Create a new user");
    assert_eq!(post["tags"], json!(["user"]));

    let codes: Vec<&String> = post["responses"].as_object().unwrap().keys().collect();
    assert_eq!(codes, vec!["201", "400", "403", "409"]);
    assert_eq!(post["responses"]["201"], json!({ "description": "User Created" }));

    let body = &post["requestBody"];
    assert_eq!(
        body["description"],
        "User information about the user to be added to the system"
    );
    assert_eq!(body["required"], true);
    let schema = &body["content"]["application/json"]["schema"];
    assert_eq!(schema["type"], "object");
    assert_eq!(
        schema["properties"],
        json!({
            "email": { "type": "string" },
            "password": { "type": "string" },
            "firstName": { "type": "string" },
            "lastName": { "type": "string" }
        })
    );
    assert_eq!(
        schema["example"],
        json!({
            "email": "user@example.com",
            "password": "L1m1t3dAcc355",
            "firstName": "Paul",
            "lastName": "Forbes"
        })
    );
    assert_eq!(
        schema["required"],
        json!(["email", "password", "firstName", "lastName"])
    );
    assert!(post.get("parameters").is_none());
}

#[test]
fn test_list_users_query_parameters() {
    let doc = user_document();
    let get = &doc["paths"]["/user"]["get"];

    assert_eq!(
        get["parameters"],
        json!([
            {
                "name": "active",
                "in": "query",
                "description": "Filter users by active status",
                "required": false,
                "schema": { "type": "boolean" },
                "example": "true"
            },
            {
                "name": "name",
                "in": "query",
                "description": "Search users by first or last name",
                "required": false,
                "schema": { "type": "string" },
                "example": "Forbes"
            }
        ])
    );

    let ok = &get["responses"]["200"]["content"]["application/json"];
    assert_eq!(ok["schema"], json!({ "type": "array" }));
    assert!(ok["example"].is_array());
    assert_eq!(get["responses"]["500"]["description"], "Internal Error");
    assert!(get.get("requestBody").is_none());
}

#[test]
fn test_path_parameter_and_security() {
    let doc = user_document();
    let item = &doc["paths"]["/user/:userId"];

    let param = &item["get"]["parameters"][0];
    assert_eq!(param["name"], "userId");
    assert_eq!(param["in"], "path");
    assert_eq!(param["required"], true);
    assert_eq!(param["example"], "1");
    assert!(item["get"].get("security").is_none());

    assert_eq!(item["delete"]["security"], json!([{ "apiKey": [] }]));
    let codes: Vec<&String> = item["delete"]["responses"]
        .as_object()
        .unwrap()
        .keys()
        .collect();
    assert_eq!(codes, vec!["200", "401", "404"]);
}

#[test]
fn test_group_tag_added_once() {
    let (docs, _dir) = isolated_service();
    register_group(UserController::default(), &docs).unwrap();
    register_group(UserController::default(), &docs).unwrap();

    let doc = rendered(&docs);
    assert_eq!(
        doc["tags"],
        json!([{ "name": "user", "description": "Create and manage users in the system" }])
    );
    let paths = doc["paths"].as_object().unwrap();
    assert_eq!(paths.len(), 2);
    let post_codes = doc["paths"]["/user"]["post"]["responses"]
        .as_object()
        .unwrap()
        .len();
    assert_eq!(post_codes, 4);
}

#[test]
fn test_untagged_group_operations() {
    let (docs, _dir) = isolated_service();
    register_group(HelloWorldController::default(), &docs).unwrap();

    let doc = rendered(&docs);
    let root = &doc["paths"]["/"]["get"];
    assert_eq!(root["description"], "Get a Hello World");
    assert!(root.get("tags").is_none());
    assert!(root.get("parameters").is_none());
    assert_eq!(root["responses"]["200"]["description"], "Success");
    assert!(doc["paths"]["/second"]["get"].is_object());
    assert!(doc.get("tags").is_none());
}

#[test]
fn test_handler_renders_live_document() {
    let (docs, _dir) = isolated_service();
    let handler = docs.get_document().unwrap();
    let before = handler.render().unwrap();
    assert_eq!(
        before,
        json!({ "openapi": "3.0.1", "info": { "title": "General API", "version": "1" } })
    );

    register_group(UserController::default(), &docs).unwrap();
    let after = handler.render().unwrap();
    assert!(after["paths"]["/user"]["post"].is_object());
}

#[test]
fn test_overlay_replaces_sections() {
    let dir = TempDir::new().unwrap();
    let path = write_overlay(
        dir.path(),
        r#"{
            "info": { "title": "User Service", "version": "2.1" },
            "servers": [{ "url": "https://api.example.com" }],
            "components": {
                "securitySchemes": { "apiKey": { "type": "apiKey", "in": "header", "name": "x-api-key" } }
            },
            "tags": [{ "name": "admin", "description": "Operator endpoints" }],
            "paths": { "/ignored": {} }
        }"#,
    );
    let docs = DocumentService::with_overlay_path(&path);
    register_group(UserController::default(), &docs).unwrap();

    let doc = rendered(&docs);
    assert_eq!(doc["info"]["title"], "User Service");
    assert_eq!(doc["servers"][0]["url"], "https://api.example.com");
    assert_eq!(
        doc["components"]["securitySchemes"]["apiKey"]["name"],
        "x-api-key"
    );
    // Overlay tags replace the route-driven ones wholesale
    assert_eq!(
        doc["tags"],
        json!([{ "name": "admin", "description": "Operator endpoints" }])
    );
    assert!(doc["paths"].get("/ignored").is_none());
    assert!(doc["paths"]["/user"].is_object());
}

#[test]
fn test_overlay_loaded_once_until_reset() {
    let dir = TempDir::new().unwrap();
    let path = write_overlay(dir.path(), r#"{ "info": { "title": "First" } }"#);
    let docs = DocumentService::with_overlay_path(&path);

    assert!(docs.load_overlay().unwrap());
    assert!(!docs.load_overlay().unwrap());

    write_overlay(dir.path(), r#"{ "info": { "title": "Second" } }"#);
    assert_eq!(rendered(&docs)["info"]["title"], "First");

    docs.reset();
    assert_eq!(docs.overlay_path(), path);
    assert_eq!(rendered(&docs)["info"]["title"], "Second");
}

#[test]
fn test_changing_overlay_path_reloads() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let docs = DocumentService::with_overlay_path(write_overlay(
        first.path(),
        r#"{ "servers": [{ "url": "http://one" }] }"#,
    ));
    assert_eq!(rendered(&docs)["servers"][0]["url"], "http://one");

    docs.set_overlay_path(write_overlay(
        second.path(),
        r#"{ "servers": [{ "url": "http://two" }] }"#,
    ));
    assert_eq!(rendered(&docs)["servers"][0]["url"], "http://two");
}

#[test]
fn test_missing_overlay_is_not_an_error() {
    let (docs, _dir) = isolated_service();
    assert!(docs.load_overlay().unwrap());
    assert!(!docs.load_overlay().unwrap());
    assert_eq!(rendered(&docs)["info"]["title"], "General API");
}

#[test]
fn test_malformed_overlay_is_reported_and_retried() {
    let dir = TempDir::new().unwrap();
    let path = write_overlay(dir.path(), "{ not json");
    let docs = DocumentService::with_overlay_path(&path);

    let err = docs.get_document().unwrap_err();
    assert!(matches!(err, DocumentError::Parse { .. }));
    assert!(err.to_string().contains("OpenAPI.json"));

    write_overlay(dir.path(), r#"{ "info": { "title": "Fixed" } }"#);
    assert_eq!(rendered(&docs)["info"]["title"], "Fixed");
}

#[test]
fn test_overlay_tags_must_be_an_array() {
    let dir = TempDir::new().unwrap();
    let path = write_overlay(dir.path(), r#"{ "tags": { "name": "user" } }"#);
    let docs = DocumentService::with_overlay_path(&path);
    assert!(matches!(
        docs.load_overlay(),
        Err(DocumentError::Parse { .. })
    ));
}

#[test]
fn test_info_and_tag_mutation() {
    let (docs, _dir) = isolated_service();
    docs.set_info(json!({ "title": "Users", "version": "3" }));

    let mut extra = Map::new();
    extra.insert("description".to_string(), json!("User management"));
    extra.insert("version".to_string(), json!("4"));
    docs.merge_info(extra);

    docs.add_tags(["user"]);
    docs.add_tags(vec![Tag::with_description("user", "Duplicate kept")]);

    let doc = rendered(&docs);
    assert_eq!(
        doc["info"],
        json!({ "title": "Users", "version": "4", "description": "User management" })
    );
    assert_eq!(
        doc["tags"],
        json!([{ "name": "user" }, { "name": "user", "description": "Duplicate kept" }])
    );

    docs.reset();
    let doc = rendered(&docs);
    assert_eq!(doc["info"]["title"], "General API");
    assert!(doc.get("tags").is_none());
}

#[test]
fn test_snapshot_matches_render() {
    let (docs, _dir) = isolated_service();
    register_group(UserController::default(), &docs).unwrap();
    let snapshot = serde_json::to_value(docs.snapshot()).unwrap();
    assert_eq!(snapshot, rendered(&docs));
}
