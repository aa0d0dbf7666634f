//! Shared helpers for integration tests against a mock Appwrite server.

#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::{Value, json};

pub const PROJECT_ID: &str = "proj-test";
pub const DATABASE_ID: &str = "db-test";
pub const COLLECTION_ID: &str = "posts";
pub const BUCKET_ID: &str = "images";

pub fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

/// `megablog` with an isolated home and every backend id pointing at `server_uri`.
pub fn megablog(home: &Path, server_uri: &str) -> Command {
    let mut cmd = cargo_bin_cmd!("megablog");
    cmd.env("MEGABLOG_HOME", home)
        .env("MEGABLOG_APPWRITE_URL", format!("{server_uri}/v1"))
        .env("MEGABLOG_APPWRITE_PROJECT_ID", PROJECT_ID)
        .env("MEGABLOG_APPWRITE_DATABASE_ID", DATABASE_ID)
        .env("MEGABLOG_APPWRITE_COLLECTION_ID", COLLECTION_ID)
        .env("MEGABLOG_APPWRITE_BUCKET_ID", BUCKET_ID)
        .env_remove("MEGABLOG_PASSWORD");
    cmd
}

pub fn documents_path() -> String {
    format!("/v1/databases/{DATABASE_ID}/collections/{COLLECTION_ID}/documents")
}

pub fn document_path(id: &str) -> String {
    format!("{}/{id}", documents_path())
}

pub fn post_json(id: &str, title: &str, status: &str, user_id: &str) -> Value {
    json!({
        "$id": id,
        "title": title,
        "content": "<p>First paragraph</p><p>Second &amp; last</p>",
        "featuredImage": format!("file-{id}"),
        "status": status,
        "userID": user_id,
        "$createdAt": "2024-05-01T10:00:00.000+00:00",
        "$updatedAt": "2024-05-02T10:00:00.000+00:00",
    })
}

pub fn user_json(id: &str, name: &str, email: &str) -> Value {
    json!({ "$id": id, "name": name, "email": email })
}

/// Writes a saved session so commands start signed in.
pub fn write_session(home: &Path, server_uri: &str, cookie: &str) {
    let session = json!({
        "endpoint": format!("{server_uri}/v1"),
        "project_id": PROJECT_ID,
        "cookie": cookie,
        "user_id": "u1",
    });
    std::fs::write(home.join("session.json"), session.to_string()).unwrap();
}
