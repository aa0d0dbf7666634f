//! Account commands against a mock Appwrite server.

mod support;

use predicates::prelude::*;
use serde_json::json;
use support::{can_bind_localhost, megablog, user_json, write_session};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session_response() -> ResponseTemplate {
    ResponseTemplate::new(201)
        .insert_header("X-Fallback-Cookies", "cookie-from-login")
        .set_body_json(json!({
            "$id": "s1",
            "userId": "u1",
            "expire": "2030-01-01T00:00:00.000+00:00",
        }))
}

#[tokio::test]
async fn test_login_persists_session_and_whoami_uses_it() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/account/sessions/email"))
        .and(body_partial_json(json!({ "email": "ann@example.com" })))
        .respond_with(session_response())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/account"))
        .and(header("X-Fallback-Cookies", "cookie-from-login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(user_json("u1", "Ann", "ann@example.com")),
        )
        .mount(&server)
        .await;

    megablog(home.path(), &server.uri())
        .args(["login", "--email", "ann@example.com"])
        .env("MEGABLOG_PASSWORD", "Secret1!")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as Ann <ann@example.com>"));

    assert!(home.path().join("session.json").exists());

    megablog(home.path(), &server.uri())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ann <ann@example.com> (u1)"));
}

#[tokio::test]
async fn test_login_rejected_by_server() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/account/sessions/email"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Invalid credentials. Please check the email and password.",
            "code": 401,
            "type": "user_invalid_credentials",
        })))
        .mount(&server)
        .await;

    megablog(home.path(), &server.uri())
        .args(["login", "--email", "ann@example.com", "--password", "wrongpass"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid credentials"));

    assert!(!home.path().join("session.json").exists());
}

#[tokio::test]
async fn test_login_validates_before_calling_backend() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(session_response())
        .expect(0)
        .mount(&server)
        .await;

    megablog(home.path(), &server.uri())
        .args(["login", "--email", "not-an-email", "--password", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("email"));
}

#[tokio::test]
async fn test_signup_requires_terms_and_strong_password() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    megablog(home.path(), &server.uri())
        .args([
            "signup",
            "--name",
            "Ann Lee",
            "--email",
            "ann@example.com",
            "--password",
            "weakpass",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("accept_terms"))
        .stderr(predicate::str::contains("password"));
}

#[tokio::test]
async fn test_signup_creates_account_then_logs_in() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/account"))
        .and(body_partial_json(json!({
            "email": "ann@example.com",
            "name": "Ann Lee",
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(user_json("u1", "Ann Lee", "ann@example.com")),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/account/sessions/email"))
        .respond_with(session_response())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/account"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(user_json("u1", "Ann Lee", "ann@example.com")),
        )
        .mount(&server)
        .await;

    megablog(home.path(), &server.uri())
        .args([
            "signup",
            "--name",
            "Ann Lee",
            "--email",
            "ann@example.com",
            "--password",
            "Str0ng!Pass",
            "--accept-terms",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Welcome, Ann Lee!"));
}

#[tokio::test]
async fn test_logout_clears_saved_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    write_session(home.path(), &server.uri(), "cookie-1");

    Mock::given(method("DELETE"))
        .and(path("/v1/account/sessions/current"))
        .and(header("X-Fallback-Cookies", "cookie-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    megablog(home.path(), &server.uri())
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed out."));

    assert!(!home.path().join("session.json").exists());

    megablog(home.path(), &server.uri())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not signed in."));
}

#[tokio::test]
async fn test_logout_server_failure_still_signs_out_locally() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    write_session(home.path(), &server.uri(), "cookie-1");

    Mock::given(method("DELETE"))
        .and(path("/v1/account/sessions/current"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    megablog(home.path(), &server.uri())
        .arg("logout")
        .assert()
        .success()
        .stderr(predicate::str::contains("did not confirm"));

    assert!(!home.path().join("session.json").exists());
}
