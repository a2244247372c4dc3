// system-tests/tests/suites/admin_flow.rs
// ============================================================================
// Module: Admin Flow Tests
// Description: End-to-end setup gate, sessions, and curation behavior.
// Purpose: Validate the admin API against a real server and database.
// Dependencies: system-tests helpers
// ============================================================================

//! ## Overview
//! Bootstraps the single admin over HTTP, then exercises login, the bearer
//! guard, bans, easter eggs, and measurement edits.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use serde_json::Value;
use serde_json::json;

use crate::helpers::client::RulerClient;
use crate::helpers::harness::spawn_ruler_server;

type TestResult = Result<(), String>;

const USERNAME: &str = "operator";
const PASSWORD: &str = "correct-horse-battery";

async fn bootstrap(client: &RulerClient) -> Result<String, String> {
    let response = client
        .post("/api/admin/init", None, &json!({ "username": USERNAME, "password": PASSWORD }))
        .await?
        .expect_status(200)?;
    response.body["token"].as_str().map(ToString::to_string).ok_or_else(|| "missing token".into())
}

fn id_of(body: &Value) -> Result<i64, String> {
    body["id"].as_i64().ok_or_else(|| format!("missing id in {body}"))
}

#[tokio::test(flavor = "multi_thread")]
async fn setup_gate_opens_exactly_once() -> TestResult {
    let server = spawn_ruler_server().await?;
    let client = server.client()?;

    let status = client.get("/api/admin/status", None).await?.expect_status(200)?;
    assert_eq!(status.body, json!({ "ready": false }));

    let rejected = client
        .post("/api/admin/init", None, &json!({ "username": "op", "password": PASSWORD }))
        .await?
        .expect_status(400)?;
    assert!(rejected.error_message().is_some());

    let token = bootstrap(&client).await?;
    assert!(!token.is_empty());
    let status = client.get("/api/admin/status", None).await?.expect_status(200)?;
    assert_eq!(status.body, json!({ "ready": true }));

    client
        .post("/api/admin/init", None, &json!({ "username": "second", "password": PASSWORD }))
        .await?
        .expect_status(409)?;
    client.post_raw("/api/admin/init", "{garbage").await?.expect_status(409)?;

    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn login_and_bearer_guard() -> TestResult {
    let server = spawn_ruler_server().await?;
    let client = server.client()?;
    let bootstrap_token = bootstrap(&client).await?;

    let login = client
        .post(
            "/api/admin/auth/login",
            None,
            &json!({ "username": USERNAME, "password": PASSWORD }),
        )
        .await?
        .expect_status(200)?;
    let token = login.body["token"].as_str().ok_or("missing token")?.to_string();
    assert_ne!(token, bootstrap_token);

    let wrong_password = client
        .post(
            "/api/admin/auth/login",
            None,
            &json!({ "username": USERNAME, "password": "nope-nope" }),
        )
        .await?
        .expect_status(401)?;
    let unknown_user = client
        .post("/api/admin/auth/login", None, &json!({ "username": "ghost", "password": PASSWORD }))
        .await?
        .expect_status(401)?;
    assert_eq!(wrong_password.error_message(), Some("invalid username or password"));
    assert_eq!(wrong_password.body, unknown_user.body);

    client.get("/api/admin/banned", None).await?.expect_status(401)?;
    client.get("/api/admin/banned", Some("forged-token")).await?.expect_status(401)?;
    let bans = client.get("/api/admin/banned", Some(&token)).await?.expect_status(200)?;
    assert_eq!(bans.body, json!([]));
    client.get("/api/admin/easter-eggs", Some(&bootstrap_token)).await?.expect_status(200)?;

    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn bans_reject_measurements_until_removed() -> TestResult {
    let server = spawn_ruler_server().await?;
    let client = server.client()?;
    let token = bootstrap(&client).await?;

    let created = client
        .post("/api/admin/banned", Some(&token), &json!({ "value": "Voldemort" }))
        .await?
        .expect_status(201)?;
    let ban_id = id_of(&created.body)?;

    let blocked = client
        .post("/api/measure", None, &json!({ "name": "  VOLDEMORT " }))
        .await?
        .expect_status(403)?;
    assert_eq!(
        blocked.error_message(),
        Some("this string has been banned by the administrator")
    );

    let updated = client
        .post(
            "/api/admin/banned",
            Some(&token),
            &json!({ "value": "voldemort", "reason": "he who must not be named" }),
        )
        .await?
        .expect_status(201)?;
    assert_eq!(id_of(&updated.body)?, ban_id);
    let blocked = client
        .post("/api/measure", None, &json!({ "name": "Voldemort" }))
        .await?
        .expect_status(403)?;
    assert_eq!(blocked.error_message(), Some("he who must not be named"));

    let reposted = client
        .post("/api/admin/banned", Some(&token), &json!({ "value": "VOLDEMORT" }))
        .await?
        .expect_status(201)?;
    assert_eq!(reposted.body["reason"], json!("he who must not be named"));

    let bans = client.get("/api/admin/banned", Some(&token)).await?.expect_status(200)?;
    assert_eq!(bans.body.as_array().map(Vec::len), Some(1));

    let deleted = client
        .delete(&format!("/api/admin/banned/{ban_id}"), Some(&token))
        .await?
        .expect_status(200)?;
    assert_eq!(deleted.body, json!({ "success": true }));
    client.post("/api/measure", None, &json!({ "name": "Voldemort" })).await?.expect_status(200)?;
    client
        .delete(&format!("/api/admin/banned/{ban_id}"), Some(&token))
        .await?
        .expect_status(404)?;

    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn easter_eggs_force_values_for_new_names() -> TestResult {
    let server = spawn_ruler_server().await?;
    let client = server.client()?;
    let token = bootstrap(&client).await?;

    let egg = client
        .post(
            "/api/admin/easter-eggs",
            Some(&token),
            &json!({ "trigger": "Deep Thought", "value": 42, "note": "the answer" }),
        )
        .await?
        .expect_status(201)?;
    let egg_id = id_of(&egg.body)?;

    let measured = client
        .post("/api/measure", None, &json!({ "name": "deep thought" }))
        .await?
        .expect_status(200)?;
    assert_eq!(measured.body["value"], json!(42));

    client
        .post("/api/admin/easter-eggs", Some(&token), &json!({ "trigger": "x", "value": 10000 }))
        .await?
        .expect_status(400)?;

    client
        .delete(&format!("/api/admin/easter-eggs/{egg_id}"), Some(&token))
        .await?
        .expect_status(200)?;
    let eggs = client.get("/api/admin/easter-eggs", Some(&token)).await?.expect_status(200)?;
    assert_eq!(eggs.body, json!([]));

    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn measurement_edits_flow_into_leaderboard() -> TestResult {
    let server = spawn_ruler_server().await?;
    let client = server.client()?;
    let token = bootstrap(&client).await?;

    let measured = client
        .post("/api/measure", None, &json!({ "name": "Arthur Dent" }))
        .await?
        .expect_status(200)?;
    let id = measured.body["measurementId"].as_i64().ok_or("missing id")?;
    client
        .post("/api/leaderboard", None, &json!({ "name": "arthur dent" }))
        .await?
        .expect_status(200)?;
    client.post("/api/measure", None, &json!({ "name": "Ford" })).await?.expect_status(200)?;

    let found = client
        .get("/api/admin/measurements?q=ARTHUR", Some(&token))
        .await?
        .expect_status(200)?;
    assert_eq!(found.body.as_array().map(Vec::len), Some(1));
    let everything = client.get("/api/admin/measurements", Some(&token)).await?;
    assert_eq!(everything.expect_status(200)?.body.as_array().map(Vec::len), Some(2));

    let edited = client
        .patch(
            &format!("/api/admin/measurements/{id}"),
            Some(&token),
            &json!({ "value": -9999, "name": "Arthur" }),
        )
        .await?
        .expect_status(200)?;
    assert_eq!(edited.body["value"], json!(-9999));
    assert_eq!(edited.body["normalizedName"], json!("arthur"));

    let board = client.get("/api/leaderboard", None).await?.expect_status(200)?;
    assert_eq!(board.body["ascending"][0]["value"], json!(-9999));
    assert_eq!(board.body["ascending"][0]["name"], json!("Arthur"));

    client
        .patch(
            &format!("/api/admin/measurements/{id}"),
            Some(&token),
            &json!({ "value": 1, "name": "FORD" }),
        )
        .await?
        .expect_status(409)?;
    client
        .patch("/api/admin/measurements/424242", Some(&token), &json!({ "value": 1 }))
        .await?
        .expect_status(404)?;
    client
        .patch(&format!("/api/admin/measurements/{id}"), Some(&token), &json!({ "value": 10000 }))
        .await?
        .expect_status(400)?;

    server.shutdown().await;
    Ok(())
}
