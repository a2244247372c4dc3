// system-tests/tests/suites/measurement_flow.rs
// ============================================================================
// Module: Measurement Flow Tests
// Description: End-to-end measure, listing, and leaderboard behavior.
// Purpose: Validate the public API against a real server and database.
// Dependencies: system-tests helpers
// ============================================================================

//! ## Overview
//! Drives the public endpoints over HTTP: stable values per normalized name,
//! validation messages, listing toggles, and leaderboard ordering.

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
use crate::helpers::harness::spawn_ruler_server_with;

type TestResult = Result<(), String>;

async fn measure(client: &RulerClient, name: &str) -> Result<Value, String> {
    Ok(client.post("/api/measure", None, &json!({ "name": name })).await?.expect_status(200)?.body)
}

async fn list(client: &RulerClient, name: &str, upload: bool) -> Result<Value, String> {
    Ok(client
        .post("/api/leaderboard", None, &json!({ "name": name, "upload": upload }))
        .await?
        .expect_status(200)?
        .body)
}

fn values(entries: &Value) -> Vec<i64> {
    entries.as_array().map_or_else(Vec::new, |rows| {
        rows.iter().filter_map(|row| row["value"].as_i64()).collect()
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn repeat_measurements_are_stable_per_normalized_name() -> TestResult {
    let server = spawn_ruler_server().await?;
    let client = server.client()?;

    let first = measure(&client, "Zaphod Beeblebrox").await?;
    let value = first["value"].as_i64().ok_or("missing value")?;
    assert!((1 ..= 25).contains(&value), "fresh draw out of range: {value}");
    assert_eq!(first["listed"], json!(false));
    assert!(first["comment"].as_str().is_some_and(|comment| !comment.is_empty()));
    assert_eq!(first["ranks"], json!({ "ascending": 1, "descending": 1 }));

    let second = measure(&client, "  zaphod BEEBLEBROX ").await?;
    assert_eq!(second["measurementId"], first["measurementId"]);
    assert_eq!(second["value"], first["value"]);
    assert_eq!(second["name"], json!("zaphod BEEBLEBROX"));

    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_input_is_rejected_with_messages() -> TestResult {
    let server = spawn_ruler_server().await?;
    let client = server.client()?;

    let missing = client.post("/api/measure", None, &json!({})).await?.expect_status(400)?;
    assert_eq!(missing.error_message(), Some("name is required"));

    let blank = client.post("/api/measure", None, &json!({ "name": "   " })).await?;
    let blank = blank.expect_status(400)?;
    assert_eq!(blank.error_message(), Some("please enter a valid name"));

    let long = "x".repeat(101);
    let too_long = client.post("/api/measure", None, &json!({ "name": long })).await?;
    assert_eq!(too_long.expect_status(400)?.error_message(), Some("name is too long"));

    let malformed = client.post_raw("/api/measure", "{not json").await?.expect_status(400)?;
    assert!(malformed.error_message().is_some());

    let unmeasured = client
        .post("/api/leaderboard", None, &json!({ "name": "nobody", "upload": true }))
        .await?
        .expect_status(404)?;
    assert_eq!(
        unmeasured.error_message(),
        Some("measure first before uploading to the leaderboard")
    );

    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn listing_toggles_leaderboard_membership() -> TestResult {
    let server = spawn_ruler_server().await?;
    let client = server.client()?;
    let names = ["Arthur", "Ford", "Trillian", "Marvin", "Slartibartfast"];
    for name in names {
        measure(&client, name).await?;
        let listed = list(&client, name, true).await?;
        assert_eq!(listed["listed"], json!(true));
    }

    let board = client.get("/api/leaderboard", None).await?.expect_status(200)?.body;
    let ascending = values(&board["ascending"]);
    let descending = values(&board["descending"]);
    assert_eq!(ascending.len(), names.len());
    assert!(ascending.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(descending.windows(2).all(|pair| pair[0] >= pair[1]));
    assert!(board["ascending"][0]["listedAt"].is_string());

    let min = ascending[0];
    let lowest = board["ascending"][0]["name"].as_str().ok_or("missing name")?.to_string();
    let remeasured = measure(&client, &lowest).await?;
    assert_eq!(remeasured["value"].as_i64(), Some(min));
    assert_eq!(remeasured["ranks"]["ascending"], json!(1));
    assert_eq!(remeasured["listed"], json!(true));

    let unlisted = list(&client, &lowest, false).await?;
    assert_eq!(unlisted["listed"], json!(false));
    let board = client.get("/api/leaderboard", None).await?.expect_status(200)?.body;
    assert_eq!(values(&board["ascending"]).len(), names.len() - 1);

    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn leaderboard_respects_configured_limit() -> TestResult {
    let server = spawn_ruler_server_with("[leaderboard]\nlimit = 2").await?;
    let client = server.client()?;
    for name in ["one", "two", "three", "four"] {
        measure(&client, name).await?;
        list(&client, name, true).await?;
    }
    let board = client.get("/api/leaderboard", None).await?.expect_status(200)?.body;
    assert_eq!(values(&board["ascending"]).len(), 2);
    assert_eq!(values(&board["descending"]).len(), 2);

    server.shutdown().await;
    Ok(())
}
