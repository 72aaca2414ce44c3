mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn register_returns_summary_and_rejects_duplicates() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let payload = json!({
        "username": "budi",
        "name": "Budi",
        "email": "budi@example.com",
        "password": "secret123",
        "confirm_password": "secret123"
    });

    let res = client.post(server.url("/api/user/register")).json(&payload).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Registration Success");
    assert_eq!(body["data"], json!({"username": "budi", "name": "Budi", "email": "budi@example.com"}));

    let res = client.post(server.url("/api/user/register")).json(&payload).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["field_errors"]["username"], "Username already exist");
    Ok(())
}

#[tokio::test]
async fn register_reports_every_violation() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = reqwest::Client::new()
        .post(server.url("/api/user/register"))
        .json(&json!({"username": "x", "email": "nope", "password": "123", "confirm_password": "321"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<Value>().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    for field in ["name", "email", "password", "confirm_password"] {
        assert!(body["field_errors"].get(field).is_some(), "missing {}: {}", field, body);
    }
    Ok(())
}

#[tokio::test]
async fn login_issues_bearer_tokens() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    common::register_and_login(&server, "citra").await?;

    let res = client
        .post(server.url("/api/user/login"))
        .json(&json!({"username": "citra", "password": "secret123"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["data"]["token_type"], "bearer");
    assert!(body["data"]["expires_in"].as_u64().unwrap_or(0) > 0);

    for (username, password) in [("citra", "wrong-password"), ("nobody", "secret123")] {
        let res = client
            .post(server.url("/api/user/login"))
            .json(&json!({"username": username, "password": password}))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = res.json::<Value>().await?;
        assert_eq!(body["message"], "Invalid username or password");
    }
    Ok(())
}

#[tokio::test]
async fn edit_requires_a_token_and_keeps_omitted_fields() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let token = common::register_and_login(&server, "dewi").await?;

    let res = client
        .put(server.url("/api/user/edit"))
        .json(&json!({"name": "Dewi"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .put(server.url("/api/user/edit"))
        .bearer_auth("not-a-token")
        .json(&json!({"name": "Dewi"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .put(server.url("/api/user/edit"))
        .bearer_auth(&token)
        .json(&json!({"name": "Dewi Lestari"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["data"]["name"], "Dewi Lestari");
    assert_eq!(body["data"]["email"], "dewi@example.com");

    let res = client
        .put(server.url("/api/user/edit"))
        .bearer_auth(&token)
        .json(&json!({"email": "broken"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
