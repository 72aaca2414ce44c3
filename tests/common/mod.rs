#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{multipart, StatusCode};
use serde_json::{json, Value};

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub upload_dir: PathBuf,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let upload_dir = std::env::temp_dir().join(format!("ticketing-it-{}", port));

        // Every test gets its own server with an empty in-memory store
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_ticketing-api"));
        cmd.env("APP_ENV", "development")
            .env("HOST", "127.0.0.1")
            .env("PORT", port.to_string())
            .env("STORE_BACKEND", "memory")
            .env("JWT_SECRET", "integration-test-secret")
            .env("UPLOAD_DIR", &upload_dir)
            .env("PUBLIC_BASE_URL", &base_url)
            .env("RUST_LOG", "warn")
            .env_remove("RECOMMENDATION_URL")
            .env_remove("DATABASE_URL")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, upload_dir, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

/// Start a server and wait for `/health`; it is stopped when dropped.
pub async fn spawn_server() -> Result<TestServer> {
    let server = TestServer::spawn()?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Register `username` (password `secret123`) and return a bearer token.
pub async fn register_and_login(server: &TestServer, username: &str) -> Result<String> {
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/user/register"))
        .json(&json!({
            "username": username,
            "name": format!("{} tester", username),
            "email": format!("{}@example.com", username),
            "password": "secret123",
            "confirm_password": "secret123"
        }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());

    let body: Value = client
        .post(server.url("/api/user/login"))
        .json(&json!({ "username": username, "password": "secret123" }))
        .send()
        .await?
        .json()
        .await?;

    body["data"]["access_token"]
        .as_str()
        .map(str::to_string)
        .context("login response has no access_token")
}

pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";

/// Multipart body for a valid event ticket; `overrides` replace or drop (`None`) fields.
pub fn ticket_form(overrides: &[(&str, Option<&str>)]) -> multipart::Form {
    let mut fields = vec![
        ("title", "Concert"),
        ("price", "50000"),
        ("description", "Live music"),
        ("street_location", "Jakarta"),
        ("coordinates", "-6.2,106.8"),
        ("type", "event"),
        ("start_datetime", "2025-01-01T10:00:00Z"),
        ("end_datetime", "2025-01-01T12:00:00Z"),
    ];
    for (name, value) in overrides {
        fields.retain(|(n, _)| n != name);
        if let Some(value) = value {
            fields.push((*name, *value));
        }
    }

    let mut form = multipart::Form::new();
    for (name, value) in fields {
        form = form.text(name.to_string(), value.to_string());
    }
    form
}

pub fn with_image(form: multipart::Form, bytes: Vec<u8>, mime: &str) -> Result<multipart::Form> {
    let part = multipart::Part::bytes(bytes).file_name("poster.png").mime_str(mime)?;
    Ok(form.part("image_file", part))
}
