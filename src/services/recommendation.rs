// services/recommendation.rs - Relay to the external recommendation service

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

use crate::config::RecommendationConfig;
use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("Recommendation service is not configured")]
    NotConfigured,

    #[error("{0}")]
    Upstream(String),
}

impl From<RecommendationError> for ApiError {
    fn from(err: RecommendationError) -> Self {
        match err {
            RecommendationError::NotConfigured => ApiError::service_unavailable(err.to_string()),
            RecommendationError::Upstream(msg) => ApiError::internal_server_error(msg),
        }
    }
}

#[derive(Clone)]
pub struct RecommendationClient {
    client: reqwest::Client,
    url: Option<String>,
    timeout: Duration,
}

impl RecommendationClient {
    pub fn new(client: reqwest::Client, config: &RecommendationConfig) -> Self {
        Self {
            client,
            url: config.url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// POST `username` as a form field and return the service's JSON answer untouched.
    pub async fn recommend(&self, username: &str) -> Result<Value, RecommendationError> {
        let url = self.url.as_deref().ok_or(RecommendationError::NotConfigured)?;

        let response = self
            .client
            .post(url)
            .form(&[("username", username)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| upstream("request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Recommendation service answered {}: {}", status, body);
            return Err(RecommendationError::Upstream(format!(
                "Recommendation service answered {}",
                status
            )));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| upstream("invalid response body", e))?;
        info!("Fetched recommendations for {}", username);
        Ok(body)
    }
}

fn upstream(context: &str, err: reqwest::Error) -> RecommendationError {
    error!("Recommendation {}: {}", context, err);
    RecommendationError::Upstream(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Form, Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    /// Serve `upstream` on an ephemeral port and return its `/recommend` url.
    async fn serve(upstream: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, upstream).await.unwrap() });
        format!("http://{}/recommend", addr)
    }

    fn client(url: Option<&str>) -> RecommendationClient {
        RecommendationClient::new(
            reqwest::Client::new(),
            &RecommendationConfig {
                url: url.map(str::to_string),
                timeout_secs: 1,
            },
        )
    }

    #[tokio::test]
    async fn unconfigured_service_is_unavailable() {
        let err = client(None).recommend("alice").await.unwrap_err();
        assert!(matches!(err, RecommendationError::NotConfigured));
        assert_eq!(ApiError::from(err).status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn unreachable_service_passes_the_message_through() {
        let port = portpicker::pick_unused_port().expect("free port");
        let err = client(Some(&format!("http://127.0.0.1:{}/recommend", port)))
            .recommend("alice")
            .await
            .unwrap_err();

        let RecommendationError::Upstream(message) = err else {
            panic!("expected upstream error");
        };
        assert!(!message.is_empty());
    }

    #[tokio::test]
    async fn posts_the_username_form_and_relays_the_answer() {
        let upstream = Router::new().route(
            "/recommend",
            post(|Form(form): Form<HashMap<String, String>>| async move {
                Json(json!({"for": form.get("username"), "fields": form.len(), "items": [1, 2]}))
            }),
        );
        let url = serve(upstream).await;

        let body = client(Some(&url)).recommend("alice").await.unwrap();
        assert_eq!(body, json!({"for": "alice", "fields": 1, "items": [1, 2]}));
    }

    #[tokio::test]
    async fn upstream_error_status_is_an_upstream_failure() {
        let upstream = Router::new().route(
            "/recommend",
            post(|| async { (StatusCode::BAD_GATEWAY, "model offline") }),
        );
        let url = serve(upstream).await;

        let err = client(Some(&url)).recommend("alice").await.unwrap_err();
        let RecommendationError::Upstream(message) = err else {
            panic!("expected upstream error");
        };
        assert!(message.contains("502"), "{}", message);
        assert_eq!(
            ApiError::from(RecommendationError::Upstream(message)).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
