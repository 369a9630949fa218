// src/scout/http.rs
use std::time::Duration;

use futures::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::{ChunkStream, ScoutClient};
use crate::config::ScoutConfig;
use crate::error::ScoutError;

/// Hosted agent API speaking server-sent events. Requires an API key.
pub struct HttpScoutClient {
    http: Client,
    endpoint: String,
    api_key: String,
}

#[derive(Serialize)]
struct RunRequest<'a> {
    url: &'a str,
    goal: &'a str,
}

impl HttpScoutClient {
    pub fn new(config: &ScoutConfig) -> anyhow::Result<Self> {
        // Connect timeout only; the dispatcher owns the overall time budget.
        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(Duration::from_secs(4))
            .build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait::async_trait]
impl ScoutClient for HttpScoutClient {
    async fn launch(
        &self,
        target: &str,
        goal: &str,
        cancel: CancellationToken,
    ) -> Result<ChunkStream, ScoutError> {
        if self.api_key.is_empty() {
            return Err(ScoutError::Launch("scout API key is not configured".into()));
        }

        let send = self
            .http
            .post(&self.endpoint)
            .header("X-API-Key", &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "text/event-stream")
            .json(&RunRequest { url: target, goal })
            .send();

        let resp = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ScoutError::Cancelled),
            r = send => r.map_err(|e| {
                tracing::warn!(target: "scout", error = ?e, %target, "scout http error");
                ScoutError::launch(e)
            })?,
        };

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let body = body.trim();
            return Err(ScoutError::Launch(if body.is_empty() {
                format!("scout API returned {status}")
            } else {
                format!("scout API returned {status}: {body}")
            }));
        }

        // Dropping this stream drops the underlying connection.
        let body = resp
            .bytes_stream()
            .map(|chunk| chunk.map_err(ScoutError::stream))
            .take_until(cancel.cancelled_owned());
        Ok(Box::pin(body))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
