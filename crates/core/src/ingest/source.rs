use crate::error::{PipelineError, Result};
use anyhow::Context;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where raw dataset text comes from. The HTTP implementation is used in
/// production; tests substitute an in-memory one.
#[async_trait::async_trait]
pub trait DatasetSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    async fn fetch_text(&self, url: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct HttpDatasetSource {
    http: reqwest::Client,
}

impl HttpDatasetSource {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build dataset http client")?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl DatasetSource for HttpDatasetSource {
    fn source_name(&self) -> &'static str {
        "http"
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        let network = |detail: String| PipelineError::Network {
            url: url.to_string(),
            detail,
        };

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| network(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(network(format!("HTTP {status}")));
        }

        let text = res.text().await.map_err(|e| network(e.to_string()))?;
        tracing::debug!(url, bytes = text.len(), "fetched dataset");
        Ok(text)
    }
}

/// Serves fixed text per URL. Used for offline runs from local files and in
/// tests.
#[derive(Debug, Clone, Default)]
pub struct StaticDatasetSource {
    bodies: HashMap<String, String>,
}

impl StaticDatasetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.bodies.insert(url.into(), body.into());
        self
    }
}

#[async_trait::async_trait]
impl DatasetSource for StaticDatasetSource {
    fn source_name(&self) -> &'static str {
        "static"
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| PipelineError::Network {
                url: url.to_string(),
                detail: "no dataset registered for url".to_string(),
            })
    }
}
