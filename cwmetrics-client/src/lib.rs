use async_trait::async_trait;
use cwmetrics_common::{CwMetricsError, ErrorResponse, MetricBatch, Result, BATCH_LIMIT};
use uuid::Uuid;

/// Destination for metric batches. The reporting plugin holds one behind an `Arc`
/// so tests can substitute a recording or failing implementation.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    async fn submit_metrics(&self, batch: &MetricBatch) -> Result<()>;
}

/// Monitoring backend client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend address as `host:port`.
    pub endpoint: String,
}

/// HTTP client for the monitoring backend's metric submission API
pub struct Client {
    pub config: ClientConfig,
    http_client: reqwest::Client,
}

impl Client {
    /// Create a new client with the given configuration
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Build the URL that metric batches are posted to.
    pub fn build_metrics_url(&self) -> String {
        format!("http://{}/metrics", self.config.endpoint)
    }

    /// Submit one batch. Batches over `BATCH_LIMIT` are rejected before any request is made.
    pub async fn submit_metrics(&self, batch: &MetricBatch) -> Result<()> {
        if batch.len() > BATCH_LIMIT {
            return Err(CwMetricsError::BatchTooLarge(BATCH_LIMIT));
        }

        let response = self
            .http_client
            .post(self.build_metrics_url())
            .header("Idempotency-Key", Uuid::new_v4().to_string())
            .json(batch)
            .send()
            .await
            .map_err(|e| CwMetricsError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(parse_error_response(status, response).await);
        }

        Ok(())
    }
}

#[async_trait]
impl MetricsSink for Client {
    async fn submit_metrics(&self, batch: &MetricBatch) -> Result<()> {
        Client::submit_metrics(self, batch).await
    }
}

async fn parse_error_response(status: reqwest::StatusCode, response: reqwest::Response) -> CwMetricsError {
    let error_msg = response
        .json::<ErrorResponse>()
        .await
        .map(|r| r.error)
        .unwrap_or_else(|_| format!("Server returned status: {}", status));

    CwMetricsError::HttpError(status.as_u16(), error_msg)
}
