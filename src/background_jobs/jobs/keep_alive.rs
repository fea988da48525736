//! Periodic self-ping so that hosting platforms which idle inactive
//! services keep this one warm.

use crate::background_jobs::{BackgroundJob, JobContext, JobError};
use crate::config::KeepAliveSettings;
use crate::server::metrics;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

pub struct KeepAliveJob {
    client: reqwest::Client,
    url: String,
    interval: Duration,
}

impl KeepAliveJob {
    pub fn new(settings: &KeepAliveSettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            client,
            url: settings.url.clone(),
            interval: settings.interval,
        })
    }

    async fn ping(&self) -> Result<(), JobError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| JobError::ExecutionFailed(format!("request failed: {}", e)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(JobError::ExecutionFailed(format!(
                "unexpected status {}",
                status
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl BackgroundJob for KeepAliveJob {
    fn id(&self) -> &'static str {
        "keep_alive"
    }

    fn name(&self) -> &'static str {
        "Keep Alive"
    }

    fn description(&self) -> &'static str {
        "Pings the configured URL to keep the service awake"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn execute(&self, ctx: &JobContext) -> Result<(), JobError> {
        let result = tokio::select! {
            result = self.ping() => result,
            _ = ctx.cancellation_token.cancelled() => return Err(JobError::Cancelled),
        };

        match &result {
            Ok(()) => debug!("Keep-alive ping to {} succeeded", self.url),
            Err(e) => warn!("Keep-alive ping to {} failed: {}", self.url, e),
        }
        metrics::record_keep_alive_ping(result.is_ok());
        result
    }
}
