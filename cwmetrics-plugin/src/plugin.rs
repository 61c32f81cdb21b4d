use cwmetrics_client::MetricsSink;
use cwmetrics_common::{validate_config, MetricBatch, PluginConfig, Report, Result};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::builders::{build_code_batch, build_latency_batch};
use crate::channel::StatsChannel;

/// Forwards every report published on the stats channel to a [`MetricsSink`].
///
/// A value of this type only exists once the configuration has been validated,
/// so a constructed plugin is always active. It subscribes to the channel at
/// construction; [`ReportingPlugin::start`] drives the subscription.
pub struct ReportingPlugin {
    config: PluginConfig,
    sink: Arc<dyn MetricsSink>,
    receiver: broadcast::Receiver<Arc<Report>>,
}

impl ReportingPlugin {
    /// Validate `script_config` and subscribe to `channel`.
    ///
    /// Configuration errors are returned as-is; this is the only place the
    /// plugin surfaces an error instead of logging it.
    pub fn new(script_config: &Value, channel: &StatsChannel, sink: Arc<dyn MetricsSink>) -> Result<Self> {
        let config = validate_config(script_config)?;
        let receiver = channel.subscribe();
        info!(namespace = %config.namespace, event = channel.name(), "CloudWatch reporting plugin active");
        Ok(Self { config, sink, receiver })
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// Consume reports until the channel closes. A lagging subscriber logs the
    /// number of skipped reports and keeps going.
    pub fn start(mut self) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match self.receiver.recv().await {
                    Ok(report) => {
                        self.handle_report(&report);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Reporting plugin fell behind; reports were dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    /// Submit the status-code batch and then every latency batch for `report`.
    ///
    /// Submissions run as detached tasks and are not awaited here; the returned
    /// handles are only for callers that want to wait for completion.
    pub fn handle_report(&self, report: &Report) -> Vec<JoinHandle<()>> {
        let namespace = self.config.namespace.as_str();
        let mut submissions = vec![self.submit(build_code_batch(namespace, report))];

        let samples = report.latency_samples();
        let mut offset = 0;
        while offset < samples.len() {
            let batch = build_latency_batch(namespace, offset, samples);
            offset += batch.len();
            submissions.push(self.submit(batch));
        }

        info!(namespace, batches = submissions.len(), samples = samples.len(), "Metrics reported to CloudWatch");
        submissions
    }

    fn submit(&self, batch: MetricBatch) -> JoinHandle<()> {
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            if let Err(e) = sink.submit_metrics(&batch).await {
                error!(
                    error = %e,
                    namespace = %batch.namespace,
                    data_points = batch.len(),
                    "Error reporting metrics to CloudWatch via putMetricData"
                );
            }
        })
    }
}

/// Validate, construct and start a plugin in one call.
pub fn init(script_config: &Value, channel: &StatsChannel, sink: Arc<dyn MetricsSink>) -> Result<JoinHandle<()>> {
    Ok(ReportingPlugin::new(script_config, channel, sink)?.start())
}
