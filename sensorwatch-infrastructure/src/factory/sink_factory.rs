use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::warn;

use sensorwatch_domain::{ReportSink, SinkConfig};

use crate::config::{JSONL_SINK, STDERR_SINK, STDOUT_SINK, WEBHOOK_SINK};
use crate::sinks::{JsonLinesSink, StdoutSink, WebhookSink};

/// Builds sinks in config order; unknown types are skipped with a warning.
pub fn build_sinks(
    configs: &[SinkConfig],
    request_timeout_seconds: u64,
) -> Result<Vec<Arc<dyn ReportSink>>> {
    let mut sinks: Vec<Arc<dyn ReportSink>> = Vec::with_capacity(configs.len());
    for config in configs {
        match config.kind.as_str() {
            STDOUT_SINK => sinks.push(Arc::new(StdoutSink::new())),
            STDERR_SINK => sinks.push(Arc::new(StdoutSink::stderr())),
            WEBHOOK_SINK => {
                let url = config
                    .url
                    .as_deref()
                    .ok_or_else(|| anyhow!("webhook sink requires url"))?;
                sinks.push(Arc::new(WebhookSink::new(
                    url,
                    config.template.as_deref(),
                    request_timeout_seconds,
                )?));
            }
            JSONL_SINK => {
                let path = config
                    .path
                    .as_deref()
                    .ok_or_else(|| anyhow!("jsonl sink requires path"))?;
                sinks.push(Arc::new(JsonLinesSink::new(path)));
            }
            other => warn!("skipping unknown sink type '{}'", other),
        }
    }
    Ok(sinks)
}
