use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

use sensorwatch_domain::{AnomalyReport, ReportSink};

pub struct WebhookSink {
    client: Client,
    url: String,
    template: Option<String>,
}

impl WebhookSink {
    pub fn new(url: &str, template: Option<&str>, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds.max(3)))
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
            template: template.map(ToString::to_string),
        })
    }
}

/// Template placeholders: `{total}` anomaly count, `{level}`, `{severity}`.
/// Without a template the persisted summary JSON is sent.
pub fn build_payload(report: &AnomalyReport, template: Option<&str>) -> Result<String> {
    match template {
        Some(template) => Ok(template
            .replace("{total}", &report.anomalies_count().to_string())
            .replace("{level}", report.severity_level.as_str())
            .replace("{severity}", &format!("{:.3}", report.severity))),
        None => Ok(serde_json::to_string(&report.summary())?),
    }
}

#[async_trait]
impl ReportSink for WebhookSink {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send(&self, report: &AnomalyReport) -> Result<()> {
        let payload = build_payload(report, self.template.as_deref())?;
        self.client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .body(payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensorwatch_domain::SeverityLevel;

    #[test]
    fn template_placeholders_are_filled() {
        let mut report = AnomalyReport::empty(None, None);
        report.severity = 12.25;
        report.severity_level = SeverityLevel::Medium;
        let payload = build_payload(
            &report,
            Some(r#"{"message":"{total} anomalies, {level} ({severity})"}"#),
        )
        .expect("payload");
        assert_eq!(payload, r#"{"message":"0 anomalies, medium (12.250)"}"#);
    }

    #[test]
    fn default_payload_is_summary_json() {
        let payload = build_payload(&AnomalyReport::empty(None, None), None).expect("payload");
        let value: serde_json::Value = serde_json::from_str(&payload).expect("json");
        assert_eq!(value["severity_level"], "low");
        assert_eq!(value["anomalies_count"], 0);
    }

    #[tokio::test]
    async fn unreachable_target_is_an_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);

        let sink = WebhookSink::new(&format!("http://127.0.0.1:{}/hook", port), None, 3)
            .expect("sink");
        assert!(sink.send(&AnomalyReport::empty(None, None)).await.is_err());
    }
}
