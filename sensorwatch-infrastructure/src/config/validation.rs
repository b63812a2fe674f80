use anyhow::{anyhow, Result};

use sensorwatch_domain::SinkConfig;

pub const STDOUT_SINK: &str = "stdout";
pub const STDERR_SINK: &str = "stderr";
pub const WEBHOOK_SINK: &str = "webhook";
pub const JSONL_SINK: &str = "jsonl";

/// Required fields per known sink type. Unknown types pass; the factory skips them.
pub fn validate_sink(sink: &SinkConfig) -> Result<()> {
    match sink.kind.as_str() {
        WEBHOOK_SINK => {
            let url = sink
                .url
                .as_deref()
                .ok_or_else(|| anyhow!("webhook sink requires url"))?;
            validate_http_url(url)
        }
        JSONL_SINK => {
            if sink.path.as_deref().map_or(true, |path| path.trim().is_empty()) {
                return Err(anyhow!("jsonl sink requires path"));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

pub fn validate_http_url(url: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!("url must start with http:// or https://"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink(kind: &str) -> SinkConfig {
        SinkConfig {
            kind: kind.to_string(),
            ..SinkConfig::stdout()
        }
    }

    #[test]
    fn webhook_needs_http_url() {
        assert!(validate_sink(&sink(WEBHOOK_SINK)).is_err());
        let mut webhook = sink(WEBHOOK_SINK);
        webhook.url = Some("ftp://example.com".to_string());
        assert!(validate_sink(&webhook).is_err());
        webhook.url = Some("https://example.com/hook".to_string());
        assert!(validate_sink(&webhook).is_ok());
    }

    #[test]
    fn jsonl_needs_path_and_unknown_passes() {
        assert!(validate_sink(&sink(JSONL_SINK)).is_err());
        assert!(validate_sink(&sink("pagerduty")).is_ok());
        assert!(validate_sink(&SinkConfig::stdout()).is_ok());
    }
}
