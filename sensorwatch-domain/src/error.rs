use thiserror::Error;

/// Errors raised by detector construction or by a single detection call.
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },
    #[error("detection failed: {0}")]
    Failed(String),
}

impl DetectorError {
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        DetectorError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while turning declarative config into detector instances.
#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("detector #{index} ({kind}): {source}")]
    InvalidParams {
        index: usize,
        kind: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("detector #{index} ({kind}): {source}")]
    Detector {
        index: usize,
        kind: String,
        #[source]
        source: DetectorError,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("column '{name}' has {got} cells, expected {expected}")]
    RaggedColumn {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
}
