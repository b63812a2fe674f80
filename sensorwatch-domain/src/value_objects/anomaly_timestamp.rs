use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where an anomaly sits: a real instant, or a row position that has not
/// (or could not) be resolved against the window's timestamp column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnomalyTimestamp {
    Instant(DateTime<Utc>),
    Index(usize),
}

impl fmt::Display for AnomalyTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnomalyTimestamp::Instant(at) => write!(f, "{}", at.to_rfc3339()),
            AnomalyTimestamp::Index(idx) => write!(f, "#{}", idx),
        }
    }
}
