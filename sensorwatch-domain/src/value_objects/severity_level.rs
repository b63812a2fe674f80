// Severity level value object

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Low,
    Medium,
    High,
}

impl SeverityLevel {
    /// Totals strictly above this are at least medium.
    pub const MEDIUM_ABOVE: f64 = 10.0;
    /// Totals strictly above this are high.
    pub const HIGH_ABOVE: f64 = 100.0;

    pub fn classify(severity: f64) -> Self {
        if severity > Self::HIGH_ABOVE {
            SeverityLevel::High
        } else if severity > Self::MEDIUM_ABOVE {
            SeverityLevel::Medium
        } else {
            SeverityLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLevel::Low => "low",
            SeverityLevel::Medium => "medium",
            SeverityLevel::High => "high",
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_uses_strict_boundaries() {
        assert_eq!(SeverityLevel::classify(0.0), SeverityLevel::Low);
        assert_eq!(SeverityLevel::classify(10.0), SeverityLevel::Low);
        assert_eq!(SeverityLevel::classify(10.0001), SeverityLevel::Medium);
        assert_eq!(SeverityLevel::classify(100.0), SeverityLevel::Medium);
        assert_eq!(SeverityLevel::classify(100.0001), SeverityLevel::High);
    }

    #[test]
    fn serializes_lowercase() {
        let encoded = serde_json::to_string(&SeverityLevel::Medium).expect("encode");
        assert_eq!(encoded, "\"medium\"");
        assert_eq!(SeverityLevel::High.to_string(), "high");
    }
}
