//! Threshold bands and crossing detection.

use serde::{Deserialize, Serialize};

pub const WARNING_PERCENT: f64 = 80.0;
pub const CRITICAL_PERCENT: f64 = 90.0;
pub const EXCEEDED_PERCENT: f64 = 100.0;

/// Whether moving from `previous` to `current` (both unclamped percentages)
/// should raise an alert.
///
/// Each of the 80/90/100 bands fires once when crossed upwards. Once at or
/// above 100 every further step fires again.
pub fn crossed(previous: f64, current: f64) -> bool {
    let upwards = |band: f64| previous < band && current >= band;
    upwards(WARNING_PERCENT)
        || upwards(CRITICAL_PERCENT)
        || upwards(EXCEEDED_PERCENT)
        || (previous >= EXCEEDED_PERCENT && current >= EXCEEDED_PERCENT)
}

/// Usage status of a scope with a configured limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageStatus {
    Safe,
    Warning,
    Critical,
    Exceeded,
}

impl UsageStatus {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= EXCEEDED_PERCENT {
            Self::Exceeded
        } else if percentage >= CRITICAL_PERCENT {
            Self::Critical
        } else if percentage >= WARNING_PERCENT {
            Self::Warning
        } else {
            Self::Safe
        }
    }

    /// Lowercase form, as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exceeded => "exceeded",
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Safe => "safe",
        }
    }

    /// Severity label used in alert messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Exceeded => "EXCEEDED",
            Self::Critical => "CRITICAL",
            Self::Warning => "WARNING",
            Self::Safe => "SAFE",
        }
    }
}
