// Urgency tier value object

use serde::{Deserialize, Serialize};

/// How soon a site needs a refill. Variant order is the sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyTier {
    Critical,
    Warning,
    Attention,
    Good,
}

impl UrgencyTier {
    pub const CRITICAL_BELOW_DAYS: f64 = 3.0;
    pub const WARNING_BELOW_DAYS: f64 = 7.0;
    pub const ATTENTION_BELOW_DAYS: f64 = 14.0;

    /// Upper bounds are exclusive: exactly 3.0 days is `Warning`.
    pub fn classify(days_until_refill: f64) -> Self {
        if days_until_refill < Self::CRITICAL_BELOW_DAYS {
            UrgencyTier::Critical
        } else if days_until_refill < Self::WARNING_BELOW_DAYS {
            UrgencyTier::Warning
        } else if days_until_refill < Self::ATTENTION_BELOW_DAYS {
            UrgencyTier::Attention
        } else {
            UrgencyTier::Good
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyTier::Critical => "critical",
            UrgencyTier::Warning => "warning",
            UrgencyTier::Attention => "attention",
            UrgencyTier::Good => "good",
        }
    }

    pub fn needs_refill_planning(&self) -> bool {
        !matches!(self, UrgencyTier::Good)
    }
}
