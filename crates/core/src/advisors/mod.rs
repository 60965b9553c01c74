//! Personalized services derived from a user's interaction history
//!
//! Neither advisor has real usage telemetry yet, so usage is simulated through
//! an injected [`UsageSource`]. Passing a seeded or fixed source makes the
//! output reproducible.

mod care;
mod replacement;
mod usage;

pub use care::{CareAdvisor, CareNotification};
pub use replacement::{ReplacementAdvisor, ReplacementSuggestion};
pub use usage::{RandomUsage, UsageSource, DAYS_IN_USE_RANGE, USAGE_MULTIPLIER_RANGE};

use serde::{Deserialize, Serialize};

/// Tunables shared by both advisors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdvisorSettings {
    /// Content weight used when picking a replacement (default: 0.5)
    pub alpha: f64,
    /// Minimum rating for an item to count as owned (default: 4.0)
    pub owned_rating_threshold: f64,
    /// Simulated usage above which care is suggested (default: 3.5)
    pub usage_threshold: f64,
    /// Expected lifetime of running shoes in days (default: 400)
    pub running_life_days: u32,
    /// Expected lifetime of every other type in days (default: 700)
    pub default_life_days: u32,
    /// Remaining-life cutoff that triggers a replacement (default: 100)
    pub replacement_margin_days: u32,
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            owned_rating_threshold: 4.0,
            usage_threshold: 3.5,
            running_life_days: 400,
            default_life_days: 700,
            replacement_margin_days: 100,
        }
    }
}
