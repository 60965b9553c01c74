//! Hybrid recommendation engine
//!
//! Blends content similarity (item attributes) with collaborative similarity
//! (co-rating patterns) into one per-item score for a user, then ranks the
//! items the user has not touched yet.

mod engine;
mod ranking;
mod types;

pub use engine::RecommendationEngine;
pub use ranking::top_n;
pub use types::*;

use crate::errors::DomainError;

/// Result type for recommendation operations
pub type RecommendResult<T> = Result<T, DomainError>;

/// Default weight given to content similarity
pub const DEFAULT_ALPHA: f64 = 0.6;

/// Default number of recommendations to return
pub const DEFAULT_TOP_N: usize = 5;

/// Rejects blend weights outside `[0, 1]`, including NaN.
pub fn validate_alpha(alpha: f64) -> RecommendResult<f64> {
    if (0.0..=1.0).contains(&alpha) {
        Ok(alpha)
    } else {
        Err(DomainError::InvalidAlpha(alpha))
    }
}
