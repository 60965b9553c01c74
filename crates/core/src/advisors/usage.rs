use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Bounds of the simulated usage multiplier applied to a rating
pub const USAGE_MULTIPLIER_RANGE: RangeInclusive<f64> = 0.8..=1.2;

/// Bounds of the simulated number of days an item has been worn
pub const DAYS_IN_USE_RANGE: RangeInclusive<u32> = 200..=500;

/// Stand-in for real usage telemetry.
pub trait UsageSource {
    /// Multiplier within [`USAGE_MULTIPLIER_RANGE`].
    fn usage_multiplier(&mut self) -> f64;

    /// Days in use within [`DAYS_IN_USE_RANGE`].
    fn days_in_use(&mut self) -> u32;
}

/// [`UsageSource`] drawing uniformly from any `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomUsage<R> {
    rng: R,
}

impl<R: Rng> RandomUsage<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomUsage<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> UsageSource for RandomUsage<R> {
    fn usage_multiplier(&mut self) -> f64 {
        self.rng.gen_range(USAGE_MULTIPLIER_RANGE)
    }

    fn days_in_use(&mut self) -> u32 {
        self.rng.gen_range(DAYS_IN_USE_RANGE)
    }
}

#[cfg(test)]
pub(crate) mod fixed {
    use super::UsageSource;

    /// Replays fixed values, repeating the last one when exhausted.
    #[derive(Debug, Clone)]
    pub struct FixedUsage {
        multipliers: Vec<f64>,
        days: Vec<u32>,
    }

    impl FixedUsage {
        pub fn new(multipliers: Vec<f64>, days: Vec<u32>) -> Self {
            Self { multipliers, days }
        }
    }

    impl UsageSource for FixedUsage {
        fn usage_multiplier(&mut self) -> f64 {
            if self.multipliers.len() > 1 {
                self.multipliers.remove(0)
            } else {
                self.multipliers.first().copied().unwrap_or(1.0)
            }
        }

        fn days_in_use(&mut self) -> u32 {
            if self.days.len() > 1 {
                self.days.remove(0)
            } else {
                self.days.first().copied().unwrap_or(0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RandomUsage, UsageSource, DAYS_IN_USE_RANGE, USAGE_MULTIPLIER_RANGE};

    #[test]
    fn draws_stay_within_bounds() {
        let mut usage = RandomUsage::seeded(7);
        for _ in 0..500 {
            assert!(USAGE_MULTIPLIER_RANGE.contains(&usage.usage_multiplier()));
            assert!(DAYS_IN_USE_RANGE.contains(&usage.days_in_use()));
        }
    }

    #[test]
    fn same_seed_replays_same_draws() {
        let mut first = RandomUsage::seeded(42);
        let mut second = RandomUsage::seeded(42);

        for _ in 0..20 {
            assert_eq!(first.usage_multiplier(), second.usage_multiplier());
            assert_eq!(first.days_in_use(), second.days_in_use());
        }
    }
}
