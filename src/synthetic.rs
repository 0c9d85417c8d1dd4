//! Seeded synthetic daily returns for demos and tests.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal, NormalError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{DateRange, MonthLabel, WeekdayLabel};

/// Normally distributed returns drawn from a fixed seed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticReturns {
    pub seed:    u64,
    pub mean:    f64,
    pub std_dev: f64,
}

impl Default for SyntheticReturns {
    fn default() -> Self {
        Self {
            seed:    42,
            mean:    0.0,
            std_dev: 0.01,
        }
    }
}

impl SyntheticReturns {
    pub const fn new(seed: u64, mean: f64, std_dev: f64) -> Self {
        Self { seed, mean, std_dev }
    }

    /// Draws `n` values. The same parameters always give the same sequence.
    ///
    /// # Errors
    /// Returns `NormalError` if `std_dev` is negative or not finite.
    pub fn generate(&self, n: usize) -> Result<Vec<f64>, NormalError> {
        // Normal::new accepts a negative std_dev (it mirrors the distribution)
        if !self.std_dev.is_finite() || self.std_dev < 0.0 {
            return Err(NormalError::BadVariance);
        }
        let normal = Normal::new(self.mean, self.std_dev)?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let values: Vec<f64> = normal.sample_iter(&mut rng).take(n).collect();
        debug!(seed = self.seed, mean = self.mean, std_dev = self.std_dev, n, "generated synthetic returns");
        Ok(values)
    }

    /// Draws one value per day of `range`.
    ///
    /// # Errors
    /// See [`SyntheticReturns::generate`].
    pub fn generate_for(&self, range: &DateRange) -> Result<Vec<f64>, NormalError> {
        self.generate(range.num_days())
    }
}

/// Adds `delta` to every value whose day falls in `month`.
/// `values[i]` belongs to the i-th day of `range`. Returns how many values changed.
pub fn add_in_month(values: &mut [f64], range: &DateRange, month: MonthLabel, delta: f64) -> usize {
    adjust(values, range, delta, |date| MonthLabel::of(date) == month)
}

/// Adds `delta` to every value whose day falls on `weekday`.
/// `values[i]` belongs to the i-th day of `range`. Returns how many values changed.
pub fn add_on_weekday(values: &mut [f64], range: &DateRange, weekday: WeekdayLabel, delta: f64) -> usize {
    adjust(values, range, delta, |date| WeekdayLabel::of(date) == weekday)
}

fn adjust(values: &mut [f64], range: &DateRange, delta: f64, matches: impl Fn(chrono::NaiveDate) -> bool) -> usize {
    let mut changed = 0;
    for (date, value) in range.days().zip(values.iter_mut()) {
        if matches(date) {
            *value += delta;
            changed += 1;
        }
    }
    changed
}
