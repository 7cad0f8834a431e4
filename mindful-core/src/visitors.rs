//! Live-visitor count simulation.
//!
//! There is no real telemetry behind the "visitors online now" figure. A
//! time-of-day model produces a target for the current instant, and the
//! displayed value walks toward it by a bounded step on every tick so that
//! consecutive values never jump or freeze.
//!
//! Everything here is pure: time and randomness are passed in, and the
//! periodic driver lives in [`crate::ticker`].

use crate::error::{CoreError, Result};
use chrono::{NaiveTime, Timelike};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tolerance for the fraction sum check
const FRACTION_EPSILON: f64 = 1e-9;

const SECS_PER_HOUR: f64 = 3600.0;

/// One hour-of-day range and its share of the daily total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePeriod {
    /// First hour of the range (inclusive)
    pub start_hour: u32,
    /// Last hour of the range (exclusive)
    pub end_hour: u32,
    /// Share of the daily total in `[0, 1]`
    pub fraction: f64,
}

impl TimePeriod {
    #[must_use]
    pub const fn new(start_hour: u32, end_hour: u32, fraction: f64) -> Self {
        Self {
            start_hour,
            end_hour,
            fraction,
        }
    }

    /// Length of the range in hours
    #[must_use]
    pub const fn hours(&self) -> u32 {
        self.end_hour.saturating_sub(self.start_hour)
    }

    #[must_use]
    pub const fn contains_hour(&self, hour: u32) -> bool {
        hour >= self.start_hour && hour < self.end_hour
    }
}

/// Daily traffic shape of the site.
#[must_use]
pub fn default_periods() -> Vec<TimePeriod> {
    vec![
        TimePeriod::new(0, 6, 0.05),
        TimePeriod::new(6, 9, 0.10),
        TimePeriod::new(9, 12, 0.15),
        TimePeriod::new(12, 14, 0.20),
        TimePeriod::new(14, 17, 0.15),
        TimePeriod::new(17, 20, 0.25),
        TimePeriod::new(20, 24, 0.10),
    ]
}

/// Check that periods partition `[0, 24)` in order and their fractions sum to 1.
///
/// # Errors
///
/// Returns [`CoreError::InvalidPeriods`] describing the first violation.
pub fn validate_periods(periods: &[TimePeriod]) -> Result<()> {
    let invalid = |reason: String| Err(CoreError::InvalidPeriods { reason });

    if periods.is_empty() {
        return invalid("no periods configured".into());
    }

    let mut expected_start = 0;
    for period in periods {
        if period.start_hour != expected_start {
            return invalid(format!(
                "period {}-{} should start at hour {}",
                period.start_hour, period.end_hour, expected_start
            ));
        }
        if period.end_hour <= period.start_hour {
            return invalid(format!(
                "period {}-{} is empty",
                period.start_hour, period.end_hour
            ));
        }
        if !(0.0..=1.0).contains(&period.fraction) {
            return invalid(format!(
                "period {}-{} has fraction {} outside [0, 1]",
                period.start_hour, period.end_hour, period.fraction
            ));
        }
        expected_start = period.end_hour;
    }

    if expected_start != 24 {
        return invalid(format!("periods end at hour {expected_start}, not 24"));
    }

    let sum: f64 = periods.iter().map(|p| p.fraction).sum();
    if (sum - 1.0).abs() > FRACTION_EPSILON {
        return invalid(format!("fractions sum to {sum}, not 1"));
    }

    Ok(())
}

/// Tuning parameters of the simulator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkBounds {
    /// Lower bound of the random jitter factor
    pub jitter_min: f64,
    /// Upper bound of the random jitter factor
    pub jitter_max: f64,
    /// Minimum step as a fraction of the displayed value
    pub min_step: f64,
    /// Maximum step as a fraction of the displayed value
    pub max_step: f64,
}

impl Default for WalkBounds {
    fn default() -> Self {
        Self {
            jitter_min: 0.95,
            jitter_max: 1.05,
            min_step: 0.02,
            max_step: 0.08,
        }
    }
}

impl WalkBounds {
    fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(CoreError::ConfigInvalid { message });

        if !(self.jitter_min > 0.0 && self.jitter_min <= self.jitter_max) {
            return invalid(format!(
                "visitors jitter range [{}, {}] is invalid",
                self.jitter_min, self.jitter_max
            ));
        }
        if !(self.min_step >= 0.0 && self.min_step <= self.max_step && self.max_step <= 1.0) {
            return invalid(format!(
                "visitors step bounds [{}, {}] are invalid",
                self.min_step, self.max_step
            ));
        }
        Ok(())
    }
}

/// Immutable time-of-day model, validated once at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitorModel {
    periods: Vec<TimePeriod>,
    daily_total: f64,
    bounds: WalkBounds,
}

impl Default for VisitorModel {
    fn default() -> Self {
        Self {
            periods: default_periods(),
            daily_total: 26_000.0,
            bounds: WalkBounds::default(),
        }
    }
}

impl VisitorModel {
    /// Build a model from a period table, a daily total and walk bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if the periods do not partition the day, the fractions
    /// do not sum to 1, the daily total is not positive, or the bounds are
    /// inconsistent.
    pub fn new(periods: Vec<TimePeriod>, daily_total: f64, bounds: WalkBounds) -> Result<Self> {
        validate_periods(&periods)?;
        if !(daily_total.is_finite() && daily_total > 0.0) {
            return Err(CoreError::ConfigInvalid {
                message: format!("visitors daily_total must be positive, got {daily_total}"),
            });
        }
        bounds.validate()?;

        Ok(Self {
            periods,
            daily_total,
            bounds,
        })
    }

    #[must_use]
    pub fn periods(&self) -> &[TimePeriod] {
        &self.periods
    }

    #[must_use]
    pub const fn daily_total(&self) -> f64 {
        self.daily_total
    }

    #[must_use]
    pub const fn bounds(&self) -> &WalkBounds {
        &self.bounds
    }

    /// The period containing the hour of `time`.
    #[must_use]
    pub fn period_at(&self, time: NaiveTime) -> &TimePeriod {
        let hour = time.hour();
        self.periods
            .iter()
            .find(|p| p.contains_hour(hour))
            .unwrap_or(&self.periods[0])
    }

    /// Deterministic part of the target for `time`, scaled by `jitter`.
    ///
    /// `hourly_rate × (1 + progress_through_period) × jitter`
    #[must_use]
    pub fn base_count(&self, time: NaiveTime, jitter: f64) -> f64 {
        let period = self.period_at(time);
        let hours = f64::from(period.hours());
        let hourly_rate = self.daily_total * period.fraction / hours;

        let secs_of_day = f64::from(time.num_seconds_from_midnight())
            + f64::from(time.nanosecond().min(999_999_999)) / 1e9;
        let elapsed = secs_of_day - f64::from(period.start_hour) * SECS_PER_HOUR;
        let progress = (elapsed / (hours * SECS_PER_HOUR)).clamp(0.0, 1.0);

        hourly_rate * (1.0 + progress) * jitter
    }

    /// Target for `time` with a jitter factor drawn from `rng`.
    pub fn target_at<G: Rng + ?Sized>(&self, time: NaiveTime, rng: &mut G) -> f64 {
        let jitter = rng.gen_range(self.bounds.jitter_min..=self.bounds.jitter_max);
        self.base_count(time, jitter)
    }

    /// Move `current` one bounded step toward `target`.
    ///
    /// The step is between `min_step` and `max_step` of `current`. A remaining
    /// difference below the minimum step snaps to the target. Never negative.
    #[must_use]
    pub fn next_count(&self, current: f64, target: f64) -> f64 {
        let target = target.max(0.0);
        // A zero (or broken) value has no meaningful step size
        if !(current.is_finite() && current > 0.0) {
            return target;
        }

        let min_change = current * self.bounds.min_step;
        let max_change = current * self.bounds.max_step;
        let difference = target - current;

        if difference.abs() < min_change {
            return target;
        }

        let step = difference.abs().max(min_change).min(max_change);
        (current + step.copysign(difference)).max(0.0)
    }

    /// One tick: recompute the target, then step toward it.
    pub fn tick<G: Rng + ?Sized>(
        &self,
        state: VisitorCountState,
        time: NaiveTime,
        rng: &mut G,
    ) -> VisitorCountState {
        let target = self.target_at(time, rng);
        VisitorCountState {
            displayed: self.next_count(state.displayed, target),
            target,
        }
    }
}

/// Displayed and target visitor counts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisitorCountState {
    pub displayed: f64,
    pub target: f64,
}

impl VisitorCountState {
    /// Seed value shown before the first tick
    pub const DEFAULT_SEED: f64 = 24_950.0;

    /// State showing `seed` with the target equal to it.
    #[must_use]
    pub const fn seeded(seed: f64) -> Self {
        Self {
            displayed: seed,
            target: seed,
        }
    }
}

impl Default for VisitorCountState {
    fn default() -> Self {
        Self::seeded(Self::DEFAULT_SEED)
    }
}

/// Display width the count is formatted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Full grouped number
    #[default]
    Wide,
    /// Abbreviated `Nk+` form
    Narrow,
}

/// Format a visitor count for display.
///
/// `Wide` rounds and groups thousands with `separator`. `Narrow` shows whole
/// thousands (truncated) as `Nk+` once the count reaches 1000.
#[must_use]
pub fn format_count(count: f64, layout: Layout, separator: char) -> String {
    let count = if count.is_finite() { count.max(0.0) } else { 0.0 };

    if layout == Layout::Narrow && count >= 1000.0 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let thousands = (count / 1000.0).floor() as u64;
        return format!("{thousands}k+");
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rounded = count.round() as u64;
    group_thousands(rounded, separator)
}

fn group_thousands(value: u64, separator: char) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}
