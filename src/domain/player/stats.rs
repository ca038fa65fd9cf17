//! Statistics engine
//!
//! Pure mapping from a player's raw counting stats to derived rates,
//! fantasy points and market value.

use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};

/// Granularity of player market values
pub const VALUE_STEP: i64 = 50_000;

/// Upper bound for every integer counter
pub const MAX_COUNTER: i64 = 1_000_000;

/// Smallest non-zero overs figure: a single ball
pub const MIN_OVERS: f64 = 0.1;

/// Upper bound for overs bowled
pub const MAX_OVERS: f64 = 1_000_000.0;

/// Largest magnitude a stored rate may take (`NUMERIC(12, 2)`)
pub const MAX_STORED_RATE: f64 = 9_999_999_999.99;

/// A derived rate whose denominator may have been zero
///
/// `Undefined` is a first-class outcome, not an error: it contributes
/// nothing to points and serialises as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Rate {
    #[default]
    Undefined,
    Defined(f64),
}

impl Rate {
    /// `numerator / denominator`, or `Undefined` for a zero denominator
    pub fn ratio(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            return Rate::Undefined;
        }

        let value = numerator / denominator;
        if value.is_finite() {
            Rate::Defined(value)
        } else {
            Rate::Undefined
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Rate::Defined(v) => Some(v),
            Rate::Undefined => None,
        }
    }

    pub fn is_defined(self) -> bool {
        matches!(self, Rate::Defined(_))
    }

    /// Rounded half away from zero to two decimals
    pub fn rounded(self) -> Self {
        match self {
            Rate::Defined(v) => Rate::Defined((v * 100.0).round() / 100.0),
            Rate::Undefined => Rate::Undefined,
        }
    }

    /// Contribution of this rate when it must be strictly positive to count
    fn inverse_term(self, weight: f64) -> f64 {
        match self {
            Rate::Defined(v) if v > 0.0 => weight / v,
            _ => 0.0,
        }
    }
}

impl From<Option<f64>> for Rate {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Rate::Defined(v),
            _ => Rate::Undefined,
        }
    }
}

impl From<Rate> for Option<f64> {
    fn from(rate: Rate) -> Self {
        rate.value()
    }
}

/// Directly observed performance counters, supplied by an admin
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawStats {
    pub total_runs: i64,
    pub balls_faced: i64,
    pub innings_played: i64,
    pub wickets: i64,
    pub overs_bowled: f64,
    pub runs_conceded: i64,
}

impl RawStats {
    /// Rejects counters outside `0..=MAX_COUNTER` and overs that are
    /// non-finite, negative, above [`MAX_OVERS`] or a fraction of a ball
    ///
    /// Within these bounds every rate stays below [`MAX_STORED_RATE`] and
    /// points and value fit comfortably in an `i64`.
    pub fn validate(&self) -> DomainResult<()> {
        let counters = [
            ("total_runs", self.total_runs),
            ("balls_faced", self.balls_faced),
            ("innings_played", self.innings_played),
            ("wickets", self.wickets),
            ("runs_conceded", self.runs_conceded),
        ];

        if let Some((name, value)) = counters.iter().find(|(_, v)| *v < 0) {
            return Err(DomainError::validation(format!(
                "{} cannot be negative (got {})",
                name, value
            )));
        }

        if let Some((name, value)) = counters.iter().find(|(_, v)| *v > MAX_COUNTER) {
            return Err(DomainError::validation(format!(
                "{} cannot exceed {} (got {})",
                name, MAX_COUNTER, value
            )));
        }

        if !self.overs_bowled.is_finite() || self.overs_bowled < 0.0 {
            return Err(DomainError::validation(format!(
                "overs_bowled must be a non-negative number (got {})",
                self.overs_bowled
            )));
        }

        if self.overs_bowled > MAX_OVERS
            || (self.overs_bowled > 0.0 && self.overs_bowled < MIN_OVERS)
        {
            return Err(DomainError::validation(format!(
                "overs_bowled must be 0 or between {} and {} (got {})",
                MIN_OVERS, MAX_OVERS, self.overs_bowled
            )));
        }

        Ok(())
    }
}

/// Rates, points and value derived from [`RawStats`]
///
/// Never set by callers; only produced by [`compute_derived_stats`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DerivedStats {
    pub batting_strike_rate: Rate,
    pub batting_average: Rate,
    pub bowling_strike_rate: Rate,
    pub economy_rate: Rate,
    pub points: i64,
    pub value: i64,
}

/// Validates raw counters and computes derived stats from them
///
/// Points and value are taken from the unrounded rates; the stored rates
/// are rounded to two decimals afterwards.
///
/// The bowling strike rate uses overs (not balls) in its numerator. That
/// ratio is kept as-is.
///
/// # Example
/// ```
/// use fantasy_cricket_api::domain::player::stats::{compute_derived_stats, Rate, RawStats};
///
/// let derived = compute_derived_stats(&RawStats {
///     total_runs: 500,
///     balls_faced: 400,
///     innings_played: 10,
///     ..RawStats::default()
/// })
/// .expect("valid counters");
///
/// assert_eq!(derived.batting_strike_rate, Rate::Defined(125.0));
/// assert_eq!(derived.points, 65);
/// assert_eq!(derived.value, 700_000);
/// ```
pub fn compute_derived_stats(raw: &RawStats) -> DomainResult<DerivedStats> {
    raw.validate()?;

    let batting_strike_rate = Rate::ratio(raw.total_runs as f64 * 100.0, raw.balls_faced as f64);
    let batting_average = Rate::ratio(raw.total_runs as f64, raw.innings_played as f64);
    let bowling_strike_rate = Rate::ratio(raw.overs_bowled * 100.0, raw.wickets as f64);
    let economy_rate = Rate::ratio(raw.runs_conceded as f64 * 100.0, raw.overs_bowled * 6.0);

    let points = points_from_rates(
        batting_strike_rate,
        batting_average,
        bowling_strike_rate,
        economy_rate,
    );

    Ok(DerivedStats {
        batting_strike_rate: batting_strike_rate.rounded(),
        batting_average: batting_average.rounded(),
        bowling_strike_rate: bowling_strike_rate.rounded(),
        economy_rate: economy_rate.rounded(),
        points,
        value: value_from_points(points)?,
    })
}

/// Sum of the four rate terms, truncated toward zero
pub fn points_from_rates(
    batting_strike_rate: Rate,
    batting_average: Rate,
    bowling_strike_rate: Rate,
    economy_rate: Rate,
) -> i64 {
    let total = batting_strike_rate.value().map_or(0.0, |v| v / 5.0)
        + batting_average.value().map_or(0.0, |v| v * 0.8)
        + bowling_strike_rate.inverse_term(500.0)
        + economy_rate.inverse_term(140.0);

    total.trunc() as i64
}

/// `(9 * points + 100) * 1000`, rounded to the nearest [`VALUE_STEP`], ties up
///
/// Fails with `Validation` when the value would not fit an `i64`.
pub fn value_from_points(points: i64) -> DomainResult<i64> {
    points
        .checked_mul(9)
        .and_then(|v| v.checked_add(100))
        .and_then(|v| v.checked_mul(1000))
        .and_then(|v| v.checked_add(VALUE_STEP / 2))
        .and_then(|v| v.div_euclid(VALUE_STEP).checked_mul(VALUE_STEP))
        .ok_or_else(|| DomainError::validation(format!("points {} are out of range", points)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batter() -> RawStats {
        RawStats {
            total_runs: 500,
            balls_faced: 400,
            innings_played: 10,
            wickets: 0,
            overs_bowled: 0.0,
            runs_conceded: 0,
        }
    }

    #[test]
    fn batting_only_player_end_to_end() {
        let derived = compute_derived_stats(&batter()).unwrap();

        assert_eq!(derived.batting_strike_rate, Rate::Defined(125.0));
        assert_eq!(derived.batting_average, Rate::Defined(50.0));
        assert_eq!(derived.bowling_strike_rate, Rate::Undefined);
        assert_eq!(derived.economy_rate, Rate::Undefined);
        assert_eq!(derived.points, 65);
        assert_eq!(derived.value, 700_000);
    }

    #[test]
    fn all_zero_player_gets_base_value() {
        let derived = compute_derived_stats(&RawStats::default()).unwrap();

        assert!(!derived.batting_strike_rate.is_defined());
        assert!(!derived.batting_average.is_defined());
        assert!(!derived.bowling_strike_rate.is_defined());
        assert!(!derived.economy_rate.is_defined());
        assert_eq!(derived.points, 0);
        assert_eq!(derived.value, 100_000);
    }

    #[test]
    fn each_zero_denominator_degrades_independently() {
        let raw = RawStats {
            total_runs: 120,
            balls_faced: 0,
            innings_played: 4,
            wickets: 0,
            overs_bowled: 10.0,
            runs_conceded: 50,
        };

        let derived = compute_derived_stats(&raw).unwrap();

        assert_eq!(derived.batting_strike_rate, Rate::Undefined);
        assert_eq!(derived.batting_average, Rate::Defined(30.0));
        assert_eq!(derived.bowling_strike_rate, Rate::Undefined);
        assert_eq!(derived.economy_rate, Rate::Defined(83.33));
    }

    #[test]
    fn bowler_terms_use_unrounded_rates() {
        // bowling sr = 1000/7 = 142.857..., economy = 30000/60 = 500
        let raw = RawStats {
            total_runs: 0,
            balls_faced: 0,
            innings_played: 5,
            wickets: 7,
            overs_bowled: 10.0,
            runs_conceded: 300,
        };

        let derived = compute_derived_stats(&raw).unwrap();

        // 0 + 0 + 500/142.857 (3.5) + 140/500 (0.28) = 3.78 -> 3
        assert_eq!(derived.points, 3);
        assert_eq!(derived.bowling_strike_rate, Rate::Defined(142.86));
        assert_eq!(derived.economy_rate, Rate::Defined(500.0));
        assert_eq!(derived.value, 150_000);
    }

    #[test]
    fn points_truncate_the_sum_once() {
        // 0.9 + 0.8 = 1.7 -> 1 (per-term truncation would give 0)
        let points = points_from_rates(
            Rate::Defined(4.5),
            Rate::Defined(1.0),
            Rate::Undefined,
            Rate::Undefined,
        );
        assert_eq!(points, 1);
    }

    #[test]
    fn zero_bowling_strike_rate_contributes_nothing() {
        // wickets without overs: sr = 0, economy undefined
        let raw = RawStats {
            wickets: 2,
            ..RawStats::default()
        };

        let derived = compute_derived_stats(&raw).unwrap();

        assert_eq!(derived.bowling_strike_rate, Rate::Defined(0.0));
        assert_eq!(derived.points, 0);
    }

    #[test]
    fn value_rounds_to_nearest_step_ties_up() {
        assert_eq!(value_from_points(65).unwrap(), 700_000); // 685,000
        assert_eq!(value_from_points(0).unwrap(), 100_000);
        assert_eq!(value_from_points(1).unwrap(), 100_000); // 109,000
        assert_eq!(value_from_points(3).unwrap(), 150_000); // 127,000
        assert_eq!(value_from_points(25).unwrap(), 350_000); // 325,000 tie -> up
    }

    #[test]
    fn value_is_multiple_of_step_and_monotonic() {
        let mut previous = value_from_points(0).unwrap();
        for points in 0..2_000 {
            let value = value_from_points(points).unwrap();
            assert_eq!(value % VALUE_STEP, 0);
            assert!(value >= previous);
            previous = value;
        }
    }

    #[test]
    fn computation_is_deterministic() {
        let raw = RawStats {
            total_runs: 431,
            balls_faced: 377,
            innings_played: 9,
            wickets: 13,
            overs_bowled: 31.4,
            runs_conceded: 250,
        };

        assert_eq!(
            compute_derived_stats(&raw).unwrap(),
            compute_derived_stats(&raw).unwrap()
        );
    }

    #[test]
    fn stored_rates_are_finite() {
        for balls in [0, 1] {
            for innings in [0, 1] {
                for wickets in [0, 1] {
                    for overs in [0.0, 1.0] {
                        let derived = compute_derived_stats(&RawStats {
                            total_runs: 10,
                            balls_faced: balls,
                            innings_played: innings,
                            wickets,
                            overs_bowled: overs,
                            runs_conceded: 10,
                        })
                        .unwrap();
                        for rate in [
                            derived.batting_strike_rate,
                            derived.batting_average,
                            derived.bowling_strike_rate,
                            derived.economy_rate,
                        ] {
                            assert!(rate.value().map_or(true, f64::is_finite));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn rate_serialises_as_number_or_null() {
        assert_eq!(serde_json::to_string(&Rate::Defined(1.5)).unwrap(), "1.5");
        assert_eq!(serde_json::to_string(&Rate::Undefined).unwrap(), "null");
        assert_eq!(serde_json::from_str::<Rate>("null").unwrap(), Rate::Undefined);
    }

    #[test]
    fn negative_counters_are_rejected() {
        let raw = RawStats {
            wickets: -1,
            ..batter()
        };
        assert!(matches!(raw.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn non_finite_overs_are_rejected() {
        let raw = RawStats {
            overs_bowled: f64::NAN,
            ..batter()
        };
        assert!(raw.validate().is_err());
    }

    #[test]
    fn oversized_counter_is_rejected() {
        let raw = RawStats {
            total_runs: 100_000_000_000_000,
            balls_faced: 1,
            innings_played: 1,
            ..RawStats::default()
        };

        assert!(matches!(raw.validate(), Err(DomainError::Validation(_))));
        assert!(matches!(
            compute_derived_stats(&raw),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn counter_bound_is_inclusive() {
        let raw = RawStats {
            total_runs: MAX_COUNTER,
            ..batter()
        };
        assert!(raw.validate().is_ok());

        let raw = RawStats {
            total_runs: MAX_COUNTER + 1,
            ..batter()
        };
        assert!(matches!(raw.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn fraction_of_a_ball_is_rejected() {
        let raw = RawStats {
            wickets: 1,
            overs_bowled: 1e-9,
            ..RawStats::default()
        };
        assert!(matches!(raw.validate(), Err(DomainError::Validation(_))));

        let raw = RawStats {
            overs_bowled: MAX_OVERS * 2.0,
            ..RawStats::default()
        };
        assert!(raw.validate().is_err());
    }

    #[test]
    fn extreme_counters_fit_storage_precision() {
        let extremes = [
            // batting strike rate and average at their largest
            RawStats {
                total_runs: MAX_COUNTER,
                balls_faced: 1,
                innings_played: 1,
                ..RawStats::default()
            },
            // smallest positive bowling strike rate and economy
            RawStats {
                wickets: MAX_COUNTER,
                overs_bowled: MIN_OVERS,
                runs_conceded: 1,
                ..RawStats::default()
            },
            // largest economy
            RawStats {
                wickets: 1,
                overs_bowled: MIN_OVERS,
                runs_conceded: MAX_COUNTER,
                ..RawStats::default()
            },
            RawStats {
                total_runs: MAX_COUNTER,
                balls_faced: 1,
                innings_played: 1,
                wickets: MAX_COUNTER,
                overs_bowled: MIN_OVERS,
                runs_conceded: 1,
            },
        ];

        for raw in extremes {
            let derived = compute_derived_stats(&raw).unwrap();
            for rate in [
                derived.batting_strike_rate,
                derived.batting_average,
                derived.bowling_strike_rate,
                derived.economy_rate,
            ] {
                assert!(rate.value().map_or(true, |v| v.abs() <= MAX_STORED_RATE));
            }
            // eleven of the most valuable players still sum without overflow
            assert!(derived.value.checked_mul(11).is_some());
        }
    }

    #[test]
    fn value_overflow_is_a_validation_error() {
        assert!(matches!(
            value_from_points(i64::MAX / 9),
            Err(DomainError::Validation(_))
        ));
    }
}
