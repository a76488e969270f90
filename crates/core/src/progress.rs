//! Turns sparse exercise history into a daily progress series.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::ExerciseSets;

/// Per-day aggregate over working sets (`reps > 0 && weight > 0`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DailyStats {
    pub max_weight: f64,
    pub volume: f64,
}

/// One point of the progress chart.
///
/// Recorded days carry `weight` and `volume`; days between recordings only
/// carry the estimated `interpolated_weight`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressPoint {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    pub interpolated_weight: f64,
}

impl ProgressPoint {
    #[must_use]
    pub fn is_recorded(&self) -> bool {
        self.weight.is_some()
    }
}

/// Group history entries by UTC calendar day.
///
/// Entries on the same day are merged. Days without a single working set
/// are left out entirely.
#[must_use]
pub fn daily_stats(entries: &[ExerciseSets]) -> BTreeMap<NaiveDate, DailyStats> {
    let mut days: BTreeMap<NaiveDate, DailyStats> = BTreeMap::new();

    for entry in entries {
        for set in entry.workout_sets.iter().filter(|s| s.is_working_set()) {
            let stats = days.entry(entry.day()).or_default();
            stats.max_weight = stats.max_weight.max(set.weight);
            stats.volume += set.volume();
        }
    }

    days
}

/// Build one point per calendar day from the first to the last recorded day.
///
/// Gap days are estimated with [`half_cosine`] between the nearest recorded
/// days on either side. Empty or set-less history yields an empty series.
#[must_use]
pub fn aggregate_history(entries: &[ExerciseSets]) -> Vec<ProgressPoint> {
    let days = daily_stats(entries);
    let (Some((&first, _)), Some((&last, _))) = (days.first_key_value(), days.last_key_value())
    else {
        return Vec::new();
    };

    let mut series = Vec::new();
    for date in first.iter_days().take_while(|d| *d <= last) {
        if let Some(stats) = days.get(&date) {
            series.push(ProgressPoint {
                date,
                weight: Some(stats.max_weight),
                volume: Some(stats.volume),
                interpolated_weight: stats.max_weight,
            });
            continue;
        }

        let prev = days.range(..date).next_back();
        let next = days.range(date..).next();
        let (Some((prev_date, prev_stats)), Some((next_date, next_stats))) = (prev, next) else {
            continue;
        };

        let gap = (date - *prev_date).num_days() as f64;
        let total_gap = (*next_date - *prev_date).num_days() as f64;
        series.push(ProgressPoint {
            date,
            weight: None,
            volume: None,
            interpolated_weight: half_cosine(
                prev_stats.max_weight,
                next_stats.max_weight,
                gap,
                total_gap,
            ),
        });
    }

    series
}

/// S-shaped blend from `from` to `to`, `gap` steps into a span of `total_gap`.
///
/// Flat near both ends, steepest in the middle, so estimated days do not
/// read as sudden jumps.
#[must_use]
pub fn half_cosine(from: f64, to: f64, gap: f64, total_gap: f64) -> f64 {
    if total_gap <= 0.0 {
        return from;
    }
    from + (to - from) * (1.0 - (PI * gap / total_gap).cos()) / 2.0
}
