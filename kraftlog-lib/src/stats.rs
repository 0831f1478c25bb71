//src/stats.rs
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, HashMap};

use crate::model::{CompletedWorkout, WeightLogEntry};

/// One set from the history, tagged with its workout date and its position
/// among sets of the same exercise on that date.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedSet {
    pub date: NaiveDate,
    pub position: usize,
    pub weight: f64,
    pub reps: u32,
    pub rir: u32,
    pub completed: bool,
}

/// The peak set of one calendar date: highest weight, ties broken by
/// higher rep count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakSet {
    pub date: NaiveDate,
    pub weight: f64,
    pub reps: u32,
}

/// Read-only projection over the history for a single exercise.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseStatistics {
    /// Every set ever logged for the exercise, chronological.
    pub logged_sets: Vec<LoggedSet>,
    /// One peak set per calendar date, chronological (the chart series).
    pub daily_peaks: Vec<PeakSet>,
    /// The date-grouped peak with the highest weight across all dates.
    pub all_time_best: PeakSet,
    /// Epley estimate computed from the all-time best.
    pub estimated_one_rep_max: f64,
}

/// Epley-style linear approximation: `weight * (1 + reps/30)`.
pub fn estimated_one_rep_max(weight: f64, reps: u32) -> f64 {
    weight * (1.0 + f64::from(reps) / 30.0)
}

/// True when `candidate` beats `best` under the peak-set rule.
fn outranks(candidate: &PeakSet, best: &PeakSet) -> bool {
    candidate.weight > best.weight
        || (candidate.weight == best.weight && candidate.reps > best.reps)
}

/// Aggregates everything ever logged for `exercise_id`.
///
/// Returns `None` when no set exists for the exercise: a distinct "no
/// data" result, not a zeroed statistic. The peak-set rule is shared
/// between the daily series and the all-time best.
pub fn exercise_statistics(
    exercise_id: &str,
    history: &[CompletedWorkout],
) -> Option<ExerciseStatistics> {
    let mut workouts: Vec<&CompletedWorkout> = history
        .iter()
        .filter(|workout| {
            workout
                .exercises
                .iter()
                .any(|entry| entry.exercise_id == exercise_id)
        })
        .collect();
    workouts.sort_by_key(|workout| workout.date);

    let mut logged_sets = Vec::new();
    let mut positions: HashMap<NaiveDate, usize> = HashMap::new();
    for workout in workouts {
        let date = workout.date.date_naive();
        for entry in workout
            .exercises
            .iter()
            .filter(|entry| entry.exercise_id == exercise_id)
        {
            for set in &entry.sets {
                let position = positions.entry(date).or_insert(0);
                logged_sets.push(LoggedSet {
                    date,
                    position: *position,
                    weight: set.weight,
                    reps: set.reps,
                    rir: set.rir,
                    completed: set.completed,
                });
                *position += 1;
            }
        }
    }
    if logged_sets.is_empty() {
        return None;
    }

    let mut daily: BTreeMap<NaiveDate, PeakSet> = BTreeMap::new();
    for set in &logged_sets {
        let candidate = PeakSet {
            date: set.date,
            weight: set.weight,
            reps: set.reps,
        };
        daily
            .entry(set.date)
            .and_modify(|best| {
                if outranks(&candidate, best) {
                    *best = candidate;
                }
            })
            .or_insert(candidate);
    }
    let daily_peaks: Vec<PeakSet> = daily.into_values().collect();

    let all_time_best = daily_peaks.iter().copied().reduce(|best, candidate| {
        if outranks(&candidate, &best) {
            candidate
        } else {
            best
        }
    })?;

    Some(ExerciseStatistics {
        estimated_one_rep_max: estimated_one_rep_max(all_time_best.weight, all_time_best.reps),
        logged_sets,
        daily_peaks,
        all_time_best,
    })
}

/// Average bodyweight for one ISO week, with the change relative to the
/// previous week. Deltas are absent for the oldest week in range.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyAverage {
    pub year: i32,
    pub week: u32,
    pub average: f64,
    pub delta: Option<f64>,
    pub delta_pct: Option<f64>,
}

/// Groups weight entries by ISO-8601 week (Monday start, numbered by the
/// year of the week's Thursday) and averages them, most recent week first.
pub fn weekly_bodyweight_averages(logs: &[WeightLogEntry]) -> Vec<WeeklyAverage> {
    let mut groups: BTreeMap<(i32, u32), Vec<f64>> = BTreeMap::new();
    for log in logs {
        let iso = log.date.date_naive().iso_week();
        groups
            .entry((iso.year(), iso.week()))
            .or_default()
            .push(log.value);
    }

    let averaged: Vec<((i32, u32), f64)> = groups
        .into_iter()
        .map(|(key, values)| {
            let avg = values.iter().sum::<f64>() / values.len() as f64;
            (key, avg)
        })
        .collect();

    let mut weeks: Vec<WeeklyAverage> = averaged
        .iter()
        .enumerate()
        .map(|(index, &((year, week), average))| {
            let (delta, delta_pct) = if index == 0 {
                (None, None)
            } else {
                let previous = averaged[index - 1].1;
                let diff = average - previous;
                (Some(diff), Some(diff / previous * 100.0))
            };
            WeeklyAverage {
                year,
                week,
                average,
                delta,
                delta_pct,
            }
        })
        .collect();
    weeks.reverse();
    weeks
}

/// Sets-per-workout summary for the activity chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityPoint {
    pub date: NaiveDate,
    pub name: String,
    pub total_sets: usize,
}

/// The last `limit` workouts, oldest first.
pub fn recent_activity(history: &[CompletedWorkout], limit: usize) -> Vec<ActivityPoint> {
    let mut workouts: Vec<&CompletedWorkout> = history.iter().collect();
    workouts.sort_by(|a, b| b.date.cmp(&a.date));
    let mut points: Vec<ActivityPoint> = workouts
        .into_iter()
        .take(limit)
        .map(|workout| ActivityPoint {
            date: workout.date.date_naive(),
            name: workout.name.clone(),
            total_sets: workout
                .exercises
                .iter()
                .map(|entry| entry.sets.len())
                .sum(),
        })
        .collect();
    points.reverse();
    points
}
