//src/model.rs
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// An exercise definition in the user's library.
///
/// `category` is a free-form tag ("Brust", "Beine", ...). History rows
/// reference exercises by id only; deleting a definition leaves those rows
/// intact and display falls back to the raw id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
}

/// A reusable named ordered list of exercise ids defining one workout day.
///
/// Duplicate ids are allowed and referential integrity is not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub exercises: Vec<String>,
}

/// One logged attempt at an exercise within a session.
///
/// Older persisted documents used `rpe` for the reserve count; the alias
/// accepts it on input and the field is always written back as `rir`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSet {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub reps: u32,
    #[serde(default, alias = "rpe")]
    pub rir: u32,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl WorkoutSet {
    /// A zeroed, not-yet-completed set with a fresh id.
    pub fn fresh() -> Self {
        Self {
            id: generate_id("set"),
            weight: 0.0,
            reps: 0,
            rir: 0,
            completed: false,
            note: None,
        }
    }

    /// True when the set carries no information worth keeping: incomplete
    /// and still at its zero defaults.
    pub fn is_blank(&self) -> bool {
        !self.completed && self.weight <= 0.0 && self.reps == 0
    }
}

/// A row inside a session or completed workout. Set order is significant:
/// it drives set-index display and "compare to previous session's set N".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExercise {
    pub exercise_id: String,
    #[serde(default)]
    pub sets: Vec<WorkoutSet>,
}

impl WorkoutExercise {
    /// A new entry with a single fresh set, as created when a session
    /// starts or an exercise is added to one.
    pub fn fresh(exercise_id: &str) -> Self {
        Self {
            exercise_id: exercise_id.to_string(),
            sets: vec![WorkoutSet::fresh()],
        }
    }
}

/// A finished, stored workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedWorkout {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    pub name: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub duration_minutes: i64,
    #[serde(default)]
    pub exercises: Vec<WorkoutExercise>,
}

/// A single bodyweight measurement in kilograms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightLogEntry {
    pub id: String,
    pub date: DateTime<Utc>,
    pub value: f64,
}

/// Lifecycle phase of the in-progress session.
///
/// Only `Preparing` carries reconciliation authority: while preparing, list
/// edits are mirrored onto the session's linked template. `Active` records
/// when the user confirmed the start so the finished workout can derive its
/// duration. `Editing` re-enters an already-completed workout and preserves
/// its identity so finishing replaces it in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum SessionPhase {
    Preparing,
    #[serde(rename_all = "camelCase")]
    Active { started_at: DateTime<Utc> },
    #[serde(rename_all = "camelCase")]
    Editing {
        workout_id: String,
        date: DateTime<Utc>,
        duration_minutes: i64,
    },
}

impl SessionPhase {
    /// True once the session has left the preparation phase.
    pub fn is_started(&self) -> bool {
        !matches!(self, Self::Preparing)
    }
}

/// The at-most-one in-progress workout session.
///
/// Persisted on every mutation so the application resumes it after a
/// restart. `template_id` records provenance; whether edits flow back to
/// that template is decided by the phase, not by the link itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    pub name: String,
    #[serde(flatten)]
    pub phase: SessionPhase,
    #[serde(default)]
    pub exercises: Vec<WorkoutExercise>,
}

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LENGTH: usize = 12;

/// Generates a random `prefix_xxxxxxxxxxxx` base-36 id.
pub fn generate_id(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("{prefix}_{suffix}")
}

/// The initial exercise library for a fresh (or unreadable) store.
pub fn default_exercises() -> Vec<Exercise> {
    [
        ("ex_1", "Maschine/Seitheben", "Shoulders"),
        ("ex_2", "Schrägbankmaschine", "Chest"),
        ("ex_3", "Brustdrückmaschine", "Chest"),
        ("ex_4", "Flys", "Chest"),
        ("ex_5", "Triceps-Extensions", "Triceps"),
        ("ex_6", "Bauch", "Abs"),
        ("ex_7", "Beinstrecker", "Legs"),
    ]
    .into_iter()
    .map(|(id, name, category)| Exercise {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
    })
    .collect()
}

/// The predefined workout day shipped with a fresh store.
pub fn default_templates() -> Vec<WorkoutTemplate> {
    vec![WorkoutTemplate {
        id: "tpl_1".to_string(),
        name: "Ganzkörper Training".to_string(),
        exercises: ["ex_2", "ex_3", "ex_4", "ex_5", "ex_6", "ex_7", "ex_1"]
            .into_iter()
            .map(str::to_string)
            .collect(),
    }]
}
