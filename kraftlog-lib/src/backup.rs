//src/backup.rs
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

use crate::model::{CompletedWorkout, Exercise, WeightLogEntry, WorkoutTemplate};

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Backup is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Backup root must be a JSON object")]
    NotAnObject,
}

/// The backup file: a single JSON object in which every collection is
/// independently optional. Earlier exports contained only `history`; this
/// is the final, complete form.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<CompletedWorkout>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercises: Option<Vec<Exercise>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates: Option<Vec<WorkoutTemplate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_logs: Option<Vec<WeightLogEntry>>,
}

/// Per-collection counts of entries actually added by an import.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub workouts_added: usize,
    pub exercises_added: usize,
    pub templates_added: usize,
    pub weight_logs_added: usize,
}

impl ImportSummary {
    pub fn total(&self) -> usize {
        self.workouts_added + self.exercises_added + self.templates_added + self.weight_logs_added
    }
}

/// Builds the full export document from the current collections.
pub fn export_document(
    exercises: &[Exercise],
    templates: &[WorkoutTemplate],
    history: &[CompletedWorkout],
    weight_logs: &[WeightLogEntry],
) -> BackupDocument {
    BackupDocument {
        history: Some(history.to_vec()),
        exercises: Some(exercises.to_vec()),
        templates: Some(templates.to_vec()),
        weight_logs: Some(weight_logs.to_vec()),
    }
}

/// Renders a document as pretty-printed, human-readable JSON.
/// # Errors
/// Returns `BackupError::InvalidJson` if serialization fails.
pub fn to_pretty_json(document: &BackupDocument) -> Result<String, BackupError> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// Parses a backup file.
///
/// A collection that fails to deserialize is skipped (logged, left `None`)
/// rather than failing the whole import; only non-JSON input or a
/// non-object root is an error.
/// # Errors
/// `BackupError::InvalidJson` or `BackupError::NotAnObject`.
pub fn parse_document(text: &str) -> Result<BackupDocument, BackupError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(map) = value else {
        return Err(BackupError::NotAnObject);
    };
    Ok(BackupDocument {
        history: collection(&map, "history"),
        exercises: collection(&map, "exercises"),
        templates: collection(&map, "templates"),
        weight_logs: collection(&map, "weightLogs"),
    })
}

fn collection<T: DeserializeOwned>(
    map: &serde_json::Map<String, Value>,
    key: &str,
) -> Option<Vec<T>> {
    let value = map.get(key)?.clone();
    match serde_json::from_value(value) {
        Ok(items) => Some(items),
        Err(err) => {
            tracing::warn!(key, error = %err, "skipping malformed backup collection");
            None
        }
    }
}

/// Id-deduplicating merge: incoming entries whose id already exists in
/// `existing` (or earlier in the incoming set) are dropped, the rest are
/// appended. Returns how many entries were added.
pub fn merge_by_id<T, F>(existing: &mut Vec<T>, incoming: Vec<T>, id_of: F) -> usize
where
    F: Fn(&T) -> &str,
{
    let mut known: HashSet<String> = existing.iter().map(|item| id_of(item).to_string()).collect();
    let mut added = 0;
    for item in incoming {
        if known.insert(id_of(&item).to_string()) {
            existing.push(item);
            added += 1;
        }
    }
    added
}
