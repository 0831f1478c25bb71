//src/coach.rs
use serde_json::{json, Value};
use std::cmp::Ordering;
use thiserror::Error;

use crate::model::{CompletedWorkout, Exercise};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const COACH_MODEL: &str = "gemini-3-flash-preview";
const RECENT_WORKOUT_COUNT: usize = 5;

/// Shown whenever the request or the response shape fails. One-shot: there
/// is no retry and no timeout handling.
pub const COACH_UNAVAILABLE: &str =
    "The AI coach could not be reached. Please try again later.";

const SYSTEM_INSTRUCTION: &str = "\
You are a professional powerlifting and bodybuilding coach.
Analyze my client's training data and give short, concise feedback on:
1. Training consistency.
2. Notable strength gains or plateaus.
3. One concrete recommendation for the next session.

Keep it brief and motivating. Use Markdown for formatting.";

#[derive(Error, Debug)]
pub enum CoachError {
    #[error(
        "No API key configured. Set `gemini_api_key` in the config file or the \
         GEMINI_API_KEY environment variable to enable the coach."
    )]
    Disabled,
    #[error("Complete a few workouts first, then ask the coach again.")]
    NoHistory,
}

/// Sends the recent-workout summary for analysis and returns the model's
/// free-text answer verbatim, or the fixed apology string on any failure.
pub fn analyze_progress(
    history: &[&CompletedWorkout],
    exercises: &[Exercise],
    api_key: &str,
) -> String {
    match request_analysis(history, exercises, api_key) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(error = %err, "coach request failed");
            COACH_UNAVAILABLE.to_string()
        }
    }
}

fn request_analysis(
    history: &[&CompletedWorkout],
    exercises: &[Exercise],
    api_key: &str,
) -> anyhow::Result<String> {
    let summaries = workout_summaries(history, exercises);
    let prompt = format!(
        "Analyze the following recent training sessions of my client (JSON format):\n{}",
        serde_json::to_string(&summaries)?
    );
    let body = json!({
        "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
        "contents": [{ "parts": [{ "text": prompt }] }],
    });
    let url = format!("{API_BASE}/{COACH_MODEL}:generateContent?key={api_key}");

    let client = reqwest::blocking::Client::new();
    let response: Value = client
        .post(&url)
        .json(&body)
        .send()?
        .error_for_status()?
        .json()?;

    let text = response["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .unwrap_or("")
        .trim()
        .to_string();
    if text.is_empty() {
        anyhow::bail!("model returned no analysis text");
    }
    Ok(text)
}

/// Summary of the most recent workouts: name, date, and the best set per
/// exercise, using the same peak rule as the statistics display.
fn workout_summaries(history: &[&CompletedWorkout], exercises: &[Exercise]) -> Value {
    let recent: Vec<Value> = history
        .iter()
        .take(RECENT_WORKOUT_COUNT)
        .map(|workout| {
            let lines: Vec<String> = workout
                .exercises
                .iter()
                .map(|entry| {
                    let name = exercises
                        .iter()
                        .find(|exercise| exercise.id == entry.exercise_id)
                        .map_or(entry.exercise_id.as_str(), |exercise| exercise.name.as_str());
                    let best = entry.sets.iter().max_by(|a, b| {
                        a.weight
                            .partial_cmp(&b.weight)
                            .unwrap_or(Ordering::Equal)
                            .then(a.reps.cmp(&b.reps))
                    });
                    match best {
                        Some(set) => format!("{name}: Max {}kg x {}", set.weight, set.reps),
                        None => format!("{name}: Max 0kg x 0"),
                    }
                })
                .collect();
            json!({
                "date": workout.date.to_rfc3339(),
                "name": workout.name,
                "exercises": lines,
            })
        })
        .collect();
    json!(recent)
}
