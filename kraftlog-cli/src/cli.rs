// src/cli.rs
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "KraftLog: local-first workout tracking", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Print tabular output as CSV instead of a formatted table
    #[arg(long, global = true)]
    pub export_csv: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectionCli {
    Up,
    Down,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a new exercise to the library
    CreateExercise {
        /// Name of the exercise (e.g., "Brustdrückmaschine")
        name: String,
        /// Free-form category tag (e.g., "Brust", "Beine")
        #[arg(short, long, default_value = "Andere")]
        category: String,
    },
    /// Rename or recategorize an exercise
    EditExercise {
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Delete an exercise definition (history entries keep the raw id)
    DeleteExercise { id: String },
    /// List the exercise library, grouped by category
    ListExercises {
        /// Only show exercises whose name contains this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Create a workout-day template
    CreateTemplate {
        /// Name of the template (e.g., "Tag 1 - Woche 12")
        name: String,
        /// Comma-separated exercise ids, in order
        #[arg(short, long, value_delimiter = ',')]
        exercises: Vec<String>,
    },
    /// Rename a template
    RenameTemplate { id: String, name: String },
    /// Append an exercise to a template
    TemplateAddExercise { template: String, exercise: String },
    /// Remove the exercise at a 1-based position from a template
    TemplateRemoveExercise { template: String, position: usize },
    /// Move the exercise at a 1-based position up or down one slot
    TemplateMoveExercise {
        template: String,
        position: usize,
        #[arg(value_enum)]
        direction: DirectionCli,
    },
    /// Delete a template
    DeleteTemplate { id: String },
    /// List all templates
    ListTemplates,

    /// Create a session from a template (preparation phase)
    StartSession { template: String },
    /// Confirm the start: preparation becomes an active session
    BeginSession,
    /// Show the in-progress session
    ShowSession,
    /// Add an exercise from the library to the session
    SessionAddExercise { exercise: String },
    /// Register a brand-new exercise and add it to the session
    SessionAddNewExercise {
        name: String,
        #[arg(short, long, default_value = "Andere")]
        category: String,
    },
    /// Remove the session exercise at a 1-based position
    SessionRemoveExercise { position: usize },
    /// Move the session exercise at a 1-based position up or down
    SessionMoveExercise {
        position: usize,
        #[arg(value_enum)]
        direction: DirectionCli,
    },
    /// Append a set to the session exercise at a 1-based position
    AddSet { exercise: usize },
    /// Update one set of the active session (1-based positions)
    LogSet {
        exercise: usize,
        set: usize,
        #[arg(short, long)]
        weight: Option<f64>,
        #[arg(short, long)]
        reps: Option<u32>,
        /// Reps in reserve
        #[arg(long)]
        rir: Option<u32>,
        #[arg(short, long)]
        notes: Option<String>,
        /// Mark the set completed (auto-fills from last time when still zeroed)
        #[arg(long, conflicts_with = "uncomplete")]
        complete: bool,
        /// Clear the completed flag
        #[arg(long)]
        uncomplete: bool,
    },
    /// Finish the session into the history
    FinishSession,
    /// Abandon the session without saving a workout
    AbortSession,

    /// List completed workouts, most recent first
    List {
        /// Show only the last N workouts
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Show one completed workout in full
    ShowWorkout { id: String },
    /// Re-open a completed workout for editing
    EditWorkout { id: String },
    /// Delete a completed workout
    DeleteWorkout { id: String },
    /// Per-exercise statistics: daily peaks, all-time best, estimated 1RM
    Stats { exercise: String },
    /// Sets-per-workout overview of the recent history
    Activity {
        #[arg(short, long, default_value_t = 7)]
        limit: usize,
    },

    /// Log a bodyweight measurement (kg)
    LogBodyweight {
        weight: f64,
        /// Date of the measurement (YYYY-MM-DD, default today)
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Change a bodyweight entry's value
    EditBodyweight { id: String, weight: f64 },
    /// Delete a bodyweight entry
    DeleteBodyweight { id: String },
    /// List all bodyweight entries, oldest first
    ListBodyweights,
    /// Weekly bodyweight averages with week-over-week change
    WeightStats,

    /// Export all collections to a JSON backup file
    Export {
        /// Target file (default: kraftlog_backup_<date>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Merge a JSON backup file into the current data
    Import { file: PathBuf },

    /// Ask the AI coach for feedback on the recent history
    Coach,
    /// Store the Gemini API key in the config file
    SetApiKey { key: String },
    /// Remove the Gemini API key (disables the coach)
    ClearApiKey,

    /// Show the path to the data store
    DbPath,
    /// Show the path to the config file
    ConfigPath,
    /// Generate shell completion script
    GenerateCompletion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("invalid date '{s}': {e}"))
}

// Function to parse CLI arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

// Expose the command structure for completion generation
pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
