// src/lib.rs
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;

// --- Declare modules ---
pub mod backup;
pub mod coach;
mod config;
pub mod model;
pub mod stats;
pub mod store;

// --- Expose public types ---
pub use backup::{BackupDocument, BackupError, ImportSummary};
pub use coach::CoachError;
pub use config::{
    get_config_path as get_config_path_util,
    load as load_config_util,
    parse_color,
    save as save_config_util,
    Config,
    Error as ConfigError,
    StandardColor,
    Theme,
};
pub use model::{
    CompletedWorkout, Exercise, Session, SessionPhase, WeightLogEntry, WorkoutExercise,
    WorkoutSet, WorkoutTemplate,
};
pub use stats::{ActivityPoint, ExerciseStatistics, PeakSet, WeeklyAverage};
pub use store::{get_db_path as get_db_path_util, Store, StoreError};

/// Errors for session lifecycle violations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("No workout session is in progress.")]
    NoSession,
    #[error("A workout session is already in progress. Finish or abort it first.")]
    SessionExists,
    #[error("The session has already been started.")]
    AlreadyStarted,
    #[error("The session has not been started yet.")]
    NotStarted,
    #[error("No exercise at position {0} in the session.")]
    ExerciseIndex(usize),
    #[error("No set at position {1} for session exercise {0}.")]
    SetIndex(usize, usize),
}

/// Direction for the adjacent-swap reorder operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Field updates for one set; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetUpdate {
    pub weight: Option<f64>,
    pub reps: Option<u32>,
    pub rir: Option<u32>,
    pub note: Option<String>,
    pub completed: Option<bool>,
}

/// All domain collections, loaded wholesale from the store at startup and
/// rewritten wholesale (per collection) on every mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub exercises: Vec<Exercise>,
    pub templates: Vec<WorkoutTemplate>,
    pub history: Vec<CompletedWorkout>,
    pub weight_logs: Vec<WeightLogEntry>,
    pub session: Option<Session>,
}

impl AppState {
    /// Loads every collection, substituting the built-in defaults for
    /// exercises/templates and empty collections otherwise.
    pub fn load(store: &Store) -> Self {
        let session = match store.load(store::keys::ACTIVE_SESSION) {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(error = %err, "dropping unreadable in-progress session");
                None
            }
        };
        Self {
            exercises: store.load_or_else(store::keys::EXERCISES, model::default_exercises),
            templates: store.load_or_else(store::keys::TEMPLATES, model::default_templates),
            history: store.load_or_else(store::keys::HISTORY, Vec::new),
            weight_logs: store.load_or_else(store::keys::WEIGHT_LOGS, Vec::new),
            session,
        }
    }
}

/// The single controller owning configuration, the store, and all
/// collections. Every mutation entry point rewrites exactly one collection
/// in memory and immediately persists it; derived views (statistics,
/// progression lookup) recompute from the collections on demand.
pub struct AppService {
    pub config: Config,
    pub store: Store,
    pub state: AppState,
    pub db_path: PathBuf,
    pub config_path: PathBuf,
}

impl AppService {
    /// Initializes the application service.
    /// # Errors
    /// Returns `anyhow::Error` if config/store path determination, loading,
    /// or initialization fails.
    pub fn initialize() -> Result<Self> {
        let config_path =
            config::get_config_path().context("Failed to determine configuration file path")?;
        let config = config::load(&config_path)
            .context(format!("Failed to load config from {config_path:?}"))?;

        let db_path = store::get_db_path().context("Failed to determine data store path")?;
        let store = Store::open(&db_path)
            .with_context(|| format!("Failed to open data store at {db_path:?}"))?;

        let state = AppState::load(&store);

        Ok(Self {
            config,
            store,
            state,
            db_path,
            config_path,
        })
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    /// Saves the current configuration state.
    /// # Errors
    /// Returns `ConfigError` if saving fails.
    pub fn save_config(&self) -> Result<(), ConfigError> {
        config::save(&self.config_path, &self.config)
    }

    /// Sets or clears the AI coach credential.
    /// # Errors
    /// Returns `ConfigError` variants if saving fails.
    pub fn set_gemini_api_key(&mut self, key: Option<String>) -> Result<(), ConfigError> {
        self.config.gemini_api_key = key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty());
        self.save_config()
    }

    // ---- Persistence helpers (one key per collection) ----

    fn persist_exercises(&self) -> Result<()> {
        self.store
            .save(store::keys::EXERCISES, &self.state.exercises)
            .context("Failed to persist exercises")
    }

    fn persist_templates(&self) -> Result<()> {
        self.store
            .save(store::keys::TEMPLATES, &self.state.templates)
            .context("Failed to persist templates")
    }

    fn persist_history(&self) -> Result<()> {
        self.store
            .save(store::keys::HISTORY, &self.state.history)
            .context("Failed to persist workout history")
    }

    fn persist_weight_logs(&self) -> Result<()> {
        self.store
            .save(store::keys::WEIGHT_LOGS, &self.state.weight_logs)
            .context("Failed to persist weight log")
    }

    fn persist_session(&self) -> Result<()> {
        match &self.state.session {
            Some(session) => self.store.save(store::keys::ACTIVE_SESSION, session),
            None => self.store.remove(store::keys::ACTIVE_SESSION),
        }
        .context("Failed to persist in-progress session")
    }

    // ---- Exercise definitions ----

    /// Registers a new exercise definition.
    /// # Errors
    /// Returns `anyhow::Error` if the name is empty or persistence fails.
    pub fn create_exercise(&mut self, name: &str, category: &str) -> Result<Exercise> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            bail!("Exercise name cannot be empty.");
        }
        let exercise = Exercise {
            id: model::generate_id("ex"),
            name: trimmed.to_string(),
            category: category.trim().to_string(),
        };
        self.state.exercises.push(exercise.clone());
        self.persist_exercises()?;
        Ok(exercise)
    }

    /// Renames and/or recategorizes an exercise definition.
    /// # Errors
    /// Returns `anyhow::Error` if the id is unknown, the new name is empty,
    /// or persistence fails.
    pub fn edit_exercise(
        &mut self,
        id: &str,
        new_name: Option<&str>,
        new_category: Option<&str>,
    ) -> Result<()> {
        let trimmed_name = new_name.map(str::trim).filter(|n| !n.is_empty());
        if new_name.is_some() && trimmed_name.is_none() {
            bail!("New exercise name cannot be empty if provided.");
        }
        let exercise = self
            .state
            .exercises
            .iter_mut()
            .find(|exercise| exercise.id == id)
            .ok_or_else(|| anyhow::anyhow!("Exercise '{id}' not found."))?;
        if let Some(name) = trimmed_name {
            exercise.name = name.to_string();
        }
        if let Some(category) = new_category {
            exercise.category = category.trim().to_string();
        }
        self.persist_exercises()
    }

    /// Deletes an exercise definition. No cascade: history rows keep the
    /// id and degrade to displaying it raw.
    /// # Errors
    /// Returns `anyhow::Error` if the id is unknown or persistence fails.
    pub fn delete_exercise(&mut self, id: &str) -> Result<()> {
        let before = self.state.exercises.len();
        self.state.exercises.retain(|exercise| exercise.id != id);
        if self.state.exercises.len() == before {
            bail!("Exercise '{id}' not found.");
        }
        self.persist_exercises()
    }

    pub fn list_exercises(&self) -> &[Exercise] {
        &self.state.exercises
    }

    /// Display name for an exercise id, falling back to the raw id when
    /// the definition no longer exists.
    pub fn exercise_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.state
            .exercises
            .iter()
            .find(|exercise| exercise.id == id)
            .map_or(id, |exercise| exercise.name.as_str())
    }

    // ---- Workout templates ----

    /// Creates a new workout-day template. Ids are not checked against the
    /// exercise library and duplicates are allowed.
    /// # Errors
    /// Returns `anyhow::Error` if the name is empty or persistence fails.
    pub fn create_template(
        &mut self,
        name: &str,
        exercise_ids: Vec<String>,
    ) -> Result<WorkoutTemplate> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            bail!("Template name cannot be empty.");
        }
        let template = WorkoutTemplate {
            id: model::generate_id("tpl"),
            name: trimmed.to_string(),
            exercises: exercise_ids,
        };
        self.state.templates.push(template.clone());
        self.persist_templates()?;
        Ok(template)
    }

    /// Renames a template.
    /// # Errors
    /// Returns `anyhow::Error` if the id is unknown, the name is empty, or
    /// persistence fails.
    pub fn rename_template(&mut self, id: &str, new_name: &str) -> Result<()> {
        let trimmed = new_name.trim();
        if trimmed.is_empty() {
            bail!("Template name cannot be empty.");
        }
        let template = self.template_mut(id)?;
        template.name = trimmed.to_string();
        self.persist_templates()
    }

    /// Appends an exercise id to a template.
    /// # Errors
    /// Returns `anyhow::Error` if the template is unknown or persistence fails.
    pub fn template_add_exercise(&mut self, template_id: &str, exercise_id: &str) -> Result<()> {
        let template = self.template_mut(template_id)?;
        template.exercises.push(exercise_id.to_string());
        self.persist_templates()
    }

    /// Removes the exercise at `position` (0-based) from a template.
    /// # Errors
    /// Returns `anyhow::Error` if the template or position is unknown or
    /// persistence fails.
    pub fn template_remove_exercise(&mut self, template_id: &str, position: usize) -> Result<()> {
        let template = self.template_mut(template_id)?;
        if position >= template.exercises.len() {
            bail!("No exercise at position {position} in template '{template_id}'.");
        }
        template.exercises.remove(position);
        self.persist_templates()
    }

    /// Swaps the exercise at `position` with its neighbor. A move past
    /// either end of the list is a no-op.
    /// # Errors
    /// Returns `anyhow::Error` if the template or position is unknown or
    /// persistence fails.
    pub fn template_move_exercise(
        &mut self,
        template_id: &str,
        position: usize,
        direction: MoveDirection,
    ) -> Result<()> {
        let template = self.template_mut(template_id)?;
        if position >= template.exercises.len() {
            bail!("No exercise at position {position} in template '{template_id}'.");
        }
        if let Some(target) = swap_target(position, template.exercises.len(), direction) {
            template.exercises.swap(position, target);
        }
        self.persist_templates()
    }

    /// Deletes a template. An in-progress session started from it is not
    /// touched.
    /// # Errors
    /// Returns `anyhow::Error` if the id is unknown or persistence fails.
    pub fn delete_template(&mut self, id: &str) -> Result<()> {
        let before = self.state.templates.len();
        self.state.templates.retain(|template| template.id != id);
        if self.state.templates.len() == before {
            bail!("Template '{id}' not found.");
        }
        self.persist_templates()
    }

    pub fn list_templates(&self) -> &[WorkoutTemplate] {
        &self.state.templates
    }

    fn template_mut(&mut self, id: &str) -> Result<&mut WorkoutTemplate> {
        self.state
            .templates
            .iter_mut()
            .find(|template| template.id == id)
            .ok_or_else(|| anyhow::anyhow!("Template '{id}' not found."))
    }

    // ---- Session lifecycle ----

    pub fn session(&self) -> Option<&Session> {
        self.state.session.as_ref()
    }

    /// Builds a preparing session from a template: one entry per template
    /// exercise id, each with exactly one fresh zeroed set, in template
    /// order.
    /// # Errors
    /// Returns `anyhow::Error` if a session already exists or the template
    /// is unknown.
    pub fn start_session(&mut self, template_id: &str) -> Result<()> {
        if self.state.session.is_some() {
            bail!(SessionError::SessionExists);
        }
        let template = self
            .state
            .templates
            .iter()
            .find(|template| template.id == template_id)
            .ok_or_else(|| anyhow::anyhow!("Template '{template_id}' not found."))?;
        let exercises = template
            .exercises
            .iter()
            .map(|exercise_id| WorkoutExercise::fresh(exercise_id))
            .collect();
        self.state.session = Some(Session {
            id: model::generate_id("session"),
            template_id: Some(template.id.clone()),
            name: template.name.clone(),
            phase: SessionPhase::Preparing,
            exercises,
        });
        self.persist_session()
    }

    /// Confirms the start: `Preparing` becomes `Active` and the start time
    /// is recorded for the derived duration.
    /// # Errors
    /// Returns `SessionError::NoSession` / `SessionError::AlreadyStarted`.
    pub fn begin_session(&mut self) -> Result<()> {
        let session = self.state.session.as_mut().ok_or(SessionError::NoSession)?;
        if session.phase.is_started() {
            bail!(SessionError::AlreadyStarted);
        }
        session.phase = SessionPhase::Active {
            started_at: Utc::now(),
        };
        self.persist_session()
    }

    /// Re-enters an already-completed workout for editing: the session
    /// skips the preparation phase, all sets are pre-marked completed, and
    /// finishing replaces the stored workout in place.
    /// # Errors
    /// Returns `anyhow::Error` if a session exists or the workout id is
    /// unknown.
    pub fn edit_workout(&mut self, workout_id: &str) -> Result<()> {
        if self.state.session.is_some() {
            bail!(SessionError::SessionExists);
        }
        let workout = self
            .state
            .history
            .iter()
            .find(|workout| workout.id == workout_id)
            .ok_or_else(|| anyhow::anyhow!("Workout '{workout_id}' not found."))?;
        let mut exercises = workout.exercises.clone();
        for entry in &mut exercises {
            for set in &mut entry.sets {
                set.completed = true;
            }
        }
        self.state.session = Some(Session {
            id: model::generate_id("session"),
            template_id: workout.template_id.clone(),
            name: workout.name.clone(),
            phase: SessionPhase::Editing {
                workout_id: workout.id.clone(),
                date: workout.date,
                duration_minutes: workout.duration_minutes,
            },
            exercises,
        });
        self.persist_session()
    }

    /// Adds an existing exercise to the session (one fresh set). During
    /// preparation the linked template picks up the change.
    /// # Errors
    /// Returns `SessionError::NoSession` or a persistence error.
    pub fn session_add_exercise(&mut self, exercise_id: &str) -> Result<()> {
        let session = self.state.session.as_mut().ok_or(SessionError::NoSession)?;
        session.exercises.push(WorkoutExercise::fresh(exercise_id));
        self.sync_linked_template()?;
        self.persist_session()
    }

    /// Registers a brand-new exercise definition and adds it to the
    /// session in one step ("add custom exercise").
    /// # Errors
    /// Returns `anyhow::Error` if no session exists, the name is empty, or
    /// persistence fails.
    pub fn session_add_new_exercise(&mut self, name: &str, category: &str) -> Result<Exercise> {
        if self.state.session.is_none() {
            bail!(SessionError::NoSession);
        }
        let exercise = self.create_exercise(name, category)?;
        self.session_add_exercise(&exercise.id)?;
        Ok(exercise)
    }

    /// Removes the session exercise at `index` (0-based). During
    /// preparation the linked template picks up the change.
    /// # Errors
    /// Returns `SessionError` variants or a persistence error.
    pub fn session_remove_exercise(&mut self, index: usize) -> Result<()> {
        let session = self.state.session.as_mut().ok_or(SessionError::NoSession)?;
        if index >= session.exercises.len() {
            bail!(SessionError::ExerciseIndex(index));
        }
        session.exercises.remove(index);
        self.sync_linked_template()?;
        self.persist_session()
    }

    /// Swaps the session exercise at `index` with its neighbor; a move
    /// past either boundary is a no-op. Write-back to the template happens
    /// only while preparing.
    /// # Errors
    /// Returns `SessionError` variants or a persistence error.
    pub fn session_move_exercise(&mut self, index: usize, direction: MoveDirection) -> Result<()> {
        let session = self.state.session.as_mut().ok_or(SessionError::NoSession)?;
        if index >= session.exercises.len() {
            bail!(SessionError::ExerciseIndex(index));
        }
        if let Some(target) = swap_target(index, session.exercises.len(), direction) {
            session.exercises.swap(index, target);
        }
        self.sync_linked_template()?;
        self.persist_session()
    }

    /// Mirrors the session's exercise order onto its source template:
    /// editing a session before starting it edits the plan. Applies only
    /// in the preparation phase of a template-linked session; any later
    /// edit leaves the template untouched.
    fn sync_linked_template(&mut self) -> Result<()> {
        let Some(session) = self.state.session.as_ref() else {
            return Ok(());
        };
        if session.phase.is_started() {
            return Ok(());
        }
        let Some(template_id) = session.template_id.clone() else {
            return Ok(());
        };
        let order: Vec<String> = session
            .exercises
            .iter()
            .map(|entry| entry.exercise_id.clone())
            .collect();
        if let Some(template) = self
            .state
            .templates
            .iter_mut()
            .find(|template| template.id == template_id)
        {
            template.exercises = order;
            self.persist_templates()?;
        }
        Ok(())
    }

    /// Appends a set to a session exercise, carrying over the previous
    /// set's weight and reps as a starting point.
    /// # Errors
    /// Returns `SessionError` variants or a persistence error.
    pub fn add_set(&mut self, exercise_index: usize) -> Result<()> {
        let session = self.state.session.as_mut().ok_or(SessionError::NoSession)?;
        if !session.phase.is_started() {
            bail!(SessionError::NotStarted);
        }
        let entry = session
            .exercises
            .get_mut(exercise_index)
            .ok_or(SessionError::ExerciseIndex(exercise_index))?;
        let new_set = match entry.sets.last() {
            Some(last) => WorkoutSet {
                weight: last.weight,
                reps: last.reps,
                ..WorkoutSet::fresh()
            },
            None => WorkoutSet::fresh(),
        };
        entry.sets.push(new_set);
        self.persist_session()
    }

    /// Applies field updates to one set. Marking a set completed while it
    /// is still at its zero defaults auto-fills weight/reps/rir from the
    /// previous session's same-position set.
    /// # Errors
    /// Returns `SessionError` variants, a validation error, or a
    /// persistence error.
    pub fn update_set(
        &mut self,
        exercise_index: usize,
        set_index: usize,
        update: SetUpdate,
    ) -> Result<()> {
        if let Some(weight) = update.weight {
            if weight < 0.0 {
                bail!("Weight cannot be negative.");
            }
        }
        let prefill = {
            let session = self.state.session.as_ref().ok_or(SessionError::NoSession)?;
            let entry = session
                .exercises
                .get(exercise_index)
                .ok_or(SessionError::ExerciseIndex(exercise_index))?;
            self.last_performance(&entry.exercise_id)
                .and_then(|previous| previous.sets.get(set_index))
                .map(|set| (set.weight, set.reps, set.rir))
        };

        let session = self.state.session.as_mut().ok_or(SessionError::NoSession)?;
        if !session.phase.is_started() {
            bail!(SessionError::NotStarted);
        }
        let entry = session
            .exercises
            .get_mut(exercise_index)
            .ok_or(SessionError::ExerciseIndex(exercise_index))?;
        let set = entry
            .sets
            .get_mut(set_index)
            .ok_or(SessionError::SetIndex(exercise_index, set_index))?;

        if let Some(weight) = update.weight {
            set.weight = weight;
        }
        if let Some(reps) = update.reps {
            set.reps = reps;
        }
        if let Some(rir) = update.rir {
            set.rir = rir;
        }
        if let Some(note) = update.note {
            let trimmed = note.trim();
            set.note = if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            };
        }
        if let Some(completed) = update.completed {
            let first_completion = completed && !set.completed;
            set.completed = completed;
            if first_completion && set.weight == 0.0 && set.reps == 0 {
                if let Some((weight, reps, rir)) = prefill {
                    set.weight = weight;
                    set.reps = reps;
                    set.rir = rir;
                }
            }
        }
        self.persist_session()
    }

    /// Finishes the session into a `CompletedWorkout`, dropping every
    /// exercise whose sets are all blank. An `Active` session gets a fresh
    /// id, the current timestamp, and a duration derived from its start
    /// time; an `Editing` session keeps the original id/date/duration and
    /// replaces the stored workout in place. Clears the session.
    /// # Errors
    /// Returns `SessionError` variants or a persistence error.
    pub fn finish_session(&mut self) -> Result<CompletedWorkout> {
        let session = self.state.session.take().ok_or(SessionError::NoSession)?;
        if !session.phase.is_started() {
            self.state.session = Some(session);
            bail!(SessionError::NotStarted);
        }
        let Session {
            template_id,
            name,
            phase,
            exercises,
            ..
        } = session;
        let exercises: Vec<WorkoutExercise> = exercises
            .into_iter()
            .filter(|entry| entry.sets.iter().any(|set| !set.is_blank()))
            .collect();

        let workout = match phase {
            SessionPhase::Active { started_at } => {
                let now = Utc::now();
                let elapsed_seconds = (now - started_at).num_seconds().max(0);
                CompletedWorkout {
                    id: model::generate_id("wk"),
                    template_id,
                    name,
                    date: now,
                    duration_minutes: (elapsed_seconds + 59) / 60,
                    exercises,
                }
            }
            SessionPhase::Editing {
                workout_id,
                date,
                duration_minutes,
            } => CompletedWorkout {
                id: workout_id,
                template_id,
                name,
                date,
                duration_minutes,
                exercises,
            },
            SessionPhase::Preparing => bail!(SessionError::NotStarted),
        };

        match self
            .state
            .history
            .iter_mut()
            .find(|existing| existing.id == workout.id)
        {
            Some(existing) => *existing = workout.clone(),
            None => self.state.history.insert(0, workout.clone()),
        }
        self.persist_history()?;
        self.persist_session()?;
        Ok(workout)
    }

    /// Abandons the session with no resulting workout. The caller is
    /// responsible for the destructive-action confirmation.
    /// # Errors
    /// Returns `SessionError::NoSession` or a persistence error.
    pub fn abort_session(&mut self) -> Result<()> {
        if self.state.session.take().is_none() {
            bail!(SessionError::NoSession);
        }
        self.persist_session()
    }

    // ---- History ----

    /// The history as presented to the user: date descending, regardless
    /// of stored order.
    pub fn history(&self) -> Vec<&CompletedWorkout> {
        let mut view: Vec<&CompletedWorkout> = self.state.history.iter().collect();
        view.sort_by(|a, b| b.date.cmp(&a.date));
        view
    }

    pub fn get_workout(&self, id: &str) -> Option<&CompletedWorkout> {
        self.state.history.iter().find(|workout| workout.id == id)
    }

    /// Deletes a completed workout. The caller is responsible for the
    /// destructive-action confirmation.
    /// # Errors
    /// Returns `anyhow::Error` if the id is unknown or persistence fails.
    pub fn delete_workout(&mut self, id: &str) -> Result<()> {
        let before = self.state.history.len();
        self.state.history.retain(|workout| workout.id != id);
        if self.state.history.len() == before {
            bail!("Workout '{id}' not found.");
        }
        self.persist_history()
    }

    /// The most recent prior workout entry for an exercise, for the
    /// "last time: 42kg x 8" display and the auto-fill default.
    pub fn last_performance(&self, exercise_id: &str) -> Option<&WorkoutExercise> {
        let mut workouts: Vec<&CompletedWorkout> = self.state.history.iter().collect();
        workouts.sort_by(|a, b| b.date.cmp(&a.date));
        workouts
            .into_iter()
            .find_map(|workout| {
                workout
                    .exercises
                    .iter()
                    .find(|entry| entry.exercise_id == exercise_id)
            })
    }

    // ---- Weight log ----

    /// Adds a bodyweight entry (kg). The collection is kept sorted
    /// ascending by date after every mutation.
    /// # Errors
    /// Returns `anyhow::Error` if the value is not positive or persistence
    /// fails.
    pub fn add_weight_entry(&mut self, value: f64, date: DateTime<Utc>) -> Result<WeightLogEntry> {
        if value <= 0.0 {
            bail!("Bodyweight must be a positive number.");
        }
        let entry = WeightLogEntry {
            id: model::generate_id("bw"),
            date,
            value,
        };
        self.state.weight_logs.push(entry.clone());
        self.sort_weight_logs();
        self.persist_weight_logs()?;
        Ok(entry)
    }

    /// Updates a bodyweight entry's value.
    /// # Errors
    /// Returns `anyhow::Error` if the id is unknown, the value is not
    /// positive, or persistence fails.
    pub fn update_weight_entry(&mut self, id: &str, value: f64) -> Result<()> {
        if value <= 0.0 {
            bail!("Bodyweight must be a positive number.");
        }
        let entry = self
            .state
            .weight_logs
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| anyhow::anyhow!("Weight entry '{id}' not found."))?;
        entry.value = value;
        self.sort_weight_logs();
        self.persist_weight_logs()
    }

    /// Deletes a bodyweight entry. The caller is responsible for the
    /// destructive-action confirmation.
    /// # Errors
    /// Returns `anyhow::Error` if the id is unknown or persistence fails.
    pub fn delete_weight_entry(&mut self, id: &str) -> Result<()> {
        let before = self.state.weight_logs.len();
        self.state.weight_logs.retain(|entry| entry.id != id);
        if self.state.weight_logs.len() == before {
            bail!("Weight entry '{id}' not found.");
        }
        self.persist_weight_logs()
    }

    pub fn list_weight_entries(&self) -> &[WeightLogEntry] {
        &self.state.weight_logs
    }

    fn sort_weight_logs(&mut self) {
        self.state.weight_logs.sort_by(|a, b| a.date.cmp(&b.date));
    }

    // ---- Derived statistics ----

    /// Per-exercise statistics, `None` when nothing was ever logged.
    pub fn exercise_statistics(&self, exercise_id: &str) -> Option<ExerciseStatistics> {
        stats::exercise_statistics(exercise_id, &self.state.history)
    }

    /// ISO-week bodyweight averages, most recent week first.
    pub fn weekly_bodyweight_averages(&self) -> Vec<WeeklyAverage> {
        stats::weekly_bodyweight_averages(&self.state.weight_logs)
    }

    /// Sets-per-workout for the last `limit` workouts, oldest first.
    pub fn recent_activity(&self, limit: usize) -> Vec<ActivityPoint> {
        stats::recent_activity(&self.state.history, limit)
    }

    // ---- Backup ----

    /// Serializes all collections into one pretty-printed JSON document.
    /// # Errors
    /// Returns `BackupError` if serialization fails.
    pub fn export_backup(&self) -> Result<String, BackupError> {
        let document = backup::export_document(
            &self.state.exercises,
            &self.state.templates,
            &self.state.history,
            &self.state.weight_logs,
        );
        backup::to_pretty_json(&document)
    }

    /// Merges a backup document into the collections: id-deduplicated per
    /// collection, history re-sorted descending and weight logs ascending
    /// afterwards. Collections missing from (or malformed in) the document
    /// are skipped.
    /// # Errors
    /// Returns `anyhow::Error` wrapping `BackupError` for unusable input,
    /// or a persistence error.
    pub fn import_backup(&mut self, text: &str) -> Result<ImportSummary> {
        let document = backup::parse_document(text).context("Could not read backup file")?;
        let mut summary = ImportSummary::default();

        if let Some(incoming) = document.exercises {
            summary.exercises_added =
                backup::merge_by_id(&mut self.state.exercises, incoming, |exercise| &exercise.id);
            self.persist_exercises()?;
        }
        if let Some(incoming) = document.templates {
            summary.templates_added =
                backup::merge_by_id(&mut self.state.templates, incoming, |template| &template.id);
            self.persist_templates()?;
        }
        if let Some(incoming) = document.history {
            summary.workouts_added =
                backup::merge_by_id(&mut self.state.history, incoming, |workout| &workout.id);
            self.state.history.sort_by(|a, b| b.date.cmp(&a.date));
            self.persist_history()?;
        }
        if let Some(incoming) = document.weight_logs {
            summary.weight_logs_added =
                backup::merge_by_id(&mut self.state.weight_logs, incoming, |entry| &entry.id);
            self.sort_weight_logs();
            self.persist_weight_logs()?;
        }
        Ok(summary)
    }

    // ---- AI coach ----

    /// Asks the coach for an analysis of the recent history.
    /// # Errors
    /// `CoachError::NoHistory` with an empty history; `CoachError::Disabled`
    /// without a configured credential. Transport failures are not errors,
    /// they collapse to a fixed apology string.
    pub fn analyze_progress(&self) -> Result<String, CoachError> {
        if self.state.history.is_empty() {
            return Err(CoachError::NoHistory);
        }
        let api_key = self
            .config
            .gemini_api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(CoachError::Disabled)?;
        let history = self.history();
        Ok(coach::analyze_progress(
            &history,
            &self.state.exercises,
            &api_key,
        ))
    }
}

// --- Helper Functions ---

/// Index to swap with for an adjacent move, `None` at either boundary.
fn swap_target(index: usize, len: usize, direction: MoveDirection) -> Option<usize> {
    match direction {
        MoveDirection::Up => index.checked_sub(1),
        MoveDirection::Down => (index + 1 < len).then_some(index + 1),
    }
}
