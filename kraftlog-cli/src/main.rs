//src/main.rs
mod cli; // Keep cli module for parsing args

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate, TimeZone, Utc};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use std::io;
use std::io::{stdin, stdout, Write};

use kraftlog_lib::{
    AppService, CompletedWorkout, Exercise, MoveDirection, Session, SessionPhase, WeightLogEntry,
    WeeklyAverage,
};

fn main() -> Result<()> {
    // --- Check for completion generation request FIRST ---
    let cli_args = cli::parse_args(); // Parse arguments once
    let export_csv = cli_args.export_csv;

    if let cli::Commands::GenerateCompletion { shell } = cli_args.command {
        let mut cmd = cli::build_cli_command(); // Get the command structure
        let bin_name = cmd.get_name().to_string(); // Get the binary name

        eprintln!("Generating completion script for {shell}..."); // Print to stderr
        clap_complete::generate(shell, &mut cmd, bin_name, &mut stdout()); // Print script to stdout
        return Ok(());
    }

    tracing_subscriber::fmt::init();

    // Initialize the application service (loads config, opens the store)
    let mut service =
        AppService::initialize().context("Failed to initialize application service")?;

    // --- Execute Commands using AppService ---
    match cli_args.command {
        cli::Commands::GenerateCompletion { .. } => {
            // This case is handled above, but keep it exhaustive
            unreachable!("Completion generation should have exited already");
        }

        // --- Exercise Library Commands ---
        cli::Commands::CreateExercise { name, category } => {
            match service.create_exercise(&name, &category) {
                Ok(exercise) => println!(
                    "Successfully added exercise '{}' (Category: {}) ID: {}",
                    exercise.name, exercise.category, exercise.id
                ),
                Err(e) => bail!("Error creating exercise: {}", e),
            }
        }
        cli::Commands::EditExercise { id, name, category } => {
            match service.edit_exercise(&id, name.as_deref(), category.as_deref()) {
                Ok(()) => println!("Successfully updated exercise '{id}'."),
                Err(e) => bail!("Error editing exercise '{}': {}", id, e),
            }
        }
        cli::Commands::DeleteExercise { id } => {
            let name = service.exercise_name(&id).to_string();
            if !confirm(&format!(
                "Delete exercise '{name}'? History entries keep the raw id."
            ))? {
                println!("Aborted.");
                return Ok(());
            }
            match service.delete_exercise(&id) {
                Ok(()) => println!("Successfully deleted exercise '{name}'."),
                Err(e) => bail!("Error deleting exercise '{}': {}", id, e),
            }
        }
        cli::Commands::ListExercises { search } => {
            let needle = search.map(|s| s.to_lowercase());
            let mut exercises: Vec<&Exercise> = service
                .list_exercises()
                .iter()
                .filter(|exercise| match &needle {
                    Some(needle) => exercise.name.to_lowercase().contains(needle),
                    None => true,
                })
                .collect();
            if exercises.is_empty() {
                println!("No exercises found matching the criteria.");
            } else {
                exercises.sort_by(|a, b| {
                    display_category(&a.category)
                        .cmp(display_category(&b.category))
                        .then_with(|| a.name.cmp(&b.name))
                });
                print_exercise_table(&exercises, header_color(&service));
            }
        }

        // --- Template Commands ---
        cli::Commands::CreateTemplate { name, exercises } => {
            match service.create_template(&name, exercises) {
                Ok(template) => println!(
                    "Successfully created template '{}' ({} exercise(s)) ID: {}",
                    template.name,
                    template.exercises.len(),
                    template.id
                ),
                Err(e) => bail!("Error creating template: {}", e),
            }
        }
        cli::Commands::RenameTemplate { id, name } => match service.rename_template(&id, &name) {
            Ok(()) => println!("Successfully renamed template '{id}' to '{name}'."),
            Err(e) => bail!("Error renaming template '{}': {}", id, e),
        },
        cli::Commands::TemplateAddExercise { template, exercise } => {
            match service.template_add_exercise(&template, &exercise) {
                Ok(()) => println!(
                    "Added '{}' to template '{template}'.",
                    service.exercise_name(&exercise)
                ),
                Err(e) => bail!("Error editing template '{}': {}", template, e),
            }
        }
        cli::Commands::TemplateRemoveExercise { template, position } => {
            let index = zero_based(position)?;
            match service.template_remove_exercise(&template, index) {
                Ok(()) => println!("Removed exercise {position} from template '{template}'."),
                Err(e) => bail!("Error editing template '{}': {}", template, e),
            }
        }
        cli::Commands::TemplateMoveExercise {
            template,
            position,
            direction,
        } => {
            let index = zero_based(position)?;
            match service.template_move_exercise(&template, index, move_direction(direction)) {
                Ok(()) => println!("Reordered template '{template}'."),
                Err(e) => bail!("Error editing template '{}': {}", template, e),
            }
        }
        cli::Commands::DeleteTemplate { id } => {
            if !confirm(&format!("Delete template '{id}'?"))? {
                println!("Aborted.");
                return Ok(());
            }
            match service.delete_template(&id) {
                Ok(()) => println!("Successfully deleted template '{id}'."),
                Err(e) => bail!("Error deleting template '{}': {}", id, e),
            }
        }
        cli::Commands::ListTemplates => {
            let templates = service.list_templates();
            if templates.is_empty() {
                println!("No templates defined.");
            } else {
                print_template_table(&service, header_color(&service));
            }
        }

        // --- Session Commands ---
        cli::Commands::StartSession { template } => match service.start_session(&template) {
            Ok(()) => {
                println!("Session prepared from template '{template}'.");
                println!("Adjust the exercise list, then run 'begin-session' to start logging.");
                print_session(&service);
            }
            Err(e) => bail!("Error starting session: {}", e),
        },
        cli::Commands::BeginSession => match service.begin_session() {
            Ok(()) => println!("Session started. Log sets with 'log-set'."),
            Err(e) => bail!("Error starting session: {}", e),
        },
        cli::Commands::ShowSession => {
            if service.session().is_none() {
                println!("No workout session is in progress.");
            } else {
                print_session(&service);
            }
        }
        cli::Commands::SessionAddExercise { exercise } => {
            match service.session_add_exercise(&exercise) {
                Ok(()) => println!(
                    "Added '{}' to the session.",
                    service.exercise_name(&exercise)
                ),
                Err(e) => bail!("Error editing session: {}", e),
            }
        }
        cli::Commands::SessionAddNewExercise { name, category } => {
            match service.session_add_new_exercise(&name, &category) {
                Ok(exercise) => println!(
                    "Registered '{}' (ID: {}) and added it to the session.",
                    exercise.name, exercise.id
                ),
                Err(e) => bail!("Error editing session: {}", e),
            }
        }
        cli::Commands::SessionRemoveExercise { position } => {
            let index = zero_based(position)?;
            match service.session_remove_exercise(index) {
                Ok(()) => println!("Removed exercise {position} from the session."),
                Err(e) => bail!("Error editing session: {}", e),
            }
        }
        cli::Commands::SessionMoveExercise {
            position,
            direction,
        } => {
            let index = zero_based(position)?;
            match service.session_move_exercise(index, move_direction(direction)) {
                Ok(()) => print_session(&service),
                Err(e) => bail!("Error editing session: {}", e),
            }
        }
        cli::Commands::AddSet { exercise } => {
            let index = zero_based(exercise)?;
            match service.add_set(index) {
                Ok(()) => println!("Added a set to exercise {exercise}."),
                Err(e) => bail!("Error adding set: {}", e),
            }
        }
        cli::Commands::LogSet {
            exercise,
            set,
            weight,
            reps,
            rir,
            notes,
            complete,
            uncomplete,
        } => {
            let exercise_index = zero_based(exercise)?;
            let set_index = zero_based(set)?;
            let completed = if complete {
                Some(true)
            } else if uncomplete {
                Some(false)
            } else {
                None
            };
            let update = kraftlog_lib::SetUpdate {
                weight,
                reps,
                rir,
                note: notes,
                completed,
            };
            match service.update_set(exercise_index, set_index, update) {
                Ok(()) => print_session(&service),
                Err(e) => bail!("Error logging set: {}", e),
            }
        }
        cli::Commands::FinishSession => match service.finish_session() {
            Ok(workout) => println!(
                "Saved workout '{}' ({} exercise(s), {} min) ID: {}",
                workout.name,
                workout.exercises.len(),
                workout.duration_minutes,
                workout.id
            ),
            Err(e) => bail!("Error finishing session: {}", e),
        },
        cli::Commands::AbortSession => {
            let Some(name) = service.session().map(|session| session.name.clone()) else {
                println!("No workout session is in progress.");
                return Ok(());
            };
            if !confirm(&format!(
                "Abandon the session '{name}'? Logged sets will be lost."
            ))? {
                println!("Aborted.");
                return Ok(());
            }
            match service.abort_session() {
                Ok(()) => println!("Session abandoned."),
                Err(e) => bail!("Error abandoning session: {}", e),
            }
        }

        // --- History Commands ---
        cli::Commands::List { limit } => {
            let history = service.history();
            if history.is_empty() {
                println!("No workouts recorded yet.");
            } else if export_csv {
                print_history_csv(history.into_iter().take(limit))?;
            } else {
                let workouts: Vec<&CompletedWorkout> = history.into_iter().take(limit).collect();
                print_history_table(&workouts, header_color(&service));
            }
        }
        cli::Commands::ShowWorkout { id } => match service.get_workout(&id) {
            Some(workout) => print_workout_details(&service, workout),
            None => println!("Workout '{id}' not found."),
        },
        cli::Commands::EditWorkout { id } => match service.edit_workout(&id) {
            Ok(()) => {
                println!("Re-opened workout '{id}' for editing. Finishing will replace it.");
                print_session(&service);
            }
            Err(e) => bail!("Error editing workout '{}': {}", id, e),
        },
        cli::Commands::DeleteWorkout { id } => {
            let Some(workout) = service.get_workout(&id) else {
                println!("Workout '{id}' not found.");
                return Ok(());
            };
            let prompt = format!(
                "Delete workout '{}' from {}? This cannot be undone.",
                workout.name,
                workout.date.with_timezone(&Local).format("%Y-%m-%d")
            );
            if !confirm(&prompt)? {
                println!("Aborted.");
                return Ok(());
            }
            match service.delete_workout(&id) {
                Ok(()) => println!("Successfully deleted workout '{id}'."),
                Err(e) => bail!("Error deleting workout '{}': {}", id, e),
            }
        }
        cli::Commands::Stats { exercise } => {
            let name = service.exercise_name(&exercise).to_string();
            match service.exercise_statistics(&exercise) {
                Some(statistics) => print_exercise_stats(&name, &statistics),
                None => {
                    println!("No workout data found for exercise '{name}'. Cannot calculate stats.")
                }
            }
        }
        cli::Commands::Activity { limit } => {
            let points = service.recent_activity(limit);
            if points.is_empty() {
                println!("No workouts recorded yet.");
            } else {
                print_activity_table(&points, header_color(&service));
            }
        }

        // --- Bodyweight Commands ---
        cli::Commands::LogBodyweight { weight, date } => {
            let timestamp = timestamp_for(date);
            match service.add_weight_entry(weight, timestamp) {
                Ok(entry) => println!(
                    "Successfully logged bodyweight {:.1} kg on {} (ID: {})",
                    entry.value,
                    entry.date.with_timezone(&Local).format("%Y-%m-%d"),
                    entry.id
                ),
                Err(e) => bail!("Error logging bodyweight: {}", e),
            }
        }
        cli::Commands::EditBodyweight { id, weight } => {
            match service.update_weight_entry(&id, weight) {
                Ok(()) => println!("Updated weight entry '{id}' to {weight:.1} kg."),
                Err(e) => bail!("Error editing weight entry '{}': {}", id, e),
            }
        }
        cli::Commands::DeleteBodyweight { id } => {
            if !confirm(&format!("Delete weight entry '{id}'?"))? {
                println!("Aborted.");
                return Ok(());
            }
            match service.delete_weight_entry(&id) {
                Ok(()) => println!("Successfully deleted weight entry '{id}'."),
                Err(e) => bail!("Error deleting weight entry '{}': {}", id, e),
            }
        }
        cli::Commands::ListBodyweights => {
            let entries = service.list_weight_entries();
            if entries.is_empty() {
                println!("No bodyweight entries found.");
            } else if export_csv {
                print_bodyweight_csv(entries)?;
            } else {
                print_bodyweight_table(entries, header_color(&service));
            }
        }
        cli::Commands::WeightStats => {
            let weeks = service.weekly_bodyweight_averages();
            if weeks.is_empty() {
                println!("No bodyweight entries found.");
            } else {
                print_weekly_table(&weeks, header_color(&service));
            }
        }

        // --- Backup Commands ---
        cli::Commands::Export { output } => {
            let path = output.unwrap_or_else(|| {
                format!("kraftlog_backup_{}.json", Local::now().format("%Y-%m-%d")).into()
            });
            let document = service.export_backup().context("Failed to build backup")?;
            std::fs::write(&path, document)
                .with_context(|| format!("Failed to write backup to {path:?}"))?;
            println!("Exported all collections to {path:?}.");
        }
        cli::Commands::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read backup file {file:?}"))?;
            match service.import_backup(&text) {
                Ok(summary) => {
                    println!(
                        "Import complete: {} workout(s), {} exercise(s), {} template(s), {} weight entr(ies) added.",
                        summary.workouts_added,
                        summary.exercises_added,
                        summary.templates_added,
                        summary.weight_logs_added
                    );
                    if summary.total() == 0 {
                        println!("Everything in the backup was already present.");
                    }
                }
                Err(e) => println!("Import failed: {e}"),
            }
        }

        // --- Coach Commands ---
        cli::Commands::Coach => match service.analyze_progress() {
            Ok(analysis) => println!("{analysis}"),
            Err(e) => println!("{e}"),
        },
        cli::Commands::SetApiKey { key } => match service.set_gemini_api_key(Some(key)) {
            Ok(()) => println!(
                "API key stored. Config file updated: {:?}",
                service.get_config_path()
            ),
            Err(e) => bail!("Error updating config: {}", e),
        },
        cli::Commands::ClearApiKey => match service.set_gemini_api_key(None) {
            Ok(()) => println!("API key removed; the coach is disabled. Config updated."),
            Err(e) => bail!("Error updating config: {}", e),
        },

        // --- Config/Path Commands ---
        cli::Commands::DbPath => {
            println!("Data store is located at: {:?}", service.get_db_path());
        }
        cli::Commands::ConfigPath => {
            println!("Config file is located at: {:?}", service.get_config_path());
        }
    }

    Ok(())
}

// --- CLI Specific Helper Functions ---

fn move_direction(direction: cli::DirectionCli) -> MoveDirection {
    match direction {
        cli::DirectionCli::Up => MoveDirection::Up,
        cli::DirectionCli::Down => MoveDirection::Down,
    }
}

fn zero_based(position: usize) -> Result<usize> {
    position
        .checked_sub(1)
        .ok_or_else(|| anyhow::anyhow!("Positions are 1-based."))
}

fn display_category(category: &str) -> &str {
    if category.trim().is_empty() {
        "Andere"
    } else {
        category
    }
}

fn header_color(service: &AppService) -> Color {
    kraftlog_lib::parse_color(&service.config.theme.header_color)
        .map(Color::from)
        .unwrap_or(Color::Green) // Fallback
}

fn timestamp_for(date: Option<NaiveDate>) -> chrono::DateTime<Utc> {
    match date {
        None => Utc::now(),
        Some(date) if Utc::now().date_naive() == date => Utc::now(),
        Some(date) => {
            // Noon keeps the entry on the requested day in every timezone
            match date.and_hms_opt(12, 0, 0) {
                Some(naive) => Utc.from_utc_datetime(&naive),
                None => Utc::now(),
            }
        }
    }
}

/// Asks for an explicit yes before a destructive action; anything but
/// 'y'/'Y' declines and leaves all state untouched.
fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} (y/N): ");
    stdout().flush()?;
    let mut input = String::new();
    stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn format_set(set: &kraftlog_lib::WorkoutSet, index: usize) -> String {
    let marker = if set.completed { "[x]" } else { "[ ]" };
    let note = set
        .note
        .as_deref()
        .map(|note| format!("  ({note})"))
        .unwrap_or_default();
    format!(
        "  {marker} {}: {:.1} kg x {}  RIR {}{note}",
        index + 1,
        set.weight,
        set.reps,
        set.rir
    )
}

// --- Table Printing Functions (Remain in CLI) ---

fn print_exercise_table(exercises: &[&Exercise], header_color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(header_color),
            Cell::new("Name").fg(header_color),
            Cell::new("Category").fg(header_color),
        ]);

    for exercise in exercises {
        table.add_row(vec![
            Cell::new(&exercise.id),
            Cell::new(&exercise.name),
            Cell::new(display_category(&exercise.category)),
        ]);
    }
    println!("{table}");
}

fn print_template_table(service: &AppService, header_color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(header_color),
            Cell::new("Name").fg(header_color),
            Cell::new("Exercises").fg(header_color),
        ]);

    for template in service.list_templates() {
        let names: Vec<&str> = template
            .exercises
            .iter()
            .map(|id| service.exercise_name(id))
            .collect();
        table.add_row(vec![
            Cell::new(&template.id),
            Cell::new(&template.name),
            Cell::new(names.join(", ")),
        ]);
    }
    println!("{table}");
}

fn print_session(service: &AppService) {
    let Some(session) = service.session() else {
        return;
    };
    let phase = match &session.phase {
        SessionPhase::Preparing => "preparing".to_string(),
        SessionPhase::Active { started_at } => format!(
            "active since {}",
            started_at.with_timezone(&Local).format("%H:%M")
        ),
        SessionPhase::Editing { workout_id, .. } => format!("editing workout {workout_id}"),
    };
    println!("\n--- {} ({phase}) ---", session.name);
    print_session_exercises(service, session);
    println!();
}

fn print_session_exercises(service: &AppService, session: &Session) {
    for (index, entry) in session.exercises.iter().enumerate() {
        println!("{}. {}", index + 1, service.exercise_name(&entry.exercise_id));
        if let Some(previous) = service.last_performance(&entry.exercise_id) {
            if let Some(first) = previous.sets.first() {
                println!("  Last time: {:.1} kg x {}", first.weight, first.reps);
            }
        }
        for (set_index, set) in entry.sets.iter().enumerate() {
            println!("{}", format_set(set, set_index));
        }
    }
}

fn print_history_table(workouts: &[&CompletedWorkout], header_color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(header_color),
            Cell::new("Date (Local)").fg(header_color),
            Cell::new("Name").fg(header_color),
            Cell::new("Duration (min)").fg(header_color),
            Cell::new("Exercises").fg(header_color),
            Cell::new("Sets").fg(header_color),
        ]);

    for workout in workouts {
        let total_sets: usize = workout.exercises.iter().map(|entry| entry.sets.len()).sum();
        table.add_row(vec![
            Cell::new(&workout.id),
            Cell::new(
                workout
                    .date
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string(),
            ),
            Cell::new(&workout.name),
            Cell::new(workout.duration_minutes.to_string()),
            Cell::new(workout.exercises.len().to_string()),
            Cell::new(total_sets.to_string()),
        ]);
    }
    println!("{table}");
}

fn print_history_csv<'a>(workouts: impl Iterator<Item = &'a CompletedWorkout>) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());

    // Write header
    writer.write_record(["ID", "Date", "Name", "Duration_min", "Exercises", "Total_Sets"])?;

    for workout in workouts {
        let total_sets: usize = workout.exercises.iter().map(|entry| entry.sets.len()).sum();
        writer.write_record(&[
            workout.id.clone(),
            workout.date.to_rfc3339(),
            workout.name.clone(),
            workout.duration_minutes.to_string(),
            workout.exercises.len().to_string(),
            total_sets.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn print_workout_details(service: &AppService, workout: &CompletedWorkout) {
    println!(
        "\n--- {} ({}, {} min) ---",
        workout.name,
        workout.date.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
        workout.duration_minutes
    );
    for (index, entry) in workout.exercises.iter().enumerate() {
        println!("{}. {}", index + 1, service.exercise_name(&entry.exercise_id));
        for (set_index, set) in entry.sets.iter().enumerate() {
            println!("{}", format_set(set, set_index));
        }
    }
    println!();
}

fn print_exercise_stats(name: &str, statistics: &kraftlog_lib::ExerciseStatistics) {
    println!("\n--- Statistics for '{name}' ---");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic); // No headers needed for key-value

    table.add_row(vec![
        Cell::new("Total Sets Logged").add_attribute(Attribute::Bold),
        Cell::new(statistics.logged_sets.len()),
    ]);
    table.add_row(vec![
        Cell::new("Training Days").add_attribute(Attribute::Bold),
        Cell::new(statistics.daily_peaks.len()),
    ]);
    table.add_row(vec![
        Cell::new("All-Time Best").add_attribute(Attribute::Bold),
        Cell::new(format!(
            "{:.1} kg x {} ({})",
            statistics.all_time_best.weight,
            statistics.all_time_best.reps,
            statistics.all_time_best.date.format("%Y-%m-%d")
        )),
    ]);
    table.add_row(vec![
        Cell::new("Estimated 1RM").add_attribute(Attribute::Bold),
        Cell::new(format!("{:.1} kg", statistics.estimated_one_rep_max)),
    ]);
    println!("{table}");

    println!("\n--- Daily Peak Sets ---");
    let mut peaks = Table::new();
    peaks
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Date"),
            Cell::new("Weight (kg)"),
            Cell::new("Reps"),
        ]);
    for peak in &statistics.daily_peaks {
        peaks.add_row(vec![
            Cell::new(peak.date.format("%Y-%m-%d").to_string()),
            Cell::new(format!("{:.1}", peak.weight)),
            Cell::new(peak.reps.to_string()),
        ]);
    }
    println!("{peaks}");
}

fn print_activity_table(points: &[kraftlog_lib::ActivityPoint], header_color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Date").fg(header_color),
            Cell::new("Workout").fg(header_color),
            Cell::new("Sets").fg(header_color),
        ]);
    for point in points {
        table.add_row(vec![
            Cell::new(point.date.format("%Y-%m-%d").to_string()),
            Cell::new(&point.name),
            Cell::new(point.total_sets.to_string()),
        ]);
    }
    println!("{table}");
}

fn print_bodyweight_table(entries: &[WeightLogEntry], header_color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(header_color),
            Cell::new("Date (Local)").fg(header_color),
            Cell::new("Weight (kg)").fg(header_color),
        ]);

    for entry in entries {
        table.add_row(vec![
            Cell::new(&entry.id),
            Cell::new(
                entry
                    .date
                    .with_timezone(&Local)
                    .format("%Y-%m-%d")
                    .to_string(),
            ),
            Cell::new(format!("{:.1}", entry.value)),
        ]);
    }
    println!("{table}");
}

fn print_bodyweight_csv(entries: &[WeightLogEntry]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());

    // Write header
    writer.write_record(["ID", "Date", "Weight_kg"])?;

    for entry in entries {
        writer.write_record(&[
            entry.id.clone(),
            entry.date.to_rfc3339(),
            format!("{:.1}", entry.value),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn print_weekly_table(weeks: &[WeeklyAverage], header_color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Week").fg(header_color),
            Cell::new("Avg (kg)").fg(header_color),
            Cell::new("Change (kg)").fg(header_color),
            Cell::new("Change (%)").fg(header_color),
        ]);

    for week in weeks {
        table.add_row(vec![
            Cell::new(format!("{}-W{:02}", week.year, week.week)),
            Cell::new(format!("{:.1}", week.average)),
            Cell::new(
                week.delta
                    .map_or("-".to_string(), |delta| format!("{delta:+.1}")),
            ),
            Cell::new(
                week.delta_pct
                    .map_or("-".to_string(), |pct| format!("{pct:+.1}%")),
            ),
        ]);
    }
    println!("{table}");
}
