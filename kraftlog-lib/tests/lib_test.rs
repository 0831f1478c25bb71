use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use kraftlog_lib::{
    AppService, AppState, CompletedWorkout, Config, MoveDirection, SessionPhase, SetUpdate, Store,
    WorkoutExercise, WorkoutSet,
};
use serde_json::json;

// Helper function to create a test service with an in-memory store
fn create_test_service() -> Result<AppService> {
    let store = Store::open_in_memory()?;
    let state = AppState::load(&store);

    Ok(AppService {
        config: Config::default(),
        store,
        state,
        db_path: ":memory:".into(),
        config_path: "test_config.toml".into(),
    })
}

fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
}

fn set(weight: f64, reps: u32, rir: u32) -> WorkoutSet {
    WorkoutSet {
        weight,
        reps,
        rir,
        completed: true,
        ..WorkoutSet::fresh()
    }
}

fn workout(
    id: &str,
    when: DateTime<Utc>,
    exercise_id: &str,
    sets: Vec<WorkoutSet>,
) -> CompletedWorkout {
    CompletedWorkout {
        id: id.to_string(),
        template_id: None,
        name: format!("Workout {id}"),
        date: when,
        duration_minutes: 45,
        exercises: vec![WorkoutExercise {
            exercise_id: exercise_id.to_string(),
            sets,
        }],
    }
}

fn seed_history(service: &mut AppService, workouts: Vec<CompletedWorkout>) {
    service.state.history = workouts;
}

// --- History ordering ---

#[test]
fn test_history_sorted_descending_after_mutations() -> Result<()> {
    let mut service = create_test_service()?;
    seed_history(
        &mut service,
        vec![
            workout("w1", date(2024, 3, 1), "ex_1", vec![set(50.0, 8, 2)]),
            workout("w3", date(2024, 3, 20), "ex_1", vec![set(55.0, 8, 2)]),
            workout("w2", date(2024, 3, 10), "ex_1", vec![set(52.5, 8, 2)]),
        ],
    );

    let ids: Vec<&str> = service.history().iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids, vec!["w3", "w2", "w1"]);

    // Import an older and a newer workout; rendered order must still hold
    let doc = json!({
        "history": [
            workout("w0", date(2024, 2, 1), "ex_1", vec![set(48.0, 8, 2)]),
            workout("w4", date(2024, 4, 1), "ex_1", vec![set(57.5, 8, 2)]),
        ]
    });
    service.import_backup(&doc.to_string())?;
    let ids: Vec<&str> = service.history().iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids, vec!["w4", "w3", "w2", "w1", "w0"]);

    service.delete_workout("w2")?;
    let ids: Vec<&str> = service.history().iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids, vec!["w4", "w3", "w1", "w0"]);

    Ok(())
}

// --- Weight log ordering ---

#[test]
fn test_weight_logs_sorted_ascending_after_mutations() -> Result<()> {
    let mut service = create_test_service()?;
    service.add_weight_entry(81.0, date(2024, 3, 10))?;
    service.add_weight_entry(80.0, date(2024, 3, 1))?;
    let third = service.add_weight_entry(82.0, date(2024, 3, 20))?;

    let dates: Vec<DateTime<Utc>> = service
        .list_weight_entries()
        .iter()
        .map(|entry| entry.date)
        .collect();
    assert_eq!(
        dates,
        vec![date(2024, 3, 1), date(2024, 3, 10), date(2024, 3, 20)]
    );

    service.update_weight_entry(&third.id, 81.5)?;
    let dates: Vec<DateTime<Utc>> = service
        .list_weight_entries()
        .iter()
        .map(|entry| entry.date)
        .collect();
    assert_eq!(
        dates,
        vec![date(2024, 3, 1), date(2024, 3, 10), date(2024, 3, 20)]
    );

    let doc = json!({
        "weightLogs": [
            { "id": "bw_x", "date": date(2024, 2, 15), "value": 79.5 }
        ]
    });
    service.import_backup(&doc.to_string())?;
    assert_eq!(service.list_weight_entries()[0].id, "bw_x");

    let negative = service.add_weight_entry(-5.0, date(2024, 3, 21));
    assert!(negative.is_err());

    Ok(())
}

// --- Backup codec ---

#[test]
fn test_backup_round_trip_is_noop() -> Result<()> {
    let mut service = create_test_service()?;
    seed_history(
        &mut service,
        vec![workout("w1", date(2024, 3, 1), "ex_1", vec![set(50.0, 8, 2)])],
    );
    service.add_weight_entry(80.0, date(2024, 3, 1))?;

    let exported = service.export_backup()?;
    let before = service.state.clone();
    let summary = service.import_backup(&exported)?;

    assert_eq!(summary.total(), 0);
    assert_eq!(service.state, before);
    Ok(())
}

#[test]
fn test_import_is_idempotent() -> Result<()> {
    let mut service = create_test_service()?;
    let doc = json!({
        "history": [workout("w1", date(2024, 3, 1), "ex_1", vec![set(50.0, 8, 2)])],
        "exercises": [{ "id": "ex_new", "name": "Kabelzug", "category": "Rücken" }],
        "templates": [{ "id": "tpl_new", "name": "Pull", "exercises": ["ex_new"] }],
        "weightLogs": [{ "id": "bw_1", "date": date(2024, 3, 1), "value": 80.0 }],
    })
    .to_string();

    let first = service.import_backup(&doc)?;
    assert_eq!(first.workouts_added, 1);
    assert_eq!(first.exercises_added, 1);
    assert_eq!(first.templates_added, 1);
    assert_eq!(first.weight_logs_added, 1);

    let after_first = service.state.clone();
    let second = service.import_backup(&doc)?;
    assert_eq!(second.total(), 0);
    assert_eq!(service.state, after_first);
    Ok(())
}

#[test]
fn test_import_skips_malformed_collection() -> Result<()> {
    let mut service = create_test_service()?;
    let exercises_before = service.state.exercises.clone();

    let doc = json!({
        "exercises": "this is not an array",
        "weightLogs": [{ "id": "bw_1", "date": date(2024, 3, 1), "value": 80.0 }],
    })
    .to_string();
    let summary = service.import_backup(&doc)?;

    assert_eq!(summary.exercises_added, 0);
    assert_eq!(summary.weight_logs_added, 1);
    assert_eq!(service.state.exercises, exercises_before);

    // Non-object roots are rejected outright
    assert!(service.import_backup("[1, 2, 3]").is_err());
    assert!(service.import_backup("not json at all").is_err());
    Ok(())
}

// --- Statistics ---

#[test]
fn test_peak_set_selection_rule() -> Result<()> {
    let mut service = create_test_service()?;
    seed_history(
        &mut service,
        vec![workout(
            "w1",
            date(2024, 3, 1),
            "ex_1",
            vec![set(80.0, 8, 2), set(85.0, 6, 1), set(85.0, 8, 1)],
        )],
    );

    let statistics = service.exercise_statistics("ex_1").expect("stats");
    assert_eq!(statistics.daily_peaks.len(), 1);
    assert_eq!(statistics.daily_peaks[0].weight, 85.0);
    assert_eq!(statistics.daily_peaks[0].reps, 8);
    assert_eq!(statistics.all_time_best.weight, 85.0);
    assert_eq!(statistics.all_time_best.reps, 8);
    Ok(())
}

#[test]
fn test_all_time_best_across_dates() -> Result<()> {
    let mut service = create_test_service()?;
    seed_history(
        &mut service,
        vec![
            workout("w1", date(2024, 3, 1), "ex_1", vec![set(100.0, 3, 1)]),
            workout("w2", date(2024, 3, 8), "ex_1", vec![set(100.0, 5, 1)]),
            workout("w3", date(2024, 3, 15), "ex_1", vec![set(95.0, 10, 0)]),
        ],
    );

    let statistics = service.exercise_statistics("ex_1").expect("stats");
    assert_eq!(statistics.daily_peaks.len(), 3);
    // Equal weight on two dates: the higher-rep peak wins
    assert_eq!(statistics.all_time_best.date, date(2024, 3, 8).date_naive());
    assert_eq!(statistics.all_time_best.reps, 5);
    Ok(())
}

#[test]
fn test_estimated_one_rep_max_formula() -> Result<()> {
    let mut service = create_test_service()?;
    seed_history(
        &mut service,
        vec![workout("w1", date(2024, 3, 1), "ex_1", vec![set(100.0, 5, 1)])],
    );

    let statistics = service.exercise_statistics("ex_1").expect("stats");
    let expected = 100.0 * (1.0 + 5.0 / 30.0);
    assert!((statistics.estimated_one_rep_max - expected).abs() < 1e-9);
    assert_eq!(format!("{:.1}", statistics.estimated_one_rep_max), "116.7");
    Ok(())
}

#[test]
fn test_no_data_yields_none_not_zero() -> Result<()> {
    let service = create_test_service()?;
    assert!(service.exercise_statistics("ex_1").is_none());
    assert!(service.exercise_statistics("no_such_id").is_none());
    Ok(())
}

#[test]
fn test_weekly_bodyweight_deltas() -> Result<()> {
    let mut service = create_test_service()?;
    // ISO week 10 of 2024: Mon 2024-03-04 .. Sun 2024-03-10
    service.add_weight_entry(79.5, date(2024, 3, 4))?;
    service.add_weight_entry(80.5, date(2024, 3, 7))?;
    // ISO week 11: Mon 2024-03-11 .. Sun 2024-03-17
    service.add_weight_entry(81.0, date(2024, 3, 11))?;
    service.add_weight_entry(82.0, date(2024, 3, 14))?;

    let weeks = service.weekly_bodyweight_averages();
    assert_eq!(weeks.len(), 2);

    // Most recent week first
    assert_eq!((weeks[0].year, weeks[0].week), (2024, 11));
    assert!((weeks[0].average - 81.5).abs() < 1e-9);
    let delta = weeks[0].delta.expect("delta");
    let delta_pct = weeks[0].delta_pct.expect("delta pct");
    assert!((delta - 1.5).abs() < 1e-9);
    assert!((delta_pct - 1.875).abs() < 1e-9);

    // Oldest week in range has no delta
    assert_eq!((weeks[1].year, weeks[1].week), (2024, 10));
    assert!(weeks[1].delta.is_none());
    assert!(weeks[1].delta_pct.is_none());
    Ok(())
}

#[test]
fn test_iso_week_numbering_at_year_boundary() -> Result<()> {
    let mut service = create_test_service()?;
    // 2025-12-29 (Mon) through 2026-01-04 (Sun) are all ISO week 1 of 2026
    service.add_weight_entry(80.0, date(2025, 12, 30))?;
    service.add_weight_entry(81.0, date(2026, 1, 2))?;

    let weeks = service.weekly_bodyweight_averages();
    assert_eq!(weeks.len(), 1);
    assert_eq!((weeks[0].year, weeks[0].week), (2026, 1));
    assert!((weeks[0].average - 80.5).abs() < 1e-9);
    Ok(())
}

// --- Session builder & reconciliation ---

fn three_exercise_template(service: &mut AppService) -> Result<(String, Vec<String>)> {
    let a = service.create_exercise("Exercise A", "Push")?;
    let b = service.create_exercise("Exercise B", "Push")?;
    let c = service.create_exercise("Exercise C", "Push")?;
    let ids = vec![a.id, b.id, c.id];
    let template = service.create_template("Push", ids.clone())?;
    Ok((template.id, ids))
}

#[test]
fn test_start_session_mirrors_template_order() -> Result<()> {
    let mut service = create_test_service()?;
    let (template_id, ids) = three_exercise_template(&mut service)?;

    service.start_session(&template_id)?;
    let session = service.session().expect("session");
    let order: Vec<&str> = session
        .exercises
        .iter()
        .map(|entry| entry.exercise_id.as_str())
        .collect();
    assert_eq!(order, ids.iter().map(String::as_str).collect::<Vec<_>>());
    assert!(matches!(session.phase, SessionPhase::Preparing));
    for entry in &session.exercises {
        assert_eq!(entry.sets.len(), 1);
        assert!(entry.sets[0].is_blank());
    }
    Ok(())
}

#[test]
fn test_preparation_reorder_writes_back_to_template() -> Result<()> {
    let mut service = create_test_service()?;
    let (template_id, ids) = three_exercise_template(&mut service)?;

    service.start_session(&template_id)?;
    // Move B above A while still preparing
    service.session_move_exercise(1, MoveDirection::Up)?;

    let template = service
        .list_templates()
        .iter()
        .find(|template| template.id == template_id)
        .expect("template")
        .clone();
    assert_eq!(
        template.exercises,
        vec![ids[1].clone(), ids[0].clone(), ids[2].clone()]
    );
    Ok(())
}

#[test]
fn test_active_reorder_leaves_template_unchanged() -> Result<()> {
    let mut service = create_test_service()?;
    let (template_id, ids) = three_exercise_template(&mut service)?;

    service.start_session(&template_id)?;
    service.begin_session()?;
    // The identical reorder after the start must not write back
    service.session_move_exercise(1, MoveDirection::Up)?;

    let template = service
        .list_templates()
        .iter()
        .find(|template| template.id == template_id)
        .expect("template");
    assert_eq!(template.exercises, ids);

    let session = service.session().expect("session");
    assert_eq!(session.exercises[0].exercise_id, ids[1]);
    Ok(())
}

#[test]
fn test_boundary_moves_are_noops() -> Result<()> {
    let mut service = create_test_service()?;
    let (template_id, ids) = three_exercise_template(&mut service)?;

    service.start_session(&template_id)?;
    service.session_move_exercise(0, MoveDirection::Up)?;
    service.session_move_exercise(2, MoveDirection::Down)?;

    let session = service.session().expect("session");
    let order: Vec<&str> = session
        .exercises
        .iter()
        .map(|entry| entry.exercise_id.as_str())
        .collect();
    assert_eq!(order, ids.iter().map(String::as_str).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn test_preparation_add_and_remove_write_back() -> Result<()> {
    let mut service = create_test_service()?;
    let (template_id, ids) = three_exercise_template(&mut service)?;
    let extra = service.create_exercise("Exercise D", "Pull")?;

    service.start_session(&template_id)?;
    service.session_add_exercise(&extra.id)?;
    service.session_remove_exercise(0)?;

    let template = service
        .list_templates()
        .iter()
        .find(|template| template.id == template_id)
        .expect("template");
    assert_eq!(
        template.exercises,
        vec![ids[1].clone(), ids[2].clone(), extra.id.clone()]
    );
    Ok(())
}

#[test]
fn test_session_add_new_exercise_registers_definition() -> Result<()> {
    let mut service = create_test_service()?;
    let (template_id, _) = three_exercise_template(&mut service)?;

    service.start_session(&template_id)?;
    let created = service.session_add_new_exercise("Kabelzug", "Rücken")?;

    assert!(service
        .list_exercises()
        .iter()
        .any(|exercise| exercise.id == created.id));
    let template = service
        .list_templates()
        .iter()
        .find(|template| template.id == template_id)
        .expect("template");
    assert_eq!(template.exercises.last(), Some(&created.id));
    Ok(())
}

#[test]
fn test_at_most_one_session() -> Result<()> {
    let mut service = create_test_service()?;
    let (template_id, _) = three_exercise_template(&mut service)?;

    service.start_session(&template_id)?;
    assert!(service.start_session(&template_id).is_err());

    service.begin_session()?;
    assert!(service.begin_session().is_err());
    Ok(())
}

#[test]
fn test_set_logging_requires_started_session() -> Result<()> {
    let mut service = create_test_service()?;
    let (template_id, _) = three_exercise_template(&mut service)?;

    service.start_session(&template_id)?;
    let update = SetUpdate {
        weight: Some(50.0),
        ..Default::default()
    };
    assert!(service.update_set(0, 0, update.clone()).is_err());
    assert!(service.add_set(0).is_err());

    service.begin_session()?;
    service.update_set(0, 0, update)?;
    let session = service.session().expect("session");
    assert_eq!(session.exercises[0].sets[0].weight, 50.0);
    Ok(())
}

#[test]
fn test_finish_requires_started_session() -> Result<()> {
    let mut service = create_test_service()?;
    let (template_id, _) = three_exercise_template(&mut service)?;

    service.start_session(&template_id)?;
    assert!(service.finish_session().is_err());
    // The preparing session survives the failed finish
    assert!(service.session().is_some());
    Ok(())
}

#[test]
fn test_finish_filters_blank_exercises() -> Result<()> {
    let mut service = create_test_service()?;
    let x = service.create_exercise("Exercise X", "Push")?;
    let y = service.create_exercise("Exercise Y", "Push")?;
    let template = service.create_template("Push", vec![x.id.clone(), y.id.clone()])?;

    service.start_session(&template.id)?;
    service.begin_session()?;
    service.update_set(
        1,
        0,
        SetUpdate {
            weight: Some(60.0),
            reps: Some(5),
            completed: Some(true),
            ..Default::default()
        },
    )?;

    let workout = service.finish_session()?;
    assert_eq!(workout.exercises.len(), 1);
    assert_eq!(workout.exercises[0].exercise_id, y.id);

    // Finishing appended to the history and cleared the session
    assert_eq!(service.history().len(), 1);
    assert!(service.session().is_none());
    Ok(())
}

#[test]
fn test_completed_zero_set_survives_finish() -> Result<()> {
    let mut service = create_test_service()?;
    let x = service.create_exercise("Exercise X", "Push")?;
    let template = service.create_template("Push", vec![x.id.clone()])?;

    service.start_session(&template.id)?;
    service.begin_session()?;
    // Completed but still zeroed (no prior history to auto-fill from)
    service.update_set(
        0,
        0,
        SetUpdate {
            completed: Some(true),
            ..Default::default()
        },
    )?;

    let workout = service.finish_session()?;
    assert_eq!(workout.exercises.len(), 1);
    Ok(())
}

#[test]
fn test_abort_clears_session_without_workout() -> Result<()> {
    let mut service = create_test_service()?;
    let (template_id, _) = three_exercise_template(&mut service)?;

    service.start_session(&template_id)?;
    service.begin_session()?;
    service.abort_session()?;

    assert!(service.session().is_none());
    assert!(service.history().is_empty());
    // The store no longer holds a session either
    let reloaded = AppState::load(&service.store);
    assert!(reloaded.session.is_none());
    Ok(())
}

#[test]
fn test_session_resumes_from_store() -> Result<()> {
    let mut service = create_test_service()?;
    let (template_id, _) = three_exercise_template(&mut service)?;

    service.start_session(&template_id)?;
    service.begin_session()?;
    service.update_set(
        0,
        0,
        SetUpdate {
            weight: Some(42.5),
            reps: Some(8),
            ..Default::default()
        },
    )?;

    let reloaded = AppState::load(&service.store);
    let session = reloaded.session.expect("resumed session");
    assert_eq!(session.exercises[0].sets[0].weight, 42.5);
    assert!(matches!(session.phase, SessionPhase::Active { .. }));
    Ok(())
}

// --- Auto-fill & progression lookup ---

#[test]
fn test_last_performance_finds_most_recent_entry() -> Result<()> {
    let mut service = create_test_service()?;
    seed_history(
        &mut service,
        vec![
            workout("w1", date(2024, 3, 1), "ex_1", vec![set(40.0, 8, 2)]),
            workout("w2", date(2024, 3, 8), "ex_1", vec![set(42.5, 8, 2)]),
        ],
    );

    let last = service.last_performance("ex_1").expect("entry");
    assert_eq!(last.sets[0].weight, 42.5);
    assert!(service.last_performance("ex_unknown").is_none());
    Ok(())
}

#[test]
fn test_completing_zeroed_set_autofills_from_last_session() -> Result<()> {
    let mut service = create_test_service()?;
    let e = service.create_exercise("Brustdrückmaschine", "Chest")?;
    let template = service.create_template("Push", vec![e.id.clone()])?;
    seed_history(
        &mut service,
        vec![workout(
            "w1",
            date(2024, 3, 1),
            &e.id,
            vec![set(42.5, 8, 2)],
        )],
    );

    service.start_session(&template.id)?;
    service.begin_session()?;
    service.update_set(
        0,
        0,
        SetUpdate {
            completed: Some(true),
            ..Default::default()
        },
    )?;

    let current = &service.session().expect("session").exercises[0].sets[0];
    assert_eq!(current.weight, 42.5);
    assert_eq!(current.reps, 8);
    assert_eq!(current.rir, 2);
    assert!(current.completed);
    Ok(())
}

#[test]
fn test_completing_nonzero_set_keeps_entered_values() -> Result<()> {
    let mut service = create_test_service()?;
    let e = service.create_exercise("Brustdrückmaschine", "Chest")?;
    let template = service.create_template("Push", vec![e.id.clone()])?;
    seed_history(
        &mut service,
        vec![workout(
            "w1",
            date(2024, 3, 1),
            &e.id,
            vec![set(42.5, 8, 2)],
        )],
    );

    service.start_session(&template.id)?;
    service.begin_session()?;
    service.update_set(
        0,
        0,
        SetUpdate {
            weight: Some(45.0),
            reps: Some(6),
            completed: Some(true),
            ..Default::default()
        },
    )?;

    let current = &service.session().expect("session").exercises[0].sets[0];
    assert_eq!(current.weight, 45.0);
    assert_eq!(current.reps, 6);
    Ok(())
}

#[test]
fn test_add_set_clones_previous_weight_and_reps() -> Result<()> {
    let mut service = create_test_service()?;
    let (template_id, _) = three_exercise_template(&mut service)?;

    service.start_session(&template_id)?;
    service.begin_session()?;
    service.update_set(
        0,
        0,
        SetUpdate {
            weight: Some(60.0),
            reps: Some(5),
            rir: Some(2),
            completed: Some(true),
            ..Default::default()
        },
    )?;
    service.add_set(0)?;

    let sets = &service.session().expect("session").exercises[0].sets;
    assert_eq!(sets.len(), 2);
    assert_eq!(sets[1].weight, 60.0);
    assert_eq!(sets[1].reps, 5);
    assert_eq!(sets[1].rir, 0);
    assert!(!sets[1].completed);
    assert_ne!(sets[0].id, sets[1].id);
    Ok(())
}

// --- Editing completed workouts ---

#[test]
fn test_edit_workout_preserves_id_and_date() -> Result<()> {
    let mut service = create_test_service()?;
    let original_date = date(2024, 3, 1);
    seed_history(
        &mut service,
        vec![
            workout("w1", original_date, "ex_1", vec![set(40.0, 8, 2)]),
            workout("w2", date(2024, 3, 8), "ex_2", vec![set(30.0, 12, 1)]),
        ],
    );

    service.edit_workout("w1")?;
    let session = service.session().expect("session");
    assert!(matches!(session.phase, SessionPhase::Editing { .. }));
    // All sets re-enter pre-marked completed
    assert!(session.exercises[0].sets.iter().all(|set| set.completed));

    service.update_set(
        0,
        0,
        SetUpdate {
            weight: Some(41.0),
            ..Default::default()
        },
    )?;
    let finished = service.finish_session()?;

    assert_eq!(finished.id, "w1");
    assert_eq!(finished.date, original_date);
    assert_eq!(finished.duration_minutes, 45);

    // Replaced in place: still two workouts, content updated
    assert_eq!(service.history().len(), 2);
    let stored = service.get_workout("w1").expect("stored");
    assert_eq!(stored.exercises[0].sets[0].weight, 41.0);
    Ok(())
}

#[test]
fn test_edit_workout_never_writes_back_to_template() -> Result<()> {
    let mut service = create_test_service()?;
    let (template_id, ids) = three_exercise_template(&mut service)?;
    seed_history(
        &mut service,
        vec![CompletedWorkout {
            id: "w1".to_string(),
            template_id: Some(template_id.clone()),
            name: "Push".to_string(),
            date: date(2024, 3, 1),
            duration_minutes: 40,
            exercises: vec![
                WorkoutExercise {
                    exercise_id: ids[0].clone(),
                    sets: vec![set(40.0, 8, 2)],
                },
                WorkoutExercise {
                    exercise_id: ids[1].clone(),
                    sets: vec![set(30.0, 10, 1)],
                },
            ],
        }],
    );

    service.edit_workout("w1")?;
    service.session_move_exercise(1, MoveDirection::Up)?;

    let template = service
        .list_templates()
        .iter()
        .find(|template| template.id == template_id)
        .expect("template");
    assert_eq!(template.exercises, ids);
    Ok(())
}

// --- Exercise deletion / display fallback ---

#[test]
fn test_delete_exercise_keeps_history_rows() -> Result<()> {
    let mut service = create_test_service()?;
    let e = service.create_exercise("Beinstrecker", "Legs")?;
    seed_history(
        &mut service,
        vec![workout(
            "w1",
            date(2024, 3, 1),
            &e.id,
            vec![set(70.0, 10, 1)],
        )],
    );

    assert_eq!(service.exercise_name(&e.id), "Beinstrecker");
    service.delete_exercise(&e.id)?;

    let history = service.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].exercises[0].exercise_id, e.id);
    // Display degrades to the raw id
    assert_eq!(service.exercise_name(&e.id), e.id);
    // And statistics still work off the orphaned rows
    assert!(service.exercise_statistics(&e.id).is_some());
    Ok(())
}

// --- Storage fallback & normalization ---

#[test]
fn test_corrupt_collection_falls_back_to_defaults() -> Result<()> {
    let store = Store::open_in_memory()?;
    // Valid JSON, wrong shape: treated as absence
    store.save("exercises", "definitely not a collection")?;
    store.save("history", &42)?;

    let state = AppState::load(&store);
    assert_eq!(state.exercises, kraftlog_lib::model::default_exercises());
    assert!(state.history.is_empty());
    assert!(state.session.is_none());
    Ok(())
}

#[test]
fn test_fresh_store_gets_default_library() -> Result<()> {
    let service = create_test_service()?;
    assert_eq!(service.list_exercises().len(), 7);
    assert_eq!(service.list_templates().len(), 1);
    assert_eq!(service.list_templates()[0].exercises.len(), 7);
    Ok(())
}

#[test]
fn test_legacy_rpe_field_normalizes_to_rir() -> Result<()> {
    let raw = r#"{ "id": "s1", "weight": 40.0, "reps": 8, "rpe": 3, "completed": true }"#;
    let set: WorkoutSet = serde_json::from_str(raw)?;
    assert_eq!(set.rir, 3);

    let serialized = serde_json::to_string(&set)?;
    assert!(serialized.contains("\"rir\":3"));
    assert!(!serialized.contains("rpe"));
    Ok(())
}

#[test]
fn test_collections_persist_across_reload() -> Result<()> {
    let mut service = create_test_service()?;
    let e = service.create_exercise("Rudern", "Rücken")?;
    service.create_template("Pull", vec![e.id.clone()])?;
    service.add_weight_entry(80.0, date(2024, 3, 1))?;

    let reloaded = AppState::load(&service.store);
    assert!(reloaded.exercises.iter().any(|ex| ex.id == e.id));
    assert!(reloaded
        .templates
        .iter()
        .any(|template| template.name == "Pull"));
    assert_eq!(reloaded.weight_logs.len(), 1);
    Ok(())
}
