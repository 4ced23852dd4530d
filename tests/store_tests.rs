use chrono::NaiveDate;

use slptrack::db::{Database, MemoryKv, SqliteKv, StoreError};
use slptrack::models::{
    AppSettings, Client, CueLevel, Goal, GoalCategory, GoalStatus, TrialResponse,
};
use slptrack::state::AppContext;
use slptrack::utils::logging::init_logging;

fn memory_db() -> Database {
    init_logging();
    Database::with_medium(MemoryKv::new()).expect("store worker")
}

fn client(first_name: &str) -> Client {
    let dob = NaiveDate::from_ymd_opt(2017, 5, 20).unwrap();
    Client::new(first_name, "Tran", dob).unwrap()
}

fn goal_for(client_id: &str, target_accuracy: u8) -> Goal {
    Goal::new(
        client_id,
        "Produce /s/ blends in sentences",
        "Given a picture prompt",
        GoalCategory::Articulation,
        target_accuracy,
    )
    .unwrap()
}

#[tokio::test]
async fn save_is_idempotent_on_id() {
    let db = memory_db();
    let mut record = client("Ada");

    db.save_client(&record).await.unwrap();
    record.notes = Some("prefers morning sessions".into());
    db.save_client(&record).await.unwrap();

    let clients = db.get_clients().await.unwrap();
    assert_eq!(clients.len(), 1);
    assert_eq!(
        clients[0].notes.as_deref(),
        Some("prefers morning sessions")
    );
}

#[tokio::test]
async fn save_stamps_updated_at() {
    let db = memory_db();
    let record = client("Ada");
    let before = record.updated_at;

    let saved = db.save_client(&record).await.unwrap();
    assert!(saved.updated_at >= before);
    assert_eq!(saved.created_at, record.created_at);
}

#[tokio::test]
async fn deleting_a_client_cascades_to_goals_and_sessions() {
    let db = memory_db();
    let keep = client("Keep");
    let removed = client("Drop");
    db.save_client(&keep).await.unwrap();
    db.save_client(&removed).await.unwrap();

    for owner in [&keep, &removed] {
        db.save_goal(&goal_for(&owner.id, 80)).await.unwrap();
        let session = slptrack::models::Session::new(
            owner.id.clone(),
            chrono::Utc::now(),
            30,
            vec![],
        )
        .unwrap();
        db.save_session(&session).await.unwrap();
    }

    db.delete_client(&removed.id).await.unwrap();

    let clients = db.get_clients().await.unwrap();
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0].id, keep.id);

    let goals = db.get_goals().await.unwrap();
    assert!(goals.iter().all(|g| g.client_id == keep.id));
    assert_eq!(goals.len(), 1);

    let sessions = db.get_sessions().await.unwrap();
    assert!(sessions.iter().all(|s| s.client_id == keep.id));
    assert_eq!(sessions.len(), 1);
}

#[tokio::test]
async fn active_goal_filter_excludes_discontinued() {
    let db = memory_db();
    let owner = client("Nora");
    db.save_client(&owner).await.unwrap();

    let active = goal_for(&owner.id, 80);
    let mut discontinued = goal_for(&owner.id, 70);
    discontinued.discontinue();
    db.save_goal(&active).await.unwrap();
    db.save_goal(&discontinued).await.unwrap();

    let goals = db.get_active_goals_for_client(&owner.id).await.unwrap();
    assert_eq!(goals.len(), 1);
    assert_eq!(goals[0].id, active.id);
}

#[tokio::test]
async fn sessions_for_client_come_back_newest_first() {
    let db = memory_db();
    let owner = client("Theo");
    db.save_client(&owner).await.unwrap();

    let now = chrono::Utc::now();
    for days_ago in [3i64, 1, 2] {
        let session = slptrack::models::Session::new(
            owner.id.clone(),
            now - chrono::Duration::days(days_ago),
            30,
            vec![],
        )
        .unwrap();
        db.save_session(&session).await.unwrap();
    }

    let sessions = db.get_sessions_for_client(&owner.id).await.unwrap();
    let dates: Vec<_> = sessions.iter().map(|s| s.date).collect();
    let mut sorted = dates.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(dates, sorted);
}

#[tokio::test]
async fn settings_default_clamp_and_reset() {
    let db = memory_db();

    // Nothing persisted yet: the hard-coded default applies.
    assert_eq!(db.get_settings().await.unwrap(), AppSettings::default());

    let saved = db
        .save_settings(&AppSettings {
            default_session_duration: 600,
            default_target_accuracy: 0,
            ..AppSettings::default()
        })
        .await
        .unwrap();
    assert_eq!(saved.default_session_duration, 120);
    assert_eq!(saved.default_target_accuracy, 1);
    assert_eq!(db.get_settings().await.unwrap(), saved);

    db.reset_settings().await.unwrap();
    assert_eq!(db.get_settings().await.unwrap(), AppSettings::default());
}

#[tokio::test]
async fn backup_round_trips_all_four_collections() {
    let source = memory_db();
    let owner = client("Rosa");
    source.save_client(&owner).await.unwrap();
    source.save_goal(&goal_for(&owner.id, 90)).await.unwrap();
    let session =
        slptrack::models::Session::new(owner.id.clone(), chrono::Utc::now(), 45, vec![]).unwrap();
    source.save_session(&session).await.unwrap();
    source
        .save_settings(&AppSettings {
            default_session_duration: 60,
            ..AppSettings::default()
        })
        .await
        .unwrap();

    let backup = source.export_all().await.unwrap();

    let target = memory_db();
    target.import_all(&backup).await.unwrap();

    assert_eq!(
        target.get_clients().await.unwrap(),
        source.get_clients().await.unwrap()
    );
    assert_eq!(
        target.get_goals().await.unwrap(),
        source.get_goals().await.unwrap()
    );
    assert_eq!(
        target.get_sessions().await.unwrap(),
        source.get_sessions().await.unwrap()
    );
    assert_eq!(
        target.get_settings().await.unwrap(),
        source.get_settings().await.unwrap()
    );
}

#[tokio::test]
async fn import_skips_collections_missing_from_the_document() {
    let db = memory_db();
    let owner = client("Iris");
    db.save_client(&owner).await.unwrap();
    let existing_goal = goal_for(&owner.id, 80);
    db.save_goal(&existing_goal).await.unwrap();

    // A backup written before any goals existed: no "goals" key at all.
    let replacement = client("Maya");
    let document = serde_json::json!({
        "exportDate": chrono::Utc::now(),
        "clients": [replacement],
        "sessions": [],
        "settings": AppSettings::default(),
    });
    db.import_all(&document.to_string()).await.unwrap();

    let clients = db.get_clients().await.unwrap();
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0].first_name, "Maya");

    // Goals were untouched while everything else was overwritten.
    let goals = db.get_goals().await.unwrap();
    assert_eq!(goals.len(), 1);
    assert_eq!(goals[0].id, existing_goal.id);
    assert!(db.get_sessions().await.unwrap().is_empty());
}

#[tokio::test]
async fn import_rejects_non_json_without_touching_the_store() {
    let db = memory_db();
    let owner = client("Zoe");
    db.save_client(&owner).await.unwrap();

    let err = db.import_all("definitely not json").await.unwrap_err();
    assert!(matches!(err, StoreError::ImportFormat(_)));
    assert_eq!(db.get_clients().await.unwrap().len(), 1);
}

#[tokio::test]
async fn clear_all_empties_every_collection() {
    let db = memory_db();
    let owner = client("Kai");
    db.save_client(&owner).await.unwrap();
    db.save_goal(&goal_for(&owner.id, 80)).await.unwrap();

    db.clear_all().await.unwrap();

    assert!(db.get_clients().await.unwrap().is_empty());
    assert!(db.get_goals().await.unwrap().is_empty());
    assert!(db.get_sessions().await.unwrap().is_empty());
    assert_eq!(db.get_settings().await.unwrap(), AppSettings::default());
}

#[tokio::test]
async fn sqlite_medium_behaves_like_memory() {
    init_logging();
    let db = Database::with_medium(SqliteKv::open_in_memory().unwrap()).unwrap();

    let owner = client("Sam");
    db.save_client(&owner).await.unwrap();
    db.save_client(&owner).await.unwrap();
    assert_eq!(db.get_clients().await.unwrap().len(), 1);

    db.delete_client(&owner.id).await.unwrap();
    assert!(db.get_clients().await.unwrap().is_empty());
}

// --- facade ---------------------------------------------------------------

#[tokio::test]
async fn recording_a_session_blends_accuracy_and_achieves_goals() {
    let db = memory_db();
    let owner = client("Lena");
    db.save_client(&owner).await.unwrap();
    let mut goal = goal_for(&owner.id, 80);
    goal.current_accuracy = 60;
    db.save_goal(&goal).await.unwrap();

    let context = AppContext::load(db).await.unwrap();

    let mut recorder = context.begin_session(owner.id.clone(), vec![goal.id.clone()]).await;
    for _ in 0..4 {
        recorder
            .add_trial(&goal.id, None, TrialResponse::Correct, CueLevel::Independent, None)
            .unwrap();
    }
    let session = recorder.finish().unwrap();

    let updated = context.record_session(session.clone()).await.unwrap();
    assert_eq!(updated.len(), 1);
    // round((60 + 100) / 2) = 80, which reaches the target.
    assert_eq!(updated[0].current_accuracy, 80);
    assert_eq!(updated[0].status, GoalStatus::Achieved);

    // The mirror saw both the session and the goal update.
    let mirrored = context.goal(&goal.id).await.unwrap();
    assert_eq!(mirrored.status, GoalStatus::Achieved);
    assert_eq!(context.sessions_for_client(&owner.id).await.len(), 1);
    assert_eq!(context.session(&session.id).await.unwrap().trials.len(), 4);
}

#[tokio::test]
async fn goals_without_trials_keep_their_accuracy() {
    let db = memory_db();
    let owner = client("Omar");
    db.save_client(&owner).await.unwrap();
    let drilled = goal_for(&owner.id, 90);
    let mut idle = goal_for(&owner.id, 90);
    idle.current_accuracy = 70;
    db.save_goal(&drilled).await.unwrap();
    db.save_goal(&idle).await.unwrap();

    let context = AppContext::load(db).await.unwrap();
    let mut recorder = context
        .begin_session(owner.id.clone(), vec![drilled.id.clone(), idle.id.clone()])
        .await;
    recorder
        .add_trial(&drilled.id, None, TrialResponse::Correct, CueLevel::Model, None)
        .unwrap();
    let session = recorder.finish().unwrap();

    let updated = context.record_session(session).await.unwrap();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].id, drilled.id);
    assert_eq!(context.goal(&idle.id).await.unwrap().current_accuracy, 70);
}

#[tokio::test]
async fn facade_delete_client_prunes_the_mirror() {
    let db = memory_db();
    let owner = client("Pia");
    db.save_client(&owner).await.unwrap();
    db.save_goal(&goal_for(&owner.id, 80)).await.unwrap();

    let context = AppContext::load(db).await.unwrap();
    assert_eq!(context.clients().await.len(), 1);

    context.delete_client(&owner.id).await.unwrap();
    assert!(context.clients().await.is_empty());
    assert!(context.goals_for_client(&owner.id).await.is_empty());
}

#[tokio::test]
async fn load_reconciles_orphans_left_by_an_interrupted_cascade() {
    let db = memory_db();
    let owner = client("Eli");
    db.save_client(&owner).await.unwrap();
    db.save_goal(&goal_for(&owner.id, 80)).await.unwrap();

    // Simulate a cascade delete that crashed after the clients write:
    // goals and sessions still reference a client id that no longer exists.
    db.save_goal(&goal_for("gone-client", 80)).await.unwrap();
    let orphan_session =
        slptrack::models::Session::new("gone-client", chrono::Utc::now(), 30, vec![]).unwrap();
    db.save_session(&orphan_session).await.unwrap();

    let context = AppContext::load(db).await.unwrap();

    assert_eq!(context.goals_for_client(&owner.id).await.len(), 1);
    assert!(context.goals_for_client("gone-client").await.is_empty());
    assert!(context.sessions_for_client("gone-client").await.is_empty());
}

#[tokio::test]
async fn import_backup_refreshes_the_mirror() {
    let source = memory_db();
    let owner = client("Noa");
    source.save_client(&owner).await.unwrap();
    let backup = source.export_all().await.unwrap();

    let context = AppContext::load(memory_db()).await.unwrap();
    assert!(context.clients().await.is_empty());

    context.import_backup(&backup).await.unwrap();
    assert_eq!(context.clients().await.len(), 1);
    assert_eq!(context.clients().await[0].id, owner.id);
}
