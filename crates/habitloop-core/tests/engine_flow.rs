//! End-to-end engine flow over a real (file-backed) local store:
//! create habits, toggle completions, observe streaks, progress, and
//! cross-device pushes.

use std::sync::Arc;

use chrono::{Duration, Local};
use habitloop_core::{
    HabitDraft, HabitPatch, HabitStore, HeatmapPalette, LocalStore, LogSink, Reminder, Schedule,
    Session, SessionConfig, UserId,
};

fn draft(title: &str, schedule: Schedule) -> HabitDraft {
    HabitDraft {
        title: title.to_string(),
        description: String::new(),
        schedule,
        reminder: Reminder::off(),
    }
}

async fn file_backed_session(dir: &tempfile::TempDir) -> (Session, Arc<LocalStore>) {
    let store = Arc::new(LocalStore::open_at(&dir.path().join("habits.db")).unwrap());
    let mut session = Session::new(
        UserId::new("u1"),
        store.clone(),
        Arc::new(LogSink),
        SessionConfig {
            palette: HeatmapPalette::default(),
            notifications_enabled: false,
        },
    );
    session.start().await.unwrap();
    (session, store)
}

#[tokio::test]
async fn daily_habit_builds_a_streak_across_toggles() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _store) = file_backed_session(&dir).await;

    let id = session.create(draft("Read", Schedule::Daily)).await.unwrap();
    let today = Local::now().date_naive();
    for i in 1..=5 {
        session.toggle(id, today - Duration::days(i)).await.unwrap();
    }

    // Today unmarked: the run through yesterday stands.
    assert_eq!(session.streak(id), Some(5));
    session.toggle_today(id).await.unwrap();
    assert_eq!(session.streak(id), Some(6));
    assert_eq!(session.total_completions(id), Some(6));
    assert_eq!(session.today_percent(), 100);
}

#[tokio::test]
async fn heatmap_reflects_persisted_completions() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _store) = file_backed_session(&dir).await;

    let id = session.create(draft("Read", Schedule::Daily)).await.unwrap();
    let today = Local::now().date_naive();
    session.toggle(id, today).await.unwrap();

    use chrono::Datelike;
    let grid = session.month_grid(today.year(), today.month());
    assert_eq!(grid.len() % 7, 0);
    let cell = grid.iter().find(|c| c.date == today).unwrap();
    assert!(cell.in_month);
    assert_eq!(cell.ratio, 1.0);
}

#[tokio::test]
async fn another_device_push_replaces_the_view() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, store) = file_backed_session(&dir).await;
    let user = UserId::new("u1");

    let id = session.create(draft("Gym", Schedule::Daily)).await.unwrap();
    let today = Local::now().date_naive();

    // A second device marks today done directly through the store.
    store
        .update(
            &user,
            id,
            HabitPatch {
                completed_dates: Some(vec![today.format("%Y-%m-%d").to_string()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(!session.habit(id).unwrap().ledger.is_completed(today));
    assert!(session.refresh());
    assert!(session.habit(id).unwrap().ledger.is_completed(today));
}

#[tokio::test]
async fn state_survives_session_restart() {
    let dir = tempfile::tempdir().unwrap();
    let today = Local::now().date_naive();

    let id = {
        let (mut session, _store) = file_backed_session(&dir).await;
        let id = session.create(draft("Read", Schedule::Daily)).await.unwrap();
        session.toggle(id, today).await.unwrap();
        session.teardown();
        id
    };

    let (session, _store) = file_backed_session(&dir).await;
    let habit = session.habit(id).expect("habit persisted");
    assert!(habit.ledger.is_completed(today));
    assert_eq!(session.streak(id), Some(1));
}
