//! Basic CLI E2E tests.
//!
//! Each test runs the compiled binary against its own temporary home
//! directory, so no test touches the real config or database.

use std::process::Command;

struct Cli {
    home: tempfile::TempDir,
}

impl Cli {
    fn new() -> Self {
        Self {
            home: tempfile::tempdir().expect("temp home"),
        }
    }

    fn run(&self, args: &[&str]) -> (String, String, i32) {
        let output = Command::new(env!("CARGO_BIN_EXE_habitloop"))
            .args(args)
            .env("HOME", self.home.path())
            .env("HABITLOOP_ENV", "dev")
            .output()
            .expect("failed to execute CLI");

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code().unwrap_or(-1);
        (stdout, stderr, code)
    }
}

#[test]
fn habit_add_and_list() {
    let cli = Cli::new();
    let (stdout, _, code) = cli.run(&["habit", "add", "Read 20 pages"]);
    assert_eq!(code, 0, "habit add failed");
    assert!(stdout.contains("Created 'Read 20 pages'"));

    let (stdout, _, code) = cli.run(&["habit", "list"]);
    assert_eq!(code, 0, "habit list failed");
    assert!(stdout.contains("Read 20 pages"));
}

#[test]
fn habit_list_json_is_parseable() {
    let cli = Cli::new();
    cli.run(&["habit", "add", "Gym", "--schedule", "weekly", "--days", "1,3,5"]);
    let (stdout, _, code) = cli.run(&["habit", "list", "--json"]);
    assert_eq!(code, 0);

    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    let habits = parsed.as_array().expect("array");
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0]["title"], "Gym");
    assert_eq!(habits[0]["schedule"]["type"], "weekly");
}

#[test]
fn done_toggles_todays_completion() {
    let cli = Cli::new();
    cli.run(&["habit", "add", "Read"]);

    let (stdout, _, code) = cli.run(&["done", "Read"]);
    assert_eq!(code, 0, "done failed");
    assert!(stdout.contains("completed"));
    assert!(stdout.contains("Today: 100%"));

    let (stdout, _, code) = cli.run(&["done", "Read"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("unmarked"));
}

#[test]
fn done_rejects_unknown_habit() {
    let cli = Cli::new();
    let (_, stderr, code) = cli.run(&["done", "nope"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("no habit matches"));
}

#[test]
fn weekly_habit_requires_days() {
    let cli = Cli::new();
    let (_, stderr, code) = cli.run(&["habit", "add", "Gym", "--schedule", "weekly"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("at least one day"));
}

#[test]
fn stats_today_and_streaks() {
    let cli = Cli::new();
    cli.run(&["habit", "add", "Read"]);
    cli.run(&["done", "Read"]);

    let (stdout, _, code) = cli.run(&["stats", "today"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("100%"));

    let (stdout, _, code) = cli.run(&["stats", "streaks"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Read"));
    assert!(stdout.contains("streak 1"));
    assert!(stdout.contains("month "));

    let (stdout, _, code) = cli.run(&["stats", "streaks", "--json"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    let row = &parsed.as_array().expect("array")[0];
    assert_eq!(row["streak"], 1);
    // One completed day this month: the rate is small but nonzero.
    assert!(row["monthAchievement"].as_u64().unwrap() >= 1);
}

#[test]
fn stats_heatmap_json_is_a_full_week_grid() {
    let cli = Cli::new();
    cli.run(&["habit", "add", "Read"]);
    let (stdout, _, code) =
        cli.run(&["stats", "heatmap", "--year", "2025", "--month", "10", "--json"]);
    assert_eq!(code, 0);

    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    let cells = parsed.as_array().expect("array");
    assert_eq!(cells.len() % 7, 0);
}

#[test]
fn config_set_and_show() {
    let cli = Cli::new();
    let (_, _, code) = cli.run(&["config", "set", "heatmap.full_color", "#123456"]);
    assert_eq!(code, 0, "config set failed");

    let (stdout, _, code) = cli.run(&["config", "show"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("#123456"));

    let (_, stderr, code) = cli.run(&["config", "set", "nope.nope", "1"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Unknown configuration key"));
}

#[test]
fn remind_status_lists_planned_fires() {
    let cli = Cli::new();
    cli.run(&["habit", "add", "Read", "--remind", "23:59"]);
    let (stdout, _, code) = cli.run(&["remind", "status"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Read"));
    assert!(stdout.contains("timer(s) armed"));
}
