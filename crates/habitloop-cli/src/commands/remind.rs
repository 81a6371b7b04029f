use std::error::Error;
use std::time::Duration;

use chrono::Local;
use clap::Subcommand;
use habitloop_core::next_fire_at;

use crate::common;

#[derive(Subcommand)]
pub enum RemindAction {
    /// Show the next planned fire time for each habit
    Status,
    /// Keep the process alive so armed reminder timers can fire
    Run {
        /// Give up after this many seconds even if timers remain armed
        #[arg(long, default_value_t = 86_400)]
        max_secs: u64,
    },
}

pub fn run(action: RemindAction) -> Result<(), Box<dyn Error>> {
    let rt = common::runtime()?;
    let session = common::open_session(&rt)?;

    match action {
        RemindAction::Status => {
            let now = Local::now();
            for habit in session.habits() {
                let planned = match next_fire_at(habit, now) {
                    Some(at) => at.format("%Y-%m-%d %H:%M").to_string(),
                    None => "-".to_string(),
                };
                println!(
                    "{}  {:<24} {}",
                    common::short_id(habit.id),
                    habit.title,
                    planned,
                );
            }
            println!("{} timer(s) armed", session.armed_reminders());
        }
        RemindAction::Run { max_secs } => {
            let armed = session.armed_reminders();
            if armed == 0 {
                println!("No reminders to wait for");
                return Ok(());
            }
            println!("Waiting on {armed} reminder(s), Ctrl-C to stop");
            rt.block_on(async {
                let deadline = tokio::time::Instant::now() + Duration::from_secs(max_secs);
                while session.armed_reminders() > 0 && tokio::time::Instant::now() < deadline {
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            });
        }
    }
    Ok(())
}
