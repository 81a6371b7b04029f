use std::error::Error;

use clap::Subcommand;
use habitloop_core::{HabitDraft, HabitPatch, Reminder, TimeOfDay};

use crate::common;

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a habit
    Add {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Schedule kind: "daily" or "weekly"
        #[arg(long, default_value = "daily")]
        schedule: String,
        /// Weekdays for weekly schedules (0=Sun .. 6=Sat)
        #[arg(long, value_delimiter = ',')]
        days: Vec<u8>,
        /// Reminder time (HH:MM)
        #[arg(long)]
        remind: Option<String>,
    },
    /// List habits
    List {
        #[arg(long)]
        json: bool,
    },
    /// Edit a habit's title, description, schedule, or reminder
    Edit {
        /// Habit id (prefix) or exact title
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// New schedule kind: "daily" or "weekly"
        #[arg(long)]
        schedule: Option<String>,
        #[arg(long, value_delimiter = ',')]
        days: Vec<u8>,
        /// Set the reminder time (HH:MM)
        #[arg(long)]
        remind: Option<String>,
        /// Turn the reminder off
        #[arg(long)]
        no_remind: bool,
    },
    /// Delete a habit (non-recoverable)
    Delete {
        /// Habit id (prefix) or exact title
        id: String,
    },
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn Error>> {
    let rt = common::runtime()?;
    let mut session = common::open_session(&rt)?;

    match action {
        HabitAction::Add {
            title,
            description,
            schedule,
            days,
            remind,
        } => {
            let schedule = common::parse_schedule(&schedule, &days)?;
            let reminder = match remind {
                Some(t) => Reminder::at(TimeOfDay::parse(&t)?),
                None => Reminder::off(),
            };
            let draft = HabitDraft {
                title: title.clone(),
                description,
                schedule,
                reminder,
            };
            let id = rt.block_on(session.create(draft))?;
            println!("Created '{title}' ({})", common::short_id(id));
        }
        HabitAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(session.habits())?);
            } else if session.habits().is_empty() {
                println!("No habits yet. Try: habitloop habit add \"Read 20 pages\"");
            } else {
                for habit in session.habits() {
                    println!(
                        "{}  {:<24} {:<20} streak {:<4} total {}",
                        common::short_id(habit.id),
                        habit.title,
                        common::schedule_summary(habit.schedule.as_ref()),
                        session.streak(habit.id).unwrap_or(0),
                        habit.ledger.count(),
                    );
                }
            }
        }
        HabitAction::Edit {
            id,
            title,
            description,
            schedule,
            days,
            remind,
            no_remind,
        } => {
            let habit_id = common::resolve_habit(&session, &id)?;
            let mut patch = HabitPatch {
                title,
                description,
                ..Default::default()
            };
            if let Some(kind) = schedule {
                patch.schedule = Some(common::parse_schedule(&kind, &days)?);
            }
            if no_remind {
                patch.notification_on = Some(false);
            } else if let Some(t) = remind {
                TimeOfDay::parse(&t)?;
                patch.notification_on = Some(true);
                patch.notification_time = Some(t);
            }
            if patch.is_empty() {
                return Err("nothing to change".into());
            }
            rt.block_on(session.edit(habit_id, patch))?;
            println!("Updated {}", common::short_id(habit_id));
        }
        HabitAction::Delete { id } => {
            let habit_id = common::resolve_habit(&session, &id)?;
            rt.block_on(session.delete(habit_id))?;
            println!("Deleted {}", common::short_id(habit_id));
        }
    }
    Ok(())
}
