use std::error::Error;

use chrono::{Datelike, Local};
use clap::Subcommand;
use habitloop_core::month_achievement;
use serde_json::json;

use crate::common;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's aggregate completion percentage
    Today {
        #[arg(long)]
        json: bool,
    },
    /// Per-habit streaks, total completions, and this month's
    /// achievement rate
    Streaks {
        #[arg(long)]
        json: bool,
    },
    /// Month heat-map (defaults to the current month)
    Heatmap {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn Error>> {
    let rt = common::runtime()?;
    let session = common::open_session(&rt)?;

    match action {
        StatsAction::Today { json } => {
            let percent = session.today_percent();
            if json {
                println!("{}", json!({ "percent": percent }));
            } else {
                println!("{percent}% of today's habits completed");
            }
        }
        StatsAction::Streaks { json } => {
            let today = Local::now().date_naive();
            let (year, month) = (today.year(), today.month());
            if json {
                let rows: Vec<_> = session
                    .habits()
                    .iter()
                    .map(|h| {
                        json!({
                            "id": h.id,
                            "title": h.title,
                            "streak": session.streak(h.id).unwrap_or(0),
                            "totalCompletions": h.ledger.count(),
                            "monthAchievement": month_achievement(h, year, month),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for habit in session.habits() {
                    println!(
                        "{}  {:<24} streak {:<4} total {:<4} month {}%",
                        common::short_id(habit.id),
                        habit.title,
                        session.streak(habit.id).unwrap_or(0),
                        habit.ledger.count(),
                        month_achievement(habit, year, month),
                    );
                }
            }
        }
        StatsAction::Heatmap { year, month, json } => {
            let today = Local::now().date_naive();
            let year = year.unwrap_or_else(|| today.year());
            let month = month.unwrap_or_else(|| today.month());
            let grid = session.month_grid(year, month);

            if json {
                println!("{}", serde_json::to_string_pretty(&grid)?);
                return Ok(());
            }

            println!("{year}-{month:02}   Su   Mo   Tu   We   Th   Fr   Sa");
            for week in grid.chunks(7) {
                let mut line = String::from("         ");
                for cell in week {
                    let text = if !cell.in_month {
                        "    .".to_string()
                    } else if cell.dimmed {
                        "    -".to_string()
                    } else {
                        format!("{:>4}%", (cell.ratio * 100.0).round() as u32)
                    };
                    line.push_str(&text);
                }
                println!("{line}");
            }
        }
    }
    Ok(())
}
