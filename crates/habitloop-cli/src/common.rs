//! Shared plumbing for CLI commands: runtime construction, session setup,
//! habit lookup by id prefix or title.

use std::error::Error;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use habitloop_core::{
    auth::token_store, Config, HabitId, HabitStore, LocalStore, LogSink, RemoteStore, Schedule,
    Session, UserId,
};
use tracing::debug;

pub fn runtime() -> Result<tokio::runtime::Runtime, Box<dyn Error>> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

/// Build and start a session against the configured store: the hosted
/// store when `remote.base_url` is set, the local SQLite store otherwise.
pub fn open_session(rt: &tokio::runtime::Runtime) -> Result<Session, Box<dyn Error>> {
    let config = Config::load()?;

    let store: Arc<dyn HabitStore> = match &config.remote.base_url {
        Some(base) => {
            debug!(%base, "using hosted store");
            let token = token_store::get()?;
            Arc::new(RemoteStore::new(base, token)?)
        }
        None => {
            debug!("using local store");
            Arc::new(LocalStore::open()?)
        }
    };

    let user = UserId::new(
        config
            .account
            .user_id
            .clone()
            .unwrap_or_else(|| "local".to_string()),
    );

    let mut session = Session::new(user, store, Arc::new(LogSink), config.session());
    rt.block_on(session.start())?;
    Ok(session)
}

/// Resolve a user-typed habit reference: unique id prefix or exact title.
pub fn resolve_habit(session: &Session, reference: &str) -> Result<HabitId, Box<dyn Error>> {
    let needle = reference.to_lowercase();
    let matches: Vec<HabitId> = session
        .habits()
        .iter()
        .filter(|h| h.id.to_string().starts_with(&needle) || h.title == reference)
        .map(|h| h.id)
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(format!("no habit matches '{reference}'").into()),
        _ => Err(format!("'{reference}' is ambiguous, use a longer id prefix").into()),
    }
}

pub fn parse_date(s: Option<&str>) -> Result<NaiveDate, Box<dyn Error>> {
    match s {
        None => Ok(Local::now().date_naive()),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| format!("invalid date '{s}': {e}").into()),
    }
}

/// Parse the `--schedule`/`--days` pair into a validated schedule.
pub fn parse_schedule(kind: &str, days: &[u8]) -> Result<Schedule, Box<dyn Error>> {
    let schedule = match kind {
        "daily" => Schedule::Daily,
        "weekly" => Schedule::Weekly {
            days: days.to_vec(),
        },
        other => return Err(format!("unknown schedule '{other}', expected daily or weekly").into()),
    };
    schedule.validate()?;
    Ok(schedule)
}

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// One-line human summary of a schedule.
pub fn schedule_summary(schedule: Option<&Schedule>) -> String {
    match schedule {
        None => "unscheduled".to_string(),
        Some(Schedule::Daily) => "daily".to_string(),
        Some(Schedule::Weekly { days }) => {
            let names: Vec<&str> = days
                .iter()
                .filter_map(|d| DAY_NAMES.get(*d as usize).copied())
                .collect();
            format!("weekly on {}", names.join(","))
        }
    }
}

/// First chunk of a habit id, enough to type back.
pub fn short_id(id: HabitId) -> String {
    id.to_string()[..8].to_string()
}
