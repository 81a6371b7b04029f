use std::error::Error;

use crate::common;

pub fn run(reference: &str, date: Option<&str>) -> Result<(), Box<dyn Error>> {
    let rt = common::runtime()?;
    let mut session = common::open_session(&rt)?;

    let id = common::resolve_habit(&session, reference)?;
    let date = common::parse_date(date)?;
    let title = session
        .habit(id)
        .map(|h| h.title.clone())
        .unwrap_or_default();

    let done = rt.block_on(session.toggle(id, date))?;
    if done {
        println!("'{title}' completed on {date}");
    } else {
        println!("'{title}' unmarked on {date}");
    }
    println!(
        "Today: {}%  streak {}",
        session.today_percent(),
        session.streak(id).unwrap_or(0)
    );
    Ok(())
}
