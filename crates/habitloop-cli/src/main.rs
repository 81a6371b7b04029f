use clap::{Parser, Subcommand};

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "habitloop", version, about = "Habitloop CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Habit management
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Toggle a habit's completion for a date (defaults to today)
    Done {
        /// Habit id (prefix) or exact title
        id: String,
        /// Date to toggle (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// Streaks and progress
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Reminder timers
    Remind {
        #[command(subcommand)]
        action: commands::remind::RemindAction,
    },
    /// Authentication for the hosted store
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Habit { action } => commands::habit::run(action),
        Commands::Done { id, date } => commands::done::run(&id, date.as_deref()),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Remind { action } => commands::remind::run(action),
        Commands::Auth { action } => commands::auth::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
