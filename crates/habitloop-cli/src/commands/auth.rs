use std::error::Error;
use std::io::Write;

use clap::Subcommand;
use habitloop_core::{auth::token_store, AuthClient, Config};

use crate::common;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Log in to the hosted store
    Login {
        email: String,
        /// Password (prompted on stdin when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Drop the stored session token
    Logout,
    /// Show the current login state
    Status,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load()?;

    match action {
        AuthAction::Login { email, password } => {
            let base = config
                .remote
                .base_url
                .clone()
                .ok_or("no remote configured, set remote.base_url first")?;
            let password = match password {
                Some(p) => p,
                None => prompt_password()?,
            };

            let rt = common::runtime()?;
            let client = AuthClient::new(&base)?;
            let session = rt.block_on(client.login(&email, &password))?;

            config.account.email = Some(email.clone());
            config.account.user_id = Some(session.user_id.to_string());
            config.save()?;
            println!("Logged in as {email} ({})", session.user_id);
        }
        AuthAction::Logout => {
            token_store::delete()?;
            config.account.email = None;
            config.account.user_id = None;
            config.save()?;
            println!("Logged out");
        }
        AuthAction::Status => match (&config.account.email, token_store::get()?) {
            (Some(email), Some(_)) => println!("Logged in as {email}"),
            (Some(email), None) => println!("Session expired for {email}, log in again"),
            _ => println!("Not logged in"),
        },
    }
    Ok(())
}

fn prompt_password() -> Result<String, Box<dyn Error>> {
    print!("Password: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end().to_string())
}
