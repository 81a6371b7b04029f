use std::error::Error;

use clap::Subcommand;
use habitloop_core::{Config, ConfigError};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the current configuration
    Show,
    /// Print the configuration file path
    Path,
    /// Set a configuration value
    Set { key: String, value: String },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            set_key(&mut config, &key, &value)?;
            config.save()?;
            println!("{key} = {value}");
        }
    }
    Ok(())
}

fn set_key(config: &mut Config, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "heatmap.zero_color" => config.heatmap.zero_color = value.to_string(),
        "heatmap.full_color" => config.heatmap.full_color = value.to_string(),
        "notifications.enabled" => {
            config.notifications.enabled = value
                .parse()
                .map_err(|_| ConfigError::ParseFailed(format!("expected true/false, got {value}")))?
        }
        "remote.base_url" => {
            config.remote.base_url = if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            }
        }
        "account.email" => {
            config.account.email = if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            }
        }
        other => return Err(ConfigError::UnknownKey(other.to_string())),
    }
    Ok(())
}
