use std::error::Error;

use clap::Subcommand;

use focusquest_core::{data_dir, ClientConfig};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Read a value by dotted key, e.g. `api.base_url`
    Get { key: String },
    /// Set a value by dotted key
    Set { key: String, value: String },
    /// Print the data directory path
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = ClientConfig::load()?;
            println!("{}", config.get(&key)?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = ClientConfig::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("{key} = {}", config.get(&key)?);
        }
        ConfigAction::Path => {
            println!("{}", data_dir()?.display());
        }
    }
    Ok(())
}
