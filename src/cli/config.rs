use crate::cli::common;
use crate::cli::ConfigCommands;
use stash::error::{Result, StashError};

pub fn run(cmd: &ConfigCommands, json: bool) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show(json),
    }
}

fn show(json: bool) -> Result<()> {
    let config = common::load_config()?;
    if json {
        return common::print_json(&config);
    }
    let toml_str = toml::to_string_pretty(&config)
        .map_err(|e| StashError::Other(format!("Config serialize error: {}", e)))?;
    println!("{}", toml_str);
    Ok(())
}
