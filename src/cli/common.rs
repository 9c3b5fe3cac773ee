use std::fs;
use std::io::{self, Read};

use secrecy::ExposeSecret;

use stash::api::VaultClient;
use stash::auth;
use stash::config::Config;
use stash::error::{Result, StashError};
use stash::vault;

/// Resolve the passphrase and unlock the default vault.
pub fn open_client() -> Result<VaultClient> {
    if !vault::is_initialized() {
        return Err(StashError::VaultNotInitialized);
    }
    let passphrase = auth::resolve_passphrase()?;
    VaultClient::open(passphrase.expose_secret())
}

pub fn load_config() -> Result<Config> {
    Config::load(&vault::config_path()?)
}

/// Read all of stdin. One trailing newline is dropped (common when piping echo).
pub fn read_stdin() -> Result<String> {
    let mut value = String::new();
    io::stdin()
        .read_to_string(&mut value)
        .map_err(|e| StashError::Other(format!("Failed to read from stdin: {}", e)))?;
    let trimmed = value
        .strip_suffix("\r\n")
        .or_else(|| value.strip_suffix('\n'))
        .unwrap_or(&value);
    Ok(trimmed.to_string())
}

/// Read a file, or stdin for `-`.
pub fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut content = String::new();
        io::stdin().read_to_string(&mut content)?;
        return Ok(content);
    }
    fs::read_to_string(path)
        .map_err(|e| StashError::Other(format!("Cannot read {}: {}", path, e)))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string(value).map_err(|e| StashError::Serialization(e.to_string()))?
    );
    Ok(())
}

pub fn warn(message: &str) {
    eprintln!("{} {}", console::style("Warning:").yellow().bold(), message);
}
