use secrecy::ExposeSecret;

use stash::api::VaultClient;
use stash::auth;
use stash::error::{Result, StashError};
use stash::vault;

use crate::cli::common;
use crate::cli::json_output::StatusResponse;

pub fn run(passphrase: Option<String>, json: bool) -> Result<()> {
    let path = vault::vault_path()?;
    if path.exists() {
        return Err(StashError::VaultAlreadyExists(path.display().to_string()));
    }

    // A pre-seeded config (e.g. custom KDF cost) is respected and kept.
    let config_path = vault::config_path()?;
    let config = common::load_config()?;

    let passphrase = auth::resolve_new_passphrase(passphrase, "Create vault passphrase")?;
    VaultClient::init_at(&path, passphrase.expose_secret(), config.kdf_params())?;

    if !config_path.exists() {
        config.save(&config_path)?;
    }

    if json {
        common::print_json(&StatusResponse {
            status: "initialized",
            id: None,
        })?;
    }
    eprintln!("Vault initialized at {}", vault::stash_dir()?.display());
    Ok(())
}
