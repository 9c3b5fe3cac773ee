use secrecy::ExposeSecret;

use stash::auth;
use stash::error::Result;

use crate::cli::common;
use crate::cli::json_output::StatusResponse;

pub fn run(new_passphrase: Option<String>, json: bool) -> Result<()> {
    // Authenticate with the current passphrase first.
    let client = common::open_client()?;
    let new_passphrase = auth::resolve_rekey_passphrase(new_passphrase)?;
    let config = common::load_config()?;

    client.rekey(new_passphrase.expose_secret(), config.kdf_params())?;

    if json {
        common::print_json(&StatusResponse {
            status: "rekeyed",
            id: None,
        })?;
    }
    eprintln!("Vault re-encrypted successfully.");
    Ok(())
}
