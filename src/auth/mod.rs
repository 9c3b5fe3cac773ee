//! Passphrase resolution for the CLI: environment first, then an interactive prompt.

use std::env;
use std::io::IsTerminal;

use secrecy::SecretString;

use crate::error::{Result, StashError};

pub const STASH_PASSPHRASE_ENV: &str = "STASH_PASSPHRASE";
pub const STASH_NON_INTERACTIVE_ENV: &str = "STASH_NON_INTERACTIVE";

/// Check if we are in non-interactive mode.
/// Returns true if stdin is not a TTY or STASH_NON_INTERACTIVE=1 is set.
pub fn is_non_interactive() -> bool {
    if env::var(STASH_NON_INTERACTIVE_ENV)
        .map(|v| v == "1")
        .unwrap_or(false)
    {
        return true;
    }
    !std::io::stdin().is_terminal()
}

fn non_empty(passphrase: String) -> Result<SecretString> {
    if passphrase.is_empty() {
        return Err(StashError::AuthFailed("passphrase must not be empty".into()));
    }
    Ok(SecretString::new(passphrase))
}

fn prompt_error(e: dialoguer::Error) -> StashError {
    StashError::AuthFailed(format!("Failed to read passphrase: {}", e))
}

/// Passphrase for an existing vault. Tries in order:
/// 1. STASH_PASSPHRASE env var
/// 2. Interactive prompt (only if a TTY is available)
pub fn resolve_passphrase() -> Result<SecretString> {
    if let Ok(passphrase) = env::var(STASH_PASSPHRASE_ENV) {
        return non_empty(passphrase);
    }

    if is_non_interactive() {
        return Err(StashError::AuthFailed(format!(
            "No credentials provided. Set the {} environment variable.",
            STASH_PASSPHRASE_ENV
        )));
    }

    let passphrase = dialoguer::Password::new()
        .with_prompt("Enter vault passphrase")
        .interact()
        .map_err(prompt_error)?;
    non_empty(passphrase)
}

/// Passphrase for a vault that does not exist yet. An explicit value wins over
/// the environment; the interactive prompt asks for confirmation.
pub fn resolve_new_passphrase(explicit: Option<String>, prompt: &str) -> Result<SecretString> {
    if let Some(passphrase) = explicit {
        return non_empty(passphrase);
    }

    if let Ok(passphrase) = env::var(STASH_PASSPHRASE_ENV) {
        return non_empty(passphrase);
    }

    if is_non_interactive() {
        return Err(StashError::AuthFailed(format!(
            "No passphrase provided. Pass --passphrase or set {}.",
            STASH_PASSPHRASE_ENV
        )));
    }

    let passphrase = dialoguer::Password::new()
        .with_prompt(prompt)
        .with_confirmation("Confirm passphrase", "Passphrases don't match")
        .interact()
        .map_err(prompt_error)?;
    non_empty(passphrase)
}

/// Replacement passphrase for `rekey`. Never read from STASH_PASSPHRASE, which
/// still holds the current one.
pub fn resolve_rekey_passphrase(explicit: Option<String>) -> Result<SecretString> {
    if let Some(passphrase) = explicit {
        return non_empty(passphrase);
    }
    if is_non_interactive() {
        return Err(StashError::AuthFailed(
            "No new passphrase provided. Pass --new-passphrase.".into(),
        ));
    }
    let passphrase = dialoguer::Password::new()
        .with_prompt("New vault passphrase")
        .with_confirmation("Confirm new passphrase", "Passphrases don't match")
        .interact()
        .map_err(prompt_error)?;
    non_empty(passphrase)
}
