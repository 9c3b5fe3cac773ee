pub mod crypto;
pub mod secret;
pub mod transfer;

use std::fs;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

use crate::error::{Result, StashError};
use crate::types::*;
use crate::vault::crypto::{KdfParams, VaultKey, SALT_SIZE};
use crate::vault::secret::StoredSecret;

pub use crypto::EncryptedEnvelope;

/// KDF header kept next to the envelopes. Holds no key material.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KdfHeader {
    pub algorithm: String,
    pub salt: String,
    #[serde(flatten)]
    pub params: KdfParams,
}

/// The on-disk vault document: a header plus one envelope per record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vault {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub kdf: KdfHeader,
    pub key_check: String,
    pub records: BTreeMap<String, StoredSecret>,
}

impl Vault {
    /// Create a new empty vault for `passphrase`. Returns the vault and its unlocked key.
    pub fn create(passphrase: &str, params: KdfParams) -> Result<(Self, VaultKey)> {
        let salt = crypto::random_bytes::<SALT_SIZE>()?;
        let (key, key_check) = crypto::derive_vault_keys(passphrase, &salt, &params)?;
        let now = Utc::now();
        let vault = Self {
            version: 1,
            created_at: now,
            modified_at: now,
            kdf: KdfHeader {
                algorithm: "argon2id".to_string(),
                salt: STANDARD.encode(salt),
                params,
            },
            key_check,
            records: BTreeMap::new(),
        };
        Ok((vault, key))
    }

    /// Derive the key for `passphrase` and check it against the stored key-check value.
    pub fn unlock(&self, passphrase: &str) -> Result<VaultKey> {
        if self.kdf.algorithm != "argon2id" {
            return Err(StashError::Other(format!(
                "Unsupported key derivation: {}",
                self.kdf.algorithm
            )));
        }
        let salt = STANDARD
            .decode(&self.kdf.salt)
            .map_err(|e| StashError::Serialization(format!("Invalid salt: {}", e)))?;
        let (key, key_check) = crypto::derive_vault_keys(passphrase, &salt, &self.kdf.params)?;
        if !crypto::verify_key_check(&self.key_check, &key_check) {
            return Err(StashError::AuthFailed("wrong passphrase".into()));
        }
        Ok(key)
    }

    /// Touch the modified timestamp.
    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}

/// Get the default stash directory path (~/.stash).
pub fn stash_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".stash"))
        .ok_or_else(|| StashError::Other("Could not determine home directory".into()))
}

/// Get the vault file path.
pub fn vault_path() -> Result<PathBuf> {
    Ok(stash_dir()?.join("vault.json"))
}

/// Get the config file path.
pub fn config_path() -> Result<PathBuf> {
    Ok(stash_dir()?.join("stash.toml"))
}

/// Check if the vault is initialized.
pub fn is_initialized() -> bool {
    vault_path().map(|p| p.exists()).unwrap_or(false)
}

/// Read the vault document. No key is needed: it only holds envelopes.
pub fn load_vault(path: &Path) -> Result<Vault> {
    if !path.exists() {
        return Err(StashError::VaultNotInitialized);
    }
    let content = fs::read_to_string(path)?;
    let vault: Vault = serde_json::from_str(&content)
        .map_err(|e| StashError::Serialization(e.to_string()))?;
    Ok(vault)
}

/// Save the vault document with atomic rename.
pub fn save_vault(vault: &Vault, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    let content =
        serde_json::to_string_pretty(vault).map_err(|e| StashError::Serialization(e.to_string()))?;

    // Atomic write: write to temp file, then rename
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, content)?;
    fs::rename(&tmp_path, path)?;

    debug!(path = %path.display(), records = vault.records.len(), "vault saved");
    Ok(())
}
