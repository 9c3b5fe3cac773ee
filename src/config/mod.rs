use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::bookmarks::{ExportOptions, ImportOptions, DEFAULT_FOLDER};
use crate::error::{Result, StashError};
use crate::vault::crypto::KdfParams;

/// Configuration file format (~/.stash/stash.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub vault: VaultConfig,
    #[serde(default)]
    pub bookmarks: BookmarksConfig,
}

/// Argon2id cost for new vaults and rekeys. Existing vaults keep the
/// parameters recorded in their header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultConfig {
    #[serde(default = "default_memory_kib")]
    pub kdf_memory_kib: u32,
    #[serde(default = "default_iterations")]
    pub kdf_iterations: u32,
    #[serde(default = "default_parallelism")]
    pub kdf_parallelism: u32,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            kdf_memory_kib: default_memory_kib(),
            kdf_iterations: default_iterations(),
            kdf_parallelism: default_parallelism(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarksConfig {
    #[serde(default = "default_true")]
    pub create_folders: bool,
    #[serde(default = "default_true")]
    pub preserve_dates: bool,
    /// Folder for bookmarks found outside any folder. Empty means leave them uncategorized.
    #[serde(default = "default_folder")]
    pub default_folder: String,
    #[serde(default = "default_true")]
    pub group_by_folder: bool,
    #[serde(default = "default_true")]
    pub include_uncategorized: bool,
}

impl Default for BookmarksConfig {
    fn default() -> Self {
        Self {
            create_folders: true,
            preserve_dates: true,
            default_folder: default_folder(),
            group_by_folder: true,
            include_uncategorized: true,
        }
    }
}

fn default_memory_kib() -> u32 {
    KdfParams::default().memory_kib
}

fn default_iterations() -> u32 {
    KdfParams::default().iterations
}

fn default_parallelism() -> u32 {
    KdfParams::default().parallelism
}

fn default_folder() -> String {
    DEFAULT_FOLDER.to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load config from a path. Returns default config if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| StashError::Other(format!("Invalid config: {}", e)))?;
        Ok(config)
    }

    /// Save config to a path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| StashError::Other(format!("Config serialize error: {}", e)))?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    pub fn kdf_params(&self) -> KdfParams {
        KdfParams {
            memory_kib: self.vault.kdf_memory_kib,
            iterations: self.vault.kdf_iterations,
            parallelism: self.vault.kdf_parallelism,
        }
    }

    pub fn import_options(&self) -> ImportOptions {
        let folder = self.bookmarks.default_folder.trim();
        ImportOptions {
            create_folders: self.bookmarks.create_folders,
            preserve_dates: self.bookmarks.preserve_dates,
            default_folder: (!folder.is_empty()).then(|| folder.to_string()),
        }
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            group_by_folder: self.bookmarks.group_by_folder,
            include_uncategorized: self.bookmarks.include_uncategorized,
        }
    }
}
