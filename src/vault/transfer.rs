//! Plaintext JSON export/import of the whole vault.
//!
//! The export is unencrypted at rest; callers are expected to warn about it.

use serde_json::Value;
use tracing::warn;

use crate::error::{Result, StashError};
use crate::types::*;
use crate::vault::secret::{SecretFields, SecretRecord};

#[derive(Serialize)]
struct PlainExportEntry<'a> {
    service: &'a str,
    username: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    tags: &'a [String],
}

/// An import entry that was dropped, with its array index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub index: usize,
    pub reason: String,
}

/// Outcome of parsing a plaintext export: the valid entries plus what was skipped.
#[derive(Debug, Default)]
pub struct PlainImport {
    pub entries: Vec<SecretFields>,
    pub skipped: Vec<SkippedEntry>,
}

/// Render records as `[{service, username, password, url?, notes?, tags?}]`.
pub fn export_plaintext(records: &[SecretRecord]) -> Result<String> {
    let entries: Vec<PlainExportEntry<'_>> = records
        .iter()
        .map(|r| PlainExportEntry {
            service: &r.fields.service,
            username: &r.fields.username,
            password: &r.fields.password,
            url: r.fields.url.as_deref(),
            notes: r.fields.notes.as_deref(),
            tags: &r.fields.tags,
        })
        .collect();
    serde_json::to_string_pretty(&entries).map_err(|e| StashError::Serialization(e.to_string()))
}

/// Parse a plaintext export. The document must be a JSON array; bad entries are skipped.
pub fn parse_plaintext(content: &str) -> Result<PlainImport> {
    let doc: Value = serde_json::from_str(content)
        .map_err(|e| StashError::MalformedInput(format!("Invalid JSON: {}", e)))?;
    let items = doc
        .as_array()
        .ok_or_else(|| StashError::MalformedInput("expected a JSON array of entries".into()))?;

    let mut import = PlainImport::default();
    for (index, item) in items.iter().enumerate() {
        match entry_from_value(item) {
            Ok(fields) => import.entries.push(fields),
            Err(reason) => {
                warn!(index, %reason, "skipping vault import entry");
                import.skipped.push(SkippedEntry { index, reason });
            }
        }
    }
    Ok(import)
}

fn entry_from_value(item: &Value) -> std::result::Result<SecretFields, String> {
    let mut fields: SecretFields =
        serde_json::from_value(item.clone()).map_err(|e| e.to_string())?;
    fields.normalize();
    fields.validate().map_err(|e| e.to_string())?;
    Ok(fields)
}
