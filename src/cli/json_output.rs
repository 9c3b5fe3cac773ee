use serde::Serialize;

use stash::vault::secret::{RecordView, SecretRecord};

/// One decrypted record, as printed by `stash get --json` and `stash add --json`.
#[derive(Serialize)]
pub struct RecordResponse {
    pub id: String,
    pub service: String,
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub created: String,
    pub updated: String,
}

impl From<&SecretRecord> for RecordResponse {
    fn from(record: &SecretRecord) -> Self {
        Self {
            id: record.id.clone(),
            service: record.fields.service.clone(),
            username: record.fields.username.clone(),
            password: record.fields.password.clone(),
            url: record.fields.url.clone(),
            notes: record.fields.notes.clone(),
            tags: record.fields.tags.clone(),
            created: record.created_at.to_rfc3339(),
            updated: record.updated_at.to_rfc3339(),
        }
    }
}

/// JSON response for `stash list --json`. Passwords are never listed.
#[derive(Serialize)]
pub struct ListResponse {
    pub records: Vec<RecordListItem>,
}

#[derive(Serialize)]
pub struct RecordListItem {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub tags: Vec<String>,
    pub updated: String,
    /// Set when the record could not be decrypted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&RecordView> for RecordListItem {
    fn from(row: &RecordView) -> Self {
        match row {
            RecordView::Decrypted(record) => Self {
                id: record.id.clone(),
                service: Some(record.fields.service.clone()),
                username: Some(record.fields.username.clone()),
                url: record.fields.url.clone(),
                tags: record.fields.tags.clone(),
                updated: record.updated_at.to_rfc3339(),
                error: None,
            },
            RecordView::Undecryptable {
                id,
                updated_at,
                reason,
            } => Self {
                id: id.clone(),
                service: None,
                username: None,
                url: None,
                tags: Vec::new(),
                updated: updated_at.to_rfc3339(),
                error: Some(reason.clone()),
            },
        }
    }
}

/// JSON response for `stash import --json`.
#[derive(Serialize)]
pub struct ImportResponse {
    pub imported: Vec<String>,
    pub skipped: Vec<SkippedItem>,
}

#[derive(Serialize)]
pub struct SkippedItem {
    pub location: String,
    pub reason: String,
}

/// JSON response for `stash bookmarks convert --json` when writing to a file.
#[derive(Serialize)]
pub struct ConvertResponse {
    pub output: String,
    pub folders: usize,
    pub bookmarks: usize,
    pub skipped: Vec<SkippedItem>,
}

/// Generic acknowledgement for mutations.
#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}
