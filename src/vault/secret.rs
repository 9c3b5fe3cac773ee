use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{Result, StashError};
use crate::session::{KeyLease, VaultSession};
use crate::tags::normalize_tags;
use crate::types::*;
use crate::vault::crypto::{self, EncryptedEnvelope};

/// The sensitive part of a password entry. This is what gets serialized and encrypted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct SecretFields {
    pub service: String,
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SecretFields {
    pub fn new(
        service: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            username: username.into(),
            password: password.into(),
            url: None,
            notes: None,
            tags: Vec::new(),
        }
    }

    /// Trim identifiers, turn blank optionals into `None` and collapse tags into a set.
    /// The password itself is left untouched.
    pub fn normalize(&mut self) {
        self.service = self.service.trim().to_string();
        self.username = self.username.trim().to_string();
        self.url = self
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(String::from);
        if self.notes.as_deref().is_some_and(|n| n.trim().is_empty()) {
            self.notes = None;
        }
        self.tags = normalize_tags(&self.tags);
    }

    /// Service, username and password are required.
    pub fn validate(&self) -> Result<()> {
        if self.service.trim().is_empty() {
            return Err(StashError::InvalidRecord("service must not be empty".into()));
        }
        if self.username.trim().is_empty() {
            return Err(StashError::InvalidRecord("username must not be empty".into()));
        }
        if self.password.trim().is_empty() {
            return Err(StashError::InvalidRecord("password must not be empty".into()));
        }
        Ok(())
    }

    /// Case-insensitive match against service, username, url and tags.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.service.to_lowercase().contains(&query)
            || self.username.to_lowercase().contains(&query)
            || self
                .url
                .as_deref()
                .is_some_and(|u| u.to_lowercase().contains(&query))
            || self.tags.iter().any(|t| t.to_lowercase().contains(&query))
    }
}

impl fmt::Debug for SecretFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretFields")
            .field("service", &self.service)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("url", &self.url)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

/// A decrypted password entry.
#[derive(Debug, Clone)]
pub struct SecretRecord {
    pub id: String,
    pub fields: SecretFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The storage form of a record: only the envelope and timestamps ever leave memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSecret {
    pub encrypted_data: String,
    pub iv: String,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

impl StoredSecret {
    /// Encrypt `fields` into a brand-new envelope.
    pub fn seal(
        session: &VaultSession,
        lease: &KeyLease,
        fields: &SecretFields,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self> {
        let plaintext = Zeroizing::new(
            serde_json::to_string(fields).map_err(|e| StashError::Serialization(e.to_string()))?,
        );
        let envelope = session.encrypt(lease, &plaintext)?;
        Ok(Self {
            encrypted_data: envelope.ciphertext,
            iv: envelope.iv,
            created_at: created_at.timestamp_millis(),
            updated_at: updated_at.timestamp_millis(),
        })
    }

    /// Decrypt back into a record.
    pub fn open(&self, session: &VaultSession, lease: &KeyLease, id: &str) -> Result<SecretRecord> {
        let plaintext = Zeroizing::new(session.decrypt(lease, &self.envelope())?);
        let fields: SecretFields = serde_json::from_str(&plaintext)
            .map_err(|e| StashError::Serialization(format!("record {}: {}", id, e)))?;
        Ok(SecretRecord {
            id: id.to_string(),
            fields,
            created_at: millis_to_datetime(self.created_at),
            updated_at: millis_to_datetime(self.updated_at),
        })
    }

    pub fn envelope(&self) -> EncryptedEnvelope {
        EncryptedEnvelope {
            ciphertext: self.encrypted_data.clone(),
            iv: self.iv.clone(),
        }
    }
}

/// One row of a vault listing. A record that fails to decrypt is reported, not fatal.
#[derive(Debug, Clone)]
pub enum RecordView {
    Decrypted(SecretRecord),
    Undecryptable {
        id: String,
        updated_at: DateTime<Utc>,
        reason: String,
    },
}

impl RecordView {
    pub fn id(&self) -> &str {
        match self {
            RecordView::Decrypted(record) => &record.id,
            RecordView::Undecryptable { id, .. } => id,
        }
    }

    pub fn record(&self) -> Option<&SecretRecord> {
        match self {
            RecordView::Decrypted(record) => Some(record),
            RecordView::Undecryptable { .. } => None,
        }
    }
}

/// Generate a short unique record ID.
pub fn generate_record_id() -> Result<String> {
    Ok(hex::encode(crypto::random_bytes::<8>()?))
}

pub fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}
