//! High-level programmatic API for the stash vault.
//!
//! [`VaultClient`] provides a simple facade over the envelope store, handling
//! load → decrypt/encrypt → save in every method call. The unlocked key lives in
//! a [`VaultSession`]; after [`VaultClient::lock`] every operation fails with
//! [`StashError::InvalidKey`] until the vault is opened again.

use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::error::{Result, StashError};
use crate::session::{KeyLease, VaultSession};
use crate::types::*;
use crate::vault::crypto::KdfParams;
use crate::vault::secret::{
    generate_record_id, RecordView, SecretFields, SecretRecord, StoredSecret,
};
use crate::vault::transfer::{self, SkippedEntry};
use crate::vault::{self, Vault};

/// Partial update for [`VaultClient::edit`]. `None` keeps the current value;
/// an empty `url` or `notes` clears it.
#[derive(Debug, Default, Clone)]
pub struct RecordUpdate {
    pub service: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl RecordUpdate {
    pub fn is_empty(&self) -> bool {
        self.service.is_none()
            && self.username.is_none()
            && self.password.is_none()
            && self.url.is_none()
            && self.notes.is_none()
            && self.tags.is_none()
    }

    fn apply(self, fields: &mut SecretFields) {
        if let Some(service) = self.service {
            fields.service = service;
        }
        if let Some(username) = self.username {
            fields.username = username;
        }
        if let Some(password) = self.password {
            fields.password = password;
        }
        if let Some(url) = self.url {
            fields.url = Some(url);
        }
        if let Some(notes) = self.notes {
            fields.notes = Some(notes);
        }
        if let Some(tags) = self.tags {
            fields.tags = tags;
        }
    }
}

/// Plaintext export plus the ids that could not be decrypted and were left out.
#[derive(Debug)]
pub struct PlainExport {
    pub json: String,
    pub exported: usize,
    pub undecryptable: Vec<String>,
}

/// Result of a plaintext import.
#[derive(Debug)]
pub struct ImportSummary {
    pub imported: Vec<String>,
    pub skipped: Vec<SkippedEntry>,
}

/// High-level client for programmatic vault access.
pub struct VaultClient {
    path: PathBuf,
    session: VaultSession,
}

impl VaultClient {
    /// Create a vault at the default location (~/.stash/vault.json).
    pub fn init(passphrase: &str, params: KdfParams) -> Result<Self> {
        Self::init_at(&vault::vault_path()?, passphrase, params)
    }

    /// Create a vault at `path`. Fails if one already exists there.
    pub fn init_at(path: &Path, passphrase: &str, params: KdfParams) -> Result<Self> {
        if path.exists() {
            return Err(StashError::VaultAlreadyExists(path.display().to_string()));
        }
        if passphrase.is_empty() {
            return Err(StashError::AuthFailed("passphrase must not be empty".into()));
        }
        let (v, key) = Vault::create(passphrase, params)?;
        vault::save_vault(&v, path)?;
        Ok(Self {
            path: path.to_path_buf(),
            session: VaultSession::unlocked(key),
        })
    }

    /// Unlock the vault at the default location.
    pub fn open(passphrase: &str) -> Result<Self> {
        Self::open_at(&vault::vault_path()?, passphrase)
    }

    /// Unlock the vault at `path`. A wrong passphrase fails with [`StashError::AuthFailed`].
    pub fn open_at(path: &Path, passphrase: &str) -> Result<Self> {
        let v = vault::load_vault(path)?;
        let key = v.unlock(passphrase)?;
        Ok(Self {
            path: path.to_path_buf(),
            session: VaultSession::unlocked(key),
        })
    }

    /// Check whether the default vault has been initialized.
    pub fn is_initialized() -> bool {
        vault::is_initialized()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn session(&self) -> &VaultSession {
        &self.session
    }

    /// Drop the key. Operations started afterwards fail until the vault is reopened.
    pub fn lock(&self) {
        self.session.lock();
    }

    pub fn is_locked(&self) -> bool {
        !self.session.is_unlocked()
    }

    /// Re-derive the key from `passphrase` and unlock this client again.
    pub fn unlock(&self, passphrase: &str) -> Result<()> {
        let v = vault::load_vault(&self.path)?;
        let key = v.unlock(passphrase)?;
        self.session.unlock(key);
        Ok(())
    }

    /// Encrypt and store a new record. Returns it with its fresh id.
    pub fn add(&self, mut fields: SecretFields) -> Result<SecretRecord> {
        fields.normalize();
        fields.validate()?;
        let lease = self.session.lease()?;
        let mut v = vault::load_vault(&self.path)?;

        let id = unused_id(&v)?;
        let now = Utc::now();
        let stored = StoredSecret::seal(&self.session, &lease, &fields, now, now)?;
        v.records.insert(id.clone(), stored);
        v.touch();
        vault::save_vault(&v, &self.path)?;

        debug!(%id, "record added");
        Ok(SecretRecord {
            id,
            fields,
            created_at: now,
            updated_at: now,
        })
    }

    /// Decrypt one record.
    pub fn get(&self, id: &str) -> Result<SecretRecord> {
        let lease = self.session.lease()?;
        let v = vault::load_vault(&self.path)?;
        let stored = v
            .records
            .get(id)
            .ok_or_else(|| StashError::RecordNotFound(id.to_string()))?;
        stored.open(&self.session, &lease, id)
    }

    /// Apply `update` to a record. The id and creation time are kept; the record
    /// gets a brand-new envelope.
    pub fn edit(&self, id: &str, update: RecordUpdate) -> Result<SecretRecord> {
        let lease = self.session.lease()?;
        let mut v = vault::load_vault(&self.path)?;
        let stored = v
            .records
            .get(id)
            .ok_or_else(|| StashError::RecordNotFound(id.to_string()))?;
        let mut record = stored.open(&self.session, &lease, id)?;

        update.apply(&mut record.fields);
        record.fields.normalize();
        record.fields.validate()?;
        record.updated_at = Utc::now();

        let resealed = StoredSecret::seal(
            &self.session,
            &lease,
            &record.fields,
            record.created_at,
            record.updated_at,
        )?;
        v.records.insert(id.to_string(), resealed);
        v.touch();
        vault::save_vault(&v, &self.path)?;

        debug!(%id, "record updated");
        Ok(record)
    }

    /// Delete a record permanently.
    pub fn remove(&self, id: &str) -> Result<()> {
        // Removing needs no decryption, but a locked client must not mutate the vault.
        self.session.lease()?;
        let mut v = vault::load_vault(&self.path)?;
        if v.records.remove(id).is_none() {
            return Err(StashError::RecordNotFound(id.to_string()));
        }
        v.touch();
        vault::save_vault(&v, &self.path)?;
        debug!(%id, "record removed");
        Ok(())
    }

    /// Decrypt every record. A record that fails is reported as
    /// [`RecordView::Undecryptable`] and the rest still decrypt. Locking the
    /// session part way through fails the whole listing with
    /// [`StashError::InvalidKey`].
    /// Sorted by service name, undecryptable rows last.
    pub fn list(&self) -> Result<Vec<RecordView>> {
        let lease = self.session.lease()?;
        let v = vault::load_vault(&self.path)?;

        let mut rows = v
            .records
            .iter()
            .map(|(id, stored)| open_row(&self.session, &lease, id, stored))
            .collect::<Result<Vec<_>>>()?;
        rows.sort_by(compare_rows);
        Ok(rows)
    }

    /// Decrypted records matching `query` on service, username, url or tags.
    pub fn search(&self, query: &str) -> Result<Vec<SecretRecord>> {
        Ok(self
            .list()?
            .into_iter()
            .filter_map(|row| match row {
                RecordView::Decrypted(record) if record.fields.matches(query) => Some(record),
                _ => None,
            })
            .collect())
    }

    /// Plaintext JSON of every decryptable record.
    pub fn export_json(&self) -> Result<PlainExport> {
        let mut records = Vec::new();
        let mut undecryptable = Vec::new();
        for row in self.list()? {
            match row {
                RecordView::Decrypted(record) => records.push(record),
                RecordView::Undecryptable { id, .. } => undecryptable.push(id),
            }
        }
        let json = transfer::export_plaintext(&records)?;
        Ok(PlainExport {
            json,
            exported: records.len(),
            undecryptable,
        })
    }

    /// Import a plaintext export. Invalid entries are skipped; valid ones are
    /// encrypted as new records and written in a single save.
    pub fn import_json(&self, content: &str) -> Result<ImportSummary> {
        let lease = self.session.lease()?;
        let parsed = transfer::parse_plaintext(content)?;
        let mut v = vault::load_vault(&self.path)?;

        let now = Utc::now();
        let mut imported = Vec::with_capacity(parsed.entries.len());
        for fields in &parsed.entries {
            let id = unused_id(&v)?;
            let stored = StoredSecret::seal(&self.session, &lease, fields, now, now)?;
            v.records.insert(id.clone(), stored);
            imported.push(id);
        }

        if !imported.is_empty() {
            v.touch();
            vault::save_vault(&v, &self.path)?;
        }
        debug!(imported = imported.len(), skipped = parsed.skipped.len(), "import finished");
        Ok(ImportSummary {
            imported,
            skipped: parsed.skipped,
        })
    }

    /// Re-encrypt every record under a key derived from `new_passphrase` with a
    /// fresh salt. Any record that cannot be decrypted aborts the rekey untouched.
    pub fn rekey(&self, new_passphrase: &str, params: KdfParams) -> Result<()> {
        if new_passphrase.is_empty() {
            return Err(StashError::AuthFailed("passphrase must not be empty".into()));
        }
        let lease = self.session.lease()?;
        let old = vault::load_vault(&self.path)?;

        let mut records = Vec::with_capacity(old.records.len());
        for (id, stored) in &old.records {
            records.push(stored.open(&self.session, &lease, id)?);
        }

        let (mut fresh, new_key) = Vault::create(new_passphrase, params)?;
        let next = VaultSession::unlocked(new_key.clone());
        let next_lease = next.lease()?;
        for record in &records {
            let stored = StoredSecret::seal(
                &next,
                &next_lease,
                &record.fields,
                record.created_at,
                record.updated_at,
            )?;
            fresh.records.insert(record.id.clone(), stored);
        }
        fresh.created_at = old.created_at;
        fresh.touch();
        vault::save_vault(&fresh, &self.path)?;

        self.session.unlock(new_key);
        debug!(records = records.len(), "vault rekeyed");
        Ok(())
    }
}

fn unused_id(v: &Vault) -> Result<String> {
    loop {
        let id = generate_record_id()?;
        if !v.records.contains_key(&id) {
            return Ok(id);
        }
    }
}

fn open_row(
    session: &VaultSession,
    lease: &KeyLease,
    id: &str,
    stored: &StoredSecret,
) -> Result<RecordView> {
    match stored.open(session, lease, id) {
        Ok(record) => Ok(RecordView::Decrypted(record)),
        Err(e @ (StashError::DecryptionFailed | StashError::Serialization(_))) => {
            warn!(%id, error = %e, "record could not be decrypted");
            Ok(RecordView::Undecryptable {
                id: id.to_string(),
                updated_at: vault::secret::millis_to_datetime(stored.updated_at),
                reason: e.to_string(),
            })
        }
        Err(e) => Err(e),
    }
}

fn compare_rows(a: &RecordView, b: &RecordView) -> Ordering {
    match (a, b) {
        (RecordView::Decrypted(x), RecordView::Decrypted(y)) => x
            .fields
            .service
            .to_lowercase()
            .cmp(&y.fields.service.to_lowercase())
            .then_with(|| x.fields.username.cmp(&y.fields.username)),
        (RecordView::Decrypted(_), RecordView::Undecryptable { .. }) => Ordering::Less,
        (RecordView::Undecryptable { .. }, RecordView::Decrypted(_)) => Ordering::Greater,
        (a, b) => a.id().cmp(b.id()),
    }
}
