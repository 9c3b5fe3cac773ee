//! Encrypted password vault and browser bookmark interchange.
//!
//! Two codecs sit at the core. [`vault::crypto`] seals password records into
//! AES-256-GCM envelopes under a key derived from a passphrase, and
//! [`bookmarks`] reads and writes the Netscape bookmark HTML format and a JSON
//! equivalent. [`api::VaultClient`] wraps the envelope store for programmatic
//! use. The CLI is gated behind the `cli` feature.
//!
//! # Quick start
//!
//! ```no_run
//! use stash::api::VaultClient;
//! use stash::vault::secret::SecretFields;
//!
//! let client = VaultClient::open("my-vault-passphrase")?;
//! let record = client.add(SecretFields::new("mail", "me@example.com", "hunter2"))?;
//! let again = client.get(&record.id)?;
//! assert_eq!(again.fields.password, "hunter2");
//! # Ok::<(), stash::error::StashError>(())
//! ```

pub mod api;
#[cfg(feature = "cli")]
pub mod auth;
pub mod bookmarks;
pub mod config;
pub mod error;
pub mod session;
pub mod tags;
pub mod types;
pub mod vault;
