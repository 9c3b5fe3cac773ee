use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StashError {
    #[error("Vault not initialized. Run `stash init` first.")]
    VaultNotInitialized,

    #[error("Vault already initialized at {0}")]
    VaultAlreadyExists(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Secure random source or cipher unavailable: {0}")]
    CryptoUnavailable(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Decryption failed: wrong key or tampered envelope")]
    DecryptionFailed,

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Bookmark node not found: {0}")]
    NodeNotFound(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl StashError {
    /// Return a typed exit code for this error category.
    pub fn exit_code(&self) -> i32 {
        match self {
            StashError::VaultNotInitialized => 7,
            StashError::VaultAlreadyExists(_) => 5,
            StashError::RecordNotFound(_) => 3,
            StashError::InvalidRecord(_) => 4,
            StashError::AuthFailed(_) => 2,
            StashError::CryptoUnavailable(_) => 1,
            StashError::InvalidKey(_) => 2,
            StashError::Encryption(_) => 1,
            StashError::DecryptionFailed => 2,
            StashError::MalformedInput(_) => 4,
            StashError::NodeNotFound(_) => 3,
            StashError::InvalidOperation(_) => 4,
            StashError::Serialization(_) => 1,
            StashError::Io(_) => 1,
            StashError::Other(_) => 1,
        }
    }

    /// Return a string error code identifier.
    pub fn error_code(&self) -> &'static str {
        match self {
            StashError::VaultNotInitialized => "vault_not_initialized",
            StashError::VaultAlreadyExists(_) => "already_exists",
            StashError::RecordNotFound(_) => "not_found",
            StashError::InvalidRecord(_) => "invalid_record",
            StashError::AuthFailed(_) => "auth_failed",
            StashError::CryptoUnavailable(_) => "crypto_unavailable",
            StashError::InvalidKey(_) => "invalid_key",
            StashError::Encryption(_) => "encryption_error",
            StashError::DecryptionFailed => "decryption_failed",
            StashError::MalformedInput(_) => "malformed_input",
            StashError::NodeNotFound(_) => "not_found",
            StashError::InvalidOperation(_) => "invalid_operation",
            StashError::Serialization(_) => "serialization_error",
            StashError::Io(_) => "io_error",
            StashError::Other(_) => "error",
        }
    }
}

/// JSON error response for --json mode.
#[derive(Serialize)]
pub struct JsonError {
    pub error: JsonErrorDetail,
}

#[derive(Serialize)]
pub struct JsonErrorDetail {
    pub code: String,
    pub message: String,
    pub exit_code: i32,
}

impl JsonError {
    pub fn from_error(e: &StashError) -> Self {
        Self {
            error: JsonErrorDetail {
                code: e.error_code().to_string(),
                message: e.to_string(),
                exit_code: e.exit_code(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, StashError>;
