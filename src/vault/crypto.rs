use std::fmt;

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{Result, StashError};
use crate::types::*;

type HmacSha256 = Hmac<Sha256>;

/// AES-256 key length in bytes.
pub const KEY_SIZE: usize = 32;
/// AES-GCM nonce length in bytes (96 bits).
pub const NONCE_SIZE: usize = 12;
/// Argon2 salt length in bytes.
pub const SALT_SIZE: usize = 16;

const RECORD_KEY_INFO: &[u8] = b"stash-vault-records";
const CHECK_KEY_INFO: &[u8] = b"stash-vault-check";

/// Symmetric key that authorizes encrypt/decrypt of vault records.
///
/// Only ever lives in process memory; the bytes are wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct VaultKey([u8; KEY_SIZE]);

impl VaultKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Build a key from raw material, rejecting anything that isn't exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(StashError::InvalidKey(format!(
                "expected {} bytes of key material, got {}",
                KEY_SIZE,
                bytes.len()
            )));
        }
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    /// Generate a random key (used for tests and throwaway sessions).
    pub fn generate() -> Result<Self> {
        Ok(Self(random_bytes::<KEY_SIZE>()?))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VaultKey(<redacted>)")
    }
}

/// Ciphertext plus the nonce it was sealed with, both base64 for storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    pub ciphertext: String,
    pub iv: String,
}

/// Argon2id cost parameters recorded in the vault header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KdfParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Fill a fixed-size array from the OS random source.
pub fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| StashError::CryptoUnavailable(e.to_string()))?;
    Ok(bytes)
}

/// Encrypt a plaintext record with AES-256-GCM under a fresh random nonce.
pub fn encrypt(key: &VaultKey, plaintext: &str) -> Result<EncryptedEnvelope> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| StashError::InvalidKey(e.to_string()))?;

    let nonce_bytes = random_bytes::<NONCE_SIZE>()?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
        .map_err(|e| StashError::Encryption(e.to_string()))?;

    Ok(EncryptedEnvelope {
        ciphertext: STANDARD.encode(ciphertext),
        iv: STANDARD.encode(nonce_bytes),
    })
}

/// Decrypt an envelope. Any mismatch between key, nonce and ciphertext fails closed.
pub fn decrypt(key: &VaultKey, envelope: &EncryptedEnvelope) -> Result<String> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| StashError::InvalidKey(e.to_string()))?;

    let nonce_bytes = STANDARD
        .decode(&envelope.iv)
        .map_err(|_| StashError::DecryptionFailed)?;
    if nonce_bytes.len() != NONCE_SIZE {
        return Err(StashError::DecryptionFailed);
    }
    let ciphertext = STANDARD
        .decode(&envelope.ciphertext)
        .map_err(|_| StashError::DecryptionFailed)?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_slice())
        .map_err(|_| StashError::DecryptionFailed)?;

    String::from_utf8(plaintext).map_err(|e| {
        let mut bytes = e.into_bytes();
        bytes.zeroize();
        StashError::DecryptionFailed
    })
}

/// Stretch a passphrase into 32 bytes of master material with Argon2id.
pub fn derive_master_key(
    passphrase: &str,
    salt: &[u8],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; KEY_SIZE]>> {
    let argon_params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(KEY_SIZE),
    )
    .map_err(|e| StashError::Other(format!("Invalid Argon2 parameters: {}", e)))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);

    let mut master = Zeroizing::new([0u8; KEY_SIZE]);
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, &mut master[..])
        .map_err(|e| StashError::Other(format!("Key derivation failed: {}", e)))?;
    Ok(master)
}

/// Derive a sub-key using HKDF-SHA256.
pub fn expand_key(master: &[u8], info: &[u8], output_len: usize) -> Result<Zeroizing<Vec<u8>>> {
    let hk = Hkdf::<Sha256>::new(None, master);
    let mut okm = Zeroizing::new(vec![0u8; output_len]);
    hk.expand(info, &mut okm[..])
        .map_err(|e| StashError::Other(format!("HKDF output length too large: {}", e)))?;
    Ok(okm)
}

/// HMAC over the salt, stored in the vault header so unlock can detect a wrong passphrase.
pub fn key_check(check_key: &[u8], salt: &[u8]) -> Result<String> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(check_key)
        .map_err(|e| StashError::InvalidKey(e.to_string()))?;
    mac.update(salt);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time comparison of two key-check values.
pub fn verify_key_check(expected: &str, actual: &str) -> bool {
    expected.as_bytes().ct_eq(actual.as_bytes()).into()
}

/// Run the whole unlock derivation: returns the record key and its key-check value.
pub fn derive_vault_keys(
    passphrase: &str,
    salt: &[u8],
    params: &KdfParams,
) -> Result<(VaultKey, String)> {
    let master = derive_master_key(passphrase, salt, params)?;
    let record_key = expand_key(&master[..], RECORD_KEY_INFO, KEY_SIZE)?;
    let check_key = expand_key(&master[..], CHECK_KEY_INFO, KEY_SIZE)?;
    let check = key_check(&check_key[..], salt)?;
    Ok((VaultKey::from_slice(&record_key)?, check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn cheap_params() -> KdfParams {
        KdfParams {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        }
    }

    fn flip_first_byte(b64: &str) -> String {
        let mut bytes = STANDARD.decode(b64).unwrap();
        bytes[0] ^= 0x01;
        STANDARD.encode(bytes)
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = VaultKey::generate().unwrap();
        let plaintext = r#"{"service":"github","username":"octo","password":"hunter2"}"#;

        let envelope = encrypt(&key, plaintext).unwrap();
        assert_ne!(envelope.ciphertext, plaintext);

        let decrypted = decrypt(&key, &envelope).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_roundtrip_empty_and_unicode() {
        let key = VaultKey::generate().unwrap();
        for plaintext in ["", "pässwörd 🔑 密码"] {
            let envelope = encrypt(&key, plaintext).unwrap();
            assert_eq!(decrypt(&key, &envelope).unwrap(), plaintext);
        }
    }

    #[test]
    fn test_nonce_freshness() {
        let key = VaultKey::generate().unwrap();
        let mut seen = HashSet::new();
        for _ in 0..500 {
            let envelope = encrypt(&key, "same plaintext").unwrap();
            assert!(seen.insert(envelope.iv.clone()), "iv repeated");
        }
    }

    #[test]
    fn test_same_plaintext_different_ciphertext() {
        let key = VaultKey::generate().unwrap();
        let a = encrypt(&key, "secret").unwrap();
        let b = encrypt(&key, "secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = VaultKey::generate().unwrap();
        let mut envelope = encrypt(&key, "secret data").unwrap();
        envelope.ciphertext = flip_first_byte(&envelope.ciphertext);

        assert!(matches!(
            decrypt(&key, &envelope),
            Err(StashError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_tampered_iv_fails() {
        let key = VaultKey::generate().unwrap();
        let mut envelope = encrypt(&key, "secret data").unwrap();
        envelope.iv = flip_first_byte(&envelope.iv);

        assert!(matches!(
            decrypt(&key, &envelope),
            Err(StashError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_wrong_key_fails() {
        let key1 = VaultKey::generate().unwrap();
        let key2 = VaultKey::generate().unwrap();
        let envelope = encrypt(&key1, "secret data").unwrap();

        assert!(matches!(
            decrypt(&key2, &envelope),
            Err(StashError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_swapped_iv_fails() {
        let key = VaultKey::generate().unwrap();
        let a = encrypt(&key, "first").unwrap();
        let b = encrypt(&key, "second").unwrap();
        let mixed = EncryptedEnvelope {
            ciphertext: a.ciphertext,
            iv: b.iv,
        };
        assert!(matches!(
            decrypt(&key, &mixed),
            Err(StashError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_garbage_encoding_fails() {
        let key = VaultKey::generate().unwrap();
        let envelope = EncryptedEnvelope {
            ciphertext: "not base64!!".into(),
            iv: "also not".into(),
        };
        assert!(matches!(
            decrypt(&key, &envelope),
            Err(StashError::DecryptionFailed)
        ));

        let short_iv = EncryptedEnvelope {
            ciphertext: STANDARD.encode([0u8; 32]),
            iv: STANDARD.encode([0u8; 4]),
        };
        assert!(matches!(
            decrypt(&key, &short_iv),
            Err(StashError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_invalid_key_length() {
        let err = VaultKey::from_slice(&[0u8; 16]).unwrap_err();
        assert!(matches!(err, StashError::InvalidKey(_)));
        assert!(VaultKey::from_slice(&[7u8; KEY_SIZE]).is_ok());
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = VaultKey::from_bytes([0xAB; KEY_SIZE]);
        let rendered = format!("{:?}", key);
        assert!(!rendered.contains("171"));
        assert!(rendered.contains("redacted"));
    }

    #[test]
    fn test_derive_vault_keys_deterministic() {
        let salt = [9u8; SALT_SIZE];
        let (k1, c1) = derive_vault_keys("correct horse", &salt, &cheap_params()).unwrap();
        let (k2, c2) = derive_vault_keys("correct horse", &salt, &cheap_params()).unwrap();
        assert_eq!(k1.as_bytes(), k2.as_bytes());
        assert!(verify_key_check(&c1, &c2));

        let (k3, c3) = derive_vault_keys("wrong horse", &salt, &cheap_params()).unwrap();
        assert_ne!(k1.as_bytes(), k3.as_bytes());
        assert!(!verify_key_check(&c1, &c3));
    }

    #[test]
    fn test_key_check_is_hmac_sha256() {
        // RFC 4231, test case 2.
        let check = key_check(b"Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(
            check,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_record_key_differs_from_check_key() {
        let salt = [1u8; SALT_SIZE];
        let master = derive_master_key("pw", &salt, &cheap_params()).unwrap();
        let a = expand_key(&master[..], RECORD_KEY_INFO, KEY_SIZE).unwrap();
        let b = expand_key(&master[..], CHECK_KEY_INFO, KEY_SIZE).unwrap();
        assert_ne!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn test_invalid_kdf_params_rejected() {
        let params = KdfParams {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        };
        assert!(derive_master_key("pw", &[0u8; SALT_SIZE], &params).is_err());
    }
}
