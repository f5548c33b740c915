//! AES-256-GCM encryption for secrets stored in the database.
//!
//! Credential blobs and webhook signing secrets are encrypted with a single
//! process-wide 32-byte key, provided hex-encoded via configuration. A random
//! 12-byte nonce is prepended to each ciphertext and the result is base64
//! encoded for storage in a text column.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::Rng;
use thiserror::Error;

/// 12-byte nonce size for AES-GCM
const NONCE_SIZE: usize = 12;

/// Errors that can occur during encryption/decryption operations
#[derive(Debug, Error)]
pub enum EncryptionError {
    #[error("Invalid encryption key: must be 32 bytes (64 hex characters)")]
    InvalidKey,

    #[error("Failed to decode hex key: {0}")]
    HexDecodeError(#[from] hex::FromHexError),

    #[error("Failed to decode base64 ciphertext: {0}")]
    Base64DecodeError(#[from] base64::DecodeError),

    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Decryption failed - data may be corrupted or key is incorrect")]
    DecryptionFailed,

    #[error("Ciphertext too short - missing nonce")]
    CiphertextTooShort,

    #[error("No encryption key configured")]
    NoKeyConfigured,
}

/// A parsed process-wide encryption key. Parse once, reuse for every blob.
#[derive(Clone)]
pub struct CredentialCipher {
    key: [u8; 32],
}

impl CredentialCipher {
    /// Parses a hex-encoded 32-byte key (64 hex characters).
    pub fn from_hex(key_hex: &str) -> Result<Self, EncryptionError> {
        let bytes = hex::decode(key_hex)?;
        if bytes.len() != 32 {
            return Err(EncryptionError::InvalidKey);
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes);
        Ok(Self { key })
    }

    /// Encrypts arbitrary bytes, returning base64 of nonce + ciphertext.
    pub fn encrypt_bytes(&self, plaintext: &[u8]) -> Result<String, EncryptionError> {
        let cipher =
            Aes256Gcm::new_from_slice(&self.key).map_err(|_| EncryptionError::InvalidKey)?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| EncryptionError::EncryptionFailed)?;

        let mut combined = nonce_bytes.to_vec();
        combined.extend(ciphertext);

        Ok(BASE64.encode(combined))
    }

    /// Decrypts a base64 ciphertext produced by `encrypt_bytes`.
    pub fn decrypt_bytes(&self, ciphertext_b64: &str) -> Result<Vec<u8>, EncryptionError> {
        let cipher =
            Aes256Gcm::new_from_slice(&self.key).map_err(|_| EncryptionError::InvalidKey)?;

        let combined = BASE64.decode(ciphertext_b64)?;
        if combined.len() < NONCE_SIZE {
            return Err(EncryptionError::CiphertextTooShort);
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| EncryptionError::DecryptionFailed)
    }

    /// Serializes a JSON value and encrypts it.
    pub fn encrypt_json(&self, value: &serde_json::Value) -> Result<String, EncryptionError> {
        let json_data =
            serde_json::to_vec(value).map_err(|_| EncryptionError::EncryptionFailed)?;
        self.encrypt_bytes(&json_data)
    }

    /// Decrypts a ciphertext and parses it back into a JSON value.
    pub fn decrypt_json(&self, ciphertext_b64: &str) -> Result<serde_json::Value, EncryptionError> {
        let plaintext = self.decrypt_bytes(ciphertext_b64)?;
        serde_json::from_slice(&plaintext).map_err(|_| EncryptionError::DecryptionFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // Test key: 32 bytes = 64 hex characters
    const TEST_KEY: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn cipher() -> CredentialCipher {
        CredentialCipher::from_hex(TEST_KEY).expect("test key should parse")
    }

    #[test]
    fn bytes_roundtrip() {
        let plaintext = b"my-secret-api-key-12345";
        let encrypted = cipher().encrypt_bytes(plaintext).unwrap();
        assert_ne!(encrypted.as_bytes(), plaintext.as_slice());

        let decrypted = cipher().decrypt_bytes(&encrypted).unwrap();
        assert_eq!(decrypted, plaintext.to_vec());
    }

    #[test]
    fn json_roundtrips_bit_for_bit() {
        let credentials = json!({
            "api_key": "dg_0123456789",
            "region": "eu",
            "nested": {"flag": true, "count": 3}
        });
        let encrypted = cipher().encrypt_json(&credentials).unwrap();
        let decrypted = cipher().decrypt_json(&encrypted).unwrap();
        assert_eq!(decrypted, credentials);
    }

    #[test]
    fn random_nonce_produces_different_ciphertexts() {
        let encrypted1 = cipher().encrypt_bytes(b"same plaintext").unwrap();
        let encrypted2 = cipher().encrypt_bytes(b"same plaintext").unwrap();
        assert_ne!(encrypted1, encrypted2);

        assert_eq!(
            cipher().decrypt_bytes(&encrypted1).unwrap(),
            b"same plaintext".to_vec()
        );
        assert_eq!(
            cipher().decrypt_bytes(&encrypted2).unwrap(),
            b"same plaintext".to_vec()
        );
    }

    #[test]
    fn invalid_key_length_is_rejected() {
        assert!(matches!(
            CredentialCipher::from_hex("abcd"),
            Err(EncryptionError::InvalidKey)
        ));
        assert!(matches!(
            CredentialCipher::from_hex("not hex at all"),
            Err(EncryptionError::HexDecodeError(_))
        ));
    }

    #[test]
    fn wrong_key_fails_decryption() {
        let encrypted = cipher().encrypt_bytes(b"secret").unwrap();

        let wrong_key = "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";
        let wrong_cipher = CredentialCipher::from_hex(wrong_key).unwrap();
        assert!(matches!(
            wrong_cipher.decrypt_bytes(&encrypted),
            Err(EncryptionError::DecryptionFailed)
        ));
    }

    #[test]
    fn corrupted_ciphertext_fails() {
        assert!(matches!(
            cipher().decrypt_bytes("not_valid_base64!!!"),
            Err(EncryptionError::Base64DecodeError(_))
        ));
    }

    #[test]
    fn ciphertext_too_short_is_detected() {
        // Valid base64 but too short to contain a nonce
        assert!(matches!(
            cipher().decrypt_bytes("YWJj"),
            Err(EncryptionError::CiphertextTooShort)
        ));
    }
}
