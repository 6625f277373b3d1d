//! Bearer credential for the gist API.
//!
//! The token may be configured in plain text or encrypted at rest with AES-256-GCM:
//! key = SHA-256(passphrase), payload = base64(nonce(12) || ciphertext).

use crate::{ReportError, ReportResult};
use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha2::{Digest, Sha256};

const NONCE_LEN: usize = 12;

/// A secret token. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(**redacted**)")
    }
}

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Pick the configured credential: a plain token wins, otherwise the encrypted token
    /// is decrypted with `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Credential`] when an encrypted token has no key or does not
    /// decrypt.
    pub fn resolve(
        plain: Option<&str>,
        encrypted: Option<&str>,
        key: Option<&str>,
    ) -> ReportResult<Option<Self>> {
        if let Some(plain) = plain.filter(|p| !p.is_empty()) {
            return Ok(Some(Self::new(plain)));
        }
        match (encrypted.filter(|e| !e.is_empty()), key) {
            (Some(encrypted), Some(key)) => Self::decrypt(encrypted, key).map(Some),
            (Some(_), None) => Err(ReportError::Credential(
                "encrypted token configured without a key".into(),
            )),
            (None, _) => Ok(None),
        }
    }

    /// Decrypt a base64 `nonce || ciphertext` payload.
    pub fn decrypt(encoded: &str, passphrase: &str) -> ReportResult<Self> {
        let payload = STANDARD
            .decode(encoded.trim())
            .map_err(|err| ReportError::Credential(format!("token is not base64: {err}")))?;
        if payload.len() <= NONCE_LEN {
            return Err(ReportError::Credential("encrypted token is too short".into()));
        }

        let (nonce_bytes, ciphertext) = payload.split_at(NONCE_LEN);
        let cipher = Aes256Gcm::new(&derive_key(passphrase));
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| ReportError::Credential("failed to decrypt token, wrong key?".into()))?;
        let secret = String::from_utf8(plaintext)
            .map_err(|_| ReportError::Credential("decrypted token is not UTF-8".into()))?;

        tracing::debug!("decrypted report store token");
        Ok(Self(secret))
    }

    /// Encrypt a token for storage in configuration.
    pub fn encrypt(secret: &str, passphrase: &str) -> ReportResult<String> {
        let cipher = Aes256Gcm::new(&derive_key(passphrase));
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, secret.as_bytes())
            .map_err(|err| ReportError::Credential(format!("encryption failed: {err}")))?;

        let mut payload = nonce.to_vec();
        payload.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(payload))
    }
}

fn derive_key(passphrase: &str) -> Key<Aes256Gcm> {
    let digest = Sha256::digest(passphrase.as_bytes());
    *Key::<Aes256Gcm>::from_slice(&digest)
}
