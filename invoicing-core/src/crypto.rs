//! Field-level authenticated encryption for tax identifiers.
//!
//! AES-128-GCM over short UTF-8 strings (NIP, PESEL), with a fresh random
//! 12-byte nonce per call and a 128-bit tag.
//! Token format: base64(nonce_12bytes || ciphertext || tag_16bytes).

use aes_gcm::aead::Aead;
use aes_gcm::{Aes128Gcm, KeyInit, Nonce};
use anyhow::anyhow;
use base64::Engine;
use service_core::config::DEFAULT_CRYPTO_SECRET;
use service_core::error::AppError;
use tracing::warn;

const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 16;
const TAG_LEN: usize = 16;

/// Symmetric cipher for sensitive fields stored at rest.
#[derive(Clone)]
pub struct FieldCipher {
    key: [u8; KEY_LEN],
}

impl FieldCipher {
    /// Derive the key by truncating or zero-padding the configured secret to
    /// 16 bytes. Not a KDF; this scheme is kept so ciphertexts written under
    /// the existing key material stay readable. Operators must configure an
    /// explicit secret of at least 16 bytes.
    pub fn from_secret(secret: &str) -> Self {
        if secret == DEFAULT_CRYPTO_SECRET {
            warn!("crypto secret left at its default; set APP__CRYPTO__SECRET in deployment");
        }
        let bytes = secret.as_bytes();
        if bytes.len() < KEY_LEN {
            warn!(
                secret_len = bytes.len(),
                "crypto secret shorter than {} bytes, zero-padded", KEY_LEN
            );
        }
        let mut key = [0u8; KEY_LEN];
        let n = bytes.len().min(KEY_LEN);
        key[..n].copy_from_slice(&bytes[..n]);
        Self { key }
    }

    /// Encrypt a plaintext field into a self-describing token. Two calls
    /// with the same plaintext produce different tokens (nonce freshness).
    pub fn encrypt(&self, plaintext: &str) -> Result<String, AppError> {
        let cipher = Aes128Gcm::new_from_slice(&self.key)
            .map_err(|_| AppError::CryptoFailure(anyhow!("Cannot encrypt")))?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| AppError::CryptoFailure(anyhow!("Cannot encrypt")))?;

        // nonce || ciphertext (includes tag)
        let mut token = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        token.extend_from_slice(&nonce_bytes);
        token.extend_from_slice(&ciphertext);

        Ok(base64::engine::general_purpose::STANDARD.encode(&token))
    }

    /// Decrypt a token produced by [`encrypt`](Self::encrypt). Any failure
    /// (bad base64, truncated token, tag mismatch, wrong key) surfaces as a
    /// single crypto failure; a corrupted ciphertext is never usable.
    pub fn decrypt(&self, token: &str) -> Result<String, AppError> {
        let data = base64::engine::general_purpose::STANDARD
            .decode(token)
            .map_err(|_| AppError::CryptoFailure(anyhow!("Cannot decrypt")))?;

        if data.len() < NONCE_LEN + TAG_LEN {
            return Err(AppError::CryptoFailure(anyhow!("Cannot decrypt")));
        }

        let cipher = Aes128Gcm::new_from_slice(&self.key)
            .map_err(|_| AppError::CryptoFailure(anyhow!("Cannot decrypt")))?;
        let nonce = Nonce::from_slice(&data[..NONCE_LEN]);

        let plaintext = cipher
            .decrypt(nonce, &data[NONCE_LEN..])
            .map_err(|_| AppError::CryptoFailure(anyhow!("Cannot decrypt")))?;

        String::from_utf8(plaintext)
            .map_err(|_| AppError::CryptoFailure(anyhow!("Cannot decrypt")))
    }

    /// `None` passes through untouched.
    pub fn encrypt_opt(&self, plaintext: Option<&str>) -> Result<Option<String>, AppError> {
        plaintext.map(|p| self.encrypt(p)).transpose()
    }

    /// `None` passes through untouched.
    pub fn decrypt_opt(&self, token: Option<&str>) -> Result<Option<String>, AppError> {
        token.map(|t| self.decrypt(t)).transpose()
    }
}
