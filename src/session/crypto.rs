//! Session blob encryption.
//!
//! AES-256-GCM with a key derived from the static secret by PBKDF2-SHA256.
//! Each blob carries its own salt, IV and iteration count, so the secret is
//! the only thing both sides need to share.

use aes_gcm::aead::{Aead, OsRng, rand_core::RngCore};
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use pbkdf2::pbkdf2_hmac;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;

use crate::error::{AppError, Result};

const ENVELOPE_VERSION: u8 = 1;
const TAG_LEN: usize = 16;
const IV_LEN: usize = 12;

/// Serialized form of an encrypted blob (base64 JSON, then base64 again for storage).
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    v: u8,
    iter: u32,
    salt: String,
    iv: String,
    tag: String,
    data: String,
}

/// Encrypts and decrypts session payloads with a static secret.
#[derive(Clone)]
pub struct SessionCipher {
    secret: String,
    iterations: u32,
}

impl std::fmt::Debug for SessionCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCipher")
            .field("iterations", &self.iterations)
            .finish_non_exhaustive()
    }
}

impl SessionCipher {
    /// Fails when the secret is empty.
    pub fn new(secret: impl Into<String>, iterations: u32) -> Result<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(AppError::config(
                "Session secret is not set (session.secret_key or HRMS_AES_SECRET_KEY)",
            ));
        }
        Ok(Self {
            secret,
            iterations: iterations.max(1),
        })
    }

    /// Serialize `value` to JSON and encrypt it into a storable string.
    pub fn encrypt<T: Serialize>(&self, value: &T) -> Result<String> {
        let plaintext = serde_json::to_vec(value)?;

        let mut salt = [0u8; 16];
        OsRng.fill_bytes(&mut salt);
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);

        let key = derive_key(&self.secret, &salt, self.iterations);
        let cipher = Aes256Gcm::new_from_slice(&key).map_err(|e| AppError::session(e.to_string()))?;
        let encrypted = cipher
            .encrypt(Nonce::from_slice(&iv), plaintext.as_slice())
            .map_err(|e| AppError::session(e.to_string()))?;

        if encrypted.len() < TAG_LEN {
            return Err(AppError::session("Encryption output too short"));
        }
        let (data, tag) = encrypted.split_at(encrypted.len() - TAG_LEN);

        let envelope = Envelope {
            v: ENVELOPE_VERSION,
            iter: self.iterations,
            salt: B64.encode(salt),
            iv: B64.encode(iv),
            tag: B64.encode(tag),
            data: B64.encode(data),
        };
        Ok(B64.encode(serde_json::to_vec(&envelope)?))
    }

    /// Decrypt and deserialize. Wrong key, tampering or garbage all yield `None`.
    pub fn decrypt<T: DeserializeOwned>(&self, blob: &str) -> Option<T> {
        let plaintext = match self.open(blob) {
            Some(bytes) => bytes,
            None => {
                debug!("Session blob could not be decrypted");
                return None;
            }
        };
        match serde_json::from_slice(&plaintext) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Session payload did not parse: {e}");
                None
            }
        }
    }

    fn open(&self, blob: &str) -> Option<Vec<u8>> {
        let raw = B64.decode(blob.trim()).ok()?;
        let envelope: Envelope = serde_json::from_slice(&raw).ok()?;
        if envelope.v != ENVELOPE_VERSION || envelope.iter == 0 {
            return None;
        }

        let salt = B64.decode(&envelope.salt).ok()?;
        let iv = B64.decode(&envelope.iv).ok()?;
        let tag = B64.decode(&envelope.tag).ok()?;
        let data = B64.decode(&envelope.data).ok()?;
        if iv.len() != IV_LEN || tag.len() != TAG_LEN {
            return None;
        }

        let key = derive_key(&self.secret, &salt, envelope.iter);
        let cipher = Aes256Gcm::new_from_slice(&key).ok()?;
        let mut combined = Vec::with_capacity(data.len() + tag.len());
        combined.extend_from_slice(&data);
        combined.extend_from_slice(&tag);

        cipher.decrypt(Nonce::from_slice(&iv), combined.as_slice()).ok()
    }
}

fn derive_key(secret: &str, salt: &[u8], iterations: u32) -> [u8; 32] {
    let mut key = [0u8; 32];
    pbkdf2_hmac::<Sha256>(secret.as_bytes(), salt, iterations, &mut key);
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    fn cipher(secret: &str) -> SessionCipher {
        SessionCipher::new(secret, 1_000).unwrap()
    }

    fn user() -> User {
        User {
            id: 7,
            name: "Meera Shah".to_string(),
            email: "meera@example.com".to_string(),
            mobile: "9876543210".to_string(),
            role: "admin".to_string(),
            company_name: "Acme Textiles".to_string(),
            subscription_end_date: "2026-12-31".to_string(),
        }
    }

    #[test]
    fn test_round_trip() {
        let c = cipher("s3cret");
        let blob = c.encrypt(&user()).unwrap();
        let back: Option<User> = c.decrypt(&blob);
        assert_eq!(back, Some(user()));
    }

    #[test]
    fn test_fresh_salt_per_blob() {
        let c = cipher("s3cret");
        assert_ne!(c.encrypt(&user()).unwrap(), c.encrypt(&user()).unwrap());
    }

    #[test]
    fn test_wrong_key_is_none() {
        let blob = cipher("s3cret").encrypt(&user()).unwrap();
        let back: Option<User> = cipher("other").decrypt(&blob);
        assert_eq!(back, None);
    }

    #[test]
    fn test_garbage_is_none() {
        let c = cipher("s3cret");
        assert_eq!(c.decrypt::<User>(""), None);
        assert_eq!(c.decrypt::<User>("not base64 !!"), None);
        assert_eq!(c.decrypt::<User>(&B64.encode("{\"v\":1}")), None);
    }

    #[test]
    fn test_tampered_blob_is_none() {
        let c = cipher("s3cret");
        let blob = c.encrypt(&user()).unwrap();
        let mut envelope: Envelope = serde_json::from_slice(&B64.decode(&blob).unwrap()).unwrap();
        let mut data = B64.decode(&envelope.data).unwrap();
        data[0] ^= 0xFF;
        envelope.data = B64.encode(data);
        let tampered = B64.encode(serde_json::to_vec(&envelope).unwrap());

        assert_eq!(c.decrypt::<User>(&tampered), None);
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(SessionCipher::new("", 1_000).is_err());
    }
}
