use std::fmt;

use aes_gcm::aead::OsRng;
use aes_gcm::{Aes256Gcm, KeyInit};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::SealError;

/// Length of the symmetric key in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Symmetric key material for the sealed argument codec.
///
/// One key per deployment, shared by every process that seals or unseals
/// references; rotation happens out of band. The material is zeroized on
/// drop and never appears in `Debug` output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SealKey([u8; KEY_LEN]);

impl SealKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Decode a key from standard base64, as handed over by the deployment's
    /// key-management collaborator.
    pub fn from_base64(encoded: &str) -> Result<Self, SealError> {
        let raw = BASE64
            .decode(encoded)
            .map_err(|e| SealError::Key(format!("base64 decoding failed: {e}")))?;
        let bytes: [u8; KEY_LEN] = raw.try_into().map_err(|raw: Vec<u8>| {
            SealError::Key(format!("expected {KEY_LEN} bytes, got {}", raw.len()))
        })?;
        Ok(Self(bytes))
    }

    /// Generate a fresh random key from the operating system RNG.
    pub fn generate() -> Self {
        Self(Aes256Gcm::generate_key(&mut OsRng).into())
    }

    /// Encode the key as standard base64 for hand-off to configuration.
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.0)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for SealKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Key material must never reach logs.
        f.write_str("SealKey(..)")
    }
}
