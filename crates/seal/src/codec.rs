use std::fmt;

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::SealError;
use crate::key::SealKey;

/// Wire format version. Bound into the associated data, so payloads from a
/// different version fail authentication rather than being misparsed.
pub const FORMAT_VERSION: u8 = 1;

/// AES-GCM nonce length in bytes.
const NONCE_LEN: usize = 12;

/// An authenticated, encrypted argument snapshot tagged with the id of the
/// action it was sealed for.
///
/// Opaque outside this module: the ciphertext (GCM tag included) can only be
/// interpreted by [`unseal`], and the action id is covered by the
/// authentication tag. The payload and its id always travel together.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedPayload {
    action_id: String,
    #[serde(with = "b64")]
    nonce: Vec<u8>,
    #[serde(with = "b64")]
    ciphertext: Vec<u8>,
}

impl SealedPayload {
    /// The id of the action this payload was sealed for.
    pub fn action_id(&self) -> &str {
        &self.action_id
    }

    /// Pack the payload into a single string token suitable for embedding in
    /// a UI description: `version:action_id:nonce:ciphertext` with the
    /// binary fields base64-encoded.
    pub fn encode(&self) -> String {
        format!(
            "{FORMAT_VERSION}:{}:{}:{}",
            self.action_id,
            BASE64.encode(&self.nonce),
            BASE64.encode(&self.ciphertext),
        )
    }

    /// Parse a token produced by [`SealedPayload::encode`].
    ///
    /// Structural failures here are [`SealError::Malformed`]; nothing is
    /// decrypted or verified until [`unseal`] runs.
    pub fn decode(token: &str) -> Result<Self, SealError> {
        let (version, rest) = token
            .split_once(':')
            .ok_or_else(|| SealError::Malformed("token has no version field".into()))?;
        if version != FORMAT_VERSION.to_string() {
            return Err(SealError::Malformed(format!(
                "unsupported format version `{version}`"
            )));
        }
        // Parse from the right: the two base64 fields cannot contain `:`,
        // while the action id in the middle might.
        let mut fields = rest.rsplitn(3, ':');
        let (Some(ciphertext), Some(nonce), Some(action_id)) =
            (fields.next(), fields.next(), fields.next())
        else {
            return Err(SealError::Malformed("token must have four fields".into()));
        };
        let nonce = BASE64
            .decode(nonce)
            .map_err(|e| SealError::Malformed(format!("nonce field: {e}")))?;
        let ciphertext = BASE64
            .decode(ciphertext)
            .map_err(|e| SealError::Malformed(format!("ciphertext field: {e}")))?;
        Ok(Self {
            action_id: action_id.to_owned(),
            nonce,
            ciphertext,
        })
    }
}

impl fmt::Debug for SealedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SealedPayload")
            .field("action_id", &self.action_id)
            .field("ciphertext_len", &self.ciphertext.len())
            .finish_non_exhaustive()
    }
}

/// Seal a captured-argument snapshot for one action.
///
/// The snapshot is serialized as a JSON array and encrypted with a fresh
/// random nonce, so two seals of the same snapshot never produce the same
/// ciphertext. The action id and [`FORMAT_VERSION`] go into the associated
/// data: a payload sealed for one action can never verify under another
/// action's id.
pub fn seal(action_id: &str, args: &[Value], key: &SealKey) -> Result<SealedPayload, SealError> {
    let plaintext = serde_json::to_vec(args)
        .map_err(|e| SealError::Malformed(format!("snapshot serialization: {e}")))?;
    seal_bytes(action_id, &plaintext, key)
}

/// Restore the argument snapshot from a sealed payload.
///
/// Authentication is verified before the plaintext is interpreted: a bad tag
/// (tamper, id swap, or wrong key) is [`SealError::Integrity`] and no values
/// are restored. Plaintext that authenticates but is not a JSON array is
/// [`SealError::Malformed`].
pub fn unseal(payload: &SealedPayload, key: &SealKey) -> Result<Vec<Value>, SealError> {
    if payload.nonce.len() != NONCE_LEN {
        return Err(SealError::Malformed(format!(
            "nonce must be {NONCE_LEN} bytes, got {}",
            payload.nonce.len()
        )));
    }
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let aad = associated_data(&payload.action_id);
    let plaintext = cipher
        .decrypt(
            Nonce::from_slice(&payload.nonce),
            Payload {
                msg: &payload.ciphertext,
                aad: &aad,
            },
        )
        .map_err(|_| {
            warn!(action_id = %payload.action_id, "rejected sealed payload");
            SealError::Integrity
        })?;
    serde_json::from_slice(&plaintext)
        .map_err(|e| SealError::Malformed(format!("argument list: {e}")))
}

/// Seal raw plaintext bytes. Seam for [`seal`]; kept separate so the decode
/// path of [`unseal`] can be exercised against non-JSON plaintext.
fn seal_bytes(action_id: &str, plaintext: &[u8], key: &SealKey) -> Result<SealedPayload, SealError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let aad = associated_data(action_id);
    let ciphertext = cipher
        .encrypt(
            &nonce,
            Payload {
                msg: plaintext,
                aad: &aad,
            },
        )
        .map_err(|_| SealError::Malformed("plaintext exceeds cipher limits".into()))?;
    debug!(action_id = %action_id, ciphertext_len = ciphertext.len(), "sealed snapshot");
    Ok(SealedPayload {
        action_id: action_id.to_owned(),
        nonce: nonce.to_vec(),
        ciphertext,
    })
}

fn associated_data(action_id: &str) -> Vec<u8> {
    let mut aad = Vec::with_capacity(1 + action_id.len());
    aad.push(FORMAT_VERSION);
    aad.extend_from_slice(action_id.as_bytes());
    aad
}

mod b64 {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(de)?;
        STANDARD.decode(&encoded).map_err(serde::de::Error::custom)
    }
}
