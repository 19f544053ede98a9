/// Error type for sealing and unsealing bound arguments.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SealError {
    /// The payload failed authentication.
    ///
    /// Covers a tampered nonce/ciphertext, an action id different from the
    /// one the payload was sealed for, and decryption under the wrong key.
    /// The message is identical for all of these cases so a caller on the
    /// untrusted side of the boundary cannot distinguish them.
    #[error("sealed payload failed authentication")]
    Integrity,

    /// The payload structure or the authenticated plaintext could not be
    /// decoded.
    ///
    /// For plaintext failures this fires only after the integrity check has
    /// already passed, so it indicates a protocol violation rather than an
    /// attack.
    #[error("malformed sealed payload: {0}")]
    Malformed(String),

    /// Key material was rejected before any cryptographic operation ran.
    #[error("invalid key material: {0}")]
    Key(String),
}

impl SealError {
    /// Returns `true` for authentication failures.
    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::Integrity)
    }

    /// Returns `true` for structural decoding failures.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }
}
