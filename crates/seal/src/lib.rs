//! # Tether Sealed Argument Codec
//!
//! Authenticated encryption for bound action arguments crossing a trust
//! boundary.
//!
//! A reference to a server-side action carries the argument values that were
//! captured when the reference was built. Those values are visible to the
//! untrusted side while the reference sits inside a UI description, so they
//! are sealed: encrypted with AES-256-GCM and authenticated together with the
//! action id they were sealed for. A payload that has been edited, sealed
//! under a different key, or re-tagged with another action's id fails
//! verification before a single argument value is decoded.
//!
//! ## Core Types
//!
//! - [`SealKey`] — 32-byte symmetric key material, zeroized on drop
//! - [`SealedPayload`] — action id, nonce, and ciphertext (tag included)
//! - [`seal`] / [`unseal`] — the pure transformation pair
//! - [`SealError`] — integrity and decoding failures
//!
//! Sealing is non-deterministic: every call draws a fresh nonce, so sealing
//! the same snapshot twice produces different ciphertexts and payloads cannot
//! be fingerprinted by equality.
//!
//! This crate performs no I/O. Key distribution and rotation belong to the
//! deployment's key-management collaborator; [`SealKey::from_base64`] is the
//! hand-off point.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Integrity, decoding, and key-material failures.
pub mod error;
/// Symmetric key material for the codec.
pub mod key;
/// Seal/unseal transformation and the payload wire format.
pub mod codec;

pub use codec::{FORMAT_VERSION, SealedPayload, seal, unseal};
pub use error::SealError;
pub use key::{KEY_LEN, SealKey};
