//! sr25519: Schnorr signatures over the Ristretto group on Curve25519, as
//! used by the Substrate/Polkadot ecosystem.
//!
//! Signing is transcript-based. A [`SigningContext`] fixes the application
//! domain (Substrate uses `b"substrate"`), [`SigningContext::bytes`] binds
//! the message, and [`SecretKey::sign`]/[`PublicKey::verify`] run the
//! Schnorr protocol over the resulting transcript. Nonces are derived from
//! the transcript, the secret nonce seed, and caller-provided randomness;
//! the RNG bound is `RngCore + CryptoRng`, so a non-cryptographic generator
//! is unrepresentable.
//!
//! Keys expand from 32-byte [`MiniSecretKey`] seeds, in either the uniform
//! mode or the Ed25519-compatible mode, and round-trip through the byte
//! layouts Substrate expects, including the 96-byte "half Ed25519" keypair
//! form. Soft and hard hierarchical derivations live in [`derive`].

// R denotes the commitment point throughout, as in the literature
#![allow(non_snake_case)]

mod errors;
mod scalars;
mod points;
pub mod keys;
pub mod context;
pub mod sign;
pub mod derive;

#[cfg(test)]
mod tests;

pub use crate::errors::{SignatureError, SignatureResult};
pub use crate::keys::{
  ExpansionMode, MiniSecretKey, SecretKey, PublicKey, Keypair, MINI_SECRET_KEY_LENGTH,
  SECRET_KEY_LENGTH, PUBLIC_KEY_LENGTH, KEYPAIR_LENGTH,
};
pub use crate::context::{signing_context, SigningContext, SigningTranscript};
pub use crate::sign::{Signature, SIGNATURE_LENGTH};
pub use crate::derive::{ChainCode, CHAIN_CODE_LENGTH};
