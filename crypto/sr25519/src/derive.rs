//! Hierarchical deterministic key derivation.
//!
//! Soft derivations preserve the public-key homomorphism: deriving from a
//! public key yields the public key of the derivation from the secret key,
//! so watch-only wallets can derive addresses. Hard derivations hash the
//! secret scalar into a fresh [`MiniSecretKey`], severing that link.

use rand_core::{RngCore, CryptoRng};

use ristretto::{Scalar, RISTRETTO_BASEPOINT_TABLE};
use transcript::Transcript;

use crate::{
  context::SigningTranscript,
  keys::{MiniSecretKey, SecretKey, PublicKey},
};

/// The length of a chain code.
pub const CHAIN_CODE_LENGTH: usize = 32;

/// An opaque 32-byte value threading derivation paths together.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ChainCode(pub [u8; CHAIN_CODE_LENGTH]);

fn derivation_transcript(index: &[u8]) -> Transcript {
  let mut t = Transcript::new(b"SchnorrRistrettoHDKD");
  t.append_message(b"sign-bytes", index);
  t
}

impl PublicKey {
  // The shared core of soft derivation: commit the chain code and public
  // key, then draw the scalar offset and the child chain code.
  pub(crate) fn derive_scalar_and_chaincode<T: SigningTranscript>(
    &self,
    t: &mut T,
    cc: ChainCode,
  ) -> (Scalar, ChainCode) {
    t.commit_bytes(b"chain-code", &cc.0);
    t.commit_point(b"public-key", self.as_compressed());

    let scalar = t.challenge_scalar(b"HDKD-scalar");

    let mut chaincode = [0; CHAIN_CODE_LENGTH];
    t.challenge_bytes(b"HDKD-chaincode", &mut chaincode);

    (scalar, ChainCode(chaincode))
  }

  /// Soft-derive a child public key under `cc` at `index`.
  ///
  /// Matches [`SecretKey::derived_key_simple`]: the result equals the
  /// public key of the secret derivation with the same inputs.
  pub fn derived_key_simple<B: AsRef<[u8]>>(
    &self,
    cc: ChainCode,
    index: B,
  ) -> (PublicKey, ChainCode) {
    let mut t = derivation_transcript(index.as_ref());
    let (scalar, chaincode) = self.derive_scalar_and_chaincode(&mut t, cc);
    let point = self.as_point() + (&scalar * &*RISTRETTO_BASEPOINT_TABLE);
    (PublicKey::from_point(point), chaincode)
  }
}

impl SecretKey {
  /// Soft-derive a child secret key over an explicit transcript.
  ///
  /// The child nonce seed is drawn from the transcript RNG keyed with this
  /// key's nonce seed and scalar.
  pub fn derived_key<T: SigningTranscript, R: RngCore + CryptoRng>(
    &self,
    t: &mut T,
    cc: ChainCode,
    rng: &mut R,
  ) -> (SecretKey, ChainCode) {
    let (scalar, chaincode) = self.to_public().derive_scalar_and_chaincode(t, cc);

    let mut nonce = [0; 32];
    t.witness_bytes_rng(b"HDKD-nonce", &mut nonce, &[&self.nonce, &self.key.to_bytes()], rng);

    (SecretKey { key: self.key + scalar, nonce }, chaincode)
  }

  /// Soft-derive a child secret key under `cc` at `index`.
  pub fn derived_key_simple<B: AsRef<[u8]>, R: RngCore + CryptoRng>(
    &self,
    cc: ChainCode,
    index: B,
    rng: &mut R,
  ) -> (SecretKey, ChainCode) {
    let mut t = derivation_transcript(index.as_ref());
    self.derived_key(&mut t, cc, rng)
  }

  /// Hard-derive a child mini secret under `cc` at `index`.
  ///
  /// The child is a fresh seed with no homomorphic relation to this key;
  /// expand it in Ed25519 mode, as Substrate does.
  pub fn hard_derive_mini_secret_key<B: AsRef<[u8]>>(
    &self,
    cc: Option<ChainCode>,
    index: B,
  ) -> (MiniSecretKey, ChainCode) {
    let mut t = derivation_transcript(index.as_ref());
    if let Some(cc) = cc {
      t.append_message(b"chain-code", &cc.0);
    }
    t.append_message(b"secret-key", &self.key.to_bytes());

    let mut mini = [0; 32];
    t.challenge_bytes(b"HDKD-hard", &mut mini);

    let mut chaincode = [0; CHAIN_CODE_LENGTH];
    t.challenge_bytes(b"HDKD-chaincode", &mut chaincode);

    (MiniSecretKey(mini), ChainCode(chaincode))
  }
}
