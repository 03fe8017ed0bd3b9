//! Schnorr signing and verification over a transcript.

use rand_core::{RngCore, CryptoRng};

use zeroize::Zeroize;

use ristretto::{CompressedRistretto, RistrettoPoint, Scalar, RISTRETTO_BASEPOINT_TABLE};

use crate::{
  errors::{SignatureError, SignatureResult},
  context::{SigningContext, SigningTranscript},
  keys::{SecretKey, PublicKey, Keypair},
};

/// The length of a serialized signature.
pub const SIGNATURE_LENGTH: usize = 64;

/// An sr25519 signature: a commitment point `R` and a response scalar `s`.
///
/// The serialized form sets the top bit of the final byte, marking the
/// signature as sr25519 rather than Ed25519; decoding requires that marker.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Signature {
  pub(crate) R: CompressedRistretto,
  pub(crate) s: Scalar,
}

// Scalars decoded from signatures must be canonical. Values with the four
// top bits clear are necessarily below l and skip the full check.
fn check_scalar(bytes: [u8; 32]) -> SignatureResult<Scalar> {
  if bytes[31] & 0b1111_0000 == 0 {
    return Ok(Scalar::from_bits(bytes));
  }
  Option::from(Scalar::from_canonical_bytes(bytes)).ok_or(SignatureError::ScalarFormat)
}

impl Signature {
  /// Serialize as `R || s`, with the sr25519 marker bit set.
  pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
    let mut bytes = [0; SIGNATURE_LENGTH];
    bytes[.. 32].copy_from_slice(self.R.as_bytes());
    bytes[32 ..].copy_from_slice(&self.s.to_bytes());
    bytes[63] |= 128;
    bytes
  }

  /// Deserialize a signature, requiring the sr25519 marker bit.
  pub fn from_bytes(bytes: &[u8]) -> SignatureResult<Signature> {
    if bytes.len() != SIGNATURE_LENGTH {
      Err(SignatureError::BytesLength { name: "Signature", length: SIGNATURE_LENGTH })?
    }

    let mut upper: [u8; 32] = bytes[32 ..].try_into().unwrap();
    if upper[31] & 128 == 0 {
      Err(SignatureError::NotMarkedSr25519)?
    }
    upper[31] &= 127;

    Ok(Signature {
      R: CompressedRistretto(bytes[.. 32].try_into().unwrap()),
      s: check_scalar(upper)?,
    })
  }
}

impl SecretKey {
  /// Sign a transcript.
  ///
  /// The witness scalar is drawn from the transcript keyed with the secret
  /// nonce seed and 32 bytes from `rng`, so a deterministic `rng` still
  /// yields unique nonces per transcript.
  pub fn sign<T: SigningTranscript, R: RngCore + CryptoRng>(
    &self,
    mut t: T,
    public_key: &PublicKey,
    rng: &mut R,
  ) -> Signature {
    t.proto_name(b"Schnorr-sig");
    t.commit_point(b"sign:pk", public_key.as_compressed());

    let mut r = t.witness_scalar_rng(b"signing", &[&self.nonce], rng);
    let R = (&r * &*RISTRETTO_BASEPOINT_TABLE).compress();
    t.commit_point(b"sign:R", &R);

    let k = t.challenge_scalar(b"sign:c");
    let s = (k * self.key) + r;
    r.zeroize();

    Signature { R, s }
  }
}

impl PublicKey {
  /// Verify a signature over a transcript.
  ///
  /// Rebuilds the challenge and checks `s B - k A == R` with a
  /// variable-time double-scalar multiplication; the inputs are all public.
  #[must_use]
  pub fn verify<T: SigningTranscript>(&self, mut t: T, signature: &Signature) -> bool {
    t.proto_name(b"Schnorr-sig");
    t.commit_point(b"sign:pk", self.as_compressed());
    t.commit_point(b"sign:R", &signature.R);

    let k = t.challenge_scalar(b"sign:c");
    let R =
      RistrettoPoint::vartime_double_scalar_mul_basepoint(&k, &-self.as_point(), &signature.s);

    R.compress() == signature.R
  }

  /// Verify a signature on a message under a context label.
  #[must_use]
  pub fn verify_simple(&self, context: &[u8], message: &[u8], signature: &Signature) -> bool {
    self.verify(SigningContext::new(context).bytes(message), signature)
  }
}

impl Keypair {
  /// Sign a transcript. See [`SecretKey::sign`].
  pub fn sign<T: SigningTranscript, R: RngCore + CryptoRng>(
    &self,
    t: T,
    rng: &mut R,
  ) -> Signature {
    self.secret.sign(t, &self.public, rng)
  }

  /// Sign a message under a context label.
  pub fn sign_simple<R: RngCore + CryptoRng>(
    &self,
    context: &[u8],
    message: &[u8],
    rng: &mut R,
  ) -> Signature {
    self.sign(SigningContext::new(context).bytes(message), rng)
  }

  /// Verify a signature over a transcript.
  #[must_use]
  pub fn verify<T: SigningTranscript>(&self, t: T, signature: &Signature) -> bool {
    self.public.verify(t, signature)
  }

  /// Verify a signature on a message under a context label.
  #[must_use]
  pub fn verify_simple(&self, context: &[u8], message: &[u8], signature: &Signature) -> bool {
    self.public.verify_simple(context, message, signature)
  }
}
