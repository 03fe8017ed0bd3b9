//! Signing contexts and the transcript abstraction the protocol runs over.

use rand_core::{RngCore, CryptoRng};

use zeroize::Zeroize;

use ristretto::{CompressedRistretto, Scalar};
use transcript::Transcript;

/// The transcript operations Schnorr signing requires.
///
/// [`Transcript`] is the implementation; the trait exists so protocols
/// embedding a signature inside a larger transcript can supply their own
/// state.
pub trait SigningTranscript {
  /// Absorb a labeled message.
  fn commit_bytes(&mut self, label: &'static [u8], bytes: &[u8]);

  /// Absorb the protocol name.
  fn proto_name(&mut self, label: &'static [u8]) {
    self.commit_bytes(b"proto-name", label);
  }

  /// Absorb a compressed point.
  fn commit_point(&mut self, label: &'static [u8], compressed: &CompressedRistretto) {
    self.commit_bytes(label, compressed.as_bytes());
  }

  /// Squeeze labeled challenge bytes.
  fn challenge_bytes(&mut self, label: &'static [u8], dest: &mut [u8]);

  /// Squeeze the public challenge scalar, by wide reduction of 64 bytes.
  fn challenge_scalar(&mut self, label: &'static [u8]) -> Scalar {
    let mut buf = [0; 64];
    self.challenge_bytes(label, &mut buf);
    Scalar::from_bytes_mod_order_wide(&buf)
  }

  /// Derive secret witness bytes bound to the transcript state, the given
  /// nonce seeds, and 32 bytes drawn from `rng`.
  fn witness_bytes_rng<R: RngCore + CryptoRng>(
    &self,
    label: &'static [u8],
    dest: &mut [u8],
    nonce_seeds: &[&[u8]],
    rng: &mut R,
  );

  /// Derive a secret witness scalar, by wide reduction of 64 witness bytes.
  fn witness_scalar_rng<R: RngCore + CryptoRng>(
    &self,
    label: &'static [u8],
    nonce_seeds: &[&[u8]],
    rng: &mut R,
  ) -> Scalar {
    let mut buf = [0; 64];
    self.witness_bytes_rng(label, &mut buf, nonce_seeds, rng);
    let scalar = Scalar::from_bytes_mod_order_wide(&buf);
    buf.zeroize();
    scalar
  }
}

impl<T: SigningTranscript + ?Sized> SigningTranscript for &mut T {
  fn commit_bytes(&mut self, label: &'static [u8], bytes: &[u8]) {
    (**self).commit_bytes(label, bytes)
  }

  fn challenge_bytes(&mut self, label: &'static [u8], dest: &mut [u8]) {
    (**self).challenge_bytes(label, dest)
  }

  fn witness_bytes_rng<R: RngCore + CryptoRng>(
    &self,
    label: &'static [u8],
    dest: &mut [u8],
    nonce_seeds: &[&[u8]],
    rng: &mut R,
  ) {
    (**self).witness_bytes_rng(label, dest, nonce_seeds, rng)
  }
}

impl SigningTranscript for Transcript {
  fn commit_bytes(&mut self, label: &'static [u8], bytes: &[u8]) {
    self.append_message(label, bytes);
  }

  fn challenge_bytes(&mut self, label: &'static [u8], dest: &mut [u8]) {
    Transcript::challenge_bytes(self, label, dest);
  }

  fn witness_bytes_rng<R: RngCore + CryptoRng>(
    &self,
    label: &'static [u8],
    dest: &mut [u8],
    nonce_seeds: &[&[u8]],
    rng: &mut R,
  ) {
    let mut br = self.build_rng();
    for ns in nonce_seeds {
      br = br.rekey_with_witness_bytes(label, ns);
    }
    br.finalize(rng).fill_bytes(dest)
  }
}

/// A per-application signing domain.
///
/// Signatures made under distinct contexts never verify against each other.
/// Substrate's context is `b"substrate"`; keep one `SigningContext` per role
/// a signature plays in a protocol.
#[derive(Clone)]
pub struct SigningContext(Transcript);

/// Shorthand for [`SigningContext::new`].
pub fn signing_context(context: &[u8]) -> SigningContext {
  SigningContext::new(context)
}

impl SigningContext {
  /// Initialize a signing context from an application label.
  pub fn new(context: &[u8]) -> SigningContext {
    let mut t = Transcript::new(b"SigningContext");
    t.append_message(b"", context);
    SigningContext(t)
  }

  /// The transcript construction of releases before 0.8.5, which used the
  /// context directly as the protocol label.
  ///
  /// Not wire-compatible with Substrate. Only for verifying signatures made
  /// by those old releases; never sign new data with this.
  #[deprecated(note = "pre-0.8.5 wire format; use SigningContext::new")]
  pub fn legacy(context: &'static [u8]) -> SigningContext {
    SigningContext(Transcript::new(context))
  }

  /// A transcript for signing a byte-string message under this context.
  pub fn bytes(&self, bytes: &[u8]) -> Transcript {
    let mut t = self.0.clone();
    t.append_message(b"sign-bytes", bytes);
    t
  }
}
