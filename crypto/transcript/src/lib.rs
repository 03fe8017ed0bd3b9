//! Merlin-compatible STROBE-128 transcripts.
//!
//! A [`Transcript`] is an append-only record of a public-coin protocol:
//! absorb labeled messages, squeeze labeled challenges. Every absorption and
//! every squeeze is framed with its label and a little-endian 32-bit length
//! under STROBE's meta flag, regardless of host byte order, so transcripts
//! are unambiguous and wire-identical across platforms.
//!
//! The framing matches Merlin v1.0 exactly; transcripts produced here are
//! interchangeable with Merlin's.
//!
//! Witness data never enters the transcript itself. [`Transcript::build_rng`]
//! clones the state into a builder which is rekeyed with witnesses and
//! external randomness, yielding a [`TranscriptRng`] bound to everything the
//! transcript has seen. Even a weak external RNG cannot produce colliding
//! nonces across distinct transcripts so long as the witness is secret.

use core::fmt::{self, Debug};

use rand_core::{RngCore, CryptoRng};

mod strobe;
use strobe::Strobe128;

#[cfg(test)]
mod tests;

const MERLIN_PROTOCOL_LABEL: &[u8] = b"Merlin v1.0";

fn encode_usize_as_u32(x: usize) -> [u8; 4] {
  u32::try_from(x).expect("message exceeded 2^32 bytes").to_le_bytes()
}

/// A public-coin protocol transcript.
#[derive(Clone)]
pub struct Transcript {
  strobe: Strobe128,
}

// The strobe state isn't meaningfully printable
impl Debug for Transcript {
  fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
    fmt.debug_struct("Transcript").finish_non_exhaustive()
  }
}

impl Transcript {
  /// Begin a transcript under a protocol label.
  ///
  /// The label acts as a domain separator for the entire protocol; distinct
  /// labels yield unrelated challenge streams.
  pub fn new(label: &'static [u8]) -> Transcript {
    let mut transcript = Transcript { strobe: Strobe128::new(MERLIN_PROTOCOL_LABEL) };
    transcript.append_message(b"dom-sep", label);
    transcript
  }

  /// Absorb a labeled message.
  pub fn append_message(&mut self, label: &'static [u8], message: &[u8]) {
    let data_len = encode_usize_as_u32(message.len());
    self.strobe.meta_ad(label, false);
    self.strobe.meta_ad(&data_len, true);
    self.strobe.ad(message, false);
  }

  /// Absorb a labeled `u64`, encoded little-endian.
  pub fn append_u64(&mut self, label: &'static [u8], x: u64) {
    self.append_message(label, &x.to_le_bytes());
  }

  /// Squeeze a labeled challenge, filling `dest`.
  pub fn challenge_bytes(&mut self, label: &'static [u8], dest: &mut [u8]) {
    let data_len = encode_usize_as_u32(dest.len());
    self.strobe.meta_ad(label, false);
    self.strobe.meta_ad(&data_len, true);
    self.strobe.prf(dest, false);
  }

  /// Fork this transcript into an RNG builder, to be rekeyed with witness
  /// data and external entropy.
  ///
  /// The transcript itself is unaffected; the builder operates on a clone.
  pub fn build_rng(&self) -> TranscriptRngBuilder {
    TranscriptRngBuilder { strobe: self.strobe.clone() }
  }
}

/// A [`TranscriptRng`] under construction: absorb witness data, then finalize
/// with external randomness.
pub struct TranscriptRngBuilder {
  strobe: Strobe128,
}

impl TranscriptRngBuilder {
  /// Rekey with a labeled witness. May be called any number of times.
  pub fn rekey_with_witness_bytes(
    mut self,
    label: &'static [u8],
    witness: &[u8],
  ) -> TranscriptRngBuilder {
    let witness_len = encode_usize_as_u32(witness.len());
    self.strobe.meta_ad(label, false);
    self.strobe.meta_ad(&witness_len, true);
    self.strobe.key(witness, false);
    self
  }

  /// Rekey with 32 bytes from an external RNG and produce the finished
  /// [`TranscriptRng`].
  pub fn finalize<R: RngCore + CryptoRng>(mut self, rng: &mut R) -> TranscriptRng {
    let mut random_bytes = [0; 32];
    rng.fill_bytes(&mut random_bytes);

    self.strobe.meta_ad(b"rng", false);
    self.strobe.key(&random_bytes, false);

    TranscriptRng { strobe: self.strobe }
  }
}

/// An RNG bound to a transcript, witness data, and external entropy.
pub struct TranscriptRng {
  strobe: Strobe128,
}

impl RngCore for TranscriptRng {
  fn next_u32(&mut self) -> u32 {
    rand_core::impls::next_u32_via_fill(self)
  }

  fn next_u64(&mut self) -> u64 {
    rand_core::impls::next_u64_via_fill(self)
  }

  fn fill_bytes(&mut self, dest: &mut [u8]) {
    let dest_len = encode_usize_as_u32(dest.len());
    self.strobe.meta_ad(&dest_len, false);
    self.strobe.prf(dest, false);
  }

  fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
    self.fill_bytes(dest);
    Ok(())
  }
}

impl CryptoRng for TranscriptRng {}
