use rand_core::{RngCore, CryptoRng};

use crate::Transcript;

// A fixed-output generator, standing in for external entropy
struct ZeroRng;
impl RngCore for ZeroRng {
  fn next_u32(&mut self) -> u32 {
    0
  }
  fn next_u64(&mut self) -> u64 {
    0
  }
  fn fill_bytes(&mut self, dest: &mut [u8]) {
    dest.fill(0);
  }
  fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
    self.fill_bytes(dest);
    Ok(())
  }
}
impl CryptoRng for ZeroRng {}

#[test]
fn merlin_conformance() {
  // The reference vector from Merlin's own tests
  let mut t = Transcript::new(b"test protocol");
  t.append_message(b"some label", b"some data");

  let mut challenge = [0; 32];
  t.challenge_bytes(b"challenge", &mut challenge);
  assert_eq!(
    hex::encode(challenge),
    "d5a21972d0d5fe320c0d263fac7fffb8145aa640af6e9bca177c03c7efcf0615",
  );
}

#[test]
fn determinism() {
  let transcript = || {
    let mut t = Transcript::new(b"protocol");
    t.append_message(b"label", b"message");
    t
  };

  let mut a = [0; 64];
  let mut b = [0; 64];
  transcript().challenge_bytes(b"challenge", &mut a);
  transcript().challenge_bytes(b"challenge", &mut b);
  assert_eq!(a, b);
}

#[test]
fn labels_and_messages_separate() {
  let mut base = Transcript::new(b"protocol");
  let mut distinct_label = Transcript::new(b"protocol");
  let mut distinct_message = Transcript::new(b"protocol");

  base.append_message(b"a", b"x");
  distinct_label.append_message(b"b", b"x");
  distinct_message.append_message(b"a", b"y");

  let mut challenges = [[0; 32]; 3];
  base.challenge_bytes(b"c", &mut challenges[0]);
  distinct_label.challenge_bytes(b"c", &mut challenges[1]);
  distinct_message.challenge_bytes(b"c", &mut challenges[2]);

  assert!(challenges[0] != challenges[1]);
  assert!(challenges[0] != challenges[2]);
  assert!(challenges[1] != challenges[2]);
}

#[test]
fn append_u64_is_little_endian_message() {
  let mut via_u64 = Transcript::new(b"protocol");
  via_u64.append_u64(b"n", 0x0102_0304_0506_0708);

  let mut via_message = Transcript::new(b"protocol");
  via_message.append_message(b"n", &[8, 7, 6, 5, 4, 3, 2, 1]);

  let mut a = [0; 32];
  let mut b = [0; 32];
  via_u64.challenge_bytes(b"c", &mut a);
  via_message.challenge_bytes(b"c", &mut b);
  assert_eq!(a, b);
}

#[test]
fn clone_independence() {
  let mut t = Transcript::new(b"protocol");
  t.append_message(b"label", b"message");
  let mut fork = t.clone();

  // Identical up to the fork
  let mut a = [0; 32];
  let mut b = [0; 32];
  t.clone().challenge_bytes(b"c", &mut a);
  fork.clone().challenge_bytes(b"c", &mut b);
  assert_eq!(a, b);

  // Mutating one side leaves the other unaffected
  fork.append_message(b"label", b"divergence");
  t.challenge_bytes(b"c", &mut a);
  fork.challenge_bytes(b"c", &mut b);
  assert!(a != b);
}

#[test]
fn transcript_rng_binds_witnesses() {
  let t = Transcript::new(b"protocol");

  let mut with_witness = [0; 32];
  t.build_rng()
    .rekey_with_witness_bytes(b"witness", b"secret")
    .finalize(&mut ZeroRng)
    .fill_bytes(&mut with_witness);

  let mut with_other_witness = [0; 32];
  t.build_rng()
    .rekey_with_witness_bytes(b"witness", b"terces")
    .finalize(&mut ZeroRng)
    .fill_bytes(&mut with_other_witness);

  assert!(with_witness != with_other_witness);

  // Deterministic given the same witness and randomness
  let mut repeat = [0; 32];
  t.build_rng()
    .rekey_with_witness_bytes(b"witness", b"secret")
    .finalize(&mut ZeroRng)
    .fill_bytes(&mut repeat);
  assert_eq!(with_witness, repeat);

  // Actual randomness varies the output
  let mut with_entropy = [0; 32];
  t.build_rng()
    .rekey_with_witness_bytes(b"witness", b"secret")
    .finalize(&mut rand_core::OsRng)
    .fill_bytes(&mut with_entropy);
  assert!(with_witness != with_entropy);
}

#[test]
fn long_operations_cross_the_rate_boundary() {
  // Longer than the 166-byte STROBE rate, forcing mid-operation permutes
  let long = [0x5a; 500];
  let mut t = Transcript::new(b"protocol");
  t.append_message(b"long", &long);

  let mut challenge = [0; 500];
  t.challenge_bytes(b"c", &mut challenge);
  assert!(challenge[.. 32] != challenge[challenge.len() - 32 ..]);
}
