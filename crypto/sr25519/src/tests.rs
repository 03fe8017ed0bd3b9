use rand_core::{RngCore, CryptoRng, OsRng};

use crate::{
  ExpansionMode, MiniSecretKey, SecretKey, PublicKey, Keypair, Signature, SignatureError,
  ChainCode, signing_context, SigningContext,
};

// A deterministic fixed-output generator, so signing vectors are stable
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

fn unhex(hex: &str) -> Vec<u8> {
  hex::decode(hex).unwrap()
}

// A keypair fixed across the test suite, in the half-Ed25519 layout
const KEYPAIR_HEX: &str = "28b0ae221c6bb06856b287f60d7ea0d98552ea5a16db16956849aa371db3eb51\
fd190cce74df356432b410bd64682309d6dedb27c76845daf388557cbac3ca34\
46ebddef8cd9bb167dc30878d7113b7e168e6f0646beffd77d69d39bad76b47a";

fn fixed_keypair() -> Keypair {
  Keypair::from_half_ed25519_bytes(&unhex(KEYPAIR_HEX)).unwrap()
}

#[test]
fn half_ed25519_keypair_round_trip() {
  let keypair = fixed_keypair();
  assert_eq!(keypair.to_half_ed25519_bytes().to_vec(), unhex(KEYPAIR_HEX));

  // The embedded public key is the public key of the embedded secret
  assert_eq!(keypair.secret.to_public(), keypair.public);

  // The native layout round-trips too
  let native = keypair.to_bytes();
  let reloaded = Keypair::from_bytes(&native).unwrap();
  assert_eq!(reloaded.secret, keypair.secret);
  assert_eq!(reloaded.public, keypair.public);
}

#[test]
fn ed25519_expansion_vector() {
  let mini = MiniSecretKey::from_bytes(&[0; 32]).unwrap();
  let secret = mini.expand(ExpansionMode::Ed25519);

  assert_eq!(
    secret.key.to_bytes().to_vec(),
    unhex("caa835781b15c7706f65b71f7a58c807ab360faed6440fb23e0f4c52e930de0a"),
  );
  assert_eq!(
    secret.nonce.to_vec(),
    unhex("0a6a85eaa642dac835424b5d7c8d637c00408c7a73da672b7f498521420b6dd3"),
  );
  assert_eq!(
    secret.to_public().to_bytes().to_vec(),
    unhex("def12e42f3e487e9b14095aa8d5cc16a33491f1b50dadcf8811d1480f3fa8627"),
  );

  // Expanding to a keypair and expanding to a public key agree bitwise
  let keypair = mini.expand_to_keypair(ExpansionMode::Ed25519);
  assert_eq!(
    keypair.public.to_bytes(),
    mini.expand_to_public(ExpansionMode::Ed25519).to_bytes(),
  );
}

#[test]
fn uniform_expansion_vector() {
  let mini = MiniSecretKey::from_bytes(&[0; 32]).unwrap();
  let secret = mini.expand(ExpansionMode::Uniform);

  assert_eq!(
    secret.key.to_bytes().to_vec(),
    unhex("04f0557e7f35e00df0824f458868915368bd5e41fd91f85b177f5907383ac50b"),
  );
  assert_eq!(
    secret.nonce.to_vec(),
    unhex("dd0660b091e0ec47ecaf1f6ce73e7168fef267770f5030d5c524a49615163471"),
  );
  assert_eq!(
    secret.to_public().to_bytes().to_vec(),
    unhex("063b66cc8b77aa24f694d073ad72c21a9f296be0fd4ee953d8e58d5d627d435b"),
  );
}

#[test]
fn secret_key_layouts() {
  let keypair = fixed_keypair();

  let native = keypair.secret.to_bytes();
  assert_eq!(SecretKey::from_bytes(&native).unwrap(), keypair.secret);

  let ed25519 = keypair.secret.to_ed25519_bytes();
  assert_eq!(SecretKey::from_ed25519_bytes(&ed25519).unwrap(), keypair.secret);
  // The scalar halves differ by the cofactor
  assert!(native[.. 32] != ed25519[.. 32]);
  // The nonce halves are shared
  assert_eq!(native[32 ..], ed25519[32 ..]);
}

#[test]
fn decode_errors() {
  assert_eq!(
    MiniSecretKey::from_bytes(&[0; 31]),
    Err(SignatureError::BytesLength { name: "MiniSecretKey", length: 32 }),
  );
  assert_eq!(
    SecretKey::from_bytes(&[0; 63]).unwrap_err(),
    SignatureError::BytesLength { name: "SecretKey", length: 64 },
  );
  assert_eq!(
    Keypair::from_bytes(&[0; 95]).unwrap_err(),
    SignatureError::BytesLength { name: "Keypair", length: 96 },
  );
  assert_eq!(
    Signature::from_bytes(&[0; 63]).unwrap_err(),
    SignatureError::BytesLength { name: "Signature", length: 64 },
  );

  // A secret scalar above l is rejected
  let mut bad_secret = [0xff; 64];
  bad_secret[31] = 0x7f;
  assert_eq!(SecretKey::from_bytes(&bad_secret).unwrap_err(), SignatureError::ScalarFormat);

  // -1 is not a canonical point encoding
  let mut bad_public = [0xff; 32];
  bad_public[0] = 0xec;
  bad_public[31] = 0x7f;
  assert_eq!(PublicKey::from_bytes(&bad_public).unwrap_err(), SignatureError::PointDecompression);
}

#[test]
fn sign_and_verify() {
  let keypair = fixed_keypair();
  let ctx = signing_context(b"substrate");
  let msg = b"hello";

  let signature = keypair.sign(ctx.bytes(msg), &mut OsRng);
  assert!(keypair.verify(ctx.bytes(msg), &signature));
  assert!(keypair.verify_simple(b"substrate", msg, &signature));

  // Any bit flip in the message, R, or s defeats verification
  assert!(!keypair.verify(ctx.bytes(b"hellp"), &signature));
  let mut bytes = signature.to_bytes();
  bytes[0] ^= 1;
  let flipped_r = Signature::from_bytes(&bytes).unwrap();
  assert!(!keypair.verify(ctx.bytes(msg), &flipped_r));
  let mut bytes = signature.to_bytes();
  bytes[40] ^= 1;
  let flipped_s = Signature::from_bytes(&bytes).unwrap();
  assert!(!keypair.verify(ctx.bytes(msg), &flipped_s));

  // Wrong context
  assert!(!keypair.verify_simple(b"polkadot", msg, &signature));

  // Wrong key
  let other = Keypair::generate_with(&mut OsRng);
  assert!(!other.verify(ctx.bytes(msg), &signature));
}

#[test]
fn deterministic_signature_vector() {
  let keypair = fixed_keypair();
  let signature = keypair.sign_simple(b"substrate", b"hello", &mut ZeroRng);

  assert_eq!(
    signature.to_bytes().to_vec(),
    unhex(
      "80c21499228508d114a102fe98660c73b7a5b7a07d41a9ccfc87352cfd85c00d\
9a9905a49b732e613c7b4d55aab5dcff9fbed205e43bba360e76247c3a29fc86",
    ),
  );
  assert!(keypair.verify_simple(b"substrate", b"hello", &signature));

  // A live RNG produces a different, still-valid signature
  let randomized = keypair.sign_simple(b"substrate", b"hello", &mut OsRng);
  assert!(randomized != signature);
  assert!(keypair.verify_simple(b"substrate", b"hello", &randomized));
}

#[test]
fn marker_bit_is_required() {
  let keypair = fixed_keypair();
  let signature = keypair.sign_simple(b"substrate", b"hello", &mut ZeroRng);

  let mut bytes = signature.to_bytes();
  assert_eq!(bytes[63] & 128, 128);
  bytes[63] &= 127;
  assert_eq!(Signature::from_bytes(&bytes).unwrap_err(), SignatureError::NotMarkedSr25519);

  // Round-trip with the marker intact
  assert_eq!(Signature::from_bytes(&signature.to_bytes()).unwrap(), signature);
}

#[test]
fn legacy_context_is_incompatible() {
  let keypair = fixed_keypair();
  #[allow(deprecated)]
  let legacy = SigningContext::legacy(b"substrate");

  let signature = keypair.sign(legacy.bytes(b"hello"), &mut ZeroRng);
  assert!(keypair.verify(legacy.bytes(b"hello"), &signature));
  assert!(!keypair.verify_simple(b"substrate", b"hello", &signature));
}

#[test]
fn soft_derivation_homomorphism() {
  let keypair = fixed_keypair();
  let cc = ChainCode([0x11; 32]);

  let (derived_secret, secret_cc) = keypair.secret.derived_key_simple(cc, b"", &mut ZeroRng);
  let (derived_public, public_cc) = keypair.public.derived_key_simple(cc, b"");

  assert_eq!(secret_cc, public_cc);
  assert_eq!(derived_secret.to_public(), derived_public);

  assert_eq!(
    derived_public.to_bytes().to_vec(),
    unhex("cc2e82eb31c17406a196ca15aa22f570c7d8a1c4f7e2c0605f2381353794fd53"),
  );
  assert_eq!(
    secret_cc.0.to_vec(),
    unhex("94a7e53f600b136a1a56f9de939adabff549fd89271d31eceda68166d96cb956"),
  );

  // The derived key signs and verifies
  let signature = derived_secret.sign(
    signing_context(b"substrate").bytes(b"derived"),
    &derived_public,
    &mut OsRng,
  );
  assert!(derived_public.verify_simple(b"substrate", b"derived", &signature));

  // Distinct indices diverge
  let (other_public, _) = keypair.public.derived_key_simple(cc, b"1");
  assert!(other_public != derived_public);
}

#[test]
fn hard_derivation_vector() {
  let keypair = fixed_keypair();
  let cc = ChainCode([0x11; 32]);

  let (mini, chaincode) = keypair.secret.hard_derive_mini_secret_key(Some(cc), b"");
  assert_eq!(
    mini.to_bytes().to_vec(),
    unhex("bbce70514e87f8ce4dae8ab26570ca3c23f10613530c0b0d4e01d5ba81b2fc50"),
  );
  assert_eq!(
    chaincode.0.to_vec(),
    unhex("46d2fce14410d1812a866eaa6e7def0c07ca03f8db0de4d4b2fcd0ec8b5f49e9"),
  );
  assert_eq!(
    mini.expand_to_public(ExpansionMode::Ed25519).to_bytes().to_vec(),
    unhex("2a39265986ba4d9442ccae9de7d2e65a6e03109675715995e1c46cabbb77f64f"),
  );

  // Hard derivation is not homomorphic: it depends on the secret scalar
  let (without_cc, _) = keypair.secret.hard_derive_mini_secret_key(None, b"");
  assert!(without_cc != mini);
}

#[test]
fn generated_keys_work() {
  let keypair = Keypair::generate_with(&mut OsRng);
  let signature = keypair.sign_simple(b"test", b"message", &mut OsRng);
  assert!(keypair.verify_simple(b"test", b"message", &signature));

  let reloaded = PublicKey::from_bytes(&keypair.public.to_bytes()).unwrap();
  assert!(reloaded.verify_simple(b"test", b"message", &signature));
}
