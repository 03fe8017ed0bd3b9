//! Key material: mini-secret seeds, expanded secret keys, public keys, and
//! keypairs, with the byte layouts Substrate expects.

use core::fmt::{self, Debug};

use rand_core::{RngCore, CryptoRng};

use zeroize::Zeroize;
use subtle::{Choice, ConstantTimeEq};

use sha2::{Sha512, Digest};

use ristretto::{CompressedRistretto, RistrettoPoint, Scalar, RISTRETTO_BASEPOINT_TABLE};
use transcript::Transcript;

use crate::{
  errors::{SignatureError, SignatureResult},
  points::RistrettoBoth,
  scalars::{divide_scalar_bytes_by_cofactor, multiply_scalar_bytes_by_cofactor},
};

/// The length of a mini secret, the seed form of a key.
pub const MINI_SECRET_KEY_LENGTH: usize = 32;
/// The length of a serialized secret key: a scalar and a nonce seed.
pub const SECRET_KEY_LENGTH: usize = 64;
/// The length of a public key, a compressed Ristretto point.
pub const PUBLIC_KEY_LENGTH: usize = 32;
/// The length of a serialized keypair.
pub const KEYPAIR_LENGTH: usize = SECRET_KEY_LENGTH + PUBLIC_KEY_LENGTH;

/// How to expand a [`MiniSecretKey`] into a [`SecretKey`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ExpansionMode {
  /// Draw the scalar and nonce seed from a transcript keyed with the seed.
  ///
  /// The scalar is uniform mod `l`. Use this unless Ed25519 key
  /// compatibility is required.
  Uniform,
  /// Hash the seed with SHA-512 and clamp, as Ed25519 does.
  ///
  /// An Ed25519 key expanded this way and an sr25519 key expanded this way
  /// share byte-level key material. Substrate uses this mode.
  Ed25519,
}

/// A 32-byte seed from which a [`SecretKey`] is expanded.
///
/// This is the form wallets store and derive; it is not itself a signing
/// key.
#[derive(Clone, Zeroize)]
pub struct MiniSecretKey(pub(crate) [u8; MINI_SECRET_KEY_LENGTH]);

impl Drop for MiniSecretKey {
  fn drop(&mut self) {
    self.zeroize();
  }
}

impl Debug for MiniSecretKey {
  fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt.debug_struct("MiniSecretKey").finish_non_exhaustive()
  }
}

impl ConstantTimeEq for MiniSecretKey {
  fn ct_eq(&self, other: &MiniSecretKey) -> Choice {
    self.0.ct_eq(&other.0)
  }
}

impl PartialEq for MiniSecretKey {
  fn eq(&self, other: &MiniSecretKey) -> bool {
    self.ct_eq(other).into()
  }
}
impl Eq for MiniSecretKey {}

impl MiniSecretKey {
  /// Sample a fresh mini secret.
  pub fn generate_with<R: RngCore + CryptoRng>(rng: &mut R) -> MiniSecretKey {
    let mut bytes = [0; MINI_SECRET_KEY_LENGTH];
    rng.fill_bytes(&mut bytes);
    MiniSecretKey(bytes)
  }

  fn expand_uniform(&self) -> SecretKey {
    let mut t = Transcript::new(b"ExpandSecretKeys");
    t.append_message(b"mini", &self.0);

    let mut scalar_bytes = [0; 64];
    t.challenge_bytes(b"sk", &mut scalar_bytes);
    let key = Scalar::from_bytes_mod_order_wide(&scalar_bytes);
    scalar_bytes.zeroize();

    let mut nonce = [0; 32];
    t.challenge_bytes(b"no", &mut nonce);

    SecretKey { key, nonce }
  }

  fn expand_ed25519(&self) -> SecretKey {
    let r = Sha512::digest(self.0);

    let mut key: [u8; 32] = r[0 .. 32].try_into().unwrap();
    key[0] &= 248;
    key[31] &= 63;
    key[31] |= 64;
    // The clamped scalar is a multiple of the cofactor; divide it out so
    // scalar arithmetic works mod l
    divide_scalar_bytes_by_cofactor(&mut key);
    let key = Scalar::from_bits(key);

    let nonce = r[32 .. 64].try_into().unwrap();

    SecretKey { key, nonce }
  }

  /// Expand this seed into a [`SecretKey`].
  pub fn expand(&self, mode: ExpansionMode) -> SecretKey {
    match mode {
      ExpansionMode::Uniform => self.expand_uniform(),
      ExpansionMode::Ed25519 => self.expand_ed25519(),
    }
  }

  /// Expand this seed into a [`Keypair`].
  pub fn expand_to_keypair(&self, mode: ExpansionMode) -> Keypair {
    self.expand(mode).into()
  }

  /// The public key of this seed under the given expansion mode.
  pub fn expand_to_public(&self, mode: ExpansionMode) -> PublicKey {
    self.expand(mode).to_public()
  }

  pub fn to_bytes(&self) -> [u8; MINI_SECRET_KEY_LENGTH] {
    self.0
  }

  pub fn as_bytes(&self) -> &[u8; MINI_SECRET_KEY_LENGTH] {
    &self.0
  }

  pub fn from_bytes(bytes: &[u8]) -> SignatureResult<MiniSecretKey> {
    let bytes = <[u8; MINI_SECRET_KEY_LENGTH]>::try_from(bytes).map_err(|_| {
      SignatureError::BytesLength { name: "MiniSecretKey", length: MINI_SECRET_KEY_LENGTH }
    })?;
    Ok(MiniSecretKey(bytes))
  }
}

/// An expanded secret key: a scalar mod `l` and a nonce seed.
///
/// The nonce seed never leaves the key except through the transcript RNG; it
/// binds signing nonces to the secret even under a weak external RNG.
#[derive(Clone, Zeroize)]
pub struct SecretKey {
  pub(crate) key: Scalar,
  pub(crate) nonce: [u8; 32],
}

impl Drop for SecretKey {
  fn drop(&mut self) {
    self.zeroize();
  }
}

impl Debug for SecretKey {
  fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt.debug_struct("SecretKey").finish_non_exhaustive()
  }
}

impl ConstantTimeEq for SecretKey {
  fn ct_eq(&self, other: &SecretKey) -> Choice {
    self.key.ct_eq(&other.key) & self.nonce.ct_eq(&other.nonce)
  }
}

impl PartialEq for SecretKey {
  fn eq(&self, other: &SecretKey) -> bool {
    self.ct_eq(other).into()
  }
}
impl Eq for SecretKey {}

impl SecretKey {
  /// Serialize as `scalar || nonce`, the native layout.
  pub fn to_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
    let mut bytes = [0; SECRET_KEY_LENGTH];
    bytes[.. 32].copy_from_slice(&self.key.to_bytes());
    bytes[32 ..].copy_from_slice(&self.nonce);
    bytes
  }

  /// Deserialize from `scalar || nonce`, rejecting non-canonical scalars.
  pub fn from_bytes(bytes: &[u8]) -> SignatureResult<SecretKey> {
    if bytes.len() != SECRET_KEY_LENGTH {
      Err(SignatureError::BytesLength { name: "SecretKey", length: SECRET_KEY_LENGTH })?
    }

    let key = Option::from(Scalar::from_canonical_bytes(bytes[.. 32].try_into().unwrap()))
      .ok_or(SignatureError::ScalarFormat)?;
    Ok(SecretKey { key, nonce: bytes[32 .. 64].try_into().unwrap() })
  }

  /// Serialize as an Ed25519 expanded secret key: `8 * scalar || nonce`.
  pub fn to_ed25519_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
    let mut bytes = [0; SECRET_KEY_LENGTH];
    let mut key = self.key.to_bytes();
    multiply_scalar_bytes_by_cofactor(&mut key);
    bytes[.. 32].copy_from_slice(&key);
    bytes[32 ..].copy_from_slice(&self.nonce);
    bytes
  }

  /// Deserialize from the Ed25519 expanded layout, dividing the scalar half
  /// by the cofactor.
  pub fn from_ed25519_bytes(bytes: &[u8]) -> SignatureResult<SecretKey> {
    if bytes.len() != SECRET_KEY_LENGTH {
      Err(SignatureError::BytesLength { name: "SecretKey", length: SECRET_KEY_LENGTH })?
    }

    let mut key: [u8; 32] = bytes[.. 32].try_into().unwrap();
    divide_scalar_bytes_by_cofactor(&mut key);
    // Dividing a 256-bit value by 8 leaves bit 255 clear
    let key = Scalar::from_bits(key);

    Ok(SecretKey { key, nonce: bytes[32 .. 64].try_into().unwrap() })
  }

  /// The public key of this secret key.
  pub fn to_public(&self) -> PublicKey {
    PublicKey::from_point(&self.key * &*RISTRETTO_BASEPOINT_TABLE)
  }

  pub fn to_keypair(self) -> Keypair {
    let public = self.to_public();
    Keypair { secret: self, public }
  }
}

/// A public key: a compressed Ristretto point.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PublicKey(pub(crate) RistrettoBoth);

impl ConstantTimeEq for PublicKey {
  fn ct_eq(&self, other: &PublicKey) -> Choice {
    self.0.ct_eq(&other.0)
  }
}

impl AsRef<[u8]> for PublicKey {
  fn as_ref(&self) -> &[u8] {
    self.as_compressed().as_ref()
  }
}

impl PublicKey {
  pub fn as_compressed(&self) -> &CompressedRistretto {
    self.0.as_compressed()
  }

  pub(crate) fn as_point(&self) -> &RistrettoPoint {
    self.0.as_point()
  }

  pub fn from_point(point: RistrettoPoint) -> PublicKey {
    PublicKey(RistrettoBoth::from_point(point))
  }

  pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
    self.as_compressed().to_bytes()
  }

  /// Deserialize a public key, rejecting anything but the canonical
  /// encoding of a point.
  pub fn from_bytes(bytes: &[u8]) -> SignatureResult<PublicKey> {
    Ok(PublicKey(RistrettoBoth::from_bytes_ser("PublicKey", bytes)?))
  }
}

impl From<SecretKey> for PublicKey {
  fn from(secret: SecretKey) -> PublicKey {
    secret.to_public()
  }
}

/// A secret key together with its public key.
#[derive(Clone)]
pub struct Keypair {
  /// The secret half.
  pub secret: SecretKey,
  /// The public half.
  pub public: PublicKey,
}

impl Debug for Keypair {
  fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt.debug_struct("Keypair").field("public", &self.public).finish_non_exhaustive()
  }
}

impl Zeroize for Keypair {
  fn zeroize(&mut self) {
    self.secret.zeroize();
  }
}

impl From<SecretKey> for Keypair {
  fn from(secret: SecretKey) -> Keypair {
    secret.to_keypair()
  }
}

impl Keypair {
  /// Generate a fresh keypair by expanding a random mini secret.
  pub fn generate_with<R: RngCore + CryptoRng>(rng: &mut R) -> Keypair {
    MiniSecretKey::generate_with(rng).expand_to_keypair(ExpansionMode::Uniform)
  }

  /// Serialize as `secret (native) || public`.
  pub fn to_bytes(&self) -> [u8; KEYPAIR_LENGTH] {
    let mut bytes = [0; KEYPAIR_LENGTH];
    bytes[.. SECRET_KEY_LENGTH].copy_from_slice(&self.secret.to_bytes());
    bytes[SECRET_KEY_LENGTH ..].copy_from_slice(&self.public.to_bytes());
    bytes
  }

  /// Deserialize from `secret (native) || public`.
  ///
  /// The public key is decoded, not recomputed; a mismatched pair is the
  /// caller's corruption to find.
  pub fn from_bytes(bytes: &[u8]) -> SignatureResult<Keypair> {
    if bytes.len() != KEYPAIR_LENGTH {
      Err(SignatureError::BytesLength { name: "Keypair", length: KEYPAIR_LENGTH })?
    }

    Ok(Keypair {
      secret: SecretKey::from_bytes(&bytes[.. SECRET_KEY_LENGTH])?,
      public: PublicKey::from_bytes(&bytes[SECRET_KEY_LENGTH ..])?,
    })
  }

  /// Serialize as `secret (Ed25519 layout) || public`, the 96-byte form
  /// Substrate calls a half-Ed25519 keypair.
  pub fn to_half_ed25519_bytes(&self) -> [u8; KEYPAIR_LENGTH] {
    let mut bytes = [0; KEYPAIR_LENGTH];
    bytes[.. SECRET_KEY_LENGTH].copy_from_slice(&self.secret.to_ed25519_bytes());
    bytes[SECRET_KEY_LENGTH ..].copy_from_slice(&self.public.to_bytes());
    bytes
  }

  /// Deserialize from `secret (Ed25519 layout) || public`.
  pub fn from_half_ed25519_bytes(bytes: &[u8]) -> SignatureResult<Keypair> {
    if bytes.len() != KEYPAIR_LENGTH {
      Err(SignatureError::BytesLength { name: "Keypair", length: KEYPAIR_LENGTH })?
    }

    Ok(Keypair {
      secret: SecretKey::from_ed25519_bytes(&bytes[.. SECRET_KEY_LENGTH])?,
      public: PublicKey::from_bytes(&bytes[SECRET_KEY_LENGTH ..])?,
    })
  }
}
