use thiserror::Error;

/// Errors raised while decoding keys and signatures.
///
/// Decoding is the only fallible surface of this crate. Arithmetic is total
/// and verification reports through `bool`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum SignatureError {
  /// 32 bytes which aren't the canonical encoding of a Ristretto point.
  #[error("cannot decompress Ristretto point")]
  PointDecompression,
  /// 32 bytes which aren't the canonical encoding of a scalar mod l.
  #[error("cannot use scalar with high-bit set")]
  ScalarFormat,
  /// An encoding of the wrong length.
  #[error("{name} must be {length} bytes in length")]
  BytesLength {
    /// The type which rejected the encoding.
    name: &'static str,
    /// The length it requires.
    length: usize,
  },
  /// A signature whose final byte lacks the sr25519 marker bit.
  #[error("signature not marked as an sr25519 signature")]
  NotMarkedSr25519,
}

pub type SignatureResult<T> = Result<T, SignatureError>;
