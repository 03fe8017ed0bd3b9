use subtle::{Choice, ConstantTimeEq};

use ristretto::{CompressedRistretto, RistrettoPoint};

use crate::errors::{SignatureError, SignatureResult};

/// A Ristretto point held in both its decompressed and compressed forms.
///
/// Protocols here constantly hash compressed points while doing arithmetic
/// on decompressed ones; carrying both avoids recompressing. The two fields
/// are always consistent.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RistrettoBoth {
  compressed: CompressedRistretto,
  point: RistrettoPoint,
}

impl ConstantTimeEq for RistrettoBoth {
  fn ct_eq(&self, other: &RistrettoBoth) -> Choice {
    self.compressed.ct_eq(&other.compressed)
  }
}

// Compressed equality is Ristretto equality, as the encoding is canonical
impl PartialEq for RistrettoBoth {
  fn eq(&self, other: &RistrettoBoth) -> bool {
    self.ct_eq(other).into()
  }
}
impl Eq for RistrettoBoth {}

impl RistrettoBoth {
  pub(crate) fn as_compressed(&self) -> &CompressedRistretto {
    &self.compressed
  }

  pub(crate) fn as_point(&self) -> &RistrettoPoint {
    &self.point
  }

  pub(crate) fn from_compressed(compressed: CompressedRistretto) -> SignatureResult<RistrettoBoth> {
    Ok(RistrettoBoth {
      point: compressed.decompress().ok_or(SignatureError::PointDecompression)?,
      compressed,
    })
  }

  pub(crate) fn from_point(point: RistrettoPoint) -> RistrettoBoth {
    RistrettoBoth { compressed: point.compress(), point }
  }

  pub(crate) fn from_bytes_ser(
    name: &'static str,
    bytes: &[u8],
  ) -> SignatureResult<RistrettoBoth> {
    let bytes = <[u8; 32]>::try_from(bytes)
      .map_err(|_| SignatureError::BytesLength { name, length: 32 })?;
    RistrettoBoth::from_compressed(CompressedRistretto(bytes))
  }
}
