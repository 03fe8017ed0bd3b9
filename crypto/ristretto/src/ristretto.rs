//! The Ristretto prime-order group.
//!
//! Ristretto quotients the Edwards curve's 8-torsion away: two Edwards
//! points in the same coset have the same encoding, decoding only accepts
//! canonical encodings, and equality is equality of cosets. Consumers get a
//! group of prime order `l` with none of the cofactor's sharp edges.

use core::{
  iter::Sum,
  ops::{Add, AddAssign, Neg, Sub, SubAssign, Mul, MulAssign},
};

use zeroize::Zeroize;
use subtle::{Choice, ConstantTimeEq, ConditionallySelectable, ConditionallyNegatable};

use crate::{
  field::FieldElement,
  scalar::Scalar,
  curve::{self, EdwardsPoint, Identity},
  constants::{EDWARDS_D, INVSQRT_A_MINUS_D, SQRT_M1},
};

/// A Ristretto point in its canonical 32-byte wire form.
///
/// The encoding is canonical: two points are equal iff their encodings are
/// byte-equal.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct CompressedRistretto(pub [u8; 32]);

impl ConstantTimeEq for CompressedRistretto {
  fn ct_eq(&self, other: &CompressedRistretto) -> Choice {
    self.0.ct_eq(&other.0)
  }
}

impl AsRef<[u8]> for CompressedRistretto {
  fn as_ref(&self) -> &[u8] {
    &self.0
  }
}

impl CompressedRistretto {
  pub fn to_bytes(&self) -> [u8; 32] {
    self.0
  }

  pub fn as_bytes(&self) -> &[u8; 32] {
    &self.0
  }

  /// Decompress to a `RistrettoPoint`, if this is the canonical encoding of
  /// one.
  ///
  /// Rejects non-canonical field encodings, negative `s`, and encodings for
  /// which the decoding square root does not exist.
  pub fn decompress(&self) -> Option<RistrettoPoint> {
    let s = FieldElement::from_bytes(self.as_bytes());

    // from_bytes masks the high bit rather than failing, so re-encode to
    // reject the few non-canonical encodings
    let s_encoding_is_canonical = s.to_bytes().ct_eq(self.as_bytes());
    if (!s_encoding_is_canonical | s.is_negative()).into() {
      return None;
    }

    let ss = s.square();
    let u1 = FieldElement::ONE - ss;
    let u2 = FieldElement::ONE + ss;
    let u2_sqr = u2.square();

    // v = -d * u1^2 - u2^2
    let v = -(EDWARDS_D * u1.square()) - u2_sqr;

    let (ok, I) = (v * u2_sqr).invsqrt();

    let Dx = I * u2;
    let Dy = I * Dx * v;

    let mut x = (s + s) * Dx;
    let x_neg = x.is_negative();
    x.conditional_negate(x_neg);

    let y = u1 * Dy;
    let t = x * y;

    if (!ok | t.is_negative() | y.is_zero()).into() {
      return None;
    }
    Some(RistrettoPoint(EdwardsPoint { X: x, Y: y, Z: FieldElement::ONE, T: t }))
  }
}

/// An element of the Ristretto group.
///
/// Internally an Edwards point; the Edwards representative is never exposed.
#[derive(Clone, Copy, Debug, Zeroize)]
pub struct RistrettoPoint(pub(crate) EdwardsPoint);

impl ConstantTimeEq for RistrettoPoint {
  fn ct_eq(&self, other: &RistrettoPoint) -> Choice {
    // Coset equality: X1 Y2 == Y1 X2 or X1 X2 == Y1 Y2, which matches
    // byte equality of the compressed forms without compressing
    let X1Y2 = self.0.X * other.0.Y;
    let Y1X2 = self.0.Y * other.0.X;
    let X1X2 = self.0.X * other.0.X;
    let Y1Y2 = self.0.Y * other.0.Y;
    X1Y2.ct_eq(&Y1X2) | X1X2.ct_eq(&Y1Y2)
  }
}

impl PartialEq for RistrettoPoint {
  fn eq(&self, other: &RistrettoPoint) -> bool {
    self.ct_eq(other).into()
  }
}
impl Eq for RistrettoPoint {}

impl RistrettoPoint {
  pub fn identity() -> RistrettoPoint {
    RistrettoPoint(EdwardsPoint::identity())
  }

  pub fn generator() -> RistrettoPoint {
    crate::constants::RISTRETTO_BASEPOINT_POINT
  }

  /// The canonical encoding of this point's coset.
  pub fn compress(&self) -> CompressedRistretto {
    let mut X = self.0.X;
    let mut Y = self.0.Y;
    let Z = &self.0.Z;
    let T = &self.0.T;

    let u1 = (Z + Y) * (Z - Y);
    let u2 = X * Y;
    // Always square for a valid point
    let (_, invsqrt) = (u1 * u2.square()).invsqrt();
    let i1 = invsqrt * u1;
    let i2 = invsqrt * u2;
    let z_inv = i1 * (i2 * T);
    let mut den_inv = i2;

    let iX = X * SQRT_M1;
    let iY = Y * SQRT_M1;
    let enchanted_denominator = i1 * INVSQRT_A_MINUS_D;

    let rotate = (T * z_inv).is_negative();

    X.conditional_assign(&iY, rotate);
    Y.conditional_assign(&iX, rotate);
    den_inv.conditional_assign(&enchanted_denominator, rotate);

    Y.conditional_negate((X * z_inv).is_negative());

    let mut s = den_inv * (Z - Y);
    let s_is_negative = s.is_negative();
    s.conditional_negate(s_is_negative);

    CompressedRistretto(s.to_bytes())
  }

  /// `a * A + b * B` for the Ristretto basepoint `B`. Variable-time; only
  /// for use with public inputs, such as signature verification.
  pub fn vartime_double_scalar_mul_basepoint(
    a: &Scalar,
    A: &RistrettoPoint,
    b: &Scalar,
  ) -> RistrettoPoint {
    RistrettoPoint(curve::vartime_double_scalar_mul_basepoint(a, &A.0, b))
  }
}

impl<'a, 'b> Add<&'b RistrettoPoint> for &'a RistrettoPoint {
  type Output = RistrettoPoint;
  fn add(self, other: &'b RistrettoPoint) -> RistrettoPoint {
    RistrettoPoint(&self.0 + &other.0)
  }
}
math_variants!(Add, add, AddAssign, add_assign, RistrettoPoint);

impl<'a, 'b> Sub<&'b RistrettoPoint> for &'a RistrettoPoint {
  type Output = RistrettoPoint;
  fn sub(self, other: &'b RistrettoPoint) -> RistrettoPoint {
    RistrettoPoint(&self.0 - &other.0)
  }
}
math_variants!(Sub, sub, SubAssign, sub_assign, RistrettoPoint);

impl<'a> Neg for &'a RistrettoPoint {
  type Output = RistrettoPoint;
  fn neg(self) -> RistrettoPoint {
    RistrettoPoint(-&self.0)
  }
}
neg_variant!(RistrettoPoint);

impl<T> Sum<T> for RistrettoPoint
where
  T: core::borrow::Borrow<RistrettoPoint>,
{
  fn sum<I: Iterator<Item = T>>(iter: I) -> RistrettoPoint {
    let mut res = RistrettoPoint::identity();
    for point in iter {
      res += point.borrow();
    }
    res
  }
}

impl<'a, 'b> Mul<&'b Scalar> for &'a RistrettoPoint {
  type Output = RistrettoPoint;
  fn mul(self, scalar: &'b Scalar) -> RistrettoPoint {
    RistrettoPoint(&self.0 * scalar)
  }
}

impl<'a, 'b> Mul<&'b RistrettoPoint> for &'a Scalar {
  type Output = RistrettoPoint;
  fn mul(self, point: &'b RistrettoPoint) -> RistrettoPoint {
    point * self
  }
}

impl Mul<Scalar> for RistrettoPoint {
  type Output = RistrettoPoint;
  fn mul(self, scalar: Scalar) -> RistrettoPoint {
    &self * &scalar
  }
}

impl MulAssign<Scalar> for RistrettoPoint {
  fn mul_assign(&mut self, scalar: Scalar) {
    *self = &*self * &scalar;
  }
}

impl Mul<RistrettoPoint> for Scalar {
  type Output = RistrettoPoint;
  fn mul(self, point: RistrettoPoint) -> RistrettoPoint {
    &point * &self
  }
}

/// The basepoint comb table, for fast fixed-base multiplication.
pub struct RistrettoBasepointTable(pub(crate) curve::EdwardsBasepointTable);

impl RistrettoBasepointTable {
  pub fn basepoint(&self) -> RistrettoPoint {
    crate::constants::RISTRETTO_BASEPOINT_POINT
  }
}

impl<'a, 'b> Mul<&'b Scalar> for &'a RistrettoBasepointTable {
  type Output = RistrettoPoint;
  fn mul(self, scalar: &'b Scalar) -> RistrettoPoint {
    RistrettoPoint(self.0.basepoint_mul(scalar))
  }
}

impl<'a, 'b> Mul<&'b RistrettoBasepointTable> for &'a Scalar {
  type Output = RistrettoPoint;
  fn mul(self, table: &'b RistrettoBasepointTable) -> RistrettoPoint {
    table * self
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::constants::{RISTRETTO_BASEPOINT_POINT, RISTRETTO_BASEPOINT_TABLE};

  fn hex_point(hex: &str) -> CompressedRistretto {
    CompressedRistretto(hex::decode(hex).unwrap().try_into().unwrap())
  }

  const BASEPOINT_HEX: &str = "e2f2ae0a6abc4e71a884a961c500515f58e30b6aa582dd8db6a65945e08d2d76";

  #[test]
  fn basepoint_encoding() {
    assert_eq!(RISTRETTO_BASEPOINT_POINT.compress(), hex_point(BASEPOINT_HEX));
    assert_eq!(hex_point(BASEPOINT_HEX).decompress().unwrap(), RISTRETTO_BASEPOINT_POINT);
  }

  #[test]
  fn decompress_rejects_invalid() {
    // Negative s (low bit set)
    let mut negative = hex_point(BASEPOINT_HEX);
    negative.0[0] |= 1;
    assert!(negative.decompress().is_none());

    // Non-canonical field encoding of zero: p
    let mut p_bytes = [0xff; 32];
    p_bytes[0] = 0xed;
    p_bytes[31] = 0x7f;
    assert!(CompressedRistretto(p_bytes).decompress().is_none());

    // -1, which is not the encoding of any point
    let mut minus_one = [0xff; 32];
    minus_one[0] = 0xec;
    minus_one[31] = 0x7f;
    assert!(CompressedRistretto(minus_one).decompress().is_none());
  }

  #[test]
  fn compress_decompress_round_trip() {
    let mut P = RistrettoPoint::identity();
    for _ in 0 .. 16 {
      let encoding = P.compress();
      let Q = encoding.decompress().unwrap();
      assert_eq!(P, Q);
      assert_eq!(Q.compress(), encoding);
      P += RISTRETTO_BASEPOINT_POINT;
    }
  }

  #[test]
  fn coset_equality() {
    // (sqrt(-1), 0) generates the 4-torsion; adding it must not change the
    // Ristretto encoding
    let torsion = EdwardsPoint {
      X: SQRT_M1,
      Y: FieldElement::ZERO,
      Z: FieldElement::ONE,
      T: FieldElement::ZERO,
    };
    let P = RISTRETTO_BASEPOINT_POINT;
    let P_torsioned = RistrettoPoint(&P.0 + &torsion);

    assert_eq!(P, P_torsioned);
    assert_eq!(P.compress(), P_torsioned.compress());
  }

  #[test]
  fn identity_encoding() {
    assert_eq!(RistrettoPoint::identity().compress(), CompressedRistretto([0; 32]));
    assert_eq!(CompressedRistretto([0; 32]).decompress().unwrap(), RistrettoPoint::identity());
  }

  #[test]
  fn table_mul_matches_point_mul() {
    let x = Scalar::from_bytes_mod_order_wide(&core::array::from_fn(|i| i as u8));
    let from_table = &x * &*RISTRETTO_BASEPOINT_TABLE;
    let from_point = RISTRETTO_BASEPOINT_POINT * x;
    assert_eq!(from_table, from_point);
    assert_eq!(
      from_table.compress(),
      hex_point("68856e93d9d32434e75560799b5f612d93b1a9bc12bc843618527da828bfdf78"),
    );
  }

  #[test]
  fn scalar_mul_distributes() {
    let a = Scalar::from_bytes_mod_order_wide(&core::array::from_fn(|i| (i as u8) * 7));
    let b = Scalar::from_bytes_mod_order_wide(&core::array::from_fn(|i| (i as u8) + 3));
    let lhs = &(a + b) * &*RISTRETTO_BASEPOINT_TABLE;
    let rhs = (&a * &*RISTRETTO_BASEPOINT_TABLE) + (&b * &*RISTRETTO_BASEPOINT_TABLE);
    assert_eq!(lhs, rhs);
  }
}
