// Edwards curve internals, after the curve25519 reference design. Nothing
// here is exported from the crate; the public group is Ristretto.
//
// Coordinate systems: extended (X : Y : Z : T) with XY = ZT, projective
// (X : Y : Z), "completed" points in P^1 x P^1 produced by additions and
// doublings, and the two Niels forms caching (y + x, y - x, 2dxy) for
// precomputed tables.

use core::ops::{Add, Sub, Neg, Mul};

use zeroize::Zeroize;
use subtle::{Choice, ConstantTimeEq, ConditionallySelectable, ConditionallyNegatable};

use crate::{
  field::FieldElement,
  scalar::Scalar,
  constants::{EDWARDS_D2, ED25519_BASEPOINT},
};

#[derive(Clone, Copy, Debug, Zeroize)]
pub(crate) struct EdwardsPoint {
  pub(crate) X: FieldElement,
  pub(crate) Y: FieldElement,
  pub(crate) Z: FieldElement,
  pub(crate) T: FieldElement,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct ProjectivePoint {
  pub(crate) X: FieldElement,
  pub(crate) Y: FieldElement,
  pub(crate) Z: FieldElement,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct CompletedPoint {
  pub(crate) X: FieldElement,
  pub(crate) Y: FieldElement,
  pub(crate) Z: FieldElement,
  pub(crate) T: FieldElement,
}

/// A point (y + x, y - x, xy2d) in the affine model, for precomputed tables.
#[derive(Clone, Copy, Debug)]
pub(crate) struct AffineNielsPoint {
  pub(crate) y_plus_x: FieldElement,
  pub(crate) y_minus_x: FieldElement,
  pub(crate) xy2d: FieldElement,
}

/// A point (Y + X, Y - X, Z, 2dXY) in the extended model, for mixed addition.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ProjectiveNielsPoint {
  pub(crate) Y_plus_X: FieldElement,
  pub(crate) Y_minus_X: FieldElement,
  pub(crate) Z: FieldElement,
  pub(crate) T2d: FieldElement,
}

pub(crate) trait Identity {
  fn identity() -> Self;
}

impl Identity for EdwardsPoint {
  fn identity() -> EdwardsPoint {
    EdwardsPoint {
      X: FieldElement::ZERO,
      Y: FieldElement::ONE,
      Z: FieldElement::ONE,
      T: FieldElement::ZERO,
    }
  }
}

impl Identity for ProjectivePoint {
  fn identity() -> ProjectivePoint {
    ProjectivePoint { X: FieldElement::ZERO, Y: FieldElement::ONE, Z: FieldElement::ONE }
  }
}

impl Identity for AffineNielsPoint {
  fn identity() -> AffineNielsPoint {
    AffineNielsPoint {
      y_plus_x: FieldElement::ONE,
      y_minus_x: FieldElement::ONE,
      xy2d: FieldElement::ZERO,
    }
  }
}

impl Identity for ProjectiveNielsPoint {
  fn identity() -> ProjectiveNielsPoint {
    ProjectiveNielsPoint {
      Y_plus_X: FieldElement::ONE,
      Y_minus_X: FieldElement::ONE,
      Z: FieldElement::ONE,
      T2d: FieldElement::ZERO,
    }
  }
}

impl ConstantTimeEq for EdwardsPoint {
  fn ct_eq(&self, other: &EdwardsPoint) -> Choice {
    // (x/z) == (x'/z') and (y/z) == (y'/z'), cross-multiplied
    ((self.X * other.Z).ct_eq(&(other.X * self.Z))) &
      ((self.Y * other.Z).ct_eq(&(other.Y * self.Z)))
  }
}

impl ConditionallySelectable for AffineNielsPoint {
  fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
    AffineNielsPoint {
      y_plus_x: FieldElement::conditional_select(&a.y_plus_x, &b.y_plus_x, choice),
      y_minus_x: FieldElement::conditional_select(&a.y_minus_x, &b.y_minus_x, choice),
      xy2d: FieldElement::conditional_select(&a.xy2d, &b.xy2d, choice),
    }
  }
}

impl ConditionallySelectable for ProjectiveNielsPoint {
  fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
    ProjectiveNielsPoint {
      Y_plus_X: FieldElement::conditional_select(&a.Y_plus_X, &b.Y_plus_X, choice),
      Y_minus_X: FieldElement::conditional_select(&a.Y_minus_X, &b.Y_minus_X, choice),
      Z: FieldElement::conditional_select(&a.Z, &b.Z, choice),
      T2d: FieldElement::conditional_select(&a.T2d, &b.T2d, choice),
    }
  }
}

impl<'a> Neg for &'a AffineNielsPoint {
  type Output = AffineNielsPoint;
  fn neg(self) -> AffineNielsPoint {
    AffineNielsPoint {
      y_plus_x: self.y_minus_x,
      y_minus_x: self.y_plus_x,
      xy2d: -self.xy2d,
    }
  }
}

impl Neg for AffineNielsPoint {
  type Output = AffineNielsPoint;
  fn neg(self) -> AffineNielsPoint {
    -&self
  }
}

impl<'a> Neg for &'a ProjectiveNielsPoint {
  type Output = ProjectiveNielsPoint;
  fn neg(self) -> ProjectiveNielsPoint {
    ProjectiveNielsPoint {
      Y_plus_X: self.Y_minus_X,
      Y_minus_X: self.Y_plus_X,
      Z: self.Z,
      T2d: -self.T2d,
    }
  }
}

impl Neg for ProjectiveNielsPoint {
  type Output = ProjectiveNielsPoint;
  fn neg(self) -> ProjectiveNielsPoint {
    -&self
  }
}

// Conversions

impl ProjectivePoint {
  pub(crate) fn as_extended(&self) -> EdwardsPoint {
    EdwardsPoint {
      X: self.X * self.Z,
      Y: self.Y * self.Z,
      Z: self.Z.square(),
      T: self.X * self.Y,
    }
  }
}

impl CompletedPoint {
  pub(crate) fn as_projective(&self) -> ProjectivePoint {
    ProjectivePoint { X: self.X * self.T, Y: self.Y * self.Z, Z: self.Z * self.T }
  }

  pub(crate) fn as_extended(&self) -> EdwardsPoint {
    EdwardsPoint {
      X: self.X * self.T,
      Y: self.Y * self.Z,
      Z: self.Z * self.T,
      T: self.X * self.Y,
    }
  }
}

impl EdwardsPoint {
  pub(crate) fn as_projective(&self) -> ProjectivePoint {
    ProjectivePoint { X: self.X, Y: self.Y, Z: self.Z }
  }

  pub(crate) fn to_projective_niels(&self) -> ProjectiveNielsPoint {
    ProjectiveNielsPoint {
      Y_plus_X: self.Y + self.X,
      Y_minus_X: self.Y - self.X,
      Z: self.Z,
      T2d: self.T * EDWARDS_D2,
    }
  }

  pub(crate) fn to_affine_niels(&self) -> AffineNielsPoint {
    let recip = self.Z.invert();
    let x = self.X * recip;
    let y = self.Y * recip;
    AffineNielsPoint { y_plus_x: y + x, y_minus_x: y - x, xy2d: (x * y) * EDWARDS_D2 }
  }
}

// Doubling

impl ProjectivePoint {
  pub(crate) fn double(&self) -> CompletedPoint {
    let XX = self.X.square();
    let YY = self.Y.square();
    let ZZ2 = self.Z.square2();
    let X_plus_Y_sq = (self.X + self.Y).square();
    let YY_plus_XX = YY + XX;
    let YY_minus_XX = YY - XX;

    CompletedPoint {
      X: X_plus_Y_sq - YY_plus_XX,
      Y: YY_plus_XX,
      Z: YY_minus_XX,
      T: ZZ2 - YY_minus_XX,
    }
  }
}

impl EdwardsPoint {
  pub(crate) fn double(&self) -> EdwardsPoint {
    self.as_projective().double().as_extended()
  }

  /// `2^k * self` by successive doublings. `k` must be non-zero.
  pub(crate) fn mul_by_pow_2(&self, k: u32) -> EdwardsPoint {
    debug_assert!(k > 0);
    let mut r: CompletedPoint;
    let mut s = self.as_projective();
    for _ in 0 .. (k - 1) {
      r = s.double();
      s = r.as_projective();
    }
    s.double().as_extended()
  }
}

// Addition and subtraction

impl<'a, 'b> Add<&'b ProjectiveNielsPoint> for &'a EdwardsPoint {
  type Output = CompletedPoint;
  fn add(self, other: &'b ProjectiveNielsPoint) -> CompletedPoint {
    let PP = (self.Y + self.X) * other.Y_plus_X;
    let MM = (self.Y - self.X) * other.Y_minus_X;
    let TT2d = self.T * other.T2d;
    let ZZ2 = (self.Z * other.Z).square2();

    CompletedPoint { X: PP - MM, Y: PP + MM, Z: ZZ2 + TT2d, T: ZZ2 - TT2d }
  }
}

impl<'a, 'b> Sub<&'b ProjectiveNielsPoint> for &'a EdwardsPoint {
  type Output = CompletedPoint;
  fn sub(self, other: &'b ProjectiveNielsPoint) -> CompletedPoint {
    let PM = (self.Y + self.X) * other.Y_minus_X;
    let MP = (self.Y - self.X) * other.Y_plus_X;
    let TT2d = self.T * other.T2d;
    let ZZ2 = (self.Z * other.Z).square2();

    CompletedPoint { X: PM - MP, Y: PM + MP, Z: ZZ2 - TT2d, T: ZZ2 + TT2d }
  }
}

impl<'a, 'b> Add<&'b AffineNielsPoint> for &'a EdwardsPoint {
  type Output = CompletedPoint;
  fn add(self, other: &'b AffineNielsPoint) -> CompletedPoint {
    let PP = (self.Y + self.X) * other.y_plus_x;
    let MM = (self.Y - self.X) * other.y_minus_x;
    let Txy2d = self.T * other.xy2d;
    let Z2 = self.Z + self.Z;

    CompletedPoint { X: PP - MM, Y: PP + MM, Z: Z2 + Txy2d, T: Z2 - Txy2d }
  }
}

impl<'a, 'b> Sub<&'b AffineNielsPoint> for &'a EdwardsPoint {
  type Output = CompletedPoint;
  fn sub(self, other: &'b AffineNielsPoint) -> CompletedPoint {
    let PM = (self.Y + self.X) * other.y_minus_x;
    let MP = (self.Y - self.X) * other.y_plus_x;
    let Txy2d = self.T * other.xy2d;
    let Z2 = self.Z + self.Z;

    CompletedPoint { X: PM - MP, Y: PM + MP, Z: Z2 - Txy2d, T: Z2 + Txy2d }
  }
}

impl<'a, 'b> Add<&'b EdwardsPoint> for &'a EdwardsPoint {
  type Output = EdwardsPoint;
  fn add(self, other: &'b EdwardsPoint) -> EdwardsPoint {
    (self + &other.to_projective_niels()).as_extended()
  }
}

impl<'a, 'b> Sub<&'b EdwardsPoint> for &'a EdwardsPoint {
  type Output = EdwardsPoint;
  fn sub(self, other: &'b EdwardsPoint) -> EdwardsPoint {
    (self - &other.to_projective_niels()).as_extended()
  }
}

impl<'a> Neg for &'a EdwardsPoint {
  type Output = EdwardsPoint;
  fn neg(self) -> EdwardsPoint {
    EdwardsPoint { X: -self.X, Y: self.Y, Z: self.Z, T: -self.T }
  }
}

impl Neg for EdwardsPoint {
  type Output = EdwardsPoint;
  fn neg(self) -> EdwardsPoint {
    -&self
  }
}

// Precomputed tables

/// `[P, 2P, .., 8P]`, with constant-time signed-digit selection.
#[derive(Clone, Copy)]
pub(crate) struct LookupTable<T>(pub(crate) [T; 8]);

impl<T> LookupTable<T>
where
  T: Identity + Copy + ConditionallySelectable,
  for<'a> &'a T: Neg<Output = T>,
{
  /// Select `x * P` for `-8 <= x <= 8`, without branching on `x`.
  pub(crate) fn select(&self, x: i8) -> T {
    debug_assert!((-8 ..= 8).contains(&x));

    let xmask = x as i16 >> 7;
    let xabs = ((x as i16 + xmask) ^ xmask) as u16;

    let mut t = T::identity();
    for j in 1 ..= 8 {
      t.conditional_assign(&self.0[j - 1], xabs.ct_eq(&(j as u16)));
    }
    t.conditional_negate(Choice::from((xmask & 1) as u8));
    t
  }
}

impl<'a> From<&'a EdwardsPoint> for LookupTable<ProjectiveNielsPoint> {
  fn from(P: &'a EdwardsPoint) -> LookupTable<ProjectiveNielsPoint> {
    let mut points = [P.to_projective_niels(); 8];
    for j in 0 .. 7 {
      points[j + 1] = (P + &points[j]).as_extended().to_projective_niels();
    }
    LookupTable(points)
  }
}

impl<'a> From<&'a EdwardsPoint> for LookupTable<AffineNielsPoint> {
  fn from(P: &'a EdwardsPoint) -> LookupTable<AffineNielsPoint> {
    let mut points = [P.to_affine_niels(); 8];
    for j in 0 .. 7 {
      points[j + 1] = (P + &points[j]).as_extended().to_affine_niels();
    }
    LookupTable(points)
  }
}

/// Odd multiples `[P, 3P, .., 15P]` for width-5 NAF.
pub(crate) struct NafLookupTable5<T>(pub(crate) [T; 8]);

impl<T: Copy> NafLookupTable5<T> {
  /// Select `x * P` for odd `x` with `1 <= x <= 15`. Variable-time.
  pub(crate) fn select(&self, x: usize) -> T {
    debug_assert!(x & 1 == 1);
    debug_assert!(x < 16);
    self.0[x / 2]
  }
}

impl<'a> From<&'a EdwardsPoint> for NafLookupTable5<ProjectiveNielsPoint> {
  fn from(A: &'a EdwardsPoint) -> NafLookupTable5<ProjectiveNielsPoint> {
    let mut Ai = [A.to_projective_niels(); 8];
    let A2 = A.double();
    for i in 0 .. 7 {
      Ai[i + 1] = (&A2 + &Ai[i]).as_extended().to_projective_niels();
    }
    NafLookupTable5(Ai)
  }
}

/// Odd multiples `[P, 3P, .., 127P]` for width-8 NAF.
pub(crate) struct NafLookupTable8<T>(pub(crate) [T; 64]);

impl<T: Copy> NafLookupTable8<T> {
  /// Select `x * P` for odd `x` with `1 <= x <= 127`. Variable-time.
  pub(crate) fn select(&self, x: usize) -> T {
    debug_assert!(x & 1 == 1);
    debug_assert!(x < 128);
    self.0[x / 2]
  }
}

impl<'a> From<&'a EdwardsPoint> for NafLookupTable8<AffineNielsPoint> {
  fn from(A: &'a EdwardsPoint) -> NafLookupTable8<AffineNielsPoint> {
    let mut Ai = [A.to_affine_niels(); 64];
    let A2 = A.double();
    for i in 0 .. 63 {
      Ai[i + 1] = (&A2 + &Ai[i]).as_extended().to_affine_niels();
    }
    NafLookupTable8(Ai)
  }
}

/// A comb table for the basepoint: 32 sub-tables, sub-table `i` holding
/// `[1, .., 8] * (256^i) * B` in affine-Niels form.
pub(crate) struct EdwardsBasepointTable(pub(crate) [LookupTable<AffineNielsPoint>; 32]);

impl EdwardsBasepointTable {
  pub(crate) fn create(basepoint: &EdwardsPoint) -> EdwardsBasepointTable {
    let mut table =
      EdwardsBasepointTable([LookupTable([AffineNielsPoint::identity(); 8]); 32]);
    let mut P = *basepoint;
    for i in 0 .. 32 {
      table.0[i] = LookupTable::from(&P);
      P = P.mul_by_pow_2(8);
    }
    table
  }

  /// Constant-time fixed-base multiplication.
  ///
  /// Writing the scalar in radix 16 as `sum(a_i 16^i)`, the odd-indexed
  /// digits are accumulated first, the partial result multiplied by 16, then
  /// the even-indexed digits accumulated, so each sub-table serves the pair
  /// of digits at `16^(2i)` and `16^(2i + 1)`.
  pub(crate) fn basepoint_mul(&self, scalar: &Scalar) -> EdwardsPoint {
    let a = scalar.to_radix_16();
    let mut P = EdwardsPoint::identity();

    for i in (0 .. 64).filter(|x| x % 2 == 1) {
      P = (&P + &self.0[i / 2].select(a[i])).as_extended();
    }

    P = P.mul_by_pow_2(4);

    for i in (0 .. 64).filter(|x| x % 2 == 0) {
      P = (&P + &self.0[i / 2].select(a[i])).as_extended();
    }

    P
  }
}

impl EdwardsPoint {
  /// The Ed25519 basepoint.
  pub(crate) fn generator() -> EdwardsPoint {
    ED25519_BASEPOINT
  }

  /// Constant-time scalar multiplication via a window-4 lookup table.
  pub(crate) fn mul(&self, scalar: &Scalar) -> EdwardsPoint {
    let table = LookupTable::<ProjectiveNielsPoint>::from(self);
    let e = scalar.to_radix_16();
    let mut h = EdwardsPoint::identity();
    for i in (0 .. 64).rev() {
      h = h.mul_by_pow_2(4);
      h = (&h + &table.select(e[i])).as_extended();
    }
    h
  }
}

impl<'a, 'b> Mul<&'b Scalar> for &'a EdwardsPoint {
  type Output = EdwardsPoint;
  fn mul(self, scalar: &'b Scalar) -> EdwardsPoint {
    EdwardsPoint::mul(self, scalar)
  }
}

/// `a * A + b * B` where `B` is the Ed25519 basepoint. Variable-time.
pub(crate) fn vartime_double_scalar_mul_basepoint(
  a: &Scalar,
  A: &EdwardsPoint,
  b: &Scalar,
) -> EdwardsPoint {
  let a_naf = a.non_adjacent_form(5);
  let b_naf = b.non_adjacent_form(8);

  let mut i = 255;
  for j in (0 .. 256).rev() {
    i = j;
    if (a_naf[i] != 0) || (b_naf[i] != 0) {
      break;
    }
  }

  let table_A = NafLookupTable5::<ProjectiveNielsPoint>::from(A);
  let table_B = &*crate::constants::AFFINE_ODD_MULTIPLES_OF_BASEPOINT;

  let mut r = ProjectivePoint::identity();
  loop {
    let mut t = r.double();

    if a_naf[i] > 0 {
      t = &t.as_extended() + &table_A.select(a_naf[i] as usize);
    } else if a_naf[i] < 0 {
      t = &t.as_extended() - &table_A.select(-a_naf[i] as usize);
    }

    if b_naf[i] > 0 {
      t = &t.as_extended() + &table_B.select(b_naf[i] as usize);
    } else if b_naf[i] < 0 {
      t = &t.as_extended() - &table_B.select(-b_naf[i] as usize);
    }

    r = t.as_projective();

    if i == 0 {
      break;
    }
    i -= 1;
  }

  r.as_extended()
}

#[cfg(test)]
mod tests {
  use super::*;

  // Reference double-and-add, for checking the table-driven paths
  fn slow_mul(P: &EdwardsPoint, scalar: &Scalar) -> EdwardsPoint {
    let mut r = EdwardsPoint::identity();
    for byte in scalar.as_bytes().iter().rev() {
      for bit in (0 .. 8).rev() {
        r = r.double();
        if (byte >> bit) & 1 == 1 {
          r = &r + P;
        }
      }
    }
    r
  }

  fn test_scalars() -> [Scalar; 4] {
    [
      Scalar::ZERO,
      Scalar::ONE,
      Scalar::from_bytes_mod_order([0xff; 32]),
      Scalar::from_bytes_mod_order_wide(&core::array::from_fn(|i| i as u8)),
    ]
  }

  #[test]
  fn comb_matches_double_and_add() {
    let B = EdwardsPoint::generator();
    let table = EdwardsBasepointTable::create(&B);
    for k in test_scalars() {
      assert!(bool::from(table.basepoint_mul(&k).ct_eq(&slow_mul(&B, &k))));
    }
  }

  #[test]
  fn window_mul_matches_double_and_add() {
    let B = EdwardsPoint::generator();
    let P = B.double();
    for k in test_scalars() {
      assert!(bool::from(EdwardsPoint::mul(&P, &k).ct_eq(&slow_mul(&P, &k))));
    }
  }

  #[test]
  fn double_scalar_mul() {
    let B = EdwardsPoint::generator();
    let a = Scalar::from_bytes_mod_order_wide(&core::array::from_fn(|i| (i as u8) * 3));
    let b = Scalar::from_bytes_mod_order_wide(&core::array::from_fn(|i| (i as u8) ^ 0x5a));
    let A = B.double();

    let fast = vartime_double_scalar_mul_basepoint(&a, &A, &b);
    let slow = &slow_mul(&A, &a) + &slow_mul(&B, &b);
    assert!(bool::from(fast.ct_eq(&slow)));
  }

  #[test]
  fn addition_laws() {
    let B = EdwardsPoint::generator();
    let B2 = B.double();
    assert!(bool::from((&B + &B).ct_eq(&B2)));
    assert!(bool::from((&B2 - &B).ct_eq(&B)));
    assert!(bool::from((&B - &B).ct_eq(&EdwardsPoint::identity())));
    assert!(bool::from((&B + &(-B)).ct_eq(&EdwardsPoint::identity())));
    assert!(bool::from(B.mul_by_pow_2(2).ct_eq(&B2.double())));
  }
}
