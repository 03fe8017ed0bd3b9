// Curve constants in the radix-2^51 representation, and the lazily-built
// basepoint tables.

use lazy_static::lazy_static;

use crate::{
  field::FieldElement,
  curve::{EdwardsPoint, AffineNielsPoint, NafLookupTable8, EdwardsBasepointTable},
  ristretto::{RistrettoPoint, RistrettoBasepointTable},
};

/// The Edwards curve parameter `d = -121665/121666 (mod p)`.
pub(crate) const EDWARDS_D: FieldElement = FieldElement([
  929955233495203,
  466365720129213,
  1662059464998953,
  2033849074728123,
  1442794654840575,
]);

/// `2 * d`.
pub(crate) const EDWARDS_D2: FieldElement = FieldElement([
  1859910466990425,
  932731440258426,
  1072319116312658,
  1815898335770999,
  633789495995903,
]);

/// A square root of -1 (mod p).
pub(crate) const SQRT_M1: FieldElement = FieldElement([
  1718705420411056,
  234908883556509,
  2233514472574048,
  2117202627021982,
  765476049583133,
]);

/// `1/sqrt(a - d)` with `a = -1`, the "magic" constant of the Ristretto
/// encoding.
pub(crate) const INVSQRT_A_MINUS_D: FieldElement = FieldElement([
  278908739862762,
  821645201101625,
  8113234426968,
  1777959178193151,
  2118520810568447,
]);

/// The Ed25519 basepoint, `(x, 4/5)` with `x` non-negative.
pub(crate) const ED25519_BASEPOINT: EdwardsPoint = EdwardsPoint {
  X: FieldElement([
    1738742601995546,
    1146398526822698,
    2070867633025821,
    562264141797630,
    587772402128613,
  ]),
  Y: FieldElement([
    1801439850948184,
    1351079888211148,
    450359962737049,
    900719925474099,
    1801439850948198,
  ]),
  Z: FieldElement([1, 0, 0, 0, 0]),
  T: FieldElement([
    1841354044333475,
    16398895984059,
    755974180946558,
    900171276175154,
    1821297809914039,
  ]),
};

/// The Ristretto basepoint.
pub const RISTRETTO_BASEPOINT_POINT: RistrettoPoint = RistrettoPoint(ED25519_BASEPOINT);

lazy_static! {
  /// The comb table for the basepoint, built on first use and shared
  /// process-wide.
  pub static ref RISTRETTO_BASEPOINT_TABLE: RistrettoBasepointTable =
    RistrettoBasepointTable(EdwardsBasepointTable::create(&ED25519_BASEPOINT));

  /// Odd multiples of the basepoint for width-8 NAF verification.
  pub(crate) static ref AFFINE_ODD_MULTIPLES_OF_BASEPOINT:
    NafLookupTable8<AffineNielsPoint> = NafLookupTable8::from(&ED25519_BASEPOINT);
}
