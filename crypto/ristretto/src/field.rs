use core::ops::{Add, AddAssign, Neg, Sub, SubAssign, Mul, MulAssign};

use zeroize::Zeroize;
use subtle::{Choice, ConstantTimeEq, ConditionallySelectable, ConditionallyNegatable};

use crate::{backend::load8, constants::SQRT_M1};

const LOW_51_BIT_MASK: u64 = (1 << 51) - 1;

/// An element of GF(2^255 - 19), as five 64-bit limbs in radix 2^51.
///
/// Limbs are kept weakly reduced (below 2^52) so additions and
/// multiplications never overflow. Only `to_bytes` produces the canonical
/// representative.
#[derive(Clone, Copy, Debug, Zeroize)]
pub struct FieldElement(pub(crate) [u64; 5]);

impl ConstantTimeEq for FieldElement {
  fn ct_eq(&self, other: &FieldElement) -> Choice {
    self.to_bytes().ct_eq(&other.to_bytes())
  }
}

impl PartialEq for FieldElement {
  fn eq(&self, other: &FieldElement) -> bool {
    self.ct_eq(other).into()
  }
}
impl Eq for FieldElement {}

impl ConditionallySelectable for FieldElement {
  fn conditional_select(a: &FieldElement, b: &FieldElement, choice: Choice) -> FieldElement {
    FieldElement([
      u64::conditional_select(&a.0[0], &b.0[0], choice),
      u64::conditional_select(&a.0[1], &b.0[1], choice),
      u64::conditional_select(&a.0[2], &b.0[2], choice),
      u64::conditional_select(&a.0[3], &b.0[3], choice),
      u64::conditional_select(&a.0[4], &b.0[4], choice),
    ])
  }

  fn conditional_assign(&mut self, other: &FieldElement, choice: Choice) {
    self.0[0].conditional_assign(&other.0[0], choice);
    self.0[1].conditional_assign(&other.0[1], choice);
    self.0[2].conditional_assign(&other.0[2], choice);
    self.0[3].conditional_assign(&other.0[3], choice);
    self.0[4].conditional_assign(&other.0[4], choice);
  }
}

impl<'a, 'b> Add<&'b FieldElement> for &'a FieldElement {
  type Output = FieldElement;
  fn add(self, other: &'b FieldElement) -> FieldElement {
    let mut sum = *self;
    for i in 0 .. 5 {
      sum.0[i] += other.0[i];
    }
    sum.weak_reduce()
  }
}
math_variants!(Add, add, AddAssign, add_assign, FieldElement);

impl<'a, 'b> Sub<&'b FieldElement> for &'a FieldElement {
  type Output = FieldElement;
  fn sub(self, other: &'b FieldElement) -> FieldElement {
    // Add 16p before subtracting so no limb underflows
    FieldElement([
      (self.0[0] + 36028797018963664) - other.0[0],
      (self.0[1] + 36028797018963952) - other.0[1],
      (self.0[2] + 36028797018963952) - other.0[2],
      (self.0[3] + 36028797018963952) - other.0[3],
      (self.0[4] + 36028797018963952) - other.0[4],
    ])
    .weak_reduce()
  }
}
math_variants!(Sub, sub, SubAssign, sub_assign, FieldElement);

impl<'a> Neg for &'a FieldElement {
  type Output = FieldElement;
  fn neg(self) -> FieldElement {
    FieldElement([
      36028797018963664 - self.0[0],
      36028797018963952 - self.0[1],
      36028797018963952 - self.0[2],
      36028797018963952 - self.0[3],
      36028797018963952 - self.0[4],
    ])
    .weak_reduce()
  }
}
neg_variant!(FieldElement);

fn m(x: u64, y: u64) -> u128 {
  u128::from(x) * u128::from(y)
}

impl<'a, 'b> Mul<&'b FieldElement> for &'a FieldElement {
  type Output = FieldElement;
  fn mul(self, other: &'b FieldElement) -> FieldElement {
    let a = &self.0;
    let b = &other.0;

    // 2^255 = 19, so limb products past the top wrap with a factor of 19
    let b1_19 = b[1] * 19;
    let b2_19 = b[2] * 19;
    let b3_19 = b[3] * 19;
    let b4_19 = b[4] * 19;

    let c0 = m(a[0], b[0]) + m(a[4], b1_19) + m(a[3], b2_19) + m(a[2], b3_19) + m(a[1], b4_19);
    let mut c1 =
      m(a[1], b[0]) + m(a[0], b[1]) + m(a[4], b2_19) + m(a[3], b3_19) + m(a[2], b4_19);
    let mut c2 = m(a[2], b[0]) + m(a[1], b[1]) + m(a[0], b[2]) + m(a[4], b3_19) + m(a[3], b4_19);
    let mut c3 = m(a[3], b[0]) + m(a[2], b[1]) + m(a[1], b[2]) + m(a[0], b[3]) + m(a[4], b4_19);
    let mut c4 = m(a[4], b[0]) + m(a[3], b[1]) + m(a[2], b[2]) + m(a[1], b[3]) + m(a[0], b[4]);

    let mut out = [0; 5];
    c1 += u128::from((c0 >> 51) as u64);
    out[0] = (c0 as u64) & LOW_51_BIT_MASK;
    c2 += u128::from((c1 >> 51) as u64);
    out[1] = (c1 as u64) & LOW_51_BIT_MASK;
    c3 += u128::from((c2 >> 51) as u64);
    out[2] = (c2 as u64) & LOW_51_BIT_MASK;
    c4 += u128::from((c3 >> 51) as u64);
    out[3] = (c3 as u64) & LOW_51_BIT_MASK;
    let carry = (c4 >> 51) as u64;
    out[4] = (c4 as u64) & LOW_51_BIT_MASK;

    out[0] += carry * 19;
    out[1] += out[0] >> 51;
    out[0] &= LOW_51_BIT_MASK;

    FieldElement(out)
  }
}
math_variants!(Mul, mul, MulAssign, mul_assign, FieldElement);

impl FieldElement {
  pub const ZERO: FieldElement = FieldElement([0, 0, 0, 0, 0]);
  pub const ONE: FieldElement = FieldElement([1, 0, 0, 0, 0]);

  fn weak_reduce(mut self) -> FieldElement {
    let c0 = self.0[0] >> 51;
    let c1 = self.0[1] >> 51;
    let c2 = self.0[2] >> 51;
    let c3 = self.0[3] >> 51;
    let c4 = self.0[4] >> 51;

    for limb in &mut self.0 {
      *limb &= LOW_51_BIT_MASK;
    }

    self.0[0] += c4 * 19;
    self.0[1] += c0;
    self.0[2] += c1;
    self.0[3] += c2;
    self.0[4] += c3;

    self
  }

  /// Interpret 32 little-endian bytes as a field element.
  ///
  /// The high bit of the last byte is masked off. Non-canonical encodings
  /// are accepted and reduced; this never fails.
  pub fn from_bytes(bytes: &[u8; 32]) -> FieldElement {
    FieldElement([
      load8(&bytes[0 ..]) & LOW_51_BIT_MASK,
      (load8(&bytes[6 ..]) >> 3) & LOW_51_BIT_MASK,
      (load8(&bytes[12 ..]) >> 6) & LOW_51_BIT_MASK,
      (load8(&bytes[19 ..]) >> 1) & LOW_51_BIT_MASK,
      (load8(&bytes[24 ..]) >> 12) & LOW_51_BIT_MASK,
    ])
  }

  /// The canonical little-endian encoding of this element.
  pub fn to_bytes(&self) -> [u8; 32] {
    let mut limbs = self.weak_reduce().0;

    // Compute q, the carry out of (limbs + 19) >> 255, so adding 19q folds
    // the representative into [0, p)
    let mut q = (limbs[0] + 19) >> 51;
    q = (limbs[1] + q) >> 51;
    q = (limbs[2] + q) >> 51;
    q = (limbs[3] + q) >> 51;
    q = (limbs[4] + q) >> 51;

    limbs[0] += 19 * q;

    limbs[1] += limbs[0] >> 51;
    limbs[0] &= LOW_51_BIT_MASK;
    limbs[2] += limbs[1] >> 51;
    limbs[1] &= LOW_51_BIT_MASK;
    limbs[3] += limbs[2] >> 51;
    limbs[2] &= LOW_51_BIT_MASK;
    limbs[4] += limbs[3] >> 51;
    limbs[3] &= LOW_51_BIT_MASK;
    // The 2^255 bit, if set, is exactly p + (low bits); discard it
    limbs[4] &= LOW_51_BIT_MASK;

    let mut s = [0; 32];
    s[0] = limbs[0] as u8;
    s[1] = (limbs[0] >> 8) as u8;
    s[2] = (limbs[0] >> 16) as u8;
    s[3] = (limbs[0] >> 24) as u8;
    s[4] = (limbs[0] >> 32) as u8;
    s[5] = (limbs[0] >> 40) as u8;
    s[6] = ((limbs[0] >> 48) | (limbs[1] << 3)) as u8;
    s[7] = (limbs[1] >> 5) as u8;
    s[8] = (limbs[1] >> 13) as u8;
    s[9] = (limbs[1] >> 21) as u8;
    s[10] = (limbs[1] >> 29) as u8;
    s[11] = (limbs[1] >> 37) as u8;
    s[12] = ((limbs[1] >> 45) | (limbs[2] << 6)) as u8;
    s[13] = (limbs[2] >> 2) as u8;
    s[14] = (limbs[2] >> 10) as u8;
    s[15] = (limbs[2] >> 18) as u8;
    s[16] = (limbs[2] >> 26) as u8;
    s[17] = (limbs[2] >> 34) as u8;
    s[18] = (limbs[2] >> 42) as u8;
    s[19] = ((limbs[2] >> 50) | (limbs[3] << 1)) as u8;
    s[20] = (limbs[3] >> 7) as u8;
    s[21] = (limbs[3] >> 15) as u8;
    s[22] = (limbs[3] >> 23) as u8;
    s[23] = (limbs[3] >> 31) as u8;
    s[24] = (limbs[3] >> 39) as u8;
    s[25] = ((limbs[3] >> 47) | (limbs[4] << 4)) as u8;
    s[26] = (limbs[4] >> 4) as u8;
    s[27] = (limbs[4] >> 12) as u8;
    s[28] = (limbs[4] >> 20) as u8;
    s[29] = (limbs[4] >> 28) as u8;
    s[30] = (limbs[4] >> 36) as u8;
    s[31] = (limbs[4] >> 44) as u8;
    s
  }

  /// Compute `self^(2^k)` by `k` successive squarings. `k` must be non-zero.
  pub(crate) fn pow2k(&self, mut k: u32) -> FieldElement {
    debug_assert!(k > 0);

    let mut a = self.0;
    loop {
      let a3_19 = 19 * a[3];
      let a4_19 = 19 * a[4];

      let c0 = m(a[0], a[0]) + 2 * (m(a[1], a4_19) + m(a[2], a3_19));
      let mut c1 = m(a[3], a3_19) + 2 * (m(a[0], a[1]) + m(a[2], a4_19));
      let mut c2 = m(a[1], a[1]) + 2 * (m(a[0], a[2]) + m(a[4], a3_19));
      let mut c3 = m(a[4], a4_19) + 2 * (m(a[0], a[3]) + m(a[1], a[2]));
      let mut c4 = m(a[2], a[2]) + 2 * (m(a[0], a[4]) + m(a[1], a[3]));

      c1 += u128::from((c0 >> 51) as u64);
      a[0] = (c0 as u64) & LOW_51_BIT_MASK;
      c2 += u128::from((c1 >> 51) as u64);
      a[1] = (c1 as u64) & LOW_51_BIT_MASK;
      c3 += u128::from((c2 >> 51) as u64);
      a[2] = (c2 as u64) & LOW_51_BIT_MASK;
      c4 += u128::from((c3 >> 51) as u64);
      a[3] = (c3 as u64) & LOW_51_BIT_MASK;
      let carry = (c4 >> 51) as u64;
      a[4] = (c4 as u64) & LOW_51_BIT_MASK;

      a[0] += carry * 19;
      a[1] += a[0] >> 51;
      a[0] &= LOW_51_BIT_MASK;

      k -= 1;
      if k == 0 {
        break;
      }
    }

    FieldElement(a)
  }

  /// `self^2`.
  pub fn square(&self) -> FieldElement {
    self.pow2k(1)
  }

  /// `2 * self^2`.
  pub fn square2(&self) -> FieldElement {
    let mut square = self.pow2k(1);
    for limb in &mut square.0 {
      *limb *= 2;
    }
    square
  }

  // Shared prefix of the inversion and square-root chains:
  // (self^(2^250 - 1), self^11).
  fn pow22501(&self) -> (FieldElement, FieldElement) {
    let t0 = self.square();
    let t1 = t0.square().square();
    let t2 = self * t1;
    let t3 = t0 * t2;
    let t4 = t3.square();
    let t5 = t2 * t4;
    let t6 = t5.pow2k(5);
    let t7 = t6 * t5;
    let t8 = t7.pow2k(10);
    let t9 = t8 * t7;
    let t10 = t9.pow2k(20);
    let t11 = t10 * t9;
    let t12 = t11.pow2k(10);
    let t13 = t12 * t7;
    let t14 = t13.pow2k(50);
    let t15 = t14 * t13;
    let t16 = t15.pow2k(100);
    let t17 = t16 * t15;
    let t18 = t17.pow2k(50);
    let t19 = t18 * t13;
    (t19, t3)
  }

  /// The multiplicative inverse, via the standard addition chain for
  /// `self^(p - 2)`. Zero maps to zero.
  pub fn invert(&self) -> FieldElement {
    let (t19, t3) = self.pow22501();
    t19.pow2k(5) * t3
  }

  // self^((p - 5) / 8) = self^(2^252 - 3).
  fn pow_p58(&self) -> FieldElement {
    let (t19, _) = self.pow22501();
    self * t19.pow2k(2)
  }

  /// Compute `sqrt(u / v)`, with the sign of zero chosen so the result is
  /// non-negative.
  ///
  /// Returns `(Choice(1), +sqrt(u / v))` if `v` is non-zero and `u / v` is
  /// square, `(Choice(1), 0)` if `u` is zero, `(Choice(0), 0)` if `v` is
  /// zero and `u` is non-zero, and `(Choice(0), +sqrt(i * u / v))` if
  /// `u / v` is non-square (where `i = sqrt(-1)`).
  pub fn sqrt_ratio_i(u: &FieldElement, v: &FieldElement) -> (Choice, FieldElement) {
    let v3 = v.square() * v;
    let v7 = v3.square() * v;
    let mut r = (u * v3) * (u * v7).pow_p58();
    let check = v * r.square();

    let correct_sign_sqrt = check.ct_eq(u);
    let flipped_sign_sqrt = check.ct_eq(&-u);
    let flipped_sign_sqrt_i = check.ct_eq(&(-u * SQRT_M1));

    let r_prime = SQRT_M1 * r;
    r.conditional_assign(&r_prime, flipped_sign_sqrt | flipped_sign_sqrt_i);

    let r_is_negative = r.is_negative();
    r.conditional_negate(r_is_negative);

    (correct_sign_sqrt | flipped_sign_sqrt, r)
  }

  /// `1 / sqrt(self)`, with the flags of `sqrt_ratio_i`.
  pub(crate) fn invsqrt(&self) -> (Choice, FieldElement) {
    FieldElement::sqrt_ratio_i(&FieldElement::ONE, self)
  }

  /// The sign convention of the Ristretto and Ed25519 papers: an element is
  /// negative if the low bit of its canonical encoding is set.
  pub fn is_negative(&self) -> Choice {
    Choice::from(self.to_bytes()[0] & 1)
  }

  pub fn is_zero(&self) -> Choice {
    self.to_bytes().ct_eq(&[0; 32])
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn hex_32(hex: &str) -> [u8; 32] {
    hex::decode(hex).unwrap().try_into().unwrap()
  }

  // a = the bytes 0x00 ..= 0x1f, a canonical encoding
  const A_HEX: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

  #[test]
  fn encoding_round_trip() {
    let a = FieldElement::from_bytes(&hex_32(A_HEX));
    assert_eq!(a.to_bytes(), hex_32(A_HEX));

    // Non-canonical encodings reduce: p + 1 decodes to 1
    let mut p_plus_one = [0xff; 32];
    p_plus_one[0] = 0xee;
    p_plus_one[31] = 0x7f;
    assert_eq!(FieldElement::from_bytes(&p_plus_one), FieldElement::ONE);
    assert_eq!(FieldElement::from_bytes(&p_plus_one).to_bytes(), FieldElement::ONE.to_bytes());
  }

  #[test]
  fn square_and_invert() {
    let a = FieldElement::from_bytes(&hex_32(A_HEX));
    assert_eq!(
      a.square().to_bytes(),
      hex_32("d8ec2c5e5bff24a7602ce565892a24518cb0981f2075f987fb2efd40d5945a01"),
    );
    assert_eq!(a.square2(), a.square() + a.square());
    assert_eq!(
      a.invert().to_bytes(),
      hex_32("4dcd88822d0589ded58c28d85290e85dcd88822d0589ded58c28d85290e85d73"),
    );
    assert_eq!(a * a.invert(), FieldElement::ONE);
    assert_eq!(FieldElement::ZERO.invert(), FieldElement::ZERO);
  }

  #[test]
  fn arithmetic() {
    let a = FieldElement::from_bytes(&hex_32(A_HEX));
    assert_eq!(a - a, FieldElement::ZERO);
    assert_eq!(a + -a, FieldElement::ZERO);
    assert_eq!(-(-a), a);
    assert_eq!(a * FieldElement::ONE, a);
    assert_eq!((a + a) * a, a.square2());
  }

  #[test]
  fn sqrt_ratio_edge_cases() {
    let four = FieldElement::ONE + FieldElement::ONE + FieldElement::ONE + FieldElement::ONE;

    let (ok, r) = FieldElement::sqrt_ratio_i(&FieldElement::ZERO, &FieldElement::ZERO);
    assert!(bool::from(ok));
    assert_eq!(r, FieldElement::ZERO);

    let (ok, r) = FieldElement::sqrt_ratio_i(&FieldElement::ONE, &FieldElement::ZERO);
    assert!(!bool::from(ok));
    assert_eq!(r, FieldElement::ZERO);

    let (ok, r) = FieldElement::sqrt_ratio_i(&four, &FieldElement::ONE);
    assert!(bool::from(ok));
    assert_eq!(r.square(), four);
    assert!(!bool::from(r.is_negative()));
  }

  #[test]
  fn sqrt_ratio_laws() {
    let mut x = FieldElement::from_bytes(&hex_32(A_HEX));
    for _ in 0 .. 32 {
      x = x.square() + FieldElement::ONE;
      let (ok, r) = FieldElement::sqrt_ratio_i(&x, &FieldElement::ONE);
      if bool::from(ok) {
        assert_eq!(r.square(), x);
      } else {
        assert_eq!(r.square(), x * SQRT_M1);
      }
      assert!(!bool::from(r.is_negative()));
    }
  }
}
