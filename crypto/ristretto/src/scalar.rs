use core::ops::{Add, AddAssign, Neg, Sub, SubAssign, Mul, MulAssign, Index};

use rand_core::{RngCore, CryptoRng};

use zeroize::Zeroize;
use subtle::{Choice, CtOption, ConstantTimeEq, ConditionallySelectable};

use crate::backend::load4;

/// An integer modulo the Ristretto group order
/// `l = 2^252 + 27742317777372353535851937790883648493`.
///
/// The canonical little-endian byte encoding is the sole authoritative form.
/// The radix-2^29 Montgomery backend used for multiplication and reduction is
/// derived on demand and never escapes this module.
#[derive(Clone, Copy, Debug, Default, Zeroize)]
pub struct Scalar {
  pub(crate) bytes: [u8; 32],
}

impl ConstantTimeEq for Scalar {
  fn ct_eq(&self, other: &Scalar) -> Choice {
    self.bytes.ct_eq(&other.bytes)
  }
}

impl PartialEq for Scalar {
  fn eq(&self, other: &Scalar) -> bool {
    self.ct_eq(other).into()
  }
}
impl Eq for Scalar {}

impl ConditionallySelectable for Scalar {
  fn conditional_select(a: &Scalar, b: &Scalar, choice: Choice) -> Scalar {
    let mut bytes = [0; 32];
    for (i, byte) in bytes.iter_mut().enumerate() {
      *byte = u8::conditional_select(&a.bytes[i], &b.bytes[i], choice);
    }
    Scalar { bytes }
  }
}

impl Index<usize> for Scalar {
  type Output = u8;
  fn index(&self, i: usize) -> &u8 {
    &self.bytes[i]
  }
}

impl<'a, 'b> Add<&'b Scalar> for &'a Scalar {
  type Output = Scalar;
  fn add(self, other: &'b Scalar) -> Scalar {
    UnpackedScalar::add(&self.unpack(), &other.unpack()).pack()
  }
}
math_variants!(Add, add, AddAssign, add_assign, Scalar);

impl<'a, 'b> Sub<&'b Scalar> for &'a Scalar {
  type Output = Scalar;
  fn sub(self, other: &'b Scalar) -> Scalar {
    UnpackedScalar::sub(&self.unpack(), &other.unpack()).pack()
  }
}
math_variants!(Sub, sub, SubAssign, sub_assign, Scalar);

impl<'a, 'b> Mul<&'b Scalar> for &'a Scalar {
  type Output = Scalar;
  fn mul(self, other: &'b Scalar) -> Scalar {
    UnpackedScalar::mul(&self.unpack(), &other.unpack()).pack()
  }
}
math_variants!(Mul, mul, MulAssign, mul_assign, Scalar);

impl<'a> Neg for &'a Scalar {
  type Output = Scalar;
  fn neg(self) -> Scalar {
    Scalar::ZERO - self
  }
}
neg_variant!(Scalar);

impl Scalar {
  pub const ZERO: Scalar = Scalar { bytes: [0; 32] };
  pub const ONE: Scalar = Scalar {
    bytes: [
      1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
      0, 0,
    ],
  };

  /// Reduce 32 little-endian bytes modulo `l`.
  pub fn from_bytes_mod_order(bytes: [u8; 32]) -> Scalar {
    Scalar { bytes }.reduce()
  }

  /// Reduce a uniform 512-bit little-endian sample modulo `l`.
  ///
  /// This is the canonical way to turn transcript PRF output into a scalar.
  pub fn from_bytes_mod_order_wide(input: &[u8; 64]) -> Scalar {
    UnpackedScalar::from_bytes_wide(input).pack()
  }

  /// Construct a scalar from its canonical encoding, rejecting any value
  /// not already reduced modulo `l`.
  pub fn from_canonical_bytes(bytes: [u8; 32]) -> CtOption<Scalar> {
    let high_bit_unset = (bytes[31] >> 7).ct_eq(&0);
    let candidate = Scalar { bytes };
    CtOption::new(candidate, high_bit_unset & candidate.ct_eq(&candidate.reduce()))
  }

  /// Construct a scalar from 32 bytes with only bit 255 cleared, treating
  /// the result as already reduced.
  ///
  /// This matches the Ed25519 expanded-key convention, where clamped
  /// scalars are used without reduction. The caller is responsible for the
  /// value actually being in range.
  pub fn from_bits(mut bytes: [u8; 32]) -> Scalar {
    bytes[31] &= 0b0111_1111;
    Scalar { bytes }
  }

  /// Sample a uniform scalar by wide reduction of 64 random bytes.
  pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Scalar {
    let mut bytes = [0; 64];
    rng.fill_bytes(&mut bytes);
    let res = Scalar::from_bytes_mod_order_wide(&bytes);
    bytes.zeroize();
    res
  }

  pub fn to_bytes(&self) -> [u8; 32] {
    self.bytes
  }

  pub fn as_bytes(&self) -> &[u8; 32] {
    &self.bytes
  }

  fn reduce(&self) -> Scalar {
    let x = self.unpack();
    let x_r = UnpackedScalar::mul_internal(&x, &constants::R_MOD_L);
    UnpackedScalar::montgomery_reduce(&x_r).pack()
  }

  fn unpack(&self) -> UnpackedScalar {
    UnpackedScalar::from_bytes(&self.bytes)
  }

  /// Recode to 64 signed radix-16 digits, each in `[-8, 8)`, with the final
  /// digit in `[0, 8]`. Requires the scalar to be reduced.
  pub(crate) fn to_radix_16(&self) -> [i8; 64] {
    debug_assert!(self[31] <= 127);
    let mut output = [0i8; 64];

    #[inline(always)]
    fn bot_half(x: u8) -> u8 {
      x & 15
    }
    #[inline(always)]
    fn top_half(x: u8) -> u8 {
      (x >> 4) & 15
    }

    for i in 0 .. 32 {
      output[2 * i] = bot_half(self[i]) as i8;
      output[(2 * i) + 1] = top_half(self[i]) as i8;
    }

    // Recenter from [0, 16) to [-8, 8)
    for i in 0 .. 63 {
      let carry = (output[i] + 8) >> 4;
      output[i] -= carry << 4;
      output[i + 1] += carry;
    }

    output
  }

  /// Width-`w` non-adjacent form: 256 signed digits, each odd or zero and
  /// within `(-2^(w-1), 2^(w-1))`, with at most one non-zero digit in any
  /// window of `w`.
  pub(crate) fn non_adjacent_form(&self, w: usize) -> [i8; 256] {
    debug_assert!(w >= 2);
    debug_assert!(w <= 8);

    let mut naf = [0i8; 256];

    let mut x_u64 = [0u64; 5];
    for i in 0 .. 4 {
      x_u64[i] = u64::from_le_bytes(self.bytes[(i * 8) .. ((i + 1) * 8)].try_into().unwrap());
    }

    let width = 1 << w;
    let window_mask = width - 1;

    let mut pos = 0;
    let mut carry = 0;
    while pos < 256 {
      let u64_idx = pos / 64;
      let bit_idx = pos % 64;
      let bit_buf = if bit_idx < (64 - w) {
        x_u64[u64_idx] >> bit_idx
      } else {
        (x_u64[u64_idx] >> bit_idx) | (x_u64[u64_idx + 1] << (64 - bit_idx))
      };

      let window = carry + (bit_buf & window_mask);

      if window & 1 == 0 {
        // An even window preserves the carry
        pos += 1;
        continue;
      }

      if window < (width / 2) {
        carry = 0;
        naf[pos] = window as i8;
      } else {
        carry = 1;
        naf[pos] = (window as i8).wrapping_sub(width as i8);
      }

      pos += w;
    }

    naf
  }
}

// The radix-2^29 Montgomery backend. Nine 29-bit limbs in u32s, with u64
// intermediate products.

fn m(x: u32, y: u32) -> u64 {
  u64::from(x) * u64::from(y)
}

const MASK_29: u32 = (1 << 29) - 1;
const MASK_24: u32 = (1 << 24) - 1;

#[derive(Clone, Copy, Debug, Zeroize)]
pub(crate) struct UnpackedScalar(pub(crate) [u32; 9]);

mod constants {
  use super::UnpackedScalar;

  /// `l`, the group order.
  pub(crate) const L: UnpackedScalar = UnpackedScalar([
    0x1cf5_d3ed, 0x0093_18d2, 0x1de7_3596, 0x1df3_bd45, 0x0000_014d, 0x0000_0000, 0x0000_0000,
    0x0000_0000, 0x0010_0000,
  ]);

  /// `l * LFACTOR = -1 (mod 2^29)`.
  pub(crate) const LFACTOR: u32 = 0x1254_7e1b;

  /// `R % l` for `R = 2^261`.
  pub(crate) const R_MOD_L: UnpackedScalar = UnpackedScalar([
    0x114d_f9ed, 0x1a61_7303, 0x0f7c_098c, 0x1679_3167, 0x1ffd_656e, 0x1fff_ffff, 0x1fff_ffff,
    0x1fff_ffff, 0x000f_ffff,
  ]);

  /// `(R^2) % l` for `R = 2^261`.
  pub(crate) const RR: UnpackedScalar = UnpackedScalar([
    0x0b5f_9d12, 0x1e14_1b17, 0x158d_7f3d, 0x143f_3757, 0x1972_d781, 0x042f_eb7c, 0x1cee_c73d,
    0x1e18_4d1e, 0x0005_046d,
  ]);
}

impl UnpackedScalar {
  const ZERO: UnpackedScalar = UnpackedScalar([0; 9]);

  fn from_bytes(bytes: &[u8; 32]) -> UnpackedScalar {
    let mut words = [0u32; 8];
    for i in 0 .. 8 {
      words[i] = load4(&bytes[(i * 4) ..]);
    }

    UnpackedScalar([
      words[0] & MASK_29,
      ((words[0] >> 29) | (words[1] << 3)) & MASK_29,
      ((words[1] >> 26) | (words[2] << 6)) & MASK_29,
      ((words[2] >> 23) | (words[3] << 9)) & MASK_29,
      ((words[3] >> 20) | (words[4] << 12)) & MASK_29,
      ((words[4] >> 17) | (words[5] << 15)) & MASK_29,
      ((words[5] >> 14) | (words[6] << 18)) & MASK_29,
      ((words[6] >> 11) | (words[7] << 21)) & MASK_29,
      (words[7] >> 8) & MASK_24,
    ])
  }

  /// Reduce a 64-byte little-endian sample: split as `lo + 2^261 hi`, map
  /// both through Montgomery multiplication, and recombine.
  fn from_bytes_wide(bytes: &[u8; 64]) -> UnpackedScalar {
    let mut words = [0u32; 16];
    for i in 0 .. 16 {
      words[i] = load4(&bytes[(i * 4) ..]);
    }

    let mut lo = UnpackedScalar::ZERO;
    let mut hi = UnpackedScalar::ZERO;

    lo.0[0] = words[0] & MASK_29;
    lo.0[1] = ((words[0] >> 29) | (words[1] << 3)) & MASK_29;
    lo.0[2] = ((words[1] >> 26) | (words[2] << 6)) & MASK_29;
    lo.0[3] = ((words[2] >> 23) | (words[3] << 9)) & MASK_29;
    lo.0[4] = ((words[3] >> 20) | (words[4] << 12)) & MASK_29;
    lo.0[5] = ((words[4] >> 17) | (words[5] << 15)) & MASK_29;
    lo.0[6] = ((words[5] >> 14) | (words[6] << 18)) & MASK_29;
    lo.0[7] = ((words[6] >> 11) | (words[7] << 21)) & MASK_29;
    lo.0[8] = ((words[7] >> 8) | (words[8] << 24)) & MASK_29;
    hi.0[0] = ((words[8] >> 5) | (words[9] << 27)) & MASK_29;
    hi.0[1] = (words[9] >> 2) & MASK_29;
    hi.0[2] = ((words[9] >> 31) | (words[10] << 1)) & MASK_29;
    hi.0[3] = ((words[10] >> 28) | (words[11] << 4)) & MASK_29;
    hi.0[4] = ((words[11] >> 25) | (words[12] << 7)) & MASK_29;
    hi.0[5] = ((words[12] >> 22) | (words[13] << 10)) & MASK_29;
    hi.0[6] = ((words[13] >> 19) | (words[14] << 13)) & MASK_29;
    hi.0[7] = ((words[14] >> 16) | (words[15] << 16)) & MASK_29;
    hi.0[8] = words[15] >> 13;

    // lo * R / R = lo, hi * R^2 / R = hi * 2^261
    let lo = UnpackedScalar::montgomery_mul(&lo, &constants::R_MOD_L);
    let hi = UnpackedScalar::montgomery_mul(&hi, &constants::RR);

    UnpackedScalar::add(&hi, &lo)
  }

  fn pack(&self) -> Scalar {
    let limbs = &self.0;
    let mut s = [0; 32];
    s[0] = limbs[0] as u8;
    s[1] = (limbs[0] >> 8) as u8;
    s[2] = (limbs[0] >> 16) as u8;
    s[3] = ((limbs[0] >> 24) | (limbs[1] << 5)) as u8;
    s[4] = (limbs[1] >> 3) as u8;
    s[5] = (limbs[1] >> 11) as u8;
    s[6] = (limbs[1] >> 19) as u8;
    s[7] = ((limbs[1] >> 27) | (limbs[2] << 2)) as u8;
    s[8] = (limbs[2] >> 6) as u8;
    s[9] = (limbs[2] >> 14) as u8;
    s[10] = ((limbs[2] >> 22) | (limbs[3] << 7)) as u8;
    s[11] = (limbs[3] >> 1) as u8;
    s[12] = (limbs[3] >> 9) as u8;
    s[13] = (limbs[3] >> 17) as u8;
    s[14] = ((limbs[3] >> 25) | (limbs[4] << 4)) as u8;
    s[15] = (limbs[4] >> 4) as u8;
    s[16] = (limbs[4] >> 12) as u8;
    s[17] = (limbs[4] >> 20) as u8;
    s[18] = ((limbs[4] >> 28) | (limbs[5] << 1)) as u8;
    s[19] = (limbs[5] >> 7) as u8;
    s[20] = (limbs[5] >> 15) as u8;
    s[21] = ((limbs[5] >> 23) | (limbs[6] << 6)) as u8;
    s[22] = (limbs[6] >> 2) as u8;
    s[23] = (limbs[6] >> 10) as u8;
    s[24] = (limbs[6] >> 18) as u8;
    s[25] = ((limbs[6] >> 26) | (limbs[7] << 3)) as u8;
    s[26] = (limbs[7] >> 5) as u8;
    s[27] = (limbs[7] >> 13) as u8;
    s[28] = (limbs[7] >> 21) as u8;
    s[29] = limbs[8] as u8;
    s[30] = (limbs[8] >> 8) as u8;
    s[31] = (limbs[8] >> 16) as u8;
    Scalar { bytes: s }
  }

  /// `a + b (mod l)`. Both inputs must be reduced.
  fn add(a: &UnpackedScalar, b: &UnpackedScalar) -> UnpackedScalar {
    let mut sum = UnpackedScalar::ZERO;

    let mut carry = 0u32;
    for i in 0 .. 9 {
      carry = a.0[i] + b.0[i] + (carry >> 29);
      sum.0[i] = carry & MASK_29;
    }

    UnpackedScalar::sub(&sum, &constants::L)
  }

  /// `a - b (mod l)`. Both inputs must be reduced.
  fn sub(a: &UnpackedScalar, b: &UnpackedScalar) -> UnpackedScalar {
    let mut difference = UnpackedScalar::ZERO;

    let mut borrow = 0u32;
    for i in 0 .. 9 {
      borrow = a.0[i].wrapping_sub(b.0[i] + (borrow >> 31));
      difference.0[i] = borrow & MASK_29;
    }

    // Conditionally add l if the difference underflowed
    let underflow_mask = ((borrow >> 31) ^ 1).wrapping_sub(1);
    let mut carry = 0u32;
    for i in 0 .. 9 {
      carry = (carry >> 29) + difference.0[i] + (constants::L.0[i] & underflow_mask);
      difference.0[i] = carry & MASK_29;
    }

    difference
  }

  /// Schoolbook 9x9 multiplication into 17 64-bit limbs.
  fn mul_internal(a: &UnpackedScalar, b: &UnpackedScalar) -> [u64; 17] {
    let a = &a.0;
    let b = &b.0;
    let mut z = [0u64; 17];

    z[0] = m(a[0], b[0]);
    z[1] = m(a[0], b[1]) + m(a[1], b[0]);
    z[2] = m(a[0], b[2]) + m(a[1], b[1]) + m(a[2], b[0]);
    z[3] = m(a[0], b[3]) + m(a[1], b[2]) + m(a[2], b[1]) + m(a[3], b[0]);
    z[4] = m(a[0], b[4]) + m(a[1], b[3]) + m(a[2], b[2]) + m(a[3], b[1]) + m(a[4], b[0]);
    z[5] = m(a[0], b[5]) +
      m(a[1], b[4]) +
      m(a[2], b[3]) +
      m(a[3], b[2]) +
      m(a[4], b[1]) +
      m(a[5], b[0]);
    z[6] = m(a[0], b[6]) +
      m(a[1], b[5]) +
      m(a[2], b[4]) +
      m(a[3], b[3]) +
      m(a[4], b[2]) +
      m(a[5], b[1]) +
      m(a[6], b[0]);
    z[7] = m(a[0], b[7]) +
      m(a[1], b[6]) +
      m(a[2], b[5]) +
      m(a[3], b[4]) +
      m(a[4], b[3]) +
      m(a[5], b[2]) +
      m(a[6], b[1]) +
      m(a[7], b[0]);
    z[8] = m(a[0], b[8]) +
      m(a[1], b[7]) +
      m(a[2], b[6]) +
      m(a[3], b[5]) +
      m(a[4], b[4]) +
      m(a[5], b[3]) +
      m(a[6], b[2]) +
      m(a[7], b[1]) +
      m(a[8], b[0]);
    z[9] = m(a[1], b[8]) +
      m(a[2], b[7]) +
      m(a[3], b[6]) +
      m(a[4], b[5]) +
      m(a[5], b[4]) +
      m(a[6], b[3]) +
      m(a[7], b[2]) +
      m(a[8], b[1]);
    z[10] = m(a[2], b[8]) +
      m(a[3], b[7]) +
      m(a[4], b[6]) +
      m(a[5], b[5]) +
      m(a[6], b[4]) +
      m(a[7], b[3]) +
      m(a[8], b[2]);
    z[11] = m(a[3], b[8]) +
      m(a[4], b[7]) +
      m(a[5], b[6]) +
      m(a[6], b[5]) +
      m(a[7], b[4]) +
      m(a[8], b[3]);
    z[12] = m(a[4], b[8]) + m(a[5], b[7]) + m(a[6], b[6]) + m(a[7], b[5]) + m(a[8], b[4]);
    z[13] = m(a[5], b[8]) + m(a[6], b[7]) + m(a[7], b[6]) + m(a[8], b[5]);
    z[14] = m(a[6], b[8]) + m(a[7], b[7]) + m(a[8], b[6]);
    z[15] = m(a[7], b[8]) + m(a[8], b[7]);
    z[16] = m(a[8], b[8]);

    z
  }

  /// Montgomery reduction: given `limbs < R * l`, compute `limbs / R (mod l)`
  /// for `R = 2^261`.
  fn montgomery_reduce(limbs: &[u64; 17]) -> UnpackedScalar {
    #[inline(always)]
    fn part1(sum: u64) -> (u64, u32) {
      let p = (sum as u32).wrapping_mul(constants::LFACTOR) & MASK_29;
      ((sum + m(p, constants::L.0[0])) >> 29, p)
    }

    #[inline(always)]
    fn part2(sum: u64) -> (u64, u32) {
      let w = (sum as u32) & MASK_29;
      (sum >> 29, w)
    }

    let l = &constants::L.0;

    // Compute the Montgomery adjustment factor n, adding multiples of l to
    // make the low half divisible by R. l[5], l[6], and l[7] are zero and
    // skipped.
    let (carry, n0) = part1(limbs[0]);
    let (carry, n1) = part1(carry + limbs[1] + m(n0, l[1]));
    let (carry, n2) = part1(carry + limbs[2] + m(n0, l[2]) + m(n1, l[1]));
    let (carry, n3) = part1(carry + limbs[3] + m(n0, l[3]) + m(n1, l[2]) + m(n2, l[1]));
    let (carry, n4) =
      part1(carry + limbs[4] + m(n0, l[4]) + m(n1, l[3]) + m(n2, l[2]) + m(n3, l[1]));
    let (carry, n5) = part1(carry + limbs[5] + m(n1, l[4]) + m(n2, l[3]) + m(n3, l[2]) + m(n4, l[1]));
    let (carry, n6) =
      part1(carry + limbs[6] + m(n2, l[4]) + m(n3, l[3]) + m(n4, l[2]) + m(n5, l[1]));
    let (carry, n7) =
      part1(carry + limbs[7] + m(n3, l[4]) + m(n4, l[3]) + m(n5, l[2]) + m(n6, l[1]));
    let (carry, n8) = part1(
      carry + limbs[8] + m(n0, l[8]) + m(n4, l[4]) + m(n5, l[3]) + m(n6, l[2]) + m(n7, l[1]),
    );

    // The low half is now divisible by R; the high half is the result
    let (carry, r0) = part2(
      carry + limbs[9] + m(n1, l[8]) + m(n5, l[4]) + m(n6, l[3]) + m(n7, l[2]) + m(n8, l[1]),
    );
    let (carry, r1) =
      part2(carry + limbs[10] + m(n2, l[8]) + m(n6, l[4]) + m(n7, l[3]) + m(n8, l[2]));
    let (carry, r2) = part2(carry + limbs[11] + m(n3, l[8]) + m(n7, l[4]) + m(n8, l[3]));
    let (carry, r3) = part2(carry + limbs[12] + m(n4, l[8]) + m(n8, l[4]));
    let (carry, r4) = part2(carry + limbs[13] + m(n5, l[8]));
    let (carry, r5) = part2(carry + limbs[14] + m(n6, l[8]));
    let (carry, r6) = part2(carry + limbs[15] + m(n7, l[8]));
    let (carry, r7) = part2(carry + limbs[16] + m(n8, l[8]));
    let r8 = carry as u32;

    // The result may still be >= l
    UnpackedScalar::sub(&UnpackedScalar([r0, r1, r2, r3, r4, r5, r6, r7, r8]), &constants::L)
  }

  fn montgomery_mul(a: &UnpackedScalar, b: &UnpackedScalar) -> UnpackedScalar {
    UnpackedScalar::montgomery_reduce(&UnpackedScalar::mul_internal(a, b))
  }

  /// `a * b (mod l)`.
  fn mul(a: &UnpackedScalar, b: &UnpackedScalar) -> UnpackedScalar {
    let ab = UnpackedScalar::montgomery_mul(a, b);
    UnpackedScalar::montgomery_mul(&ab, &constants::RR)
  }
}
