// Shared macros for the arithmetic types.
//
// The canonical implementations of each operation take references. These
// macros fill in the owned/mixed variants by delegation, as well as the
// assignment forms.

macro_rules! math_variants {
  ($Op: ident, $op_fn: ident, $Assign: ident, $assign_fn: ident, $Value: ident) => {
    impl $Op<$Value> for $Value {
      type Output = $Value;
      fn $op_fn(self, other: $Value) -> $Value {
        (&self).$op_fn(&other)
      }
    }
    impl<'a> $Op<&'a $Value> for $Value {
      type Output = $Value;
      fn $op_fn(self, other: &'a $Value) -> $Value {
        (&self).$op_fn(other)
      }
    }
    impl<'a> $Op<$Value> for &'a $Value {
      type Output = $Value;
      fn $op_fn(self, other: $Value) -> $Value {
        self.$op_fn(&other)
      }
    }
    impl $Assign<$Value> for $Value {
      fn $assign_fn(&mut self, other: $Value) {
        *self = (&*self).$op_fn(&other);
      }
    }
    impl<'a> $Assign<&'a $Value> for $Value {
      fn $assign_fn(&mut self, other: &'a $Value) {
        *self = (&*self).$op_fn(other);
      }
    }
  };
}

macro_rules! neg_variant {
  ($Value: ident) => {
    impl Neg for $Value {
      type Output = $Value;
      fn neg(self) -> $Value {
        -&self
      }
    }
  };
}

pub(crate) fn load8(input: &[u8]) -> u64 {
  u64::from_le_bytes(input[.. 8].try_into().unwrap())
}

pub(crate) fn load4(input: &[u8]) -> u32 {
  u32::from_le_bytes(input[.. 4].try_into().unwrap())
}
