// A minimal STROBE-128 duplex, sufficient for transcripts: AD, KEY, and PRF,
// plus their meta variants. The permutation itself is the external
// `keccak::f1600`.
//
// Only the operations a transcript needs are provided. In particular the T
// (transport) flag is unsupported.

use zeroize::Zeroize;

/// Security level 128 fixes the rate.
const STROBE_R: u8 = 166;

const FLAG_I: u8 = 1;
const FLAG_A: u8 = 1 << 1;
const FLAG_C: u8 = 1 << 2;
const FLAG_T: u8 = 1 << 3;
const FLAG_M: u8 = 1 << 4;
const FLAG_K: u8 = 1 << 5;

#[derive(Clone, Zeroize)]
#[repr(align(8))]
struct AlignedKeccakState([u8; 200]);

impl Drop for AlignedKeccakState {
  fn drop(&mut self) {
    self.zeroize();
  }
}

impl AlignedKeccakState {
  fn permute(&mut self) {
    let mut lanes = [0u64; 25];
    for (i, lane) in lanes.iter_mut().enumerate() {
      *lane = u64::from_le_bytes(self.0[(i * 8) .. ((i + 1) * 8)].try_into().unwrap());
    }
    keccak::f1600(&mut lanes);
    for (i, lane) in lanes.iter().enumerate() {
      self.0[(i * 8) .. ((i + 1) * 8)].copy_from_slice(&lane.to_le_bytes());
    }
    lanes.zeroize();
  }
}

/// A STROBE-128 state.
#[derive(Clone)]
pub(crate) struct Strobe128 {
  state: AlignedKeccakState,
  pos: u8,
  pos_begin: u8,
  cur_flags: u8,
}

impl Strobe128 {
  pub(crate) fn new(protocol_label: &[u8]) -> Strobe128 {
    let mut state = AlignedKeccakState([0; 200]);
    state.0[0 .. 6].copy_from_slice(&[1, STROBE_R + 2, 1, 0, 1, 96]);
    state.0[6 .. 18].copy_from_slice(b"STROBEv1.0.2");
    state.permute();

    let mut strobe = Strobe128 { state, pos: 0, pos_begin: 0, cur_flags: 0 };
    strobe.meta_ad(protocol_label, false);
    strobe
  }

  pub(crate) fn meta_ad(&mut self, data: &[u8], more: bool) {
    self.begin_op(FLAG_M | FLAG_A, more);
    self.absorb(data);
  }

  pub(crate) fn ad(&mut self, data: &[u8], more: bool) {
    self.begin_op(FLAG_A, more);
    self.absorb(data);
  }

  pub(crate) fn prf(&mut self, data: &mut [u8], more: bool) {
    self.begin_op(FLAG_I | FLAG_A | FLAG_C, more);
    self.squeeze(data);
  }

  pub(crate) fn key(&mut self, data: &[u8], more: bool) {
    self.begin_op(FLAG_A | FLAG_C, more);
    self.overwrite(data);
  }

  fn run_f(&mut self) {
    self.state.0[usize::from(self.pos)] ^= self.pos_begin;
    self.state.0[usize::from(self.pos + 1)] ^= 0x04;
    self.state.0[usize::from(STROBE_R + 1)] ^= 0x80;
    self.state.permute();
    self.pos = 0;
    self.pos_begin = 0;
  }

  fn absorb(&mut self, data: &[u8]) {
    for byte in data {
      self.state.0[usize::from(self.pos)] ^= byte;
      self.pos += 1;
      if self.pos == STROBE_R {
        self.run_f();
      }
    }
  }

  fn overwrite(&mut self, data: &[u8]) {
    for byte in data {
      self.state.0[usize::from(self.pos)] = *byte;
      self.pos += 1;
      if self.pos == STROBE_R {
        self.run_f();
      }
    }
  }

  fn squeeze(&mut self, data: &mut [u8]) {
    for byte in data.iter_mut() {
      *byte = self.state.0[usize::from(self.pos)];
      self.state.0[usize::from(self.pos)] = 0;
      self.pos += 1;
      if self.pos == STROBE_R {
        self.run_f();
      }
    }
  }

  fn begin_op(&mut self, flags: u8, more: bool) {
    if more {
      assert_eq!(
        self.cur_flags, flags,
        "continued an operation with different flags: {} != {}",
        self.cur_flags, flags,
      );
      return;
    }

    assert_eq!(flags & FLAG_T, 0, "the T flag is not supported");

    let old_begin = self.pos_begin;
    self.pos_begin = self.pos + 1;
    self.cur_flags = flags;

    self.absorb(&[old_begin, flags]);

    // C and K operations must start on a fresh block
    if (flags & (FLAG_C | FLAG_K)) != 0 && self.pos != 0 {
      self.run_f();
    }
  }
}
