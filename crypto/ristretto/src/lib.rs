#![doc = include_str!("lib.md")]
#![allow(non_snake_case)]

#[macro_use]
mod backend;

pub mod field;
pub mod scalar;
pub(crate) mod curve;
pub mod ristretto;
pub(crate) mod constants;

pub use field::FieldElement;
pub use scalar::Scalar;
pub use ristretto::{CompressedRistretto, RistrettoPoint, RistrettoBasepointTable};
pub use constants::{RISTRETTO_BASEPOINT_POINT, RISTRETTO_BASEPOINT_TABLE};
