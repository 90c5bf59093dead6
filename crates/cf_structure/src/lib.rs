//! The cf_structure crate.
//!
//! Small, dependency-light representations of base pairs on a
//! (circularized) nucleic acid complex:
//!  - Pair / PairSet
//!  - dot-bracket constraint strings
//!

mod error;
mod dotbracket;
mod pair_set;

pub use error::*;
pub use dotbracket::*;
pub use pair_set::*;

/// Residue index within a complex. Complexes are limited to `u16::MAX - 1`
/// residues.
pub type NAIDX = u16;

/// A `Pair` packed into one integer, used as `IntSet` key.
pub type P1KEY = u32;

const _: () = assert!(2 * NAIDX::BITS <= P1KEY::BITS);
