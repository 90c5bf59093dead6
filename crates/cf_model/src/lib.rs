//! The cf_model crate.
//!
//! Everything the partition function recursions consume but do not own:
//!  - scalar energy parameters (`Params`)
//!  - the base-pair type catalog, with Kd and stacking weights
//!  - the motif catalog (hairpins, internal loops)
//!  - the circularized complex: sequence, ligation flags, forced pairs
//!
//! Catalogs are fixed once a `Model` is built; the recursions dispatch on
//! plain indices into them.
//!

mod error;
mod params;
mod base_pair;
mod motif;
mod complex;
mod model;

pub use error::*;
pub use params::*;
pub use base_pair::*;
pub use motif::*;
pub use complex::*;
pub use model::*;

/// The nucleotide alphabet accepted in sequences.
pub const ALPHABET: [u8; 4] = [b'A', b'C', b'G', b'U'];

/// Wildcard symbol allowed in motif templates.
pub const WILDCARD: u8 = b'N';
