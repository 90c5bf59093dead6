//! The cf_partition crate.
//!
//! Partition function of a circularized (multi-strand) complex, computed by
//! dynamic programming over all circular intervals (i, j). Every table
//! entry is a `DPCell` carrying a value, one derivative channel and an
//! optional provenance record.
//!
//! ```
//! use cf_model::{Complex, Model};
//! use cf_partition::{Partition, PartitionOptions};
//!
//! let model = Model::default();
//! let complex = Complex::try_from("GGGAAACCC + GGGUUUCCC").unwrap();
//! let part = Partition::compute(&complex, &model, PartitionOptions::default()).unwrap();
//! assert!(part.run_cross_checks().is_ok());
//! assert!(part.z() >= 1.0);
//! ```
//!

mod error;
mod wrapped;
mod dp_cell;
mod dp_table;
mod tables;
mod context;
mod partition;

pub mod recursions;

pub use error::*;
pub use wrapped::*;
pub use dp_cell::*;
pub use dp_table::*;
pub use tables::*;
pub use context::*;
pub use partition::*;
