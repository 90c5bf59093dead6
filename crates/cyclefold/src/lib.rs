//! cyclefold: partition functions of circularized multi-strand complexes.
//!
//! Re-exports the workspace crates under one roof.

pub mod structure {
    pub use ::cf_structure::*;
}

pub mod model {
    pub use ::cf_model::*;
}

pub mod partition {
    pub use ::cf_partition::*;
}
