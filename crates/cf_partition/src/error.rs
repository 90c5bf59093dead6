use thiserror::Error;

use cf_model::ModelError;

#[derive(Debug, Error)]
pub enum PartitionError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Z_final[{root}] = {value:e} differs from Z_final[0] = {reference:e} (tolerance {tolerance:e})")]
    RootInconsistency {
        root: usize,
        value: f64,
        reference: f64,
        tolerance: f64,
    },

    #[error("unknown table '{0}'")]
    UnknownTable(String),
}
