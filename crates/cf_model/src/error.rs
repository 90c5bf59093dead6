use thiserror::Error;

use cf_structure::StructureError;

/// Errors raised while building a model or a complex.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid Kd {kd} for base pair {nt1}-{nt2}: must be finite and > 0")]
    InvalidKd { nt1: char, nt2: char, kd: f64 },

    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("unknown nucleotide '{symbol}' at position {pos}")]
    UnknownNucleotide { symbol: char, pos: usize },

    #[error("sequence is empty")]
    EmptySequence,

    #[error("sequence too long: {0} positions")]
    SequenceTooLong(usize),

    #[error("unknown base pair type '{0}'")]
    UnknownBasePairType(String),

    #[error("invalid motif '{name}': {reason}")]
    InvalidMotif { name: String, reason: String },

    #[error("forced pairs cover {found} positions, sequence has {expected}")]
    ForcedPairMismatch { expected: usize, found: usize },

    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error("failed to parse model: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
