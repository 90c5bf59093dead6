use thiserror::Error;

/// Errors raised while reading structure constraints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("unmatched ')' at position {0}")]
    UnmatchedClose(usize),

    #[error("unmatched '(' at position {0}")]
    UnmatchedOpen(usize),

    #[error("invalid structure symbol '{symbol}' at position {pos}")]
    InvalidSymbol { symbol: char, pos: usize },

    #[error("position {0} is already paired")]
    AlreadyPaired(usize),

    #[error("position {pos} outside of a structure of length {length}")]
    OutOfRange { pos: usize, length: usize },

    #[error("structure too long: {0} positions")]
    TooLong(usize),
}
