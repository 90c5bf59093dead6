//! A complex of one or more strands, folded as one circularized sequence.
//!
//! Positions form the cyclic group Z/N. `ligated[i]` is true if position i
//! is covalently bonded to i+1 (mod N); a strand end is an unligated
//! position. All position lookups wrap, so callers can write `i + 1` or
//! `j + n - 1` without reducing first.
//!

use std::fmt;

use cf_structure::NAIDX;
use cf_structure::PairSet;
use cf_structure::parse_dot_bracket;

use crate::ALPHABET;
use crate::ModelError;

#[derive(Debug, Clone, PartialEq)]
pub struct Complex {
    sequence: Vec<u8>,
    ligated: Vec<bool>,
    all_ligated: bool,
    forced: Option<PairSet>,
    in_forced_base_pair: Option<Vec<bool>>,
}

fn read_strand(strand: &str, offset: usize) -> Result<Vec<u8>, ModelError> {
    strand
        .bytes()
        .enumerate()
        .map(|(k, b)| {
            let b = b.to_ascii_uppercase();
            let b = if b == b'T' { b'U' } else { b };
            if ALPHABET.contains(&b) {
                Ok(b)
            } else {
                Err(ModelError::UnknownNucleotide { symbol: b as char, pos: offset + k })
            }
        })
        .collect()
}

impl Complex {
    /// Linear strands, each one ligated internally, with a break after its
    /// last residue. The last strand's end connects (unligated) back to the
    /// first strand's start.
    pub fn from_strands<S: AsRef<str>>(strands: &[S]) -> Result<Self, ModelError> {
        let mut sequence = Vec::new();
        let mut ligated = Vec::new();
        for strand in strands {
            let nts = read_strand(strand.as_ref(), sequence.len())?;
            if nts.is_empty() {
                continue;
            }
            ligated.extend(std::iter::repeat_n(true, nts.len() - 1));
            ligated.push(false);
            sequence.extend(nts);
        }
        Self::new(sequence, ligated)
    }

    /// A single covalently closed circle.
    pub fn circular(strand: &str) -> Result<Self, ModelError> {
        let sequence = read_strand(strand, 0)?;
        let ligated = vec![true; sequence.len()];
        Self::new(sequence, ligated)
    }

    fn new(sequence: Vec<u8>, ligated: Vec<bool>) -> Result<Self, ModelError> {
        if sequence.is_empty() {
            return Err(ModelError::EmptySequence);
        }
        if sequence.len() >= NAIDX::MAX as usize {
            return Err(ModelError::SequenceTooLong(sequence.len()));
        }
        let all_ligated = ligated.iter().all(|&l| l);
        Ok(Self {
            sequence,
            ligated,
            all_ligated,
            forced: None,
            in_forced_base_pair: None,
        })
    }

    /// Restrict folding to structures that contain all given pairs.
    pub fn with_forced_pairs(mut self, forced: PairSet) -> Result<Self, ModelError> {
        if forced.length() != self.len() {
            return Err(ModelError::ForcedPairMismatch {
                expected: self.len(),
                found: forced.length(),
            });
        }
        self.in_forced_base_pair = Some(forced.paired_mask());
        self.forced = Some(forced);
        Ok(self)
    }

    /// As `with_forced_pairs`, from a dot-bracket string.
    pub fn with_constraint(self, structure: &str) -> Result<Self, ModelError> {
        let forced = parse_dot_bracket(structure)?;
        self.with_forced_pairs(forced)
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }

    /// Nucleotide at position i (mod N).
    pub fn nt(&self, i: usize) -> u8 {
        self.sequence[i % self.sequence.len()]
    }

    /// Is position i (mod N) bonded to i+1?
    pub fn is_ligated(&self, i: usize) -> bool {
        self.ligated[i % self.ligated.len()]
    }

    pub fn ligated(&self) -> &[bool] {
        &self.ligated
    }

    pub fn all_ligated(&self) -> bool {
        self.all_ligated
    }

    /// True if every position from i up to (excluding) i+len is ligated to
    /// its successor, i.e. i..=i+len is one contiguous backbone run.
    pub fn ligated_run(&self, i: usize, len: usize) -> bool {
        (i..i + len).all(|k| self.is_ligated(k))
    }

    pub fn forced_pairs(&self) -> Option<&PairSet> {
        self.forced.as_ref()
    }

    /// Is position i (mod N) part of a forced base pair?
    pub fn in_forced_base_pair(&self, i: usize) -> bool {
        self.in_forced_base_pair
            .as_ref()
            .is_some_and(|mask| mask[i % mask.len()])
    }

    /// Does a forced pair constraint allow i to pair with j?
    pub fn allows_pair(&self, i: usize, j: usize) -> bool {
        let Some(forced) = &self.forced else {
            return true;
        };
        let (i, j) = (i % self.len(), j % self.len());
        if self.in_forced_base_pair(i) || self.in_forced_base_pair(j) {
            forced.pairs_with(i, j)
        } else {
            true
        }
    }

    /// Number of strands (strand breaks); a closed circle counts as one.
    pub fn strand_count(&self) -> usize {
        self.ligated.iter().filter(|&&l| !l).count().max(1)
    }
}

impl TryFrom<&str> for Complex {
    type Error = ModelError;

    /// Strands separated by whitespace or '+'.
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let strands: Vec<&str> = s
            .split(|c: char| c.is_whitespace() || c == '+')
            .filter(|s| !s.is_empty())
            .collect();
        Complex::from_strands(&strands)
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &nt) in self.sequence.iter().enumerate() {
            write!(f, "{}", nt as char)?;
            if !self.ligated[i] && i + 1 < self.len() {
                write!(f, " ")?;
            }
        }
        Ok(())
    }
}
