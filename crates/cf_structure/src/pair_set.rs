//! Sets of base pairs on a complex of fixed length.
//!
//! Pairs are kept as packed `P1KEY` integers in a `nohash_hasher::IntSet`,
//! next to a partner table so that per-position questions ("is residue k
//! constrained?") do not need a scan over all pairs. Every position takes
//! part in at most one pair.
//!

use std::fmt;
use nohash_hasher::IntSet;

use crate::NAIDX;
use crate::P1KEY;
use crate::StructureError;

/// Two paired residues, normalized so that `i < j`.
///
/// On a circular complex the same pair also closes the arc from j back
/// around to i; which arc is meant is up to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pair {
    i: NAIDX,
    j: NAIDX,
}

impl Pair {
    pub fn new(i: NAIDX, j: NAIDX) -> Self {
        debug_assert!(i < j, "pair ({i}, {j}) is not normalized");
        Pair { i, j }
    }

    /// Normalizes the order of the two residues.
    pub fn unordered(a: NAIDX, b: NAIDX) -> Self {
        Pair::new(a.min(b), a.max(b))
    }

    pub fn i(&self) -> NAIDX {
        self.i
    }

    pub fn j(&self) -> NAIDX {
        self.j
    }

    /// Residues strictly enclosed on the i..j side.
    pub fn inner_len(&self) -> usize {
        (self.j - self.i - 1) as usize
    }

    pub(crate) fn key(&self) -> P1KEY {
        (self.i as P1KEY) << NAIDX::BITS | self.j as P1KEY
    }

    pub(crate) fn from_key(key: P1KEY) -> Self {
        Pair::new((key >> NAIDX::BITS) as NAIDX, key as NAIDX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairSet {
    keys: IntSet<P1KEY>,
    partner: Vec<Option<NAIDX>>,
}

impl PairSet {
    /// No pairs on `length` residues.
    pub fn new(length: usize) -> Self {
        Self {
            keys: IntSet::default(),
            partner: vec![None; length],
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of residues the set is defined on.
    pub fn length(&self) -> usize {
        self.partner.len()
    }

    /// Adds a pair. Re-adding a present pair is a no-op and returns
    /// `Ok(false)`; a residue already paired elsewhere is an error.
    pub fn insert(&mut self, pair: Pair) -> Result<bool, StructureError> {
        let (i, j) = (pair.i() as usize, pair.j() as usize);
        if j >= self.length() {
            return Err(StructureError::OutOfRange { pos: j, length: self.length() });
        }
        if self.keys.contains(&pair.key()) {
            return Ok(false);
        }
        if let Some(pos) = [i, j].into_iter().find(|&k| self.partner[k].is_some()) {
            return Err(StructureError::AlreadyPaired(pos));
        }
        self.partner[i] = Some(pair.j());
        self.partner[j] = Some(pair.i());
        Ok(self.keys.insert(pair.key()))
    }

    pub fn contains(&self, pair: &Pair) -> bool {
        self.keys.contains(&pair.key())
    }

    /// Partner of residue k, if it is paired.
    pub fn partner(&self, k: usize) -> Option<usize> {
        self.partner.get(k).copied().flatten().map(usize::from)
    }

    /// True if residues a and b (in any order) form one of the pairs.
    pub fn pairs_with(&self, a: usize, b: usize) -> bool {
        self.partner(a) == Some(b)
    }

    /// One flag per residue, set where the residue is paired.
    pub fn paired_mask(&self) -> Vec<bool> {
        self.partner.iter().map(Option::is_some).collect()
    }

    /// Unordered.
    pub fn iter(&self) -> impl Iterator<Item = Pair> + '_ {
        self.keys.iter().map(|&k| Pair::from_key(k))
    }

    /// Pairs sorted by their 5' residue.
    pub fn to_vec(&self) -> Vec<Pair> {
        self.partner
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.filter(|&j| i < j as usize).map(|j| Pair::new(i as NAIDX, j)))
            .collect()
    }
}

impl fmt::Display for PairSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self
            .to_vec()
            .iter()
            .map(|p| format!("({},{})", p.i(), p.j()))
            .collect();
        write!(f, "{}", pairs.join(","))
    }
}
