//! Base-pair types and their catalog.
//!
//! Every pairing is registered in both orientations: `C-G` read from the
//! 5' partner is a different type than `G-C`, and the two are linked through
//! `flipped`. Both orientations share a single dissociation constant.
//!

use std::fmt;
use ahash::AHashMap;

use crate::ModelError;

/// Index into the base-pair type catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BasePairTypeId(pub usize);

impl BasePairTypeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BasePairType {
    nt1: u8,
    nt2: u8,
    kd: f64,
    flipped: BasePairTypeId,
}

impl BasePairType {
    /// Nucleotide at the 5' partner (position i).
    pub fn nt1(&self) -> u8 {
        self.nt1
    }

    /// Nucleotide at the 3' partner (position j).
    pub fn nt2(&self) -> u8 {
        self.nt2
    }

    /// Dissociation constant (M).
    pub fn kd(&self) -> f64 {
        self.kd
    }

    /// The same pairing read from the other partner.
    pub fn flipped(&self) -> BasePairTypeId {
        self.flipped
    }

    pub fn is_match(&self, s1: u8, s2: u8) -> bool {
        s1 == self.nt1 && s2 == self.nt2
    }
}

impl fmt::Display for BasePairType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.nt1 as char, self.nt2 as char)
    }
}

pub(crate) fn validate_kd(nt1: u8, nt2: u8, kd: f64) -> Result<(), ModelError> {
    if !kd.is_finite() || kd <= 0.0 {
        return Err(ModelError::InvalidKd {
            nt1: nt1 as char,
            nt2: nt2 as char,
            kd,
        });
    }
    Ok(())
}

/// All base-pair types of a model, indexed by nucleotide pair.
#[derive(Debug, Clone, Default)]
pub struct BasePairCatalog {
    types: Vec<BasePairType>,
    by_nucleotides: AHashMap<(u8, u8), Vec<BasePairTypeId>>,
}

impl BasePairCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the pairing nt1-nt2 and its flipped partner nt2-nt1.
    /// Returns the id of the nt1-nt2 orientation.
    pub fn insert(&mut self, nt1: u8, nt2: u8, kd: f64) -> Result<BasePairTypeId, ModelError> {
        validate_kd(nt1.to_ascii_uppercase(), nt2.to_ascii_uppercase(), kd)?;
        Ok(self.insert_valid(nt1, nt2, kd))
    }

    /// As `insert`, for a Kd the caller has already checked.
    pub(crate) fn insert_valid(&mut self, nt1: u8, nt2: u8, kd: f64) -> BasePairTypeId {
        debug_assert!(kd.is_finite() && kd > 0.0);
        let (nt1, nt2) = (nt1.to_ascii_uppercase(), nt2.to_ascii_uppercase());
        let id = BasePairTypeId(self.types.len());
        if nt1 == nt2 {
            self.push(BasePairType { nt1, nt2, kd, flipped: id });
        } else {
            let fid = BasePairTypeId(id.0 + 1);
            self.push(BasePairType { nt1, nt2, kd, flipped: fid });
            self.push(BasePairType { nt1: nt2, nt2: nt1, kd, flipped: id });
        }
        id
    }

    fn push(&mut self, bpt: BasePairType) {
        let id = BasePairTypeId(self.types.len());
        self.by_nucleotides.entry((bpt.nt1, bpt.nt2)).or_default().push(id);
        self.types.push(bpt);
    }

    /// Set Kd of a type; the flipped orientation follows.
    pub fn set_kd(&mut self, id: BasePairTypeId, kd: f64) -> Result<(), ModelError> {
        let bpt = self.get(id)
            .ok_or_else(|| ModelError::UnknownBasePairType(format!("#{}", id.0)))?;
        validate_kd(bpt.nt1, bpt.nt2, kd)?;
        let fid = bpt.flipped;
        self.types[id.0].kd = kd;
        self.types[fid.0].kd = kd;
        Ok(())
    }

    pub fn get(&self, id: BasePairTypeId) -> Option<&BasePairType> {
        self.types.get(id.0)
    }

    /// All types pairing s1 (5' partner) with s2 (3' partner).
    pub fn matching(&self, s1: u8, s2: u8) -> &[BasePairTypeId] {
        self.by_nucleotides
            .get(&(s1, s2))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Look up a type by its name, e.g. "CG" or "C-G".
    pub fn find(&self, name: &str) -> Option<BasePairTypeId> {
        let nts: Vec<u8> = name
            .bytes()
            .filter(|b| *b != b'-')
            .map(|b| b.to_ascii_uppercase())
            .collect();
        match nts.as_slice() {
            [a, b] => self.matching(*a, *b).first().copied(),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BasePairTypeId, &BasePairType)> + '_ {
        self.types.iter().enumerate().map(|(i, t)| (BasePairTypeId(i), t))
    }

    pub fn ids(&self) -> impl Iterator<Item = BasePairTypeId> + '_ {
        (0..self.types.len()).map(BasePairTypeId)
    }
}

impl std::ops::Index<BasePairTypeId> for BasePairCatalog {
    type Output = BasePairType;

    fn index(&self, id: BasePairTypeId) -> &Self::Output {
        &self.types[id.0]
    }
}
