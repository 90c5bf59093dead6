//! Catalog motifs: structural elements with their own effective molarity.
//!
//! A motif is described by one (hairpin) or two (internal loop) strand
//! templates, read 5' to 3'. The first and last residues of a hairpin
//! template pair with each other. For an internal loop, strand 0 runs from
//! the closing pair's 5' partner to the inner pair's 5' partner and strand 1
//! from the inner pair's 3' partner to the closing pair's 3' partner:
//!
//! ```text
//!        i_next ... j_next          inner pair
//!          |          |
//!  strand0 ~          ~ strand1
//!          |          |
//!          i   ...    j             closing pair
//! ```
//!
//! `N` in a template matches any nucleotide.
//!

use crate::BasePairCatalog;
use crate::BasePairTypeId;
use crate::Complex;
use crate::ModelError;
use crate::ALPHABET;
use crate::WILDCARD;

/// Index into the motif catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MotifId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MotifKind {
    Hairpin { strand: Vec<u8> },
    InternalLoop { strands: [Vec<u8>; 2] },
}

/// A pair identified by a motif match: type plus its two positions (mod N),
/// oriented so that the type reads nt(i)-nt(j).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairMatch {
    pub bpt: BasePairTypeId,
    pub i: usize,
    pub j: usize,
}

/// Result of a successful motif match.
///
/// The closing pair is reported from the outside of the motif, i.e. as the
/// pair (j, i) enclosing everything that is not part of the motif.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MotifMatch {
    Hairpin {
        closing: Vec<PairMatch>,
    },
    InternalLoop {
        inner: Vec<PairMatch>,
        closing: Vec<PairMatch>,
    },
}

impl MotifMatch {
    pub fn closing(&self) -> &[PairMatch] {
        match self {
            MotifMatch::Hairpin { closing } => closing,
            MotifMatch::InternalLoop { closing, .. } => closing,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Motif {
    name: String,
    kind: MotifKind,
    c_eff: f64,
    rotation: bool,
}

fn read_template(name: &str, strand: &str) -> Result<Vec<u8>, ModelError> {
    strand
        .bytes()
        .map(|b| {
            let b = b.to_ascii_uppercase();
            if ALPHABET.contains(&b) || b == WILDCARD {
                Ok(b)
            } else {
                Err(ModelError::InvalidMotif {
                    name: name.to_string(),
                    reason: format!("unknown template symbol '{}'", b as char),
                })
            }
        })
        .collect()
}

impl Motif {
    pub fn new<S: AsRef<str>>(name: &str, strands: &[S], c_eff: f64) -> Result<Self, ModelError> {
        let invalid = |reason: String| ModelError::InvalidMotif {
            name: name.to_string(),
            reason,
        };
        if !c_eff.is_finite() || c_eff < 0.0 {
            return Err(invalid(format!("C_eff {c_eff} must be finite and >= 0")));
        }
        let kind = match strands {
            [s] => {
                let strand = read_template(name, s.as_ref())?;
                if strand.len() < 3 {
                    return Err(invalid("hairpin template needs >= 3 residues".to_string()));
                }
                MotifKind::Hairpin { strand }
            }
            [s0, s1] => {
                let s0 = read_template(name, s0.as_ref())?;
                let s1 = read_template(name, s1.as_ref())?;
                if s0.len() < 2 || s1.len() < 2 {
                    return Err(invalid("internal loop strands need >= 2 residues".to_string()));
                }
                MotifKind::InternalLoop { strands: [s0, s1] }
            }
            _ => {
                return Err(invalid(format!("{} strands, expected 1 or 2", strands.len())));
            }
        };
        Ok(Self {
            name: name.to_string(),
            kind,
            c_eff,
            rotation: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &MotifKind {
        &self.kind
    }

    pub fn c_eff(&self) -> f64 {
        self.c_eff
    }

    /// True for the inner-pair view registered alongside an internal loop.
    pub fn is_rotation(&self) -> bool {
        self.rotation
    }

    pub fn strand_count(&self) -> usize {
        match self.kind {
            MotifKind::Hairpin { .. } => 1,
            MotifKind::InternalLoop { .. } => 2,
        }
    }

    /// Length of the last (3') strand template.
    pub fn last_strand_len(&self) -> usize {
        match &self.kind {
            MotifKind::Hairpin { strand } => strand.len(),
            MotifKind::InternalLoop { strands } => strands[1].len(),
        }
    }

    /// The internal loop seen from its inner pair, or None for hairpins.
    pub fn rotated(&self) -> Option<Motif> {
        match &self.kind {
            MotifKind::Hairpin { .. } => None,
            MotifKind::InternalLoop { strands: [s0, s1] } => Some(Motif {
                name: format!("{}~", self.name),
                kind: MotifKind::InternalLoop { strands: [s1.clone(), s0.clone()] },
                c_eff: self.c_eff,
                rotation: true,
            }),
        }
    }

    /// Match the motif with its closing pair at (i, j): strand 0 starts at i
    /// and the last strand ends at j. Returns None when the sequence,
    /// ligation pattern or base-pair catalog do not fit.
    pub fn match_at(
        &self,
        complex: &Complex,
        catalog: &BasePairCatalog,
        i: usize,
        j: usize,
    ) -> Option<MotifMatch> {
        let n = complex.len();
        let (i, j) = (i % n, j % n);
        let offset = (j + n - i) % n;
        match &self.kind {
            MotifKind::Hairpin { strand } => {
                let len = strand.len();
                if len > n || offset != len - 1 {
                    return None;
                }
                if !strand_fits(complex, strand, i) {
                    return None;
                }
                let closing = pair_matches(complex, catalog, j, i);
                if closing.is_empty() {
                    return None;
                }
                Some(MotifMatch::Hairpin { closing })
            }
            MotifKind::InternalLoop { strands: [s0, s1] } => {
                let (l0, l1) = (s0.len(), s1.len());
                // inner pair must still span at least one position
                if offset < l0 + l1 - 1 || l0 + l1 > n {
                    return None;
                }
                let i_next = (i + l0 - 1) % n;
                let j_next = (j + n - (l1 - 1)) % n;
                if !strand_fits(complex, s0, i) || !strand_fits(complex, s1, j_next) {
                    return None;
                }
                let closing = pair_matches(complex, catalog, j, i);
                let inner = pair_matches(complex, catalog, i_next, j_next);
                if closing.is_empty() || inner.is_empty() {
                    return None;
                }
                Some(MotifMatch::InternalLoop { inner, closing })
            }
        }
    }
}

/// Template matches the sequence starting at `start` along one ligated run,
/// and no loop residue between its two paired ends is held by a forced pair.
fn strand_fits(complex: &Complex, template: &[u8], start: usize) -> bool {
    let last = template.len() - 1;
    complex.ligated_run(start, last)
        && template
            .iter()
            .enumerate()
            .all(|(k, &t)| t == WILDCARD || t == complex.nt(start + k))
        && (1..last).all(|k| !complex.in_forced_base_pair(start + k))
}

fn pair_matches(complex: &Complex, catalog: &BasePairCatalog, i: usize, j: usize) -> Vec<PairMatch> {
    catalog
        .matching(complex.nt(i), complex.nt(j))
        .iter()
        .map(|&bpt| PairMatch { bpt, i, j })
        .collect()
}
