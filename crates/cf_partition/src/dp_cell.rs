//! The accumulator cell every dynamic programming table is built from.
//!
//! A `DPCell` carries
//!  - `q`: the partition function value,
//!  - `dq`: a first-order derivative channel (with respect to one Kd),
//!  - a provenance list of `Contribution`s, each a weight plus the table
//!    cells whose product produced it.
//!
//! Provenance is stored by reference (`CellRef`) into the tables, so the
//! recorded contributions form a DAG over cells instead of nested copies.
//! Cells only carry provenance when their table was allocated with tags;
//! untagged cells never allocate.
//!

use std::ops::AddAssign;
use std::ops::Mul;

use cf_model::BasePairTypeId;

/// Names of the dynamic programming tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableId {
    ZCut,
    ZBPq(BasePairTypeId),
    ZBP,
    ZCoax,
    CEffBasic,
    CEffNoBPSinglet,
    CEffNoCoaxSinglet,
    CEff,
    ZLinear,
    ZFinal,
}

impl TableId {
    pub fn name(&self) -> &'static str {
        match self {
            TableId::ZCut => "Z_cut",
            TableId::ZBPq(_) => "Z_BPq",
            TableId::ZBP => "Z_BP",
            TableId::ZCoax => "Z_coax",
            TableId::CEffBasic => "C_eff_basic",
            TableId::CEffNoBPSinglet => "C_eff_no_BP_singlet",
            TableId::CEffNoCoaxSinglet => "C_eff_no_coax_singlet",
            TableId::CEff => "C_eff",
            TableId::ZLinear => "Z_linear",
            TableId::ZFinal => "Z_final",
        }
    }
}

/// A cell address: table plus (i, j). One-dimensional tables use j == i.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub table: TableId,
    pub i: usize,
    pub j: usize,
}

/// One recorded term of a cell: its weight and the cells it multiplies.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub weight: f64,
    pub sources: Vec<CellRef>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DPCell {
    q: f64,
    dq: f64,
    contribs: Vec<Contribution>,
    info: Vec<CellRef>,
}

impl DPCell {
    pub fn new(q: f64) -> Self {
        Self { q, ..Self::default() }
    }

    pub fn with_deriv(q: f64, dq: f64) -> Self {
        Self { q, dq, ..Self::default() }
    }

    /// A cell that identifies itself as `cell` in provenance records.
    pub fn tagged(q: f64, cell: CellRef) -> Self {
        Self { q, info: vec![cell], ..Self::default() }
    }

    pub fn q(&self) -> f64 {
        self.q
    }

    pub fn dq(&self) -> f64 {
        self.dq
    }

    pub fn contributions(&self) -> &[Contribution] {
        &self.contribs
    }

    /// The cells this value stands for (itself, for a table cell).
    pub fn info(&self) -> &[CellRef] {
        &self.info
    }

    /// A lightweight view of this cell as a source term: value, derivative
    /// and identity, without its own decomposition.
    pub fn source(&self) -> DPCell {
        DPCell {
            q: self.q,
            dq: self.dq,
            contribs: Vec::new(),
            info: self.info.clone(),
        }
    }

    /// Add another cell. Decomposed provenance is appended as is; an
    /// undecomposed but identified source is recorded as one entry.
    pub fn accumulate(&mut self, other: &DPCell) {
        self.q += other.q;
        self.dq += other.dq;
        if !other.contribs.is_empty() {
            self.contribs.extend(other.contribs.iter().cloned());
        } else if !other.info.is_empty() {
            self.contribs.push(Contribution {
                weight: other.q,
                sources: other.info.clone(),
            });
        }
    }

    /// Add a bare constant (no derivative, no provenance).
    pub fn add_value(&mut self, q: f64) {
        self.q += q;
    }

    pub fn add_deriv(&mut self, dq: f64) {
        self.dq += dq;
    }

    /// Merge a freshly computed value into this (table) cell, keeping the
    /// cell's identity.
    pub(crate) fn absorb(&mut self, other: DPCell) {
        self.q += other.q;
        self.dq += other.dq;
        self.contribs.extend(other.contribs);
    }

    /// A new cell with value, derivative and contribution weights divided
    /// by `scalar`.
    pub fn scale_divide(&self, scalar: f64) -> DPCell {
        let mut quot = self.clone();
        quot.q /= scalar;
        quot.dq /= scalar;
        for c in &mut quot.contribs {
            c.weight /= scalar;
        }
        quot
    }

    fn scale(&mut self, scalar: f64) {
        self.q *= scalar;
        self.dq *= scalar;
        for c in &mut self.contribs {
            c.weight *= scalar;
        }
    }

    fn product(a: &DPCell, b: &DPCell) -> DPCell {
        let q = a.q * b.q;
        let dq = a.dq * b.q + a.q * b.dq;
        let info: Vec<CellRef> = a.info.iter().chain(b.info.iter()).copied().collect();
        let contribs = if info.is_empty() {
            Vec::new()
        } else {
            vec![Contribution { weight: q, sources: info.clone() }]
        };
        DPCell { q, dq, contribs, info }
    }
}

impl AddAssign<DPCell> for DPCell {
    fn add_assign(&mut self, other: DPCell) {
        if other.contribs.is_empty() {
            self.accumulate(&other);
        } else {
            self.q += other.q;
            self.dq += other.dq;
            self.contribs.extend(other.contribs);
        }
    }
}

impl AddAssign<&DPCell> for DPCell {
    fn add_assign(&mut self, other: &DPCell) {
        self.accumulate(other);
    }
}

impl Mul<f64> for DPCell {
    type Output = DPCell;

    fn mul(mut self, scalar: f64) -> DPCell {
        self.scale(scalar);
        self
    }
}

impl Mul<f64> for &DPCell {
    type Output = DPCell;

    fn mul(self, scalar: f64) -> DPCell {
        self.clone() * scalar
    }
}

impl Mul<DPCell> for DPCell {
    type Output = DPCell;

    fn mul(self, other: DPCell) -> DPCell {
        DPCell::product(&self, &other)
    }
}

impl Mul<&DPCell> for &DPCell {
    type Output = DPCell;

    fn mul(self, other: &DPCell) -> DPCell {
        DPCell::product(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;

    fn cref(table: TableId, i: usize, j: usize) -> CellRef {
        CellRef { table, i, j }
    }

    #[test]
    fn test_accumulation_is_order_independent() {
        let terms: Vec<DPCell> = (1..=50)
            .map(|k| DPCell::with_deriv(1.0 / k as f64, (k as f64).sqrt()))
            .collect();
        let mut reference = DPCell::default();
        for t in &terms {
            reference += t;
        }

        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..10 {
            let mut shuffled = terms.clone();
            shuffled.shuffle(&mut rng);
            let mut acc = DPCell::default();
            for t in shuffled {
                acc += t;
            }
            assert_relative_eq!(acc.q(), reference.q(), max_relative = 1e-12);
            assert_relative_eq!(acc.dq(), reference.dq(), max_relative = 1e-12);
        }
    }

    #[test]
    fn test_scalar_linearity() {
        let mut cell = DPCell::with_deriv(3.5, -1.0);
        cell += DPCell::tagged(0.5, cref(TableId::ZBP, 1, 4));
        for k in [0.0, 1.0, -2.5, 1e-7, 3.0e5] {
            let scaled = &cell * k;
            assert_relative_eq!(scaled.q(), cell.q() * k);
            assert_relative_eq!(scaled.dq(), cell.dq() * k);
            assert_relative_eq!(scaled.contributions()[0].weight, 0.5 * k);
        }
    }

    #[test]
    fn test_accumulate_records_sources_once() {
        let a = cref(TableId::ZBP, 0, 5);
        let b = cref(TableId::ZLinear, 0, 2);
        let mut acc = DPCell::tagged(0.0, cref(TableId::ZLinear, 0, 5));

        // undecomposed, identified source: one entry
        acc += DPCell::tagged(2.0, a);
        assert_eq!(acc.contributions(), &[Contribution { weight: 2.0, sources: vec![a] }]);

        // decomposed source: its entries are appended
        let mut decomposed = DPCell::default();
        decomposed += DPCell::tagged(1.0, b);
        decomposed += DPCell::tagged(3.0, a);
        acc += &decomposed;
        assert_eq!(acc.contributions().len(), 3);
        assert_relative_eq!(acc.q(), 6.0);

        // anonymous constants leave no record
        acc += DPCell::new(10.0);
        acc.add_value(1.0);
        assert_eq!(acc.contributions().len(), 3);
        assert_relative_eq!(acc.q(), 17.0);
        assert_eq!(acc.info(), &[cref(TableId::ZLinear, 0, 5)]);
    }

    #[test]
    fn test_product_merges_provenance() {
        let a = DPCell::tagged(2.0, cref(TableId::ZLinear, 0, 1));
        let b = DPCell::tagged(3.0, cref(TableId::ZBP, 2, 7));
        let c = DPCell::new(4.0);

        let ab = &a * &b;
        assert_relative_eq!(ab.q(), 6.0);
        assert_eq!(ab.contributions().len(), 1);
        assert_eq!(ab.contributions()[0].sources, vec![a.info()[0], b.info()[0]]);

        let abc = ab * c * 0.5;
        assert_relative_eq!(abc.q(), 12.0);
        assert_relative_eq!(abc.contributions()[0].weight, 12.0);
        assert_eq!(abc.contributions()[0].sources.len(), 2);

        let plain = DPCell::new(2.0) * DPCell::new(5.0);
        assert!(plain.contributions().is_empty());
        assert!(plain.info().is_empty());
    }

    #[test]
    fn test_product_rule() {
        let a = DPCell::with_deriv(2.0, 0.5);
        let b = DPCell::with_deriv(3.0, -1.0);
        let ab = a * b;
        assert_relative_eq!(ab.q(), 6.0);
        assert_relative_eq!(ab.dq(), 0.5 * 3.0 + 2.0 * -1.0);
    }

    #[test]
    fn test_multiplication_distributes_over_accumulation() {
        let (x, y, z) = (DPCell::new(1.25), DPCell::new(0.75), DPCell::new(8.0));
        let mut sum = x.clone();
        sum += &y;
        let lhs = sum * z.clone();
        let mut rhs = x * z.clone();
        rhs += y * z;
        assert_relative_eq!(lhs.q(), rhs.q());
    }

    #[test]
    fn test_scale_divide() {
        let mut cell = DPCell::with_deriv(8.0, 2.0);
        cell += DPCell::tagged(8.0, cref(TableId::CEff, 0, 3));
        let half = cell.scale_divide(2.0);
        assert_relative_eq!(half.q(), 8.0);
        assert_relative_eq!(half.dq(), 1.0);
        assert_relative_eq!(half.contributions()[0].weight, 4.0);
        assert_relative_eq!(cell.q(), 16.0);
    }

    #[test]
    fn test_source_view() {
        let mut cell = DPCell::tagged(0.0, cref(TableId::ZCut, 1, 3));
        cell += DPCell::tagged(1.0, cref(TableId::ZLinear, 2, 3));
        let src = cell.source();
        assert_relative_eq!(src.q(), 1.0);
        assert!(src.contributions().is_empty());
        assert_eq!(src.info(), cell.info());
    }
}
