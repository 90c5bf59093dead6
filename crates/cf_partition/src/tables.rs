//! The registry of all tables filled during one partition function run.

use cf_model::BasePairTypeId;

use crate::CellRef;
use crate::DPCell;
use crate::DPTable;
use crate::TableId;
use crate::WrappedVec;

#[derive(Debug, Clone)]
pub struct Tables {
    pub z_cut: DPTable,
    pub z_bpq: Vec<DPTable>,
    pub z_bp: DPTable,
    pub z_coax: DPTable,
    pub c_eff_basic: DPTable,
    pub c_eff_no_bp_singlet: DPTable,
    pub c_eff_no_coax_singlet: DPTable,
    pub c_eff: DPTable,
    pub z_linear: DPTable,
    pub z_final: WrappedVec<DPCell>,
}

impl Tables {
    /// Allocate all tables for a sequence of length `n`. Empty intervals
    /// (the diagonal) start at `c_init` in the effective molarity tables
    /// and at 1 in `Z_linear`.
    pub fn new(n: usize, num_bp_types: usize, c_init: f64, track: bool) -> Self {
        let table = |id: TableId, diag: f64| DPTable::new(id, n, diag, track);
        Self {
            z_cut: table(TableId::ZCut, 0.0),
            z_bpq: (0..num_bp_types)
                .map(|q| table(TableId::ZBPq(BasePairTypeId(q)), 0.0))
                .collect(),
            z_bp: table(TableId::ZBP, 0.0),
            z_coax: table(TableId::ZCoax, 0.0),
            c_eff_basic: table(TableId::CEffBasic, c_init),
            c_eff_no_bp_singlet: table(TableId::CEffNoBPSinglet, c_init),
            c_eff_no_coax_singlet: table(TableId::CEffNoCoaxSinglet, c_init),
            c_eff: table(TableId::CEff, c_init),
            z_linear: table(TableId::ZLinear, 1.0),
            z_final: WrappedVec::from_fn(n, |i| {
                if track {
                    DPCell::tagged(0.0, CellRef { table: TableId::ZFinal, i, j: i })
                } else {
                    DPCell::default()
                }
            }),
        }
    }

    /// Position i can not stay unpaired: drop its single-residue seeds.
    pub fn forbid_unpaired(&mut self, i: usize) {
        self.c_eff_basic.clear_diagonal(i);
        self.c_eff_no_bp_singlet.clear_diagonal(i);
        self.c_eff_no_coax_singlet.clear_diagonal(i);
        self.c_eff.clear_diagonal(i);
        self.z_linear.clear_diagonal(i);
    }

    pub fn len(&self) -> usize {
        self.z_final.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z_final.is_empty()
    }

    #[inline]
    pub fn z_bpq(&self, bpt: BasePairTypeId) -> &DPTable {
        &self.z_bpq[bpt.index()]
    }

    /// The two-dimensional table with this id. `Z_final` is one-dimensional
    /// and not returned here.
    pub fn get(&self, id: TableId) -> Option<&DPTable> {
        match id {
            TableId::ZCut => Some(&self.z_cut),
            TableId::ZBPq(bpt) => self.z_bpq.get(bpt.index()),
            TableId::ZBP => Some(&self.z_bp),
            TableId::ZCoax => Some(&self.z_coax),
            TableId::CEffBasic => Some(&self.c_eff_basic),
            TableId::CEffNoBPSinglet => Some(&self.c_eff_no_bp_singlet),
            TableId::CEffNoCoaxSinglet => Some(&self.c_eff_no_coax_singlet),
            TableId::CEff => Some(&self.c_eff),
            TableId::ZLinear => Some(&self.z_linear),
            TableId::ZFinal => None,
        }
    }

    /// Any cell, by reference. For `Z_final`, j is ignored.
    pub fn cell(&self, cell: CellRef) -> Option<&DPCell> {
        match cell.table {
            TableId::ZFinal => Some(&self.z_final[cell.i]),
            id => self.get(id).map(|t| t.get(cell.i, cell.j)),
        }
    }

    /// Table ids in fill order.
    pub fn ids(&self) -> Vec<TableId> {
        let mut ids = vec![TableId::ZCut];
        ids.extend((0..self.z_bpq.len()).map(|q| TableId::ZBPq(BasePairTypeId(q))));
        ids.extend([
            TableId::ZBP,
            TableId::ZCoax,
            TableId::CEffBasic,
            TableId::CEffNoCoaxSinglet,
            TableId::CEffNoBPSinglet,
            TableId::CEff,
            TableId::ZLinear,
            TableId::ZFinal,
        ]);
        ids
    }
}
