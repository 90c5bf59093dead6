//! Driver: allocate the tables, run the recursions, expose the results.

use cf_model::BasePairCatalog;
use cf_model::BasePairTypeId;
use cf_model::Complex;
use cf_model::KT_37;
use cf_model::Model;

use crate::CellRef;
use crate::Context;
use crate::Contribution;
use crate::DPCell;
use crate::PartitionError;
use crate::TableId;
use crate::Tables;
use crate::recursions;

#[derive(Debug, Clone, PartialEq)]
/// What to track besides the partition function itself.
pub struct PartitionOptions {
    /// Track dZ/dKd for this base-pair type (and its flipped partner).
    pub calc_deriv: Option<BasePairTypeId>,
    /// Record which cells contribute to every cell.
    pub calc_contrib: bool,
    /// Relative tolerance of the root invariance check.
    pub tolerance: f64,
}

impl Default for PartitionOptions {
    fn default() -> Self {
        Self {
            calc_deriv: None,
            calc_contrib: false,
            tolerance: 1.0e-7,
        }
    }
}

/// The filled tables of one complex under one model.
#[derive(Debug, Clone)]
pub struct Partition {
    tables: Tables,
    catalog: BasePairCatalog,
    options: PartitionOptions,
}

impl Partition {
    /// Fill every table for `complex` under `model`.
    pub fn compute(
        complex: &Complex,
        model: &Model,
        options: PartitionOptions,
    ) -> Result<Self, PartitionError> {
        let ctx = Context::new(complex, model, options.calc_deriv)?;
        log::debug!(
            "Partition function for N = {} ({} strands): {} base pair types, {} motifs, coax {}.",
            ctx.n,
            complex.strand_count(),
            ctx.catalog.len(),
            ctx.motifs.len(),
            if ctx.coax { "on" } else { "off" }
        );

        let mut tables = Tables::new(
            ctx.n,
            ctx.catalog.len(),
            ctx.params.c_init,
            options.calc_contrib,
        );
        for i in (0..ctx.n).filter(|&i| complex.in_forced_base_pair(i)) {
            tables.forbid_unpaired(i);
        }
        recursions::fill(&ctx, &mut tables);

        let part = Self {
            tables,
            catalog: ctx.catalog.clone(),
            options,
        };
        log::debug!("Z = {:e}, root spread {:e}.", part.z(), part.root_spread());
        Ok(part)
    }

    /// Number of residues in the complex.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// True for an empty complex.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Options the tables were filled with.
    pub fn options(&self) -> &PartitionOptions {
        &self.options
    }

    /// All filled tables.
    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    /// The partition function, read at root 0.
    pub fn z(&self) -> f64 {
        self.tables.z_final[0].q()
    }

    /// dZ/dKd of the tracked base-pair type; zero if none is tracked.
    pub fn dz(&self) -> f64 {
        self.tables.z_final[0].dq()
    }

    /// Ensemble free energy in kcal/mol at 37 °C.
    pub fn dg(&self) -> f64 {
        -KT_37 * self.z().ln()
    }

    /// Z computed from every root.
    pub fn z_final(&self) -> Vec<f64> {
        self.tables.z_final.iter().map(|c| c.q()).collect()
    }

    /// Largest relative deviation of any root from root 0.
    pub fn root_spread(&self) -> f64 {
        let reference = self.z();
        self.tables
            .z_final
            .iter()
            .map(|c| relative_difference(c.q(), reference))
            .fold(0.0, f64::max)
    }

    /// A cell of any table. For `TableId::ZFinal`, j is ignored.
    pub fn cell(&self, table: TableId, i: usize, j: usize) -> Result<&DPCell, PartitionError> {
        self.tables
            .cell(CellRef { table, i, j })
            .ok_or_else(|| PartitionError::UnknownTable(format!("{table:?}")))
    }

    /// The value of a cell.
    pub fn value(&self, table: TableId, i: usize, j: usize) -> Result<f64, PartitionError> {
        self.cell(table, i, j).map(|c| c.q())
    }

    /// Recorded contributions of a cell. Empty unless `calc_contrib` was set.
    pub fn contributions(
        &self,
        table: TableId,
        i: usize,
        j: usize,
    ) -> Result<&[Contribution], PartitionError> {
        self.cell(table, i, j).map(|c| c.contributions())
    }

    /// Resolve a table name such as `Z_linear` or `Z_BPq[CG]`.
    pub fn table_id(&self, name: &str) -> Result<TableId, PartitionError> {
        let unknown = || PartitionError::UnknownTable(name.to_string());
        if let Some(rest) = name.strip_prefix("Z_BPq") {
            let bpt = rest
                .strip_prefix('[')
                .and_then(|r| r.strip_suffix(']'))
                .and_then(|r| self.catalog.find(r))
                .ok_or_else(unknown)?;
            return Ok(TableId::ZBPq(bpt));
        }
        self.tables
            .ids()
            .into_iter()
            .find(|id| !matches!(id, TableId::ZBPq(_)) && id.name() == name)
            .ok_or_else(unknown)
    }

    /// Z_final must not depend on the root.
    pub fn run_cross_checks(&self) -> Result<(), PartitionError> {
        let reference = self.z();
        let tolerance = self.options.tolerance;
        for (root, cell) in self.tables.z_final.iter().enumerate() {
            if !approx::relative_eq!(cell.q(), reference, max_relative = tolerance) {
                log::warn!(
                    "Root invariance violated: Z_final[{root}] = {:e}, Z_final[0] = {reference:e}.",
                    cell.q()
                );
                return Err(PartitionError::RootInconsistency {
                    root,
                    value: cell.q(),
                    reference,
                    tolerance,
                });
            }
        }
        Ok(())
    }
}

fn relative_difference(value: f64, reference: f64) -> f64 {
    let scale = reference.abs().max(value.abs());
    if scale == 0.0 {
        0.0
    } else {
        (value - reference).abs() / scale
    }
}
