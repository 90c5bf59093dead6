//! Read-only inputs shared by every recursion of one run.

use ndarray::Array2;

use cf_model::BasePairCatalog;
use cf_model::BasePairTypeId;
use cf_model::Complex;
use cf_model::Model;
use cf_model::Motif;
use cf_model::ModelError;
use cf_model::Params;

pub struct Context<'a> {
    pub n: usize,
    pub complex: &'a Complex,
    pub params: &'a Params,
    pub catalog: &'a BasePairCatalog,
    pub motifs: &'a [Motif],
    pub coax: bool,
    possible: Array2<Vec<BasePairTypeId>>,
    stack: Array2<f64>,
    inv_kd: Vec<f64>,
    flipped: Vec<BasePairTypeId>,
    deriv: Option<BasePairTypeId>,
}

impl<'a> Context<'a> {
    pub fn new(
        complex: &'a Complex,
        model: &'a Model,
        deriv: Option<BasePairTypeId>,
    ) -> Result<Self, ModelError> {
        let params = model.params();
        params.validate()?;
        let catalog = model.base_pair_types();
        if let Some(d) = deriv {
            if catalog.get(d).is_none() {
                return Err(ModelError::UnknownBasePairType(format!("#{}", d.index())));
            }
        }
        let mut inv_kd = Vec::with_capacity(catalog.len());
        let mut flipped = Vec::with_capacity(catalog.len());
        for (_, bpt) in catalog.iter() {
            let kd = bpt.kd();
            if !kd.is_finite() || kd <= 0.0 {
                return Err(ModelError::InvalidKd {
                    nt1: bpt.nt1() as char,
                    nt2: bpt.nt2() as char,
                    kd,
                });
            }
            inv_kd.push(1.0 / kd);
            flipped.push(bpt.flipped());
        }
        Ok(Self {
            n: complex.len(),
            complex,
            params,
            catalog,
            motifs: model.motifs(),
            coax: params.coax_enabled(),
            possible: model.possible_base_pair_types(complex),
            stack: model.c_eff_stack_matrix(),
            inv_kd,
            flipped,
            deriv,
        })
    }

    #[inline]
    pub fn lig(&self, i: usize) -> bool {
        self.complex.is_ligated(i)
    }

    /// May the loop grow by position j, i.e. is j not claimed by a forced pair?
    #[inline]
    pub fn extendable(&self, j: usize) -> bool {
        !self.complex.in_forced_base_pair(j)
    }

    #[inline]
    pub fn possible(&self, i: usize, j: usize) -> &[BasePairTypeId] {
        &self.possible[(i % self.n, j % self.n)]
    }

    /// Stacking weight of `outer` on `inner`.
    #[inline]
    pub fn stack(&self, outer: BasePairTypeId, inner: BasePairTypeId) -> f64 {
        self.stack[(outer.index(), inner.index())]
    }

    #[inline]
    pub fn inv_kd(&self, bpt: BasePairTypeId) -> f64 {
        self.inv_kd[bpt.index()]
    }

    #[inline]
    pub fn flipped(&self, bpt: BasePairTypeId) -> BasePairTypeId {
        self.flipped[bpt.index()]
    }

    /// Does `bpt` carry the Kd we differentiate against?
    pub fn is_deriv_target(&self, bpt: BasePairTypeId) -> bool {
        self.deriv
            .is_some_and(|d| d == bpt || self.flipped(d) == bpt)
    }
}
