//! The energy model: parameters plus base-pair and motif catalogs.
//!
//! Models are built once (in code or from JSON) and then shared read-only
//! by the recursions.

use std::path::Path;
use ahash::AHashMap;
use ahash::AHashSet;
use ndarray::Array2;
use serde::Deserialize;
use serde::Serialize;

use crate::BasePairCatalog;
use crate::BasePairTypeId;
use crate::Complex;
use crate::ModelError;
use crate::Motif;
use crate::MotifId;
use crate::MotifKind;
use crate::Params;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasePairSpec {
    pub nt1: char,
    pub nt2: char,
    pub kd: f64,
}

/// Stacking weight override for `outer` (i, j) stacked on `inner` (i+1, j-1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackSpec {
    pub outer: String,
    pub inner: String,
    pub c_eff: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotifSpec {
    pub name: String,
    pub strands: Vec<String>,
    pub c_eff: f64,
}

/// Serialized form of a `Model`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub params: Params,
    pub base_pairs: Vec<BasePairSpec>,
    #[serde(default)]
    pub stacks: Vec<StackSpec>,
    #[serde(default)]
    pub motifs: Vec<MotifSpec>,
}

/// Dissociation constant (M) of every base pair in `Model::default`.
pub const DEFAULT_KD: f64 = 2.0e-4;

#[derive(Debug, Clone)]
pub struct Model {
    params: Params,
    base_pair_types: BasePairCatalog,
    stack_overrides: AHashMap<(BasePairTypeId, BasePairTypeId), f64>,
    motifs: Vec<Motif>,
}

impl Default for Model {
    /// Standard parameters with Watson-Crick and G-U wobble pairs.
    fn default() -> Self {
        let mut base_pair_types = BasePairCatalog::new();
        for (nt1, nt2) in [(b'C', b'G'), (b'A', b'U'), (b'G', b'U')] {
            base_pair_types.insert_valid(nt1, nt2, DEFAULT_KD);
        }
        Self {
            params: Params::default(),
            base_pair_types,
            stack_overrides: AHashMap::default(),
            motifs: Vec::new(),
        }
    }
}

impl Model {
    /// A model without base pairs; add them with `add_base_pair`.
    pub fn new(params: Params) -> Result<Self, ModelError> {
        params.validate()?;
        Ok(Self {
            params,
            base_pair_types: BasePairCatalog::new(),
            stack_overrides: AHashMap::default(),
            motifs: Vec::new(),
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        let config: ModelConfig = serde_json::from_str(json)?;
        Self::try_from(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn set_params(&mut self, params: Params) -> Result<(), ModelError> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    pub fn base_pair_types(&self) -> &BasePairCatalog {
        &self.base_pair_types
    }

    pub fn add_base_pair(&mut self, nt1: char, nt2: char, kd: f64) -> Result<BasePairTypeId, ModelError> {
        self.base_pair_types.insert(nt1 as u8, nt2 as u8, kd)
    }

    /// Set the Kd of a type (and its flipped partner).
    pub fn set_kd(&mut self, bpt: BasePairTypeId, kd: f64) -> Result<(), ModelError> {
        self.base_pair_types.set_kd(bpt, kd)
    }

    pub fn find_base_pair_type(&self, name: &str) -> Result<BasePairTypeId, ModelError> {
        self.base_pair_types
            .find(name)
            .ok_or_else(|| ModelError::UnknownBasePairType(name.to_string()))
    }

    /// Override the stacking weight of `outer` on `inner`. The same stack seen
    /// from the other side, flipped(inner) on flipped(outer), is set as well.
    pub fn set_stack(&mut self, outer: BasePairTypeId, inner: BasePairTypeId, c_eff: f64) -> Result<(), ModelError> {
        if !c_eff.is_finite() || c_eff < 0.0 {
            return Err(ModelError::InvalidParameter {
                name: "c_eff_stack",
                value: c_eff,
                reason: "must be finite and >= 0",
            });
        }
        let flip = |id: BasePairTypeId| {
            self.base_pair_types
                .get(id)
                .map(|t| t.flipped())
                .ok_or_else(|| ModelError::UnknownBasePairType(format!("#{}", id.0)))
        };
        let (fo, fi) = (flip(outer)?, flip(inner)?);
        self.stack_overrides.insert((outer, inner), c_eff);
        self.stack_overrides.insert((fi, fo), c_eff);
        Ok(())
    }

    /// Stacking weight of `outer` (i, j) on `inner` (i+1, j-1).
    pub fn c_eff_stack(&self, outer: BasePairTypeId, inner: BasePairTypeId) -> f64 {
        self.stack_overrides
            .get(&(outer, inner))
            .copied()
            .unwrap_or(self.params.c_eff_stacked_pair)
    }

    /// Dense stacking-weight matrix, indexed by type ids.
    pub fn c_eff_stack_matrix(&self) -> Array2<f64> {
        let n = self.base_pair_types.len();
        Array2::from_shape_fn((n, n), |(a, b)| {
            self.c_eff_stack(BasePairTypeId(a), BasePairTypeId(b))
        })
    }

    /// Add a motif. Internal loops are also registered as seen from their
    /// inner pair, unless that rotation is the motif itself.
    pub fn add_motif<S: AsRef<str>>(&mut self, name: &str, strands: &[S], c_eff: f64) -> Result<MotifId, ModelError> {
        let motif = Motif::new(name, strands, c_eff)?;
        let id = MotifId(self.motifs.len());
        let rotated = motif.rotated().filter(|r| r.kind() != motif.kind());
        self.motifs.push(motif);
        if let Some(r) = rotated {
            log::debug!("Registering rotated internal loop motif '{}'.", r.name());
            self.motifs.push(r);
        }
        Ok(id)
    }

    pub fn motifs(&self) -> &[Motif] {
        &self.motifs
    }

    pub fn motif(&self, id: MotifId) -> Option<&Motif> {
        self.motifs.get(id.0)
    }

    /// Base-pair types that may pair i (5') with j (3') on this complex.
    ///
    /// A pair is excluded if one of the two arcs it separates is a fully
    /// ligated run of at most `min_loop_length` positions, or if a forced
    /// pair constraint assigns i or j another partner.
    pub fn possible_base_pair_types(&self, complex: &Complex) -> Array2<Vec<BasePairTypeId>> {
        let n = complex.len();
        let mll = self.params.min_loop_length;
        Array2::from_shape_fn((n, n), |(i, j)| {
            if i == j || !complex.allows_pair(i, j) {
                return Vec::new();
            }
            let d_in = (j + n - i) % n;
            let d_out = n - d_in;
            if (d_in <= mll && complex.ligated_run(i, d_in))
                || (d_out <= mll && complex.ligated_run(j, d_out))
            {
                return Vec::new();
            }
            self.base_pair_types
                .matching(complex.nt(i), complex.nt(j))
                .to_vec()
        })
    }

    pub fn to_config(&self) -> ModelConfig {
        let mut seen = AHashSet::new();
        let base_pairs = self.base_pair_types
            .iter()
            .filter(|(id, t)| {
                let fresh = !seen.contains(id);
                seen.insert(*id);
                seen.insert(t.flipped());
                fresh
            })
            .map(|(_, t)| BasePairSpec {
                nt1: t.nt1() as char,
                nt2: t.nt2() as char,
                kd: t.kd(),
            })
            .collect();

        let name = |id: &BasePairTypeId| format!("{}", self.base_pair_types[*id]);
        let mut stacks: Vec<StackSpec> = self.stack_overrides
            .iter()
            .map(|((outer, inner), &c_eff)| StackSpec {
                outer: name(outer),
                inner: name(inner),
                c_eff,
            })
            .collect();
        stacks.sort_by(|a, b| (&a.outer, &a.inner).cmp(&(&b.outer, &b.inner)));

        let motifs = self.motifs
            .iter()
            .filter(|m| !m.is_rotation())
            .map(|m| MotifSpec {
                name: m.name().to_string(),
                strands: match m.kind() {
                    MotifKind::Hairpin { strand } => vec![template_string(strand)],
                    MotifKind::InternalLoop { strands } => {
                        strands.iter().map(|s| template_string(s)).collect()
                    }
                },
                c_eff: m.c_eff(),
            })
            .collect();

        ModelConfig {
            params: self.params.clone(),
            base_pairs,
            stacks,
            motifs,
        }
    }
}

fn template_string(t: &[u8]) -> String {
    t.iter().map(|&b| b as char).collect()
}

impl TryFrom<ModelConfig> for Model {
    type Error = ModelError;

    fn try_from(config: ModelConfig) -> Result<Self, Self::Error> {
        let mut model = Model::new(config.params)?;
        for bp in &config.base_pairs {
            model.add_base_pair(bp.nt1, bp.nt2, bp.kd)?;
        }
        for st in &config.stacks {
            let outer = model.find_base_pair_type(&st.outer)?;
            let inner = model.find_base_pair_type(&st.inner)?;
            model.set_stack(outer, inner, st.c_eff)?;
        }
        for m in &config.motifs {
            model.add_motif(&m.name, &m.strands, m.c_eff)?;
        }
        log::debug!(
            "Loaded model: {} base pair types, {} motifs.",
            model.base_pair_types.len(),
            model.motifs.len()
        );
        Ok(model)
    }
}
