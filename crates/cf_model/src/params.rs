//! Scalar energy parameters.
//!
//! All weights are multiplicative (Boltzmann factors or concentrations in
//! molar units). Loop closure costs are modeled as an initial effective
//! molarity `c_init` that is reduced by `l` per loop element, by `l_bp` per
//! helix end, and by `l_coax` per coaxial stack in the loop.

use serde::Deserialize;
use serde::Serialize;

use crate::ModelError;

/// Boltzmann constant times 37 °C, in kcal/mol.
pub const KT_37: f64 = 0.61593;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Effective molarity of the first loop element (M).
    pub c_init: f64,
    /// Per-residue loop factor.
    pub l: f64,
    /// Per-helix-end loop factor.
    pub l_bp: f64,
    /// Default stacking weight between two adjacent pairs (M).
    pub c_eff_stacked_pair: f64,
    /// Coaxial stacking constant. Zero disables coaxial stacking.
    pub k_coax: f64,
    /// Loop factor for a coaxial stack inside a loop.
    pub l_coax: f64,
    /// Standard state concentration (M).
    pub c_std: f64,
    /// Smallest hairpin loop closed by a fully ligated arc.
    pub min_loop_length: usize,
    /// Allow three-way junctions closed by a single helix plus coaxial stack
    /// without any intervening loop residue.
    pub allow_strained_3wj: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            c_init: 1.0,
            l: 0.5,
            l_bp: 0.2,
            c_eff_stacked_pair: 1.0e4,
            k_coax: 100.0,
            l_coax: 200.0,
            c_std: 1.0,
            min_loop_length: 3,
            allow_strained_3wj: false,
        }
    }
}

impl Params {
    pub fn coax_enabled(&self) -> bool {
        self.k_coax > 0.0
    }

    /// Params with coaxial stacking switched off.
    pub fn without_coax(mut self) -> Self {
        self.k_coax = 0.0;
        self
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let non_negative = [
            ("c_init", self.c_init),
            ("l", self.l),
            ("l_bp", self.l_bp),
            ("c_eff_stacked_pair", self.c_eff_stacked_pair),
            ("k_coax", self.k_coax),
            ("l_coax", self.l_coax),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ModelError::InvalidParameter {
                    name,
                    value,
                    reason: "must be finite and >= 0",
                });
            }
        }
        if !self.c_std.is_finite() || self.c_std <= 0.0 {
            return Err(ModelError::InvalidParameter {
                name: "c_std",
                value: self.c_std,
                reason: "must be finite and > 0",
            });
        }
        if self.min_loop_length == 0 {
            return Err(ModelError::InvalidParameter {
                name: "min_loop_length",
                value: 0.0,
                reason: "must be >= 1",
            });
        }
        Ok(())
    }
}
