//! The dynamic programming recursions.
//!
//! Every function computes the value of one cell, (i, j) or the root i, from
//! cells that are already final, and returns it to the driver which stores
//! it. Indices are never reduced: `j = i + offset`, `i - 1` is written as
//! `i + n - 1`, and the tables wrap.
//!
//! Fill order for each (i, j):
//! `Z_cut`, `Z_BPq` (per type), `Z_BP`, `Z_coax`, `C_eff_basic`,
//! `C_eff_no_coax_singlet`, `C_eff_no_BP_singlet`, `C_eff`, `Z_linear`.
//! Offsets are processed in increasing order, `Z_final` last.

use itertools::Itertools;

use cf_model::BasePairTypeId;
use cf_model::MotifMatch;

use crate::Context;
use crate::DPCell;
use crate::Tables;

/// Fill all tables, offset by offset, then close every root.
pub fn fill(ctx: &Context, t: &mut Tables) {
    let n = ctx.n;
    for offset in 1..n {
        for i in 0..n {
            let j = i + offset;

            let v = z_cut(ctx, t, i, j);
            t.z_cut.absorb(i, j, v);

            for &bpt in ctx.possible(i, j) {
                let v = z_bpq(ctx, t, i, j, bpt);
                t.z_bpq[bpt.index()].absorb(i, j, v);
            }

            let v = z_bp(ctx, t, i, j);
            t.z_bp.absorb(i, j, v);
            let v = z_coax(ctx, t, i, j);
            t.z_coax.absorb(i, j, v);

            let v = c_eff_basic(ctx, t, i, j);
            t.c_eff_basic.absorb(i, j, v);
            let v = c_eff_no_coax_singlet(ctx, t, i, j);
            t.c_eff_no_coax_singlet.absorb(i, j, v);
            let v = c_eff_no_bp_singlet(ctx, t, i, j);
            t.c_eff_no_bp_singlet.absorb(i, j, v);
            let v = c_eff(ctx, t, i, j);
            t.c_eff.absorb(i, j, v);

            let v = z_linear(ctx, t, i, j);
            t.z_linear.absorb(i, j, v);
        }
        log::trace!("Filled offset {offset}/{}.", n - 1);
    }
    for i in 0..n {
        let v = z_final(ctx, t, i);
        t.z_final[i].absorb(v);
    }
}

/// Two segments, one bonded to i and one bonded to j, separated by a
/// strand break at c.
pub fn z_cut(ctx: &Context, t: &Tables, i: usize, j: usize) -> DPCell {
    let mut z = DPCell::default();
    for c in i..j {
        if ctx.lig(c) {
            continue;
        }
        match (c == i, c + 1 == j) {
            (true, true) => z.add_value(1.0),
            (true, false) => {
                if ctx.lig(j - 1) {
                    z += t.z_linear.term(c + 1, j - 1);
                }
            }
            (false, true) => {
                if ctx.lig(i) {
                    z += t.z_linear.term(i + 1, c);
                }
            }
            (false, false) => {
                if ctx.lig(i) && ctx.lig(j - 1) {
                    z += &t.z_linear.term(i + 1, c) * &t.z_linear.term(c + 1, j - 1);
                }
            }
        }
    }
    z
}

/// All structures in which i pairs with j as type `bpt`.
pub fn z_bpq(ctx: &Context, t: &Tables, i: usize, j: usize, bpt: BasePairTypeId) -> DPCell {
    let p = ctx.params;
    let offset = j - i;
    let inv = ctx.inv_kd(bpt);
    let (cf_coax, cf_bp) = if p.allow_strained_3wj {
        (&t.c_eff, &t.c_eff)
    } else {
        (&t.c_eff_no_bp_singlet, &t.c_eff_no_coax_singlet)
    };

    let mut z = DPCell::default();
    if offset > 1 && ctx.lig(i) && ctx.lig(j - 1) {
        // closes a loop
        z += cf_bp.term(i + 1, j - 1) * (p.l * p.l * p.l_bp * inv);
        // stacks on (i+1, j-1)
        for &bpt2 in ctx.possible(i + 1, j - 1) {
            z += t.z_bpq(bpt2).term(i + 1, j - 1) * (inv * ctx.stack(bpt, bpt2));
        }
    }

    let closing = ctx.flipped(bpt);
    for motif in ctx.motifs {
        let Some(hit) = motif.match_at(ctx.complex, ctx.catalog, i, j) else {
            continue;
        };
        if !hit.closing().iter().any(|pm| pm.bpt == closing) {
            continue;
        }
        match hit {
            MotifMatch::Hairpin { .. } => z.add_value(inv * motif.c_eff()),
            MotifMatch::InternalLoop { inner, .. } => {
                for pm in inner {
                    z += t.z_bpq(pm.bpt).term(pm.i, pm.j) * (inv * motif.c_eff());
                }
            }
        }
    }

    // joins two previously disconnected strands
    z += t.z_cut.term(i, j) * (p.c_std * inv);

    if ctx.coax {
        let k_inv = p.k_coax * inv;
        if ctx.lig(i) && ctx.lig(j - 1) {
            let w = p.l * p.l * p.l_coax * k_inv;
            // stacks on (i+1, k), loop closes on the right
            for k in i + 2..j - 1 {
                if ctx.lig(k) {
                    z += &t.z_bp.term(i + 1, k) * &cf_coax.term(k + 1, j - 1) * w;
                }
            }
            // stacks on (k, j-1), loop closes on the left
            for k in i + 2..j - 1 {
                if ctx.lig(k - 1) {
                    z += &cf_coax.term(i + 1, k - 1) * &t.z_bp.term(k, j - 1) * w;
                }
            }
        }
        // stacks on (i+1, k), free strand ends on the right
        if ctx.lig(i) {
            for k in i + 2..j {
                z += &t.z_bp.term(i + 1, k) * &t.z_cut.term(k, j) * (p.c_std * k_inv);
            }
        }
        // stacks on (k, j-1), free strand ends on the left
        if ctx.lig(j - 1) {
            for k in i..j - 1 {
                z += &t.z_cut.term(i, k) * &t.z_bp.term(k, j - 1) * (p.c_std * k_inv);
            }
        }
    }

    if ctx.is_deriv_target(bpt) {
        let dq = -inv * z.q();
        z.add_deriv(dq);
    }
    z
}

/// Sum of `Z_BPq` over the types admissible at (i, j).
pub fn z_bp(ctx: &Context, t: &Tables, i: usize, j: usize) -> DPCell {
    let mut z = DPCell::default();
    for &bpt in ctx.possible(i, j) {
        z += t.z_bpq(bpt).term(i, j);
    }
    z
}

/// Coaxial stacks of (i, k) on (k+1, j).
pub fn z_coax(ctx: &Context, t: &Tables, i: usize, j: usize) -> DPCell {
    let mut z = DPCell::default();
    // counted by the boundary terms of Z_final
    if !ctx.coax || (j - i == ctx.n - 1 && ctx.lig(j)) {
        return z;
    }
    for k in i + 1..j - 1 {
        if !ctx.lig(k) || t.z_bp.val(i, k) == 0.0 || t.z_bp.val(k + 1, j) == 0.0 {
            continue;
        }
        z += &t.z_bp.term(i, k) * &t.z_bp.term(k + 1, j) * ctx.params.k_coax;
    }
    z
}

/// Effective molarity of a loop segment from i to j, without the singlet
/// terms that close the loop directly at (i, j).
pub fn c_eff_basic(ctx: &Context, t: &Tables, i: usize, j: usize) -> DPCell {
    let p = ctx.params;
    let mut z = DPCell::default();

    // j unpaired
    if ctx.lig(j - 1) && ctx.extendable(j) {
        z += t.c_eff.term(i, j - 1) * p.l;
    }

    let exclude_strained_3wj = !p.allow_strained_3wj && j - i == ctx.n - 1 && ctx.lig(j);

    // j pairs with k > i
    let cf_bp = if exclude_strained_3wj { &t.c_eff_no_coax_singlet } else { &t.c_eff };
    for k in i + 1..j {
        if ctx.lig(k - 1) {
            z += &cf_bp.term(i, k - 1) * &t.z_bp.term(k, j) * (p.l * p.l_bp);
        }
    }

    // j coaxially stacked, partner k > i
    if ctx.coax {
        let cf_coax = if exclude_strained_3wj { &t.c_eff_no_bp_singlet } else { &t.c_eff };
        for k in i + 1..j {
            if ctx.lig(k - 1) {
                z += &cf_coax.term(i, k - 1) * &t.z_coax.term(k, j) * (p.l * p.l_coax);
            }
        }
    }
    z
}

/// `C_eff_basic` plus a single helix closing the loop.
pub fn c_eff_no_coax_singlet(ctx: &Context, t: &Tables, i: usize, j: usize) -> DPCell {
    let p = ctx.params;
    let mut z = DPCell::default();
    z += t.c_eff_basic.term(i, j);
    z += t.z_bp.term(i, j) * (p.c_init * p.l_bp);
    z
}

/// `C_eff_basic` plus a single coaxial stack closing the loop.
pub fn c_eff_no_bp_singlet(ctx: &Context, t: &Tables, i: usize, j: usize) -> DPCell {
    let p = ctx.params;
    let mut z = DPCell::default();
    if ctx.coax {
        z += t.c_eff_basic.term(i, j);
        z += t.z_coax.term(i, j) * (p.c_init * p.l_coax);
    }
    z
}

/// `C_eff_basic` plus both singlet terms.
pub fn c_eff(ctx: &Context, t: &Tables, i: usize, j: usize) -> DPCell {
    let p = ctx.params;
    let mut z = DPCell::default();
    z += t.c_eff_basic.term(i, j);
    z += t.z_bp.term(i, j) * (p.c_init * p.l_bp);
    if ctx.coax {
        z += t.z_coax.term(i, j) * (p.c_init * p.l_coax);
    }
    z
}

/// All structures on the contiguous interval from i to j.
pub fn z_linear(ctx: &Context, t: &Tables, i: usize, j: usize) -> DPCell {
    let mut z = DPCell::default();

    if ctx.lig(j - 1) && ctx.extendable(j) {
        z += t.z_linear.term(i, j - 1);
    }

    z += t.z_bp.term(i, j);
    for k in i + 1..j {
        if ctx.lig(k - 1) {
            z += &t.z_linear.term(i, k - 1) * &t.z_bp.term(k, j);
        }
    }

    if ctx.coax {
        z += t.z_coax.term(i, j);
        for k in i + 1..j {
            if ctx.lig(k - 1) {
                z += &t.z_linear.term(i, k - 1) * &t.z_coax.term(k, j);
            }
        }
    }
    z
}

/// The full partition function, with the circle opened between i-1 and i.
pub fn z_final(ctx: &Context, t: &Tables, i: usize) -> DPCell {
    let p = ctx.params;
    let n = ctx.n;
    let last = i + n - 1;
    let mut z = DPCell::default();

    if !ctx.lig(last) {
        z += t.z_linear.term(i, last);
        return z;
    }

    // Every term below that closes a pair across the ligation reads cells
    // already carrying one C_std from their own Z_cut term.

    // closing the outer loop across the ligation
    z += (t.c_eff_no_coax_singlet.term(i, last) * p.l).scale_divide(p.c_std);

    // split segments on either side of the ligation
    for c in i..last {
        if !ctx.lig(c) {
            z += &t.z_linear.term(i, c) * &t.z_linear.term(c + 1, last);
        }
    }

    for j in i + 1..last {
        // (j+1, i-1) stacked on (i, j)
        if ctx.lig(j) && t.z_bp.val(i, j) > 0.0 && t.z_bp.val(j + 1, last) > 0.0 {
            let pairs = ctx.possible(i, j).iter().cartesian_product(ctx.possible(j + 1, last));
            for (&bpt, &bpt2) in pairs {
                if t.z_bpq(bpt).val(i, j) == 0.0 || t.z_bpq(bpt2).val(j + 1, last) == 0.0 {
                    continue;
                }
                let w = ctx.stack(ctx.flipped(bpt2), bpt) / p.c_std;
                z += &t.z_bpq(bpt2).term(j + 1, last) * &t.z_bpq(bpt).term(i, j) * w;
            }
        }

        // internal loop motifs with the ligation inside their last strand
        for motif in ctx.motifs.iter().filter(|m| m.strand_count() == 2) {
            for k in i..i + motif.last_strand_len() - 1 {
                let Some(MotifMatch::InternalLoop { inner, closing }) =
                    motif.match_at(ctx.complex, ctx.catalog, j, k)
                else {
                    continue;
                };
                for (pc, pi) in closing.iter().cartesian_product(&inner) {
                    z += &t.z_bpq(pi.bpt).term(pi.i, pi.j)
                        * &t.z_bpq(pc.bpt).term(pc.i, pc.j)
                        * (motif.c_eff() / p.c_std);
                }
            }
        }
    }

    // hairpin motifs with the ligation inside the loop
    for motif in ctx.motifs.iter().filter(|m| m.strand_count() == 1) {
        let len = motif.last_strand_len();
        if len > n {
            continue;
        }
        for k in i..i + len - 1 {
            let start = (k + n - (len - 1)) % n;
            let Some(hit) = motif.match_at(ctx.complex, ctx.catalog, start, k) else {
                continue;
            };
            for pc in hit.closing() {
                z += t.z_bpq(pc.bpt).term(pc.i, pc.j) * (motif.c_eff() / p.c_std);
            }
        }
    }

    if ctx.coax {
        let cf_coax = if p.allow_strained_3wj { &t.c_eff } else { &t.c_eff_no_bp_singlet };
        let w_loop = p.l * p.l * p.l_coax * p.k_coax / p.c_std;
        for j in i + 1..last.saturating_sub(1) {
            if t.z_bp.val(i, j) == 0.0 {
                continue;
            }
            // (i, j) stacked on (k, i-1), connected by a loop
            if ctx.lig(j) {
                for k in j + 2..last {
                    if !ctx.lig(k - 1) || t.z_bp.val(k, last) == 0.0 {
                        continue;
                    }
                    z += (&t.z_bp.term(i, j) * &cf_coax.term(j + 1, k - 1))
                        * t.z_bp.term(k, last)
                        * w_loop;
                }
            }
            // (i, j) stacked on (k, i-1), strands split in between
            for k in j + 1..last {
                if t.z_bp.val(k, last) == 0.0 || (k - j == 1 && ctx.lig(j)) {
                    continue;
                }
                z += (&t.z_bp.term(i, j) * &t.z_cut.term(j, k))
                    * t.z_bp.term(k, last)
                    * p.k_coax;
            }
        }
    }
    z
}
