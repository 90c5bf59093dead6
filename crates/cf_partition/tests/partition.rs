use approx::assert_relative_eq;

use cf_model::BasePairTypeId;
use cf_model::Complex;
use cf_model::Model;
use cf_model::Params;
use cf_partition::Partition;
use cf_partition::PartitionOptions;
use cf_partition::TableId;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn compute(complex: &Complex, model: &Model) -> Partition {
    Partition::compute(complex, model, PartitionOptions::default()).unwrap()
}

/// Params away from the defaults, so that every factor shows up in Z.
fn test_params() -> Params {
    Params {
        c_init: 2.0,
        l: 0.4,
        l_bp: 0.3,
        c_eff_stacked_pair: 50.0,
        k_coax: 8.0,
        l_coax: 3.0,
        c_std: 1.0,
        min_loop_length: 3,
        allow_strained_3wj: false,
    }
}

fn test_model(params: Params) -> Model {
    let mut model = Model::new(params).unwrap();
    model.add_base_pair('C', 'G', 1e-2).unwrap();
    model.add_base_pair('A', 'U', 3e-2).unwrap();
    model.add_base_pair('G', 'U', 1e-1).unwrap();
    let cg = model.find_base_pair_type("CG").unwrap();
    let au = model.find_base_pair_type("AU").unwrap();
    let gc = model.find_base_pair_type("GC").unwrap();
    model.set_stack(cg, au, 20.0).unwrap();
    model.set_stack(gc, gc, 120.0).unwrap();
    model
}

fn motif_model(params: Params) -> Model {
    let mut model = test_model(params);
    model.add_motif("gaaaac", &["GAAAAC"], 40.0).unwrap();
    model.add_motif("1x1", &["CAG", "CUG"], 25.0).unwrap();
    model
}

/// Classical reference for a single linear strand without coaxial stacks
/// or motifs: explicit sum over all non-crossing structures.
mod brute_force {
    use cf_model::BasePairTypeId;
    use cf_model::Complex;
    use cf_model::Model;

    fn pair_type(model: &Model, complex: &Complex, i: usize, j: usize) -> Option<BasePairTypeId> {
        model
            .base_pair_types()
            .matching(complex.nt(i), complex.nt(j))
            .first()
            .copied()
    }

    fn structures(model: &Model, complex: &Complex, i: usize, j: usize) -> Vec<Vec<(usize, usize)>> {
        if i > j {
            return vec![vec![]];
        }
        let mll = model.params().min_loop_length;
        let mut all = structures(model, complex, i + 1, j);
        for k in i + mll + 1..=j {
            if pair_type(model, complex, i, k).is_none() {
                continue;
            }
            let inner = structures(model, complex, i + 1, k - 1);
            let outer = structures(model, complex, k + 1, j);
            for s1 in &inner {
                for s2 in &outer {
                    let mut s = vec![(i, k)];
                    s.extend(s1);
                    s.extend(s2);
                    all.push(s);
                }
            }
        }
        all
    }

    fn weight(model: &Model, complex: &Complex, pairs: &[(usize, usize)]) -> f64 {
        let p = model.params();
        let mut partner = vec![None; complex.len()];
        for &(i, j) in pairs {
            partner[i] = Some(j);
            partner[j] = Some(i);
        }
        let mut w = 1.0;
        for &(i, j) in pairs {
            let outer = pair_type(model, complex, i, j).unwrap();
            w /= model.base_pair_types()[outer].kd();
            let (mut u, mut h, mut k) = (0, 0, i + 1);
            while k < j {
                match partner[k] {
                    Some(q) if q > k => {
                        h += 1;
                        k = q + 1;
                    }
                    _ => {
                        u += 1;
                        k += 1;
                    }
                }
            }
            let mut loop_w = p.c_init * p.l.powi(u + h + 1) * p.l_bp.powi(h + 1);
            if u == 0 && h == 1 {
                let inner = pair_type(model, complex, i + 1, j - 1).unwrap();
                loop_w += model.c_eff_stack(outer, inner);
            }
            w *= loop_w;
        }
        w
    }

    pub fn z(model: &Model, complex: &Complex) -> (f64, usize) {
        let all = structures(model, complex, 0, complex.len() - 1);
        let z = all.iter().map(|s| weight(model, complex, s)).sum();
        (z, all.len())
    }
}

#[test]
fn test_single_nucleotide() {
    init();
    let model = Model::default();
    for seq in ["A", "G"] {
        let part = compute(&Complex::try_from(seq).unwrap(), &model);
        assert_eq!(part.z_final(), vec![1.0]);
    }
}

#[test]
fn test_hairpin_motif_only() {
    init();
    let params = Params {
        c_init: 0.0,
        k_coax: 0.0,
        ..Params::default()
    };
    let mut model = Model::new(params).unwrap();
    let kd = 1e-3;
    model.add_base_pair('C', 'G', kd).unwrap();
    let c_eff = 40.0;
    model.add_motif("gaaaac", &["GAAAAC"], c_eff).unwrap();

    let complex = Complex::try_from("GAAAAC").unwrap();
    let part = compute(&complex, &model);

    assert_relative_eq!(part.value(TableId::ZBP, 0, 5).unwrap(), c_eff / kd, max_relative = 1e-12);
    for i in 0..6 {
        for j in 0..6 {
            if (i, j) != (0, 5) && (i, j) != (5, 0) {
                assert_eq!(part.value(TableId::ZBP, i, j).unwrap(), 0.0, "Z_BP[{i}][{j}]");
            }
        }
    }
    for z in part.z_final() {
        assert_relative_eq!(z, 1.0 + c_eff / kd, max_relative = 1e-12);
    }
}

#[test]
fn test_classical_reference() {
    init();
    let model = test_model(test_params().without_coax());
    for seq in ["GGGAAACCC", "GGACUUCGGUCC", "GCAUGCAUGCAU", "AUGGCUAAGCCAU"] {
        let complex = Complex::try_from(seq).unwrap();
        let part = compute(&complex, &model);
        let (reference, count) = brute_force::z(&model, &complex);
        log::debug!("{seq}: {count} structures, Z = {reference:e}");
        assert!(count > 1);
        assert_relative_eq!(part.z(), reference, max_relative = 1e-10);
        assert!(part.run_cross_checks().is_ok(), "{seq}");
    }
}

fn invariance_complexes() -> Vec<Complex> {
    vec![
        Complex::try_from("GGGAAACCC").unwrap(),
        Complex::try_from("CAGGAAAACCUG").unwrap(),
        Complex::try_from("CAGGAAAAC CUG").unwrap(),
        Complex::try_from("GG CC").unwrap(),
        Complex::try_from("GGCAC GUGAAAGC GCUUCC").unwrap(),
        Complex::try_from("GCGCAUAUGC+GCAUAUGCGC").unwrap(),
        Complex::circular("CAGGAAAACCUGAA").unwrap(),
        Complex::circular("GGGCAAAGCCCAAAGC").unwrap(),
    ]
}

#[test]
fn test_root_invariance() {
    init();
    let complexes = invariance_complexes();
    for strained in [false, true] {
        let params = Params {
            allow_strained_3wj: strained,
            ..test_params()
        };
        for model in [test_model(params.clone()), motif_model(params.clone())] {
            for complex in &complexes {
                let part = compute(complex, &model);
                assert!(
                    part.run_cross_checks().is_ok(),
                    "{complex} (strained: {strained}): {:?}",
                    part.z_final()
                );
            }
        }
    }
}

#[test]
fn test_root_invariance_c_std() {
    init();
    let complexes = invariance_complexes();
    for c_std in [0.5, 2.5] {
        for strained in [false, true] {
            let params = Params {
                c_std,
                allow_strained_3wj: strained,
                ..test_params()
            };
            for params in [params.clone(), params.without_coax()] {
                let model = motif_model(params);
                for complex in &complexes {
                    let part = compute(complex, &model);
                    assert!(
                        part.run_cross_checks().is_ok(),
                        "{complex} (c_std: {c_std}, strained: {strained}): {:?}",
                        part.z_final()
                    );
                }
            }
        }
    }
}

#[test]
fn test_c_std_scales_duplexes_only() {
    init();
    let z = |c_std: f64, seq: &str| {
        let model = test_model(Params { c_std, ..test_params() });
        compute(&Complex::try_from(seq).unwrap(), &model).z()
    };
    assert_relative_eq!(z(2.5, "GGGAAACCC"), z(1.0, "GGGAAACCC"), max_relative = 1e-12);
    assert!(z(2.5, "GGGAAAA CCC") > z(1.0, "GGGAAAA CCC"));
}

#[test]
fn test_root_invariance_default_model() {
    init();
    let model = Model::default();
    for seq in ["GGGGAAACCCCAUAUGGGAAACCCAU", "GCGCAAAGCGC GCGCUUUGCGC"] {
        let part = compute(&Complex::try_from(seq).unwrap(), &model);
        assert!(part.run_cross_checks().is_ok(), "{seq}");
        assert!(part.dg() < 0.0);
    }
}

#[test]
fn test_motifs_contribute() {
    init();
    let complex = Complex::try_from("CAGGAAAACCUG").unwrap();
    let plain = compute(&complex, &test_model(test_params()));
    let with_motifs = compute(&complex, &motif_model(test_params()));
    assert!(with_motifs.z() > plain.z());
    assert!(with_motifs.run_cross_checks().is_ok());
}

#[test]
fn test_coax_adds_weight() {
    init();
    let complex = Complex::try_from("GGCAC GUGAAAGC GCUUCC").unwrap();
    let with_coax = compute(&complex, &test_model(test_params()));
    let without = compute(&complex, &test_model(test_params().without_coax()));
    assert!(with_coax.z() > without.z());
    assert_eq!(without.value(TableId::ZCoax, 0, 10).unwrap(), 0.0);
    assert!(without.run_cross_checks().is_ok());
}

#[test]
fn test_forced_pairs() {
    init();
    let model = test_model(test_params());
    let free = Complex::try_from("GGGAAACCCAAAGGGAAACCC").unwrap();
    let forced = free.clone().with_constraint("(.......)............").unwrap();
    let z_free = compute(&free, &model);
    let z_forced = compute(&forced, &model);
    assert!(z_forced.z() < z_free.z());
    assert!(z_forced.z() > 0.0);
    assert!(z_forced.run_cross_checks().is_ok());
    // position 0 may only pair with 8
    assert_eq!(z_forced.value(TableId::ZBP, 0, 7).unwrap(), 0.0);
    assert!(z_free.value(TableId::ZBP, 0, 7).unwrap() > 0.0);
    assert!(z_forced.value(TableId::ZBP, 1, 7).unwrap() > 0.0);
    // and can not stay unpaired
    assert_eq!(z_forced.value(TableId::ZLinear, 0, 0).unwrap(), 0.0);
    assert_eq!(z_forced.value(TableId::CEff, 8, 8).unwrap(), 0.0);
}

fn z_with_kd(complex: &Complex, model: &Model, bpt: BasePairTypeId, kd: f64) -> f64 {
    let mut model = model.clone();
    model.set_kd(bpt, kd).unwrap();
    compute(complex, &model).z()
}

#[test]
fn test_derivative_matches_finite_difference() {
    init();
    let cases = [
        (Complex::try_from("GGGAAACCC").unwrap(), motif_model(test_params().without_coax())),
        (Complex::try_from("CAGGAAAACCUG").unwrap(), motif_model(test_params())),
        (Complex::try_from("GGCAC GUGAAAGC GCUUCC").unwrap(), test_model(test_params())),
        (
            Complex::try_from("CAGGAAAAC CUG").unwrap(),
            motif_model(Params { c_std: 2.5, ..test_params() }),
        ),
    ];
    for (complex, model) in &cases {
        for name in ["CG", "AU"] {
            let bpt = model.find_base_pair_type(name).unwrap();
            let options = PartitionOptions {
                calc_deriv: Some(bpt),
                ..PartitionOptions::default()
            };
            let part = Partition::compute(complex, model, options).unwrap();

            let kd = model.base_pair_types()[bpt].kd();
            let h = kd * 1e-5;
            let numeric = (z_with_kd(complex, model, bpt, kd + h)
                - z_with_kd(complex, model, bpt, kd - h))
                / (2.0 * h);

            assert_relative_eq!(part.dz(), numeric, max_relative = 1e-5, epsilon = 1e-9);
            // every root carries the same derivative
            for cell in part.tables().z_final.iter() {
                assert_relative_eq!(cell.dq(), part.dz(), max_relative = 1e-7, epsilon = 1e-9);
            }
        }
    }
}

#[test]
fn test_derivative_off_by_default() {
    init();
    let model = test_model(test_params());
    let part = compute(&Complex::try_from("GGGAAACCC").unwrap(), &model);
    assert_eq!(part.dz(), 0.0);
}

#[test]
fn test_contributions() {
    init();
    let model = motif_model(test_params());
    let complex = Complex::try_from("CAGGAAAACCUG").unwrap();
    let plain = compute(&complex, &model);
    assert!(plain.contributions(TableId::ZLinear, 0, 11).unwrap().is_empty());

    let options = PartitionOptions {
        calc_contrib: true,
        ..PartitionOptions::default()
    };
    let part = Partition::compute(&complex, &model, options).unwrap();
    assert_relative_eq!(part.z(), plain.z(), max_relative = 1e-14);

    let n = complex.len();
    for i in 0..n {
        for offset in 1..n {
            let j = (i + offset) % n;
            // Z_BP is a plain sum of per-type cells
            let cell = part.cell(TableId::ZBP, i, j).unwrap();
            let total: f64 = cell.contributions().iter().map(|c| c.weight).sum();
            assert_relative_eq!(total, cell.q(), max_relative = 1e-12);
            for c in cell.contributions() {
                assert_eq!(c.sources.len(), 1);
                assert!(matches!(c.sources[0].table, TableId::ZBPq(_)));
                assert_eq!((c.sources[0].i, c.sources[0].j), (i, j));
            }

            // Z_linear only sums recorded cells, and references existing ones
            let cell = part.cell(TableId::ZLinear, i, j).unwrap();
            let total: f64 = cell.contributions().iter().map(|c| c.weight).sum();
            assert_relative_eq!(total, cell.q(), max_relative = 1e-12);
            for c in cell.contributions() {
                for src in &c.sources {
                    assert_ne!((src.table, src.i, src.j), (TableId::ZLinear, i, j));
                    assert!(part.cell(src.table, src.i, src.j).is_ok());
                }
            }
        }
    }

    let root = part.contributions(TableId::ZFinal, 0, 0).unwrap();
    assert_eq!(root.len(), 1);
    assert_eq!(root[0].sources[0].table, TableId::ZLinear);
}
