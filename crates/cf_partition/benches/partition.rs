use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;

use cf_model::BasePairTypeId;
use cf_model::Complex;
use cf_model::Model;
use cf_partition::Partition;
use cf_partition::PartitionOptions;

pub fn partition_function(c: &mut Criterion) {
    let mut group = c.benchmark_group("Partition");

    let model = Model::default();
    let single = Complex::try_from("GGGGAAACCCCAUAUGGGAAACCCAUGCAUGCAAAGCAUGC").unwrap();
    let duplex = Complex::try_from("GCGCAUAUGCAAAGCAUAUGC GCAUAUGCUUUGCAUAUGCGC").unwrap();

    group.bench_function("Single strand, coax on.", |b| {
        b.iter(|| {
            let _ = Partition::compute(&single, &model, PartitionOptions::default());
        });
    });

    let no_coax = {
        let mut m = model.clone();
        let _ = m.set_params(m.params().clone().without_coax());
        m
    };
    group.bench_function("Single strand, coax off.", |b| {
        b.iter(|| {
            let _ = Partition::compute(&single, &no_coax, PartitionOptions::default());
        });
    });

    group.bench_function("Two strands, derivative.", |b| {
        let options = PartitionOptions {
            calc_deriv: Some(BasePairTypeId(0)),
            ..PartitionOptions::default()
        };
        b.iter(|| {
            let _ = Partition::compute(&duplex, &model, options.clone());
        });
    });

    group.bench_function("Two strands, contributions.", |b| {
        let options = PartitionOptions {
            calc_contrib: true,
            ..PartitionOptions::default()
        };
        b.iter(|| {
            let _ = Partition::compute(&duplex, &model, options.clone());
        });
    });
}

criterion_group!(benches, partition_function);
criterion_main!(benches);
