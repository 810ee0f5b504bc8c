use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use phenorank::{IndexBuilder, RelationIndex};

fn build_index(edges: usize) -> RelationIndex {
    let mut builder = IndexBuilder::new();
    for i in 0..edges {
        builder.add_drug_target(&format!("D{}", i % 500), &format!("P{}", i % 2000), Some("inhibitor"));
        builder.add_protein_gene(&format!("P{}", i % 2000), &format!("G{}", i % 1500));
        builder.add_gene_phenotype(&format!("G{}", i % 1500), &format!("HP:{:07}", i % 9000));
    }
    builder.build()
}

fn index_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Index builder");
    for edges in [1_000usize, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(edges), &edges, |b, &edges| {
            b.iter(|| build_index(black_box(edges)))
        });
    }
    group.finish();
}

criterion_group!(index, index_benchmark);
criterion_main!(index);
