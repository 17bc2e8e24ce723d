//! Benchmarks for the reference n-gram backend

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use simbench_core::backend::{Backend, NgramIndex};
use simbench_core::Corpus;

const CORPUS_SIZE: usize = 5_000;
const QUERIES: usize = 100;

fn corpus() -> Corpus {
    Corpus::synthetic(CORPUS_SIZE, 42).unwrap()
}

fn bench_insert(c: &mut Criterion) {
    let corpus = corpus();
    let mut group = c.benchmark_group("ngram_insert");

    for n in [2, 3, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bench, &n| {
            bench.iter_batched(
                || NgramIndex::with_ngram_size(n).unwrap(),
                |mut index| {
                    index.insert_all(black_box(corpus.records())).unwrap();
                    index
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let corpus = corpus();
    let queries = corpus.head(QUERIES);
    let mut group = c.benchmark_group("ngram_search");

    for n in [2, 3, 4] {
        let mut index = NgramIndex::with_ngram_size(n).unwrap();
        index.insert_all(corpus.records()).unwrap();

        for threshold in [0.6, 0.7, 0.8, 0.9] {
            let id = BenchmarkId::new(format!("n{}", n), threshold);
            group.bench_with_input(id, &threshold, |bench, &threshold| {
                bench.iter(|| {
                    for query in queries {
                        black_box(index.search(black_box(query), threshold).unwrap());
                    }
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_insert, bench_search);
criterion_main!(benches);
