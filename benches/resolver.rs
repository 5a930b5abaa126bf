//! Resolver benchmarks for Axel.

use axel::{IdentityRegistry, ModuleResolver};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Build a registry where `len` names are aliased one after another.
fn alias_chain(len: usize) -> IdentityRegistry {
    let mut registry = IdentityRegistry::new();
    for i in 0..len {
        registry
            .union(&format!("m{}", i), &format!("m{}", i + 1))
            .expect("chain aliases never conflict");
    }
    registry.register(&format!("m{}", len), Some("chain.js"));
    registry
}

fn resolve_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");

    for len in [10, 1_000, 100_000] {
        let registry = alias_chain(len);
        group.bench_with_input(BenchmarkId::new("alias_chain", len), &len, |b, _| {
            b.iter(|| registry.lookup(black_box("m0")))
        });
    }

    group.finish();
}

fn alias_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("alias");

    group.bench_function("build_chain_10000", |b| {
        b.iter(|| alias_chain(black_box(10_000)))
    });

    group.finish();
}

fn load_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");

    let mut axel = ModuleResolver::new(|paths: &[String]| {
        black_box(paths);
    });
    for i in 0..1_000 {
        let name = format!("module{}", i);
        let path = format!("module{}.js", i % 100);
        axel.register(&name, path.as_str());
        axel.alias(&format!("alias{}", i), &name)
            .expect("fresh alias");
    }
    let names: Vec<String> = (0..1_000).map(|i| format!("alias{}", i)).collect();

    group.bench_function("batch_1000_dedupe_100", |b| {
        b.iter(|| axel.load(black_box(names.as_slice())).expect("registered"))
    });

    group.finish();
}

criterion_group!(benches, resolve_benchmarks, alias_benchmarks, load_benchmarks);
criterion_main!(benches);
