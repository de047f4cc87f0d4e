//! Benchmarks for reference collection and ordering.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use deployflow::config::ResolverConfig;
use deployflow::diagnostics::NoOpDiagnosticSink;
use deployflow::resolver::DependencyResolver;
use deployflow::testing::PipelineChain;
use std::sync::Arc;

fn resolve_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");

    for size in [10usize, 100, 1000] {
        let chain = PipelineChain::new("chain").linear(size);
        group.bench_with_input(BenchmarkId::new("linear", size), &chain, |b, batch| {
            b.iter(|| {
                let mut resolver =
                    DependencyResolver::with_sink(ResolverConfig::default(), Arc::new(NoOpDiagnosticSink));
                black_box(resolver.resolve(batch).ok())
            });
        });

        let fan = PipelineChain::new("fan").fan_out(size);
        group.bench_with_input(BenchmarkId::new("fan_out", size), &fan, |b, batch| {
            b.iter(|| {
                let mut resolver =
                    DependencyResolver::with_sink(ResolverConfig::default(), Arc::new(NoOpDiagnosticSink));
                black_box(resolver.resolve(batch).ok())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, resolve_benchmark);
criterion_main!(benches);
