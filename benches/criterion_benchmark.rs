use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dsi_progress_logger::no_logging;
use graph_kernels::distances::hyperball::HyperBallBuilder;
use graph_kernels::sccs;
use graph_kernels::utils::{Counter, HyperLogLogCounterArrayBuilder};
use graph_kernels::visits::bfv::{SeqBreadthFirstVisit, SeqVisit};
use webgraph::graphs::vec_graph::VecGraph;
use webgraph::traits::RandomAccessGraph;

fn directed_cycle(n: usize) -> VecGraph {
    let mut arcs = Vec::with_capacity(n);
    for i in 0..n {
        arcs.push((i, (i + 1) % n));
    }
    VecGraph::from_arcs(arcs)
}

fn bidirectional_cycle(n: usize) -> VecGraph {
    let mut arcs = Vec::with_capacity(2 * n);
    for i in 0..n {
        arcs.push((i, (i + 1) % n));
        arcs.push(((i + 1) % n, i));
    }
    VecGraph::from_arcs(arcs)
}

fn bench_sequential_bfv(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_bfv");
    for size in [100, 1_000, 10_000] {
        let graph = bidirectional_cycle(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &graph, |b, graph| {
            let mut visit = SeqBreadthFirstVisit::new(graph);
            b.iter(|| {
                visit.visit_from_node(0, |args| black_box(args.distance), |_| true, &mut no_logging![]);
                visit.reset();
            });
        });
    }
    group.finish();
}

fn bench_tarjan_scc(c: &mut Criterion) {
    let mut group = c.benchmark_group("tarjan_scc");
    for size in [100, 1_000, 10_000] {
        let graph = directed_cycle(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &graph, |b, graph| {
            b.iter(|| black_box(sccs::tarjan(graph, &mut no_logging![])));
        });
    }
    group.finish();
}

fn bench_hyperball_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("hyperball_iteration");
    for size in [100, 1_000, 10_000] {
        let graph = bidirectional_cycle(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &graph, |b, graph| {
            b.iter(|| {
                let mut hyperball = HyperBallBuilder::new(graph).log_2_num_registers(8).build().unwrap();
                black_box(hyperball.run(1, 0.0, &mut no_logging![]).unwrap());
            });
        });
    }
    group.finish();
}

fn bench_hyperloglog_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("hyperloglog_merge");
    for log2m in [4, 8, 12] {
        group.bench_with_input(BenchmarkId::from_parameter(log2m), &log2m, |b, &log2m| {
            let counters = HyperLogLogCounterArrayBuilder::new()
                .log_2_num_registers(log2m)
                .num_elements_upper_bound(1_000)
                .build::<usize>(2)
                .unwrap();
            for i in 0..1_000 {
                counters.get_counter(0).add(i);
                counters.get_counter(1).add(i + 500);
            }
            b.iter(|| unsafe {
                black_box(counters.get_counter(0).merge_unsafe(&counters.get_counter(1)));
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_sequential_bfv,
    bench_tarjan_scc,
    bench_hyperball_iteration,
    bench_hyperloglog_merge
);
criterion_main!(benches);
