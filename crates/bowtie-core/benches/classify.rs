use bowtie_core::analyze::decompose;
use bowtie_core::classify::ClassifyOptions;
use bowtie_core::graph::{LinkGraph, LinkGraphBuilder};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

struct Tier {
    name: &'static str,
    nodes: usize,
    avg_out_degree: usize,
}

const TIERS: [Tier; 3] = [
    Tier {
        name: "1k",
        nodes: 1_000,
        avg_out_degree: 2,
    },
    Tier {
        name: "10k",
        nodes: 10_000,
        avg_out_degree: 2,
    },
    Tier {
        name: "50k",
        nodes: 50_000,
        avg_out_degree: 1,
    },
];

/// Sparse random crawl-like graph: a dense core plus a long tail of
/// weakly attached pages.
fn synthetic_crawl(tier: &Tier, seed: u64) -> LinkGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut b = LinkGraphBuilder::new();
    let core = (tier.nodes / 10).max(2);
    for i in 0..tier.nodes {
        b.add_node(&format!("p{i}"));
    }
    for i in 0..tier.nodes {
        for _ in 0..tier.avg_out_degree {
            let target = if i < core || rng.gen_bool(0.3) {
                rng.gen_range(0..core)
            } else {
                rng.gen_range(0..tier.nodes)
            };
            b.add_edge(&format!("p{i}"), &format!("p{target}"));
        }
    }
    b.build()
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify.tiered");
    group.sample_size(10);

    for tier in &TIERS {
        let graph = synthetic_crawl(tier, 0xB0_71E5 + tier.nodes as u64);
        group.throughput(Throughput::Elements(graph.node_count() as u64));

        group.bench_with_input(
            BenchmarkId::new("sequential", tier.name),
            &graph,
            |b, g| b.iter(|| black_box(decompose(g, &ClassifyOptions::default()))),
        );

        let parallel = ClassifyOptions {
            parallel: true,
            ..ClassifyOptions::default()
        };
        group.bench_with_input(BenchmarkId::new("parallel", tier.name), &graph, |b, g| {
            b.iter(|| black_box(decompose(g, &parallel)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_classify);
criterion_main!(benches);
