use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use nautilus::{Algorithm, BoundingBox, BreadthfirstOptions, Edge, Graph, Node, layout};
use std::hint::black_box;
use std::time::Duration;

/// A reply-heavy conversation graph: a few talkative speakers and a long tail of minor ones.
fn build_conversation_graph(speakers: usize, replies: usize) -> Graph {
    let nodes: Vec<Node> = (0..speakers)
        .map(|i| Node::new(format!("u{i}"), 0.6, 0.6))
        .collect();

    // Deterministic LCG so runs are comparable.
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = |bound: usize| {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((state >> 33) as usize) % bound
    };

    let mut edges: Vec<Edge> = Vec::with_capacity(replies);
    for i in 0..replies {
        let talkative = speakers.min(8);
        let s = next(speakers);
        let t = if i % 3 == 0 { next(speakers) } else { next(talkative) };
        edges.push(Edge::new(format!("L{i}"), format!("u{s}"), format!("u{t}")));
    }

    Graph { nodes, edges }
}

fn bench_breadthfirst(c: &mut Criterion) {
    let mut group = c.benchmark_group("breadthfirst");
    group.measurement_time(Duration::from_secs(5));

    for &(speakers, replies) in &[(40, 400), (400, 4_000), (2_000, 40_000)] {
        let g = build_conversation_graph(speakers, replies);
        let opts = BreadthfirstOptions {
            bounding_box: Some(BoundingBox::new(0.0, 0.0, 1920.0, 1080.0)),
            ..Default::default()
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{speakers}x{replies}")),
            &g,
            |b, g| {
                b.iter(|| {
                    let out = layout(black_box(g), Algorithm::Breadthfirst(opts.clone()))
                        .expect("layout");
                    black_box(out);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_breadthfirst);
criterion_main!(benches);
