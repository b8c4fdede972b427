use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rand::{rngs::SmallRng, Rng, SeedableRng};

use bdecomp::construct::Constructor;
use bdecomp::local_search::{LocalSearch, Operator, Strategy};
use bdecomp::vertex_set::VertexSet;
use bdecomp::{Graph, WidthFunction, WidthParameter};

fn random_graph(n: usize, p: f64, seed: u64) -> Graph {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut g = Graph::new(n);
    for u in 0..n {
        for v in (u + 1)..n {
            if rng.random_bool(p) {
                g.add_edge(u, v);
            }
        }
    }
    g
}

fn widths(c: &mut Criterion) {
    let graph = random_graph(100, 0.2, 1);
    let side = VertexSet::from_indices(100, (0..100).step_by(2));
    for parameter in [
        WidthParameter::Rank,
        WidthParameter::MaximumMatching,
        WidthParameter::Boolean,
    ] {
        let right = side.complement();
        c.bench_function(&format!("{parameter} of a balanced cut"), |b| {
            b.iter(|| parameter.compute(&graph, &side, &right))
        });
    }
}

fn operations(c: &mut Criterion) {
    let graph = random_graph(60, 0.15, 2);
    let wf = WidthFunction::new(WidthParameter::Rank);
    let mut rng = SmallRng::seed_from_u64(3);
    let tree = Constructor::GreedyLinear
        .construct(&graph, &wf, &mut rng)
        .unwrap();
    for operator in [Operator::Move, Operator::Swap] {
        c.bench_function(&format!("predict random {operator}"), |b| {
            b.iter_batched_ref(
                || tree.clone(),
                |tree| {
                    let mut op = operator.random_operation(tree, &mut rng).unwrap();
                    op.cost(tree)
                },
                BatchSize::SmallInput,
            )
        });
    }
}

fn search(c: &mut Criterion) {
    let graph = random_graph(30, 0.2, 4);
    c.bench_function("100 iterations of vns", |b| {
        b.iter_batched_ref(
            || WidthFunction::new(WidthParameter::Rank),
            |wf| {
                let mut rng = SmallRng::seed_from_u64(5);
                let tree = Constructor::RandomBottomUp
                    .construct(&graph, wf, &mut rng)
                    .unwrap();
                let mut search = LocalSearch::new(
                    vec![tree],
                    vec![Operator::Move],
                    Strategy::VariableNeighborhood,
                    &mut rng,
                );
                search.set_iteration_limit(Some(100));
                search.run(0.0).unwrap()[0].width()
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, widths, operations, search);
criterion_main!(benches);
