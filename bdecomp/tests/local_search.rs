use approx::assert_relative_eq;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use rstest::rstest;

use bdecomp::construct::Constructor;
use bdecomp::local_search::{acceptance_probability, LocalSearch, Operator, Strategy};
use bdecomp::{DecompTree, Graph, WidthFunction, WidthParameter};

fn random_graph(n: usize, p: f64, rng: &mut SmallRng) -> Graph {
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

fn path4() -> Graph {
    Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3)])
}

#[rstest]
fn random_operations_predict_and_revert(
    #[values(WidthParameter::Rank, WidthParameter::MaximumMatching, WidthParameter::Boolean)]
    width: WidthParameter,
    #[values(Operator::Move, Operator::Swap)] operator: Operator,
) {
    let mut rng = SmallRng::seed_from_u64(42);
    let wf = WidthFunction::new(width);
    for n in [5, 9, 14] {
        let graph = random_graph(n, 0.35, &mut rng);
        let mut tree = Constructor::RandomBottomUp
            .construct(&graph, &wf, &mut rng)
            .unwrap();
        for _ in 0..40 {
            let before = tree.structure();
            let cost_before = tree.cost();
            let mut op = operator.random_operation(&mut tree, &mut rng).unwrap();
            let brute = op.brute_force_cost(&mut tree);
            assert_eq!(tree.structure(), before);
            let predicted = op.cost(&tree);
            assert_relative_eq!(predicted, brute, max_relative = 1e-9);
            let actual = op.execute(&mut tree);
            assert_relative_eq!(actual, predicted, max_relative = 1e-9);
            assert!(tree.is_consistent());

            op.revert(&mut tree);
            assert_eq!(tree.structure(), before);
            assert_relative_eq!(tree.cost(), cost_before, max_relative = 1e-9);

            // keep walking so later operations see varied shapes
            op.execute(&mut tree);
        }
    }
}

#[rstest]
fn path_has_width_one(
    #[values(WidthParameter::Rank, WidthParameter::Boolean)] width: WidthParameter,
    #[values(
        Constructor::RandomBottomUp,
        Constructor::RandomTopDown,
        Constructor::GreedyBottomUp,
        Constructor::GreedyLinear
    )]
    constructor: Constructor,
) {
    let graph = path4();
    let wf = WidthFunction::new(width);
    let mut rng = SmallRng::seed_from_u64(1);
    let trees: Vec<DecompTree> = (0..3)
        .map(|_| constructor.construct(&graph, &wf, &mut rng).unwrap())
        .collect();
    let mut search = LocalSearch::new(
        trees,
        vec![Operator::Move, Operator::Swap],
        Strategy::FirstImprovement,
        &mut rng,
    );
    search.set_iteration_limit(Some(1000));
    let trees = search.run(0.0).unwrap();
    assert_eq!(trees.len(), 3);
    for tree in trees {
        assert_eq!(tree.width(), 1.0);
    }
}

#[rstest]
#[case(Strategy::BestImprovement)]
#[case(Strategy::VariableNeighborhood)]
#[case(Strategy::SimulatedAnnealing)]
fn search_never_returns_worse_trees(#[case] strategy: Strategy) {
    let mut rng = SmallRng::seed_from_u64(5);
    let graph = random_graph(12, 0.4, &mut rng);
    let wf = WidthFunction::new(WidthParameter::Rank);
    let tree = Constructor::RandomTopDown
        .construct(&graph, &wf, &mut rng)
        .unwrap();
    let initial = tree.cost();
    let mut search = LocalSearch::new(vec![tree], vec![Operator::Move], strategy, &mut rng);
    search.set_iteration_limit(Some(300));
    let trees = search.run(0.0).unwrap();
    assert!(trees[0].cost() <= initial);
    assert!(trees[0].is_consistent());
    assert!(search.stats().iterations <= 300);
}

#[test]
fn acceptance_falls_with_deterioration_and_cooling() {
    let mut last = 1.0;
    for delta in [0.0, 10.0, 50.0, 100.0, 500.0] {
        let p = acceptance_probability(delta, 100.0);
        assert!(p <= last);
        last = p;
    }
    let hot = acceptance_probability(40.0, 100.0);
    let cold = acceptance_probability(40.0, 1.0);
    assert!(cold < hot);
}
