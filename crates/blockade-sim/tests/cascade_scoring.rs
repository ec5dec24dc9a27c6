use approx::assert_relative_eq;
use blockade_core::{Edge, Graph};
use blockade_sim::{SimConfig, Simulator, Stats};

fn certain_path() -> Graph {
    Graph::from_edges((1..5).map(|i| Edge::new(i - 1, i, 1.0))).unwrap()
}

/// Seed 0 feeds hub 1 with leaves 2..=4; seed 5 feeds hub 6 with leaves 7, 8.
fn two_stars() -> Graph {
    Graph::from_edges(vec![
        Edge::new(0, 1, 1.0),
        Edge::new(1, 2, 1.0),
        Edge::new(1, 3, 1.0),
        Edge::new(1, 4, 1.0),
        Edge::new(5, 6, 1.0),
        Edge::new(6, 7, 1.0),
        Edge::new(6, 8, 1.0),
    ])
    .unwrap()
}

#[test]
fn blocking_first_hop_of_certain_path_saves_everything_behind_it() {
    let g = certain_path();
    let mut sim = Simulator::new(&g, vec![0]);
    sim.add_blocked("first-hop", vec![1]);
    sim.add_blocked("tail", vec![4]);
    sim.add_blocked("nothing", vec![]);

    let report = sim.run(&SimConfig::new(50, 11)).unwrap();

    // nodes 2, 3, 4 downstream plus the blocked node itself
    let first = &report.candidates["first-hop"];
    assert_eq!(first.saved_nodes, Stats { mean: 4.0, var: 0.0 });
    assert_eq!(first.activated_nodes, Stats { mean: 1.0, var: 0.0 });
    assert_relative_eq!(first.fraction_saved.mean, 0.8, epsilon = 1e-12);

    assert_eq!(report.candidates["tail"].saved_nodes.mean, 1.0);
    assert_eq!(report.candidates["nothing"].saved_nodes, Stats { mean: 0.0, var: 0.0 });
    assert_eq!(report.rounds_until_termination, Stats { mean: 5.0, var: 0.0 });
}

#[test]
fn blocking_one_hub_leaves_the_other_star_untouched() {
    let g = two_stars();
    let mut sim = Simulator::new(&g, vec![0, 5]);
    sim.add_blocked("big", vec![1]);
    sim.add_blocked("small", vec![6]);

    let report = sim.run(&SimConfig::new(20, 3)).unwrap();
    assert_eq!(report.active_nodes.mean, 9.0);
    // hub plus its leaves
    assert_eq!(report.candidates["big"].saved_nodes.mean, 4.0);
    assert_eq!(report.candidates["small"].saved_nodes.mean, 3.0);
}

#[test]
fn single_realization_has_zero_variance() {
    let g = Graph::from_edges((1..6).map(|i| Edge::new(0, i, 0.5))).unwrap();
    let mut sim = Simulator::new(&g, vec![0]);
    sim.add_blocked("leaf", vec![1]);
    let report = sim.run(&SimConfig::new(1, 5)).unwrap();
    assert_eq!(report.iterations, 1);
    assert_eq!(report.active_nodes.var, 0.0);
    assert_eq!(report.candidates["leaf"].saved_nodes.var, 0.0);
}

#[test]
fn star_mean_matches_expected_spread() {
    // seed 0 with 10 leaves at p = 0.5: E[active] = 1 + 10 * 0.5
    let g = Graph::from_edges((1..=10).map(|i| Edge::new(0, i, 0.5))).unwrap();
    let n = 4000;
    let report = Simulator::new(&g, vec![0]).run(&SimConfig::new(n, 42)).unwrap();

    let expected_var = 10.0 * 0.25;
    let stderr = (expected_var / n as f64).sqrt();
    assert!(
        (report.active_nodes.mean - 6.0).abs() < 4.0 * stderr,
        "mean {} too far from 6",
        report.active_nodes.mean
    );
    assert!((report.active_nodes.var - expected_var).abs() / expected_var < 0.1);
}

#[test]
fn parallel_and_sequential_runs_agree() {
    let g = Graph::from_edges(vec![
        Edge::new(0, 1, 0.5),
        Edge::new(1, 2, 0.5),
        Edge::new(0, 3, 0.3),
        Edge::new(3, 2, 0.8),
        Edge::new(2, 4, 0.6),
    ])
    .unwrap();
    let mut sim = Simulator::new(&g, vec![0]);
    sim.add_blocked("two", vec![2]);

    let config = SimConfig::new(300, 99);
    let mut parallel = sim.run(&config).unwrap();
    let mut sequential = sim.run(&config.clone().sequential()).unwrap();
    parallel.elapsed_secs = 0.0;
    sequential.elapsed_secs = 0.0;
    assert_eq!(parallel, sequential);

    let mut other_seed = sim.run(&SimConfig::new(300, 100)).unwrap();
    other_seed.elapsed_secs = 0.0;
    assert_ne!(parallel, other_seed);
}
