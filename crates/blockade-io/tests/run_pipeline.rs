use blockade_core::{Edge, Graph};
use blockade_io::{load_graph, load_seeds, save_graph, save_seeds, solve_and_simulate, RunReport};
use blockade_sim::SimConfig;
use blockade_solvers::{SolverKind, SolverParams};
use tempfile::TempDir;

fn path_graph() -> Graph {
    Graph::from_edges((1..5).map(|i| Edge::new(i - 1, i, 1.0))).unwrap()
}

#[test]
fn graph_and_seeds_survive_disk() {
    let g = Graph::new(vec![3, 1, 2], vec![Edge::new(3, 1, 0.25), Edge::new(1, 2, 0.75)]).unwrap();
    let dir = TempDir::new().unwrap();
    let graph_path = dir.path().join("g.json");
    save_graph(&g, &graph_path).unwrap();
    let loaded = load_graph(&graph_path).unwrap();
    assert_eq!(loaded.nodes(), &[3, 1, 2]);
    assert_eq!(loaded.weight(1, 2), Some(0.75));

    let seeds_path = dir.path().join("g.seeds");
    save_seeds(&[3, 1], &seeds_path).unwrap();
    assert_eq!(load_seeds(&seeds_path).unwrap(), vec![3, 1]);
}

#[test]
fn malformed_graph_is_reported() {
    let dir = TempDir::new().unwrap();
    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, r#"{"nodes":[0,1],"edges":[{"u":0,"v":1,"w":1.5}]}"#).unwrap();
    let err = load_graph(&bad).unwrap_err();
    assert!(format!("{err:#}").contains("parsing graph"));

    assert!(load_graph(dir.path().join("missing.json")).is_err());
}

#[test]
fn full_run_blocks_first_hop_and_writes_report() {
    let params = SolverParams::default();
    let report = solve_and_simulate(
        path_graph(),
        vec![0],
        1,
        SolverKind::Spectral,
        &params,
        &SimConfig::new(20, 3),
    )
    .unwrap();

    assert_eq!(report.solve.blocked_nodes, vec![1]);
    assert_eq!(report.simulation.saved_nodes.mean, 4.0);
    assert_eq!(report.manifest.graph_nodes, 5);
    assert_eq!(report.manifest.iterations, 20);

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("report.json");
    report.save_to_file(&out).unwrap();
    let back = RunReport::load_from_file(&out).unwrap();
    assert_eq!(back.solve, report.solve);
    assert_eq!(back.simulation, report.simulation);
    assert_eq!(back.manifest.run_id, report.manifest.run_id);
}

#[test]
fn invalid_budget_fails_before_solving() {
    let err = solve_and_simulate(
        path_graph(),
        vec![0],
        5,
        SolverKind::Degree,
        &SolverParams::default(),
        &SimConfig::default(),
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("invalid problem"));
}

#[test]
fn scratch_files_are_removed_with_their_directory() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().to_path_buf();
    save_graph(&path_graph(), root.join("g.json")).unwrap();
    save_seeds(&[0], root.join("g.seeds")).unwrap();
    assert!(root.join("g.json").is_file());

    dir.close().unwrap();
    assert!(!root.exists());
}
