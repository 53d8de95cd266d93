//! End-to-end solve runs against mocked and simulated samplers

use approx::assert_abs_diff_eq;
use qaoa_core::cost;
use qaoa_core::objective::QaoaObjective;
use qaoa_core::sampler::{FailingSampler, FixedSampler, UniformSampler};
use qaoa_core::{
    solve, top_k, MaxCutSolver, OptimizerKind, SolverConfig, StateVectorSampler, WeightedGraph,
};

#[test]
fn test_path_graph_fixed_sampler() {
    let graph = WeightedGraph::path(3);
    let mut sampler = FixedSampler::new([("010", 1000)]);

    let ranking = solve(&graph, 1, 20, &mut sampler).unwrap();

    let entries: Vec<(String, f64)> = ranking
        .iter()
        .map(|(b, p)| (b.to_string(), p))
        .collect();
    assert_eq!(entries, vec![("010".to_string(), 1.0)]);

    let top = top_k(&graph, &ranking, 3).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].cut_weight, 2.0);
}

#[test]
fn test_sampler_failure_aborts_solve() {
    let graph = WeightedGraph::triangle();
    let mut sampler = FailingSampler::fatal();

    let err = solve(&graph, 2, 50, &mut sampler).unwrap_err();
    assert!(err.is_sampler_error());
    assert!(!err.is_retryable());
}

#[test]
fn test_transient_failure_retried_once() {
    let graph = WeightedGraph::path(3);
    let mut sampler = FailingSampler::transient(1, FixedSampler::new([("101", 1)]));
    let config = SolverConfig::new(1, 3).with_retries(1, 0);

    let report = MaxCutSolver::new(&graph, config)
        .unwrap()
        .solve(&mut sampler)
        .unwrap();
    assert_eq!(report.ranking.best().unwrap().bitstring.to_string(), "101");
}

#[test]
fn test_transient_failure_without_retries_aborts() {
    let graph = WeightedGraph::path(3);
    let mut sampler = FailingSampler::transient(1, FixedSampler::new([("101", 1)]));
    let config = SolverConfig::new(1, 3).with_retries(0, 0);

    let err = MaxCutSolver::new(&graph, config)
        .unwrap()
        .solve(&mut sampler)
        .unwrap_err();
    assert!(err.is_retryable());
}

#[test]
fn test_depth_zero_uniform() {
    let graph = WeightedGraph::cycle(4);
    let config = SolverConfig::new(0, 10)
        .with_training_shots(1600)
        .with_evaluation_shots(1600);

    let report = MaxCutSolver::new(&graph, config)
        .unwrap()
        .solve(&mut UniformSampler)
        .unwrap();

    assert!(report.optimal_params.is_empty());
    assert_eq!(report.ranking.len(), 16);
    // Mean cost over all 16 assignments of C4 is -4
    assert_abs_diff_eq!(report.best_objective, -4.0, epsilon = 1e-12);
    for (_, p) in report.ranking.iter() {
        assert_abs_diff_eq!(p, 1.0 / 16.0, epsilon = 1e-12);
    }
}

#[test]
fn test_statevector_beats_random_guessing() {
    let graph = WeightedGraph::cycle(4);
    let config = SolverConfig::new(1, 60)
        .with_initial_value(0.5)
        .with_training_shots(2000)
        .with_evaluation_shots(4000);
    let mut sampler = StateVectorSampler::new(17);

    let report = MaxCutSolver::new(&graph, config)
        .unwrap()
        .solve(&mut sampler)
        .unwrap();

    // Uniform guessing gives -4 on C4
    assert!(report.best_objective < -4.0);
    assert!(cost::expectation(&graph, &report.distribution).unwrap() < -4.0);

    let total: f64 = report.ranking.iter().map(|(_, p)| p).sum();
    assert_abs_diff_eq!(total, 1.0, epsilon = 1e-9);

    let optimum = report.optimum.as_ref().unwrap();
    assert_eq!(optimum.cut_weight, 4.0);
    let ratio = report.approximation_ratio.unwrap();
    assert!((0.0..=1.0).contains(&ratio));
}

#[test]
fn test_spsa_solve_is_reproducible() {
    let graph = WeightedGraph::triangle();
    let config = SolverConfig::new(1, 15)
        .with_optimizer(OptimizerKind::Spsa)
        .with_seed(3)
        .with_training_shots(300);

    let run = || {
        MaxCutSolver::new(&graph, config.clone())
            .unwrap()
            .solve(&mut StateVectorSampler::new(5))
            .unwrap()
    };
    let a = run();
    let b = run();

    assert_eq!(a.optimal_params, b.optimal_params);
    assert_eq!(a.distribution, b.distribution);
    assert_eq!(a.termination, b.termination);
    assert!(a.iterations <= 15);
}

#[test]
fn test_spsa_solve_never_worse_than_start() {
    let graph = WeightedGraph::triangle();
    let config = SolverConfig::new(1, 12)
        .with_optimizer(OptimizerKind::Spsa)
        .with_initial_value(0.4)
        .with_training_shots(500);

    // The first training evaluation sees the same sampler state
    let mut start = QaoaObjective::new(&graph, StateVectorSampler::new(8), 1, 500).unwrap();
    let f0 = start.evaluate(&config.initial_params()).unwrap();

    let report = MaxCutSolver::new(&graph, config)
        .unwrap()
        .solve(&mut StateVectorSampler::new(8))
        .unwrap();

    assert_eq!(report.history[0], f0);
    assert!(report.best_objective <= f0);
    let lowest = report.history.iter().cloned().fold(f64::INFINITY, f64::min);
    assert_eq!(report.best_objective, lowest);
    assert_eq!(*report.history.last().unwrap(), report.best_objective);
}

#[test]
fn test_report_serializes() {
    let graph = WeightedGraph::path(3);
    let mut sampler = FixedSampler::new([("010", 1), ("101", 1)]);
    let report = MaxCutSolver::new(&graph, SolverConfig::new(1, 2))
        .unwrap()
        .solve(&mut sampler)
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["ranking"][0]["bitstring"], "010");
    assert_eq!(json["ranking"][0]["probability"], 0.5);
    assert_eq!(json["optimum"]["cut_weight"], 2.0);
}
