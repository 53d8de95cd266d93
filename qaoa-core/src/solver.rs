//! QAOA Max-Cut solver
//!
//! Drives the hybrid loop end to end:
//!
//! ```text
//! initial params ──► Minimizer ◄──► QaoaObjective(training_shots) ◄──► Sampler
//!                        │
//!                        ▼ best params
//!                 re-sample (evaluation_shots) ──► Distribution ──► SolutionRanking
//! ```
//!
//! Sampler errors abort the solve. An exhausted iteration budget does not;
//! the best parameters found are used and the report says so.

use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::bitstring::BitString;
use crate::config::SolverConfig;
use crate::cost;
use crate::distribution::Distribution;
use crate::error::Result;
use crate::graph::{WeightedGraph, MAX_EXACT_NODES};
use crate::objective::QaoaObjective;
use crate::optimizer::{Minimizer, Optimizer, Termination};
use crate::ranking::{top_k, RankedCut, SolutionRanking};
use crate::sampler::{RetryingSampler, Sampler};

/// Outcome of a solve run
#[derive(Debug, Clone, Serialize)]
pub struct SolveReport {
    /// Final ranking at the optimized parameters
    pub ranking: SolutionRanking,
    /// Optimized `[γ.., β..]`
    pub optimal_params: Vec<f64>,
    /// Objective at `optimal_params` during training
    pub best_objective: f64,
    /// Optimizer iterations
    pub iterations: usize,
    /// Objective evaluations during training
    pub evaluations: usize,
    pub termination: Termination,
    /// Best objective per iteration
    pub history: Vec<f64>,
    /// Final evaluation distribution
    pub distribution: Distribution,
    /// Exact optimum, when enabled and the graph is small enough
    pub optimum: Option<ExactOptimum>,
    /// Cut weight of the top candidate over the exact optimum
    pub approximation_ratio: Option<f64>,
}

/// Brute-force Max-Cut reference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExactOptimum {
    pub bitstring: BitString,
    pub cut_weight: f64,
}

impl SolveReport {
    /// Leading `k` cuts with weights
    pub fn top_k(&self, graph: &WeightedGraph, k: usize) -> Result<Vec<RankedCut>> {
        top_k(graph, &self.ranking, k)
    }
}

/// Configured solver for one graph
#[derive(Debug, Clone)]
pub struct MaxCutSolver<'g> {
    graph: &'g WeightedGraph,
    config: SolverConfig,
}

impl<'g> MaxCutSolver<'g> {
    /// Create solver; the config is validated here
    pub fn new(graph: &'g WeightedGraph, config: SolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { graph, config })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Run optimization and final sampling
    pub fn solve<S: Sampler>(&self, sampler: &mut S) -> Result<SolveReport> {
        let config = &self.config;
        let graph = self.graph;

        info!(
            n_nodes = graph.n_nodes(),
            n_edges = graph.n_edges(),
            depth = config.depth,
            max_iterations = config.max_iterations,
            optimizer = %config.optimizer,
            sampler = sampler.name(),
            "starting QAOA solve"
        );

        let retrying = RetryingSampler::new(sampler)
            .with_max_retries(config.sampler_retries)
            .with_backoff(Duration::from_millis(config.retry_backoff_ms));

        let mut objective = QaoaObjective::new(graph, retrying, config.depth, config.training_shots)?;
        let optimizer = Optimizer::from_kind(
            config.optimizer,
            config.max_iterations,
            config.tolerance,
            config.seed,
        );

        let result = optimizer.minimize(|p| objective.evaluate(p), &config.initial_params())?;
        if result.termination == Termination::MaxIterations {
            warn!(
                iterations = result.iterations,
                objective = result.objective,
                "optimizer budget exhausted, using best parameters found"
            );
        }

        let distribution = objective.distribution(&result.params, config.evaluation_shots)?;
        let ranking = SolutionRanking::from_distribution(&distribution);

        let (optimum, approximation_ratio) = self.compare_with_exact(&ranking)?;

        info!(
            iterations = result.iterations,
            evaluations = result.func_evals,
            best_objective = result.objective,
            top = ?ranking.best().map(|e| e.bitstring.to_string()),
            ?approximation_ratio,
            "QAOA solve finished"
        );

        Ok(SolveReport {
            ranking,
            optimal_params: result.params,
            best_objective: result.objective,
            iterations: result.iterations,
            evaluations: result.func_evals,
            termination: result.termination,
            history: result.history,
            distribution,
            optimum,
            approximation_ratio,
        })
    }

    fn compare_with_exact(&self, ranking: &SolutionRanking) -> Result<(Option<ExactOptimum>, Option<f64>)> {
        if !self.config.compare_exact || self.graph.n_nodes() > MAX_EXACT_NODES {
            return Ok((None, None));
        }

        let (bitstring, cut_weight) = self.graph.max_cut_brute_force()?;
        let ratio = match ranking.best() {
            Some(top) if cut_weight > 0.0 => {
                Some(cost::cut_weight(self.graph, &top.bitstring)? / cut_weight)
            }
            Some(_) => Some(1.0),
            None => None,
        };

        Ok((Some(ExactOptimum { bitstring, cut_weight }), ratio))
    }
}

/// Optimize with default settings and return the final ranking
pub fn solve<S: Sampler>(
    graph: &WeightedGraph,
    depth: usize,
    max_iterations: usize,
    sampler: &mut S,
) -> Result<SolutionRanking> {
    let config = SolverConfig::new(depth, max_iterations).with_compare_exact(false);
    Ok(MaxCutSolver::new(graph, config)?.solve(sampler)?.ranking)
}
