//! QAOA for weighted Max-Cut
//!
//! The hybrid loop: build a parameterized circuit specification for a graph,
//! run it on a [`Sampler`], score the measured bit-strings with the Max-Cut
//! cost, and let a derivative-free [`Minimizer`] tune the angles. The final
//! distribution is ranked by empirical probability.
//!
//! ```
//! use qaoa_core::{solve, top_k, WeightedGraph};
//! use qaoa_core::sampler::FixedSampler;
//!
//! let graph = WeightedGraph::path(3);
//! let mut sampler = FixedSampler::new([("010", 1000)]);
//!
//! let ranking = solve(&graph, 1, 10, &mut sampler).unwrap();
//! let best = &top_k(&graph, &ranking, 1).unwrap()[0];
//! assert_eq!(best.bitstring.to_string(), "010");
//! assert_eq!(best.cut_weight, 2.0);
//! ```

pub mod bitstring;
pub mod circuit; // Circuit specification and parameter layout
pub mod config;
pub mod cost; // Classical Max-Cut cost
pub mod distribution;
pub mod error;
pub mod generate; // Erdős–Rényi and edge-list graph sources
pub mod graph;
pub mod objective;
pub mod optimizer; // Nelder–Mead and SPSA
pub mod ranking;
pub mod sampler; // Sampler boundary, test doubles, reference simulator
pub mod solver;

/// Shots for the final distribution unless configured otherwise
pub const DEFAULT_EVALUATION_SHOTS: u64 = 1000;

pub use bitstring::BitString;
pub use circuit::{n_params, split_params, CircuitSpec, Gate, Layer};
pub use config::SolverConfig;
pub use distribution::Distribution;
pub use error::{QaoaError, Result};
pub use generate::{parse_edge_list, EdgeSpec, GraphGenerator, DEFAULT_MAX_WEIGHT};
pub use graph::{Edge, WeightedGraph, MAX_EXACT_NODES};
pub use objective::QaoaObjective;
pub use optimizer::{
    Minimizer, NelderMead, OptimizationResult, Optimizer, OptimizerKind, Spsa, Termination,
};
pub use ranking::{top_k, RankedCut, RankedSolution, SolutionRanking};
pub use sampler::{sample_canonical, BitOrder, RawCounts, RetryingSampler, Sampler, StateVectorSampler};
pub use solver::{solve, ExactOptimum, MaxCutSolver, SolveReport};
