//! QAOA objective function
//!
//! Composes circuit construction, the sampler and the cost model into the
//! scalar function the optimizer minimizes:
//!
//! ```text
//! f(γ, β) = Σ_b (count[b] / shots) · C(b)
//! ```
//!
//! where `C` is [`crate::cost::evaluate`]. Because `C(b) = -2·cut(b)`,
//! minimizing `f` maximizes the expected cut.
//!
//! # Example
//!
//! ```
//! use qaoa_core::graph::WeightedGraph;
//! use qaoa_core::objective::QaoaObjective;
//! use qaoa_core::sampler::UniformSampler;
//!
//! let graph = WeightedGraph::path(2);
//! let mut objective = QaoaObjective::new(&graph, UniformSampler, 1, 400).unwrap();
//!
//! // Uniform outcomes: half the shots cut the single edge
//! assert_eq!(objective.evaluate(&[0.1, 0.2]).unwrap(), -1.0);
//! ```

use tracing::debug;

use crate::circuit::CircuitSpec;
use crate::cost;
use crate::distribution::Distribution;
use crate::error::{QaoaError, Result};
use crate::graph::WeightedGraph;
use crate::sampler::{sample_canonical, Sampler};

/// Objective for a fixed graph, depth and shot count
#[derive(Debug)]
pub struct QaoaObjective<'g, S> {
    graph: &'g WeightedGraph,
    sampler: S,
    depth: usize,
    shots: u64,
    evaluations: usize,
}

impl<'g, S: Sampler> QaoaObjective<'g, S> {
    /// Create objective; `shots` must be positive
    pub fn new(graph: &'g WeightedGraph, sampler: S, depth: usize, shots: u64) -> Result<Self> {
        if shots == 0 {
            return Err(QaoaError::ZeroShots);
        }
        Ok(Self {
            graph,
            sampler,
            depth,
            shots,
            evaluations: 0,
        })
    }

    /// Circuit depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Shots per evaluation
    pub fn shots(&self) -> u64 {
        self.shots
    }

    /// Number of evaluations so far
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Sample the circuit at `params` with an explicit shot count
    pub fn distribution(&mut self, params: &[f64], shots: u64) -> Result<Distribution> {
        let circuit = CircuitSpec::build(self.graph, self.depth, params)?;
        sample_canonical(&mut self.sampler, &circuit, shots)
    }

    /// Expected cost at `params`
    pub fn evaluate(&mut self, params: &[f64]) -> Result<f64> {
        let distribution = self.distribution(params, self.shots)?;
        let value = cost::expectation(self.graph, &distribution)?;
        self.evaluations += 1;

        debug!(
            evaluation = self.evaluations,
            ?params,
            value,
            outcomes = distribution.len(),
            "objective evaluated"
        );

        Ok(value)
    }
}

/// Objective as a closure over `params`, borrowing graph and sampler
pub fn build<'a, S: Sampler>(
    graph: &'a WeightedGraph,
    sampler: &'a mut S,
    depth: usize,
    shots: u64,
) -> Result<impl FnMut(&[f64]) -> Result<f64> + 'a> {
    let mut objective = QaoaObjective::new(graph, sampler, depth, shots)?;
    Ok(move |params: &[f64]| objective.evaluate(params))
}
