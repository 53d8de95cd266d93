//! Derivative-free minimizers for the QAOA parameter loop
//!
//! | Optimizer | Evaluations / iteration | Best For |
//! |-----------|-------------------------|----------|
//! | Nelder–Mead | 1–2 (n+1 on shrink) | Few parameters, default |
//! | SPSA | 3 | Noisy, higher-dimensional objectives |
//!
//! Both take an objective `FnMut(&[f64]) -> Result<f64>`. An objective
//! error aborts the run and propagates; running out of iterations does not,
//! it is reported as [`Termination::MaxIterations`] with the best point
//! found so far.

use std::fmt;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{QaoaError, Result};

// =============================================================================
// Constants
// =============================================================================

/// Default convergence tolerance
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// Default max iterations
pub const DEFAULT_MAX_ITER: usize = 100;

/// Default SPSA learning-rate coefficient
pub const DEFAULT_SPSA_A: f64 = 0.1;

/// Default SPSA perturbation
pub const DEFAULT_SPSA_C: f64 = 0.1;

/// Default SPSA alpha
pub const DEFAULT_SPSA_ALPHA: f64 = 0.602;

/// Default SPSA gamma
pub const DEFAULT_SPSA_GAMMA: f64 = 0.101;

/// Consecutive small SPSA steps needed to declare convergence
const SPSA_CONVERGENCE_WINDOW: usize = 3;

// =============================================================================
// Result Types
// =============================================================================

/// Why a minimization stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Tolerance reached
    Converged,
    /// Iteration budget used up
    MaxIterations,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Converged => write!(f, "converged"),
            Termination::MaxIterations => write!(f, "iteration budget exhausted"),
        }
    }
}

/// Optimization result
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    /// Best parameters
    pub params: Vec<f64>,
    /// Objective value at `params`
    pub objective: f64,
    /// Number of iterations
    pub iterations: usize,
    /// Number of function evaluations
    pub func_evals: usize,
    /// Stop reason
    pub termination: Termination,
    /// Best objective value after each iteration, starting point first
    pub history: Vec<f64>,
}

impl OptimizationResult {
    /// Whether the tolerance was reached
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }
}

// =============================================================================
// Minimizer Trait
// =============================================================================

/// Derivative-free minimizer
pub trait Minimizer {
    /// Algorithm name for logs
    fn name(&self) -> &'static str;

    /// Minimize `objective` starting from `initial`
    fn minimize<F>(&self, objective: F, initial: &[f64]) -> Result<OptimizationResult>
    where
        F: FnMut(&[f64]) -> Result<f64>;
}

/// Objective wrapper counting evaluations
struct Counted<F> {
    f: F,
    evals: usize,
}

impl<F: FnMut(&[f64]) -> Result<f64>> Counted<F> {
    fn new(f: F) -> Self {
        Self { f, evals: 0 }
    }

    fn call(&mut self, x: &[f64]) -> Result<f64> {
        self.evals += 1;
        (self.f)(x)
    }
}

// =============================================================================
// Nelder–Mead
// =============================================================================

/// Nelder–Mead simplex minimizer
#[derive(Debug, Clone)]
pub struct NelderMead {
    /// Maximum number of iterations
    pub max_iterations: usize,
    /// Convergence tolerance on simplex size
    pub tolerance: f64,
    /// Reflection coefficient
    pub alpha: f64,
    /// Expansion coefficient
    pub gamma: f64,
    /// Contraction coefficient
    pub rho: f64,
    /// Shrink coefficient
    pub sigma: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITER,
            tolerance: DEFAULT_TOLERANCE,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
        }
    }
}

impl NelderMead {
    /// Create with iteration budget and tolerance
    pub fn new(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            max_iterations,
            tolerance,
            ..Self::default()
        }
    }

    /// Initial simplex: `x0` plus one vertex per coordinate, nudged by 5%
    /// (or 0.05 where the coordinate is zero)
    fn initial_simplex(&self, x0: &[f64]) -> Vec<Vec<f64>> {
        let mut simplex = Vec::with_capacity(x0.len() + 1);
        simplex.push(x0.to_vec());
        for i in 0..x0.len() {
            let mut vertex = x0.to_vec();
            vertex[i] = if x0[i] != 0.0 { x0[i] * 1.05 } else { 0.05 };
            simplex.push(vertex);
        }
        simplex
    }

    fn centroid(simplex: &[Vec<f64>], indices: &[usize]) -> Vec<f64> {
        let n = simplex[0].len();
        let mut c = vec![0.0; n];
        for &idx in indices {
            for (ci, xi) in c.iter_mut().zip(&simplex[idx]) {
                *ci += xi;
            }
        }
        let k = indices.len() as f64;
        c.iter_mut().for_each(|ci| *ci /= k);
        c
    }

    /// Point `c + t·(x - c)`
    fn along(c: &[f64], x: &[f64], t: f64) -> Vec<f64> {
        c.iter().zip(x).map(|(&ci, &xi)| ci + t * (xi - ci)).collect()
    }

    /// Largest vertex distance from the best vertex
    fn size(simplex: &[Vec<f64>], best: usize) -> f64 {
        simplex
            .iter()
            .map(|v| {
                v.iter()
                    .zip(&simplex[best])
                    .map(|(a, b)| (a - b).powi(2))
                    .sum::<f64>()
                    .sqrt()
            })
            .fold(0.0, f64::max)
    }
}

impl Minimizer for NelderMead {
    fn name(&self) -> &'static str {
        "nelder-mead"
    }

    fn minimize<F>(&self, objective: F, initial: &[f64]) -> Result<OptimizationResult>
    where
        F: FnMut(&[f64]) -> Result<f64>,
    {
        let mut f = Counted::new(objective);
        let n = initial.len();

        // Nothing to optimize
        if n == 0 {
            let value = f.call(initial)?;
            return Ok(OptimizationResult {
                params: Vec::new(),
                objective: value,
                iterations: 0,
                func_evals: f.evals,
                termination: Termination::Converged,
                history: vec![value],
            });
        }

        let mut simplex = self.initial_simplex(initial);
        let mut values = Vec::with_capacity(n + 1);
        for vertex in &simplex {
            values.push(f.call(vertex)?);
        }

        let mut history = Vec::with_capacity(self.max_iterations + 1);
        let mut iteration = 0;

        let termination = loop {
            let mut order: Vec<usize> = (0..=n).collect();
            order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

            let best = order[0];
            let worst = order[n];
            let second_worst = order[n - 1];
            history.push(values[best]);

            if Self::size(&simplex, best) < self.tolerance {
                break Termination::Converged;
            }
            if iteration >= self.max_iterations {
                break Termination::MaxIterations;
            }
            iteration += 1;

            let centroid = Self::centroid(&simplex, &order[..n]);

            let reflected = Self::along(&centroid, &simplex[worst], -self.alpha);
            let f_reflected = f.call(&reflected)?;

            if f_reflected < values[best] {
                let expanded = Self::along(&centroid, &reflected, self.gamma);
                let f_expanded = f.call(&expanded)?;
                if f_expanded < f_reflected {
                    simplex[worst] = expanded;
                    values[worst] = f_expanded;
                } else {
                    simplex[worst] = reflected;
                    values[worst] = f_reflected;
                }
            } else if f_reflected < values[second_worst] {
                simplex[worst] = reflected;
                values[worst] = f_reflected;
            } else {
                let contracted = if f_reflected < values[worst] {
                    Self::along(&centroid, &reflected, self.rho)
                } else {
                    Self::along(&centroid, &simplex[worst], self.rho)
                };
                let f_contracted = f.call(&contracted)?;

                if f_contracted < values[worst].min(f_reflected) {
                    simplex[worst] = contracted;
                    values[worst] = f_contracted;
                } else {
                    // Shrink toward best
                    let anchor = simplex[best].clone();
                    for i in 0..=n {
                        if i != best {
                            simplex[i] = Self::along(&anchor, &simplex[i], self.sigma);
                            values[i] = f.call(&simplex[i])?;
                        }
                    }
                }
            }

            trace!(iteration, best = values[best], "nelder-mead step");
        };

        let best = (0..=n)
            .min_by(|&a, &b| values[a].total_cmp(&values[b]))
            .unwrap_or(0);

        debug!(
            iterations = iteration,
            func_evals = f.evals,
            objective = values[best],
            %termination,
            "nelder-mead finished"
        );

        Ok(OptimizationResult {
            params: simplex.swap_remove(best),
            objective: values[best],
            iterations: iteration,
            func_evals: f.evals,
            termination,
            history,
        })
    }
}

// =============================================================================
// SPSA
// =============================================================================

/// Simultaneous perturbation stochastic approximation
///
/// Gains follow `a_k = a / (k + 1)^alpha` and `c_k = c / (k + 1)^gamma`.
/// Perturbation directions are Bernoulli ±1 from a seeded ChaCha RNG.
///
/// Every iterate is evaluated and the best one seen is returned, so a run
/// whose gains overshoot never ends worse than its starting point.
/// Convergence needs several consecutive small steps with a non-zero
/// gradient estimate.
#[derive(Debug, Clone)]
pub struct Spsa {
    /// Maximum number of iterations
    pub max_iterations: usize,
    /// Steps shorter than this count toward convergence
    pub tolerance: f64,
    /// Learning rate coefficient
    pub a: f64,
    /// Perturbation coefficient
    pub c: f64,
    /// Alpha exponent
    pub alpha: f64,
    /// Gamma exponent
    pub gamma: f64,
    /// Seed for perturbation directions
    pub seed: u64,
}

impl Default for Spsa {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITER,
            tolerance: DEFAULT_TOLERANCE,
            a: DEFAULT_SPSA_A,
            c: DEFAULT_SPSA_C,
            alpha: DEFAULT_SPSA_ALPHA,
            gamma: DEFAULT_SPSA_GAMMA,
            seed: 0,
        }
    }
}

impl Spsa {
    /// Create with iteration budget, tolerance and seed
    pub fn new(max_iterations: usize, tolerance: f64, seed: u64) -> Self {
        Self {
            max_iterations,
            tolerance,
            seed,
            ..Self::default()
        }
    }

    /// Learning rate at iteration `k`
    fn learning_rate(&self, k: usize) -> f64 {
        self.a / ((k + 1) as f64).powf(self.alpha)
    }

    /// Perturbation size at iteration `k`
    fn perturbation(&self, k: usize) -> f64 {
        self.c / ((k + 1) as f64).powf(self.gamma)
    }
}

impl Minimizer for Spsa {
    fn name(&self) -> &'static str {
        "spsa"
    }

    fn minimize<F>(&self, objective: F, initial: &[f64]) -> Result<OptimizationResult>
    where
        F: FnMut(&[f64]) -> Result<f64>,
    {
        let mut f = Counted::new(objective);
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let n = initial.len();

        let mut params = initial.to_vec();
        let mut best_params = params.clone();
        let mut best_value = f.call(&params)?;
        let mut history = Vec::with_capacity(self.max_iterations + 1);
        history.push(best_value);

        let mut iteration = 0;
        let mut small_steps = 0;
        let mut termination = Termination::MaxIterations;

        if n == 0 {
            termination = Termination::Converged;
        }

        while termination == Termination::MaxIterations && iteration < self.max_iterations {
            let a_k = self.learning_rate(iteration);
            let c_k = self.perturbation(iteration);
            iteration += 1;

            let delta: Vec<f64> = (0..n)
                .map(|_| if rng.gen_bool(0.5) { 1.0 } else { -1.0 })
                .collect();

            let plus: Vec<f64> = params.iter().zip(&delta).map(|(p, d)| p + c_k * d).collect();
            let minus: Vec<f64> = params.iter().zip(&delta).map(|(p, d)| p - c_k * d).collect();

            let f_plus = f.call(&plus)?;
            let f_minus = f.call(&minus)?;
            let slope = (f_plus - f_minus) / (2.0 * c_k);

            let mut step_sq = 0.0;
            for (p, d) in params.iter_mut().zip(&delta) {
                let step = a_k * slope / d;
                *p -= step;
                step_sq += step * step;
            }

            let value = f.call(&params)?;
            if value < best_value {
                best_value = value;
                best_params.clone_from(&params);
            }
            history.push(best_value);
            trace!(iteration, f_plus, f_minus, value, "spsa step");

            // Zero slope never counts toward convergence
            if slope != 0.0 && step_sq.sqrt() < self.tolerance {
                small_steps += 1;
            } else {
                small_steps = 0;
            }
            if small_steps >= SPSA_CONVERGENCE_WINDOW {
                termination = Termination::Converged;
            }
        }

        debug!(
            iterations = iteration,
            func_evals = f.evals,
            objective = best_value,
            %termination,
            "spsa finished"
        );

        Ok(OptimizationResult {
            params: best_params,
            objective: best_value,
            iterations: iteration,
            func_evals: f.evals,
            termination,
            history,
        })
    }
}

// =============================================================================
// Optimizer Selection
// =============================================================================

/// Optimizer algorithm type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptimizerKind {
    /// Nelder–Mead simplex
    #[default]
    NelderMead,
    /// SPSA
    Spsa,
}

impl OptimizerKind {
    /// String name
    pub fn name(&self) -> &'static str {
        match self {
            OptimizerKind::NelderMead => "nelder-mead",
            OptimizerKind::Spsa => "spsa",
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OptimizerKind {
    type Err = QaoaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "nelder-mead" | "neldermead" | "nm" => Ok(OptimizerKind::NelderMead),
            "spsa" => Ok(OptimizerKind::Spsa),
            other => Err(QaoaError::InvalidConfig(format!(
                "unknown optimizer '{other}' (expected nelder-mead or spsa)"
            ))),
        }
    }
}

/// A configured minimizer of either kind
#[derive(Debug, Clone)]
pub enum Optimizer {
    /// Nelder–Mead simplex
    NelderMead(NelderMead),
    /// SPSA
    Spsa(Spsa),
}

impl Optimizer {
    /// Build the minimizer for `kind`
    pub fn from_kind(kind: OptimizerKind, max_iterations: usize, tolerance: f64, seed: u64) -> Self {
        match kind {
            OptimizerKind::NelderMead => Optimizer::NelderMead(NelderMead::new(max_iterations, tolerance)),
            OptimizerKind::Spsa => Optimizer::Spsa(Spsa::new(max_iterations, tolerance, seed)),
        }
    }
}

impl Minimizer for Optimizer {
    fn name(&self) -> &'static str {
        match self {
            Optimizer::NelderMead(m) => m.name(),
            Optimizer::Spsa(m) => m.name(),
        }
    }

    fn minimize<F>(&self, objective: F, initial: &[f64]) -> Result<OptimizationResult>
    where
        F: FnMut(&[f64]) -> Result<f64>,
    {
        match self {
            Optimizer::NelderMead(m) => m.minimize(objective, initial),
            Optimizer::Spsa(m) => m.minimize(objective, initial),
        }
    }
}
