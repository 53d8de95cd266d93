//! Reference dense state-vector sampler
//!
//! Executes a [`CircuitSpec`] exactly on `2^n` complex amplitudes and draws
//! shots from the resulting probabilities with a seeded ChaCha RNG. Meant
//! for small graphs and for running the solver without external hardware.
//!
//! Amplitude index bit `i` is qubit `i`. Outcomes are printed the way
//! common simulators print them, highest qubit first, so this sampler
//! declares [`BitOrder::Reversed`].

use num_complex::Complex64;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{BitOrder, RawCounts, Sampler};
use crate::bitstring::BitString;
use crate::circuit::{CircuitSpec, Gate};
use crate::error::{QaoaError, Result};

/// Largest register the dense simulation accepts
pub const MAX_STATEVECTOR_QUBITS: usize = 20;

/// Seeded exact simulator
#[derive(Debug, Clone)]
pub struct StateVectorSampler {
    rng: ChaCha8Rng,
}

impl StateVectorSampler {
    /// Create sampler with a fixed seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Final amplitudes of `circuit` before measurement
    pub fn statevector(circuit: &CircuitSpec) -> Result<Vec<Complex64>> {
        let n = circuit.n_qubits();
        if n > MAX_STATEVECTOR_QUBITS {
            return Err(QaoaError::InvalidCircuit(format!(
                "{n} qubits exceed the state-vector limit of {MAX_STATEVECTOR_QUBITS}"
            )));
        }

        let mut state = vec![Complex64::new(0.0, 0.0); 1 << n];
        state[0] = Complex64::new(1.0, 0.0);

        for gate in circuit.gates() {
            match gate {
                Gate::H(q) => apply_h(&mut state, q),
                Gate::CostPhase { u, v, phase } => apply_cost_phase(&mut state, u, v, phase),
                Gate::Rx { qubit, theta } => apply_rx(&mut state, qubit, theta),
            }
        }

        Ok(state)
    }

    /// Measurement probabilities indexed like the amplitudes
    pub fn probabilities(circuit: &CircuitSpec) -> Result<Vec<f64>> {
        Ok(Self::statevector(circuit)?
            .iter()
            .map(|a| a.norm_sqr())
            .collect())
    }

    /// Draw one amplitude index
    fn draw(&mut self, cumulative: &[f64]) -> usize {
        let total = cumulative.last().copied().unwrap_or(1.0);
        let r = self.rng.gen::<f64>() * total;
        cumulative
            .partition_point(|&c| c <= r)
            .min(cumulative.len() - 1)
    }
}

impl Sampler for StateVectorSampler {
    fn name(&self) -> &str {
        "statevector"
    }

    fn bit_order(&self) -> BitOrder {
        BitOrder::Reversed
    }

    fn sample(&mut self, circuit: &CircuitSpec, shots: u64) -> Result<RawCounts> {
        let n = circuit.n_qubits();
        let order = self.bit_order();
        let probs = Self::probabilities(circuit)?;

        let mut cumulative = Vec::with_capacity(probs.len());
        let mut acc = 0.0;
        for p in &probs {
            acc += p;
            cumulative.push(acc);
        }

        let mut hits = vec![0u64; probs.len()];
        for _ in 0..shots {
            let idx = self.draw(&cumulative);
            hits[idx] += 1;
        }

        Ok(hits
            .into_iter()
            .enumerate()
            .filter(|(_, c)| *c > 0)
            .map(|(idx, c)| {
                let outcome = order.from_canonical(BitString::from_index(idx, n));
                (outcome.to_string(), c)
            })
            .collect())
    }
}

// =============================================================================
// Gate Kernels
// =============================================================================

fn apply_h(state: &mut [Complex64], q: usize) {
    let bit = 1 << q;
    let s = std::f64::consts::FRAC_1_SQRT_2;
    for i in 0..state.len() {
        if i & bit == 0 {
            let a = state[i];
            let b = state[i | bit];
            state[i] = (a + b) * s;
            state[i | bit] = (a - b) * s;
        }
    }
}

fn apply_cost_phase(state: &mut [Complex64], u: usize, v: usize, phase: f64) {
    let factor = Complex64::from_polar(1.0, -phase);
    for (i, amp) in state.iter_mut().enumerate() {
        if ((i >> u) & 1) != ((i >> v) & 1) {
            *amp *= factor;
        }
    }
}

fn apply_rx(state: &mut [Complex64], q: usize, theta: f64) {
    let bit = 1 << q;
    let c = Complex64::new((theta / 2.0).cos(), 0.0);
    let ms = Complex64::new(0.0, -(theta / 2.0).sin());
    for i in 0..state.len() {
        if i & bit == 0 {
            let a = state[i];
            let b = state[i | bit];
            state[i] = c * a + ms * b;
            state[i | bit] = ms * a + c * b;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, WeightedGraph};
    use std::f64::consts::PI;

    fn total(probs: &[f64]) -> f64 {
        probs.iter().sum()
    }

    #[test]
    fn test_depth_zero_uniform() {
        let spec = CircuitSpec::build(&WeightedGraph::triangle(), 0, &[]).unwrap();
        let probs = StateVectorSampler::probabilities(&spec).unwrap();

        for p in &probs {
            assert!((p - 0.125).abs() < 1e-12);
        }
    }

    #[test]
    fn test_normalized_after_layers() {
        let spec = CircuitSpec::build(&WeightedGraph::complete(4), 2, &[0.3, 0.9, 0.4, 0.2]).unwrap();
        let probs = StateVectorSampler::probabilities(&spec).unwrap();
        assert!((total(&probs) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_rx_preserves_plus_state() {
        // H then RX(π) keeps |+⟩ (eigenstate of X), so stays uniform
        let spec = CircuitSpec::build(&WeightedGraph::path(1), 1, &[0.0, PI / 2.0]).unwrap();
        let probs = StateVectorSampler::probabilities(&spec).unwrap();
        assert!((probs[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_single_edge_favours_cut() {
        // p=1 on one edge: γ=π/2, β=π/8 concentrates on 01/10
        let g = WeightedGraph::from_edges(2, vec![Edge::new(0, 1)]).unwrap();
        let spec = CircuitSpec::build(&g, 1, &[PI / 2.0, PI / 8.0]).unwrap();
        let probs = StateVectorSampler::probabilities(&spec).unwrap();

        assert!(probs[1] + probs[2] > probs[0] + probs[3]);
    }

    #[test]
    fn test_sample_counts_and_order() {
        let spec = CircuitSpec::build(&WeightedGraph::path(3), 0, &[]).unwrap();
        let mut s = StateVectorSampler::new(7);
        let counts = s.sample(&spec, 400).unwrap();

        assert_eq!(counts.values().sum::<u64>(), 400);
        assert!(counts.keys().all(|k| k.len() == 3));
        assert_eq!(s.bit_order(), BitOrder::Reversed);
    }

    #[test]
    fn test_seeded_reproducible() {
        let spec = CircuitSpec::build(&WeightedGraph::triangle(), 1, &[0.7, 0.3]).unwrap();
        let a = StateVectorSampler::new(11).sample(&spec, 200).unwrap();
        let b = StateVectorSampler::new(11).sample(&spec, 200).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_too_many_qubits() {
        let spec = CircuitSpec::build(&WeightedGraph::empty(MAX_STATEVECTOR_QUBITS + 1), 0, &[]).unwrap();
        assert!(matches!(
            StateVectorSampler::probabilities(&spec),
            Err(QaoaError::InvalidCircuit(_))
        ));

        let err = crate::sampler::sample_canonical(&mut StateVectorSampler::new(0), &spec, 10).unwrap_err();
        assert!(err.is_sampler_error());
        assert!(!err.is_retryable());
    }
}
