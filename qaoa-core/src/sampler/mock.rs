//! Deterministic test doubles for the sampler boundary
//!
//! These let the objective, the optimizer loop and the ranking be tested
//! without running any circuit.

use std::collections::BTreeMap;

use super::{BitOrder, RawCounts, Sampler};
use crate::bitstring::BitString;
use crate::circuit::CircuitSpec;
use crate::error::{QaoaError, Result};

/// Spread `shots` over outcomes in proportion to `weights`
///
/// Largest-remainder rounding, ties resolved in key order, so the counts
/// always sum to `shots`.
fn apportion(weights: &BTreeMap<String, u64>, shots: u64) -> RawCounts {
    let total: u64 = weights.values().sum();
    if total == 0 {
        return RawCounts::new();
    }

    let mut counts = RawCounts::with_capacity(weights.len());
    let mut remainders = Vec::with_capacity(weights.len());
    let mut assigned = 0u64;

    for (outcome, &w) in weights {
        let exact = shots as u128 * w as u128;
        let floor = (exact / total as u128) as u64;
        let rem = (exact % total as u128) as u64;
        counts.insert(outcome.clone(), floor);
        remainders.push((rem, outcome));
        assigned += floor;
    }

    // Stable sort keeps key order among equal remainders
    remainders.sort_by(|a, b| b.0.cmp(&a.0));
    for (_, outcome) in remainders.into_iter().take((shots - assigned) as usize) {
        if let Some(c) = counts.get_mut(outcome) {
            *c += 1;
        }
    }

    counts.retain(|_, c| *c > 0);
    counts
}

// =============================================================================
// Fixed Sampler
// =============================================================================

/// Returns the same outcome mix for every circuit
#[derive(Debug, Clone)]
pub struct FixedSampler {
    weights: BTreeMap<String, u64>,
    order: BitOrder,
    calls: usize,
    last_circuit: Option<CircuitSpec>,
}

impl FixedSampler {
    /// Outcomes with relative weights, rescaled to the requested shots
    pub fn new<'a>(outcomes: impl IntoIterator<Item = (&'a str, u64)>) -> Self {
        Self {
            weights: outcomes
                .into_iter()
                .map(|(s, w)| (s.to_string(), w))
                .collect(),
            order: BitOrder::NodeOrder,
            calls: 0,
            last_circuit: None,
        }
    }

    /// Declare a native bit order for the stored outcome strings
    pub fn with_order(mut self, order: BitOrder) -> Self {
        self.order = order;
        self
    }

    /// Number of `sample` calls so far
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Circuit passed to the most recent call
    pub fn last_circuit(&self) -> Option<&CircuitSpec> {
        self.last_circuit.as_ref()
    }
}

impl Sampler for FixedSampler {
    fn name(&self) -> &str {
        "fixed"
    }

    fn bit_order(&self) -> BitOrder {
        self.order
    }

    fn sample(&mut self, circuit: &CircuitSpec, shots: u64) -> Result<RawCounts> {
        self.calls += 1;
        self.last_circuit = Some(circuit.clone());
        Ok(apportion(&self.weights, shots))
    }
}

// =============================================================================
// Uniform Sampler
// =============================================================================

/// Every bit-string equally often, regardless of the circuit
///
/// Exact when `shots` is a multiple of `2^n`; otherwise the remainder goes
/// one shot each to the lexically smallest bit-strings ("000", "001", ...
/// in node order).
#[derive(Debug, Clone, Default)]
pub struct UniformSampler;

impl Sampler for UniformSampler {
    fn name(&self) -> &str {
        "uniform"
    }

    fn sample(&mut self, circuit: &CircuitSpec, shots: u64) -> Result<RawCounts> {
        let n = circuit.n_qubits();
        if n >= 24 {
            return Err(QaoaError::InvalidCircuit(format!(
                "{n} qubits exceed the uniform sampler limit of 23"
            )));
        }

        let weights = (0..1usize << n)
            .map(|i| (BitString::from_index(i, n).to_string(), 1))
            .collect();
        Ok(apportion(&weights, shots))
    }
}

// =============================================================================
// Failing Sampler
// =============================================================================

/// Fails a fixed number of times, then delegates to a [`FixedSampler`]
#[derive(Debug, Clone)]
pub struct FailingSampler {
    failures_left: usize,
    transient: bool,
    inner: FixedSampler,
    calls: usize,
}

impl FailingSampler {
    /// Always fails with a non-retryable error
    pub fn fatal() -> Self {
        Self {
            failures_left: usize::MAX,
            transient: false,
            inner: FixedSampler::new(std::iter::empty()),
            calls: 0,
        }
    }

    /// Reports itself unavailable `failures` times, then succeeds via `inner`
    pub fn transient(failures: usize, inner: FixedSampler) -> Self {
        Self {
            failures_left: failures,
            transient: true,
            inner,
            calls: 0,
        }
    }

    /// Number of `sample` calls so far, failed ones included
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl Sampler for FailingSampler {
    fn name(&self) -> &str {
        "failing"
    }

    fn bit_order(&self) -> BitOrder {
        self.inner.bit_order()
    }

    fn sample(&mut self, circuit: &CircuitSpec, shots: u64) -> Result<RawCounts> {
        self.calls += 1;
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(if self.transient {
                QaoaError::SamplerUnavailable(self.name().to_string(), 0)
            } else {
                QaoaError::sampler(self.name(), "execution failed")
            });
        }
        self.inner.sample(circuit, shots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::WeightedGraph;

    fn spec(n: usize) -> CircuitSpec {
        CircuitSpec::build(&WeightedGraph::path(n), 0, &[]).unwrap()
    }

    #[test]
    fn test_fixed_rescales_to_shots() {
        let mut s = FixedSampler::new([("00", 3), ("11", 1)]);
        let counts = s.sample(&spec(2), 100).unwrap();
        assert_eq!(counts["00"], 75);
        assert_eq!(counts["11"], 25);
        assert_eq!(s.calls(), 1);
        assert!(s.last_circuit().is_some());
    }

    #[test]
    fn test_apportion_sums_to_shots() {
        let weights: BTreeMap<String, u64> =
            [("a".to_string(), 1), ("b".to_string(), 1), ("c".to_string(), 1)]
                .into_iter()
                .collect();
        let counts = apportion(&weights, 10);
        assert_eq!(counts.values().sum::<u64>(), 10);
        // Remainder goes to the first key
        assert_eq!(counts["a"], 4);
    }

    #[test]
    fn test_uniform_counts() {
        let counts = UniformSampler.sample(&spec(3), 800).unwrap();
        assert_eq!(counts.len(), 8);
        assert!(counts.values().all(|&c| c == 100));
    }

    #[test]
    fn test_uniform_remainder_goes_to_smallest_strings() {
        let counts = UniformSampler.sample(&spec(3), 10).unwrap();
        assert_eq!(counts["000"], 2);
        assert_eq!(counts["001"], 2);
        assert_eq!(counts["100"], 1);
        assert_eq!(counts.values().sum::<u64>(), 10);
    }

    #[test]
    fn test_uniform_rejects_wide_circuit() {
        let wide = CircuitSpec::build(&WeightedGraph::empty(24), 0, &[]).unwrap();
        let err = UniformSampler.sample(&wide, 10).unwrap_err();
        assert!(matches!(err, QaoaError::InvalidCircuit(_)));
        assert!(err.is_sampler_error());
    }

    #[test]
    fn test_transient_then_success() {
        let mut s = FailingSampler::transient(1, FixedSampler::new([("0", 1)]));
        assert!(s.sample(&spec(1), 5).unwrap_err().is_retryable());
        assert_eq!(s.sample(&spec(1), 5).unwrap()["0"], 5);
        assert_eq!(s.calls(), 2);
    }

    #[test]
    fn test_fatal_never_succeeds() {
        let mut s = FailingSampler::fatal();
        for _ in 0..3 {
            let err = s.sample(&spec(1), 5).unwrap_err();
            assert!(!err.is_retryable());
        }
    }
}
