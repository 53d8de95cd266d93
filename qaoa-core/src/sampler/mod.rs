//! Sampler boundary
//!
//! A [`Sampler`] is the black box that turns a [`CircuitSpec`] and a shot
//! count into measured outcomes: a simulator, remote hardware, or a test
//! double. Samplers report raw counts keyed by bit-string text in their own
//! native bit order and declare that order through [`Sampler::bit_order`].
//!
//! [`sample_canonical`] is the single place where raw counts are checked
//! and put into node order. Nothing downstream reverses bits again.
//!
//! ```text
//! CircuitSpec ──► Sampler::sample ──► RawCounts ──► sample_canonical ──► Distribution
//!                                   (native order)    (reverse once)      (node order)
//! ```

pub mod mock;
pub mod retry;
pub mod statevector;

use std::collections::{BTreeMap, HashMap};

use tracing::trace;

use crate::bitstring::BitString;
use crate::circuit::CircuitSpec;
use crate::distribution::Distribution;
use crate::error::{QaoaError, Result};

pub use mock::{FailingSampler, FixedSampler, UniformSampler};
pub use retry::RetryingSampler;
pub use statevector::StateVectorSampler;

/// Raw sampler output: outcome text in the sampler's native order → count
pub type RawCounts = HashMap<String, u64>;

// =============================================================================
// Bit Order
// =============================================================================

/// How a sampler lays out outcome characters relative to node ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitOrder {
    /// Character `i` is node `i`
    #[default]
    NodeOrder,
    /// Character `i` is node `n - 1 - i` (highest qubit printed first)
    Reversed,
}

impl BitOrder {
    /// Convert an outcome in this order to node order
    pub fn to_canonical(self, raw: BitString) -> BitString {
        match self {
            BitOrder::NodeOrder => raw,
            BitOrder::Reversed => raw.reversed(),
        }
    }

    /// Convert a node-order bit-string to this order
    ///
    /// Reversal is its own inverse, so this is the same map as
    /// [`BitOrder::to_canonical`]. Samplers call it when printing outcomes.
    pub fn from_canonical(self, bits: BitString) -> BitString {
        self.to_canonical(bits)
    }
}

// =============================================================================
// Sampler Trait
// =============================================================================

/// Circuit executor returning measurement counts
pub trait Sampler {
    /// Name used in errors and logs
    fn name(&self) -> &str;

    /// Native order of outcome strings
    fn bit_order(&self) -> BitOrder {
        BitOrder::NodeOrder
    }

    /// Run `circuit` for `shots` shots and return raw counts
    fn sample(&mut self, circuit: &CircuitSpec, shots: u64) -> Result<RawCounts>;
}

impl<S: Sampler + ?Sized> Sampler for &mut S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn bit_order(&self) -> BitOrder {
        (**self).bit_order()
    }

    fn sample(&mut self, circuit: &CircuitSpec, shots: u64) -> Result<RawCounts> {
        (**self).sample(circuit, shots)
    }
}

impl<S: Sampler + ?Sized> Sampler for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn bit_order(&self) -> BitOrder {
        (**self).bit_order()
    }

    fn sample(&mut self, circuit: &CircuitSpec, shots: u64) -> Result<RawCounts> {
        (**self).sample(circuit, shots)
    }
}

// =============================================================================
// Canonicalization
// =============================================================================

/// Sample and return a validated distribution in node order
pub fn sample_canonical<S: Sampler + ?Sized>(
    sampler: &mut S,
    circuit: &CircuitSpec,
    shots: u64,
) -> Result<Distribution> {
    if shots == 0 {
        return Err(QaoaError::ZeroShots);
    }

    let raw = sampler.sample(circuit, shots)?;
    let order = sampler.bit_order();
    let n = circuit.n_qubits();

    let mut counts = BTreeMap::new();
    for (outcome, count) in raw {
        let bits: BitString = outcome.parse().map_err(|_| {
            QaoaError::sampler(sampler.name(), format!("malformed outcome '{outcome}'"))
        })?;
        if bits.len() != n {
            return Err(QaoaError::OutcomeWidth {
                len: bits.len(),
                outcome,
                expected: n,
            });
        }
        *counts.entry(order.to_canonical(bits)).or_insert(0) += count;
    }

    trace!(
        sampler = sampler.name(),
        ?order,
        outcomes = counts.len(),
        shots,
        "canonicalized sampler counts"
    );

    Distribution::from_counts(n, shots, counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, WeightedGraph};

    fn spec(n: usize) -> CircuitSpec {
        CircuitSpec::build(&WeightedGraph::path(n), 0, &[]).unwrap()
    }

    #[test]
    fn test_node_order_passthrough() {
        let mut s = FixedSampler::new([("011", 4)]);
        let d = sample_canonical(&mut s, &spec(3), 4).unwrap();
        assert_eq!(d.count(&"011".parse().unwrap()), 4);
    }

    #[test]
    fn test_reversed_order_is_flipped_once() {
        let mut s = FixedSampler::new([("011", 4)]).with_order(BitOrder::Reversed);
        let d = sample_canonical(&mut s, &spec(3), 4).unwrap();
        assert_eq!(d.count(&"110".parse().unwrap()), 4);
        assert_eq!(d.count(&"011".parse().unwrap()), 0);
    }

    #[test]
    fn test_width_mismatch() {
        let mut s = FixedSampler::new([("01", 4)]);
        let err = sample_canonical(&mut s, &spec(3), 4).unwrap_err();
        assert!(matches!(err, QaoaError::OutcomeWidth { len: 2, expected: 3, .. }));
    }

    #[test]
    fn test_malformed_outcome_is_sampler_error() {
        let mut s = FixedSampler::new([("0x1", 4)]);
        let err = sample_canonical(&mut s, &spec(3), 4).unwrap_err();
        assert!(err.is_sampler_error());
    }

    #[test]
    fn test_zero_shots() {
        let mut s = FixedSampler::new([("000", 1)]);
        assert!(matches!(
            sample_canonical(&mut s, &spec(3), 0),
            Err(QaoaError::ZeroShots)
        ));
    }

    #[test]
    fn test_bit_order_roundtrip() {
        let g = WeightedGraph::from_edges(2, vec![Edge::new(0, 1)]).unwrap();
        let bits: BitString = "10".parse().unwrap();
        assert_eq!(g.n_nodes(), bits.len());
        let native = BitOrder::Reversed.from_canonical(bits.clone());
        assert_eq!(native.to_string(), "01");
        assert_eq!(BitOrder::Reversed.to_canonical(native), bits);
    }
}
