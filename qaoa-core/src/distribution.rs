//! Measured bit-string counts
//!
//! A [`Distribution`] is always in canonical node order and always
//! consistent: every outcome has one bit per node and the counts add up to
//! the shot total. Samplers never build one directly; they return raw
//! counts that [`crate::sampler::sample_canonical`] checks and converts.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::bitstring::BitString;
use crate::error::{QaoaError, Result};

/// Outcome counts for one sampler invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Distribution {
    n_nodes: usize,
    shots: u64,
    counts: BTreeMap<BitString, u64>,
}

impl Distribution {
    /// Validate and wrap canonical-order counts
    pub fn from_counts(n_nodes: usize, shots: u64, counts: BTreeMap<BitString, u64>) -> Result<Self> {
        if shots == 0 {
            return Err(QaoaError::ZeroShots);
        }

        for bits in counts.keys() {
            if bits.len() != n_nodes {
                return Err(QaoaError::OutcomeWidth {
                    outcome: bits.to_string(),
                    len: bits.len(),
                    expected: n_nodes,
                });
            }
        }

        let total: u64 = counts.values().sum();
        if total != shots {
            return Err(QaoaError::ShotMismatch { total, shots });
        }

        // Zero-count entries carry no information and would show up in rankings
        let counts = counts.into_iter().filter(|(_, c)| *c > 0).collect();

        Ok(Self {
            n_nodes,
            shots,
            counts,
        })
    }

    /// Number of nodes (bits per outcome)
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Total shots
    pub fn shots(&self) -> u64 {
        self.shots
    }

    /// Number of distinct outcomes observed
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True when nothing was observed (never the case for a validated distribution)
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Count of one outcome
    pub fn count(&self, bits: &BitString) -> u64 {
        self.counts.get(bits).copied().unwrap_or(0)
    }

    /// Empirical probability of one outcome
    pub fn probability(&self, bits: &BitString) -> f64 {
        self.count(bits) as f64 / self.shots as f64
    }

    /// Outcomes and counts in lexical bit-string order
    pub fn iter(&self) -> impl Iterator<Item = (&BitString, u64)> {
        self.counts.iter().map(|(b, &c)| (b, c))
    }

    /// Outcomes with `count / shots`
    pub fn probabilities(&self) -> impl Iterator<Item = (&BitString, f64)> {
        let shots = self.shots as f64;
        self.counts.iter().map(move |(b, &c)| (b, c as f64 / shots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, u64)]) -> BTreeMap<BitString, u64> {
        pairs
            .iter()
            .map(|(s, c)| (s.parse().unwrap(), *c))
            .collect()
    }

    #[test]
    fn test_probability() {
        let d = Distribution::from_counts(2, 1000, counts(&[("00", 700), ("11", 300)])).unwrap();

        assert!((d.probability(&"00".parse().unwrap()) - 0.7).abs() < 1e-12);
        assert!((d.probability(&"11".parse().unwrap()) - 0.3).abs() < 1e-12);
        assert_eq!(d.probability(&"01".parse().unwrap()), 0.0);
    }

    #[test]
    fn test_rejects_shot_mismatch() {
        let err = Distribution::from_counts(2, 10, counts(&[("00", 4)])).unwrap_err();
        assert!(matches!(err, QaoaError::ShotMismatch { total: 4, shots: 10 }));
    }

    #[test]
    fn test_rejects_wrong_width() {
        let err = Distribution::from_counts(3, 4, counts(&[("00", 4)])).unwrap_err();
        assert!(matches!(err, QaoaError::OutcomeWidth { len: 2, expected: 3, .. }));
    }

    #[test]
    fn test_drops_zero_counts() {
        let d = Distribution::from_counts(1, 3, counts(&[("0", 3), ("1", 0)])).unwrap();
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn test_rejects_zero_shots() {
        assert!(matches!(
            Distribution::from_counts(1, 0, BTreeMap::new()),
            Err(QaoaError::ZeroShots)
        ));
    }
}
