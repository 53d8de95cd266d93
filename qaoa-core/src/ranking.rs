//! Ranking sampled cuts
//!
//! A [`SolutionRanking`] lists every observed bit-string with its empirical
//! probability, most probable first and lexically on ties. [`top_k`] pairs
//! the leading entries with their cut weight for reporting.

use std::cmp::Ordering;

use serde::Serialize;

use crate::bitstring::BitString;
use crate::cost;
use crate::distribution::Distribution;
use crate::error::Result;
use crate::graph::WeightedGraph;

/// One ranked outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSolution {
    pub bitstring: BitString,
    pub probability: f64,
}

/// Outcomes sorted by probability, descending
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct SolutionRanking {
    entries: Vec<RankedSolution>,
}

impl SolutionRanking {
    /// Rank a distribution
    pub fn from_distribution(distribution: &Distribution) -> Self {
        let mut entries: Vec<RankedSolution> = distribution
            .probabilities()
            .map(|(b, p)| RankedSolution {
                bitstring: b.clone(),
                probability: p,
            })
            .collect();

        entries.sort_by(|a, b| {
            b.probability
                .partial_cmp(&a.probability)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.bitstring.cmp(&b.bitstring))
        });

        Self { entries }
    }

    /// All entries in rank order
    pub fn entries(&self) -> &[RankedSolution] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest-ranked entry
    pub fn best(&self) -> Option<&RankedSolution> {
        self.entries.first()
    }

    /// Iterate `(bitstring, probability)` in rank order
    pub fn iter(&self) -> impl Iterator<Item = (&BitString, f64)> {
        self.entries.iter().map(|e| (&e.bitstring, e.probability))
    }
}

/// A ranked outcome with its cut weight
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCut {
    pub rank: usize,
    pub bitstring: BitString,
    pub probability: f64,
    pub cut_weight: f64,
}

/// First `k` ranked outcomes with `cut_weight = 0.5 · |C(b)|`
pub fn top_k(graph: &WeightedGraph, ranking: &SolutionRanking, k: usize) -> Result<Vec<RankedCut>> {
    ranking
        .entries
        .iter()
        .take(k)
        .enumerate()
        .map(|(i, e)| {
            Ok(RankedCut {
                rank: i + 1,
                bitstring: e.bitstring.clone(),
                probability: e.probability,
                cut_weight: cost::cut_weight(graph, &e.bitstring)?,
            })
        })
        .collect()
}
