//! Weighted undirected graphs for Max-Cut
//!
//! A [`WeightedGraph`] owns nodes `0..n` and a list of weighted edges. All
//! structural rules are checked once, in [`WeightedGraph::from_edges`]:
//! endpoints in range, no self-loops, no duplicate pairs, and finite
//! non-negative weights. After that the graph is read-only, so the cost
//! model can index bit-strings by node id without further checks.
//!
//! # Example
//!
//! ```
//! use qaoa_core::graph::{Edge, WeightedGraph};
//!
//! let graph = WeightedGraph::from_edges(3, vec![
//!     Edge::weighted(0, 1, 2.0),
//!     Edge::weighted(1, 2, 0.5),
//! ]).unwrap();
//!
//! assert_eq!(graph.total_weight(), 2.5);
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::bitstring::BitString;
use crate::error::{QaoaError, Result};

/// Largest graph accepted by the exhaustive max-cut search
pub const MAX_EXACT_NODES: usize = 20;

// =============================================================================
// Edge
// =============================================================================

/// Edge in a graph
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// First vertex
    pub u: usize,
    /// Second vertex
    pub v: usize,
    /// Edge weight (default 1.0)
    pub weight: f64,
}

impl Edge {
    /// Create unweighted edge
    pub fn new(u: usize, v: usize) -> Self {
        Self { u, v, weight: 1.0 }
    }

    /// Create weighted edge
    pub fn weighted(u: usize, v: usize, weight: f64) -> Self {
        Self { u, v, weight }
    }

    /// Endpoints with the smaller id first
    fn key(&self) -> (usize, usize) {
        (self.u.min(self.v), self.u.max(self.v))
    }

    /// Whether the edge crosses the partition given by `bits`
    ///
    /// `bits` must already be checked against the node count.
    pub(crate) fn is_cut(&self, bits: &BitString) -> bool {
        bits.bit(self.u) != bits.bit(self.v)
    }
}

// =============================================================================
// Weighted Graph
// =============================================================================

/// Validated, immutable weighted graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedGraph {
    n_nodes: usize,
    edges: Vec<Edge>,
}

impl WeightedGraph {
    /// Build a graph, rejecting anything the cost model cannot index safely
    pub fn from_edges(n_nodes: usize, edges: Vec<Edge>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(edges.len());

        for edge in &edges {
            if edge.u >= n_nodes || edge.v >= n_nodes {
                return Err(QaoaError::NodeOutOfRange {
                    u: edge.u,
                    v: edge.v,
                    n_nodes,
                });
            }
            if edge.u == edge.v {
                return Err(QaoaError::SelfLoop(edge.u));
            }
            if !edge.weight.is_finite() || edge.weight < 0.0 {
                return Err(QaoaError::InvalidWeight {
                    u: edge.u,
                    v: edge.v,
                    weight: edge.weight,
                });
            }
            if !seen.insert(edge.key()) {
                return Err(QaoaError::DuplicateEdge {
                    u: edge.u,
                    v: edge.v,
                });
            }
        }

        Ok(Self { n_nodes, edges })
    }

    /// Graph with nodes and no edges
    pub fn empty(n_nodes: usize) -> Self {
        Self {
            n_nodes,
            edges: Vec::new(),
        }
    }

    /// Get number of nodes
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Get number of edges
    pub fn n_edges(&self) -> usize {
        self.edges.len()
    }

    /// Get edges
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Get total weight of all edges
    pub fn total_weight(&self) -> f64 {
        self.edges.iter().map(|e| e.weight).sum()
    }

    /// Weight of the edge between `u` and `v`, in either direction
    pub fn weight(&self, u: usize, v: usize) -> Option<f64> {
        let key = (u.min(v), u.max(v));
        self.edges.iter().find(|e| e.key() == key).map(|e| e.weight)
    }

    /// Exhaustive maximum cut, for graphs up to [`MAX_EXACT_NODES`] nodes
    ///
    /// Returns the first optimal assignment in index order, which always
    /// keeps node 0 in partition 0 for a non-empty optimum.
    pub fn max_cut_brute_force(&self) -> Result<(BitString, f64)> {
        if self.n_nodes > MAX_EXACT_NODES {
            return Err(QaoaError::TooManyNodes {
                n_nodes: self.n_nodes,
                limit: MAX_EXACT_NODES,
                operation: "exact max-cut",
            });
        }

        let mut best = (BitString::zeros(self.n_nodes), 0.0);
        for index in 0..(1usize << self.n_nodes) {
            let bits = BitString::from_index(index, self.n_nodes);
            let cut: f64 = self
                .edges
                .iter()
                .filter(|e| e.is_cut(&bits))
                .map(|e| e.weight)
                .sum();
            if cut > best.1 {
                best = (bits, cut);
            }
        }

        Ok(best)
    }

    // =========================================================================
    // Standard Graph Constructors
    // =========================================================================

    /// Triangle graph (3 vertices, 3 edges)
    pub fn triangle() -> Self {
        Self::cycle(3)
    }

    /// Path graph P_n (n vertices, n-1 edges)
    pub fn path(n: usize) -> Self {
        let edges = (1..n).map(|i| Edge::new(i - 1, i)).collect();
        Self { n_nodes: n, edges }
    }

    /// Cycle graph C_n (n vertices, n edges); falls back to a path below 3 nodes
    pub fn cycle(n: usize) -> Self {
        if n < 3 {
            return Self::path(n);
        }
        let mut graph = Self::path(n);
        graph.edges.push(Edge::new(n - 1, 0));
        graph
    }

    /// Complete graph K_n
    pub fn complete(n: usize) -> Self {
        let mut edges = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                edges.push(Edge::new(i, j));
            }
        }
        Self { n_nodes: n, edges }
    }
}

// =============================================================================
// Tests
// =============================================================================
