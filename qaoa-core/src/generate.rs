//! Graph sources
//!
//! Random graphs follow the Erdős–Rényi `G(n, p)` model: every unordered
//! pair is an edge independently with probability `p`. Random weights are
//! uniform in `[0, max_weight]` and rounded to one decimal. All randomness
//! comes from the caller's RNG, so a seeded `ChaCha8Rng` reproduces a graph
//! exactly.
//!
//! ```
//! use qaoa_core::generate::GraphGenerator;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(1);
//! let g = GraphGenerator::default().erdos_renyi(6, 0.5, &mut rng).unwrap();
//! assert_eq!(g.n_nodes(), 6);
//! ```

use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{QaoaError, Result};
use crate::graph::{Edge, WeightedGraph};

/// Default upper bound for random weights
pub const DEFAULT_MAX_WEIGHT: f64 = 10.0;

/// Edge given by endpoints, weight optional
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub u: usize,
    pub v: usize,
    #[serde(default)]
    pub weight: Option<f64>,
}

impl EdgeSpec {
    pub fn new(u: usize, v: usize) -> Self {
        Self { u, v, weight: None }
    }

    pub fn weighted(u: usize, v: usize, weight: f64) -> Self {
        Self {
            u,
            v,
            weight: Some(weight),
        }
    }
}

impl FromStr for EdgeSpec {
    type Err = QaoaError;

    /// Parse `u-v` or `u-v:weight`
    fn from_str(s: &str) -> Result<Self> {
        let bad = || QaoaError::InvalidConfig(format!("invalid edge '{s}', expected u-v or u-v:w"));

        let (pair, weight) = match s.trim().split_once(':') {
            Some((pair, w)) => (pair, Some(w.trim().parse::<f64>().map_err(|_| bad())?)),
            None => (s.trim(), None),
        };
        let (u, v) = pair.split_once('-').ok_or_else(bad)?;

        Ok(Self {
            u: u.trim().parse().map_err(|_| bad())?,
            v: v.trim().parse().map_err(|_| bad())?,
            weight,
        })
    }
}

/// Parse a comma-separated edge list such as `0-1:2.5,1-2`
pub fn parse_edge_list(s: &str) -> Result<Vec<EdgeSpec>> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect()
}

/// Weighting policy for generated graphs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphGenerator {
    unweighted: bool,
    max_weight: f64,
}

impl Default for GraphGenerator {
    fn default() -> Self {
        Self {
            unweighted: false,
            max_weight: DEFAULT_MAX_WEIGHT,
        }
    }
}

impl GraphGenerator {
    /// Every edge weight `1.0`
    pub fn unweighted() -> Self {
        Self {
            unweighted: true,
            ..Self::default()
        }
    }

    /// Random weights in `[0, max_weight]`
    pub fn with_max_weight(mut self, max_weight: f64) -> Self {
        self.max_weight = max_weight;
        self
    }

    fn check(&self) -> Result<()> {
        if !self.max_weight.is_finite() || self.max_weight < 0.0 {
            return Err(QaoaError::InvalidConfig(format!(
                "max weight {} must be finite and non-negative",
                self.max_weight
            )));
        }
        Ok(())
    }

    fn draw_weight<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.unweighted {
            1.0
        } else {
            let w = rng.gen_range(0.0..=self.max_weight);
            (w * 10.0).round() / 10.0
        }
    }

    /// Erdős–Rényi `G(n, p)` graph
    pub fn erdos_renyi<R: Rng + ?Sized>(&self, n_nodes: usize, p: f64, rng: &mut R) -> Result<WeightedGraph> {
        self.check()?;
        if !(0.0..=1.0).contains(&p) {
            return Err(QaoaError::InvalidConfig(format!(
                "edge probability {p} outside [0, 1]"
            )));
        }

        let mut edges = Vec::new();
        for u in 0..n_nodes {
            for v in (u + 1)..n_nodes {
                if rng.gen_bool(p) {
                    edges.push(Edge::weighted(u, v, self.draw_weight(rng)));
                }
            }
        }

        debug!(n_nodes, p, n_edges = edges.len(), "generated G(n, p) graph");
        WeightedGraph::from_edges(n_nodes, edges)
    }

    /// Graph from explicit edges; missing weights are drawn like random ones
    ///
    /// With `n_nodes = None` the node count is one past the largest endpoint.
    pub fn from_edge_list<R: Rng + ?Sized>(
        &self,
        edges: &[EdgeSpec],
        n_nodes: Option<usize>,
        rng: &mut R,
    ) -> Result<WeightedGraph> {
        self.check()?;

        let n = match n_nodes {
            Some(n) => n,
            None => edges.iter().try_fold(0usize, |n, e| {
                e.u.max(e.v)
                    .checked_add(1)
                    .map(|needed| n.max(needed))
                    .ok_or_else(|| {
                        QaoaError::InvalidConfig(format!("node id {} is too large", e.u.max(e.v)))
                    })
            })?,
        };

        let edges = edges
            .iter()
            .map(|e| {
                let weight = match (self.unweighted, e.weight) {
                    (true, _) => 1.0,
                    (false, Some(w)) => w,
                    (false, None) => self.draw_weight(rng),
                };
                Edge::weighted(e.u, e.v, weight)
            })
            .collect();

        WeightedGraph::from_edges(n, edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    #[test]
    fn test_erdos_renyi_reproducible() {
        let generator = GraphGenerator::default();
        let a = generator.erdos_renyi(8, 0.4, &mut rng(5)).unwrap();
        let b = generator.erdos_renyi(8, 0.4, &mut rng(5)).unwrap();
        assert_eq!(a.edges(), b.edges());
    }

    #[test]
    fn test_erdos_renyi_extremes() {
        let generator = GraphGenerator::unweighted();
        assert_eq!(generator.erdos_renyi(5, 0.0, &mut rng(1)).unwrap().n_edges(), 0);

        let full = generator.erdos_renyi(5, 1.0, &mut rng(1)).unwrap();
        assert_eq!(full.n_edges(), 10);
        assert!(full.edges().iter().all(|e| e.weight == 1.0));
    }

    #[test]
    fn test_random_weights_rounded_and_bounded() {
        let g = GraphGenerator::default()
            .with_max_weight(3.0)
            .erdos_renyi(10, 1.0, &mut rng(2))
            .unwrap();
        for e in g.edges() {
            assert!((0.0..=3.0).contains(&e.weight));
            assert!(((e.weight * 10.0).round() - e.weight * 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_bad_probability() {
        assert!(GraphGenerator::default()
            .erdos_renyi(4, 1.5, &mut rng(0))
            .is_err());
    }

    #[test]
    fn test_edge_list_node_count() {
        let edges = [EdgeSpec::weighted(0, 1, 2.5), EdgeSpec::new(1, 4)];
        let g = GraphGenerator::default().from_edge_list(&edges, None, &mut rng(3)).unwrap();
        assert_eq!(g.n_nodes(), 5);
        assert_eq!(g.weight(0, 1), Some(2.5));
        assert!(g.weight(1, 4).is_some());

        let g = GraphGenerator::unweighted()
            .from_edge_list(&edges, Some(7), &mut rng(3))
            .unwrap();
        assert_eq!(g.n_nodes(), 7);
        assert_eq!(g.weight(0, 1), Some(1.0));
    }

    #[test]
    fn test_parse_edge_list() {
        let edges = parse_edge_list("0-1:2.5, 1-2 ,").unwrap();
        assert_eq!(edges, vec![EdgeSpec::weighted(0, 1, 2.5), EdgeSpec::new(1, 2)]);

        assert!(parse_edge_list("0-x").is_err());
        assert!(parse_edge_list("0:1").is_err());
        assert!(parse_edge_list("0-1:heavy").is_err());
    }

    #[test]
    fn test_edge_list_huge_endpoint_rejected() {
        let edges = parse_edge_list(&format!("0-{}", usize::MAX)).unwrap();
        assert!(matches!(
            GraphGenerator::default().from_edge_list(&edges, None, &mut rng(0)),
            Err(QaoaError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_edge_list_validation_propagates() {
        let edges = [EdgeSpec::new(2, 2)];
        assert!(matches!(
            GraphGenerator::default().from_edge_list(&edges, None, &mut rng(0)),
            Err(QaoaError::SelfLoop(2))
        ));
    }
}
