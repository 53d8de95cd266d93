//! Classical Max-Cut cost
//!
//! For a bit-string `z` the cost is
//!
//! ```text
//! C(z) = Σ_{(u,v,w) ∈ E} w · ((-1)^(z_u + z_v) - 1)
//! ```
//!
//! Uncut edges contribute `0` and cut edges `-2w`, so `C(z) = -2 · cut(z)`
//! and lower is better. This is the quantity the optimizer minimizes; the
//! positive cut weight is recovered with [`cut_weight`].

use crate::bitstring::BitString;
use crate::distribution::Distribution;
use crate::error::Result;
use crate::graph::WeightedGraph;

/// Signed, doubled Max-Cut cost of one assignment (always `<= 0`)
pub fn evaluate(graph: &WeightedGraph, bits: &BitString) -> Result<f64> {
    bits.check_len(graph.n_nodes())?;
    Ok(graph
        .edges()
        .iter()
        .map(|e| {
            let sign = if e.is_cut(bits) { -1.0 } else { 1.0 };
            e.weight * (sign - 1.0)
        })
        .sum())
}

/// Total weight of the edges crossing the partition
pub fn cut_weight(graph: &WeightedGraph, bits: &BitString) -> Result<f64> {
    Ok(0.5 * evaluate(graph, bits)?.abs())
}

/// Shot-weighted mean cost: `Σ_b (count[b] / shots) · C(b)`
pub fn expectation(graph: &WeightedGraph, distribution: &Distribution) -> Result<f64> {
    let shots = distribution.shots() as f64;
    let mut total = 0.0;
    for (bits, count) in distribution.iter() {
        total += (count as f64 / shots) * evaluate(graph, bits)?;
    }
    Ok(total)
}
