//! QAOA circuit specification
//!
//! Maps a parameter vector to the structural description a sampler
//! executes. The description is substrate independent: it names gates and
//! angles, nothing more.
//!
//! # Parameter layout
//!
//! For depth `p` the parameter vector holds `2p` values:
//!
//! ```text
//! [γ_0, γ_1, …, γ_{p-1}, β_0, β_1, …, β_{p-1}]
//! ```
//!
//! # Gate convention
//!
//! ```text
//! |ψ(γ,β)⟩ = U_B(β_{p-1}) U_C(γ_{p-1}) … U_B(β_0) U_C(γ_0) H^{⊗n} |0⟩
//!
//! U_C(γ) = Π_{(u,v,w)} exp(-i γ w (I - Z_u Z_v) / 2)
//! U_B(β) = Π_q exp(-i β X_q) = Π_q RX(2β)
//! ```
//!
//! `U_C` leaves basis states where `u` and `v` agree untouched and
//! multiplies those where they differ by `e^{-iγw}`.

use std::fmt::Write as _;

use serde::Serialize;

use crate::error::{QaoaError, Result};
use crate::graph::{Edge, WeightedGraph};

/// Number of parameters for a given depth
pub fn n_params(depth: usize) -> usize {
    2 * depth
}

/// Split a parameter vector into its gamma and beta halves
pub fn split_params(params: &[f64], depth: usize) -> Result<(&[f64], &[f64])> {
    let expected = n_params(depth);
    if params.len() != expected {
        return Err(QaoaError::ParameterLength {
            params: params.to_vec(),
            len: params.len(),
            depth,
            expected,
        });
    }
    if params.iter().any(|p| !p.is_finite()) {
        return Err(QaoaError::NonFiniteParameters(params.to_vec()));
    }
    Ok(params.split_at(depth))
}

// =============================================================================
// Gates
// =============================================================================

/// One gate of the QAOA circuit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Gate {
    /// Hadamard on a qubit
    H(usize),
    /// `exp(-i·phase·(I - Z_u Z_v)/2)`: phase `-phase` when bits differ
    CostPhase { u: usize, v: usize, phase: f64 },
    /// `RX(theta) = exp(-i·theta/2·X)`
    Rx { qubit: usize, theta: f64 },
}

/// Angles for one cost + mixer layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Layer {
    pub gamma: f64,
    pub beta: f64,
}

// =============================================================================
// Circuit Specification
// =============================================================================

/// Everything a sampler needs to run one QAOA circuit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircuitSpec {
    n_qubits: usize,
    edges: Vec<Edge>,
    layers: Vec<Layer>,
}

impl CircuitSpec {
    /// Build the circuit for `graph` at `params` (layout in the module docs)
    pub fn build(graph: &WeightedGraph, depth: usize, params: &[f64]) -> Result<Self> {
        let (gammas, betas) = split_params(params, depth)?;
        let layers = gammas
            .iter()
            .zip(betas)
            .map(|(&gamma, &beta)| Layer { gamma, beta })
            .collect();

        Ok(Self {
            n_qubits: graph.n_nodes(),
            edges: graph.edges().to_vec(),
            layers,
        })
    }

    /// Number of qubits (one per node)
    pub fn n_qubits(&self) -> usize {
        self.n_qubits
    }

    /// Number of cost + mixer layers
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Per-layer angles
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Weighted edges the cost layers act on
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Gates in application order, measurement excluded
    pub fn gates(&self) -> Vec<Gate> {
        let per_layer = self.edges.len() + self.n_qubits;
        let mut gates = Vec::with_capacity(self.n_qubits + self.layers.len() * per_layer);

        gates.extend((0..self.n_qubits).map(Gate::H));

        for layer in &self.layers {
            gates.extend(self.edges.iter().map(|e| Gate::CostPhase {
                u: e.u,
                v: e.v,
                phase: layer.gamma * e.weight,
            }));
            gates.extend((0..self.n_qubits).map(|q| Gate::Rx {
                qubit: q,
                theta: 2.0 * layer.beta,
            }));
        }

        gates
    }

    /// Render as OpenQASM 3
    ///
    /// The cost phase is emitted as `rzz(-γw)`, equal to
    /// [`Gate::CostPhase`] up to a global phase. Classical bit `c[i]`
    /// holds node `i`.
    pub fn to_qasm(&self) -> String {
        let mut qasm = String::new();
        let n = self.n_qubits;

        // Writing to a String cannot fail
        let _ = writeln!(qasm, "OPENQASM 3.0;");
        let _ = writeln!(qasm, "include \"stdgates.inc\";");
        let _ = writeln!(qasm, "qubit[{n}] q;");
        let _ = writeln!(qasm, "bit[{n}] c;");

        for gate in self.gates() {
            match gate {
                Gate::H(q) => {
                    let _ = writeln!(qasm, "h q[{q}];");
                }
                Gate::CostPhase { u, v, phase } => {
                    let _ = writeln!(qasm, "rzz({:.12}) q[{u}], q[{v}];", -phase);
                }
                Gate::Rx { qubit, theta } => {
                    let _ = writeln!(qasm, "rx({theta:.12}) q[{qubit}];");
                }
            }
        }

        let _ = writeln!(qasm, "c = measure q;");
        qasm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_layout_gammas_then_betas() {
        let g = WeightedGraph::path(2);
        let spec = CircuitSpec::build(&g, 2, &[0.1, 0.2, 0.3, 0.4]).unwrap();

        assert_eq!(spec.layers()[0], Layer { gamma: 0.1, beta: 0.3 });
        assert_eq!(spec.layers()[1], Layer { gamma: 0.2, beta: 0.4 });
    }

    #[test]
    fn test_wrong_param_length() {
        let g = WeightedGraph::path(2);
        let err = CircuitSpec::build(&g, 2, &[0.1, 0.2, 0.3]).unwrap_err();
        assert!(matches!(
            err,
            QaoaError::ParameterLength { len: 3, depth: 2, expected: 4, .. }
        ));
    }

    #[test]
    fn test_non_finite_params() {
        let g = WeightedGraph::path(2);
        let err = CircuitSpec::build(&g, 1, &[f64::NAN, 0.0]).unwrap_err();
        assert!(matches!(err, QaoaError::NonFiniteParameters(_)));
    }

    #[test]
    fn test_gate_sequence() {
        let g = WeightedGraph::from_edges(2, vec![Edge::weighted(0, 1, 2.0)]).unwrap();
        let spec = CircuitSpec::build(&g, 1, &[0.5, 0.25]).unwrap();

        assert_eq!(
            spec.gates(),
            vec![
                Gate::H(0),
                Gate::H(1),
                Gate::CostPhase { u: 0, v: 1, phase: 1.0 },
                Gate::Rx { qubit: 0, theta: 0.5 },
                Gate::Rx { qubit: 1, theta: 0.5 },
            ]
        );
    }

    #[test]
    fn test_depth_zero_is_hadamards_only() {
        let spec = CircuitSpec::build(&WeightedGraph::triangle(), 0, &[]).unwrap();
        assert_eq!(spec.depth(), 0);
        assert_eq!(spec.gates().len(), 3);
    }

    #[test]
    fn test_qasm_output() {
        let spec = CircuitSpec::build(&WeightedGraph::path(2), 1, &[0.5, 0.25]).unwrap();
        let qasm = spec.to_qasm();

        assert!(qasm.starts_with("OPENQASM 3.0;"));
        assert!(qasm.contains("qubit[2] q;"));
        assert!(qasm.contains("rzz(-0.500000000000) q[0], q[1];"));
        assert!(qasm.contains("rx(0.500000000000) q[1];"));
        assert!(qasm.trim_end().ends_with("c = measure q;"));
    }
}
