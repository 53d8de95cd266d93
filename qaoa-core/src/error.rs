//! Error types for the QAOA Max-Cut core
//!
//! Three families of failure:
//! - Validation errors (malformed graphs, bit-strings, parameter vectors)
//! - Sampler errors (the black-box sampler could not produce counts)
//! - Configuration errors (loading or validating a solver config)
//!
//! An exhausted optimizer budget is not an error; see
//! [`crate::optimizer::Termination`].

use thiserror::Error;

/// Result type alias for QAOA operations
pub type Result<T> = std::result::Result<T, QaoaError>;

/// Error type for every fallible operation in the crate
#[derive(Error, Debug)]
pub enum QaoaError {
    // ==========================================================================
    // Validation Errors
    // ==========================================================================
    /// Edge endpoint outside `0..n_nodes`
    #[error("Edge ({u}, {v}) references a node outside 0..{n_nodes}")]
    NodeOutOfRange { u: usize, v: usize, n_nodes: usize },

    /// Edge from a node to itself
    #[error("Self-loop on node {0} is not allowed")]
    SelfLoop(usize),

    /// Same node pair listed twice
    #[error("Duplicate edge ({u}, {v})")]
    DuplicateEdge { u: usize, v: usize },

    /// Edge weight negative, NaN or infinite
    #[error("Edge ({u}, {v}) has invalid weight {weight}")]
    InvalidWeight { u: usize, v: usize, weight: f64 },

    /// Bit-string length differs from the node count
    #[error("Bit-string '{bitstring}' has length {len}, graph has {n_nodes} nodes")]
    BitStringLength {
        bitstring: String,
        len: usize,
        n_nodes: usize,
    },

    /// Bit-string text contains characters other than '0' and '1'
    #[error("Invalid bit-string '{0}': expected only '0' and '1'")]
    InvalidBitString(String),

    /// Parameter vector does not hold 2·depth values
    #[error("Parameter vector {params:?} has length {len}, depth {depth} needs {expected}")]
    ParameterLength {
        params: Vec<f64>,
        len: usize,
        depth: usize,
        expected: usize,
    },

    /// Parameter vector contains NaN or infinite values
    #[error("Parameter vector {0:?} contains non-finite values")]
    NonFiniteParameters(Vec<f64>),

    /// Graph too large for the requested operation
    #[error("Graph with {n_nodes} nodes exceeds the limit of {limit} for {operation}")]
    TooManyNodes {
        n_nodes: usize,
        limit: usize,
        operation: &'static str,
    },

    // ==========================================================================
    // Sampler Errors
    // ==========================================================================
    /// Sampler failed to execute the circuit
    #[error("Sampler '{sampler}' failed: {message}")]
    SamplerFailed { sampler: String, message: String },

    /// Sampler rejected the circuit specification
    #[error("Invalid circuit: {0}")]
    InvalidCircuit(String),

    /// Sampler is temporarily unavailable
    #[error("Sampler '{0}' is unavailable, retry after {1} ms")]
    SamplerUnavailable(String, u64),

    /// Sampler returned an outcome of the wrong width
    #[error("Sampler outcome '{outcome}' has {len} bits, expected {expected}")]
    OutcomeWidth {
        outcome: String,
        len: usize,
        expected: usize,
    },

    /// Sampler counts do not add up to the requested shots
    #[error("Sampler returned {total} counts for {shots} shots")]
    ShotMismatch { total: u64, shots: u64 },

    /// Zero shots requested
    #[error("Shot count must be positive")]
    ZeroShots,

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Configuration value rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl QaoaError {
    /// Build a sampler failure
    pub fn sampler(sampler: impl Into<String>, message: impl Into<String>) -> Self {
        QaoaError::SamplerFailed {
            sampler: sampler.into(),
            message: message.into(),
        }
    }

    /// Check if the error is a transient sampler failure worth one retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, QaoaError::SamplerUnavailable(_, _))
    }

    /// Get suggested retry delay in milliseconds
    pub fn retry_delay(&self) -> Option<u64> {
        match self {
            QaoaError::SamplerUnavailable(_, delay) => Some(*delay),
            _ => None,
        }
    }

    /// Whether the error was raised by the sampler side of the boundary
    pub fn is_sampler_error(&self) -> bool {
        matches!(
            self,
            QaoaError::SamplerFailed { .. }
                | QaoaError::InvalidCircuit(_)
                | QaoaError::SamplerUnavailable(_, _)
                | QaoaError::OutcomeWidth { .. }
                | QaoaError::ShotMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        assert!(QaoaError::SamplerUnavailable("sim".into(), 10).is_retryable());
        assert!(!QaoaError::sampler("sim", "boom").is_retryable());
        assert!(!QaoaError::SelfLoop(0).is_retryable());
    }

    #[test]
    fn test_retry_delay() {
        assert_eq!(
            QaoaError::SamplerUnavailable("sim".into(), 250).retry_delay(),
            Some(250)
        );
        assert_eq!(QaoaError::ZeroShots.retry_delay(), None);
    }

    #[test]
    fn test_error_display() {
        let err = QaoaError::NodeOutOfRange {
            u: 0,
            v: 7,
            n_nodes: 3,
        };
        assert_eq!(
            err.to_string(),
            "Edge (0, 7) references a node outside 0..3"
        );

        let err = QaoaError::BitStringLength {
            bitstring: "01".into(),
            len: 2,
            n_nodes: 3,
        };
        assert!(err.to_string().contains("'01'"));
    }

    #[test]
    fn test_sampler_classification() {
        assert!(QaoaError::ShotMismatch { total: 3, shots: 4 }.is_sampler_error());
        assert!(QaoaError::InvalidCircuit("too wide".into()).is_sampler_error());
        assert!(!QaoaError::TooManyNodes {
            n_nodes: 30,
            limit: 20,
            operation: "exact max-cut",
        }
        .is_sampler_error());
        assert!(!QaoaError::InvalidConfig("x".into()).is_sampler_error());
    }
}
