//! Cut assignments as bit-strings
//!
//! Position `i` of a [`BitString`] is node `i`. This is the only ordering
//! used inside the crate; samplers that report outcomes in a different
//! order are corrected once at the sampler boundary
//! (see [`crate::sampler::BitOrder`]).
//!
//! The textual form lists bits in node order, so `"011"` places node 0 in
//! partition 0 and nodes 1 and 2 in partition 1.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{QaoaError, Result};

/// One partition assignment per node
///
/// Ordering is lexical on the textual form, which for equal lengths is
/// the same as ordering the bit vectors element by element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BitString {
    bits: Vec<bool>,
}

impl BitString {
    /// Create from explicit bits in node order
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// All nodes in partition 0
    pub fn zeros(n: usize) -> Self {
        Self {
            bits: vec![false; n],
        }
    }

    /// Decode the low `n` bits of `index`, bit `i` of the integer being node `i`
    pub fn from_index(index: usize, n: usize) -> Self {
        Self {
            bits: (0..n).map(|i| (index >> i) & 1 == 1).collect(),
        }
    }

    /// Number of bits
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// True for the zero-node bit-string
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Partition of node `i`
    pub fn bit(&self, i: usize) -> bool {
        self.bits[i]
    }

    /// Bits in node order
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Flip every bit (the same cut, partitions swapped)
    pub fn complement(&self) -> Self {
        Self {
            bits: self.bits.iter().map(|b| !b).collect(),
        }
    }

    /// Reverse the bit order
    pub fn reversed(&self) -> Self {
        let mut bits = self.bits.clone();
        bits.reverse();
        Self { bits }
    }

    /// Check the length against a node count
    pub fn check_len(&self, n_nodes: usize) -> Result<()> {
        if self.bits.len() != n_nodes {
            return Err(QaoaError::BitStringLength {
                bitstring: self.to_string(),
                len: self.bits.len(),
                n_nodes,
            });
        }
        Ok(())
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.bits {
            f.write_str(if b { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for BitString {
    type Err = QaoaError;

    fn from_str(s: &str) -> Result<Self> {
        let bits = s
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(QaoaError::InvalidBitString(s.to_string())),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { bits })
    }
}

impl Serialize for BitString {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BitString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
