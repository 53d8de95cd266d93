//! Single retry with backoff at the sampler boundary
//!
//! Only errors that [`QaoaError::is_retryable`] accepts are retried, and at
//! most `max_retries` times. Everything else passes through untouched so a
//! failing sampler still aborts the solve.

use std::thread;
use std::time::Duration;

use tracing::warn;

use super::{BitOrder, RawCounts, Sampler};
use crate::circuit::CircuitSpec;
use crate::error::{QaoaError, Result};

/// Default backoff when the error carries no delay hint
pub const DEFAULT_BACKOFF_MS: u64 = 100;

/// Wraps a sampler and retries transient failures
#[derive(Debug, Clone)]
pub struct RetryingSampler<S> {
    inner: S,
    max_retries: usize,
    backoff: Duration,
}

impl<S: Sampler> RetryingSampler<S> {
    /// One retry with the default backoff
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            max_retries: 1,
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
        }
    }

    /// Set the retry budget (0 disables retrying)
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the fallback backoff
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    fn delay_for(&self, err: &QaoaError, attempt: usize) -> Duration {
        let base = err
            .retry_delay()
            .map(Duration::from_millis)
            .unwrap_or(self.backoff);
        // Linear growth per attempt
        base * attempt as u32
    }
}

impl<S: Sampler> Sampler for RetryingSampler<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn bit_order(&self) -> BitOrder {
        self.inner.bit_order()
    }

    fn sample(&mut self, circuit: &CircuitSpec, shots: u64) -> Result<RawCounts> {
        let mut attempt = 0;
        loop {
            match self.inner.sample(circuit, shots) {
                Ok(counts) => return Ok(counts),
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.delay_for(&err, attempt);
                    warn!(
                        sampler = self.inner.name(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "sampler unavailable, retrying"
                    );
                    thread::sleep(delay);
                }
                Err(err) => return Err(err),
            }
        }
    }
}
