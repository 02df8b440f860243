/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
  #[error(transparent)]
  Core(#[from] bfa_core::Error),

  #[error(transparent)]
  Store(#[from] bfa_store::StoreError),

  #[error("Batch {batch_id} aborted by circuit breaker: {failures} failures in first {completed} probes")]
  CircuitBreaker { batch_id: String, failures: usize, completed: usize },

  #[error("Batch {batch_id} finished with {failures} probe failures (first: {first})")]
  BatchFailures { batch_id: String, failures: usize, first: String },

  #[error("Configuration error: {0}")]
  Config(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_circuit_breaker_display() {
    let err = PipelineError::CircuitBreaker {
      batch_id: "a1b2c3d4".to_string(),
      failures: 5,
      completed: 8,
    };
    assert_eq!(
      err.to_string(),
      "Batch a1b2c3d4 aborted by circuit breaker: 5 failures in first 8 probes"
    );
  }

  #[test]
  fn test_batch_failures_display_carries_first_cause() {
    let err = PipelineError::BatchFailures {
      batch_id: "a1b2c3d4".to_string(),
      failures: 2,
      first: "BTCUSDT 2024-06-01: Request timed out for https://x".to_string(),
    };
    assert!(err.to_string().contains("2 probe failures"));
    assert!(err.to_string().contains("BTCUSDT 2024-06-01"));
  }

  #[test]
  fn test_core_error_is_transparent() {
    let err = PipelineError::from(bfa_core::Error::Config("bad".to_string()));
    assert_eq!(err.to_string(), "Configuration error: bad");
  }
}
