//! Bounded Ring Buffer
//!
//! Fixed-capacity FIFO of recent raw predictions. Appends and statistics are
//! taken under one lock so concurrent requests never observe an over-length
//! history or lose an update.

mod buffer;

pub use buffer::{HistoryBuffer, DEFAULT_CAPACITY};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Summary statistics over the buffered values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    /// Number of values summarized
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
}

impl HistoryStats {
    /// Compute over a slice of values; `None` when empty
    pub fn compute<'a>(values: impl IntoIterator<Item = &'a f64>) -> Option<Self> {
        let values: Vec<f64> = values.into_iter().copied().collect();
        if values.is_empty() {
            return None;
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;

        Some(Self {
            count: values.len(),
            mean,
            std_dev: variance.sqrt(),
        })
    }
}

/// Ring buffer errors
#[derive(Debug, Error)]
pub enum BufferError {
    #[error("Capacity must be greater than zero")]
    ZeroCapacity,
    #[error("History lock poisoned")]
    Poisoned,
}
