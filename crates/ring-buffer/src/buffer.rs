//! Mutex-guarded bounded FIFO

use crate::{BufferError, HistoryStats};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Default history capacity
pub const DEFAULT_CAPACITY: usize = 100;

/// Bounded FIFO of raw prediction values
pub struct HistoryBuffer {
    /// Stored values, oldest at the front
    values: Mutex<VecDeque<f64>>,
    /// Maximum number of values retained
    capacity: usize,
    /// Total values ever appended (for statistics)
    total_written: AtomicUsize,
}

impl HistoryBuffer {
    /// Create a new buffer with given capacity
    pub fn new(capacity: usize) -> Result<Self, BufferError> {
        if capacity == 0 {
            return Err(BufferError::ZeroCapacity);
        }
        Ok(Self {
            values: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            total_written: AtomicUsize::new(0),
        })
    }

    /// Create a buffer with default capacity (100 values)
    pub fn with_default_capacity() -> Self {
        Self {
            values: Mutex::new(VecDeque::with_capacity(DEFAULT_CAPACITY)),
            capacity: DEFAULT_CAPACITY,
            total_written: AtomicUsize::new(0),
        }
    }

    /// Append a value, evicting the oldest when full. Returns the evicted value.
    pub fn push(&self, value: f64) -> Result<Option<f64>, BufferError> {
        let mut values = self.values.lock().map_err(|_| BufferError::Poisoned)?;
        Ok(self.push_locked(&mut values, value))
    }

    /// Append a value and summarize the resulting history in one critical section
    pub fn push_and_stats(&self, value: f64) -> Result<HistoryStats, BufferError> {
        let mut values = self.values.lock().map_err(|_| BufferError::Poisoned)?;
        self.push_locked(&mut values, value);
        // non-empty after push
        Ok(HistoryStats::compute(values.iter()).unwrap_or(HistoryStats {
            count: 1,
            mean: value,
            std_dev: 0.0,
        }))
    }

    fn push_locked(&self, values: &mut VecDeque<f64>, value: f64) -> Option<f64> {
        let evicted = if values.len() >= self.capacity {
            values.pop_front()
        } else {
            None
        };
        values.push_back(value);
        self.total_written.fetch_add(1, Ordering::Relaxed);
        evicted
    }

    /// Copy of the contents, oldest first
    pub fn snapshot(&self) -> Vec<f64> {
        self.values
            .lock()
            .map(|v| v.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Get the number of values currently buffered
    pub fn len(&self) -> usize {
        self.values.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get total values ever appended
    pub fn total_written(&self) -> usize {
        self.total_written.load(Ordering::Relaxed)
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}
