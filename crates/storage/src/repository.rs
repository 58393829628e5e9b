//! Repository Implementation

use crate::StorageError;
use feature_defaults::Subsystem;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

pub const DEFAULT_MAX_RECORDS: usize = 1000;

/// One logged prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Assigned on insert
    pub id: u64,
    pub timestamp_ms: u64,
    pub subsystem: Subsystem,
    /// Model output before display rescaling
    pub raw_rul: f64,
    pub predicted_rul: f64,
    pub model_version: String,
    pub health: String,
}

impl PredictionRecord {
    /// New record stamped with the current time; the id is set by the repository
    pub fn new(
        subsystem: Subsystem,
        raw_rul: f64,
        predicted_rul: f64,
        model_version: impl Into<String>,
        health: impl Into<String>,
    ) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self {
            id: 0,
            timestamp_ms,
            subsystem,
            raw_rul,
            predicted_rul,
            model_version: model_version.into(),
            health: health.into(),
        }
    }
}

struct Log {
    records: VecDeque<PredictionRecord>,
    next_id: u64,
}

/// In-memory prediction repository
pub struct Repository {
    log: Mutex<Log>,
    max_records: usize,
}

impl Repository {
    pub fn new() -> Self {
        Self::build(DEFAULT_MAX_RECORDS)
    }

    /// Repository keeping at most `max_records` entries
    pub fn with_max_records(max_records: usize) -> Result<Self, StorageError> {
        if max_records == 0 {
            return Err(StorageError::ZeroRetention);
        }
        Ok(Self::build(max_records))
    }

    fn build(max_records: usize) -> Self {
        info!("Creating in-memory prediction log (retention {})", max_records);
        Self {
            log: Mutex::new(Log {
                records: VecDeque::with_capacity(max_records.min(1024)),
                next_id: 1,
            }),
            max_records,
        }
    }

    /// Insert a prediction, evicting the oldest when full. Returns the assigned id.
    pub fn insert_prediction(&self, mut record: PredictionRecord) -> Result<u64, StorageError> {
        let mut log = self
            .log
            .lock()
            .map_err(|e| StorageError::LockError(e.to_string()))?;

        record.id = log.next_id;
        log.next_id += 1;

        // Enforce retention
        while log.records.len() >= self.max_records {
            log.records.pop_front();
        }

        let id = record.id;
        log.records.push_back(record);
        debug!("Inserted prediction with ID {}", id);

        Ok(id)
    }

    /// Most recent predictions first, optionally for one subsystem
    pub fn get_predictions(
        &self,
        subsystem: Option<Subsystem>,
        limit: usize,
    ) -> Result<Vec<PredictionRecord>, StorageError> {
        let log = self
            .log
            .lock()
            .map_err(|e| StorageError::LockError(e.to_string()))?;

        Ok(log
            .records
            .iter()
            .rev()
            .filter(|r| subsystem.map_or(true, |s| r.subsystem == s))
            .take(limit)
            .cloned()
            .collect())
    }

    pub fn prediction_count(&self) -> usize {
        self.log.lock().map(|l| l.records.len()).unwrap_or(0)
    }

    pub fn max_records(&self) -> usize {
        self.max_records
    }

    /// Clear all records (ids keep increasing)
    pub fn clear(&self) {
        if let Ok(mut log) = self.log.lock() {
            log.records.clear();
        }
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(subsystem: Subsystem, raw: f64) -> PredictionRecord {
        PredictionRecord::new(subsystem, raw, raw, "v1", "optimal")
    }

    #[test]
    fn test_prediction_insert() {
        let repo = Repository::new();

        let id = repo.insert_prediction(record(Subsystem::Engine, 112.0)).unwrap();
        assert_eq!(id, 1);

        let preds = repo.get_predictions(None, 10).unwrap();
        assert_eq!(preds.len(), 1);
        assert_eq!(preds[0].raw_rul, 112.0);
        assert!(preds[0].timestamp_ms > 0);
    }

    #[test]
    fn test_filter_and_order() {
        let repo = Repository::new();
        repo.insert_prediction(record(Subsystem::Engine, 1.0)).unwrap();
        repo.insert_prediction(record(Subsystem::Hydraulics, 2.0)).unwrap();
        repo.insert_prediction(record(Subsystem::Engine, 3.0)).unwrap();

        let engine = repo.get_predictions(Some(Subsystem::Engine), 10).unwrap();
        assert_eq!(engine.iter().map(|r| r.raw_rul).collect::<Vec<_>>(), vec![3.0, 1.0]);

        let latest = repo.get_predictions(None, 1).unwrap();
        assert_eq!(latest[0].id, 3);
    }

    #[test]
    fn test_retention_limit() {
        let repo = Repository::with_max_records(5).unwrap();

        for i in 0..10 {
            repo.insert_prediction(record(Subsystem::LandingGear, i as f64)).unwrap();
        }

        assert_eq!(repo.prediction_count(), 5);
        let all = repo.get_predictions(None, 100).unwrap();
        assert_eq!(all.last().map(|r| r.id), Some(6));
    }

    #[test]
    fn test_zero_retention_rejected() {
        assert!(matches!(Repository::with_max_records(0), Err(StorageError::ZeroRetention)));
    }

    #[test]
    fn test_clear_keeps_ids_monotonic() {
        let repo = Repository::new();
        repo.insert_prediction(record(Subsystem::Engine, 1.0)).unwrap();
        repo.clear();
        assert_eq!(repo.prediction_count(), 0);
        assert_eq!(repo.insert_prediction(record(Subsystem::Engine, 1.0)).unwrap(), 2);
    }

    #[test]
    fn test_record_serializes_subsystem_name() {
        let json = serde_json::to_value(record(Subsystem::LandingGear, 1.0)).unwrap();
        assert_eq!(json["subsystem"], "landing_gear");
    }
}
