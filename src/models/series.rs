use serde::Serialize;

use crate::error::{ProcessingError, Result};
use crate::models::TemperatureRecord;

/// Time-ordered readings of exactly one city.
#[derive(Debug, Clone, PartialEq)]
pub struct CitySeries {
    city: String,
    records: Vec<TemperatureRecord>,
}

impl CitySeries {
    /// Build a series, stable-sorting by timestamp so equal timestamps keep
    /// their ingestion order.
    pub fn new(city: impl Into<String>, mut records: Vec<TemperatureRecord>) -> Result<Self> {
        let city = city.into();

        if let Some(stray) = records.iter().find(|r| r.city != city) {
            return Err(ProcessingError::InvalidFormat(format!(
                "Record for city '{}' found in series of '{}'",
                stray.city, city
            )));
        }

        if !is_time_ordered(&records) {
            records.sort_by_key(|r| r.timestamp);
        }

        Ok(Self { city, records })
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn records(&self) -> &[TemperatureRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn temperatures(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.temperature).collect()
    }
}

pub(crate) fn is_time_ordered(records: &[TemperatureRecord]) -> bool {
    records.windows(2).all(|w| w[0].timestamp <= w[1].timestamp)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzedRecord {
    pub record: TemperatureRecord,
    pub rolling_mean: Option<f64>,
    pub rolling_std: Option<f64>,
    pub anomaly: bool,
}

/// A city series with per-record rolling statistics and anomaly flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzedCitySeries {
    pub city: String,
    pub window: usize,
    pub records: Vec<AnalyzedRecord>,
}

impl AnalyzedCitySeries {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn anomalies(&self) -> impl Iterator<Item = &AnalyzedRecord> {
        self.records.iter().filter(|r| r.anomaly)
    }

    pub fn anomaly_count(&self) -> usize {
        self.anomalies().count()
    }

    pub fn temperatures(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.record.temperature).collect()
    }

    pub fn anomaly_flags(&self) -> Vec<bool> {
        self.records.iter().map(|r| r.anomaly).collect()
    }
}
