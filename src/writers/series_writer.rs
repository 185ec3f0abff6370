use crate::error::Result;
use crate::models::temperature::format_timestamp;
use crate::models::{AnalyzedCitySeries, Season};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

#[derive(Serialize)]
struct SeriesRow<'a> {
    city: &'a str,
    timestamp: String,
    temperature: f64,
    season: Season,
    rolling_mean: Option<f64>,
    rolling_std: Option<f64>,
    anomaly: bool,
}

/// Writes an analyzed series as CSV for plotting; null rolling values become
/// empty cells.
pub struct SeriesWriter;

impl SeriesWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write_path(&self, series: &AnalyzedCitySeries, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        self.write_to(series, BufWriter::new(file))?;
        info!(
            rows = series.len(),
            "Wrote analyzed series for {} to {}",
            series.city,
            path.display()
        );
        Ok(())
    }

    pub fn write_to<W: Write>(&self, series: &AnalyzedCitySeries, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        for analyzed in &series.records {
            csv_writer.serialize(SeriesRow {
                city: &series.city,
                timestamp: format_timestamp(&analyzed.record.timestamp),
                temperature: analyzed.record.temperature,
                season: analyzed.record.season,
                rolling_mean: analyzed.rolling_mean,
                rolling_std: analyzed.rolling_std,
                anomaly: analyzed.anomaly,
            })?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

impl Default for SeriesWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalyzedRecord, TemperatureRecord};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample_series() -> AnalyzedCitySeries {
        let ts = NaiveDate::from_ymd_opt(2023, 8, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        AnalyzedCitySeries {
            city: "Mumbai".to_string(),
            window: 3,
            records: vec![
                AnalyzedRecord {
                    record: TemperatureRecord::new("Mumbai", ts, 31.5, None),
                    rolling_mean: None,
                    rolling_std: None,
                    anomaly: false,
                },
                AnalyzedRecord {
                    record: TemperatureRecord::new("Mumbai", ts, 33.0, None),
                    rolling_mean: Some(32.0),
                    rolling_std: Some(0.75),
                    anomaly: true,
                },
            ],
        }
    }

    #[test]
    fn test_write_series_csv() {
        let mut buffer = Vec::new();
        SeriesWriter::new().write_to(&sample_series(), &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "city,timestamp,temperature,season,rolling_mean,rolling_std,anomaly"
        );
        assert_eq!(lines[1], "Mumbai,2023-08-01T00:00:00,31.5,summer,,,false");
        assert_eq!(lines[2], "Mumbai,2023-08-01T00:00:00,33.0,summer,32.0,0.75,true");
    }

    #[test]
    fn test_write_path_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out").join("mumbai.csv");

        SeriesWriter::new().write_path(&sample_series(), &path).unwrap();
        assert!(path.exists());
    }
}
