use crate::error::{ProcessingError, Result};
use crate::models::RawRecord;
use crate::utils::constants::REQUIRED_COLUMNS;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Reads a multi-city temperature CSV (`city,timestamp,temperature[,season]`).
///
/// Rows are kept unparsed; interpretation and error attribution happen per
/// city during analysis.
pub struct DatasetReader {
    delimiter: u8,
}

impl DatasetReader {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    pub fn read_path(&self, path: &Path) -> Result<Vec<RawRecord>> {
        debug!("Reading dataset: {}", path.display());
        let file = File::open(path)?;
        let records = self.read_from(file)?;
        info!(rows = records.len(), "Loaded dataset from {}", path.display());
        Ok(records)
    }

    pub fn read_from<R: Read>(&self, reader: R) -> Result<Vec<RawRecord>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| !headers.iter().any(|h| h.eq_ignore_ascii_case(column)))
            .collect();
        if !missing.is_empty() {
            return Err(ProcessingError::InvalidFormat(format!(
                "Dataset is missing required columns: {}",
                missing.join(", ")
            )));
        }

        // Field names are matched exactly by serde; normalise header case first.
        let normalised: csv::StringRecord =
            headers.iter().map(|h| h.to_ascii_lowercase()).collect();
        csv_reader.set_headers(normalised);

        let mut records = Vec::new();
        for row in csv_reader.deserialize::<RawRecord>() {
            records.push(row?);
        }

        Ok(records)
    }
}

impl Default for DatasetReader {
    fn default() -> Self {
        Self::new()
    }
}
