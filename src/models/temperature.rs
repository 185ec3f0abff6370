use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::analyzers::season::season_for_date;
use crate::error::{ProcessingError, Result};

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter = 0,
    Spring = 1,
    Summer = 2,
    Autumn = 3,
}

impl Season {
    /// Canonical reporting order
    pub const ALL: [Season; 4] = [
        Season::Winter,
        Season::Spring,
        Season::Summer,
        Season::Autumn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "winter" => Ok(Season::Winter),
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "autumn" => Ok(Season::Autumn),
            other => Err(ProcessingError::InvalidFormat(format!(
                "Unknown season '{}'",
                other
            ))),
        }
    }
}

/// A single validated daily reading for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRecord {
    pub city: String,
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub season: Season,
}

impl TemperatureRecord {
    /// Build a record, labelling it from the timestamp month when no season is given.
    pub fn new(
        city: impl Into<String>,
        timestamp: NaiveDateTime,
        temperature: f64,
        season: Option<Season>,
    ) -> Self {
        Self {
            city: city.into(),
            timestamp,
            temperature,
            season: season.unwrap_or_else(|| season_for_date(&timestamp)),
        }
    }

    pub fn is_valid_temperature(&self) -> bool {
        self.temperature.is_finite()
    }

    pub fn timestamp_string(&self) -> String {
        format_timestamp(&self.timestamp)
    }
}

/// One dataset row as ingested, before any field is interpreted.
///
/// Fields stay textual so a bad row can be reported against its city instead
/// of failing the whole ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub temperature: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
}

impl RawRecord {
    pub fn new(city: impl Into<String>, timestamp: &str, temperature: f64) -> Self {
        Self {
            city: city.into(),
            timestamp: Some(timestamp.to_string()),
            temperature: Some(temperature.to_string()),
            season: None,
        }
    }

    pub fn with_season(mut self, season: Season) -> Self {
        self.season = Some(season.as_str().to_string());
        self
    }

    /// Interpret the row; `index` is its position in the source dataset.
    pub fn parse(&self, index: usize) -> Result<TemperatureRecord> {
        let malformed = |reason: String| ProcessingError::MalformedRecord {
            city: self.city.clone(),
            index,
            timestamp: self.timestamp.clone(),
            reason,
        };

        let raw_timestamp = self
            .timestamp
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| malformed("missing timestamp".to_string()))?;
        let timestamp = parse_timestamp(raw_timestamp)
            .map_err(|e| malformed(format!("unparsable timestamp: {}", e)))?;

        let raw_temperature = self
            .temperature
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| malformed("missing temperature".to_string()))?;
        let temperature: f64 = raw_temperature
            .parse()
            .map_err(|_| malformed(format!("unparsable temperature '{}'", raw_temperature)))?;
        if !temperature.is_finite() {
            return Err(malformed(format!("non-finite temperature {}", temperature)));
        }

        let season = match self.season.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => Some(
                s.parse::<Season>()
                    .map_err(|e| malformed(e.to_string()))?,
            ),
            _ => None,
        };

        Ok(TemperatureRecord::new(
            self.city.clone(),
            timestamp,
            temperature,
            season,
        ))
    }
}

/// Parse an ISO-8601 style timestamp; a bare date means midnight.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_utc());
    }

    for format in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }

    let date = NaiveDate::parse_from_str(value, DATE_FORMAT)?;
    date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("Invalid date: {}", value)))
}

pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_season_parsing_is_case_insensitive() {
        assert_eq!("Winter".parse::<Season>().unwrap(), Season::Winter);
        assert_eq!(" SUMMER ".parse::<Season>().unwrap(), Season::Summer);
        assert_eq!("autumn".parse::<Season>().unwrap(), Season::Autumn);
        assert!("fall".parse::<Season>().is_err());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let midnight = NaiveDate::from_ymd_opt(2023, 7, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        assert_eq!(parse_timestamp("2023-07-15").unwrap(), midnight);
        assert_eq!(parse_timestamp("2023-07-15T00:00:00").unwrap(), midnight);
        assert_eq!(parse_timestamp("2023-07-15 00:00:00").unwrap(), midnight);
        assert_eq!(parse_timestamp("2023-07-15T02:00:00+02:00").unwrap(), midnight);
        assert!(parse_timestamp("15/07/2023").is_err());
    }

    #[test]
    fn test_raw_record_derives_season_when_absent() {
        let record = RawRecord::new("Moscow", "2023-01-10", -12.5).parse(0).unwrap();
        assert_eq!(record.season, Season::Winter);
        assert_eq!(record.temperature, -12.5);

        let labelled = RawRecord::new("Moscow", "2023-01-10", -12.5)
            .with_season(Season::Spring)
            .parse(0)
            .unwrap();
        assert_eq!(labelled.season, Season::Spring);
    }

    #[test]
    fn test_raw_record_reports_malformed_fields() {
        let mut raw = RawRecord::new("Paris", "2023-03-01", 10.0);
        raw.temperature = Some("warm".to_string());

        match raw.parse(7) {
            Err(ProcessingError::MalformedRecord { city, index, timestamp, .. }) => {
                assert_eq!(city, "Paris");
                assert_eq!(index, 7);
                assert_eq!(timestamp.as_deref(), Some("2023-03-01"));
            }
            other => panic!("expected malformed record, got {:?}", other),
        }

        raw.temperature = Some("10.0".to_string());
        raw.timestamp = None;
        assert!(matches!(
            raw.parse(3),
            Err(ProcessingError::MalformedRecord { index: 3, .. })
        ));

        let mut bad_season = RawRecord::new("Paris", "2023-03-01", 10.0);
        bad_season.season = Some("monsoon".to_string());
        assert!(bad_season.parse(0).is_err());
    }
}
