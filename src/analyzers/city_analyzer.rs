use serde::Serialize;
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::models::series::is_time_ordered;
use crate::models::{
    AnalyzedCitySeries, AnalyzedRecord, CitySeries, Season, SeasonStats, SeasonalStats,
};
use crate::utils::constants::{ANOMALY_SIGMA, DEFAULT_WINDOW, MIN_WINDOW, STATS_DECIMALS};

/// Output of one city's analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityAnalysis {
    pub series: AnalyzedCitySeries,
    pub seasonal: SeasonalStats,
}

/// Rolling-window anomaly detection and seasonal aggregation for one city.
///
/// The analysis is a pure function of the series and the window size, which
/// is what lets the batch runner execute it in any order or on any thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CityAnalyzer {
    window: usize,
}

impl CityAnalyzer {
    pub fn new(window: usize) -> Result<Self> {
        if window < MIN_WINDOW {
            return Err(ProcessingError::InvalidWindow(window));
        }
        Ok(Self { window })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Analyze one city's series.
    ///
    /// A non-finite temperature fails with `MalformedRecord` whose `index` is
    /// the reading's position in the time-ordered series, not in the dataset.
    pub fn analyze(&self, series: &CitySeries) -> Result<CityAnalysis> {
        let city = series.city();

        if series.is_empty() {
            return Err(ProcessingError::EmptySeries {
                city: city.to_string(),
            });
        }

        let mut records = series.records().to_vec();
        if !is_time_ordered(&records) {
            records.sort_by_key(|r| r.timestamp);
        }

        if let Some((index, bad)) = records
            .iter()
            .enumerate()
            .find(|(_, r)| !r.is_valid_temperature())
        {
            return Err(ProcessingError::MalformedRecord {
                city: city.to_string(),
                index,
                timestamp: Some(bad.timestamp_string()),
                reason: format!("non-finite temperature {}", bad.temperature),
            });
        }

        let temperatures: Vec<f64> = records.iter().map(|r| r.temperature).collect();
        let rolling = rolling_stats(&temperatures, self.window);

        let mut seasonal_values: [Vec<f64>; 4] = Default::default();
        for record in &records {
            seasonal_values[record.season.index()].push(record.temperature);
        }

        let analyzed: Vec<AnalyzedRecord> = records
            .into_iter()
            .zip(rolling)
            .map(|(record, window_stats)| {
                let (rolling_mean, rolling_std) = window_stats.unzip();
                let anomaly = window_stats
                    .map(|(mean, std)| is_anomaly(record.temperature, mean, std))
                    .unwrap_or(false);

                AnalyzedRecord {
                    record,
                    rolling_mean,
                    rolling_std,
                    anomaly,
                }
            })
            .collect();

        let mut seasonal = SeasonalStats::new();
        for season in Season::ALL {
            seasonal.set(season, season_stats(&seasonal_values[season.index()]));
        }

        let series = AnalyzedCitySeries {
            city: city.to_string(),
            window: self.window,
            records: analyzed,
        };

        debug!(
            city,
            records = series.len(),
            anomalies = series.anomaly_count(),
            "City analysis complete"
        );

        Ok(CityAnalysis { series, seasonal })
    }
}

impl Default for CityAnalyzer {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
        }
    }
}

/// Two-sigma rule against the local window.
pub fn is_anomaly(temperature: f64, rolling_mean: f64, rolling_std: f64) -> bool {
    (temperature - rolling_mean).abs() > ANOMALY_SIGMA * rolling_std
}

/// Centered rolling (mean, sample std) over `window` consecutive values.
///
/// Position `i` covers `[i + offset + 1 - window, i + offset]` with
/// `offset = (window - 1) / 2`; positions where that range leaves the slice
/// yield `None`.
pub fn rolling_stats(values: &[f64], window: usize) -> Vec<Option<(f64, f64)>> {
    let offset = window.saturating_sub(1) / 2;

    (0..values.len())
        .map(|i| {
            let end = i + offset + 1;
            if window < MIN_WINDOW || end < window || end > values.len() {
                return None;
            }
            let slice = &values[end - window..end];
            let m = mean(slice);
            sample_std(slice, m).map(|s| (m, s))
        })
        .collect()
}

fn season_stats(values: &[f64]) -> SeasonStats {
    if values.is_empty() {
        return SeasonStats::default();
    }

    let m = mean(values);
    SeasonStats {
        mean: Some(round_to(m, STATS_DECIMALS)),
        std: sample_std(values, m).map(|s| round_to(s, STATS_DECIMALS)),
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (divisor `n - 1`); undefined below two values.
pub(crate) fn sample_std(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TemperatureRecord;
    use chrono::{Duration, NaiveDate};
    use pretty_assertions::assert_eq;

    fn daily_series(city: &str, temperatures: &[f64]) -> CitySeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let records = temperatures
            .iter()
            .enumerate()
            .map(|(i, t)| TemperatureRecord::new(city, start + Duration::days(i as i64), *t, None))
            .collect();
        CitySeries::new(city, records).unwrap()
    }

    fn wavy(n: usize) -> Vec<f64> {
        (0..n).map(|i| 10.0 + (i as f64 * 0.7).sin()).collect()
    }

    #[test]
    fn test_rejects_short_window() {
        assert!(matches!(
            CityAnalyzer::new(1),
            Err(ProcessingError::InvalidWindow(1))
        ));
        assert_eq!(CityAnalyzer::default().window(), 30);
    }

    #[test]
    fn test_spike_is_flagged_against_local_window() {
        let mut temps = wavy(40);
        let window = &temps[5..35];
        let local_mean = mean(window);
        let local_std = sample_std(window, local_mean).unwrap();
        temps[20] = local_mean + 10.0 * local_std;

        let analysis = CityAnalyzer::new(30)
            .unwrap()
            .analyze(&daily_series("Tokyo", &temps))
            .unwrap();
        let flags = analysis.series.anomaly_flags();

        assert!(flags[20]);
        for (i, flag) in flags.iter().enumerate() {
            if i != 20 {
                assert!(!flag, "position {} unexpectedly flagged", i);
            }
        }
    }

    #[test]
    fn test_edges_are_null_exactly_where_window_is_partial() {
        for window in 2..=9 {
            for n in 0..=15 {
                let stats = rolling_stats(&wavy(n), window);
                let offset = (window - 1) / 2;
                let leading = window - 1 - offset;

                for (i, value) in stats.iter().enumerate() {
                    let full = i >= leading && i + offset < n;
                    assert_eq!(value.is_some(), full, "n={} window={} i={}", n, window, i);
                }
            }
        }
    }

    #[test]
    fn test_thirty_day_window_alignment() {
        let stats = rolling_stats(&wavy(40), 30);
        let present: Vec<usize> = (0..40).filter(|i| stats[*i].is_some()).collect();
        assert_eq!(present, (15..=25).collect::<Vec<_>>());
    }

    #[test]
    fn test_anomaly_flags_match_recomputation() {
        let mut temps = wavy(60);
        temps[12] += 20.0;
        temps[40] -= 20.0;

        let analysis = CityAnalyzer::new(7)
            .unwrap()
            .analyze(&daily_series("Cairo", &temps))
            .unwrap();

        for r in &analysis.series.records {
            let expected = match (r.rolling_mean, r.rolling_std) {
                (Some(m), Some(s)) => (r.record.temperature - m).abs() > 2.0 * s,
                _ => false,
            };
            assert_eq!(r.anomaly, expected);
        }
        assert!(analysis.series.anomaly_count() > 0);
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let series = daily_series("Sydney", &wavy(50));
        let analyzer = CityAnalyzer::new(11).unwrap();

        let first = analyzer.analyze(&series).unwrap();
        let second = analyzer.analyze(&series).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.series.len(), series.len());
    }

    #[test]
    fn test_seasonal_stats_are_rounded_and_complete() {
        // 2023-01-01 .. 2023-01-05, all winter
        let series = daily_series("Oslo", &[-1.0, -2.0, -3.0, -4.0, -5.5]);
        let analysis = CityAnalyzer::default().analyze(&series).unwrap();

        let winter = analysis.seasonal.get(Season::Winter);
        assert_eq!(winter.mean, Some(-3.1));
        assert_eq!(winter.std, Some(1.75));
        for season in [Season::Spring, Season::Summer, Season::Autumn] {
            assert_eq!(analysis.seasonal.get(season), &SeasonStats::default());
        }
        assert!(analysis.series.records.iter().all(|r| r.rolling_mean.is_none()));
    }

    #[test]
    fn test_single_reading_season_has_no_std() {
        let series = daily_series("Oslo", &[4.0]);
        let analysis = CityAnalyzer::default().analyze(&series).unwrap();

        let winter = analysis.seasonal.get(Season::Winter);
        assert_eq!(winter.mean, Some(4.0));
        assert_eq!(winter.std, None);
    }

    #[test]
    fn test_empty_and_malformed_series() {
        let analyzer = CityAnalyzer::default();

        let empty = CitySeries::new("Lima", Vec::new()).unwrap();
        assert!(matches!(
            analyzer.analyze(&empty),
            Err(ProcessingError::EmptySeries { .. })
        ));

        let broken = daily_series("Lima", &[12.0, f64::NAN, 14.0]);
        match analyzer.analyze(&broken) {
            Err(ProcessingError::MalformedRecord { city, index, timestamp, .. }) => {
                assert_eq!(city, "Lima");
                assert_eq!(index, 1);
                assert_eq!(timestamp.as_deref(), Some("2023-01-02T00:00:00"));
            }
            other => panic!("expected malformed record, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_index_is_position_in_time_order() {
        let day = |d: u32| {
            NaiveDate::from_ymd_opt(2023, 1, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        };
        // Supplied latest first; the bad reading sorts to the end
        let records = vec![
            TemperatureRecord::new("Lima", day(3), f64::INFINITY, None),
            TemperatureRecord::new("Lima", day(1), 12.0, None),
            TemperatureRecord::new("Lima", day(2), 13.0, None),
        ];
        let series = CitySeries::new("Lima", records).unwrap();

        match CityAnalyzer::default().analyze(&series) {
            Err(ProcessingError::MalformedRecord { index, timestamp, .. }) => {
                assert_eq!(index, 2);
                assert_eq!(timestamp.as_deref(), Some("2023-01-03T00:00:00"));
            }
            other => panic!("expected malformed record, got {:?}", other),
        }
    }
}
