use serde::Serialize;
use std::fmt;

use crate::models::Season;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SeasonStats {
    pub mean: Option<f64>,
    pub std: Option<f64>,
}

impl SeasonStats {
    pub fn new(mean: f64, std: f64) -> Self {
        Self {
            mean: Some(mean),
            std: Some(std),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.mean.is_some() && self.std.is_some()
    }
}

/// Per-season mean/std, always holding all four seasons in canonical order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeasonalStats {
    stats: [SeasonStats; 4],
}

impl SeasonalStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_season(mut self, season: Season, stats: SeasonStats) -> Self {
        self.set(season, stats);
        self
    }

    pub fn get(&self, season: Season) -> &SeasonStats {
        &self.stats[season.index()]
    }

    pub fn set(&mut self, season: Season, stats: SeasonStats) {
        self.stats[season.index()] = stats;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Season, &SeasonStats)> {
        Season::ALL.iter().map(move |s| (*s, self.get(*s)))
    }

    pub fn table(&self) -> String {
        let mut table = format!("{:<8} {:>8} {:>8}\n", "season", "mean", "std");
        for (season, stats) in self.iter() {
            table.push_str(&format!(
                "{:<8} {:>8} {:>8}\n",
                season.as_str(),
                fmt_optional(stats.mean),
                fmt_optional(stats.std)
            ));
        }
        table
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeSource {
    /// Derived from analyzed seasonal statistics
    Observed,
    /// Derived from the static reference table
    Reference,
}

impl fmt::Display for RangeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeSource::Observed => f.write_str("uploaded data"),
            RangeSource::Reference => f.write_str("built-in reference data"),
        }
    }
}

/// Acceptable temperature band for one season.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalRange {
    pub low: f64,
    pub high: f64,
    pub season: Season,
    pub source: RangeSource,
}

impl NormalRange {
    pub fn contains(&self, temperature: f64) -> bool {
        (self.low..=self.high).contains(&temperature)
    }

    pub fn summary(&self) -> String {
        format!(
            "Normal range ({}): {:.1} … {:.1} °C (based on {})",
            self.season, self.low, self.high, self.source
        )
    }
}

/// Summary statistics of one city's raw temperatures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl DescriptiveStats {
    pub fn table(&self) -> String {
        format!(
            "count {:>8}\n\
            mean  {:>8.2}\n\
            std   {:>8}\n\
            min   {:>8.2}\n\
            25%   {:>8.2}\n\
            50%   {:>8.2}\n\
            75%   {:>8.2}\n\
            max   {:>8.2}\n",
            self.count,
            self.mean,
            fmt_optional(self.std),
            self.min,
            self.q25,
            self.median,
            self.q75,
            self.max
        )
    }
}

fn fmt_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seasonal_stats_keeps_canonical_order() {
        let stats = SeasonalStats::new()
            .with_season(Season::Autumn, SeasonStats::new(12.0, 3.0))
            .with_season(Season::Winter, SeasonStats::new(-1.0, 2.5));

        let seasons: Vec<Season> = stats.iter().map(|(s, _)| s).collect();
        assert_eq!(seasons, Season::ALL.to_vec());
        assert_eq!(stats.get(Season::Spring), &SeasonStats::default());
        assert!(stats.get(Season::Autumn).is_complete());
    }

    #[test]
    fn test_normal_range_bounds_are_inclusive() {
        let range = NormalRange {
            low: -11.0,
            high: 1.0,
            season: Season::Winter,
            source: RangeSource::Observed,
        };

        assert!(range.contains(-11.0));
        assert!(range.contains(1.0));
        assert!(!range.contains(1.5));
        assert!(range.summary().contains("uploaded data"));
    }
}
