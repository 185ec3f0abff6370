use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::models::{NormalRange, RangeSource, Season, SeasonalReference, SeasonalStats};
use crate::utils::constants::{FALLBACK_STD, NORMAL_RANGE_SIGMA};

/// Derives the acceptable temperature band for a season, preferring analyzed
/// statistics and falling back to the static reference table.
pub struct NormalRangeResolver {
    reference: SeasonalReference,
    fallback_std: f64,
}

impl NormalRangeResolver {
    pub fn new(reference: SeasonalReference) -> Self {
        Self {
            reference,
            fallback_std: FALLBACK_STD,
        }
    }

    pub fn reference(&self) -> &SeasonalReference {
        &self.reference
    }

    /// Resolve the range for `city` in `season`.
    ///
    /// `stats` is used when it holds both a mean and a std for the season;
    /// otherwise the reference mean with the fixed fallback std applies.
    pub fn resolve(
        &self,
        city: &str,
        stats: Option<&SeasonalStats>,
        season: Season,
    ) -> Result<NormalRange> {
        if let Some(season_stats) = stats.map(|s| s.get(season)) {
            if let (Some(mean), Some(std)) = (season_stats.mean, season_stats.std) {
                return Ok(range_around(mean, std, season, RangeSource::Observed));
            }
            debug!(city, %season, "No observed statistics for season, using reference table");
        }

        let mean = self
            .reference
            .mean(city, season)
            .ok_or_else(|| ProcessingError::UnknownCity {
                city: city.to_string(),
            })?;

        Ok(range_around(
            mean,
            self.fallback_std,
            season,
            RangeSource::Reference,
        ))
    }
}

impl Default for NormalRangeResolver {
    fn default() -> Self {
        Self::new(SeasonalReference::builtin())
    }
}

/// `mean ± 2·std`; a zero std gives a single-point range.
pub fn range_around(mean: f64, std: f64, season: Season, source: RangeSource) -> NormalRange {
    let half_width = NORMAL_RANGE_SIGMA * std.abs();
    NormalRange {
        low: mean - half_width,
        high: mean + half_width,
        season,
        source,
    }
}
