use crate::analyzers::city_analyzer::{mean, round_to, sample_std};
use crate::error::{ProcessingError, Result};
use crate::models::DescriptiveStats;
use crate::utils::constants::STATS_DECIMALS;

/// Count, mean, std, quartiles and extremes of a city's raw temperatures.
pub fn describe(city: &str, temperatures: &[f64]) -> Result<DescriptiveStats> {
    if temperatures.is_empty() {
        return Err(ProcessingError::EmptySeries {
            city: city.to_string(),
        });
    }

    let mut values = temperatures.to_vec();
    values.sort_by(f64::total_cmp);

    let m = mean(&values);
    let round = |v: f64| round_to(v, STATS_DECIMALS);

    Ok(DescriptiveStats {
        count: values.len(),
        mean: round(m),
        std: sample_std(&values, m).map(round),
        min: round(values[0]),
        q25: round(quantile(&values, 0.25)),
        median: round(quantile(&values, 0.5)),
        q75: round(quantile(&values, 0.75)),
        max: round(values[values.len() - 1]),
    })
}

/// Linear interpolation between closest ranks over sorted values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}
