use crate::analyzers::{CityAnalysis, CityAnalyzer};
use crate::error::{ProcessingError, Result};
use crate::models::{CitySeries, RawRecord};
use crate::utils::progress::ProgressReporter;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Per-city result: analysis on success, the reason otherwise.
pub type CityOutcome = Result<CityAnalysis>;

#[derive(Debug)]
pub struct CityResult {
    pub city: String,
    pub outcome: CityOutcome,
}

impl CityResult {
    /// Same city and the same outcome, comparing failures by message.
    pub fn matches(&self, other: &CityResult) -> bool {
        if self.city != other.city {
            return false;
        }
        match (&self.outcome, &other.outcome) {
            (Ok(a), Ok(b)) => a == b,
            (Err(a), Err(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

/// All raw rows of one city, with their dataset positions, in ingestion order.
#[derive(Debug, Clone)]
pub struct CityGroup<'a> {
    pub city: &'a str,
    pub rows: Vec<(usize, &'a RawRecord)>,
}

impl CityGroup<'_> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Wall-clock seconds spent by each strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatchTiming {
    pub sequential_elapsed: f64,
    pub parallel_elapsed: f64,
}

impl BatchTiming {
    pub fn speedup(&self) -> Result<f64> {
        let valid = |t: f64| t.is_finite() && t > 0.0;
        if !valid(self.parallel_elapsed) || !valid(self.sequential_elapsed) {
            return Err(ProcessingError::Timing {
                sequential: self.sequential_elapsed,
                parallel: self.parallel_elapsed,
            });
        }
        Ok(self.sequential_elapsed / self.parallel_elapsed)
    }

    pub fn summary(&self) -> String {
        let speedup = match self.speedup() {
            Ok(s) => format!("{:.1}x", s),
            Err(_) => "not measurable".to_string(),
        };
        format!(
            "Sequential: {:.3}s\nParallel:   {:.3}s\nSpeedup:    {}",
            self.sequential_elapsed, self.parallel_elapsed, speedup
        )
    }
}

#[derive(Debug)]
pub struct BatchResult {
    /// Outcomes of the parallel run, in city discovery order
    pub results: Vec<CityResult>,
    pub timing: BatchTiming,
    /// Whether both strategies produced identical per-city outcomes
    pub strategies_agree: bool,
}

impl BatchResult {
    pub fn get(&self, city: &str) -> Option<&CityOutcome> {
        self.results
            .iter()
            .find(|r| r.city == city)
            .map(|r| &r.outcome)
    }

    /// Take ownership of one city's outcome.
    pub fn into_outcome(self, city: &str) -> Option<CityOutcome> {
        self.results
            .into_iter()
            .find(|r| r.city == city)
            .map(|r| r.outcome)
    }

    pub fn speedup(&self) -> Result<f64> {
        self.timing.speedup()
    }

    pub fn successes(&self) -> impl Iterator<Item = (&str, &CityAnalysis)> {
        self.results
            .iter()
            .filter_map(|r| r.outcome.as_ref().ok().map(|a| (r.city.as_str(), a)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &ProcessingError)> {
        self.results
            .iter()
            .filter_map(|r| r.outcome.as_ref().err().map(|e| (r.city.as_str(), e)))
    }
}

/// Runs the city analysis over every city of a dataset twice, once in a plain
/// loop and once on a rayon pool, and times both.
pub struct BatchRunner {
    analyzer: CityAnalyzer,
    max_workers: usize,
}

impl BatchRunner {
    pub fn new(analyzer: CityAnalyzer) -> Self {
        Self {
            analyzer,
            max_workers: num_cpus::get(),
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn analyzer(&self) -> &CityAnalyzer {
        &self.analyzer
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Partition `dataset`, check that every requested city is present, then
    /// run both strategies.
    pub fn run_batch<S: AsRef<str>>(
        &self,
        dataset: &[RawRecord],
        cities: &[S],
        progress: Option<&ProgressReporter>,
    ) -> Result<BatchResult> {
        let groups = partition(dataset)?;

        if let Some(missing) = cities
            .iter()
            .map(|city| city.as_ref())
            .find(|city| !groups.iter().any(|g| g.city == *city))
        {
            return Err(ProcessingError::UnknownCity {
                city: missing.to_string(),
            });
        }

        info!(
            records = dataset.len(),
            cities = groups.len(),
            workers = self.max_workers,
            "Starting batch analysis"
        );

        if let Some(p) = progress {
            p.set_length(groups.len() as u64);
            p.set_message("Sequential analysis...");
        }

        let start = Instant::now();
        let sequential = self.run_sequential(&groups, progress);
        let sequential_elapsed = start.elapsed().as_secs_f64();
        debug!(elapsed = sequential_elapsed, "Sequential strategy finished");

        if let Some(p) = progress {
            p.reset();
            p.set_message("Parallel analysis...");
        }

        let start = Instant::now();
        let parallel = self.run_parallel(&groups, progress)?;
        let parallel_elapsed = start.elapsed().as_secs_f64();
        debug!(elapsed = parallel_elapsed, "Parallel strategy finished");

        let strategies_agree = sequential.len() == parallel.len()
            && sequential.iter().zip(&parallel).all(|(s, p)| s.matches(p));
        if !strategies_agree {
            warn!("Sequential and parallel strategies produced different results");
        }

        for result in &parallel {
            if let Err(e) = &result.outcome {
                warn!(city = %result.city, error = %e, "City analysis failed");
            }
        }

        if let Some(p) = progress {
            p.finish_with_message(&format!("Analyzed {} cities", groups.len()));
        }

        Ok(BatchResult {
            results: parallel,
            timing: BatchTiming {
                sequential_elapsed,
                parallel_elapsed,
            },
            strategies_agree,
        })
    }

    /// One city after another, in discovery order.
    pub fn run_sequential(
        &self,
        groups: &[CityGroup<'_>],
        progress: Option<&ProgressReporter>,
    ) -> Vec<CityResult> {
        let mut results = Vec::with_capacity(groups.len());
        for group in groups {
            results.push(self.analyze_group(group));
            if let Some(p) = progress {
                p.increment(1);
            }
        }
        results
    }

    /// All cities on a dedicated pool of `max_workers` threads. Pool setup and
    /// teardown happen inside this call.
    pub fn run_parallel(
        &self,
        groups: &[CityGroup<'_>],
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<CityResult>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;

        let results: Vec<CityResult> = pool.install(|| {
            groups
                .par_iter()
                .map(|group| {
                    let result = self.analyze_group(group);
                    if let Some(p) = progress {
                        p.increment(1);
                    }
                    result
                })
                .collect()
        });

        Ok(results)
    }

    /// Parse one city's rows and analyze them; the unit of work of both strategies.
    pub fn analyze_group(&self, group: &CityGroup<'_>) -> CityResult {
        let outcome = group
            .rows
            .iter()
            .map(|(index, raw)| raw.parse(*index))
            .collect::<Result<Vec<_>>>()
            .and_then(|records| CitySeries::new(group.city, records))
            .and_then(|series| self.analyzer.analyze(&series));

        CityResult {
            city: group.city.to_string(),
            outcome,
        }
    }
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new(CityAnalyzer::default())
    }
}

/// Group rows by city in order of first appearance, keeping each city's rows
/// in ingestion order. A row without a city aborts the whole batch.
pub fn partition(dataset: &[RawRecord]) -> Result<Vec<CityGroup<'_>>> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<CityGroup<'_>> = Vec::new();

    for (index, raw) in dataset.iter().enumerate() {
        let city = raw.city.as_str();
        if city.trim().is_empty() {
            return Err(ProcessingError::MalformedRecord {
                city: String::new(),
                index,
                timestamp: raw.timestamp.clone(),
                reason: "missing city".to_string(),
            });
        }

        let slot = *positions.entry(city).or_insert_with(|| {
            groups.push(CityGroup {
                city,
                rows: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].rows.push((index, raw));
    }

    debug!(cities = groups.len(), "Partitioned dataset");
    Ok(groups)
}
