use crate::analyzers::{describe, season_for_date, CityAnalysis, CityAnalyzer, NormalRangeResolver};
use crate::cli::args::{Cli, Commands};
use crate::config::AnalysisConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{NormalRange, Season, SeasonalReference};
use crate::processors::{partition, BatchResult, BatchRunner};
use crate::readers::DatasetReader;
use crate::utils::progress::ProgressReporter;
use crate::writers::SeriesWriter;
use chrono::Local;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, Level};

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let config = AnalysisConfig::load(cli.config.as_deref())?;
    info!(?config, "Loaded configuration");

    match cli.command {
        Commands::Analyze {
            input,
            city,
            window,
            max_workers,
            season,
            temperature,
            output,
        } => {
            let config = config.with_overrides(window, max_workers)?;
            let season = season.unwrap_or_else(current_season);

            println!("Analyzing temperature data...");
            println!("Input file: {}", input.display());
            println!(
                "City: {}, Window: {}, Workers: {}",
                city, config.window, config.max_workers
            );

            let batch = run_batch_blocking(input, vec![city.clone()], config, cli.quiet).await?;
            print_timing(&batch);

            let analysis = batch
                .into_outcome(&city)
                .ok_or_else(|| ProcessingError::UnknownCity { city: city.clone() })??;

            print_city_report(&analysis);

            let resolver = NormalRangeResolver::default();
            match resolver.resolve(&city, Some(&analysis.seasonal), season) {
                Ok(range) => print_range_judgement(&range, temperature),
                Err(e) => println!("\nNo normal range available: {}", e),
            }

            if let Some(output) = output {
                SeriesWriter::new().write_path(&analysis.series, &output)?;
                println!("\nAnalyzed series written to {}", output.display());
            }
        }

        Commands::Compare {
            input,
            window,
            max_workers,
        } => {
            let config = config.with_overrides(window, max_workers)?;

            println!("Comparing sequential and parallel analysis...");
            println!("Input file: {}", input.display());
            println!("Window: {}, Workers: {}", config.window, config.max_workers);

            let batch = run_batch_blocking(input, Vec::new(), config, cli.quiet).await?;
            print_timing(&batch);

            println!("\nPer-city results:");
            for result in &batch.results {
                match &result.outcome {
                    Ok(analysis) => println!(
                        "  ✓ {}: {} records, {} anomalies",
                        result.city,
                        analysis.series.len(),
                        analysis.series.anomaly_count()
                    ),
                    Err(e) => println!("  ✗ {}: {}", result.city, e),
                }
            }
        }

        Commands::Range {
            city,
            season,
            input,
            reference,
            temperature,
        } => {
            let season = season.unwrap_or_else(current_season);
            let reference = match reference {
                Some(path) => SeasonalReference::from_json_path(&path)?,
                None => SeasonalReference::builtin(),
            };
            let resolver = NormalRangeResolver::new(reference);

            let analysis = match input {
                Some(path) => {
                    let analyzer = CityAnalyzer::new(config.window)?;
                    let city = city.clone();
                    Some(
                        tokio::task::spawn_blocking(move || {
                            analyze_single_city(&path, &city, analyzer)
                        })
                        .await??,
                    )
                }
                None => None,
            };

            let range = resolver.resolve(&city, analysis.as_ref().map(|a| &a.seasonal), season)?;
            println!("City: {}", city);
            print_range_judgement(&range, temperature);
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    if verbose {
        info!("Verbose logging enabled");
    }
    Ok(())
}

fn current_season() -> Season {
    season_for_date(&Local::now().date_naive())
}

/// Load the dataset and run both strategies off the async executor.
async fn run_batch_blocking(
    input: PathBuf,
    cities: Vec<String>,
    config: AnalysisConfig,
    quiet: bool,
) -> Result<BatchResult> {
    let analyzer = CityAnalyzer::new(config.window)?;
    let runner = BatchRunner::new(analyzer).with_max_workers(config.max_workers);

    tokio::task::spawn_blocking(move || {
        let progress = ProgressReporter::new(0, "Reading dataset...", quiet);
        let dataset = DatasetReader::new().read_path(&input)?;
        runner.run_batch(&dataset, &cities, Some(&progress))
    })
    .await?
}

fn analyze_single_city(path: &Path, city: &str, analyzer: CityAnalyzer) -> Result<CityAnalysis> {
    let dataset = DatasetReader::new().read_path(path)?;
    let groups = partition(&dataset)?;
    let group = groups
        .iter()
        .find(|g| g.city == city)
        .ok_or_else(|| ProcessingError::UnknownCity {
            city: city.to_string(),
        })?;

    BatchRunner::new(analyzer).analyze_group(group).outcome
}

fn print_timing(batch: &BatchResult) {
    println!("\n=== Parallelisation Study ===");
    println!("{}", batch.timing.summary());
    if let Ok(speedup) = batch.speedup() {
        println!("Conclusion: parallel analysis gives a {:.1}x speedup", speedup);
    }
    if !batch.strategies_agree {
        println!("⚠️  Sequential and parallel results differ");
    }
    let failures = batch.failures().count();
    if failures > 0 {
        println!("⚠️  {} cities failed analysis", failures);
    }
}

fn print_city_report(analysis: &CityAnalysis) {
    let series = &analysis.series;

    println!("\n=== {} ===", series.city);
    match describe(&series.city, &series.temperatures()) {
        Ok(stats) => println!("\nDescriptive statistics:\n{}", stats.table()),
        Err(e) => println!("\nDescriptive statistics unavailable: {}", e),
    }
    println!("Seasonal statistics:\n{}", analysis.seasonal.table());

    println!(
        "Anomalies: {} of {} records (window {})",
        series.anomaly_count(),
        series.len(),
        series.window
    );
    for (i, anomaly) in series.anomalies().take(10).enumerate() {
        println!(
            "  {}. {}: {:.1}°C (rolling mean {:.1}°C)",
            i + 1,
            anomaly.record.timestamp_string(),
            anomaly.record.temperature,
            anomaly.rolling_mean.unwrap_or(f64::NAN)
        );
    }
}

fn print_range_judgement(range: &NormalRange, temperature: Option<f64>) {
    println!("\n{}", range.summary());

    if let Some(t) = temperature {
        println!("Current temperature: {:.1} °C", t);
        if range.contains(t) {
            println!("✅ Temperature is within the normal range for the season");
        } else {
            println!("⚠️  Anomalous temperature for the current season!");
        }
    }
}
