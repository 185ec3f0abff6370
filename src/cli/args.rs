use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::Season;

#[derive(Parser)]
#[command(name = "temperature-monitor")]
#[command(about = "Seasonal temperature anomaly analysis with a sequential vs parallel comparison")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Hide progress indicators")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Configuration file (TOML)")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze one city from a dataset and compare execution strategies
    Analyze {
        #[arg(short, long, help = "Input CSV with city,timestamp,temperature[,season]")]
        input: PathBuf,

        #[arg(short, long)]
        city: String,

        #[arg(short, long, help = "Rolling window size [default: 30]")]
        window: Option<usize>,

        #[arg(long, help = "Parallel worker count [default: all cores]")]
        max_workers: Option<usize>,

        #[arg(short, long, help = "Season to judge against [default: current]")]
        season: Option<Season>,

        #[arg(short, long, allow_hyphen_values = true, help = "Live temperature reading to judge (°C)")]
        temperature: Option<f64>,

        #[arg(short, long, help = "Write the analyzed series to this CSV file")]
        output: Option<PathBuf>,
    },

    /// Time sequential vs parallel analysis over every city in a dataset
    Compare {
        #[arg(short, long, help = "Input CSV with city,timestamp,temperature[,season]")]
        input: PathBuf,

        #[arg(short, long, help = "Rolling window size [default: 30]")]
        window: Option<usize>,

        #[arg(long, help = "Parallel worker count [default: all cores]")]
        max_workers: Option<usize>,
    },

    /// Show the normal temperature range for a city and season
    Range {
        #[arg(short, long)]
        city: String,

        #[arg(short, long, help = "Season [default: current]")]
        season: Option<Season>,

        #[arg(short, long, help = "Derive the range from this dataset instead of reference data")]
        input: Option<PathBuf>,

        #[arg(short, long, help = "Reference table JSON replacing the built-in one")]
        reference: Option<PathBuf>,

        #[arg(short, long, allow_hyphen_values = true, help = "Live temperature reading to judge (°C)")]
        temperature: Option<f64>,
    },
}
