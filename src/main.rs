use clap::Parser;
use temperature_monitor::cli::{run, Cli};
use temperature_monitor::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
