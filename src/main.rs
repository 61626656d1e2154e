mod app;
mod cli;
mod error;
mod estimate;
mod format;
mod prompt;
mod settings;
mod speedtest;
mod spinner;
mod units;

use anyhow::Result;
use app::EstimateArgs;
use clap::Parser;
use cli::Cli;
use simple_logger::SimpleLogger;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    SimpleLogger::new()
        .with_level(cli.log_level())
        .env()
        .init()?;

    let estimate = cli.size.map(|size| EstimateArgs {
        size,
        unit: cli.unit,
        direction: cli.direction,
    });

    if let Err(e) = app::run(cli.settings(), estimate).await {
        println!("{}", app::failure_line(&e));
        std::process::exit(1);
    }

    Ok(())
}
