// Entry point: parses targets, sets up logging and runs each figure pipeline.
use std::error::Error;

use clap::Parser;
use tracing::{Level, error, info};

use ringosc_figures::cli::{Args, Target};
use ringosc_figures::config::AppConfig;
use ringosc_figures::figures::{self, FigureContext};

fn init_logging(verbose: bool) {
    let level = if verbose { Level::INFO } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = AppConfig::load_or_default(&args.config);
    let ctx = FigureContext::new(config, &args);

    let mut failed = 0usize;
    for target in Target::expand(&args.targets) {
        info!("running {}", target.name());
        if let Err(err) = figures::run(target, &ctx) {
            error!("{} failed: {err}", target.name());
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(format!("{failed} target(s) failed").into());
    }
    Ok(())
}
