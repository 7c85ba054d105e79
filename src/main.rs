//! boxresize CLI - shrink every image in a directory
//!
//! Writes `name_resized.ext` next to each JPEG, PNG and GIF found in the
//! directory, using a fixed pool of worker threads.

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::builder::RangedU64ValueParser;
use clap::Parser;
use console::style;
use tracing::info;

use boxresize::{
    enumerate_jobs, init_with_config, Config, ConsoleProgress, ProcessingEngine, ScaleFactor,
    WorkerPool,
};

/// boxresize - batch image downscaler
#[derive(Parser, Debug)]
#[command(
    name = "boxresize",
    version,
    about = "Resize all images in a directory by a scaling factor",
    long_about = "Resizes every .jpg, .jpeg, .png and .gif file in a directory with a 2x2 box \
                  filter and writes the result next to the original as name_resized.ext. Files \
                  that already carry the _resized marker are skipped, so re-running over the \
                  same directory is safe."
)]
struct Cli {
    /// Directory with images to resize
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    dir: PathBuf,

    /// Scaling factor value from (0.0 to 1.0)
    #[arg(
        short,
        long,
        value_name = "FACTOR",
        default_value = "0.5",
        value_parser = parse_scale_factor
    )]
    factor: ScaleFactor,

    /// Number of worker threads (default: from config, else 5)
    #[arg(
        short,
        long,
        value_name = "COUNT",
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    workers: Option<usize>,

    /// Configuration file path (.toml or .yaml)
    #[arg(short, long, value_name = "FILE", env = "BOXRESIZE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short = 'Q', long, conflicts_with = "verbose")]
    quiet: bool,
}

/// Parse a scaling factor, rejecting values outside (0.0, 1.0)
fn parse_scale_factor(s: &str) -> Result<ScaleFactor, String> {
    s.parse::<ScaleFactor>().map_err(|e| e.to_string())
}

fn main() {
    let cli = Cli::parse();

    // Library errors already carry their cause in the message
    if let Err(e) = run(&cli) {
        eprintln!("{}: {}", style("Error").red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Some(workers) = cli.workers {
        config.processing.workers = workers;
    }
    if cli.quiet {
        config.logging.level = "error".to_string();
    } else if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    config.validate()?;
    init_with_config(&config.logging)?;

    info!(
        "Resizing images in {} by {} with {} workers",
        cli.dir.display(),
        cli.factor,
        config.processing.workers
    );

    let start = Instant::now();
    let rule = "-".repeat(80);
    if !cli.quiet {
        println!("{}", rule);
    }

    let jobs = enumerate_jobs(&cli.dir, &config.processing)?;
    let engine = ProcessingEngine::new(cli.factor);
    let pool = WorkerPool::new(config.processing.workers)?;
    let progress = ConsoleProgress::new(jobs.len(), cli.quiet);

    let results = pool.run(jobs, &engine, &progress);
    progress.finish();
    let results = results?;

    if !cli.quiet {
        println!("{}", rule);
        println!("Resize images time: {:?}", start.elapsed());
    }
    info!("Resized {} images", results.len());

    Ok(())
}
