mod database;
mod error;
mod pipeline;
mod remote;
mod tagging;
mod utils;

use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, Level};

use crate::database::repo::PixivDatabase;
use crate::pipeline::executor::{ThreadSleeper, DEFAULT_MAX_RETRIES};
use crate::pipeline::results::{self, Outcome};
use crate::pipeline::runner::ReconciliationPipeline;
use crate::remote::lanraragi::LanraragiClient;
use crate::utils::config;
use crate::utils::progress::ProgressLogWriter;

/// Copies PixivUtil2 tags, titles and captions onto untagged LANraragi archives.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// LANraragi base URL.
    #[arg(long)]
    lrr: String,

    /// Path to the PixivUtil2 sqlite database.
    #[arg(long)]
    db: PathBuf,

    /// Directory the run results are written to.
    #[arg(long, default_value = "results")]
    output_dir: PathBuf,

    /// Retries allowed for a locked or unreachable archive update.
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    max_retries: u32,

    #[arg(long)]
    no_progress: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let progress = if args.no_progress {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} archives")?,
        );
        bar
    };

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(ProgressLogWriter::new(progress.clone(), std::io::stderr))
        .init();

    if !args.db.exists() {
        bail!("Database does not exist: {:?}", args.db);
    }
    let server = config::load_server_config(&args.lrr)?;

    info!("LANraragi: {}", server.base_url);
    info!("DB: {:?}", args.db);

    let client = LanraragiClient::new(&server.base_url, &server.api_key);
    let db = PixivDatabase::open(&args.db)?;

    if !args.no_progress {
        progress.enable_steady_tick(Duration::from_millis(200));
    }

    let run_result = ReconciliationPipeline::new(&client, &db, ThreadSleeper, args.max_retries)
        .with_progress(progress)
        .run()?;

    let output_file = results::write_results(&args.output_dir, &run_result, chrono::Local::now())?;
    info!(
        "Processed {} archives: {} updated, {} without PixivUtil2 metadata. Results written to {:?}.",
        run_result.total(),
        run_result.ids(Outcome::Success).len(),
        run_result.ids(Outcome::NoMetadata).len(),
        output_file
    );
    Ok(())
}
