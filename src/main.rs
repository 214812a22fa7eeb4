//! # news_harvest
//!
//! Pages through News API search results and saves every article to a single
//! JSON file.
//!
//! ## Features
//!
//! - Works out how many pages a search has from the first page's `totalResults`
//! - Fetches pages strictly one after another and appends them in order
//! - Saves whatever was collected exactly once, on success, on the first
//!   failed page, or on Ctrl-C
//! - Never overwrites an existing output file
//! - Reads saved files back and prints the first few articles
//!
//! ## Usage
//!
//! ```sh
//! NEWS_API_KEY=... news_harvest fetch "gender AND tech" gender_tech.json
//! echo 'API_KEY=...' > .env && news_harvest fetch "gender AND tech" gender_tech.json
//! news_harvest show gender_tech.json
//! ```
//!
//! ## Architecture
//!
//! 1. **Configuration**: CLI flags and environment become one `HarvestConfig`
//! 2. **Pagination**: `Paginator` requests page 1, computes the page count, walks the rest
//! 3. **Persistence**: `harvest::run` writes the aggregate once through a `ResultSink`

use clap::Parser;
use std::io;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod harvest;
mod models;
mod outputs;
mod paginator;
mod prompt;
mod shutdown;
mod utils;

use cli::{Cli, Command};
use config::HarvestConfig;
use error::Result;
use models::Query;
use outputs::json::JsonFileSink;
use outputs::summary::ArticleListing;
use utils::ensure_destination_available;

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_harvest starting up");

    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!(error = %e, "Could not load .env file"),
    }

    let args = Cli::parse();
    debug!(command = ?args.command, "Parsed CLI arguments");

    let code = match dispatch(args.command).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "Run aborted");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    };

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), "Execution complete");
    code
}

async fn dispatch(command: Command) -> Result<ExitCode> {
    match command {
        Command::Fetch(args) => {
            let config = args.api.to_config()?;
            let query = config.apply_defaults(args.to_query());
            fetch(&config, query, &args.output).await
        }
        Command::Custom(args) => {
            let config = args.api.to_config()?;
            // Check before asking questions the run could never use.
            ensure_destination_available(&args.output)?;
            let query = prompt::collect_query(&mut io::stdin().lock(), &mut io::stdout())?;
            let query = config.apply_defaults(query);
            fetch(&config, query, &args.output).await
        }
        Command::Show(args) => {
            let saved = JsonFileSink::load(&args.input).await?;
            print!("{}", ArticleListing::new(&saved.articles, args.limit));
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn fetch(config: &HarvestConfig, query: Query, output: &Path) -> Result<ExitCode> {
    println!("Grabbing articles for {:?} from {}...", query.term, query.endpoint);
    let shutdown = shutdown::listen_for_ctrl_c();
    let report = harvest::harvest_to_file(config, query, output, shutdown).await?;
    println!("{report}");
    Ok(report.exit_code())
}
