use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use rift_history::config::Cli;
use rift_history::fetcher::ThreadSleeper;
use rift_history::http_client::ReqwestTransport;
use rift_history::pipeline;

fn init_tracing() {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rift_history=info"));

    if json_format {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn main() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_tracing();

    if let Err(err) = run() {
        error!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Cli::parse().into_config()?;
    let transport =
        ReqwestTransport::new(config.http_timeout).context("unable to set up http transport")?;
    let summary = pipeline::run(&config, transport, ThreadSleeper)?;

    println!("Match export complete");
    println!("Match ids: {}", summary.ids_found);
    println!("Fetched: {}/{}", summary.fetched, summary.ids_found);
    println!("Rows: {}", summary.extracted);
    if summary.skipped_fetch > 0 {
        println!("Skipped (fetch failed): {}", summary.skipped_fetch);
    }
    if summary.skipped_missing_player > 0 {
        println!("Skipped (player missing): {}", summary.skipped_missing_player);
    }
    match summary.output {
        Some(path) => println!("CSV: {}", path.display()),
        None => println!("CSV: not written (no rows)"),
    }
    Ok(())
}
