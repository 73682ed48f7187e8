// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing, to stderr)
// 3. Install a Ctrl+C handler that asks the crawl to stop
// 4. Crawl the site, print the report
// 5. Exit with the verdict (0 = all images load, 1 = broken images or error)
// =============================================================================

mod checker; // src/checker/ - fetching, extracting, checking
mod cli; // src/cli.rs - command-line parsing
mod crawl; // src/crawl/ - the breadth-first crawl
mod error; // src/error.rs - error types
mod report; // src/report.rs - summary and exit code

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // Anything unexpected fails the build, same as a broken image
            tracing::error!(error = %e, "fatal error");
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so stdout stays clean for the report (and for --json)
fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// Runs the crawl and returns the exit code
async fn run(cli: Cli) -> Result<i32> {
    let config = cli.to_config()?;

    if config.show_progress {
        println!("\n🔍 Image Verifier");
        println!("{}", "=".repeat(50));
        println!("Base URL: {}\n", config.base_url);
    }

    let stop = Arc::new(AtomicBool::new(false));
    spawn_interrupt_handler(stop.clone());

    let report = crawl::crawl_site(config, Some(stop)).await?;
    report::print_report(&report, cli.json)?;

    info!(passed = report.passed(), broken = report.broken, "done");
    Ok(report.exit_code())
}

// First Ctrl+C: stop dispatching pages and images and report what we have
// Second Ctrl+C: give up waiting for in-flight checks and exit right away
fn spawn_interrupt_handler(stop: Arc<AtomicBool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("interrupt received, waiting for in-flight checks");
        stop.store(true, Ordering::SeqCst);

        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("second interrupt received, exiting");
            std::process::exit(1);
        }
    });
}
