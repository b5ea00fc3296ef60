// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (tracing) and parse command-line arguments (clap)
// 2. Validate the starting URL and the settings
// 3. Hook up OS signals so an operator can raise the depth or stop the crawl
// 4. Run the crawl and print a summary
// 5. Exit with proper code (0 = crawl finished, 2 = error)
//
// Every visited page is logged as "address -> title" while the crawl runs.
// Logs go to stderr; with --json the summary on stdout stays machine-readable.
// =============================================================================

mod cli;
mod control;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use depth_crawler::config::validate_seed;
use depth_crawler::{CrawlSummary, Crawler, HttpSource};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_logging();

    // Run our application logic and capture the exit code
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG overrides the default, e.g. RUST_LOG=depth_crawler=debug
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<i32> {
    // clap prints usage and exits non-zero by itself if --url is missing
    let cli = Cli::parse();

    let seed = validate_seed(&cli.url)?;
    let config = cli.config();

    let source = HttpSource::new(config.request_timeout).context("failed to build HTTP client")?;
    let crawler = Crawler::new(source, config)?;

    let listener = control::spawn_signal_listener(crawler.governor(), crawler.shutdown_token());

    let summary = crawler.run(seed.as_str()).await?;

    // Stop the signal listener now that the crawl is over
    crawler.shutdown_token().cancel();
    if let Err(e) = listener.await {
        tracing::warn!("signal listener failed: {}", e);
    }

    print_summary(&summary, cli.json)?;
    Ok(0)
}

fn print_summary(summary: &CrawlSummary, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(summary)?;
        println!("{}", json_output);
    } else {
        println!("📊 Summary:");
        println!("   Start: {}", summary.seed);
        println!("   Stopped: {:?}", summary.stop_reason);
        println!("   ✅ Visited: {}", summary.successes);
        println!("   ❌ Failed: {}", summary.errors);
        println!("   📏 Final depth: {}", summary.final_depth);
        println!("   ⏱️  Elapsed: {:.2}s", summary.elapsed.as_secs_f64());
    }
    Ok(())
}
