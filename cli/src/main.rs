use clap::{Parser, Subcommand};
use gtmetrix::prelude::*;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "gtmetrix")]
#[command(about = "Run GTmetrix tests and log their metrics")]
struct Cli {
    /// Account e-mail used for API authentication
    #[arg(long, env = "GTMETRIX_EMAIL")]
    email: String,
    /// API key used for API authentication
    #[arg(long, env = "GTMETRIX_API_KEY", hide_env_values = true)]
    api_key: String,
    /// Test submission endpoint
    #[arg(long, default_value = DEFAULT_API_URL)]
    base_url: String,
    /// Directory receiving the daily results files
    #[arg(long, default_value = ".")]
    results_dir: PathBuf,
    /// Seconds to wait between two polls
    #[arg(long, default_value = "30")]
    poll_interval: u64,
    /// Polls allowed after the first one
    #[arg(long, default_value = "30")]
    max_poll_retries: u32,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a new test and wait for its results
    Start {
        /// The page to test
        url: String,
        /// Label written to the results log (defaults to the URL)
        #[arg(short, long)]
        key: Option<String>,
        /// Extra test parameter, e.g. `location=2` (repeatable)
        #[arg(short, long = "option", value_parser = parse_option)]
        options: Vec<(String, String)>,
    },
    /// Fetch the results of a test submitted earlier
    Poll {
        /// Label written to the results log
        key: String,
        /// Identifier returned when the test was submitted
        test_id: String,
    },
}

fn parse_option(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", raw)),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = GtmetrixConfig::default()
        .with_base_url(cli.base_url)
        .with_results_dir(cli.results_dir)
        .with_poll_interval(Duration::from_secs(cli.poll_interval))
        .with_max_poll_retries(cli.max_poll_retries);
    let client = GtmetrixClient::new(cli.email, cli.api_key, config)?;
    info!(
        "Using {} (poll every {:?}, up to {} retries)",
        client.config().base_url,
        client.config().poll_interval,
        client.config().max_poll_retries
    );

    let handle = match cli.command {
        Commands::Start { url, key, options } => {
            let options: TestOptions = options.into_iter().collect();
            let mut handle = client.start_test(&url, options).await?;
            println!("Started test {}", handle.test_id());

            let key = key.unwrap_or_else(|| url.clone());
            handle.fetch_results(&key).await?;
            handle
        }
        Commands::Poll { key, test_id } => client.poll_state_request(&key, &test_id).await?,
    };

    print_results(&handle)?;
    Ok(())
}

fn print_results(handle: &TestHandle) -> Result<(), Box<dyn std::error::Error>> {
    let Some(results) = handle.results() else {
        return Err(format!("test {} has no results", handle.test_id()).into());
    };

    info!("Printing results for test {}", handle.test_id());
    println!("Test:           {} ({})", handle.test_id(), handle.state());
    println!("PageSpeed:      {}", results.pagespeed_score);
    println!("YSlow:          {}", results.yslow_score);
    println!("HTML bytes:     {}", results.html_bytes);
    println!("HTML load time: {}", results.html_load_time);
    println!("Page bytes:     {}", results.page_bytes);
    println!("Page load time: {}", results.page_load_time);
    println!("Page elements:  {}", results.page_elements);

    if let Some(resources) = handle.resources() {
        for (name, link) in resources {
            println!("Resource {}: {}", name, serde_json::to_string(link)?);
        }
    }

    Ok(())
}
