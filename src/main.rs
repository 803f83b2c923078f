use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stateless_cli::api::{self, AccountType, ApiClient};
use stateless_cli::config::Settings;
use stateless_cli::duration::parse_duration;
use stateless_cli::health::{HealthProber, LiveMonitor};
use stateless_cli::ui::{self, LinePrompter};

#[derive(Parser, Debug)]
#[command(name = "stateless-cli")]
#[command(about = "CLI for the Stateless RPC gateway control plane")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage request-routing buckets
    #[command(subcommand)]
    Buckets(BucketsCommand),
}

#[derive(Subcommand, Debug)]
enum BucketsCommand {
    /// Check the health of a bucket's provider nodes
    Health {
        /// The URL of the bucket to check; picked interactively when omitted
        url: Option<String>,

        /// Display the health check in a live view
        #[arg(long)]
        live: bool,

        /// Poll interval for the live view (e.g. "670ms", "2s")
        #[arg(long, default_value = "670ms")]
        interval: String,

        /// Buckets per page when picking interactively
        #[arg(long, default_value_t = 10)]
        limit: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load().context("failed to load configuration")?;

    match cli.command {
        Command::Buckets(BucketsCommand::Health {
            url,
            live,
            interval,
            limit,
        }) => buckets_health(&settings, url, live, &interval, limit).await,
    }
}

async fn buckets_health(
    settings: &Settings,
    url: Option<String>,
    live: bool,
    interval: &str,
    limit: u64,
) -> Result<()> {
    let interval = parse_duration(interval).context("invalid --interval")?;

    let url = match url {
        Some(url) => api::normalize_health_url(&url),
        None => match pick_bucket_url(settings, limit).await? {
            Some(url) => url,
            None => {
                println!("No buckets available.");
                return Ok(());
            }
        },
    };

    let prober = HealthProber::builder()
        .timeout(settings.request_timeout())
        .build()?;
    let mut monitor =
        LiveMonitor::new(prober, interval).with_thresholds(settings.tier_thresholds());

    if live {
        ui::run_live(&mut monitor, &url).await
    } else {
        let snapshot = monitor.snapshot(&url).await?;
        print!("{}", ui::format_snapshot(&snapshot));
        Ok(())
    }
}

/// Interactive bucket pick: guard on the user role, page through the
/// caller's buckets, and build the gateway health URL from the selection.
async fn pick_bucket_url(settings: &Settings, limit: u64) -> Result<Option<String>> {
    let client = ApiClient::new(settings)?;
    client.require_account_type(AccountType::User).await?;

    let mut prompter = LinePrompter::stdin();
    let bucket = api::select_bucket(
        &client,
        &mut prompter,
        "Choose the bucket to check",
        limit,
    )
    .await?;

    match bucket {
        Some(bucket) => Ok(Some(api::health_url_for(&bucket)?)),
        None => Ok(None),
    }
}
