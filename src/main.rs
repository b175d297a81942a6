use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use prwatch::config::AppConfig;
use prwatch::platform::github::GitHubPlatform;
use prwatch::poller::Poller;
use prwatch::report::{EmitFormat, Reporter};
use prwatch::shutdown::{graceful_shutdown, wait_for_shutdown};

#[derive(Parser)]
#[command(name = "prwatch", about = "Watch GitHub pull requests for changes")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// How detected changes are reported
    #[arg(long, value_enum, default_value_t = EmitFormat::Log)]
    emit: EmitFormat,

    /// Poll once, report every open pull request and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if cli.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let config = AppConfig::load(cli.config.as_deref())?;

    tracing::info!(
        username = %config.github.username,
        repos = config.poller.repos.len(),
        interval_secs = config.poller.poll_interval_seconds,
        "Starting prwatch"
    );

    let platform = Arc::new(GitHubPlatform::new(&config.github)?);
    let poller = Poller::new(config.poller_settings(), platform);
    let reporter = Reporter::new(config.notifications.clone(), cli.emit);

    if cli.once {
        // Nothing has been seen yet, so every open PR comes back as new.
        let changes = poller.collect_changes().await;
        reporter.report(changes);
        return Ok(());
    }

    poller.start(move |changes| reporter.report(changes));

    wait_for_shutdown().await;

    graceful_shutdown(&poller);

    Ok(())
}
