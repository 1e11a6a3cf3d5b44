//! greeter: Slack greeting bot
//!
//! Usage:
//!   greeter            - Start the bot (HTTP webhook + daily greeting)
//!   greeter --help     - Show help
//!   greeter --version  - Show version

use std::sync::Arc;

use greeter_core::Config;
use greeter_schedule::GreetingScheduler;
use greeter_slack::{AppState, SlackApiClient};
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

/// Run mode
enum RunMode {
    Serve,
    Help,
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match parse_args() {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("greeter {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        RunMode::Serve => {}
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting greeter...");

    run(config).await
}

/// Parse command line arguments
fn parse_args() -> RunMode {
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Serve
}

/// Print help message
fn print_help() {
    println!("greeter - Slack greeting bot");
    println!();
    println!("Usage:");
    println!("  greeter            Start the bot (HTTP webhook + daily greeting)");
    println!("  greeter --help     Show this help message");
    println!("  greeter --version  Show version");
    println!();
    println!("Environment Variables:");
    println!("  SLACK_SIGNING_SECRET  Events API signing secret (required)");
    println!("  SLACK_ACCESS_TOKEN    Bot token (required)");
    println!("  SLACK_CLIENT_ID       OAuth client id");
    println!("  SLACK_CLIENT_SECRET   OAuth client secret");
    println!("  SLACK_REDIRECT_URL    OAuth redirect URL");
    println!("  SLACK_STATUS_CHANNEL  Channel for status announcements (default: playground)");
    println!("  SERVER_PORT           HTTP port (default: 8010)");
    println!("  GREETING_CRON         Greeting schedule, seconds first (default: 0 0 10 * * *)");
    println!("  GREETING_ENABLED      Enable the daily greeting (default: true)");
}

/// Fetch users, then run the HTTP server and the scheduler side by side
async fn run(config: Config) -> anyhow::Result<()> {
    let api_client =
        SlackApiClient::with_base_url(&config.slack.access_token, &config.slack.api_base_url)?;

    // The snapshot is never refreshed; members who join later are not greeted
    let users = match api_client.users_list().await {
        Ok(users) => Arc::new(users),
        Err(e) => {
            tracing::error!("Error getting users: {}", e);
            return Err(e.into());
        }
    };

    let state = AppState::new(&config, api_client);

    let scheduler = if config.schedule.enabled {
        let scheduler =
            GreetingScheduler::new(&config.schedule.cron, Arc::clone(&users), state.notifier.clone())?;
        Some(scheduler.start())
    } else {
        tracing::info!("Daily greeting disabled");
        None
    };

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(greeter_slack::start_server(
        config.server.port,
        state,
        async move {
            let _ = shutdown_rx.await;
        },
    ));

    tracing::info!("greeter initialized successfully");
    tracing::info!("Press Ctrl+C to exit");

    let served = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            None
        }
        served = &mut server => Some(served),
    };

    let result = match served {
        Some(served) => served?,
        None => {
            tracing::info!("Shutting down...");
            let _ = shutdown_tx.send(());
            server.await?
        }
    };

    if let Some(handle) = scheduler {
        handle.stop().await;
    }

    result?;
    tracing::info!("Shutdown complete");
    Ok(())
}
