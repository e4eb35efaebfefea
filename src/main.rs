use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use prwatch::{
    notification_queue, Config, Enricher, FeedFetcher, FeedPoller, GitHubClient, IrcClient,
    ItemDispatcher, NotificationRelay,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let config = match Config::from_environment() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = prwatch::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        prwatch::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    let github = match GitHubClient::from_config(&config.github) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("[e] {e}");
            return ExitCode::FAILURE;
        }
    };
    let fetcher = match FeedFetcher::from_config(&config.feed) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("[e] {e}");
            return ExitCode::FAILURE;
        }
    };

    let irc = match IrcClient::connect(&config.irc).await {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("[e] {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        "Relaying {}/{} builds to {}",
        config.github.owner, config.github.repo, config.irc.channel
    );

    let (sender, receiver) = notification_queue();
    let relay = NotificationRelay::new(receiver, irc.clone(), config.irc.channel.clone());
    tokio::spawn(relay.run());

    let dispatcher = ItemDispatcher::new(
        Enricher::new(Arc::new(github)),
        sender,
        config.relay.forward_aborted,
    );
    let mut poller = FeedPoller::new(
        Box::new(fetcher),
        dispatcher,
        Duration::from_secs(config.feed.min_refresh_secs),
    );
    poller.run().await;

    irc.quit("bye!").await;
    ExitCode::SUCCESS
}
