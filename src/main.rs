use std::io::IsTerminal;
use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use pingu_bot::application::services::{exit_status, Bot};
use pingu_bot::domain::traits::{CommandPublisher, Transport};
use pingu_bot::infrastructure::adapters::{ConsoleTransport, DiscordRest};
use pingu_bot::infrastructure::config::{Config, LogLevel};

const DEFAULT_CONFIG: &str = "config.yaml";

fn main() {
    let path = std::env::var("PINGU_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG.to_string());
    let config = Config::resolve(&path);

    init_tracing(config.as_ref().map(|c| c.log_level).unwrap_or_default());
    install_panic_hook();

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    let code = exit_status(&runtime, run(config));
    std::process::exit(code);
}

async fn run(config: Config) -> i32 {
    tracing::info!(
        environment = ?config.environment,
        production = config.is_production(),
        database = %config.database.path.display(),
        "Loaded configuration"
    );

    let transport: Arc<dyn Transport> = Arc::new(ConsoleTransport::new());
    let publisher: Arc<dyn CommandPublisher> = Arc::new(
        DiscordRest::new(&config.discord.token, &config.discord.client_id)
            .with_api_base(&config.discord.api_base),
    );
    let mut bot = Bot::new(
        config.bot_settings(),
        transport,
        publisher,
        Arc::new(pingu_bot::manifest()),
    );

    match bot.run().await {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!("Exiting: {}", e);
            1
        }
    }
}

/// `RUST_LOG` wins over the configured level
fn init_tracing(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal()),
        )
        .init();
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("Uncaught panic: {}", info);
    }));
}
