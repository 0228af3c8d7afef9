//! serverboard - game server status mirrored into Discord.

use anyhow::{Context, anyhow};
use serverboard::adapters::AdapterRegistry;
use serverboard::config::{Config, ValidationError, validate};
use serverboard::gateway::{DiscordGateway, Gateway};
use serverboard::identity::{IdentityStore, JsonFileStore};
use serverboard::provision::provision;
use serverboard::reconcile::Reconciler;
use serverboard::{http, metrics, scheduler};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let mut config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    let registry = AdapterRegistry::with_defaults(config.query.timeout(), &config.query.user_agent);
    let mut problems = validate(&config).err().unwrap_or_default();
    problems.extend(registry.check_roster(&config.servers).err().unwrap_or_default());
    report_invalid(&config_path, &problems)?;
    registry.resolve_layouts(&mut config.servers);

    let token = config
        .discord
        .token
        .clone()
        .ok_or_else(|| anyhow!("discord token missing"))?;
    let guild = config
        .discord
        .guild_id
        .ok_or_else(|| anyhow!("guild id missing"))?;

    info!(
        servers = config.servers.len(),
        guild = %guild,
        interval_secs = config.schedule.interval_secs,
        "Starting serverboard"
    );

    // Prometheus metrics are optional; port 0 or absent disables the endpoint.
    metrics::init();
    match config.metrics.enabled_port() {
        Some(port) => {
            tokio::spawn(async move {
                http::run_http_server(port).await;
            });
            info!(port, "Prometheus HTTP server started");
        }
        None => info!("Metrics endpoint disabled"),
    }

    let mut store = IdentityStore::open(JsonFileStore::new(&config.state.path));

    let gateway: Arc<dyn Gateway> = Arc::new(
        DiscordGateway::connect(&token, guild)
            .await
            .context("failed to connect to Discord")?,
    );

    let targets = provision(gateway.as_ref(), &mut store, &config.discord, &config.servers)
        .await
        .context("failed to provision guild channels")?;
    info!(
        category = %targets.category,
        text_channel = %targets.text_channel,
        "Guild channels ready"
    );

    let interval = config.schedule.interval();
    let mut reconciler = Reconciler::new(
        registry,
        gateway,
        store,
        config.servers,
        config.presentation,
        targets,
    )
    .with_text_channel_name(config.discord.text_channel);

    let passes = scheduler::run(&mut reconciler, interval, shutdown_signal()).await;
    info!(passes, "serverboard stopped");
    Ok(())
}

fn report_invalid(path: &str, problems: &[ValidationError]) -> anyhow::Result<()> {
    if problems.is_empty() {
        return Ok(());
    }
    for problem in problems {
        error!(path = %path, "{problem}");
    }
    Err(anyhow!(
        "configuration has {} problem(s). See error messages above.",
        problems.len()
    ))
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
